//! Hardware abstraction traits
//!
//! These traits define the interface between profile execution and the
//! output device. Both are object safe so drivers can be boxed.

pub mod actuator;
pub mod sensor;

pub use actuator::Actuator;
pub use sensor::FeedbackSensor;
