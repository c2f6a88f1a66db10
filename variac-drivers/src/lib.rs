//! Driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in variac-core:
//!
//! - Actuators (simulated servo)
//! - Feedback sensors (simulated first-order response with noise)

#![no_std]
#![deny(unsafe_code)]

pub mod actuator;
pub mod sensor;

pub use actuator::SimulatedServo;
pub use sensor::SimulatedFeedback;
