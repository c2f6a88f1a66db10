//! Actuator drivers

pub mod servo;

pub use servo::{SimulatedServo, HISTORY_LEN};
