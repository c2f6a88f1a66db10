//! Clock-free core logic for the variac profile controller
//!
//! This crate contains all application logic that does not depend on
//! threads, wall-clock time or a concrete output device:
//!
//! - Voltage profile data model (steps of duration + target voltage)
//! - Phase state machine for profile execution
//! - Step sequencer with pause/resume time accounting
//! - Actuator and feedback sensor traits
//! - Configuration type definitions
//!
//! Time is supplied by the caller: the sequencer is advanced with explicit
//! elapsed durations, so every transition can be tested deterministically.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod config;
pub mod error;
pub mod profile;
pub mod scheduler;
pub mod state;
pub mod traits;

pub use error::RunnerError;
pub use profile::{Profile, Step};
pub use scheduler::{RunnerStatus, Sequencer};
pub use state::{Command, Event, Phase};
pub use traits::{Actuator, FeedbackSensor};
