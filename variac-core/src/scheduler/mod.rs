//! Profile scheduler
//!
//! Walks a loaded profile step by step and manages pause/resume/stop.

pub mod sequencer;

pub use sequencer::{RunnerStatus, Sequencer};
