//! Threaded profile runner
//!
//! Drives the clock-free [`variac_core::Sequencer`] in real time:
//!
//! - Execution loop on its own thread, polling every quantum
//! - Shared state behind one critical-section mutex
//! - Event channel and optional per-step callback for the UI
//!
//! Every [`ProfileRunner`] operation takes `&self`, so a runner can be
//! shared between the UI thread and callbacks behind an `Arc`.

#![deny(unsafe_code)]

mod channels;
mod shared;
mod worker;

pub mod runner;

pub use channels::EVENT_CHANNEL_SIZE;
pub use runner::{ProfileRunner, StepCallback};
