//! State machine for profile execution
//!
//! The phase machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{Command, Phase};
