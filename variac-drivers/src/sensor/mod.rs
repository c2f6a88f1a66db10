//! Feedback sensor drivers

pub mod simulated;

pub use simulated::SimulatedFeedback;
