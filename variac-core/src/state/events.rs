//! Events produced by profile execution

/// Events reported by the sequencer
///
/// `StepStarted` and `ProfileFinished` carry work for the driver (apply a
/// setpoint, park the output); the rest are informational.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    // Lifecycle events
    /// A profile was loaded (or unloaded, with zero steps)
    ProfileLoaded { steps: usize },
    /// Execution started from the first step
    Started,
    /// Execution resumed from a pause
    Resumed,
    /// Execution paused
    Paused,
    /// Execution aborted, position reset
    Stopped,

    // Sequencer events
    /// A step was entered (or re-entered after a resume); apply its target
    StepStarted { index: usize, target_voltage: f32 },
    /// The last step expired
    ProfileFinished,
}

impl Event {
    /// Voltage the output should be driven to, if this event changes it
    pub fn setpoint(&self) -> Option<f32> {
        match self {
            Event::StepStarted { target_voltage, .. } => Some(*target_voltage),
            Event::ProfileFinished | Event::Stopped => Some(0.0),
            _ => None,
        }
    }
}
