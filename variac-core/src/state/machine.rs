//! Phase state machine definition
//!
//! Whether the runner may drive the actuator is a function of the current
//! phase only.

/// Execution phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing running; position at the first step
    #[default]
    Idle,
    /// Execution loop active, steps advancing
    Running,
    /// Suspended mid-step; remaining time preserved
    Paused,
    /// Last step finished; behaves like `Idle`
    Completed,
}

/// Control requests that drive phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Begin or resume execution
    Start,
    /// Suspend execution
    Pause,
    /// Abort execution and reset position
    Stop,
    /// Last step expired
    Finish,
}

impl Phase {
    /// Check if the runner may send setpoints in this phase
    pub fn output_allowed(&self) -> bool {
        matches!(self, Phase::Running)
    }

    /// Check if this phase is at rest with the position reset
    ///
    /// `Completed` is reported after a run finishes but is otherwise
    /// indistinguishable from `Idle`.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Completed)
    }

    /// Process a command and return the next phase
    pub fn transition(self, command: Command) -> Self {
        use Command::*;
        use Phase::*;

        match (self, command) {
            (Idle | Completed | Paused, Start) => Running,
            (Running, Pause) => Paused,
            (Running, Finish) => Completed,
            (_, Stop) => Idle,

            // Default: stay in current phase
            _ => self,
        }
    }
}
