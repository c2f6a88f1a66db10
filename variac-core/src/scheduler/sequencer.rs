//! Profile step sequencer
//!
//! Tracks execution of a voltage profile: current step, time left in that
//! step, last applied target and active elapsed time. The sequencer never
//! reads a clock; the driver charges elapsed time with [`Sequencer::tick`]
//! and [`Sequencer::pause`] and applies the events it gets back.

use core::time::Duration;

use tracing::{debug, trace};

use crate::error::RunnerError;
use crate::profile::{Profile, Step};
use crate::state::{Command, Event, Phase};

/// Snapshot of execution state
///
/// Copied out whole so observers never see a partially applied update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunnerStatus {
    /// Current execution phase
    pub phase: Phase,
    /// Current step index (0-based, `step_count` only transiently)
    pub step_index: usize,
    /// Number of steps in the loaded profile
    pub step_count: usize,
    /// Time left in the current step (`None` before a step is entered)
    pub remaining: Option<Duration>,
    /// Last applied target voltage
    pub target_voltage: f32,
    /// Active time charged in the current run (frozen while paused)
    pub elapsed: Duration,
}

impl RunnerStatus {
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }
}

/// Profile sequencer
///
/// Owns the profile and all derived execution state.
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    /// Loaded profile, if any
    profile: Option<Profile>,
    /// Current execution phase
    phase: Phase,
    /// Index of the step being executed
    step_index: usize,
    /// Time left in the current step; kept across a pause
    remaining: Option<Duration>,
    /// Last target handed to the driver
    target_voltage: f32,
    /// Active time charged since the run started
    elapsed: Duration,
    /// Current step's target applied since the last start/resume
    engaged: bool,
    /// Time left over from a step that expired mid-tick
    carry: Duration,
}

impl Sequencer {
    /// Create a sequencer, optionally with a profile already loaded
    pub fn new(profile: Option<Profile>) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Check if a profile with at least one step is loaded
    pub fn has_steps(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.remaining
    }

    pub fn target_voltage(&self) -> f32 {
        self.target_voltage
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get a consistent snapshot of the execution state
    pub fn status(&self) -> RunnerStatus {
        RunnerStatus {
            phase: self.phase,
            step_index: self.step_index,
            step_count: self.profile.as_ref().map_or(0, Profile::len),
            remaining: self.remaining,
            target_voltage: self.target_voltage,
            elapsed: self.elapsed,
        }
    }

    /// Replace the profile
    ///
    /// Resets position the way [`Sequencer::stop`] does. The caller decides
    /// whether the output should also be parked.
    pub fn set_profile(&mut self, profile: Option<Profile>) -> Event {
        let steps = profile.as_ref().map_or(0, Profile::len);
        self.profile = profile;
        self.phase = self.phase.transition(Command::Stop);
        self.reset_position();
        self.elapsed = Duration::ZERO;

        debug!("Profile loaded: {} steps", steps);
        Event::ProfileLoaded { steps }
    }

    /// Begin or resume execution
    ///
    /// Returns `Ok(None)` if already running. Starting from `Idle` or
    /// `Completed` begins at the first step; starting from `Paused` keeps
    /// the step and its remaining time.
    pub fn start(&mut self) -> Result<Option<Event>, RunnerError> {
        if !self.has_steps() {
            return Err(RunnerError::NoProfileLoaded);
        }

        let event = match self.phase {
            Phase::Running => return Ok(None),
            Phase::Paused => Event::Resumed,
            Phase::Idle | Phase::Completed => {
                self.reset_position();
                self.elapsed = Duration::ZERO;
                Event::Started
            }
        };

        self.phase = self.phase.transition(Command::Start);
        self.engaged = false;
        Ok(Some(event))
    }

    /// Pause execution
    ///
    /// `elapsed` is the active time since the last charge point; it is
    /// charged to the current step before suspending so no time is lost
    /// between the request and the loop noticing it. The step never
    /// advances here, even if its remaining time reaches zero.
    pub fn pause(&mut self, elapsed: Duration) -> Option<Event> {
        if self.phase != Phase::Running {
            return None;
        }

        // Paused before the loop entered the step: start its clock here
        if self.remaining.is_none() {
            self.remaining = self.current_step().map(|step| step.duration);
        }
        let carry = core::mem::take(&mut self.carry);
        self.charge(elapsed.saturating_add(carry));
        self.phase = self.phase.transition(Command::Pause);
        self.engaged = false;

        debug!(
            "Paused at step {} with {:?} remaining",
            self.step_index, self.remaining
        );
        Some(Event::Paused)
    }

    /// Abort execution and reset position
    ///
    /// Returns `Stopped` only when a run was actually interrupted.
    pub fn stop(&mut self) -> Option<Event> {
        let interrupted = matches!(self.phase, Phase::Running | Phase::Paused);

        self.phase = self.phase.transition(Command::Stop);
        self.reset_position();
        self.elapsed = Duration::ZERO;

        interrupted.then_some(Event::Stopped)
    }

    /// Advance with elapsed active time
    ///
    /// Call this every polling quantum while running, then keep calling it
    /// with `Duration::ZERO` until it returns `None` so step changes and
    /// zero-length steps are drained in the same pass. Time passed to the
    /// call that (re)enters a step is charged to that step on the next call.
    /// Time beyond a step's remaining time carries into the next step and is
    /// dropped at the end of the profile.
    pub fn tick(&mut self, elapsed: Duration) -> Option<Event> {
        if self.phase != Phase::Running {
            return None;
        }

        if !self.engaged {
            self.carry = self.carry.saturating_add(elapsed);
            return Some(self.enter_step());
        }

        let elapsed = elapsed.saturating_add(core::mem::take(&mut self.carry));
        let charged = self.charge(elapsed);

        if self.remaining.is_some_and(|r| r.is_zero()) {
            self.carry = elapsed - charged;
            self.remaining = None;
            self.step_index += 1;
            return Some(self.enter_step());
        }

        None
    }

    fn current_step(&self) -> Option<Step> {
        self.profile.as_ref()?.get(self.step_index).copied()
    }

    /// Enter the step at the current index, or finish if there is none
    fn enter_step(&mut self) -> Event {
        let Some(step) = self.current_step() else {
            return self.finish();
        };

        self.target_voltage = step.target_voltage;
        let remaining = *self.remaining.get_or_insert(step.duration);
        self.engaged = true;

        debug!(
            "Step {}: {} V for {:?}",
            self.step_index, step.target_voltage, remaining
        );
        Event::StepStarted {
            index: self.step_index,
            target_voltage: step.target_voltage,
        }
    }

    /// Handle profile completion
    fn finish(&mut self) -> Event {
        self.phase = self.phase.transition(Command::Finish);
        self.reset_position();

        debug!("Profile finished after {:?}", self.elapsed);
        Event::ProfileFinished
    }

    /// Charge active time to the current step, returning what was used
    fn charge(&mut self, elapsed: Duration) -> Duration {
        let Some(remaining) = self.remaining.as_mut() else {
            return Duration::ZERO;
        };

        let charged = elapsed.min(*remaining);
        *remaining -= charged;
        self.elapsed = self.elapsed.saturating_add(charged);
        trace!("Charged {:?}, {:?} left", charged, *remaining);
        charged
    }

    fn reset_position(&mut self) {
        self.step_index = 0;
        self.remaining = None;
        self.target_voltage = 0.0;
        self.engaged = false;
        self.carry = Duration::ZERO;
    }
}
