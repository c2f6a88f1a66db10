//! UI session
//!
//! Front-end state independent of drawing: the start/pause toggle, hold
//! option, status and value labels, the plot trace and its cursor. The
//! terminal UI and the headless mode both drive a [`Session`] and only
//! differ in how they present it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use variac_core::config::UiConfig;
use variac_core::{Actuator, FeedbackSensor, Phase, Profile};
use variac_runtime::ProfileRunner;

use crate::plot::{PlotSample, PlotTrace};
use crate::profile_csv::{self, ProfileLoadError};

/// Cursor movement per key press (seconds)
pub const CURSOR_STEP_S: f64 = 0.1;

/// User requests, independent of the key that produced them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartPause,
    Stop,
    ToggleHold,
    /// Open the load prompt, prefilled with the current profile path
    OpenLoadPrompt,
    PromptInput(char),
    PromptBackspace,
    /// Load the file named at the prompt
    PromptSubmit,
    PromptCancel,
    CursorLeft,
    CursorRight,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Waiting,
    Running,
    Paused,
    Complete,
    Error(String),
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => f.write_str("Waiting"),
            Self::Running => f.write_str("Running"),
            Self::Paused => f.write_str("Paused"),
            Self::Complete => f.write_str("Complete"),
            Self::Error(message) => write!(f, "Error: {message}"),
        }
    }
}

pub struct Session<A, S>
where
    A: Actuator + Send + 'static,
    S: FeedbackSensor + Send + 'static,
{
    runner: ProfileRunner<A, S>,
    config: UiConfig,
    /// File the current profile came from
    profile_path: Option<PathBuf>,
    /// Path being typed at the load prompt
    prompt: Option<String>,
    profile_name: Option<String>,
    status: SessionStatus,
    hold_on_pause: bool,
    /// Last feedback sample
    feedback: f32,
    plot: PlotTrace,
    /// Previous running poll; `None` right after a start or resume
    last_sample_at: Option<Instant>,
    /// Cursor position on the time axis (seconds)
    cursor_s: Option<f64>,
    should_quit: bool,
}

impl<A, S> Session<A, S>
where
    A: Actuator + Send + 'static,
    S: FeedbackSensor + Send + 'static,
{
    pub fn new(runner: ProfileRunner<A, S>, config: UiConfig) -> Self {
        let config = config.normalized();
        Self {
            runner,
            config,
            profile_path: None,
            prompt: None,
            profile_name: None,
            status: SessionStatus::Waiting,
            hold_on_pause: config.hold_voltage_on_pause,
            feedback: 0.0,
            plot: PlotTrace::new(config.plot_window_s),
            last_sample_at: None,
            cursor_s: None,
            should_quit: false,
        }
    }

    pub fn apply(&mut self, action: Action) {
        debug!("Action: {:?}", action);
        match action {
            Action::StartPause => self.start_pause(),
            Action::Stop => self.stop(),
            Action::ToggleHold => self.toggle_hold(),
            Action::OpenLoadPrompt => self.open_prompt(),
            Action::PromptInput(c) => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.push(c);
                }
            }
            Action::PromptBackspace => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.pop();
                }
            }
            Action::PromptSubmit => self.submit_prompt(),
            Action::PromptCancel => self.prompt = None,
            Action::CursorLeft => self.move_cursor(-CURSOR_STEP_S),
            Action::CursorRight => self.move_cursor(CURSOR_STEP_S),
            Action::Quit => self.should_quit = true,
        }
    }

    /// Load a profile from CSV and remember its path
    ///
    /// Failures are also shown in the status line.
    pub fn load_from(&mut self, path: &Path) -> Result<(), ProfileLoadError> {
        match profile_csv::load_profile(path) {
            Ok(profile) => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.profile_path = Some(path.to_path_buf());
                self.load_profile(profile, name);
                Ok(())
            }
            Err(err) => {
                warn!("Failed to load profile {}: {}", path.display(), err);
                self.status = SessionStatus::Error(err.to_string());
                Err(err)
            }
        }
    }

    /// Hand a profile to the runner and reset the view
    pub fn load_profile(&mut self, profile: Profile, name: impl Into<String>) {
        self.runner.set_profile(profile);
        self.profile_name = Some(name.into());
        self.reset_view();
        self.status = SessionStatus::Waiting;
    }

    fn open_prompt(&mut self) {
        let current = self
            .profile_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        self.prompt = Some(current);
    }

    fn submit_prompt(&mut self) {
        let Some(input) = self.prompt.take() else {
            return;
        };
        let path = input.trim();
        if path.is_empty() {
            self.status = SessionStatus::Error("no profile file given".to_string());
            return;
        }
        // Errors already land in the status line
        let _ = self.load_from(Path::new(path));
    }

    /// Start/Pause is disabled until a non-empty profile is loaded
    pub fn can_start(&self) -> bool {
        self.runner.status().step_count > 0
    }

    fn start_pause(&mut self) {
        if !self.can_start() {
            return;
        }
        if self.runner.status().is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    fn start(&mut self) {
        let restart = self.runner.status().phase.is_stopped();
        match self.runner.start() {
            Ok(()) => {
                if restart {
                    self.reset_view();
                }
                self.last_sample_at = None;
                self.status = SessionStatus::Running;
            }
            Err(err) => self.status = SessionStatus::Error(err.to_string()),
        }
    }

    fn pause(&mut self) {
        self.runner.pause();
        if !self.hold_on_pause {
            self.runner.hold_output(false);
        }
        self.last_sample_at = None;
        self.status = SessionStatus::Paused;
    }

    fn stop(&mut self) {
        self.runner.stop();
        self.reset_view();
        self.status = SessionStatus::Waiting;
    }

    fn toggle_hold(&mut self) {
        self.hold_on_pause = !self.hold_on_pause;
        if self.runner.hold_output(self.hold_on_pause) {
            debug!("Output parked after hold was cleared");
        }
    }

    fn move_cursor(&mut self, delta_s: f64) {
        if self.plot.is_empty() {
            return;
        }
        let [start, end] = self.plot.x_bounds();
        let current = self.cursor_s.unwrap_or(self.plot.elapsed_s());
        self.cursor_s = Some((current + delta_s).clamp(start, end));
    }

    fn reset_view(&mut self) {
        self.plot.clear();
        self.feedback = 0.0;
        self.last_sample_at = None;
        self.cursor_s = None;
    }

    /// Refresh feedback, status and plot; call every poll interval
    pub fn poll(&mut self, now: Instant) {
        while let Some(event) = self.runner.try_event() {
            debug!("Runner event: {:?}", event);
        }

        let status = self.runner.status();
        if self.status == SessionStatus::Running && status.phase == Phase::Completed {
            info!("Profile complete after {:.2}s", self.plot.elapsed_s());
            self.status = SessionStatus::Complete;
            self.last_sample_at = None;
        }

        if status.step_count == 0 {
            return;
        }
        self.feedback = self.runner.read_feedback();

        if status.is_running() {
            if let Some(last) = self.last_sample_at {
                self.plot.push(
                    now.saturating_duration_since(last),
                    status.target_voltage,
                    self.feedback,
                );
            }
            self.last_sample_at = Some(now);
        }
    }

    /// Cursor time and the sample nearest to it
    pub fn cursor_readout(&self) -> Option<(f64, PlotSample)> {
        let time_s = self.cursor_s?;
        Some((time_s, self.plot.nearest(time_s)?))
    }

    pub fn runner(&self) -> &ProfileRunner<A, S> {
        &self.runner
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn plot(&self) -> &PlotTrace {
        &self.plot
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Text typed at the load prompt, while it is open
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn profile_name(&self) -> Option<&str> {
        self.profile_name.as_deref()
    }

    pub fn hold_on_pause(&self) -> bool {
        self.hold_on_pause
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status_line(&self) -> String {
        format!("Status: {}", self.status)
    }

    pub fn voltage_label(&self) -> String {
        format!("Voltage: {:.2}V", self.feedback)
    }

    pub fn elapsed_label(&self) -> String {
        format!("Elapsed Time: {:.2}s", self.plot.elapsed_s())
    }

    pub fn start_pause_label(&self) -> &'static str {
        if self.status == SessionStatus::Running {
            "Pause"
        } else {
            "Start"
        }
    }
}
