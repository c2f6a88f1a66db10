//! Profile runner
//!
//! Owns the sequencer, the actuator and the feedback sensor, and runs the
//! execution loop on its own thread while a profile is running. Control
//! requests may arrive from any thread at any time; each one is applied
//! under the same lock the loop uses, so time is charged exactly once and
//! readers always see a whole snapshot.

use core::time::Duration;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use parking_lot::Mutex as HostMutex;
use tracing::{debug, error, info, warn};

use variac_core::config::RunnerConfig;
use variac_core::{
    Actuator, Event, FeedbackSensor, Profile, RunnerError, RunnerStatus, Sequencer,
};

use crate::shared::{Shared, Station};
use crate::worker;

/// Per-step push notification: `(target_voltage, feedback)`
pub type StepCallback = Box<dyn FnMut(f32, f32) + Send>;

/// Handle of a spawned execution loop
struct Worker {
    epoch: u64,
    handle: JoinHandle<()>,
}

impl Worker {
    /// Wait for the loop to exit
    ///
    /// A loop asked to stop from its own step callback cannot join itself;
    /// it has already been retired and exits after the callback returns.
    fn join(self) {
        if self.handle.thread().id() == thread::current().id() {
            debug!("Skipping self-join of execution loop {}", self.epoch);
            return;
        }
        if self.handle.join().is_err() {
            warn!("Execution loop {} panicked", self.epoch);
        }
    }
}

/// Loop handles owned by a runner
#[derive(Default)]
struct Workers {
    /// Loop for the latest launch
    current: Option<Worker>,
    /// Older loops retired by epoch, possibly still winding down
    retired: Vec<Worker>,
}

impl Workers {
    fn is_alive(&self) -> bool {
        self.current
            .iter()
            .chain(&self.retired)
            .any(|worker| !worker.handle.is_finished())
    }

    /// Take retired loops that have already exited
    fn take_finished(&mut self) -> Vec<Worker> {
        let (finished, alive): (Vec<_>, Vec<_>) = self
            .retired
            .drain(..)
            .partition(|worker| worker.handle.is_finished());
        self.retired = alive;
        finished
    }

    fn take_all(&mut self) -> Vec<Worker> {
        let mut all = core::mem::take(&mut self.retired);
        all.extend(self.current.take());
        all
    }
}

/// Real-time profile runner
pub struct ProfileRunner<A, S>
where
    A: Actuator + Send + 'static,
    S: FeedbackSensor + Send + 'static,
{
    shared: Arc<Shared<A, S>>,
    workers: HostMutex<Workers>,
    config: RunnerConfig,
}

impl<A, S> ProfileRunner<A, S>
where
    A: Actuator + Send + 'static,
    S: FeedbackSensor + Send + 'static,
{
    /// Create a runner with the default polling quantum
    pub fn new(actuator: A, sensor: S, profile: Option<Profile>) -> Self {
        Self::with_config(actuator, sensor, profile, RunnerConfig::default())
    }

    pub fn with_config(
        actuator: A,
        sensor: S,
        profile: Option<Profile>,
        config: RunnerConfig,
    ) -> Self {
        let station = Station::new(Sequencer::new(profile), actuator, sensor);
        Self {
            shared: Arc::new(Shared::new(station)),
            workers: HostMutex::new(Workers::default()),
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Start or resume the loaded profile
    ///
    /// Does nothing if already running; a second loop is never spawned.
    /// Never waits for a previous loop: one still winding down after a
    /// pause is retired by its epoch and reaped once it has exited.
    pub fn start(&self) -> Result<(), RunnerError> {
        let launch = self.shared.with_station(|station| -> Result<_, RunnerError> {
            let Some(event) = station.sequencer.start()? else {
                return Ok(None);
            };

            station.charged_at = Instant::now();
            self.shared.publish(event);
            Ok(Some((station.retire_loop(), event)))
        });

        match launch {
            Ok(Some((epoch, event))) => {
                info!("{:?}: launching execution loop {}", event, epoch);
                self.launch(epoch);
                Ok(())
            }
            Ok(None) => {
                debug!("Start ignored, already running");
                Ok(())
            }
            Err(err) => {
                warn!("Start rejected: {}", err);
                Err(err)
            }
        }
    }

    /// Pause at the current point of the current step
    ///
    /// Time since the loop's last accounting point is charged here, so the
    /// step resumes with exactly the time that was left.
    pub fn pause(&self) {
        let paused = self.shared.with_station(|station| {
            let now = Instant::now();
            let elapsed = now.saturating_duration_since(station.charged_at);
            let event = station.sequencer.pause(elapsed)?;

            station.charged_at = now;
            self.shared.publish(event);
            Some(station.sequencer.status())
        });

        if let Some(status) = paused {
            info!(
                "Paused at step {} with {:?} remaining",
                status.step_index, status.remaining
            );
        }
    }

    /// Stop, reset position and park the output at 0 V
    ///
    /// Waits for the execution loop to exit. Safe to call from the step
    /// callback.
    pub fn stop(&self) {
        let interrupted = self.shared.with_station(|station| {
            let event = station.sequencer.stop();
            station.park();
            station.retire_loop();
            if let Some(event) = event {
                self.shared.publish(event);
            }
            event.is_some()
        });

        if interrupted {
            info!("Profile stopped");
        }
        self.join_workers();
    }

    /// Replace the profile and reset position
    ///
    /// A running loop is terminated. The output is left where it is.
    pub fn set_profile(&self, profile: Profile) {
        let steps = profile.len();
        self.replace_profile(Some(profile));
        info!("Profile loaded: {} steps", steps);
    }

    /// Unload the profile; `start` fails until a new one is set
    pub fn clear_profile(&self) {
        self.replace_profile(None);
        info!("Profile cleared");
    }

    fn replace_profile(&self, profile: Option<Profile>) {
        self.shared.with_station(|station| {
            let event = station.sequencer.set_profile(profile);
            station.retire_loop();
            self.shared.publish(event);
        });
        self.join_workers();
    }

    /// Copy of the loaded profile
    pub fn profile(&self) -> Option<Profile> {
        self.shared
            .with_station(|station| station.sequencer.profile().cloned())
    }

    /// Consistent snapshot of the execution state
    pub fn status(&self) -> RunnerStatus {
        self.shared
            .with_station(|station| station.sequencer.status())
    }

    /// Sample the feedback sensor
    pub fn read_feedback(&self) -> f32 {
        self.shared.with_station(|station| station.sensor.read())
    }

    /// Park the output at 0 V unless `hold` is set
    ///
    /// Only acts while not running; returns whether the output was parked.
    pub fn hold_output(&self, hold: bool) -> bool {
        self.shared.with_station(|station| {
            if hold || station.sequencer.phase().output_allowed() {
                return false;
            }
            station.park();
            true
        })
    }

    /// Run `f` with exclusive access to the actuator
    ///
    /// `f` must not call back into the runner.
    pub fn with_actuator<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        self.shared.with_station(|station| f(&mut station.actuator))
    }

    /// Run `f` with exclusive access to the feedback sensor
    ///
    /// `f` must not call back into the runner.
    pub fn with_sensor<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        self.shared.with_station(|station| f(&mut station.sensor))
    }

    /// Install a callback fired on the loop thread for every entered step
    ///
    /// The callback may use the runner's control operations, but must not
    /// replace or clear the callback itself.
    pub fn set_step_callback<F>(&self, callback: F)
    where
        F: FnMut(f32, f32) + Send + 'static,
    {
        *self.shared.callback.lock() = Some(Box::new(callback));
    }

    /// Take the oldest pending runner event, if any
    ///
    /// The channel keeps the latest [`EVENT_CHANNEL_SIZE`] events; older
    /// ones are discarded when nobody drains it.
    ///
    /// [`EVENT_CHANNEL_SIZE`]: crate::EVENT_CHANNEL_SIZE
    pub fn try_event(&self) -> Option<Event> {
        self.shared.events.try_receive().ok()
    }

    /// Check if any execution loop thread is still alive
    pub fn is_loop_alive(&self) -> bool {
        self.workers.lock().is_alive()
    }

    /// Spawn the loop for `epoch`, retiring any older one
    fn launch(&self, epoch: u64) {
        let finished = {
            let mut workers = self.workers.lock();
            if workers
                .current
                .as_ref()
                .is_some_and(|current| current.epoch > epoch)
            {
                debug!("Launch {} superseded", epoch);
                return;
            }
            if let Some(previous) = workers.current.take() {
                workers.retired.push(previous);
            }

            let shared = Arc::clone(&self.shared);
            let quantum = self.config.quantum();
            let spawned = thread::Builder::new()
                .name(format!("variac-runner-{epoch}"))
                .spawn(move || worker::run(shared, epoch, quantum));

            match spawned {
                Ok(handle) => workers.current = Some(Worker { epoch, handle }),
                Err(err) => {
                    error!("Failed to spawn execution loop: {}", err);
                    // Leave the run resumable instead of Running with no loop
                    self.shared.with_station(|station| {
                        if station.epoch == epoch {
                            if let Some(event) = station.sequencer.pause(Duration::ZERO) {
                                self.shared.publish(event);
                            }
                        }
                    });
                }
            }
            workers.take_finished()
        };

        // Already exited, so these joins return at once
        finished.into_iter().for_each(Worker::join);
    }

    /// Wait for every loop to exit
    ///
    /// Joins happen outside the slot lock: a loop's callback may be
    /// waiting on it.
    fn join_workers(&self) {
        let workers = self.workers.lock().take_all();
        workers.into_iter().for_each(Worker::join);
    }
}

impl<A, S> Drop for ProfileRunner<A, S>
where
    A: Actuator + Send + 'static,
    S: FeedbackSensor + Send + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}
