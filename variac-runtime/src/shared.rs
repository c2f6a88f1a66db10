//! State shared between the runner handle and its execution loop

use core::cell::RefCell;
use std::time::Instant;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use parking_lot::Mutex as HostMutex;
use tracing::debug;

use variac_core::{Actuator, Event, FeedbackSensor, Sequencer};

use crate::channels::{self, EventChannel};
use crate::runner::StepCallback;

/// Sequencer plus the devices it drives
///
/// Everything the loop and the API mutate lives here so one lock covers
/// each transition end to end.
pub(crate) struct Station<A, S> {
    pub sequencer: Sequencer,
    pub actuator: A,
    pub sensor: S,
    /// Wall-clock point active time has been charged up to
    pub charged_at: Instant,
    /// Bumped on every launch, stop and profile change
    pub epoch: u64,
}

impl<A, S> Station<A, S>
where
    A: Actuator,
    S: FeedbackSensor,
{
    pub fn new(sequencer: Sequencer, actuator: A, sensor: S) -> Self {
        Self {
            sequencer,
            actuator,
            sensor,
            charged_at: Instant::now(),
            epoch: 0,
        }
    }

    /// Invalidate whatever loop is currently running
    pub fn retire_loop(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// Command 0 V and have the sensor follow
    pub fn park(&mut self) {
        self.actuator.set_voltage(0.0);
        self.sensor.track(0.0);
    }

    /// Apply a sequencer event to the devices
    ///
    /// Returns `(target, feedback)` for the step callback when a step was
    /// entered.
    pub fn apply(&mut self, event: Event) -> Option<(f32, f32)> {
        let target = event.setpoint()?;
        self.actuator.set_voltage(target);
        self.sensor.track(target);

        let Event::StepStarted { index, .. } = event else {
            return None;
        };
        let feedback = self.sensor.read();
        debug!(
            "Step {} applied: target {} V, feedback {} V",
            index, target, feedback
        );
        Some((target, feedback))
    }
}

/// Runner state shared with the execution loop
pub(crate) struct Shared<A, S> {
    pub station: Mutex<CriticalSectionRawMutex, RefCell<Station<A, S>>>,
    pub events: EventChannel,
    /// Kept out of the critical section so user code never runs inside it
    pub callback: HostMutex<Option<StepCallback>>,
}

impl<A, S> Shared<A, S>
where
    A: Actuator,
    S: FeedbackSensor,
{
    pub fn new(station: Station<A, S>) -> Self {
        Self {
            station: Mutex::new(RefCell::new(station)),
            events: EventChannel::new(),
            callback: HostMutex::new(None),
        }
    }

    /// Run `f` with exclusive access to the station
    pub fn with_station<R>(&self, f: impl FnOnce(&mut Station<A, S>) -> R) -> R {
        self.station.lock(|cell| f(&mut cell.borrow_mut()))
    }

    pub fn publish(&self, event: Event) {
        channels::publish(&self.events, event);
    }

    /// Hand collected step samples to the callback, if one is set
    pub fn notify(&self, pending: &mut Vec<(f32, f32)>) {
        if pending.is_empty() {
            return;
        }

        let mut callback = self.callback.lock();
        match callback.as_mut() {
            Some(callback) => pending
                .drain(..)
                .for_each(|(target, feedback)| callback(target, feedback)),
            None => pending.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use variac_core::Profile;
    use variac_drivers::{SimulatedFeedback, SimulatedServo};

    fn station() -> Station<SimulatedServo, SimulatedFeedback> {
        let profile = Profile::from_millis([(100.0, 10.0)]);
        Station::new(
            Sequencer::new(Some(profile)),
            SimulatedServo::new(),
            SimulatedFeedback::default(),
        )
    }

    #[test]
    fn test_apply_step_started() {
        let mut station = station();
        let sample = station.apply(Event::StepStarted {
            index: 0,
            target_voltage: 10.0,
        });

        assert_eq!(station.actuator.position(), 10.0);
        assert_eq!(station.sensor.target(), 10.0);
        let (target, _feedback) = sample.unwrap();
        assert_eq!(target, 10.0);
    }

    #[test]
    fn test_apply_finish_parks_output() {
        let mut station = station();
        station.apply(Event::StepStarted {
            index: 0,
            target_voltage: 10.0,
        });

        assert_eq!(station.apply(Event::ProfileFinished), None);
        assert_eq!(station.actuator.last_command(), Some(0.0));
        assert_eq!(station.sensor.target(), 0.0);
    }

    #[test]
    fn test_control_events_touch_nothing() {
        let mut station = station();
        assert_eq!(station.apply(Event::Paused), None);
        assert_eq!(station.apply(Event::Started), None);
        assert_eq!(station.actuator.commands(), 0);
    }

    #[test]
    fn test_notify_without_callback_discards() {
        let shared = Shared::new(station());
        let mut pending = vec![(1.0, 0.5)];
        shared.notify(&mut pending);
        assert!(pending.is_empty());
    }
}
