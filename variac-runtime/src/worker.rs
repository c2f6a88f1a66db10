//! Execution loop
//!
//! One loop runs per active run. Every quantum it charges the wall-clock
//! time since its last accounting point to the sequencer and applies the
//! resulting events, then sleeps. It exits as soon as it sees a phase other
//! than Running or an epoch that is no longer current.

use core::time::Duration;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::info;

use variac_core::{Actuator, FeedbackSensor};

use crate::shared::Shared;

/// Execution loop body, run on a dedicated thread
pub(crate) fn run<A, S>(shared: Arc<Shared<A, S>>, epoch: u64, quantum: Duration)
where
    A: Actuator,
    S: FeedbackSensor,
{
    info!("Execution loop {} started", epoch);

    let mut samples = Vec::new();
    loop {
        let keep_running = shared.with_station(|station| {
            if station.epoch != epoch || !station.sequencer.phase().output_allowed() {
                return false;
            }

            let now = Instant::now();
            let elapsed = now.saturating_duration_since(station.charged_at);
            station.charged_at = now;

            let mut next = station.sequencer.tick(elapsed);
            while let Some(event) = next {
                if let Some(sample) = station.apply(event) {
                    samples.push(sample);
                }
                shared.publish(event);
                next = station.sequencer.tick(Duration::ZERO);
            }

            station.sequencer.phase().output_allowed()
        });

        // Callbacks run outside the lock so they may call back into the runner
        shared.notify(&mut samples);

        if !keep_running {
            break;
        }
        thread::sleep(quantum);
    }

    info!("Execution loop {} stopped", epoch);
}
