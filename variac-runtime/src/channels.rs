//! Runner to UI communication
//!
//! Events go out over a bounded embassy-sync channel. Senders never block:
//! when the UI falls behind, the oldest queued event makes room for the new
//! one, so a late reader sees the most recent history.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use tracing::trace;

use variac_core::Event;

/// Channel capacity for runner events
pub const EVENT_CHANNEL_SIZE: usize = 32;

/// Runner events (step changes, lifecycle) for the UI
pub(crate) type EventChannel = Channel<CriticalSectionRawMutex, Event, EVENT_CHANNEL_SIZE>;

/// Queue an event without blocking
pub(crate) fn publish(channel: &EventChannel, event: Event) {
    let Err(TrySendError::Full(event)) = channel.try_send(event) else {
        return;
    };

    if let Ok(stale) = channel.try_receive() {
        trace!("Event channel full, dropping {:?}", stale);
    }
    if channel.try_send(event).is_err() {
        trace!("Event channel still full, dropping {:?}", event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_drops_oldest_when_full() {
        let channel = EventChannel::new();
        for index in 0..EVENT_CHANNEL_SIZE + 5 {
            publish(
                &channel,
                Event::StepStarted {
                    index,
                    target_voltage: 0.0,
                },
            );
        }

        let mut received = Vec::new();
        while let Ok(event) = channel.try_receive() {
            if let Event::StepStarted { index, .. } = event {
                received.push(index);
            }
        }
        // The most recent events survive, in order
        let expected: Vec<usize> = (5..EVENT_CHANNEL_SIZE + 5).collect();
        assert_eq!(received, expected);
    }
}
