//! Simulated feedback sensor
//!
//! Models the variac output as a first-order lag toward the tracked
//! target with uniform noise on every read:
//!
//! ```text
//! value += response_rate * (target - value)
//! value += uniform(-noise_amplitude, noise_amplitude)
//! ```
//!
//! The dynamics advance per read, not per unit of time, so the response
//! speed depends on how often the UI samples it.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use variac_core::config::FeedbackSimConfig;
use variac_core::traits::FeedbackSensor;

/// Simulated feedback sensor
#[derive(Debug, Clone)]
pub struct SimulatedFeedback {
    config: FeedbackSimConfig,
    /// Current simulated output (volts)
    value: f32,
    /// Voltage the output is settling toward
    target: f32,
    rng: SmallRng,
}

impl Default for SimulatedFeedback {
    fn default() -> Self {
        Self::new(FeedbackSimConfig::default())
    }
}

impl SimulatedFeedback {
    /// Create a simulated sensor resting at 0 V
    pub fn new(config: FeedbackSimConfig) -> Self {
        let config = config.normalized();
        Self {
            config,
            value: 0.0,
            target: 0.0,
            rng: SmallRng::seed_from_u64(config.seed),
        }
    }

    pub fn config(&self) -> &FeedbackSimConfig {
        &self.config
    }

    /// Last simulated value, without advancing the model
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}

impl FeedbackSensor for SimulatedFeedback {
    fn track(&mut self, target: f32) {
        self.target = target;
    }

    fn read(&mut self) -> f32 {
        self.value += self.config.response_rate * (self.target - self.value);

        let noise = self.config.noise_amplitude;
        if noise > 0.0 {
            self.value += self.rng.random_range(-noise..=noise);
        }

        trace!("Feedback: {} V (target {} V)", self.value, self.target);
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(value: f32, expected: f32, tolerance: f32) -> bool {
        let delta = value - expected;
        delta <= tolerance && delta >= -tolerance
    }

    fn quiet(response_rate: f32) -> FeedbackSimConfig {
        FeedbackSimConfig {
            response_rate,
            noise_amplitude: 0.0,
            seed: 1,
        }
    }

    #[test]
    fn test_rests_at_zero() {
        let mut sensor = SimulatedFeedback::new(quiet(0.5));
        assert_eq!(sensor.read(), 0.0);
        assert_eq!(sensor.read(), 0.0);
    }

    #[test]
    fn test_first_order_response() {
        let mut sensor = SimulatedFeedback::new(quiet(0.5));
        sensor.track(100.0);

        assert_eq!(sensor.read(), 50.0);
        assert_eq!(sensor.read(), 75.0);
        assert_eq!(sensor.read(), 87.5);
        assert_eq!(sensor.target(), 100.0);
    }

    #[test]
    fn test_converges_to_target() {
        let mut sensor = SimulatedFeedback::new(quiet(0.1));
        sensor.track(40.0);

        let mut last = 0.0;
        for _ in 0..200 {
            last = sensor.read();
        }
        assert!(near(last, 40.0, 0.01));

        sensor.track(0.0);
        for _ in 0..200 {
            last = sensor.read();
        }
        assert!(near(last, 0.0, 0.01));
    }

    #[test]
    fn test_noise_is_bounded() {
        let config = FeedbackSimConfig {
            response_rate: 1.0,
            noise_amplitude: 0.5,
            seed: 42,
        };
        let mut sensor = SimulatedFeedback::new(config);
        sensor.track(10.0);

        for _ in 0..500 {
            let value = sensor.read();
            // Full response each read, so only the latest noise sample remains
            assert!(near(value, 10.0, 0.5 + 1e-4), "value {value} out of band");
        }
    }

    #[test]
    fn test_same_seed_same_readings() {
        let config = FeedbackSimConfig {
            response_rate: 0.2,
            noise_amplitude: 1.0,
            seed: 99,
        };
        let mut a = SimulatedFeedback::new(config);
        let mut b = SimulatedFeedback::new(config);
        a.track(30.0);
        b.track(30.0);

        for _ in 0..50 {
            assert_eq!(a.read(), b.read());
        }
    }
}
