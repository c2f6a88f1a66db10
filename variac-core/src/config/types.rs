//! Configuration type definitions
//!
//! These types describe runner timing, the feedback simulation and the UI
//! cadence. With the `serde` feature they deserialize from a TOML file
//! where every field is optional.

use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default polling quantum of the execution loop (ms)
pub const DEFAULT_QUANTUM_MS: u32 = 10;

/// Quantum bounds (ms); coarser than 20 ms makes pause latency noticeable
pub const MIN_QUANTUM_MS: u32 = 1;
pub const MAX_QUANTUM_MS: u32 = 20;

/// Default UI polling interval (ms)
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 10;

/// Default visible plot window (seconds)
pub const DEFAULT_PLOT_WINDOW_S: u32 = 10;

/// Execution loop configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct RunnerConfig {
    /// Sleep between pause/stop checks (ms)
    pub quantum_ms: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            quantum_ms: DEFAULT_QUANTUM_MS,
        }
    }
}

impl RunnerConfig {
    /// Polling quantum, clamped to the supported range
    pub fn quantum(&self) -> Duration {
        Duration::from_millis(self.quantum_ms.clamp(MIN_QUANTUM_MS, MAX_QUANTUM_MS) as u64)
    }

    pub fn normalized(self) -> Self {
        Self {
            quantum_ms: self.quantum_ms.clamp(MIN_QUANTUM_MS, MAX_QUANTUM_MS),
        }
    }
}

/// Simulated feedback sensor configuration
///
/// Placeholder dynamics for running without hardware, not a device contract.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct FeedbackSimConfig {
    /// Fraction of the distance to the target covered per read, in (0, 1]
    pub response_rate: f32,
    /// Peak uniform noise added per read (volts)
    pub noise_amplitude: f32,
    /// Noise generator seed
    pub seed: u64,
}

impl Default for FeedbackSimConfig {
    fn default() -> Self {
        Self {
            response_rate: 0.1,
            noise_amplitude: 0.5,
            seed: 0x5eed_1e55,
        }
    }
}

impl FeedbackSimConfig {
    /// Clamp values into their valid ranges
    ///
    /// A non-positive or NaN response rate falls back to the default so the
    /// simulated output still moves.
    pub fn normalized(self) -> Self {
        let response_rate = if self.response_rate > 0.0 {
            self.response_rate.min(1.0)
        } else {
            Self::default().response_rate
        };
        let noise_amplitude = match self.noise_amplitude {
            n if !n.is_finite() => 0.0,
            n if n < 0.0 => -n,
            n => n,
        };

        Self {
            response_rate,
            noise_amplitude,
            seed: self.seed,
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct UiConfig {
    /// Status/feedback/plot polling interval (ms)
    pub poll_interval_ms: u32,
    /// Visible plot window (seconds)
    pub plot_window_s: u32,
    /// Keep the output energized while paused
    pub hold_voltage_on_pause: bool,
    /// Upper bound of the plot's voltage axis
    pub y_max_volts: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            plot_window_s: DEFAULT_PLOT_WINDOW_S,
            hold_voltage_on_pause: false,
            y_max_volts: 150.0,
        }
    }
}

impl UiConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1) as u64)
    }

    pub fn normalized(self) -> Self {
        let y_max_volts = if self.y_max_volts.is_finite() && self.y_max_volts > 0.0 {
            self.y_max_volts
        } else {
            Self::default().y_max_volts
        };

        Self {
            poll_interval_ms: self.poll_interval_ms.max(1),
            plot_window_s: self.plot_window_s.max(1),
            hold_voltage_on_pause: self.hold_voltage_on_pause,
            y_max_volts,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct AppConfig {
    pub runner: RunnerConfig,
    pub feedback: FeedbackSimConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Clamp every section into its valid range
    pub fn normalized(self) -> Self {
        Self {
            runner: self.runner.normalized(),
            feedback: self.feedback.normalized(),
            ui: self.ui.normalized(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantum_clamped() {
        assert_eq!(RunnerConfig::default().quantum(), Duration::from_millis(10));
        assert_eq!(
            RunnerConfig { quantum_ms: 0 }.quantum(),
            Duration::from_millis(1)
        );
        assert_eq!(
            RunnerConfig { quantum_ms: 250 }.quantum(),
            Duration::from_millis(20)
        );
    }

    #[test]
    fn test_feedback_normalized() {
        let config = FeedbackSimConfig {
            response_rate: 3.0,
            noise_amplitude: -0.25,
            seed: 7,
        }
        .normalized();
        assert_eq!(config.response_rate, 1.0);
        assert_eq!(config.noise_amplitude, 0.25);
        assert_eq!(config.seed, 7);

        let config = FeedbackSimConfig {
            response_rate: f32::NAN,
            noise_amplitude: f32::INFINITY,
            seed: 0,
        }
        .normalized();
        assert_eq!(config.response_rate, 0.1);
        assert_eq!(config.noise_amplitude, 0.0);
    }

    #[test]
    fn test_ui_normalized() {
        let config = UiConfig {
            poll_interval_ms: 0,
            plot_window_s: 0,
            hold_voltage_on_pause: true,
            y_max_volts: -1.0,
        }
        .normalized();
        assert_eq!(config.poll_interval_ms, 1);
        assert_eq!(config.plot_window_s, 1);
        assert!(config.hold_voltage_on_pause);
        assert_eq!(config.y_max_volts, 150.0);
    }
}
