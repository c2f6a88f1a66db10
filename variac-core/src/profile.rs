//! Voltage profile data model
//!
//! A profile is an ordered list of steps. Each step holds a target voltage
//! for a duration, then execution advances to the next step.

use alloc::vec::Vec;
use core::time::Duration;

use heapless::String;

/// Maximum profile label length (bytes)
pub const MAX_LABEL_LEN: usize = 32;

/// A single profile step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// How long to hold the target
    pub duration: Duration,
    /// Target voltage in volts
    pub target_voltage: f32,
}

impl Step {
    /// Create a step from a duration and a target voltage
    pub const fn new(duration: Duration, target_voltage: f32) -> Self {
        Self {
            duration,
            target_voltage,
        }
    }

    /// Create a step from a duration in milliseconds
    ///
    /// Negative, NaN and infinite durations become zero so a degenerate
    /// step advances immediately instead of stalling the run. Voltages are
    /// passed through unchanged.
    pub fn from_millis(time_ms: f64, target_voltage: f32) -> Self {
        let whole_ms = time_ms as u64;
        let duration = if !(time_ms.is_finite() && time_ms > 0.0) {
            Duration::ZERO
        } else if whole_ms as f64 == time_ms {
            Duration::from_millis(whole_ms)
        } else {
            Duration::try_from_secs_f64(time_ms / 1000.0).unwrap_or(Duration::MAX)
        };
        Self::new(duration, target_voltage)
    }
}

/// Ordered sequence of steps
///
/// Immutable once built. Replacing the profile on a runner resets its
/// position to the first step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    label: String<MAX_LABEL_LEN>,
    steps: Vec<Step>,
}

impl Profile {
    /// Create a profile from steps
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            label: String::new(),
            steps,
        }
    }

    /// Create a profile from `(time_ms, voltage)` pairs
    ///
    /// See [`Step::from_millis`] for how degenerate durations are handled.
    pub fn from_millis<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f32)>,
    {
        pairs
            .into_iter()
            .map(|(time_ms, voltage)| Step::from_millis(time_ms, voltage))
            .collect()
    }

    /// Attach a display label, truncated to [`MAX_LABEL_LEN`] bytes
    pub fn with_label(mut self, label: &str) -> Self {
        self.label.clear();
        for ch in label.chars() {
            if self.label.push(ch).is_err() {
                break;
            }
        }
        self
    }

    /// Display label (empty if none was set)
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of all step durations
    pub fn total_duration(&self) -> Duration {
        self.steps
            .iter()
            .fold(Duration::ZERO, |acc, step| acc.saturating_add(step.duration))
    }
}

impl FromIterator<Step> for Profile {
    fn from_iter<T: IntoIterator<Item = Step>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_from_millis() {
        let profile = Profile::from_millis([(100.0, 10.0), (250.0, 20.5)]);

        assert_eq!(profile.len(), 2);
        assert_eq!(profile.steps()[0].duration, Duration::from_millis(100));
        assert_eq!(profile.steps()[1].duration, Duration::from_millis(250));
        assert_eq!(profile.steps()[1].target_voltage, 20.5);
        assert_eq!(profile.total_duration(), Duration::from_millis(350));
    }

    #[test]
    fn test_degenerate_durations_clamp_to_zero() {
        assert_eq!(Step::from_millis(-50.0, 1.0).duration, Duration::ZERO);
        assert_eq!(Step::from_millis(f64::NAN, 1.0).duration, Duration::ZERO);
        assert_eq!(Step::from_millis(f64::INFINITY, 1.0).duration, Duration::ZERO);
        assert_eq!(Step::from_millis(0.0, 1.0).duration, Duration::ZERO);
    }

    #[test]
    fn test_voltage_passes_through() {
        let step = Step::from_millis(10.0, -3.5);
        assert_eq!(step.target_voltage, -3.5);
    }

    #[test]
    fn test_label_truncated() {
        let long = "a-profile-name-that-is-far-too-long-to-fit";
        let profile = Profile::new(vec![]).with_label(long);

        assert_eq!(profile.label().len(), MAX_LABEL_LEN);
        assert!(long.starts_with(profile.label()));
    }

    #[test]
    fn test_empty_profile() {
        let profile = Profile::default();
        assert!(profile.is_empty());
        assert!(profile.get(0).is_none());
        assert_eq!(profile.total_duration(), Duration::ZERO);
    }
}
