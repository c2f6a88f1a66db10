//! Live plot trace
//!
//! Target and feedback samples against profile time. Profile time only
//! advances while the run is active: the caller passes the wall-clock delta
//! between consecutive running polls, so time spent paused never shows up
//! on the x axis.

use std::time::Duration;

use heapless::HistoryBuffer;

/// Samples kept (a bit over a minute at the default 10 ms poll interval)
pub const PLOT_CAPACITY: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotSample {
    /// Profile time (seconds)
    pub time_s: f64,
    pub target: f32,
    pub feedback: f32,
}

/// Bounded time series of target and feedback voltages
pub struct PlotTrace {
    samples: HistoryBuffer<PlotSample, PLOT_CAPACITY>,
    /// Profile time of the latest sample
    elapsed_s: f64,
    /// Visible x range (seconds)
    window_s: f64,
}

impl PlotTrace {
    pub fn new(window_s: u32) -> Self {
        Self {
            samples: HistoryBuffer::new(),
            elapsed_s: 0.0,
            window_s: f64::from(window_s.max(1)),
        }
    }

    /// Append a sample `dt` of active time after the previous one
    pub fn push(&mut self, dt: Duration, target: f32, feedback: f32) {
        self.elapsed_s += dt.as_secs_f64();
        self.samples.write(PlotSample {
            time_s: self.elapsed_s,
            target,
            feedback,
        });
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.elapsed_s = 0.0;
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.len() == 0
    }

    /// Samples oldest first
    pub fn samples(&self) -> impl Iterator<Item = &PlotSample> + '_ {
        self.samples.oldest_ordered()
    }

    /// Visible x range: the last `window_s` seconds, or `[0, window_s]`
    /// until that much time has passed
    pub fn x_bounds(&self) -> [f64; 2] {
        if self.elapsed_s > self.window_s {
            [self.elapsed_s - self.window_s, self.elapsed_s]
        } else {
            [0.0, self.window_s]
        }
    }

    /// Visible `(time, target)` points
    pub fn target_points(&self) -> Vec<(f64, f64)> {
        self.visible()
            .map(|sample| (sample.time_s, f64::from(sample.target)))
            .collect()
    }

    /// Visible `(time, feedback)` points
    pub fn feedback_points(&self) -> Vec<(f64, f64)> {
        self.visible()
            .map(|sample| (sample.time_s, f64::from(sample.feedback)))
            .collect()
    }

    fn visible(&self) -> impl Iterator<Item = &PlotSample> + '_ {
        let [start, _] = self.x_bounds();
        self.samples().filter(move |sample| sample.time_s >= start)
    }

    /// Sample closest in time to `time_s`
    pub fn nearest(&self, time_s: f64) -> Option<PlotSample> {
        self.samples()
            .min_by(|a, b| {
                let da = (a.time_s - time_s).abs();
                let db = (b.time_s - time_s).abs();
                da.total_cmp(&db)
            })
            .copied()
    }
}
