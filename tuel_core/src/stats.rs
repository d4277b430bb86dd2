// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-rate measurement.
//!
//! [`FrameWindow`] is a fixed-size ring buffer of recent frame times.
//! [`FrameStats`] is the consumer-visible summary the scheduler keeps current.

use crate::time::Duration;

/// Number of frame-time samples kept for the rolling average.
pub const FRAME_WINDOW: usize = 60;

/// A frame slower than this multiple of the target interval counts as dropped.
pub const DROP_FACTOR: f64 = 1.5;

/// Frame statistics, updated on every accepted tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Rate implied by the latest frame time.
    pub current_fps: f64,
    /// Rate implied by the mean of the last [`FRAME_WINDOW`] frame times.
    pub average_fps: f64,
    /// Milliseconds since the previous accepted tick.
    pub frame_time: f64,
    /// Accepted ticks whose frame time exceeded [`DROP_FACTOR`] × target.
    pub dropped: u64,
    /// Accepted ticks.
    pub total: u64,
}

/// Rolling window of the most recent frame times.
#[derive(Clone, Debug)]
pub struct FrameWindow<const N: usize = FRAME_WINDOW> {
    samples: [Duration; N],
    cursor: usize,
    len: usize,
    sum: u64,
}

impl<const N: usize> Default for FrameWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameWindow<N> {
    /// Creates an empty window.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            samples: [Duration::ZERO; N],
            cursor: 0,
            len: 0,
            sum: 0,
        }
    }

    /// Appends a sample, evicting the oldest once full.
    pub fn push(&mut self, sample: Duration) {
        if N == 0 {
            return;
        }
        if self.len == N {
            self.sum -= self.samples[self.cursor].ticks();
        } else {
            self.len += 1;
        }
        self.samples[self.cursor] = sample;
        self.sum += sample.ticks();
        self.cursor = (self.cursor + 1) % N;
    }

    /// Number of samples held.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no samples are held.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mean of the held samples, or `None` when empty.
    #[must_use]
    pub fn mean(&self) -> Option<Duration> {
        if self.len == 0 {
            return None;
        }
        Some(Duration(self.sum / self.len as u64))
    }

    /// Forgets every sample.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

/// Converts a frame time to frames per second. Zero maps to zero.
#[must_use]
pub fn fps_for(frame_time: Duration) -> f64 {
    let ms = frame_time.as_millis_f64();
    if ms > 0.0 { 1000.0 / ms } else { 0.0 }
}

/// Converts a rate to a frame interval.
#[must_use]
pub fn interval_for(fps: f64) -> Duration {
    Duration::from_millis_f64(1000.0 / fps)
}

impl FrameStats {
    /// Folds one accepted frame into the statistics.
    ///
    /// `window` must already contain `frame_time`.
    pub(crate) fn record<const N: usize>(
        &mut self,
        frame_time: Duration,
        window: &FrameWindow<N>,
        target_interval: Duration,
    ) -> bool {
        self.frame_time = frame_time.as_millis_f64();
        self.current_fps = fps_for(frame_time);
        self.average_fps = window.mean().map_or(0.0, fps_for);
        self.total += 1;
        let dropped = self.frame_time > target_interval.as_millis_f64() * DROP_FACTOR;
        if dropped {
            self.dropped += 1;
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_evicts_oldest() {
        let mut w = FrameWindow::<3>::new();
        assert_eq!(w.mean(), None, "empty window has no mean");
        w.push(Duration(10));
        w.push(Duration(20));
        w.push(Duration(30));
        assert_eq!(w.mean(), Some(Duration(20)));
        w.push(Duration(60));
        assert_eq!(w.len(), 3, "capacity respected");
        assert_eq!(w.mean(), Some(Duration(36)), "(20 + 30 + 60) / 3");
        w.clear();
        assert!(w.is_empty(), "cleared");
    }

    #[test]
    fn record_counts_drops() {
        let target = interval_for(60.0);
        let mut window = FrameWindow::<FRAME_WINDOW>::new();
        let mut stats = FrameStats::default();

        window.push(Duration::from_millis(16));
        assert!(
            !stats.record(Duration::from_millis(16), &window, target),
            "on time"
        );
        window.push(Duration::from_millis(40));
        assert!(
            stats.record(Duration::from_millis(40), &window, target),
            "40ms > 1.5 * 16.67ms"
        );

        assert_eq!(stats.total, 2);
        assert_eq!(stats.dropped, 1);
        assert!((stats.current_fps - 25.0).abs() < 1e-9, "1000 / 40");
        assert!((stats.average_fps - 1000.0 / 28.0).abs() < 1e-9, "mean 28ms");
        assert!((stats.frame_time - 40.0).abs() < 1e-9);
    }

    #[test]
    fn rate_conversions() {
        assert_eq!(interval_for(60.0), Duration(16_666));
        assert!((fps_for(Duration(20_000)) - 50.0).abs() < 1e-9);
        assert!(fps_for(Duration::ZERO).abs() < f64::EPSILON, "zero frame time");
    }
}
