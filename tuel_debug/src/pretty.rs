// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in milliseconds of host time.

use std::io::Write;

use tuel_core::trace::{
    CallbackErrorEvent, FpsChangeEvent, SequenceEvent, SequencePhase, SkipEvent, StepEvent,
    StepPhase, TickEvent, TraceSink, TransitionPhase, VariantEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    skips: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("skips", &self.skips)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            skips: false,
        }
    }

    /// Also print skipped repaint signals (one line per skip, noisy on fast
    /// displays).
    #[must_use]
    pub fn with_skips(mut self, skips: bool) -> Self {
        self.skips = skips;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_tick(&mut self, e: &TickEvent) {
        let dropped = if e.dropped { " DROPPED" } else { "" };
        let _ = writeln!(
            self.writer,
            "[tick] #{} at {:.3}ms frame={:.3}ms fps={:.1} avg={:.1}{dropped}",
            e.index,
            e.at.as_millis_f64(),
            e.frame_time.as_millis_f64(),
            e.current_fps,
            e.average_fps,
        );
    }

    fn on_skip(&mut self, e: &SkipEvent) {
        if !self.skips {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[skip] at {:.3}ms since={:.3}ms",
            e.at.as_millis_f64(),
            e.since_accepted.as_millis_f64(),
        );
    }

    fn on_fps_change(&mut self, e: &FpsChangeEvent) {
        let _ = writeln!(
            self.writer,
            "[fps] at {:.3}ms {:.1} -> {:.1}",
            e.at.as_millis_f64(),
            e.from_fps,
            e.to_fps,
        );
    }

    fn on_step(&mut self, e: &StepEvent<'_>) {
        let phase = match e.phase {
            StepPhase::Start => "start",
            StepPhase::Complete => "complete",
        };
        let _ = writeln!(
            self.writer,
            "[step:{phase}] #{} {} at {:.3}ms",
            e.index,
            e.name,
            e.at.as_millis_f64(),
        );
    }

    fn on_sequence(&mut self, e: &SequenceEvent) {
        let phase = match e.phase {
            SequencePhase::Start => "start",
            SequencePhase::Complete => "complete",
        };
        let _ = writeln!(
            self.writer,
            "[sequence:{phase}] at {:.3}ms",
            e.at.as_millis_f64()
        );
    }

    fn on_variant(&mut self, e: &VariantEvent<'_>) {
        let phase = match e.phase {
            TransitionPhase::Start => "start",
            TransitionPhase::Complete => "complete",
        };
        let _ = writeln!(
            self.writer,
            "[variant:{phase}] {} -> {} at {:.3}ms",
            e.from.unwrap_or("-"),
            e.to,
            e.at.as_millis_f64(),
        );
    }

    fn on_callback_error(&mut self, e: &CallbackErrorEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[error] {} at {:.3}ms: {}",
            e.context,
            e.at.as_millis_f64(),
            e.error,
        );
    }
}

#[cfg(test)]
mod tests {
    use tuel_core::callback::CallbackContext;
    use tuel_core::error::CallbackError;
    use tuel_core::time::{Duration, HostTime};

    use super::*;

    #[test]
    fn pretty_print_tick() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_tick(&TickEvent {
            index: 4,
            at: HostTime(66_668),
            frame_time: Duration(40_000),
            current_fps: 25.0,
            average_fps: 48.0,
            dropped: true,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.starts_with("[tick] #4"), "got: {output}");
        assert!(output.contains("frame=40.000ms"), "got: {output}");
        assert!(output.contains("DROPPED"), "got: {output}");
    }

    #[test]
    fn skips_are_opt_in() {
        let skip = SkipEvent {
            at: HostTime(1_000),
            since_accepted: Duration(500),
        };
        let mut quiet = PrettyPrintSink::with_writer(Vec::<u8>::new());
        quiet.on_skip(&skip);
        assert!(quiet.into_writer().is_empty(), "skips hidden by default");

        let mut noisy = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_skips(true);
        noisy.on_skip(&skip);
        let output = String::from_utf8(noisy.into_writer()).unwrap();
        assert!(output.contains("[skip]"), "got: {output}");
    }

    #[test]
    fn variant_and_error_lines() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_variant(&VariantEvent {
            at: HostTime(0),
            from: Some("light"),
            to: "dark",
            phase: TransitionPhase::Start,
        });
        sink.on_callback_error(&CallbackErrorEvent {
            at: HostTime(2_000),
            context: CallbackContext::StepStart,
            error: &CallbackError::new("missing element"),
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "[variant:start] light -> dark at 0.000ms");
        assert_eq!(
            lines[1],
            "[error] step on_start at 2.000ms: missing element"
        );
    }
}
