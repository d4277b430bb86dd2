// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Scheduler events land on thread 0, sequence steps on thread 1 (as
//! begin/end slices named after the step), and variant transitions on
//! thread 2.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use tuel_core::trace::{SequencePhase, StepPhase, TransitionPhase};

use crate::recorder::{RecordedEvent, decode};

const TID_SCHEDULER: u32 = 0;
const TID_SEQUENCE: u32 = 1;
const TID_VARIANT: u32 = 2;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Host time is already in microseconds, so timestamps pass through as-is.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        let ts = recorded.at().ticks();
        match recorded {
            RecordedEvent::Tick(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Tick",
                    "cat": "Scheduler",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_SCHEDULER,
                    "s": "t",
                    "args": {
                        "index": e.index,
                        "frame_time_ms": e.frame_time.as_millis_f64(),
                        "current_fps": e.current_fps,
                        "average_fps": e.average_fps,
                        "dropped": e.dropped,
                    }
                }));
            }
            RecordedEvent::Skip(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Skip",
                    "cat": "Scheduler",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_SCHEDULER,
                    "s": "t",
                    "args": {
                        "since_accepted_ms": e.since_accepted.as_millis_f64(),
                    }
                }));
            }
            RecordedEvent::FpsChange(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "TargetFps",
                    "cat": "Scheduler",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_SCHEDULER,
                    "args": {
                        "fps": e.to_fps,
                    }
                }));
            }
            RecordedEvent::Step { index, name, phase, .. } => {
                events.push(json!({
                    "ph": match phase {
                        StepPhase::Start => "B",
                        StepPhase::Complete => "E",
                    },
                    "name": name,
                    "cat": "Sequence",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_SEQUENCE,
                    "args": {
                        "index": index,
                    }
                }));
            }
            RecordedEvent::Sequence(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": match e.phase {
                        SequencePhase::Start => "SequenceStart",
                        SequencePhase::Complete => "SequenceComplete",
                    },
                    "cat": "Sequence",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_SEQUENCE,
                    "s": "t",
                }));
            }
            RecordedEvent::Variant { from, to, phase, .. } => {
                events.push(json!({
                    "ph": match phase {
                        TransitionPhase::Start => "B",
                        TransitionPhase::Complete => "E",
                    },
                    "name": to,
                    "cat": "Variant",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_VARIANT,
                    "args": {
                        "from": from,
                    }
                }));
            }
            RecordedEvent::CallbackError {
                context, message, ..
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "CallbackError",
                    "cat": "Error",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_SCHEDULER,
                    "s": "g",
                    "args": {
                        "context": context.as_str(),
                        "message": message,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}
