// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records. Names and error messages are stored as
//! length-prefixed UTF-8. [`decode`] reads them back as an iterator of owned
//! [`RecordedEvent`]s.

use tuel_core::callback::CallbackContext;
use tuel_core::time::{Duration, HostTime};
use tuel_core::trace::{
    CallbackErrorEvent, FpsChangeEvent, SequenceEvent, SequencePhase, SkipEvent, StepEvent,
    StepPhase, TickEvent, TraceSink, TransitionPhase, VariantEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_TICK: u8 = 1;
const TAG_SKIP: u8 = 2;
const TAG_FPS_CHANGE: u8 = 3;
const TAG_STEP: u8 = 4;
const TAG_SEQUENCE: u8 = 5;
const TAG_VARIANT: u8 = 6;
const TAG_CALLBACK_ERROR: u8 = 7;

const CONTEXTS: [CallbackContext; 10] = [
    CallbackContext::Frame,
    CallbackContext::FpsChange,
    CallbackContext::SequenceStart,
    CallbackContext::SequenceComplete,
    CallbackContext::StepChange,
    CallbackContext::StepStart,
    CallbackContext::StepComplete,
    CallbackContext::VariantChange,
    CallbackContext::TransitionStart,
    CallbackContext::TransitionComplete,
];

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "recorded strings are names and messages, far below u32::MAX bytes"
        )]
        let len = s.len().min(u32::MAX as usize) as u32;
        self.buf.extend_from_slice(&len.to_le_bytes());
        self.buf.extend_from_slice(&s.as_bytes()[..len as usize]);
    }

    fn write_option_str(&mut self, s: Option<&str>) {
        match s {
            Some(s) => {
                self.write_u8(1);
                self.write_str(s);
            }
            None => self.write_u8(0),
        }
    }

    fn write_context(&mut self, context: CallbackContext) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "CONTEXTS has ten entries"
        )]
        let index = CONTEXTS.iter().position(|c| *c == context).unwrap_or(0) as u8;
        self.write_u8(index);
    }
}

impl TraceSink for RecorderSink {
    fn on_tick(&mut self, e: &TickEvent) {
        self.write_u8(TAG_TICK);
        self.write_u64(e.index);
        self.write_u64(e.at.ticks());
        self.write_u64(e.frame_time.ticks());
        self.write_f64(e.current_fps);
        self.write_f64(e.average_fps);
        self.write_u8(u8::from(e.dropped));
    }

    fn on_skip(&mut self, e: &SkipEvent) {
        self.write_u8(TAG_SKIP);
        self.write_u64(e.at.ticks());
        self.write_u64(e.since_accepted.ticks());
    }

    fn on_fps_change(&mut self, e: &FpsChangeEvent) {
        self.write_u8(TAG_FPS_CHANGE);
        self.write_u64(e.at.ticks());
        self.write_f64(e.from_fps);
        self.write_f64(e.to_fps);
    }

    fn on_step(&mut self, e: &StepEvent<'_>) {
        self.write_u8(TAG_STEP);
        self.write_u64(e.at.ticks());
        self.write_u64(e.index as u64);
        self.write_str(e.name);
        self.write_u8(match e.phase {
            StepPhase::Start => 0,
            StepPhase::Complete => 1,
        });
    }

    fn on_sequence(&mut self, e: &SequenceEvent) {
        self.write_u8(TAG_SEQUENCE);
        self.write_u64(e.at.ticks());
        self.write_u8(match e.phase {
            SequencePhase::Start => 0,
            SequencePhase::Complete => 1,
        });
    }

    fn on_variant(&mut self, e: &VariantEvent<'_>) {
        self.write_u8(TAG_VARIANT);
        self.write_u64(e.at.ticks());
        self.write_option_str(e.from);
        self.write_str(e.to);
        self.write_u8(match e.phase {
            TransitionPhase::Start => 0,
            TransitionPhase::Complete => 1,
        });
    }

    fn on_callback_error(&mut self, e: &CallbackErrorEvent<'_>) {
        self.write_u8(TAG_CALLBACK_ERROR);
        self.write_u64(e.at.ticks());
        self.write_context(e.context);
        self.write_str(e.error.message());
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`TickEvent`].
    Tick(TickEvent),
    /// A [`SkipEvent`].
    Skip(SkipEvent),
    /// A [`FpsChangeEvent`].
    FpsChange(FpsChangeEvent),
    /// A [`StepEvent`], with the name owned.
    Step {
        /// When it happened.
        at: HostTime,
        /// Step index.
        index: u64,
        /// Step name.
        name: String,
        /// Start or complete.
        phase: StepPhase,
    },
    /// A [`SequenceEvent`].
    Sequence(SequenceEvent),
    /// A [`VariantEvent`], with the names owned.
    Variant {
        /// When it happened.
        at: HostTime,
        /// Variant before the switch.
        from: Option<String>,
        /// Variant after the switch.
        to: String,
        /// Start or complete.
        phase: TransitionPhase,
    },
    /// A [`CallbackErrorEvent`], with the message owned.
    CallbackError {
        /// When it happened.
        at: HostTime,
        /// Which callback failed.
        context: CallbackContext,
        /// The error message.
        message: String,
    },
}

impl RecordedEvent {
    /// Timestamp of the event.
    #[must_use]
    pub fn at(&self) -> HostTime {
        match self {
            Self::Tick(e) => e.at,
            Self::Skip(e) => e.at,
            Self::FpsChange(e) => e.at,
            Self::Sequence(e) => e.at,
            Self::Step { at, .. } | Self::Variant { at, .. } | Self::CallbackError { at, .. } => {
                *at
            }
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn read_bytes(&mut self, n: usize) -> Option<&[u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.read_bytes(4)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.read_bytes(8)?.try_into().ok()?))
    }

    fn read_f64(&mut self) -> Option<f64> {
        Some(f64::from_le_bytes(self.read_bytes(8)?.try_into().ok()?))
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_string(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        String::from_utf8(self.read_bytes(len)?.to_vec()).ok()
    }

    fn read_option_string(&mut self) -> Option<Option<String>> {
        match self.read_u8()? {
            0 => Some(None),
            _ => self.read_string().map(Some),
        }
    }

    fn decode_tick(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Tick(TickEvent {
            index: self.read_u64()?,
            at: self.read_time()?,
            frame_time: Duration(self.read_u64()?),
            current_fps: self.read_f64()?,
            average_fps: self.read_f64()?,
            dropped: self.read_u8()? != 0,
        }))
    }

    fn decode_skip(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Skip(SkipEvent {
            at: self.read_time()?,
            since_accepted: Duration(self.read_u64()?),
        }))
    }

    fn decode_fps_change(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FpsChange(FpsChangeEvent {
            at: self.read_time()?,
            from_fps: self.read_f64()?,
            to_fps: self.read_f64()?,
        }))
    }

    fn decode_step(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Step {
            at: self.read_time()?,
            index: self.read_u64()?,
            name: self.read_string()?,
            phase: match self.read_u8()? {
                0 => StepPhase::Start,
                _ => StepPhase::Complete,
            },
        })
    }

    fn decode_sequence(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Sequence(SequenceEvent {
            at: self.read_time()?,
            phase: match self.read_u8()? {
                0 => SequencePhase::Start,
                _ => SequencePhase::Complete,
            },
        }))
    }

    fn decode_variant(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Variant {
            at: self.read_time()?,
            from: self.read_option_string()?,
            to: self.read_string()?,
            phase: match self.read_u8()? {
                0 => TransitionPhase::Start,
                _ => TransitionPhase::Complete,
            },
        })
    }

    fn decode_callback_error(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CallbackError {
            at: self.read_time()?,
            context: *CONTEXTS.get(usize::from(self.read_u8()?))?,
            message: self.read_string()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_TICK => self.decode_tick(),
            TAG_SKIP => self.decode_skip(),
            TAG_FPS_CHANGE => self.decode_fps_change(),
            TAG_STEP => self.decode_step(),
            TAG_SEQUENCE => self.decode_sequence(),
            TAG_VARIANT => self.decode_variant(),
            TAG_CALLBACK_ERROR => self.decode_callback_error(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
