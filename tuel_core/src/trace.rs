// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics events for the frame loop and the animation state machines.
//!
//! This module provides a [`TraceSink`] trait with one method per event kind.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! Each component owns a [`Tracer`]. When the `trace` feature is **off**, every
//! `Tracer` method compiles to nothing and installing a sink just drops it.
//! When **on**, each method performs a single `Option` branch before
//! dispatching.
//!
//! Logging through `tracing` happens regardless of this feature; sinks are for
//! consumers that want typed events (recorders, on-screen HUDs, the browser
//! console).

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use crate::callback::CallbackContext;
use crate::error::CallbackError;
use crate::time::{Duration, HostTime};

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted on every accepted scheduler tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickEvent {
    /// Accepted tick count, including this one.
    pub index: u64,
    /// Repaint timestamp.
    pub at: HostTime,
    /// Time since the previous accepted tick.
    pub frame_time: Duration,
    /// Rate implied by `frame_time`.
    pub current_fps: f64,
    /// Rate implied by the rolling frame-time mean.
    pub average_fps: f64,
    /// Whether this tick counted as a dropped frame.
    pub dropped: bool,
}

/// Emitted when a repaint signal arrives before the target interval elapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkipEvent {
    /// Repaint timestamp.
    pub at: HostTime,
    /// Time since the last accepted tick.
    pub since_accepted: Duration,
}

/// Emitted when adaptive mode retargets the frame interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FpsChangeEvent {
    /// When the change happened.
    pub at: HostTime,
    /// Effective target before the change.
    pub from_fps: f64,
    /// Effective target after the change.
    pub to_fps: f64,
}

/// Lifecycle point of a sequence step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepPhase {
    /// The step became current and started animating.
    Start,
    /// The step's transition finished.
    Complete,
}

/// Emitted when a sequence step starts or completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepEvent<'a> {
    /// When it happened.
    pub at: HostTime,
    /// Index of the step.
    pub index: usize,
    /// Name of the step.
    pub name: &'a str,
    /// Start or complete.
    pub phase: StepPhase,
}

/// Lifecycle point of a whole sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SequencePhase {
    /// `play` began iterating.
    Start,
    /// Iteration ran off the end without looping.
    Complete,
}

/// Emitted when a sequence starts playing or completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceEvent {
    /// When it happened.
    pub at: HostTime,
    /// Start or complete.
    pub phase: SequencePhase,
}

/// Lifecycle point of a variant transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionPhase {
    /// The active variant switched and progress began.
    Start,
    /// Progress reached 1.
    Complete,
}

/// Emitted when a variant transition starts or completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantEvent<'a> {
    /// When it happened.
    pub at: HostTime,
    /// Variant before the switch, if any.
    pub from: Option<&'a str>,
    /// Variant after the switch.
    pub to: &'a str,
    /// Start or complete.
    pub phase: TransitionPhase,
}

/// Emitted when a consumer callback fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallbackErrorEvent<'a> {
    /// When it happened.
    pub at: HostTime,
    /// Which callback.
    pub context: CallbackContext,
    /// What it returned.
    pub error: &'a CallbackError,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from TUEL components.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called on every accepted scheduler tick.
    fn on_tick(&mut self, e: &TickEvent) {
        _ = e;
    }

    /// Called when a repaint signal is skipped.
    fn on_skip(&mut self, e: &SkipEvent) {
        _ = e;
    }

    /// Called when adaptive mode changes the target rate.
    fn on_fps_change(&mut self, e: &FpsChangeEvent) {
        _ = e;
    }

    /// Called when a sequence step starts or completes.
    fn on_step(&mut self, e: &StepEvent<'_>) {
        _ = e;
    }

    /// Called when a sequence starts or completes.
    fn on_sequence(&mut self, e: &SequenceEvent) {
        _ = e;
    }

    /// Called when a variant transition starts or completes.
    fn on_variant(&mut self, e: &VariantEvent<'_>) {
        _ = e;
    }

    /// Called when a consumer callback fails.
    fn on_callback_error(&mut self, e: &CallbackErrorEvent<'_>) {
        _ = e;
    }
}

/// Shared sinks, so the caller can keep a handle after installing one.
impl<S: TraceSink + ?Sized> TraceSink for Rc<RefCell<S>> {
    fn on_tick(&mut self, e: &TickEvent) {
        self.borrow_mut().on_tick(e);
    }

    fn on_skip(&mut self, e: &SkipEvent) {
        self.borrow_mut().on_skip(e);
    }

    fn on_fps_change(&mut self, e: &FpsChangeEvent) {
        self.borrow_mut().on_fps_change(e);
    }

    fn on_step(&mut self, e: &StepEvent<'_>) {
        self.borrow_mut().on_step(e);
    }

    fn on_sequence(&mut self, e: &SequenceEvent) {
        self.borrow_mut().on_sequence(e);
    }

    fn on_variant(&mut self, e: &VariantEvent<'_>) {
        self.borrow_mut().on_variant(e);
    }

    fn on_callback_error(&mut self, e: &CallbackErrorEvent<'_>) {
        self.borrow_mut().on_callback_error(e);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Owned wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            drop(sink);
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns `true` if events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`TickEvent`].
    #[inline]
    pub fn tick(&mut self, e: &TickEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_tick(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SkipEvent`].
    #[inline]
    pub fn skip(&mut self, e: &SkipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_skip(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FpsChangeEvent`].
    #[inline]
    pub fn fps_change(&mut self, e: &FpsChangeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_fps_change(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`StepEvent`].
    #[inline]
    pub fn step(&mut self, e: &StepEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_step(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SequenceEvent`].
    #[inline]
    pub fn sequence(&mut self, e: &SequenceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_sequence(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`VariantEvent`].
    #[inline]
    pub fn variant(&mut self, e: &VariantEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_variant(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CallbackErrorEvent`].
    #[inline]
    pub fn callback_error(&mut self, e: &CallbackErrorEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_callback_error(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
