// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered, named animation steps with playback controls.
//!
//! A [`SequenceEngine`] owns a fixed list of [`AnimationStep`]s. Entering a
//! step fires `on_step_change` and then the step's own `on_start`; the step
//! completes after its duration (or on the next repaint signal if it has
//! none), firing its `on_complete`. While playing, completion waits out the
//! step's delay and then enters the next step, wrapping or finishing at the
//! end.
//!
//! Navigation is rejected while a step is in flight: the caller gets `false`
//! and nothing is queued.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::callback::{CallbackContext, run_guarded};
use crate::error::{CallbackResult, ConfigError};
use crate::host::{FALLBACK_FRAME_INTERVAL, Host, Wake, WakeSlot, Wakeable, next_frame};
use crate::time::{Duration, HostTime};
use crate::trace::{SequenceEvent, SequencePhase, StepEvent, StepPhase, TraceSink, Tracer};

type Hook = Box<dyn FnMut() -> CallbackResult>;
type StepChangeHook = Box<dyn FnMut(&AnimationStep, usize) -> CallbackResult>;

/// One named unit of a sequence.
pub struct AnimationStep {
    name: String,
    duration: Option<Duration>,
    delay: Option<Duration>,
    on_start: Option<Hook>,
    on_complete: Option<Hook>,
}

impl AnimationStep {
    /// A step with no duration, delay, or callbacks.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: None,
            delay: None,
            on_start: None,
            on_complete: None,
        }
    }

    /// Sets how long the step's transition runs.
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Sets the pause after this step before playback enters the next one.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the callback fired when the step is entered.
    #[must_use]
    pub fn on_start(mut self, f: impl FnMut() -> CallbackResult + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    /// Sets the callback fired when the step's transition finishes.
    #[must_use]
    pub fn on_complete(mut self, f: impl FnMut() -> CallbackResult + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// The step's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The step's transition duration, if set.
    #[must_use]
    pub fn transition_duration(&self) -> Option<Duration> {
        self.duration
    }

    /// The step's trailing delay, if set.
    #[must_use]
    pub fn trailing_delay(&self) -> Option<Duration> {
        self.delay
    }
}

impl fmt::Debug for AnimationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationStep")
            .field("name", &self.name)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Playback options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequenceConfig {
    /// Restart from the first step after the last one completes.
    pub looping: bool,
    /// Call [`SequenceEngine::play`] on construction.
    pub auto_start: bool,
}

/// Sequence-level observers.
#[derive(Default)]
pub struct SequenceHooks {
    on_sequence_start: Option<Hook>,
    on_sequence_complete: Option<Hook>,
    on_step_change: Option<StepChangeHook>,
}

impl SequenceHooks {
    /// Fired when `play` starts iterating.
    #[must_use]
    pub fn on_sequence_start(mut self, f: impl FnMut() -> CallbackResult + 'static) -> Self {
        self.on_sequence_start = Some(Box::new(f));
        self
    }

    /// Fired when iteration runs off the end without looping.
    #[must_use]
    pub fn on_sequence_complete(mut self, f: impl FnMut() -> CallbackResult + 'static) -> Self {
        self.on_sequence_complete = Some(Box::new(f));
        self
    }

    /// Fired with the new step and its index each time a step is entered,
    /// before the step's own `on_start`.
    #[must_use]
    pub fn on_step_change(
        mut self,
        f: impl FnMut(&AnimationStep, usize) -> CallbackResult + 'static,
    ) -> Self {
        self.on_step_change = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for SequenceHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceHooks")
            .field("on_sequence_start", &self.on_sequence_start.is_some())
            .field("on_sequence_complete", &self.on_sequence_complete.is_some())
            .field("on_step_change", &self.on_step_change.is_some())
            .finish()
    }
}

/// Snapshot of a sequence's position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState<'a> {
    /// Name of the current step; empty for an empty sequence.
    pub current: &'a str,
    /// Name of the step that was current before the last step change.
    pub previous: Option<&'a str>,
    /// Whether the current step's transition is in flight.
    pub is_animating: bool,
    /// Transition progress in `[0, 1]`.
    pub progress: f64,
    /// Transition duration of the current step.
    pub duration: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    StepComplete,
    Delay,
}

/// Plays a fixed list of named steps.
pub struct SequenceEngine<H: Host> {
    host: H,
    steps: Vec<AnimationStep>,
    config: SequenceConfig,
    hooks: SequenceHooks,
    index: usize,
    previous: Option<usize>,
    in_flight: bool,
    playing: bool,
    started_at: HostTime,
    progress: f64,
    duration: Duration,
    slot: WakeSlot,
    pending: Option<Pending>,
    tracer: Tracer,
}

impl<H: Host> SequenceEngine<H> {
    /// Creates an engine positioned at the first step.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateStep`] if two steps share a name.
    pub fn new(
        steps: Vec<AnimationStep>,
        config: SequenceConfig,
        hooks: SequenceHooks,
        host: H,
    ) -> Result<Self, ConfigError> {
        for (i, step) in steps.iter().enumerate() {
            if steps[..i].iter().any(|s| s.name == step.name) {
                return Err(ConfigError::DuplicateStep(step.name.clone()));
            }
        }

        let mut engine = Self {
            host,
            steps,
            config,
            hooks,
            index: 0,
            previous: None,
            in_flight: false,
            playing: false,
            started_at: HostTime::ZERO,
            progress: 0.0,
            duration: Duration::ZERO,
            slot: WakeSlot::new(),
            pending: None,
            tracer: Tracer::none(),
        };
        if config.auto_start {
            engine.play();
        }
        Ok(engine)
    }

    /// Enters the step at `index`.
    ///
    /// Returns `false` without effect if `index` is out of range or a step is
    /// in flight.
    pub fn go_to_step(&mut self, index: usize) -> bool {
        if index >= self.steps.len() || self.in_flight {
            return false;
        }
        self.begin_step(index);
        true
    }

    /// Enters the following step, wrapping when looping.
    ///
    /// From the last step without looping, stops playback and fires
    /// `on_sequence_complete`, leaving the current step in place.
    pub fn next(&mut self) -> bool {
        if self.steps.is_empty() {
            return false;
        }
        let next = self.index + 1;
        if next < self.steps.len() {
            self.go_to_step(next)
        } else if self.config.looping {
            self.go_to_step(0)
        } else {
            let at = self.host.now();
            self.finish(at);
            true
        }
    }

    /// Enters the preceding step. No-op on the first step.
    pub fn previous(&mut self) -> bool {
        match self.index.checked_sub(1) {
            Some(index) => self.go_to_step(index),
            None => false,
        }
    }

    /// Enters the step named `name`. No-op if there is none.
    pub fn jump_to(&mut self, name: &str) -> bool {
        match self.steps.iter().position(|s| s.name == name) {
            Some(index) => self.go_to_step(index),
            None => false,
        }
    }

    /// Starts iterating from the current step. No-op while playing.
    pub fn play(&mut self) {
        if self.playing || self.steps.is_empty() {
            return;
        }
        self.playing = true;
        let at = self.host.now();
        tracing::debug!(index = self.index, "sequence playing");
        self.tracer.sequence(&SequenceEvent {
            at,
            phase: SequencePhase::Start,
        });
        if let Some(hook) = &mut self.hooks.on_sequence_start {
            run_guarded(CallbackContext::SequenceStart, at, &mut self.tracer, || {
                hook()
            });
        }
        if !self.in_flight {
            self.begin_step(self.index);
        }
    }

    /// Halts playback and any in-flight step, keeping the current index.
    ///
    /// The interrupted step's `on_complete` does not fire.
    pub fn pause(&mut self) {
        if self.in_flight {
            self.progress = self.progress_at(self.host.now());
            self.in_flight = false;
        }
        self.playing = false;
        self.pending = None;
        self.slot.cancel(&mut self.host);
    }

    /// Halts and returns to the first step with no history.
    pub fn reset(&mut self) {
        self.pause();
        self.index = 0;
        self.previous = None;
        self.progress = 0.0;
        self.duration = Duration::ZERO;
    }

    /// Installs a trace sink.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// Snapshot of the current position and progress.
    #[must_use]
    pub fn state(&self) -> AnimationState<'_> {
        AnimationState {
            current: self.steps.get(self.index).map_or("", |s| s.name.as_str()),
            previous: self.previous.map(|i| self.steps[i].name.as_str()),
            is_animating: self.in_flight,
            progress: self.progress_at(self.host.now()),
            duration: self.duration,
        }
    }

    /// Index of the current step.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Returns `true` between `play` and completion, `pause`, or `reset`.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// The steps, in order.
    #[must_use]
    pub fn steps(&self) -> &[AnimationStep] {
        &self.steps
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if there are no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn progress_at(&self, now: HostTime) -> f64 {
        if !self.in_flight {
            return self.progress;
        }
        if self.duration.is_zero() {
            return 0.0;
        }
        now.saturating_duration_since(self.started_at)
            .fraction_of(self.duration)
    }

    fn begin_step(&mut self, index: usize) {
        let at = self.host.now();
        if index != self.index {
            self.previous = Some(self.index);
        }
        self.index = index;
        self.in_flight = true;
        self.started_at = at;
        self.progress = 0.0;

        let step = &mut self.steps[index];
        let duration = step.duration.unwrap_or(Duration::ZERO);
        self.duration = duration;
        tracing::debug!(index, step = step.name.as_str(), "sequence step started");
        self.tracer.step(&StepEvent {
            at,
            index,
            name: &step.name,
            phase: StepPhase::Start,
        });
        if let Some(hook) = &mut self.hooks.on_step_change {
            let entered = &*step;
            run_guarded(CallbackContext::StepChange, at, &mut self.tracer, || {
                hook(entered, index)
            });
        }
        if let Some(on_start) = &mut step.on_start {
            run_guarded(CallbackContext::StepStart, at, &mut self.tracer, || {
                on_start()
            });
        }

        let id = if duration.is_zero() {
            next_frame(&mut self.host, FALLBACK_FRAME_INTERVAL)
        } else {
            self.host.set_timeout(duration)
        };
        self.slot.arm(&mut self.host, id);
        self.pending = Some(Pending::StepComplete);
    }

    fn complete_step(&mut self, at: HostTime) {
        self.in_flight = false;
        self.progress = 1.0;

        let index = self.index;
        let step = &mut self.steps[index];
        let delay = step.delay.unwrap_or(Duration::ZERO);
        tracing::debug!(index, step = step.name.as_str(), "sequence step complete");
        self.tracer.step(&StepEvent {
            at,
            index,
            name: &step.name,
            phase: StepPhase::Complete,
        });
        if let Some(on_complete) = &mut step.on_complete {
            run_guarded(CallbackContext::StepComplete, at, &mut self.tracer, || {
                on_complete()
            });
        }

        if !self.playing {
            return;
        }
        if delay.is_zero() {
            self.advance_playback(at);
        } else {
            let id = self.host.set_timeout(delay);
            self.slot.arm(&mut self.host, id);
            self.pending = Some(Pending::Delay);
        }
    }

    fn advance_playback(&mut self, at: HostTime) {
        let next = self.index + 1;
        if next < self.steps.len() {
            self.begin_step(next);
        } else if self.config.looping {
            self.begin_step(0);
        } else {
            self.finish(at);
        }
    }

    fn finish(&mut self, at: HostTime) {
        self.playing = false;
        if self.pending == Some(Pending::Delay) {
            self.pending = None;
            self.slot.cancel(&mut self.host);
        }
        tracing::debug!(index = self.index, "sequence complete");
        self.tracer.sequence(&SequenceEvent {
            at,
            phase: SequencePhase::Complete,
        });
        if let Some(hook) = &mut self.hooks.on_sequence_complete {
            run_guarded(CallbackContext::SequenceComplete, at, &mut self.tracer, || {
                hook()
            });
        }
    }
}

impl<H: Host> Wakeable for SequenceEngine<H> {
    fn wake(&mut self, wake: Wake) {
        if !self.slot.take(&wake) {
            return;
        }
        match self.pending.take() {
            Some(Pending::StepComplete) => self.complete_step(wake.at),
            Some(Pending::Delay) => self.advance_playback(wake.at),
            None => {}
        }
    }
}

impl<H: Host> Drop for SequenceEngine<H> {
    fn drop(&mut self) {
        self.slot.cancel(&mut self.host);
    }
}

impl<H: Host> fmt::Debug for SequenceEngine<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceEngine")
            .field("steps", &self.steps)
            .field("config", &self.config)
            .field("index", &self.index)
            .field("in_flight", &self.in_flight)
            .field("playing", &self.playing)
            .finish_non_exhaustive()
    }
}
