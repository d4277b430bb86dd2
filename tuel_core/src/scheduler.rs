// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Repaint-synchronised frame loop with adaptive frame-rate targeting.
//!
//! The [`FrameScheduler`] re-arms itself on every repaint signal while
//! running. A signal that arrives before the target interval has elapsed is
//! skipped; otherwise the tick is accepted, [`FrameStats`] are updated, and
//! every registered callback runs in registration order with the elapsed
//! time. See the [`FrameScheduler`] struct docs for the adaptive behavior.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::callback::{CallbackContext, run_guarded};
use crate::error::{CallbackResult, ConfigError};
use crate::host::{Host, Wake, WakeSlot, Wakeable, next_frame};
use crate::stats::{FRAME_WINDOW, FrameStats, FrameWindow, fps_for, interval_for};
use crate::time::{Duration, HostTime};
use crate::trace::{FpsChangeEvent, SkipEvent, TickEvent, TraceSink, Tracer};

/// Below this fraction of the effective target, the loop counts as slow.
pub const ADAPT_SLOW_RATIO: f64 = 0.8;

/// Above this fraction of the effective target, the host has headroom.
pub const ADAPT_FAST_RATIO: f64 = 1.1;

/// Fractional change applied to the interval per adjustment.
pub const ADAPT_STEP: f64 = 0.1;

/// Consecutive accepted ticks a condition must hold before an adjustment.
pub const ADAPT_PATIENCE: u32 = 3;

/// Configuration for the [`FrameScheduler`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSchedulerConfig {
    /// Requested frame rate.
    pub target_fps: f64,
    /// Whether to retarget the interval when throughput diverges.
    pub adaptive: bool,
    /// Lowest rate adaptation may relax to.
    pub min_fps: f64,
    /// Highest rate the target may be set to.
    pub max_fps: f64,
}

impl Default for FrameSchedulerConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            adaptive: true,
            min_fps: 15.0,
            max_fps: 120.0,
        }
    }
}

impl FrameSchedulerConfig {
    /// A non-adaptive configuration at `target_fps` with default bounds.
    #[must_use]
    pub fn fixed(target_fps: f64) -> Self {
        Self {
            target_fps,
            adaptive: false,
            ..Self::default()
        }
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a non-positive or non-finite target or
    /// bound, or for `min_fps > max_fps`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.target_fps.is_finite() || self.target_fps <= 0.0 {
            return Err(ConfigError::InvalidTargetFps(self.target_fps));
        }
        let bounds_ok = |fps: f64| fps.is_finite() && fps > 0.0;
        if !bounds_ok(self.min_fps) || !bounds_ok(self.max_fps) {
            return Err(ConfigError::InvalidFpsBounds {
                min: self.min_fps,
                max: self.max_fps,
            });
        }
        if self.min_fps > self.max_fps {
            return Err(ConfigError::InvertedFpsBounds {
                min: self.min_fps,
                max: self.max_fps,
            });
        }
        Ok(())
    }
}

/// Handle returned by [`FrameScheduler::add_callback`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallbackKey(u64);

type FrameCallback = Box<dyn FnMut(Duration) -> CallbackResult>;
type FpsChangeHook = Box<dyn FnMut(f64) -> CallbackResult>;

/// Repaint-driven tick loop that measures and adapts its frame rate.
///
/// # Ticks
///
/// Each repaint signal carries a timestamp. If less than the target interval
/// has passed since the last accepted tick, the signal is skipped and the
/// loop re-arms with no other state change. Otherwise the tick is accepted:
/// stats are updated, callbacks run in registration order, and the accepted
/// timestamp advances. A callback that fails is reported and skipped; the
/// remaining callbacks still run.
///
/// # Adaptive behavior
///
/// With [`FrameSchedulerConfig::adaptive`] set, the scheduler relaxes its
/// interval by [`ADAPT_STEP`] after [`ADAPT_PATIENCE`] consecutive accepted
/// ticks where both the tick rate and the repaint signal rate sit below
/// [`ADAPT_SLOW_RATIO`] of the effective target, never past the interval
/// implied by `min_fps`. While the interval is relaxed, repaint signals that
/// arrive faster than [`ADAPT_FAST_RATIO`] of the effective target, or closer
/// together than the interval itself, count as headroom; after as many such
/// ticks the interval tightens by the same step, snapping to the requested
/// target (itself within `max_fps`) rather than passing it. Each adjustment
/// fires the [`on_fps_change`](Self::on_fps_change) hook with the new
/// effective rate.
///
/// Skipped signals cannot push throughput above the target, so headroom is
/// measured from raw signal spacing rather than accepted ticks.
///
/// # Usage
///
/// ```rust,ignore
/// let mut sched = FrameScheduler::new(FrameSchedulerConfig::default(), host)?;
/// let key = sched.add_callback(|elapsed| { draw(elapsed); Ok(()) });
/// sched.start();
/// // host event loop: sched.wake(wake) for each delivered wake
/// sched.remove_callback(key);
/// ```
pub struct FrameScheduler<H: Host> {
    host: H,
    config: FrameSchedulerConfig,
    requested_fps: f64,
    interval: Duration,
    min_interval: Duration,
    max_interval: Duration,
    slot: WakeSlot,
    running: bool,
    last_accepted: HostTime,
    last_signal: Option<HostTime>,
    window: FrameWindow<FRAME_WINDOW>,
    stats: FrameStats,
    callbacks: Vec<(CallbackKey, FrameCallback)>,
    next_key: u64,
    on_fps_change: Option<FpsChangeHook>,
    slow_streak: u32,
    fast_streak: u32,
    tracer: Tracer,
}

impl<H: Host> FrameScheduler<H> {
    /// Creates a stopped scheduler.
    ///
    /// A target outside `[min_fps, max_fps]` is clamped into it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails
    /// [`validate`](FrameSchedulerConfig::validate).
    pub fn new(config: FrameSchedulerConfig, host: H) -> Result<Self, ConfigError> {
        config.validate()?;

        let capabilities = host.capabilities();
        if !capabilities.repaint_signal {
            tracing::info!("host has no repaint signal; frame scheduler uses timer fallback");
        }
        if !capabilities.monotonic_clock {
            tracing::info!("host clock is not monotonic; backwards jumps re-baseline the loop");
        }

        // Equal bounds can round past each other by a microsecond.
        let min_interval = ceil_interval(config.max_fps);
        let max_interval = interval_for(config.min_fps).max(min_interval);
        let requested_fps = config.target_fps.clamp(config.min_fps, config.max_fps);
        let mut sched = Self {
            host,
            config,
            requested_fps,
            interval: Duration::ZERO,
            min_interval,
            max_interval,
            slot: WakeSlot::new(),
            running: false,
            last_accepted: HostTime::ZERO,
            last_signal: None,
            window: FrameWindow::new(),
            stats: FrameStats::default(),
            callbacks: Vec::new(),
            next_key: 0,
            on_fps_change: None,
            slow_streak: 0,
            fast_streak: 0,
            tracer: Tracer::none(),
        };
        sched.interval = sched.requested_interval();
        Ok(sched)
    }

    /// Starts the loop. No-op if already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_accepted = self.host.now();
        self.last_signal = None;
        self.arm();
        tracing::debug!(target_fps = self.target_fps(), "frame scheduler started");
    }

    /// Stops the loop and cancels the pending wake. No-op if stopped.
    ///
    /// No callback fires after this returns, even if the host already queued
    /// a repaint signal.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.slot.cancel(&mut self.host);
        tracing::debug!(total = self.stats.total, "frame scheduler stopped");
    }

    /// Stops the loop and forgets all measurements.
    ///
    /// The effective interval returns to the requested target.
    pub fn reset(&mut self) {
        self.stop();
        self.stats = FrameStats::default();
        self.window.clear();
        self.last_signal = None;
        self.slow_streak = 0;
        self.fast_streak = 0;
        self.interval = self.requested_interval();
    }

    /// Registers `callback` to run on every accepted tick with the elapsed
    /// time since the previous accepted tick.
    pub fn add_callback(
        &mut self,
        callback: impl FnMut(Duration) -> CallbackResult + 'static,
    ) -> CallbackKey {
        self.next_key += 1;
        let key = CallbackKey(self.next_key);
        self.callbacks.push((key, Box::new(callback)));
        key
    }

    /// Deregisters a callback. Returns `false` if it was already removed.
    pub fn remove_callback(&mut self, key: CallbackKey) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(k, _)| *k != key);
        self.callbacks.len() != before
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Sets the hook fired with the new effective rate after each adaptive
    /// adjustment.
    pub fn on_fps_change(&mut self, hook: impl FnMut(f64) -> CallbackResult + 'static) {
        self.on_fps_change = Some(Box::new(hook));
    }

    /// Installs a trace sink.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// Requests a new target rate, clamped to `[min_fps, max_fps]`.
    ///
    /// Takes effect on the next repaint signal. NaN is ignored.
    pub fn set_target_fps(&mut self, fps: f64) {
        if fps.is_nan() {
            tracing::warn!("ignoring NaN target fps");
            return;
        }
        self.requested_fps = fps.clamp(self.config.min_fps, self.config.max_fps);
        self.interval = self.requested_interval();
        self.slow_streak = 0;
        self.fast_streak = 0;
        tracing::debug!(requested = self.requested_fps, "target fps set");
    }

    /// Returns `true` while the loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Effective target rate (after adaptation).
    #[must_use]
    pub fn target_fps(&self) -> f64 {
        fps_for(self.interval)
    }

    /// Requested target rate (after clamping).
    #[must_use]
    pub fn requested_fps(&self) -> f64 {
        self.requested_fps
    }

    /// Effective target interval.
    #[must_use]
    pub fn target_interval(&self) -> Duration {
        self.interval
    }

    /// The configuration this scheduler was built with.
    #[must_use]
    pub fn config(&self) -> &FrameSchedulerConfig {
        &self.config
    }

    /// The host this scheduler runs against.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    fn requested_interval(&self) -> Duration {
        interval_for(self.requested_fps).clamp(self.min_interval, self.max_interval)
    }

    fn arm(&mut self) {
        let id = next_frame(&mut self.host, self.interval);
        self.slot.arm(&mut self.host, id);
    }

    fn on_signal(&mut self, at: HostTime) {
        let spacing = self.last_signal.map(|prev| at.saturating_duration_since(prev));
        self.last_signal = Some(at);

        if at < self.last_accepted {
            tracing::debug!(
                at_ms = at.as_millis_f64(),
                "repaint timestamp went backwards; re-baselining"
            );
            self.last_accepted = at;
            return;
        }

        let elapsed = at.saturating_duration_since(self.last_accepted);
        if elapsed < self.interval {
            self.tracer.skip(&SkipEvent {
                at,
                since_accepted: elapsed,
            });
            return;
        }

        self.window.push(elapsed);
        let dropped = self.stats.record(elapsed, &self.window, self.interval);
        self.tracer.tick(&TickEvent {
            index: self.stats.total,
            at,
            frame_time: elapsed,
            current_fps: self.stats.current_fps,
            average_fps: self.stats.average_fps,
            dropped,
        });

        for (_, callback) in &mut self.callbacks {
            run_guarded(CallbackContext::Frame, at, &mut self.tracer, || {
                callback(elapsed)
            });
        }

        self.last_accepted = at;
        if self.config.adaptive {
            self.adapt(at, spacing);
        }
    }

    fn adapt(&mut self, at: HostTime, spacing: Option<Duration>) {
        let effective = fps_for(self.interval);
        let current = self.stats.current_fps;
        let signal_fps = spacing.map_or(current, fps_for);
        let requested = self.requested_interval();
        // A relaxed interval that signals outpace makes the loop skip them.
        let headroom = signal_fps > effective * ADAPT_FAST_RATIO
            || spacing.is_some_and(|spacing| spacing < self.interval);

        // Skips alias the accepted rate, so only a slow host counts as slow.
        let slow = current < effective * ADAPT_SLOW_RATIO
            && signal_fps < effective * ADAPT_SLOW_RATIO;
        if slow {
            self.slow_streak += 1;
            self.fast_streak = 0;
        } else if headroom && self.interval > requested {
            self.fast_streak += 1;
            self.slow_streak = 0;
        } else {
            self.slow_streak = 0;
            self.fast_streak = 0;
        }

        let next = if self.slow_streak >= ADAPT_PATIENCE && self.interval < self.max_interval {
            let relaxed =
                Duration::from_millis_f64(self.interval.as_millis_f64() * (1.0 + ADAPT_STEP));
            relaxed.min(self.max_interval)
        } else if self.fast_streak >= ADAPT_PATIENCE && self.interval > requested {
            let tightened =
                Duration::from_millis_f64(self.interval.as_millis_f64() * (1.0 - ADAPT_STEP));
            tightened.max(requested)
        } else {
            return;
        };

        self.slow_streak = 0;
        self.fast_streak = 0;
        let from_fps = effective;
        self.interval = next;
        let to_fps = fps_for(next);
        tracing::debug!(from_fps, to_fps, "adaptive frame rate retarget");
        self.tracer.fps_change(&FpsChangeEvent {
            at,
            from_fps,
            to_fps,
        });
        if let Some(hook) = &mut self.on_fps_change {
            run_guarded(CallbackContext::FpsChange, at, &mut self.tracer, || {
                hook(to_fps)
            });
        }
    }
}

impl<H: Host> Wakeable for FrameScheduler<H> {
    fn wake(&mut self, wake: Wake) {
        if !self.slot.take(&wake) || !self.running {
            return;
        }
        self.on_signal(wake.at);
        self.arm();
    }
}

impl<H: Host> Drop for FrameScheduler<H> {
    fn drop(&mut self) {
        self.slot.cancel(&mut self.host);
    }
}

impl<H: Host> fmt::Debug for FrameScheduler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("config", &self.config)
            .field("running", &self.running)
            .field("interval", &self.interval)
            .field("stats", &self.stats)
            .field("callbacks", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}

/// Smallest interval whose rate does not exceed `fps`.
fn ceil_interval(fps: f64) -> Duration {
    let interval = interval_for(fps);
    if fps_for(interval) > fps {
        interval + Duration(1)
    } else {
        interval
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::{Cell, RefCell};

    use super::*;
    use crate::host::Capabilities;
    use crate::manual::ManualHost;

    fn fixed_60(host: &ManualHost) -> FrameScheduler<ManualHost> {
        FrameScheduler::new(FrameSchedulerConfig::fixed(60.0), host.clone()).unwrap()
    }

    fn counter(sched: &mut FrameScheduler<ManualHost>) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        sched.add_callback(move |_| {
            c.set(c.get() + 1);
            Ok(())
        });
        count
    }

    #[test]
    fn config_validation() {
        let bad_target = FrameSchedulerConfig {
            target_fps: 0.0,
            ..FrameSchedulerConfig::default()
        };
        assert_eq!(
            bad_target.validate(),
            Err(ConfigError::InvalidTargetFps(0.0))
        );

        let inverted = FrameSchedulerConfig {
            min_fps: 90.0,
            max_fps: 30.0,
            ..FrameSchedulerConfig::default()
        };
        assert!(matches!(
            FrameScheduler::new(inverted, ManualHost::new()),
            Err(ConfigError::InvertedFpsBounds { .. })
        ));

        let nan_bound = FrameSchedulerConfig {
            max_fps: f64::NAN,
            ..FrameSchedulerConfig::default()
        };
        assert!(matches!(
            nan_bound.validate(),
            Err(ConfigError::InvalidFpsBounds { .. })
        ));
        assert!(FrameSchedulerConfig::default().validate().is_ok());
    }

    #[test]
    fn target_is_clamped_at_construction() {
        let config = FrameSchedulerConfig {
            target_fps: 500.0,
            ..FrameSchedulerConfig::default()
        };
        let sched = FrameScheduler::new(config, ManualHost::new()).unwrap();
        assert!((sched.requested_fps() - 120.0).abs() < 1e-9, "clamped to max");
        assert!(sched.target_fps() <= 120.0, "interval rounds toward the bound");
    }

    #[test]
    fn early_signals_are_skipped() {
        let host = ManualHost::new();
        host.set_frame_interval(Duration::from_millis(10));
        let mut sched = FrameScheduler::new(FrameSchedulerConfig::fixed(30.0), host.clone())
            .unwrap();
        let count = counter(&mut sched);
        sched.start();

        // Boundaries at 10, 20, ..., 100ms; a 33.3ms interval accepts 40 and 80.
        host.advance(Duration::from_millis(100), &mut [&mut sched]);
        assert_eq!(count.get(), 2, "only signals past the interval are accepted");
        assert_eq!(sched.stats().total, 2);
        assert!((sched.stats().frame_time - 40.0).abs() < 1e-9, "40 → 80");
    }

    #[test]
    fn callbacks_run_in_registration_order_and_survive_failures() {
        let host = ManualHost::new();
        let mut sched = fixed_60(&host);
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = Rc::clone(&order);
        sched.add_callback(move |_| {
            o.borrow_mut().push("a");
            Err("a failed".into())
        });
        let o = Rc::clone(&order);
        sched.add_callback(move |_| {
            o.borrow_mut().push("b");
            Ok(())
        });

        sched.start();
        host.frame(&mut [&mut sched]);
        host.frame(&mut [&mut sched]);

        assert_eq!(*order.borrow(), vec!["a", "b", "a", "b"]);
        assert!(sched.is_running(), "failure does not stop the loop");
    }

    #[test]
    fn removed_callback_stops_firing() {
        let host = ManualHost::new();
        let mut sched = fixed_60(&host);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let key = sched.add_callback(move |_| {
            c.set(c.get() + 1);
            Ok(())
        });

        sched.start();
        host.frame(&mut [&mut sched]);
        assert!(sched.remove_callback(key), "first removal succeeds");
        assert!(!sched.remove_callback(key), "second removal is a no-op");
        host.frame(&mut [&mut sched]);

        assert_eq!(count.get(), 1);
        assert_eq!(sched.callback_count(), 0);
    }

    #[test]
    fn reset_zeroes_stats_and_stops() {
        let host = ManualHost::new();
        let mut sched = fixed_60(&host);
        sched.start();
        host.advance(Duration::from_millis(100), &mut [&mut sched]);
        assert!(sched.stats().total > 0, "ticks accumulated");

        sched.reset();
        assert!(!sched.is_running(), "reset stops");
        assert_eq!(*sched.stats(), FrameStats::default());
        assert!(host.is_idle(), "pending wake cancelled");
    }

    #[test]
    fn set_target_fps_clamps_and_applies_without_restart() {
        let host = ManualHost::new();
        let mut sched = fixed_60(&host);
        sched.start();

        sched.set_target_fps(5.0);
        assert!((sched.requested_fps() - 15.0).abs() < 1e-9, "clamped to min");
        sched.set_target_fps(1_000.0);
        assert!((sched.requested_fps() - 120.0).abs() < 1e-9, "clamped to max");
        sched.set_target_fps(f64::NAN);
        assert!((sched.requested_fps() - 120.0).abs() < 1e-9, "NaN ignored");
        assert!(sched.is_running(), "still running");
    }

    #[test]
    fn slow_host_relaxes_interval_down_to_min_fps() {
        let host = ManualHost::new();
        // The host only manages 10 repaints per second.
        host.set_frame_interval(Duration::from_millis(100));
        let mut sched = FrameScheduler::new(FrameSchedulerConfig::default(), host.clone())
            .unwrap();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let c = Rc::clone(&changes);
        sched.on_fps_change(move |fps| {
            c.borrow_mut().push(fps);
            Ok(())
        });

        sched.start();
        host.advance(Duration::from_millis(10_000), &mut [&mut sched]);

        let changes = changes.borrow();
        assert!(!changes.is_empty(), "adaptation fired");
        assert!(
            changes.windows(2).all(|w| w[1] < w[0]),
            "each change relaxes the rate: {changes:?}"
        );
        assert!(
            (sched.target_fps() - 15.0).abs() < 0.01,
            "settles at min_fps, got {}",
            sched.target_fps()
        );
        assert!(sched.target_fps() >= 15.0, "never below min_fps");
    }

    #[test]
    fn headroom_tightens_back_to_requested() {
        let host = ManualHost::new();
        host.set_frame_interval(Duration::from_millis(50));
        let mut sched = FrameScheduler::new(FrameSchedulerConfig::default(), host.clone())
            .unwrap();
        sched.start();
        host.advance(Duration::from_millis(3_000), &mut [&mut sched]);
        let relaxed = sched.target_fps();
        assert!(relaxed < 50.0, "relaxed under a 20 Hz host, got {relaxed}");

        // The host speeds back up to 60 Hz.
        host.set_frame_interval(Duration::from_micros(16_667));
        host.advance(Duration::from_millis(5_000), &mut [&mut sched]);
        assert_eq!(
            sched.target_interval(),
            interval_for(60.0),
            "tightened back to the requested target"
        );

        let count = counter(&mut sched);
        host.advance(Duration::from_millis(1_000), &mut [&mut sched]);
        assert!(
            count.get() >= 59,
            "every repaint accepted again, got {}",
            count.get()
        );
    }

    #[test]
    fn interval_just_above_host_rate_still_recovers() {
        let host = ManualHost::new();
        let mut sched = FrameScheduler::new(FrameSchedulerConfig::default(), host.clone())
            .unwrap();
        // One relaxation step short of the host's 60 Hz: every other repaint
        // would be skipped forever if headroom needed a 10 % margin.
        sched.interval = Duration(16_742);
        let count = counter(&mut sched);
        sched.start();

        host.advance(Duration::from_millis(1_000), &mut [&mut sched]);
        assert_eq!(sched.target_interval(), interval_for(60.0), "snapped to target");

        count.set(0);
        host.advance(Duration::from_millis(1_000), &mut [&mut sched]);
        assert!(count.get() >= 59, "full rate, got {}", count.get());
    }

    #[test]
    fn equal_fps_bounds_construct_and_tick() {
        for fps in [60.0, 30.0] {
            let config = FrameSchedulerConfig {
                target_fps: fps,
                adaptive: true,
                min_fps: fps,
                max_fps: fps,
            };
            assert!(config.validate().is_ok(), "{fps}/{fps} is a valid config");

            let host = ManualHost::new();
            let mut sched = FrameScheduler::new(config, host.clone()).unwrap();
            assert!(
                (sched.target_fps() - fps).abs() < 0.01,
                "within a microsecond of {fps}, got {}",
                sched.target_fps()
            );

            let count = counter(&mut sched);
            sched.set_target_fps(fps * 2.0);
            sched.start();
            host.advance(Duration::from_millis(500), &mut [&mut sched]);
            assert!(count.get() > 0, "{fps} fps loop ticks");
        }
    }

    /// Holds wakes so the test can redeliver them with another timestamp.
    #[derive(Default)]
    struct Held(Vec<Wake>);

    impl Wakeable for Held {
        fn wake(&mut self, wake: Wake) {
            self.0.push(wake);
        }
    }

    #[test]
    fn backwards_timestamp_rebaselines_without_ticking() {
        let host = ManualHost::with_capabilities(Capabilities {
            repaint_signal: true,
            monotonic_clock: false,
        });
        host.advance(Duration::from_millis(100), &mut []);
        let mut sched = fixed_60(&host);
        let count = counter(&mut sched);
        sched.start();

        let mut held = Held::default();
        host.frame(&mut [&mut held]);
        let wake = held.0[0];
        sched.wake(Wake {
            at: HostTime(50_000),
            ..wake
        });
        assert_eq!(count.get(), 0, "no callback for a backwards timestamp");
        assert_eq!(sched.stats().total, 0, "no tick recorded");
        assert_eq!(host.pending(), 1, "loop re-armed");

        host.frame(&mut [&mut sched]);
        assert_eq!(count.get(), 1);
        assert!(
            (sched.stats().frame_time - (host.now().as_millis_f64() - 50.0)).abs() < 1e-9,
            "measured from the new baseline"
        );
    }

    #[test]
    fn fixed_mode_never_adapts() {
        let host = ManualHost::new();
        host.set_frame_interval(Duration::from_millis(100));
        let mut sched = fixed_60(&host);
        sched.start();
        host.advance(Duration::from_millis(2_000), &mut [&mut sched]);
        assert_eq!(sched.target_interval(), interval_for(60.0));
        assert!(sched.stats().dropped > 0, "slow frames counted as dropped");
    }

    #[test]
    fn timer_fallback_without_repaint_signal() {
        let host = ManualHost::with_capabilities(Capabilities::DEGRADED);
        let mut sched = fixed_60(&host);
        let count = counter(&mut sched);
        sched.start();
        host.advance(Duration::from_millis(100), &mut [&mut sched]);
        // Timers at the 16.666ms interval: 6 fit in 100ms.
        assert_eq!(count.get(), 6, "ticks driven by fallback timers");
    }

    #[test]
    fn dropping_cancels_pending_wake() {
        let host = ManualHost::new();
        let mut sched = fixed_60(&host);
        sched.start();
        assert_eq!(host.pending(), 1, "wake outstanding");
        drop(sched);
        assert!(host.is_idle(), "drop cancels");
    }
}
