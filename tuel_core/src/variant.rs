// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A named active variant with bounded history and transition progress.
//!
//! [`VariantTracker`] holds a fixed, ordered set of named payloads. Switching
//! makes the new name current immediately, then drives
//! [`transition_progress`](VariantTracker::transition_progress) from 0 to 1
//! over [`TRANSITION_WINDOW`] of wall-clock time, one repaint signal at a
//! time. Further switches are rejected until the transition completes.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::callback::{CallbackContext, run_guarded};
use crate::error::{CallbackResult, ConfigError};
use crate::host::{FALLBACK_FRAME_INTERVAL, Host, Wake, WakeSlot, Wakeable, next_frame};
use crate::time::{Duration, HostTime};
use crate::trace::{TraceSink, Tracer, TransitionPhase, VariantEvent};

/// How long a variant transition runs.
pub const TRANSITION_WINDOW: Duration = Duration::from_millis(300);

/// Default history capacity.
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Tracker options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantConfig {
    /// Starting variant. Defaults to the first one supplied.
    pub initial: Option<String>,
    /// Most names kept in history.
    pub max_history: usize,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self {
            initial: None,
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

type ChangeHook = Box<dyn FnMut(&str, &str) -> CallbackResult>;
type CompleteHook = Box<dyn FnMut(&str) -> CallbackResult>;

/// Transition observers.
#[derive(Default)]
pub struct VariantHooks {
    on_variant_change: Option<ChangeHook>,
    on_transition_start: Option<ChangeHook>,
    on_transition_complete: Option<CompleteHook>,
}

impl VariantHooks {
    /// Fired with `(current, previous)` after each switch.
    #[must_use]
    pub fn on_variant_change(
        mut self,
        f: impl FnMut(&str, &str) -> CallbackResult + 'static,
    ) -> Self {
        self.on_variant_change = Some(Box::new(f));
        self
    }

    /// Fired with `(previous, current)` when a transition begins, before
    /// `on_variant_change`.
    #[must_use]
    pub fn on_transition_start(
        mut self,
        f: impl FnMut(&str, &str) -> CallbackResult + 'static,
    ) -> Self {
        self.on_transition_start = Some(Box::new(f));
        self
    }

    /// Fired with the current name when progress reaches 1.
    #[must_use]
    pub fn on_transition_complete(
        mut self,
        f: impl FnMut(&str) -> CallbackResult + 'static,
    ) -> Self {
        self.on_transition_complete = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for VariantHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantHooks")
            .field("on_variant_change", &self.on_variant_change.is_some())
            .field("on_transition_start", &self.on_transition_start.is_some())
            .field("on_transition_complete", &self.on_transition_complete.is_some())
            .finish()
    }
}

/// Snapshot of a tracker.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantState<'a> {
    /// Active variant.
    pub current: &'a str,
    /// Variant active before the last switch.
    pub previous: Option<&'a str>,
    /// Whether a transition is running.
    pub is_transitioning: bool,
    /// Recently active variants, most recent first, without duplicates.
    pub history: Vec<&'a str>,
}

/// Tracks which of a fixed set of variants is active.
pub struct VariantTracker<V, H: Host> {
    host: H,
    variants: Vec<(String, V)>,
    initial: usize,
    current: usize,
    previous: Option<usize>,
    history: Vec<usize>,
    max_history: usize,
    transitioning: bool,
    started_at: HostTime,
    progress: f64,
    hooks: VariantHooks,
    slot: WakeSlot,
    tracer: Tracer,
}

impl<V, H: Host> VariantTracker<V, H> {
    /// Creates a tracker at the initial variant.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `variants` is empty or repeats a name, if
    /// `config.initial` names no variant, or if `config.max_history` is zero.
    pub fn new<N: Into<String>>(
        variants: impl IntoIterator<Item = (N, V)>,
        config: VariantConfig,
        hooks: VariantHooks,
        host: H,
    ) -> Result<Self, ConfigError> {
        let mut list: Vec<(String, V)> = Vec::new();
        for (name, payload) in variants {
            let name = name.into();
            if list.iter().any(|(n, _)| *n == name) {
                return Err(ConfigError::DuplicateVariant(name));
            }
            list.push((name, payload));
        }
        if list.is_empty() {
            return Err(ConfigError::NoVariants);
        }
        if config.max_history == 0 {
            return Err(ConfigError::ZeroHistory);
        }
        let initial = match config.initial {
            Some(name) => list
                .iter()
                .position(|(n, _)| *n == name)
                .ok_or(ConfigError::UnknownInitialVariant(name))?,
            None => 0,
        };

        Ok(Self {
            host,
            variants: list,
            initial,
            current: initial,
            previous: None,
            history: alloc::vec![initial],
            max_history: config.max_history,
            transitioning: false,
            started_at: HostTime::ZERO,
            progress: 1.0,
            hooks,
            slot: WakeSlot::new(),
            tracer: Tracer::none(),
        })
    }

    /// Switches to `name`.
    ///
    /// Returns `false` without effect if `name` is unknown, already current,
    /// or a transition is running.
    pub fn set_variant(&mut self, name: &str) -> bool {
        match self.index_of(name) {
            Some(index) => self.switch_to(index),
            None => {
                tracing::debug!(variant = name, "unknown variant");
                false
            }
        }
    }

    /// Switches to whichever of `a` and `b` is not current.
    pub fn toggle(&mut self, a: &str, b: &str) -> bool {
        let target = if self.current() == a { b } else { a };
        self.set_variant(target)
    }

    /// Switches to the entry after the current one in `names`, wrapping.
    ///
    /// If the current variant is not listed, switches to the first entry.
    pub fn cycle(&mut self, names: &[&str]) -> bool {
        if names.is_empty() {
            return false;
        }
        let next = names
            .iter()
            .position(|n| *n == self.current())
            .map_or(0, |i| (i + 1) % names.len());
        self.set_variant(names[next])
    }

    /// Switches back to the previous variant.
    pub fn revert(&mut self) -> bool {
        match self.previous {
            Some(index) => self.switch_to(index),
            None => false,
        }
    }

    /// Switches to the history entry at `index` (0 is the current variant).
    pub fn go_to_history(&mut self, index: usize) -> bool {
        match self.history.get(index) {
            Some(&variant) => self.switch_to(variant),
            None => false,
        }
    }

    /// Switches back to the initial variant.
    pub fn reset(&mut self) -> bool {
        self.switch_to(self.initial)
    }

    /// Installs a trace sink.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// Name of the active variant.
    #[must_use]
    pub fn current(&self) -> &str {
        &self.variants[self.current].0
    }

    /// Name of the variant active before the last switch.
    #[must_use]
    pub fn previous(&self) -> Option<&str> {
        self.previous.map(|i| self.variants[i].0.as_str())
    }

    /// Payload of the active variant.
    #[must_use]
    pub fn payload(&self) -> &V {
        &self.variants[self.current].1
    }

    /// Payload of the variant named `name`.
    #[must_use]
    pub fn variant(&self, name: &str) -> Option<&V> {
        self.index_of(name).map(|i| &self.variants[i].1)
    }

    /// Variant names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|(n, _)| n.as_str())
    }

    /// Recently active variants, most recent first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(|&i| self.variants[i].0.as_str())
    }

    /// Returns `true` while a transition is running.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Transition progress in `[0, 1]`, updated on each repaint signal.
    ///
    /// 1 when no transition is running.
    #[must_use]
    pub fn transition_progress(&self) -> f64 {
        self.progress
    }

    /// Snapshot of the tracker.
    #[must_use]
    pub fn state(&self) -> VariantState<'_> {
        VariantState {
            current: self.current(),
            previous: self.previous(),
            is_transitioning: self.transitioning,
            history: self.history().collect(),
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.variants.iter().position(|(n, _)| n == name)
    }

    fn switch_to(&mut self, index: usize) -> bool {
        if index == self.current || self.transitioning {
            return false;
        }
        let at = self.host.now();
        let from = self.current;
        self.previous = Some(from);
        self.current = index;
        self.history.retain(|&i| i != index);
        self.history.insert(0, index);
        self.history.truncate(self.max_history);
        self.transitioning = true;
        self.started_at = at;
        self.progress = 0.0;

        let from = self.variants[from].0.as_str();
        let to = self.variants[index].0.as_str();
        tracing::debug!(from, to, "variant transition started");
        self.tracer.variant(&VariantEvent {
            at,
            from: Some(from),
            to,
            phase: TransitionPhase::Start,
        });
        if let Some(hook) = &mut self.hooks.on_transition_start {
            run_guarded(CallbackContext::TransitionStart, at, &mut self.tracer, || {
                hook(from, to)
            });
        }
        if let Some(hook) = &mut self.hooks.on_variant_change {
            run_guarded(CallbackContext::VariantChange, at, &mut self.tracer, || {
                hook(to, from)
            });
        }

        let id = next_frame(&mut self.host, FALLBACK_FRAME_INTERVAL);
        self.slot.arm(&mut self.host, id);
        true
    }

    fn on_frame(&mut self, at: HostTime) {
        self.progress = at
            .saturating_duration_since(self.started_at)
            .fraction_of(TRANSITION_WINDOW);
        if self.progress < 1.0 {
            let id = next_frame(&mut self.host, FALLBACK_FRAME_INTERVAL);
            self.slot.arm(&mut self.host, id);
            return;
        }

        self.transitioning = false;
        let to = self.variants[self.current].0.as_str();
        tracing::debug!(to, "variant transition complete");
        self.tracer.variant(&VariantEvent {
            at,
            from: self.previous.map(|i| self.variants[i].0.as_str()),
            to,
            phase: TransitionPhase::Complete,
        });
        if let Some(hook) = &mut self.hooks.on_transition_complete {
            run_guarded(CallbackContext::TransitionComplete, at, &mut self.tracer, || {
                hook(to)
            });
        }
    }
}

impl<V, H: Host> Wakeable for VariantTracker<V, H> {
    fn wake(&mut self, wake: Wake) {
        if self.slot.take(&wake) && self.transitioning {
            self.on_frame(wake.at);
        }
    }
}

impl<V, H: Host> Drop for VariantTracker<V, H> {
    fn drop(&mut self) {
        self.slot.cancel(&mut self.host);
    }
}

impl<V, H: Host> fmt::Debug for VariantTracker<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantTracker")
            .field("current", &self.current())
            .field("previous", &self.previous())
            .field("transitioning", &self.transitioning)
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;
    use crate::manual::ManualHost;

    fn tracker(names: &[&str], host: &ManualHost) -> VariantTracker<u32, ManualHost> {
        let variants = names.iter().zip(0_u32..).map(|(n, i)| (*n, i));
        VariantTracker::new(
            variants,
            VariantConfig::default(),
            VariantHooks::default(),
            host.clone(),
        )
        .unwrap()
    }

    fn settle(host: &ManualHost, t: &mut VariantTracker<u32, ManualHost>) {
        host.advance(Duration::from_millis(400), &mut [t]);
    }

    #[test]
    fn config_errors() {
        let host = ManualHost::new();
        let none: [(&str, u32); 0] = [];
        assert_eq!(
            VariantTracker::new(none, VariantConfig::default(), VariantHooks::default(), host.clone())
                .unwrap_err(),
            ConfigError::NoVariants
        );
        assert_eq!(
            VariantTracker::new(
                [("a", 1), ("a", 2)],
                VariantConfig::default(),
                VariantHooks::default(),
                host.clone()
            )
            .unwrap_err(),
            ConfigError::DuplicateVariant("a".into())
        );
        let unknown = VariantConfig {
            initial: Some("q".into()),
            ..VariantConfig::default()
        };
        assert_eq!(
            VariantTracker::new([("a", 1)], unknown, VariantHooks::default(), host.clone())
                .unwrap_err(),
            ConfigError::UnknownInitialVariant("q".into())
        );
        let zero = VariantConfig {
            max_history: 0,
            ..VariantConfig::default()
        };
        assert_eq!(
            VariantTracker::new([("a", 1)], zero, VariantHooks::default(), host).unwrap_err(),
            ConfigError::ZeroHistory
        );
    }

    #[test]
    fn initial_defaults_to_first_declared() {
        let host = ManualHost::new();
        let t = tracker(&["closed", "open"], &host);
        assert_eq!(t.current(), "closed");
        assert_eq!(*t.payload(), 0);
        assert_eq!(t.variant("open"), Some(&1));
        assert_eq!(t.names().collect::<Vec<_>>(), ["closed", "open"]);
        assert_eq!(t.state().history, ["closed"]);
        assert!((t.transition_progress() - 1.0).abs() < f64::EPSILON, "at rest");
    }

    #[test]
    fn transition_progresses_per_frame_and_completes() {
        let host = ManualHost::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (start, change, done) = (Rc::clone(&log), Rc::clone(&log), Rc::clone(&log));
        let hooks = VariantHooks::default()
            .on_transition_start(move |from, to| {
                start.borrow_mut().push(alloc::format!("start {from}->{to}"));
                Ok(())
            })
            .on_variant_change(move |to, from| {
                change.borrow_mut().push(alloc::format!("change {to} from {from}"));
                Ok(())
            })
            .on_transition_complete(move |to| {
                done.borrow_mut().push(alloc::format!("complete {to}"));
                Ok(())
            });
        let mut t = VariantTracker::new(
            [("a", ()), ("b", ())],
            VariantConfig::default(),
            hooks,
            host.clone(),
        )
        .unwrap();

        assert!(t.set_variant("b"));
        assert_eq!(t.current(), "b", "current switches immediately");
        assert!(t.is_transitioning());
        assert!(t.transition_progress().abs() < f64::EPSILON);

        host.advance(Duration::from_millis(150), &mut [&mut t]);
        let mid = t.transition_progress();
        assert!(mid > 0.0 && mid < 1.0, "partway, got {mid}");
        assert!(t.is_transitioning());

        host.advance(Duration::from_millis(200), &mut [&mut t]);
        assert!(!t.is_transitioning(), "window elapsed");
        assert!((t.transition_progress() - 1.0).abs() < f64::EPSILON);
        assert!(host.is_idle(), "no more frames requested");
        assert_eq!(
            *log.borrow(),
            ["start a->b", "change b from a", "complete b"]
        );
    }

    #[test]
    fn rejected_switches_change_nothing() {
        let host = ManualHost::new();
        let mut t = tracker(&["a", "b", "c"], &host);
        let before = alloc::format!("{:?}", t.state());

        assert!(!t.set_variant("zzz"), "unknown");
        assert!(!t.set_variant("a"), "already current");
        assert_eq!(alloc::format!("{:?}", t.state()), before);

        assert!(t.set_variant("b"));
        let during = alloc::format!("{:?}", t.state());
        assert!(!t.set_variant("c"), "in flight");
        assert_eq!(alloc::format!("{:?}", t.state()), during);
    }

    #[test]
    fn toggle_cycle_and_revert() {
        let host = ManualHost::new();
        let mut t = tracker(&["a", "b", "c"], &host);

        assert!(t.toggle("a", "b"));
        assert_eq!(t.current(), "b");
        settle(&host, &mut t);
        assert!(t.toggle("a", "b"));
        assert_eq!(t.current(), "a");
        settle(&host, &mut t);

        assert!(t.cycle(&["a", "b", "c"]));
        assert_eq!(t.current(), "b");
        settle(&host, &mut t);
        assert!(t.cycle(&["c", "a"]), "current unlisted: first entry");
        assert_eq!(t.current(), "c");
        settle(&host, &mut t);
        assert!(!t.cycle(&[]), "nothing to cycle");

        assert!(t.revert());
        assert_eq!(t.current(), "b");
        assert_eq!(t.previous(), Some("c"));
    }

    #[test]
    fn history_is_deduplicated_and_capped() {
        let host = ManualHost::new();
        let config = VariantConfig {
            initial: None,
            max_history: 3,
        };
        let mut t = VariantTracker::new(
            [("a", ()), ("b", ()), ("c", ()), ("d", ())],
            config,
            VariantHooks::default(),
            host.clone(),
        )
        .unwrap();

        for name in ["b", "c", "b", "d"] {
            assert!(t.set_variant(name));
            host.advance(Duration::from_millis(400), &mut [&mut t]);
        }
        assert_eq!(t.state().history, ["d", "b", "c"]);

        assert!(!t.go_to_history(0), "entry 0 is current");
        assert!(!t.go_to_history(7), "out of range");
        assert!(t.go_to_history(2));
        assert_eq!(t.current(), "c");
    }

    #[test]
    fn reset_returns_to_initial() {
        let host = ManualHost::new();
        let config = VariantConfig {
            initial: Some("b".into()),
            ..VariantConfig::default()
        };
        let mut t = VariantTracker::new(
            vec![("a", ()), ("b", ())],
            config,
            VariantHooks::default(),
            host.clone(),
        )
        .unwrap();
        assert!(!t.reset(), "already initial");
        assert!(t.set_variant("a"));
        host.advance(Duration::from_millis(400), &mut [&mut t]);
        assert!(t.reset());
        assert_eq!(t.current(), "b");
    }

    #[test]
    fn drop_cancels_progress_frames() {
        let host = ManualHost::new();
        let mut t = tracker(&["a", "b"], &host);
        assert!(t.set_variant("b"));
        assert_eq!(host.pending(), 1);
        drop(t);
        assert!(host.is_idle());
    }
}
