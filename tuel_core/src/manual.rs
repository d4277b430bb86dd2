// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A deterministic host for tests and headless runs.
//!
//! [`ManualHost`] owns a virtual clock that only moves when the caller pumps
//! it. Repaint requests are delivered at vsync boundaries spaced
//! [`frame_interval`](ManualHost::frame_interval) apart; timers fire at their
//! deadlines. Requests made while a batch is being delivered wait for the
//! next boundary, the same way `requestAnimationFrame` behaves.
//!
//! ```text
//! let host = ManualHost::new();
//! let mut sched = FrameScheduler::new(FrameSchedulerConfig::default(), host.clone())?;
//! sched.start();
//! host.advance(Duration::from_millis(100), &mut [&mut sched]);
//! ```

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::host::{Capabilities, Host, Wake, WakeId, WakeKind, Wakeable};
use crate::time::{Duration, HostTime};

/// Default vsync spacing: one 60 Hz refresh.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// A cloneable handle to a virtual clock and wake queue.
///
/// Clones share state, so a test can keep one handle and give others to the
/// components under test.
#[derive(Clone)]
pub struct ManualHost {
    state: Rc<RefCell<ManualState>>,
}

#[derive(Debug)]
struct ManualState {
    now: HostTime,
    capabilities: Capabilities,
    frame_interval: Duration,
    last_vsync: HostTime,
    next_id: u64,
    frames: Vec<WakeId>,
    timers: Vec<(HostTime, WakeId)>,
    delivered: u64,
}

enum NextEvent {
    Vsync(HostTime),
    Timer(HostTime, WakeId),
}

impl ManualHost {
    /// Creates a host at time zero with every capability.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::FULL)
    }

    /// Creates a host at time zero with the given capabilities.
    #[must_use]
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            state: Rc::new(RefCell::new(ManualState {
                now: HostTime::ZERO,
                capabilities,
                frame_interval: DEFAULT_FRAME_INTERVAL,
                last_vsync: HostTime::ZERO,
                next_id: 0,
                frames: Vec::new(),
                timers: Vec::new(),
                delivered: 0,
            })),
        }
    }

    /// Returns the vsync spacing.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        self.state.borrow().frame_interval
    }

    /// Sets the vsync spacing. Takes effect from the next boundary.
    ///
    /// A zero interval is bumped to one tick.
    pub fn set_frame_interval(&self, interval: Duration) {
        let mut state = self.state.borrow_mut();
        state.frame_interval = if interval.is_zero() {
            Duration(1)
        } else {
            interval
        };
    }

    /// Number of outstanding repaint requests and timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        let state = self.state.borrow();
        state.frames.len() + state.timers.len()
    }

    /// Returns `true` when nothing is outstanding.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Total number of wakes delivered so far.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.state.borrow().delivered
    }

    /// Advances the clock by `by`, delivering every due wake to `targets`.
    pub fn advance(&self, by: Duration, targets: &mut [&mut dyn Wakeable]) {
        let end = self.now().saturating_add(by);
        self.advance_to(end, targets);
    }

    /// Advances the clock to `end`, delivering every due wake to `targets`.
    ///
    /// Does nothing if `end` is in the past.
    pub fn advance_to(&self, end: HostTime, targets: &mut [&mut dyn Wakeable]) {
        while let Some(event) = self.next_event(end) {
            self.deliver(event, targets);
        }
        let mut state = self.state.borrow_mut();
        if end > state.now {
            state.now = end;
        }
    }

    /// Jumps to the next vsync boundary and delivers the pending repaint
    /// requests (plus any timers due before it).
    pub fn frame(&self, targets: &mut [&mut dyn Wakeable]) {
        let vsync = {
            let state = self.state.borrow();
            state.next_vsync()
        };
        self.advance_to(vsync, targets);
    }

    fn next_event(&self, end: HostTime) -> Option<NextEvent> {
        let state = self.state.borrow();
        let timer = state
            .timers
            .iter()
            .copied()
            .min_by_key(|&(deadline, id)| (deadline, id));
        let vsync = (!state.frames.is_empty()).then(|| state.next_vsync());

        match (timer, vsync) {
            (Some((deadline, id)), Some(v)) if deadline <= v => {
                (deadline <= end).then_some(NextEvent::Timer(deadline, id))
            }
            (_, Some(v)) => (v <= end).then_some(NextEvent::Vsync(v)),
            (Some((deadline, id)), None) => {
                (deadline <= end).then_some(NextEvent::Timer(deadline, id))
            }
            (None, None) => None,
        }
    }

    fn deliver(&self, event: NextEvent, targets: &mut [&mut dyn Wakeable]) {
        // The borrow must end before targets run: they call back into the host.
        let wakes: Vec<Wake> = {
            let mut state = self.state.borrow_mut();
            match event {
                NextEvent::Timer(deadline, id) => {
                    state.timers.retain(|&(_, t)| t != id);
                    state.now = state.now.max(deadline);
                    alloc::vec![Wake {
                        id,
                        kind: WakeKind::Timer,
                        at: state.now,
                    }]
                }
                NextEvent::Vsync(at) => {
                    state.now = state.now.max(at);
                    state.last_vsync = at;
                    core::mem::take(&mut state.frames)
                        .into_iter()
                        .map(|id| Wake {
                            id,
                            kind: WakeKind::Frame,
                            at,
                        })
                        .collect()
                }
            }
        };

        for wake in wakes {
            self.state.borrow_mut().delivered += 1;
            for target in targets.iter_mut() {
                target.wake(wake);
            }
        }
    }

    fn allocate(&self) -> WakeId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        WakeId(state.next_id)
    }
}

impl ManualState {
    /// First vsync boundary strictly after `now`.
    fn next_vsync(&self) -> HostTime {
        let interval = self.frame_interval.ticks();
        let since = self.now.saturating_duration_since(self.last_vsync).ticks();
        let periods = since / interval + 1;
        self.last_vsync
            .saturating_add(Duration(periods.saturating_mul(interval)))
    }
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for ManualHost {
    fn capabilities(&self) -> Capabilities {
        self.state.borrow().capabilities
    }

    fn now(&self) -> HostTime {
        self.state.borrow().now
    }

    fn request_frame(&mut self) -> WakeId {
        let id = self.allocate();
        self.state.borrow_mut().frames.push(id);
        id
    }

    fn set_timeout(&mut self, delay: Duration) -> WakeId {
        let id = self.allocate();
        let mut state = self.state.borrow_mut();
        let deadline = state.now.saturating_add(delay);
        state.timers.push((deadline, id));
        id
    }

    fn cancel(&mut self, id: WakeId) {
        let mut state = self.state.borrow_mut();
        state.frames.retain(|&f| f != id);
        state.timers.retain(|&(_, t)| t != id);
    }
}

impl fmt::Debug for ManualHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ManualHost")
            .field("now", &state.now)
            .field("capabilities", &state.capabilities)
            .field("frame_interval", &state.frame_interval)
            .field("pending_frames", &state.frames.len())
            .field("pending_timers", &state.timers.len())
            .finish_non_exhaustive()
    }
}
