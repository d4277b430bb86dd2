// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host environment components run against.
//!
//! A [`Host`] provides a monotonic clock, a repaint signal ("invoke me before
//! the next screen update"), and one-shot timers. Components never block; they
//! ask the host for a wake-up and return. The host's event loop later hands a
//! [`Wake`] to every [`Wakeable`] it drives, and each component checks the
//! [`WakeId`] against the one it is waiting for.
//!
//! Hosts differ in what they can offer, so capabilities are an explicit
//! [`Capabilities`] value, detected once by whoever constructs the host and
//! passed in. A host without a repaint signal still works: components fall
//! back to a fixed-interval timer through [`next_frame`].

use crate::time::{Duration, HostTime};

/// Frame interval used when the host has no repaint signal (~60 Hz).
pub const FALLBACK_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// What the host environment supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// The host can schedule a callback before the next repaint.
    pub repaint_signal: bool,
    /// [`Host::now`] is monotonic.
    pub monotonic_clock: bool,
}

impl Capabilities {
    /// A host with every capability.
    pub const FULL: Self = Self {
        repaint_signal: true,
        monotonic_clock: true,
    };

    /// A host with only timers and a wall clock.
    pub const DEGRADED: Self = Self {
        repaint_signal: false,
        monotonic_clock: false,
    };

    /// Returns `true` if any capability is missing.
    #[must_use]
    pub const fn is_degraded(self) -> bool {
        !self.repaint_signal || !self.monotonic_clock
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::FULL
    }
}

/// Identifies one outstanding wake-up request.
///
/// Ids are unique per host for the lifetime of the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WakeId(pub u64);

/// Why a wake was delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WakeKind {
    /// A repaint signal requested with [`Host::request_frame`].
    Frame,
    /// A timer armed with [`Host::set_timeout`].
    Timer,
}

/// A wake-up delivered by the host's event loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Wake {
    /// The request this wake answers.
    pub id: WakeId,
    /// Repaint signal or timer.
    pub kind: WakeKind,
    /// Host time at delivery (the repaint timestamp for frames).
    pub at: HostTime,
}

/// Services a component needs from its environment.
///
/// Methods take `&mut self` so simple hosts need no interior mutability;
/// hosts shared between components (browser, [`ManualHost`]) hand out cheap
/// cloneable handles instead.
///
/// [`ManualHost`]: crate::manual::ManualHost
pub trait Host {
    /// What this host supports.
    fn capabilities(&self) -> Capabilities;

    /// Current host time.
    fn now(&self) -> HostTime;

    /// Requests a [`WakeKind::Frame`] wake before the next repaint.
    fn request_frame(&mut self) -> WakeId;

    /// Requests a [`WakeKind::Timer`] wake after `delay`.
    fn set_timeout(&mut self, delay: Duration) -> WakeId;

    /// Cancels an outstanding request.
    ///
    /// Cancelling an unknown, fired, or already cancelled id is a no-op.
    fn cancel(&mut self, id: WakeId);
}

/// Anything the host's event loop can deliver wakes to.
pub trait Wakeable {
    /// Handles a wake. Wakes for ids the receiver is not waiting on must be
    /// ignored.
    fn wake(&mut self, wake: Wake);
}

/// Requests the next frame, falling back to a `fallback` timer when the host
/// has no repaint signal.
pub fn next_frame<H: Host + ?Sized>(host: &mut H, fallback: Duration) -> WakeId {
    if host.capabilities().repaint_signal {
        host.request_frame()
    } else {
        host.set_timeout(fallback)
    }
}

/// A single outstanding wake-up owned by a component.
///
/// Holds at most one request; arming again cancels the previous one. The
/// component matches incoming wakes with [`take`](Self::take), which clears
/// the slot only on a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WakeSlot {
    pending: Option<WakeId>,
}

impl WakeSlot {
    /// An empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Replaces the outstanding request with `id`, cancelling the old one.
    pub fn arm<H: Host + ?Sized>(&mut self, host: &mut H, id: WakeId) {
        if let Some(old) = self.pending.replace(id) {
            host.cancel(old);
        }
    }

    /// Cancels the outstanding request, if any.
    pub fn cancel<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Some(old) = self.pending.take() {
            host.cancel(old);
        }
    }

    /// Returns `true` and clears the slot if `wake` answers the outstanding
    /// request.
    pub fn take(&mut self, wake: &Wake) -> bool {
        if self.pending == Some(wake.id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Returns `true` if a request is outstanding.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[derive(Default)]
    struct CountingHost {
        capabilities: Option<Capabilities>,
        next: u64,
        frames: Vec<WakeId>,
        timers: Vec<(WakeId, Duration)>,
        cancelled: Vec<WakeId>,
    }

    impl Host for CountingHost {
        fn capabilities(&self) -> Capabilities {
            self.capabilities.unwrap_or_default()
        }

        fn now(&self) -> HostTime {
            HostTime::ZERO
        }

        fn request_frame(&mut self) -> WakeId {
            self.next += 1;
            self.frames.push(WakeId(self.next));
            WakeId(self.next)
        }

        fn set_timeout(&mut self, delay: Duration) -> WakeId {
            self.next += 1;
            self.timers.push((WakeId(self.next), delay));
            WakeId(self.next)
        }

        fn cancel(&mut self, id: WakeId) {
            self.cancelled.push(id);
        }
    }

    #[test]
    fn next_frame_prefers_repaint_signal() {
        let mut host = CountingHost::default();
        let id = next_frame(&mut host, FALLBACK_FRAME_INTERVAL);
        assert_eq!(host.frames, [id], "repaint signal used");
        assert!(host.timers.is_empty(), "no timer armed");
    }

    #[test]
    fn next_frame_falls_back_to_timer() {
        let mut host = CountingHost {
            capabilities: Some(Capabilities::DEGRADED),
            ..CountingHost::default()
        };
        let id = next_frame(&mut host, FALLBACK_FRAME_INTERVAL);
        assert!(host.frames.is_empty(), "no repaint signal available");
        assert_eq!(host.timers, [(id, FALLBACK_FRAME_INTERVAL)]);
    }

    #[test]
    fn wake_slot_matches_only_its_id() {
        let mut host = CountingHost::default();
        let mut slot = WakeSlot::new();
        let id = host.request_frame();
        slot.arm(&mut host, id);

        let stale = Wake {
            id: WakeId(99),
            kind: WakeKind::Frame,
            at: HostTime::ZERO,
        };
        assert!(!slot.take(&stale), "foreign id ignored");
        assert!(slot.is_armed(), "still waiting");

        let wake = Wake { id, ..stale };
        assert!(slot.take(&wake), "own id matched");
        assert!(!slot.is_armed(), "slot cleared");
        assert!(!slot.take(&wake), "second delivery ignored");
    }

    #[test]
    fn rearming_cancels_previous() {
        let mut host = CountingHost::default();
        let mut slot = WakeSlot::new();
        let first = host.request_frame();
        slot.arm(&mut host, first);
        let second = host.request_frame();
        slot.arm(&mut host, second);
        assert_eq!(host.cancelled, [first]);

        slot.cancel(&mut host);
        slot.cancel(&mut host);
        assert_eq!(host.cancelled, [first, second], "double cancel is a no-op");
    }
}
