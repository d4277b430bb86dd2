// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame scheduling and animation state machines for TUEL components.
//!
//! `tuel_core` holds the timing discipline shared by TUEL's scroll, gallery,
//! text, and interaction components. It is `no_std` compatible (with `alloc`)
//! and never touches a clock or a repaint primitive directly: every component
//! is driven by a [`Host`](host::Host) that the application injects.
//!
//! # Architecture
//!
//! All components are single-threaded, cooperative state machines. They ask
//! the host to wake them and the host's event loop delivers [`Wake`]s back:
//!
//! ```text
//!   Host (rAF / setTimeout / ManualHost)
//!       │  Wake { id, kind, at }
//!       ▼
//!   Wakeable::wake() ──► FrameScheduler  ──► frame callbacks, FrameStats
//!                   ├──► SequenceEngine  ──► step hooks, AnimationState
//!                   └──► VariantTracker  ──► transition hooks, VariantState
//!       ▲
//!       │  request_frame() / set_timeout() / cancel()
//!   component
//! ```
//!
//! A component ignores every wake whose id it is not waiting on, so cancelling
//! (via `stop`, `pause`, `reset`, or dropping the component) is synchronous
//! even when the host already queued the wake.
//!
//! **[`scheduler`]**: repaint-synchronised tick loop with frame-rate
//! measurement and adaptive retargeting.
//!
//! **[`sequence`]**: ordered, named animation steps with play/pause and
//! navigation.
//!
//! **[`variant`]**: a named active variant with bounded history and a
//! time-based transition progress.
//!
//! **[`trail`]**: bounded, time-limited pointer trail.
//!
//! **[`host`]**: the [`Host`](host::Host) trait, capabilities, and wake
//! delivery. **[`manual`]**: a deterministic [`ManualHost`](manual::ManualHost)
//! for tests and headless runs.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with a feature-gated [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies and
//!   converts panics inside consumer callbacks into reported errors.
//! - `trace` (disabled by default): Enables `Tracer` dispatch (one branch per
//!   call site).
//!
//! [`Wake`]: host::Wake

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod callback;
pub mod error;
pub mod host;
pub mod manual;
pub mod scheduler;
pub mod sequence;
pub mod stats;
pub mod time;
pub mod trace;
pub mod trail;
pub mod variant;

pub use error::{CallbackError, CallbackResult, ConfigError};
