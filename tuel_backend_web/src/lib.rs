// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser host for TUEL.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`WebHost`]: a [`Host`](tuel_core::host::Host) backed by
//!   `requestAnimationFrame`, `setTimeout`, and `performance.now()`
//! - [`detect_capabilities`]: explicit feature detection, done once and passed
//!   to [`WebHost::new`]
//! - [`ConsoleSink`]: reports failing callbacks as console warnings
//! - [`PointerTrailListener`]: a document-level `mousemove` listener feeding
//!   a [`PointerTrail`](tuel_core::trail::PointerTrail)

#![no_std]

extern crate alloc;

mod console;
mod host;
mod pointer;

pub use console::ConsoleSink;
pub use host::WebHost;
pub use pointer::PointerTrailListener;

use tuel_core::host::Capabilities;
use tuel_core::time::HostTime;
use wasm_bindgen::JsValue;

/// Checks the global object for a repaint signal and a monotonic clock.
///
/// Workers and some embedded webviews lack `requestAnimationFrame`; very old
/// engines lack `performance`. Components fall back to timers and `Date.now()`
/// respectively.
#[must_use]
pub fn detect_capabilities() -> Capabilities {
    let global = js_sys::global();
    let has = |name: &str| js_sys::Reflect::has(&global, &JsValue::from_str(name)).unwrap_or(false);
    Capabilities {
        repaint_signal: has("requestAnimationFrame"),
        monotonic_clock: has("performance"),
    }
}

/// Converts a millisecond browser timestamp to [`HostTime`].
///
/// Both `performance.now()` and `Date.now()` report milliseconds; negative or
/// non-finite values clamp to zero.
#[must_use]
pub fn host_time_from_millis(ms: f64) -> HostTime {
    HostTime::from_millis_f64(ms)
}
