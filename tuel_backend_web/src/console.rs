// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console trace sink.

use alloc::format;

use wasm_bindgen::JsValue;
use web_sys::console;

use tuel_core::trace::{CallbackErrorEvent, FpsChangeEvent, TraceSink, TransitionPhase, VariantEvent};

/// Reports trace events to the browser console.
///
/// Failing callbacks always go to `console.warn`. Rate changes and variant
/// transitions go to `console.debug` when [`verbose`](Self::verbose) is set.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink {
    verbose: bool,
}

impl ConsoleSink {
    /// Creates a sink that only reports failures.
    #[must_use]
    pub const fn new() -> Self {
        Self { verbose: false }
    }

    /// Also report rate changes and variant transitions.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl TraceSink for ConsoleSink {
    fn on_fps_change(&mut self, e: &FpsChangeEvent) {
        if self.verbose {
            console::debug_1(&JsValue::from_str(&format!(
                "[tuel] target fps {:.1} -> {:.1}",
                e.from_fps, e.to_fps
            )));
        }
    }

    fn on_variant(&mut self, e: &VariantEvent<'_>) {
        if !self.verbose {
            return;
        }
        let phase = match e.phase {
            TransitionPhase::Start => "start",
            TransitionPhase::Complete => "complete",
        };
        console::debug_1(&JsValue::from_str(&format!(
            "[tuel] variant {phase}: {} -> {}",
            e.from.unwrap_or("-"),
            e.to
        )));
    }

    fn on_callback_error(&mut self, e: &CallbackErrorEvent<'_>) {
        console::warn_1(&JsValue::from_str(&format!(
            "[tuel] {} failed at {:.3}ms: {}",
            e.context,
            e.at.as_millis_f64(),
            e.error
        )));
    }
}
