// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Guarded invocation of consumer callbacks.
//!
//! Every callback a component runs goes through one guard. A callback that
//! returns an error (or panics, with the `std` feature) is logged with its
//! [`CallbackContext`], forwarded to the component's trace sink, and
//! suppressed. The caller learns only whether it succeeded.

use core::fmt;

use crate::error::{CallbackError, CallbackResult};
use crate::time::HostTime;
use crate::trace::{CallbackErrorEvent, Tracer};

/// Which callback failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallbackContext {
    /// A frame callback registered with the scheduler.
    Frame,
    /// The scheduler's `on_fps_change` hook.
    FpsChange,
    /// The sequence's `on_sequence_start` hook.
    SequenceStart,
    /// The sequence's `on_sequence_complete` hook.
    SequenceComplete,
    /// The sequence's `on_step_change` hook.
    StepChange,
    /// A step's own `on_start`.
    StepStart,
    /// A step's own `on_complete`.
    StepComplete,
    /// The tracker's `on_variant_change` hook.
    VariantChange,
    /// The tracker's `on_transition_start` hook.
    TransitionStart,
    /// The tracker's `on_transition_complete` hook.
    TransitionComplete,
}

impl CallbackContext {
    /// Short stable name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Frame => "frame callback",
            Self::FpsChange => "on_fps_change",
            Self::SequenceStart => "on_sequence_start",
            Self::SequenceComplete => "on_sequence_complete",
            Self::StepChange => "on_step_change",
            Self::StepStart => "step on_start",
            Self::StepComplete => "step on_complete",
            Self::VariantChange => "on_variant_change",
            Self::TransitionStart => "on_transition_start",
            Self::TransitionComplete => "on_transition_complete",
        }
    }
}

impl fmt::Display for CallbackContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs `f`, reporting and suppressing any failure. Returns `true` on success.
pub(crate) fn run_guarded(
    context: CallbackContext,
    at: HostTime,
    tracer: &mut Tracer,
    f: impl FnOnce() -> CallbackResult,
) -> bool {
    match catch(f) {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(
                context = context.as_str(),
                at_ms = at.as_millis_f64(),
                %error,
                "callback failed; continuing"
            );
            tracer.callback_error(&CallbackErrorEvent {
                at,
                context,
                error: &error,
            });
            false
        }
    }
}

#[cfg(feature = "std")]
fn catch(f: impl FnOnce() -> CallbackResult) -> CallbackResult {
    use alloc::format;
    use alloc::string::String;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| String::from(*s))
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| String::from("non-string payload"));
            Err(CallbackError::new(format!("panicked: {detail}")))
        }
    }
}

#[cfg(not(feature = "std"))]
fn catch(f: impl FnOnce() -> CallbackResult) -> CallbackResult {
    f()
}
