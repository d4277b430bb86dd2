// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only two things are errors here. [`ConfigError`] rejects a bad constructor
//! argument and is fatal to construction. [`CallbackError`] is what a consumer
//! callback returns when it fails; components report it and carry on.
//!
//! Out-of-range indices, unknown names, and re-entrant calls are not errors:
//! those operations return `false` or do nothing.

use alloc::string::String;

/// An invalid constructor argument.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Target frame rate is zero, negative, or not finite.
    #[error("target fps must be positive and finite, got {0}")]
    InvalidTargetFps(f64),

    /// A frame-rate bound is zero, negative, or not finite.
    #[error("fps bounds must be positive and finite, got min {min} max {max}")]
    InvalidFpsBounds {
        /// Requested lower bound.
        min: f64,
        /// Requested upper bound.
        max: f64,
    },

    /// `min_fps` is greater than `max_fps`.
    #[error("min fps {min} exceeds max fps {max}")]
    InvertedFpsBounds {
        /// Requested lower bound.
        min: f64,
        /// Requested upper bound.
        max: f64,
    },

    /// Two steps of one sequence share a name.
    #[error("duplicate step name `{0}`")]
    DuplicateStep(String),

    /// The variant map has no entries.
    #[error("variant map is empty")]
    NoVariants,

    /// Two variants share a name.
    #[error("duplicate variant `{0}`")]
    DuplicateVariant(String),

    /// The initial variant is not a key of the variant map.
    #[error("initial variant `{0}` is not declared")]
    UnknownInitialVariant(String),

    /// History capacity is zero.
    #[error("max history must be at least 1")]
    ZeroHistory,

    /// Pointer trail capacity is zero.
    #[error("pointer trail must hold at least one point")]
    ZeroTrailCapacity,

    /// Pointer trail lifetime is zero.
    #[error("pointer trail lifetime must be non-zero")]
    ZeroTrailLifetime,
}

/// A failure reported by a consumer-supplied callback.
///
/// Callbacks return [`CallbackResult`]. Components never propagate this
/// error; they log it, forward it to their trace sink, and continue.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CallbackError {
    message: String,
}

impl CallbackError {
    /// Creates an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Return type of every consumer callback.
pub type CallbackResult = Result<(), CallbackError>;

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            ConfigError::InvalidTargetFps(0.0).to_string(),
            "target fps must be positive and finite, got 0"
        );
        assert_eq!(
            ConfigError::InvertedFpsBounds {
                min: 60.0,
                max: 30.0
            }
            .to_string(),
            "min fps 60 exceeds max fps 30"
        );
        assert!(
            ConfigError::DuplicateStep("a".into())
                .to_string()
                .contains("`a`"),
            "step name is quoted"
        );
    }

    #[test]
    fn callback_error_from_str() {
        let err: CallbackError = "boom".into();
        assert_eq!(err.message(), "boom");
        assert_eq!(err.to_string(), "boom");
    }
}
