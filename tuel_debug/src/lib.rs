// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for TUEL diagnostics.
//!
//! This crate provides [`TraceSink`](tuel_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] prints one human-readable line per event.
//! - [`recorder::RecorderSink`] keeps a compact binary recording, read back with
//!   [`recorder::decode`].
//! - [`chrome::export`] writes Chrome Trace Event Format JSON from recorded
//!   bytes.

pub mod chrome;
pub mod pretty;
pub mod recorder;
