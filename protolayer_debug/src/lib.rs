// Copyright 2026 the Protolayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for protolayer diagnostics.
//!
//! This crate provides [`TraceSink`](protolayer_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`json::export`]: writes a JSON event array from recorded bytes, and
//!   [`json::snapshot`] renders an object's prototype chain as JSON.

pub mod json;
pub mod pretty;
pub mod recorder;
