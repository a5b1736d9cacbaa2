// Copyright 2026 the Protolayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for composition and flattening.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`compose`](crate::compose) operations call at each step. All method
//! bodies default to no-ops, so implementing only the events you care about
//! is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`PropertyShadowedEvent`] and the
//!   corresponding `TraceSink` method, emitted once per overridden property
//!   during flattening.

use crate::object::ObjectId;
use crate::value::ValueKind;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a composition starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComposeBeginEvent {
    /// The normalized base (`None` when the base was not an object).
    pub base: Option<ObjectId>,
    /// Type of the base argument as given.
    pub base_kind: ValueKind,
    /// Number of extension arguments, valid or not.
    pub extension_count: u32,
}

/// Emitted for each extension argument that is not an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtensionSkippedEvent {
    /// Zero-based position among the extension arguments.
    pub position: u32,
    /// Type of the skipped value.
    pub kind: ValueKind,
}

/// Emitted for each layer the composer allocates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerCreatedEvent {
    /// Zero-based position among the extension arguments.
    pub position: u32,
    /// The extension whose descriptors were copied.
    pub source: ObjectId,
    /// The new layer.
    pub layer: ObjectId,
    /// The layer's prototype (the previous accumulator).
    pub prototype: Option<ObjectId>,
    /// Number of descriptors copied.
    pub property_count: u32,
}

/// Emitted when a composition finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComposeEndEvent {
    /// The returned object.
    pub result: ObjectId,
    /// Number of layers allocated.
    pub layers_created: u32,
    /// Number of extensions skipped.
    pub skipped: u32,
}

/// Emitted after a flattener's upward walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainWalkEvent {
    /// The object the walk started from.
    pub start: ObjectId,
    /// The requested stop ancestor (`None` for a non-object stop value).
    pub stop: Option<ObjectId>,
    /// Number of visited layers.
    pub depth: u32,
    /// Whether the stop ancestor was reached.
    pub stop_found: bool,
}

/// Emitted when a flattening finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlattenEndEvent {
    /// The returned object.
    pub result: ObjectId,
    /// The returned object's prototype.
    pub prototype: Option<ObjectId>,
    /// Number of merged own properties.
    pub property_count: u32,
}

/// Emitted when a nearer layer overrides a farther layer's property during
/// flattening.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyShadowedEvent<'a> {
    /// Property name.
    pub key: &'a str,
    /// The farther layer whose descriptor was dropped.
    pub shadowed: ObjectId,
    /// The nearer layer whose descriptor won.
    pub winner: ObjectId,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from composition and flattening.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a composition starts.
    fn on_compose_begin(&mut self, e: &ComposeBeginEvent) {
        _ = e;
    }

    /// Called for each non-object extension.
    fn on_extension_skipped(&mut self, e: &ExtensionSkippedEvent) {
        _ = e;
    }

    /// Called for each allocated layer.
    fn on_layer_created(&mut self, e: &LayerCreatedEvent) {
        _ = e;
    }

    /// Called when a composition finishes.
    fn on_compose_end(&mut self, e: &ComposeEndEvent) {
        _ = e;
    }

    /// Called after a flattener's upward walk.
    fn on_chain_walk(&mut self, e: &ChainWalkEvent) {
        _ = e;
    }

    /// Called when a flattening finishes.
    fn on_flatten_end(&mut self, e: &FlattenEndEvent) {
        _ = e;
    }

    /// Called per overridden property (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_property_shadowed(&mut self, e: &PropertyShadowedEvent<'_>) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`ComposeBeginEvent`].
    #[inline]
    pub fn compose_begin(&mut self, e: &ComposeBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_compose_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`ExtensionSkippedEvent`].
    #[inline]
    pub fn extension_skipped(&mut self, e: &ExtensionSkippedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_extension_skipped(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LayerCreatedEvent`].
    #[inline]
    pub fn layer_created(&mut self, e: &LayerCreatedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_layer_created(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ComposeEndEvent`].
    #[inline]
    pub fn compose_end(&mut self, e: &ComposeEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_compose_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ChainWalkEvent`].
    #[inline]
    pub fn chain_walk(&mut self, e: &ChainWalkEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_chain_walk(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FlattenEndEvent`].
    #[inline]
    pub fn flatten_end(&mut self, e: &FlattenEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_flatten_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PropertyShadowedEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn property_shadowed(&mut self, e: &PropertyShadowedEvent<'_>) {
        if let Some(s) = &mut self.sink {
            s.on_property_shadowed(e);
        }
    }
}

/// Saturating `usize` to `u32` conversion for event counters.
#[inline]
pub(crate) fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_begin() -> ComposeBeginEvent {
        ComposeBeginEvent {
            base: Some(ObjectId::from_parts(1, 0)),
            base_kind: ValueKind::Object,
            extension_count: 3,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_compose_begin(&sample_begin());
        sink.on_extension_skipped(&ExtensionSkippedEvent {
            position: 0,
            kind: ValueKind::Null,
        });
        sink.on_flatten_end(&FlattenEndEvent {
            result: ObjectId::from_parts(4, 0),
            prototype: None,
            property_count: 0,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.compose_begin(&sample_begin());
        tracer.chain_walk(&ChainWalkEvent {
            start: ObjectId::from_parts(2, 0),
            stop: None,
            depth: 1,
            stop_found: false,
        });
    }

    #[test]
    fn count_saturates() {
        assert_eq!(count(7), 7);
        assert_eq!(count(usize::MAX), u32::MAX);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            begins: Vec<u32>,
        }
        impl TraceSink for RecordingSink {
            fn on_compose_begin(&mut self, e: &ComposeBeginEvent) {
                self.begins.push(e.extension_count);
            }
        }

        let mut sink = RecordingSink { begins: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.compose_begin(&sample_begin());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.begins, &[3]);
    }
}
