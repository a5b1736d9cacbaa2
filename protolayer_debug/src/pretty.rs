// Copyright 2026 the Protolayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Objects are
//! printed by slot index (`#3`); a missing prototype prints as `none`.

use std::io::Write;

use protolayer_core::object::ObjectId;
use protolayer_core::trace::{
    ChainWalkEvent, ComposeBeginEvent, ComposeEndEvent, ExtensionSkippedEvent, FlattenEndEvent,
    LayerCreatedEvent, PropertyShadowedEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

struct Proto(Option<ObjectId>);

impl std::fmt::Display for Proto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("none"),
        }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_compose_begin(&mut self, e: &ComposeBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[compose:begin] base={} ({}) extensions={}",
            Proto(e.base),
            e.base_kind,
            e.extension_count,
        );
    }

    fn on_extension_skipped(&mut self, e: &ExtensionSkippedEvent) {
        let _ = writeln!(
            self.writer,
            "[compose:skip] position={} kind={}",
            e.position, e.kind,
        );
    }

    fn on_layer_created(&mut self, e: &LayerCreatedEvent) {
        let _ = writeln!(
            self.writer,
            "[compose:layer] position={} source={} layer={} proto={} props={}",
            e.position,
            e.source,
            e.layer,
            Proto(e.prototype),
            e.property_count,
        );
    }

    fn on_compose_end(&mut self, e: &ComposeEndEvent) {
        let _ = writeln!(
            self.writer,
            "[compose:end] result={} layers={} skipped={}",
            e.result, e.layers_created, e.skipped,
        );
    }

    fn on_chain_walk(&mut self, e: &ChainWalkEvent) {
        let found = if e.stop_found { "found" } else { "not found" };
        let _ = writeln!(
            self.writer,
            "[flatten:walk] start={} stop={} ({found}) depth={}",
            e.start,
            Proto(e.stop),
            e.depth,
        );
    }

    fn on_flatten_end(&mut self, e: &FlattenEndEvent) {
        let _ = writeln!(
            self.writer,
            "[flatten:end] result={} proto={} props={}",
            e.result,
            Proto(e.prototype),
            e.property_count,
        );
    }

    fn on_property_shadowed(&mut self, e: &PropertyShadowedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[flatten:shadow] key={:?} {} overrides {}",
            e.key, e.winner, e.shadowed,
        );
    }
}
