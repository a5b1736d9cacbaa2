// Copyright 2026 the Protolayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records, each led by a one-byte tag. [`decode`]
//! reads them back as an iterator of [`RecordedEvent`].
//!
//! Object handles are stored as `(index, generation)` pairs. Shadowed-property
//! records carry the key as a length-prefixed UTF-8 string, so they are the
//! only variable-size records.

use protolayer_core::object::ObjectId;
use protolayer_core::trace::{
    ChainWalkEvent, ComposeBeginEvent, ComposeEndEvent, ExtensionSkippedEvent, FlattenEndEvent,
    LayerCreatedEvent, PropertyShadowedEvent, TraceSink,
};
use protolayer_core::value::ValueKind;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_COMPOSE_BEGIN: u8 = 1;
const TAG_EXTENSION_SKIPPED: u8 = 2;
const TAG_LAYER_CREATED: u8 = 3;
const TAG_COMPOSE_END: u8 = 4;
const TAG_CHAIN_WALK: u8 = 5;
const TAG_FLATTEN_END: u8 = 6;
const TAG_PROPERTY_SHADOWED: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_id(&mut self, id: ObjectId) {
        self.write_u32(id.index());
        self.write_u32(id.generation());
    }

    fn write_option_id(&mut self, id: Option<ObjectId>) {
        match id {
            Some(id) => {
                self.write_u8(1);
                self.write_id(id);
            }
            None => {
                self.write_u8(0);
                self.write_id(ObjectId::from_parts(0, 0));
            }
        }
    }

    fn write_kind(&mut self, k: ValueKind) {
        self.write_u8(match k {
            ValueKind::Undefined => 0,
            ValueKind::Null => 1,
            ValueKind::Bool => 2,
            ValueKind::Number => 3,
            ValueKind::String => 4,
            ValueKind::Object => 5,
        });
    }

    fn write_str(&mut self, s: &str) {
        let bytes = s.as_bytes();
        let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
        self.write_u32(len);
        self.buf.extend_from_slice(&bytes[..len as usize]);
    }
}

impl TraceSink for RecorderSink {
    fn on_compose_begin(&mut self, e: &ComposeBeginEvent) {
        self.write_u8(TAG_COMPOSE_BEGIN);
        self.write_option_id(e.base);
        self.write_kind(e.base_kind);
        self.write_u32(e.extension_count);
    }

    fn on_extension_skipped(&mut self, e: &ExtensionSkippedEvent) {
        self.write_u8(TAG_EXTENSION_SKIPPED);
        self.write_u32(e.position);
        self.write_kind(e.kind);
    }

    fn on_layer_created(&mut self, e: &LayerCreatedEvent) {
        self.write_u8(TAG_LAYER_CREATED);
        self.write_u32(e.position);
        self.write_id(e.source);
        self.write_id(e.layer);
        self.write_option_id(e.prototype);
        self.write_u32(e.property_count);
    }

    fn on_compose_end(&mut self, e: &ComposeEndEvent) {
        self.write_u8(TAG_COMPOSE_END);
        self.write_id(e.result);
        self.write_u32(e.layers_created);
        self.write_u32(e.skipped);
    }

    fn on_chain_walk(&mut self, e: &ChainWalkEvent) {
        self.write_u8(TAG_CHAIN_WALK);
        self.write_id(e.start);
        self.write_option_id(e.stop);
        self.write_u32(e.depth);
        self.write_bool(e.stop_found);
    }

    fn on_flatten_end(&mut self, e: &FlattenEndEvent) {
        self.write_u8(TAG_FLATTEN_END);
        self.write_id(e.result);
        self.write_option_id(e.prototype);
        self.write_u32(e.property_count);
    }

    fn on_property_shadowed(&mut self, e: &PropertyShadowedEvent<'_>) {
        self.write_u8(TAG_PROPERTY_SHADOWED);
        self.write_str(e.key);
        self.write_id(e.shadowed);
        self.write_id(e.winner);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`ComposeBeginEvent`].
    ComposeBegin(ComposeBeginEvent),
    /// An [`ExtensionSkippedEvent`].
    ExtensionSkipped(ExtensionSkippedEvent),
    /// A [`LayerCreatedEvent`].
    LayerCreated(LayerCreatedEvent),
    /// A [`ComposeEndEvent`].
    ComposeEnd(ComposeEndEvent),
    /// A [`ChainWalkEvent`].
    ChainWalk(ChainWalkEvent),
    /// A [`FlattenEndEvent`].
    FlattenEnd(FlattenEndEvent),
    /// An owned copy of a [`PropertyShadowedEvent`].
    PropertyShadowed {
        /// Property name.
        key: String,
        /// The farther layer whose descriptor was dropped.
        shadowed: ObjectId,
        /// The nearer layer whose descriptor won.
        winner: ObjectId,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_id(&mut self) -> Option<ObjectId> {
        let index = self.read_u32()?;
        let generation = self.read_u32()?;
        Some(ObjectId::from_parts(index, generation))
    }

    fn read_option_id(&mut self) -> Option<Option<ObjectId>> {
        let present = self.read_u8()?;
        let id = self.read_id()?;
        Some(if present != 0 { Some(id) } else { None })
    }

    fn read_kind(&mut self) -> Option<ValueKind> {
        Some(match self.read_u8()? {
            0 => ValueKind::Undefined,
            1 => ValueKind::Null,
            2 => ValueKind::Bool,
            3 => ValueKind::Number,
            4 => ValueKind::String,
            5 => ValueKind::Object,
            _ => return None,
        })
    }

    fn read_string(&mut self) -> Option<String> {
        let len = usize::try_from(self.read_u32()?).ok()?;
        if self.remaining() < len {
            return None;
        }
        let s = std::str::from_utf8(&self.data[self.pos..self.pos + len]).ok()?;
        self.pos += len;
        Some(s.to_owned())
    }

    fn decode_compose_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ComposeBegin(ComposeBeginEvent {
            base: self.read_option_id()?,
            base_kind: self.read_kind()?,
            extension_count: self.read_u32()?,
        }))
    }

    fn decode_extension_skipped(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ExtensionSkipped(ExtensionSkippedEvent {
            position: self.read_u32()?,
            kind: self.read_kind()?,
        }))
    }

    fn decode_layer_created(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::LayerCreated(LayerCreatedEvent {
            position: self.read_u32()?,
            source: self.read_id()?,
            layer: self.read_id()?,
            prototype: self.read_option_id()?,
            property_count: self.read_u32()?,
        }))
    }

    fn decode_compose_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ComposeEnd(ComposeEndEvent {
            result: self.read_id()?,
            layers_created: self.read_u32()?,
            skipped: self.read_u32()?,
        }))
    }

    fn decode_chain_walk(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ChainWalk(ChainWalkEvent {
            start: self.read_id()?,
            stop: self.read_option_id()?,
            depth: self.read_u32()?,
            stop_found: self.read_bool()?,
        }))
    }

    fn decode_flatten_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FlattenEnd(FlattenEndEvent {
            result: self.read_id()?,
            prototype: self.read_option_id()?,
            property_count: self.read_u32()?,
        }))
    }

    fn decode_property_shadowed(&mut self) -> Option<RecordedEvent> {
        let key = self.read_string()?;
        let shadowed = self.read_id()?;
        let winner = self.read_id()?;
        Some(RecordedEvent::PropertyShadowed {
            key,
            shadowed,
            winner,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_COMPOSE_BEGIN => self.decode_compose_begin(),
            TAG_EXTENSION_SKIPPED => self.decode_extension_skipped(),
            TAG_LAYER_CREATED => self.decode_layer_created(),
            TAG_COMPOSE_END => self.decode_compose_end(),
            TAG_CHAIN_WALK => self.decode_chain_walk(),
            TAG_FLATTEN_END => self.decode_flatten_end(),
            TAG_PROPERTY_SHADOWED => self.decode_property_shadowed(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
