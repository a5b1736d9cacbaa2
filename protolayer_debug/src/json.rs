// Copyright 2026 the Protolayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of recordings and object chains.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes them to the given writer as a JSON array, one object per event.
//! [`snapshot`] renders an object and its ancestors, nearest first, with every
//! own property descriptor. Accessors are described, never invoked.

use std::io::{self, Write};

use serde_json::{Map, Value as Json, json};

use protolayer_core::descriptor::{PropertyDescriptor, PropertyKind};
use protolayer_core::object::{ObjectId, ObjectStore};
use protolayer_core::value::Value;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a pretty-printed JSON array.
///
/// Each element has a `"name"` naming the event, a `"seq"` giving its
/// position in the recording, and an `"args"` object with the event fields.
/// Object handles are written as `"#index"` strings; missing prototypes as
/// `null`.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Json> = Vec::new();

    for (seq, recorded) in decode(bytes).enumerate() {
        let (name, args) = match recorded {
            RecordedEvent::ComposeBegin(e) => (
                "ComposeBegin",
                json!({
                    "base": opt_handle(e.base),
                    "base_kind": e.base_kind.as_str(),
                    "extension_count": e.extension_count,
                }),
            ),
            RecordedEvent::ExtensionSkipped(e) => (
                "ExtensionSkipped",
                json!({
                    "position": e.position,
                    "kind": e.kind.as_str(),
                }),
            ),
            RecordedEvent::LayerCreated(e) => (
                "LayerCreated",
                json!({
                    "position": e.position,
                    "source": handle(e.source),
                    "layer": handle(e.layer),
                    "prototype": opt_handle(e.prototype),
                    "property_count": e.property_count,
                }),
            ),
            RecordedEvent::ComposeEnd(e) => (
                "ComposeEnd",
                json!({
                    "result": handle(e.result),
                    "layers_created": e.layers_created,
                    "skipped": e.skipped,
                }),
            ),
            RecordedEvent::ChainWalk(e) => (
                "ChainWalk",
                json!({
                    "start": handle(e.start),
                    "stop": opt_handle(e.stop),
                    "depth": e.depth,
                    "stop_found": e.stop_found,
                }),
            ),
            RecordedEvent::FlattenEnd(e) => (
                "FlattenEnd",
                json!({
                    "result": handle(e.result),
                    "prototype": opt_handle(e.prototype),
                    "property_count": e.property_count,
                }),
            ),
            RecordedEvent::PropertyShadowed {
                key,
                shadowed,
                winner,
            } => (
                "PropertyShadowed",
                json!({
                    "key": key,
                    "shadowed": handle(shadowed),
                    "winner": handle(winner),
                }),
            ),
        };
        events.push(json!({
            "name": name,
            "seq": seq,
            "args": args,
        }));
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

/// Renders `object` and every ancestor as a JSON array, nearest first.
///
/// # Panics
///
/// Panics if `object` is a stale handle.
#[must_use]
pub fn snapshot(store: &ObjectStore, object: ObjectId) -> Json {
    let layers: Vec<Json> = store
        .proto_chain(object)
        .map(|layer| {
            let mut properties = Map::new();
            for (key, descriptor) in store.own_properties(layer) {
                properties.insert(key.clone(), describe(descriptor));
            }
            json!({
                "object": handle(layer),
                "root": layer == store.object_prototype(),
                "properties": properties,
            })
        })
        .collect();
    Json::Array(layers)
}

fn describe(descriptor: &PropertyDescriptor) -> Json {
    match &descriptor.kind {
        PropertyKind::Data { value, writable } => json!({
            "kind": "data",
            "type": value.kind().as_str(),
            "value": value_to_json(value),
            "writable": writable,
            "enumerable": descriptor.enumerable,
            "configurable": descriptor.configurable,
        }),
        PropertyKind::Accessor { set, .. } => json!({
            "kind": "accessor",
            "has_setter": set.is_some(),
            "enumerable": descriptor.enumerable,
            "configurable": descriptor.configurable,
        }),
    }
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Undefined | Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::String(s) => Json::String(s.clone()),
        Value::Object(o) => handle(*o),
    }
}

fn handle(id: ObjectId) -> Json {
    Json::String(id.to_string())
}

fn opt_handle(id: Option<ObjectId>) -> Json {
    id.map_or(Json::Null, handle)
}
