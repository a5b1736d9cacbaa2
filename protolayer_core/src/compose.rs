// Copyright 2026 the Protolayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layered composition and flattening.
//!
//! [`compose`] folds a base and a list of extensions into a chain of freshly
//! allocated layers, one per object extension, each holding a verbatim copy
//! of that extension's own descriptors:
//!
//! ```text
//!   result ──► layer(ext[n]) ──► … ──► layer(ext[0]) ──► base
//! ```
//!
//! [`flatten`] goes the other way: it walks upward from an object to a stop
//! ancestor, then merges the visited layers' descriptors from the most
//! distant one down, so nearer layers win:
//!
//! ```text
//!   walk:   start, p1, p2, …, stop
//!   merge:  stop → … → p2 → p1 → start     (later insert overwrites)
//! ```
//!
//! Neither operation reads a property through a getter or writes to an
//! existing object. Accessors are carried as descriptors, so reads on the
//! result still run the original closures.
//!
//! Neither operation fails. Non-object arguments are normalized or skipped.

#[cfg(feature = "trace-rich")]
use alloc::collections::BTreeMap;
#[cfg(feature = "trace-rich")]
use alloc::string::String;

use crate::descriptor::DescriptorMap;
use crate::object::{ChainWalk, ObjectId, ObjectStore};
#[cfg(feature = "trace-rich")]
use crate::trace::PropertyShadowedEvent;
use crate::trace::{
    ChainWalkEvent, ComposeBeginEvent, ComposeEndEvent, ExtensionSkippedEvent, FlattenEndEvent,
    LayerCreatedEvent, Tracer, count,
};
use crate::value::Value;

/// Returns a freshly allocated map of `object`'s own property descriptors.
///
/// Inherited properties are not included. The map is independent of the
/// store; accessor entries share their closures with the originals.
#[must_use]
pub fn descriptor_map(store: &ObjectStore, object: ObjectId) -> DescriptorMap {
    store.own_descriptor_map(object)
}

/// Layers each object extension's own descriptors on top of `base`.
///
/// A non-object `base` means "no prototype". Non-object extensions are
/// skipped. Each object extension produces a new layer whose prototype is
/// the previous one, so the chain read upward from the result visits the
/// extensions last to first and then the base.
///
/// If no extension is an object the base itself is returned; if the base is
/// not an object either, the result is a new empty object with no prototype.
///
/// # Panics
///
/// Panics if `base` or an extension holds a stale [`ObjectId`].
pub fn compose(store: &mut ObjectStore, base: &Value, extensions: &[Value]) -> ObjectId {
    compose_traced(store, base, extensions, &mut Tracer::none())
}

/// [`compose`] with trace events.
///
/// # Panics
///
/// Panics if `base` or an extension holds a stale [`ObjectId`].
pub fn compose_traced(
    store: &mut ObjectStore,
    base: &Value,
    extensions: &[Value],
    tracer: &mut Tracer<'_>,
) -> ObjectId {
    let base_id = base.as_object();
    tracer.compose_begin(&ComposeBeginEvent {
        base: base_id,
        base_kind: base.kind(),
        extension_count: count(extensions.len()),
    });

    let mut acc = base_id;
    let mut layers_created = 0_usize;
    let mut skipped = 0_usize;

    for (position, extension) in extensions.iter().enumerate() {
        let Some(source) = extension.as_object() else {
            skipped += 1;
            tracer.extension_skipped(&ExtensionSkippedEvent {
                position: count(position),
                kind: extension.kind(),
            });
            continue;
        };

        let properties = descriptor_map(store, source);
        let property_count = count(properties.len());
        let layer = store.create_object_with_descriptors(acc, properties);
        tracer.layer_created(&LayerCreatedEvent {
            position: count(position),
            source,
            layer,
            prototype: acc,
            property_count,
        });
        layers_created += 1;
        acc = Some(layer);
    }

    let result = match acc {
        Some(id) => id,
        None => store.create_object_with_proto(None),
    };
    tracer.compose_end(&ComposeEndEvent {
        result,
        layers_created: count(layers_created),
        skipped: count(skipped),
    });
    result
}

/// Collapses `object`'s chain up to the root object prototype into a single
/// new object.
///
/// Equivalent to [`flatten_until`] with
/// [`store.object_prototype()`](ObjectStore::object_prototype) as the stop.
///
/// # Panics
///
/// Panics if `object` is a stale handle.
pub fn flatten(store: &mut ObjectStore, object: ObjectId) -> ObjectId {
    flatten_traced(store, object, &mut Tracer::none())
}

/// [`flatten`] with trace events.
///
/// # Panics
///
/// Panics if `object` is a stale handle.
pub fn flatten_traced(
    store: &mut ObjectStore,
    object: ObjectId,
    tracer: &mut Tracer<'_>,
) -> ObjectId {
    let stop = Value::from(store.object_prototype());
    flatten_until_traced(store, object, &stop, tracer)
}

/// Collapses `object`'s chain up to `stop` into a single new object.
///
/// The walk starts at `object` itself and ends at `stop` (inclusive) or at
/// the end of the chain. Own descriptors of every visited object are merged,
/// nearer objects overriding farther ones. The result's prototype is `stop`
/// if the walk reached it and nothing otherwise; a `stop` that is not an
/// object is never reached.
///
/// # Panics
///
/// Panics if `object` is a stale handle.
pub fn flatten_until(store: &mut ObjectStore, object: ObjectId, stop: &Value) -> ObjectId {
    flatten_until_traced(store, object, stop, &mut Tracer::none())
}

/// [`flatten_until`] with trace events.
///
/// # Panics
///
/// Panics if `object` is a stale handle.
pub fn flatten_until_traced(
    store: &mut ObjectStore,
    object: ObjectId,
    stop: &Value,
    tracer: &mut Tracer<'_>,
) -> ObjectId {
    let stop = stop.as_object();
    let walk = store.walk(object, stop);
    tracer.chain_walk(&ChainWalkEvent {
        start: object,
        stop,
        depth: count(walk.depth()),
        stop_found: walk.stop().is_some(),
    });

    let merged = merge_layers(store, &walk, tracer);
    let property_count = count(merged.len());
    let prototype = walk.stop();
    let result = store.create_object_with_descriptors(prototype, merged);
    tracer.flatten_end(&FlattenEndEvent {
        result,
        prototype,
        property_count,
    });
    result
}

/// Merges the own descriptors of every walked layer, farthest first.
fn merge_layers(store: &ObjectStore, walk: &ChainWalk, tracer: &mut Tracer<'_>) -> DescriptorMap {
    let mut merged = DescriptorMap::new();
    #[cfg(feature = "trace-rich")]
    let mut owners: BTreeMap<String, ObjectId> = BTreeMap::new();
    #[cfg(not(feature = "trace-rich"))]
    let _ = tracer;

    for layer in walk.farthest_first() {
        for (key, descriptor) in store.own_properties(layer) {
            #[cfg(feature = "trace-rich")]
            if let Some(shadowed) = owners.insert(key.clone(), layer) {
                tracer.property_shadowed(&PropertyShadowedEvent {
                    key,
                    shadowed,
                    winner: layer,
                });
            }
            merged.insert(key.clone(), descriptor.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;
    use core::sync::atomic::{AtomicI32, Ordering};

    use super::*;
    use crate::descriptor::PropertyDescriptor;

    /// Builds the `a`, `b`, `c` fixture used by the flattening tests.
    fn abc(store: &mut ObjectStore) -> (ObjectId, ObjectId, ObjectId) {
        let a = store.create_object_from([("id", Value::from("a")), ("foo", Value::from(1))]);
        let b = store.create_object_from([("id", Value::from("b")), ("bar", Value::from(2))]);
        let c = store.create_object_from([("id", Value::from("c")), ("baz", Value::from(3))]);
        (a, b, c)
    }

    fn empty(store: &mut ObjectStore) -> Value {
        Value::Object(store.create_object())
    }

    // -- descriptor_map --

    #[test]
    fn descriptor_map_keeps_value_and_flags() {
        let mut store = ObjectStore::new();
        let o = store.create_object_with_proto(None);
        store
            .define_property(
                o,
                "foo",
                PropertyDescriptor::data("payload")
                    .with_writable(false)
                    .with_configurable(false),
            )
            .unwrap();

        let map = descriptor_map(&store, o);
        let foo = map.get("foo").unwrap();
        assert_eq!(foo.value(), Some(&Value::from("payload")));
        assert!(foo.enumerable);
        assert!(!foo.is_writable());
        assert!(!foo.configurable);
    }

    #[test]
    fn descriptor_map_is_own_only() {
        let mut store = ObjectStore::new();
        let parent = store.create_object_from([("inherited", 1)]);
        let child = store.create_object_with_proto(Some(parent));
        store
            .define_property(child, "own", PropertyDescriptor::data(2))
            .unwrap();

        let map = descriptor_map(&store, child);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["own"]);
    }

    #[test]
    fn descriptor_map_is_a_copy() {
        let mut store = ObjectStore::new();
        let o = store.create_object_from([("x", 1)]);
        let mut map = descriptor_map(&store, o);
        map.remove("x");
        assert!(store.own_property(o, "x").is_some());
    }

    // -- compose --

    #[test]
    fn compose_returns_a_new_object() {
        let mut store = ObjectStore::new();
        let a = store.create_object();
        let b = store.create_object();
        let result = compose(&mut store, &Value::Object(a), &[Value::Object(b)]);
        assert_ne!(result, a);
        assert_ne!(result, b);
    }

    #[test]
    fn compose_uses_the_prototype_chain() {
        let mut store = ObjectStore::new();
        let a = store.create_object();
        let ext = empty(&mut store);
        let result = compose(&mut store, &Value::Object(a), &[ext]);
        assert_eq!(store.prototype_of(result), Some(a));
    }

    #[test]
    fn compose_retains_accessors() {
        static I: AtomicI32 = AtomicI32::new(0);
        let mut store = ObjectStore::new();
        let a = store.create_object();
        store
            .define_property(
                a,
                "foo",
                PropertyDescriptor::accessor(|| Value::from(I.load(Ordering::SeqCst))),
            )
            .unwrap();
        let ext = empty(&mut store);

        let result = compose(&mut store, &Value::Object(a), &[ext]);
        assert_eq!(store.get(result, "foo"), Value::from(0));
        I.fetch_add(1, Ordering::SeqCst);
        assert_eq!(store.get(result, "foo"), Value::from(1));
    }

    #[test]
    fn compose_copies_extension_accessors_live() {
        static J: AtomicI32 = AtomicI32::new(10);
        let mut store = ObjectStore::new();
        let base = store.create_object();
        let ext = store.create_object();
        store
            .define_property(
                ext,
                "bar",
                PropertyDescriptor::accessor(|| Value::from(J.load(Ordering::SeqCst))),
            )
            .unwrap();

        let result = compose(&mut store, &Value::Object(base), &[Value::Object(ext)]);
        assert!(store.own_property(result, "bar").unwrap().is_accessor());
        J.store(11, Ordering::SeqCst);
        assert_eq!(store.get(result, "bar"), Value::from(11));
    }

    #[test]
    fn compose_uses_no_prototype_for_invalid_bases() {
        let mut store = ObjectStore::new();
        let bases = [
            Value::Undefined,
            Value::Null,
            Value::from(true),
            Value::from(1),
            Value::from("hello"),
        ];
        for base in &bases {
            let ext = empty(&mut store);
            let result = compose(&mut store, base, &[ext]);
            assert_eq!(store.prototype_of(result), None, "base {base:?}");
        }
    }

    #[test]
    fn compose_ignores_non_object_extensions() {
        let mut store = ObjectStore::new();
        let base = store.create_object();
        let result = compose(
            &mut store,
            &Value::Object(base),
            &[
                Value::Null,
                Value::Undefined,
                Value::from(1),
                Value::from(true),
                Value::from("hello"),
            ],
        );
        assert_eq!(store.prototype_of(result), Some(store.object_prototype()));
        assert_eq!(result, base, "no valid extension leaves the base as is");
    }

    #[test]
    fn compose_with_nothing_valid_yields_bare_object() {
        let mut store = ObjectStore::new();
        let result = compose(&mut store, &Value::Null, &[Value::from(3)]);
        assert_eq!(store.prototype_of(result), None);
        assert!(store.own_properties(result).is_empty());
    }

    #[test]
    fn compose_layers_in_order() {
        let mut store = ObjectStore::new();
        let (a, b, c) = abc(&mut store);
        let result = compose(
            &mut store,
            &Value::Object(a),
            &[Value::Object(b), Value::Null, Value::Object(c)],
        );

        let chain: Vec<_> = store.proto_chain(result).collect();
        assert_eq!(chain.len(), 4, "c-layer, b-layer, a, root");
        assert_eq!(chain[2], a);
        assert_eq!(store.get(chain[0], "id"), Value::from("c"));
        assert_eq!(store.get(chain[1], "id"), Value::from("b"));
        assert_eq!(store.get(result, "foo"), Value::from(1));
        assert_eq!(store.get(result, "bar"), Value::from(2));
    }

    #[test]
    fn compose_does_not_mutate_inputs() {
        let mut store = ObjectStore::new();
        let (a, b, _) = abc(&mut store);
        let result = compose(&mut store, &Value::Object(a), &[Value::Object(b)]);
        store.set(result, "id", Value::from("changed")).unwrap();
        store.set(result, "extra", Value::from(9)).unwrap();

        assert_eq!(store.get(a, "id"), Value::from("a"));
        assert_eq!(store.get(b, "id"), Value::from("b"));
        assert!(!store.has_property(b, "extra"));
        assert_eq!(store.prototype_of(b), Some(store.object_prototype()));
    }

    // -- flatten --

    #[test]
    fn flatten_merges_nearest_wins() {
        let mut store = ObjectStore::new();
        let (a, b, c) = abc(&mut store);
        let composed = compose(
            &mut store,
            &Value::Object(a),
            &[Value::Object(b), Value::Object(c)],
        );
        let flat = flatten(&mut store, composed);

        let own = store.own_properties(flat);
        assert_eq!(own.get("id").unwrap().value(), Some(&Value::from("c")));
        assert_eq!(own.get("foo").unwrap().value(), Some(&Value::from(1)));
        assert_eq!(own.get("bar").unwrap().value(), Some(&Value::from(2)));
        assert_eq!(own.get("baz").unwrap().value(), Some(&Value::from(3)));
        assert_eq!(own.len(), 4);
    }

    #[test]
    fn flatten_defaults_to_object_prototype() {
        let mut store = ObjectStore::new();
        let o = store.create_object();
        let flat = flatten(&mut store, o);
        assert_eq!(store.prototype_of(flat), Some(store.object_prototype()));
        assert_ne!(flat, o);
    }

    #[test]
    fn flatten_stops_at_found_ancestor() {
        let mut store = ObjectStore::new();
        let (a, _, _) = abc(&mut store);
        let ext = empty(&mut store);
        let composed = compose(&mut store, &Value::Object(a), &[ext]);
        let flat = flatten_until(&mut store, composed, &Value::Object(a));
        assert_eq!(store.prototype_of(flat), Some(a));
        assert_eq!(store.get(flat, "foo"), Value::from(1));
        let foo = store.own_property(flat, "foo");
        assert!(foo.is_some(), "stop ancestor's own properties are merged");
        assert_eq!(foo.unwrap().value(), Some(&Value::from(1)));
    }

    #[test]
    fn flatten_merges_root_prototype_properties() {
        let mut store = ObjectStore::new();
        let root = store.object_prototype();
        store
            .define_property(root, "toString", PropertyDescriptor::data("[object]"))
            .unwrap();
        let o = store.create_object_from([("x", 1)]);
        let flat = flatten(&mut store, o);

        assert_eq!(store.prototype_of(flat), Some(root));
        let names: Vec<_> = store.own_property_names(flat).collect();
        assert_eq!(names, vec!["toString", "x"]);
        assert_eq!(
            store.own_property(flat, "toString").unwrap().value(),
            Some(&Value::from("[object]"))
        );
    }

    #[test]
    fn flatten_without_found_ancestor_has_no_prototype() {
        let mut store = ObjectStore::new();
        let (a, _, _) = abc(&mut store);
        let unrelated = store.create_object();
        let ext = empty(&mut store);
        let composed = compose(&mut store, &Value::Object(a), &[ext]);
        let flat = flatten_until(&mut store, composed, &Value::Object(unrelated));
        assert_eq!(store.prototype_of(flat), None);
        assert_eq!(store.get(flat, "id"), Value::from("a"));
    }

    #[test]
    fn flatten_with_non_object_stop_runs_to_end() {
        let mut store = ObjectStore::new();
        let (a, b, _) = abc(&mut store);
        let composed = compose(&mut store, &Value::Object(a), &[Value::Object(b)]);
        for stop in [Value::Null, Value::Undefined, Value::from("a")] {
            let flat = flatten_until(&mut store, composed, &stop);
            assert_eq!(store.prototype_of(flat), None, "stop {stop:?}");
            assert_eq!(store.get(flat, "id"), Value::from("b"));
        }
    }

    #[test]
    fn flatten_retains_accessors() {
        static K: AtomicI32 = AtomicI32::new(0);
        let mut store = ObjectStore::new();
        let a = store.create_object();
        store
            .define_property(
                a,
                "foo",
                PropertyDescriptor::accessor(|| Value::from(K.load(Ordering::SeqCst))),
            )
            .unwrap();
        let ext = empty(&mut store);
        let composed = compose(&mut store, &Value::Object(a), &[ext]);
        let flat = flatten(&mut store, composed);

        assert!(store.own_property(flat, "foo").unwrap().is_accessor());
        assert_eq!(store.get(flat, "foo"), Value::from(0));
        K.fetch_add(1, Ordering::SeqCst);
        assert_eq!(store.get(flat, "foo"), Value::from(1));
    }

    #[test]
    fn flatten_preserves_descriptor_flags() {
        let mut store = ObjectStore::new();
        let a = store.create_object();
        store
            .define_property(
                a,
                "hidden",
                PropertyDescriptor::data(1)
                    .with_enumerable(false)
                    .with_writable(false),
            )
            .unwrap();
        let flat = flatten(&mut store, a);
        let d = store.own_property(flat, "hidden").unwrap();
        assert!(!d.enumerable);
        assert!(!d.is_writable());
        assert!(d.configurable);
    }

    #[test]
    fn flatten_is_distinct_from_every_visited_object() {
        let mut store = ObjectStore::new();
        let (a, b, c) = abc(&mut store);
        let composed = compose(
            &mut store,
            &Value::Object(a),
            &[Value::Object(b), Value::Object(c)],
        );
        let visited: Vec<_> = store.proto_chain(composed).collect();
        let flat = flatten(&mut store, composed);
        assert!(!visited.contains(&flat));
    }

    #[test]
    fn flatten_of_null_prototype_object() {
        let mut store = ObjectStore::new();
        let o = store.create_object_with_proto(None);
        store
            .define_property(o, "x", PropertyDescriptor::data(1))
            .unwrap();
        let flat = flatten(&mut store, o);
        assert_eq!(store.prototype_of(flat), None);
        assert_eq!(store.get(flat, "x"), Value::from(1));
    }

    #[cfg(feature = "trace")]
    #[test]
    fn compose_and_flatten_emit_events() {
        use crate::trace::TraceSink;
        use crate::value::ValueKind;

        #[derive(Default)]
        struct Log {
            skipped: Vec<(u32, ValueKind)>,
            layers: Vec<ObjectId>,
            ends: Vec<ComposeEndEvent>,
            walks: Vec<ChainWalkEvent>,
            flats: Vec<FlattenEndEvent>,
        }
        impl TraceSink for Log {
            fn on_extension_skipped(&mut self, e: &ExtensionSkippedEvent) {
                self.skipped.push((e.position, e.kind));
            }
            fn on_layer_created(&mut self, e: &LayerCreatedEvent) {
                self.layers.push(e.source);
            }
            fn on_compose_end(&mut self, e: &ComposeEndEvent) {
                self.ends.push(*e);
            }
            fn on_chain_walk(&mut self, e: &ChainWalkEvent) {
                self.walks.push(*e);
            }
            fn on_flatten_end(&mut self, e: &FlattenEndEvent) {
                self.flats.push(*e);
            }
        }

        let mut store = ObjectStore::new();
        let (a, b, c) = abc(&mut store);
        let mut log = Log::default();
        let mut tracer = Tracer::new(&mut log);
        let composed = compose_traced(
            &mut store,
            &Value::Object(a),
            &[Value::Object(b), Value::from(1), Value::Object(c)],
            &mut tracer,
        );
        let flat = flatten_traced(&mut store, composed, &mut tracer);
        drop(tracer);

        assert_eq!(log.skipped, vec![(1, ValueKind::Number)]);
        assert_eq!(log.layers, vec![b, c]);
        assert_eq!(log.ends[0].result, composed);
        assert_eq!(log.ends[0].layers_created, 2);
        assert_eq!(log.ends[0].skipped, 1);
        assert_eq!(log.walks[0].depth, 4);
        assert!(log.walks[0].stop_found);
        assert_eq!(log.flats[0].result, flat);
        assert_eq!(log.flats[0].property_count, 4);
    }

    #[cfg(feature = "trace-rich")]
    #[test]
    fn flatten_reports_shadowed_properties() {
        use alloc::string::ToString;

        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Shadows(Vec<(String, ObjectId, ObjectId)>);
        impl TraceSink for Shadows {
            fn on_property_shadowed(&mut self, e: &PropertyShadowedEvent<'_>) {
                self.0.push((e.key.to_string(), e.shadowed, e.winner));
            }
        }

        let mut store = ObjectStore::new();
        let (a, b, _) = abc(&mut store);
        let composed = compose(&mut store, &Value::Object(a), &[Value::Object(b)]);
        let mut sink = Shadows::default();
        let mut tracer = Tracer::new(&mut sink);
        let _ = flatten_traced(&mut store, composed, &mut tracer);
        drop(tracer);

        assert_eq!(sink.0, vec![(String::from("id"), a, composed)]);
    }
}
