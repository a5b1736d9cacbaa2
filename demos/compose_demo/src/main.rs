// Copyright 2026 the Protolayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composes and flattens a small object chain with tracing enabled.
//!
//! Builds three source objects (one with a live counter getter), layers them
//! with [`compose_traced`], collapses the result with [`flatten_traced`], and
//! sends every event to both a
//! [`PrettyPrintSink`](protolayer_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](protolayer_debug::recorder::RecorderSink). The recording
//! and a snapshot of the flattened object are then written as JSON.

use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use protolayer_core::compose::{compose_traced, flatten_traced};
use protolayer_core::descriptor::PropertyDescriptor;
use protolayer_core::object::ObjectStore;
use protolayer_core::trace::{
    ChainWalkEvent, ComposeBeginEvent, ComposeEndEvent, ExtensionSkippedEvent, FlattenEndEvent,
    LayerCreatedEvent, PropertyShadowedEvent, TraceSink, Tracer,
};
use protolayer_core::value::Value;

use protolayer_debug::pretty::PrettyPrintSink;
use protolayer_debug::recorder::RecorderSink;

/// Forwards every event to two sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_compose_begin(&mut self, e: &ComposeBeginEvent) {
        self.pretty.on_compose_begin(e);
        self.recorder.on_compose_begin(e);
    }

    fn on_extension_skipped(&mut self, e: &ExtensionSkippedEvent) {
        self.pretty.on_extension_skipped(e);
        self.recorder.on_extension_skipped(e);
    }

    fn on_layer_created(&mut self, e: &LayerCreatedEvent) {
        self.pretty.on_layer_created(e);
        self.recorder.on_layer_created(e);
    }

    fn on_compose_end(&mut self, e: &ComposeEndEvent) {
        self.pretty.on_compose_end(e);
        self.recorder.on_compose_end(e);
    }

    fn on_chain_walk(&mut self, e: &ChainWalkEvent) {
        self.pretty.on_chain_walk(e);
        self.recorder.on_chain_walk(e);
    }

    fn on_flatten_end(&mut self, e: &FlattenEndEvent) {
        self.pretty.on_flatten_end(e);
        self.recorder.on_flatten_end(e);
    }

    fn on_property_shadowed(&mut self, e: &PropertyShadowedEvent<'_>) {
        self.pretty.on_property_shadowed(e);
        self.recorder.on_property_shadowed(e);
    }
}

fn main() {
    let mut store = ObjectStore::new();

    // -- sources -----------------------------------------------------------
    let counter = Arc::new(AtomicI32::new(0));
    let a = store.create_object_from([("id", "a")]);
    let ticks = Arc::clone(&counter);
    store
        .define_property(
            a,
            "foo",
            PropertyDescriptor::accessor(move || Value::from(ticks.load(Ordering::SeqCst))),
        )
        .expect("fresh object has no locked properties");
    let b = store.create_object_from([("id", Value::from("b")), ("bar", Value::from(2))]);
    let c = store.create_object_from([("id", Value::from("c")), ("baz", Value::from(3))]);

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = RecorderSink::new();
    let flat = {
        let mut tee = Tee {
            pretty: &mut pretty,
            recorder: &mut recorder,
        };
        let mut tracer = Tracer::new(&mut tee);

        // -- compose, then flatten -----------------------------------------
        let composed = compose_traced(
            &mut store,
            &Value::Object(a),
            &[Value::Object(b), Value::from("ignored"), Value::Object(c)],
            &mut tracer,
        );
        flatten_traced(&mut store, composed, &mut tracer)
    };

    counter.store(41, Ordering::SeqCst);
    println!(
        "flat: id={:?} foo={:?} bar={:?} baz={:?}",
        store.get(flat, "id"),
        store.get(flat, "foo"),
        store.get(flat, "bar"),
        store.get(flat, "baz"),
    );

    // -- export ------------------------------------------------------------
    let path = "compose_trace.json";
    let file = File::create(path).expect("failed to create compose_trace.json");
    let mut writer = BufWriter::new(file);
    protolayer_debug::json::export(recorder.as_bytes(), &mut writer)
        .expect("failed to write trace JSON");

    let snapshot = protolayer_debug::json::snapshot(&store, flat);
    println!("{snapshot:#}");
    println!("Wrote {path}");
}
