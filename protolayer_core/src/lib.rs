// Copyright 2026 the Protolayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Descriptor-preserving layered object composition and flattening.
//!
//! `protolayer_core` builds objects whose prototype chains stack the own
//! properties of several source objects on top of a base, and collapses such
//! chains back into a single flat object. Properties move as whole
//! descriptors, so accessor properties keep running their original closures
//! instead of being frozen into values. It is `no_std` compatible (with
//! `alloc`) and keeps every object in an arena addressed by generational
//! handles.
//!
//! # Architecture
//!
//! ```text
//!   base, [ext0, ext1, …]
//!       │
//!       ▼
//!   compose() ──► descriptor_map(ext) ──► ObjectStore::create_object_with_descriptors
//!       │
//!       ▼
//!   layer(extN) ──► … ──► layer(ext0) ──► base
//!       │
//!       ▼
//!   flatten_until() ──► ObjectStore::walk ──► ChainWalk ──► merged DescriptorMap
//! ```
//!
//! **[`object`]**: Struct-of-arrays object arena with generational handles,
//! fixed prototype links, own-property storage, and chain-aware `get`/`set`.
//!
//! **[`descriptor`]**: Property descriptors (data or accessor, with flags)
//! and the [`DescriptorMap`](descriptor::DescriptorMap) they are copied in.
//!
//! **[`value`]**: The values properties hold and the composer accepts.
//!
//! **[`compose`]**: The descriptor-map builder, the chain composer, and the
//! chain flattener.
//!
//! **[`error`]**: [`PropertyError`](error::PropertyError) for refused
//! property mutations.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! composition instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-property
//!   shadowing events during flattening.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod compose;
pub mod descriptor;
pub mod error;
pub mod object;
pub mod trace;
pub mod value;
