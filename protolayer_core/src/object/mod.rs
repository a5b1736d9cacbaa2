// Copyright 2026 the Protolayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Object data model.
//!
//! An *object* is a slot in an [`ObjectStore`]. Each object has:
//!
//! - An identity ([`ObjectId`]), a generational handle that becomes stale
//!   when the object is destroyed. Handle equality is reference identity.
//! - A prototype link, fixed at creation, to another live object or to
//!   nothing. Every store owns a root
//!   [object prototype](ObjectStore::object_prototype) that plain objects
//!   link to.
//! - **Own properties**: a [`DescriptorMap`](crate::descriptor::DescriptorMap)
//!   of full descriptors.
//!
//! Reads go through the chain ([`get`](ObjectStore::get)); writes only ever
//! touch the receiver or call a setter ([`set`](ObjectStore::set)).
//! [`proto_chain`](ObjectStore::proto_chain) and [`walk`](ObjectStore::walk)
//! expose the chain as an iterator and as an explicit layer list.

mod chain;
mod id;
mod store;

pub use chain::{ChainWalk, ProtoChain};
pub use id::{INVALID, ObjectId};
pub use store::ObjectStore;
