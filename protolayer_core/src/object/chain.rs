// Copyright 2026 the Protolayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prototype-chain traversal.

use alloc::vec::Vec;

use super::id::{INVALID, ObjectId};
use super::store::ObjectStore;

/// An iterator over an object and its ancestors, nearest first.
///
/// Created by [`ObjectStore::proto_chain`].
#[derive(Debug)]
pub struct ProtoChain<'a> {
    store: &'a ObjectStore,
    current: u32,
}

impl<'a> ProtoChain<'a> {
    pub(crate) fn new(store: &'a ObjectStore, start: u32) -> Self {
        Self {
            store,
            current: start,
        }
    }
}

impl Iterator for ProtoChain<'_> {
    type Item = ObjectId;

    fn next(&mut self) -> Option<ObjectId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.prototype[idx as usize];
        Some(ObjectId {
            idx,
            generation: self.store.generation[idx as usize],
        })
    }
}

/// The explicit, ordered list of layers visited by an upward chain walk.
///
/// Created by [`ObjectStore::walk`]. Layers are held nearest first: index 0
/// is the starting object. If the walk met its stop ancestor, that ancestor
/// is the last layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainWalk {
    layers: Vec<ObjectId>,
    stop: Option<ObjectId>,
}

impl ChainWalk {
    pub(crate) fn collect(store: &ObjectStore, start: ObjectId, stop: Option<ObjectId>) -> Self {
        let mut layers = Vec::new();
        let mut found = None;
        for id in store.proto_chain(start) {
            layers.push(id);
            if Some(id) == stop {
                found = stop;
                break;
            }
        }
        Self {
            layers,
            stop: found,
        }
    }

    /// Returns the visited layers, nearest first.
    #[must_use]
    pub fn layers(&self) -> &[ObjectId] {
        &self.layers
    }

    /// Returns the visited layers, most distant first (merge order).
    pub fn farthest_first(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.layers.iter().rev().copied()
    }

    /// Returns the stop ancestor if the walk reached it.
    #[must_use]
    pub fn stop(&self) -> Option<ObjectId> {
        self.stop
    }

    /// Returns the number of visited layers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.layers.len()
    }
}
