// Copyright 2026 the Protolayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays object storage with allocation, prototype links, and
//! property access.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use super::chain::{ChainWalk, ProtoChain};
use super::id::{INVALID, ObjectId};
use crate::descriptor::{DescriptorMap, PropertyDescriptor, PropertyKind, Setter};
use crate::error::PropertyError;
use crate::value::Value;

/// Slot of the root object prototype. Created first and never freed.
const ROOT: u32 = 0;

/// Struct-of-arrays storage for all objects.
///
/// Objects are addressed by [`ObjectId`] handles. Each object occupies a slot
/// in parallel arrays holding its prototype link and its own properties.
/// Destroyed objects are recycled via a free list, and generation counters
/// prevent stale handle access.
///
/// A prototype link is fixed when the object is created and must name an
/// object that is already alive, so chains cannot form cycles.
#[derive(Debug)]
pub struct ObjectStore {
    // -- Structure --
    pub(crate) prototype: Vec<u32>,
    pub(crate) properties: Vec<DescriptorMap>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

/// What [`ObjectStore::set`] decided to do, computed before mutating.
enum Assignment {
    UpdateOwn,
    DefineOwn,
    CallSetter(Setter),
}

impl ObjectStore {
    /// Creates a store holding only the root object prototype.
    #[must_use]
    pub fn new() -> Self {
        let mut store = Self {
            prototype: Vec::new(),
            properties: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        };
        let root = store.allocate(INVALID, DescriptorMap::new());
        debug_assert_eq!(root.idx, ROOT, "root prototype must occupy slot 0");
        store
    }

    /// Returns the root object prototype.
    ///
    /// Objects made with [`create_object`](Self::create_object) link here, and
    /// [`flatten`](crate::compose::flatten) stops here by default.
    #[must_use]
    pub fn object_prototype(&self) -> ObjectId {
        ObjectId {
            idx: ROOT,
            generation: self.generation[ROOT as usize],
        }
    }

    // -- Allocation API --

    /// Creates an empty plain object whose prototype is the root prototype.
    pub fn create_object(&mut self) -> ObjectId {
        self.allocate(ROOT, DescriptorMap::new())
    }

    /// Creates an empty object with the given prototype (`None` for none).
    ///
    /// # Panics
    ///
    /// Panics if `prototype` is a stale handle.
    pub fn create_object_with_proto(&mut self, prototype: Option<ObjectId>) -> ObjectId {
        self.create_object_with_descriptors(prototype, DescriptorMap::new())
    }

    /// Creates an object with the given prototype and own properties.
    ///
    /// # Panics
    ///
    /// Panics if `prototype` is a stale handle.
    pub fn create_object_with_descriptors(
        &mut self,
        prototype: Option<ObjectId>,
        properties: DescriptorMap,
    ) -> ObjectId {
        let proto = match prototype {
            Some(p) => {
                self.validate(p);
                p.idx
            }
            None => INVALID,
        };
        self.allocate(proto, properties)
    }

    /// Creates a plain object from `(name, value)` pairs, each becoming a
    /// writable, enumerable, configurable data property.
    pub fn create_object_from<K, V, I>(&mut self, entries: I) -> ObjectId
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let properties = entries
            .into_iter()
            .map(|(k, v)| (k.into(), PropertyDescriptor::data(v)))
            .collect();
        self.allocate(ROOT, properties)
    }

    /// Destroys an object, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, if it names the root prototype, or if
    /// another live object still uses it as its prototype.
    pub fn destroy_object(&mut self, id: ObjectId) {
        self.validate(id);
        let idx = id.idx;
        assert!(idx != ROOT, "cannot destroy the root object prototype");
        assert!(
            !self.prototype.contains(&idx),
            "cannot destroy an object that is still a prototype"
        );

        self.prototype[idx as usize] = INVALID;
        self.properties[idx as usize] = DescriptorMap::new();
        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live object.
    #[must_use]
    pub fn is_alive(&self, id: ObjectId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live objects, including the root prototype.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Structure API --

    /// Returns the prototype of an object, if any.
    #[must_use]
    pub fn prototype_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.validate(id);
        let p = self.prototype[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(ObjectId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns an iterator over `id` and its ancestors, nearest first.
    #[must_use]
    pub fn proto_chain(&self, id: ObjectId) -> ProtoChain<'_> {
        self.validate(id);
        ProtoChain::new(self, id.idx)
    }

    /// Walks upward from `start`, collecting every visited object until
    /// `stop` is reached (inclusive) or the chain ends.
    #[must_use]
    pub fn walk(&self, start: ObjectId, stop: Option<ObjectId>) -> ChainWalk {
        self.validate(start);
        ChainWalk::collect(self, start, stop)
    }

    // -- Own-property API --

    /// Returns the own properties of an object.
    #[must_use]
    pub fn own_properties(&self, id: ObjectId) -> &DescriptorMap {
        self.validate(id);
        &self.properties[id.idx as usize]
    }

    /// Returns the descriptor of an own property.
    #[must_use]
    pub fn own_property(&self, id: ObjectId, key: &str) -> Option<&PropertyDescriptor> {
        self.own_properties(id).get(key)
    }

    /// Iterates over the names of an object's own properties.
    pub fn own_property_names(&self, id: ObjectId) -> impl Iterator<Item = &str> {
        self.own_properties(id).keys()
    }

    /// Returns a freshly allocated copy of an object's own descriptors.
    #[must_use]
    pub fn own_descriptor_map(&self, id: ObjectId) -> DescriptorMap {
        self.own_properties(id).clone()
    }

    /// Installs `descriptor` as the own property `key`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::NonConfigurable`] if `key` already exists as a
    /// non-configurable own property.
    pub fn define_property(
        &mut self,
        id: ObjectId,
        key: impl Into<String>,
        descriptor: PropertyDescriptor,
    ) -> Result<(), PropertyError> {
        self.validate(id);
        let key = key.into();
        let props = &mut self.properties[id.idx as usize];
        if props.get(&key).is_some_and(|d| !d.configurable) {
            return Err(PropertyError::NonConfigurable { key });
        }
        props.insert(key, descriptor);
        Ok(())
    }

    /// Removes the own property `key`, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::NonConfigurable`] if the property is not
    /// configurable.
    pub fn delete_property(&mut self, id: ObjectId, key: &str) -> Result<bool, PropertyError> {
        self.validate(id);
        let props = &mut self.properties[id.idx as usize];
        match props.get(key) {
            None => Ok(false),
            Some(d) if !d.configurable => Err(PropertyError::NonConfigurable {
                key: String::from(key),
            }),
            Some(_) => {
                props.remove(key);
                Ok(true)
            }
        }
    }

    // -- Chain-aware property API --

    /// Finds the nearest object on `id`'s chain that owns `key`.
    #[must_use]
    pub fn find_property(
        &self,
        id: ObjectId,
        key: &str,
    ) -> Option<(ObjectId, &PropertyDescriptor)> {
        self.proto_chain(id).find_map(|owner| {
            self.properties[owner.idx as usize]
                .get(key)
                .map(|d| (owner, d))
        })
    }

    /// Returns whether `key` is present on `id` or any ancestor.
    #[must_use]
    pub fn has_property(&self, id: ObjectId, key: &str) -> bool {
        self.find_property(id, key).is_some()
    }

    /// Reads `key` through the prototype chain.
    ///
    /// Data properties yield their stored value; accessor properties invoke
    /// their getter on every call. A missing property reads as
    /// [`Value::Undefined`].
    #[must_use]
    pub fn get(&self, id: ObjectId, key: &str) -> Value {
        self.find_property(id, key)
            .map_or(Value::Undefined, |(_, d)| d.read())
    }

    /// Assigns `value` to `key` on `id`.
    ///
    /// The nearest descriptor for `key` decides the outcome: an accessor calls
    /// its setter, a writable own data property is updated in place, and a
    /// writable inherited data property (or a missing key) becomes a new own
    /// data property of `id`. Ancestors are never modified.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::ReadOnly`] for a non-writable data property
    /// and [`PropertyError::NoSetter`] for an accessor without a setter.
    pub fn set(&mut self, id: ObjectId, key: &str, value: Value) -> Result<(), PropertyError> {
        let assignment = match self.find_property(id, key) {
            None => Assignment::DefineOwn,
            Some((owner, descriptor)) => match &descriptor.kind {
                PropertyKind::Accessor { set: Some(s), .. } => {
                    Assignment::CallSetter(Arc::clone(s))
                }
                PropertyKind::Accessor { set: None, .. } => {
                    return Err(PropertyError::NoSetter {
                        key: String::from(key),
                    });
                }
                PropertyKind::Data {
                    writable: false, ..
                } => {
                    return Err(PropertyError::ReadOnly {
                        key: String::from(key),
                    });
                }
                PropertyKind::Data { writable: true, .. } if owner == id => Assignment::UpdateOwn,
                PropertyKind::Data { writable: true, .. } => Assignment::DefineOwn,
            },
        };

        match assignment {
            Assignment::CallSetter(setter) => setter(value),
            Assignment::UpdateOwn => {
                if let Some(PropertyDescriptor {
                    kind: PropertyKind::Data { value: slot, .. },
                    ..
                }) = self.properties[id.idx as usize].get_mut(key)
                {
                    *slot = value;
                }
            }
            Assignment::DefineOwn => {
                self.properties[id.idx as usize].insert(key, PropertyDescriptor::data(value));
            }
        }
        Ok(())
    }

    // -- Internal helpers --

    fn allocate(&mut self, prototype: u32, properties: DescriptorMap) -> ObjectId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; its generation was bumped on destroy.
            self.prototype[idx as usize] = prototype;
            self.properties[idx as usize] = properties;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.prototype.push(prototype);
            self.properties.push(properties);
            self.generation.push(0);
            idx
        };

        ObjectId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: ObjectId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale ObjectId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }
}
