// Copyright 2026 the Protolayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property descriptors and descriptor maps.
//!
//! A [`PropertyDescriptor`] is the complete metadata for one named property:
//! either a data slot (`value` + `writable`) or an accessor (a shared read
//! closure plus an optional write closure), together with the `enumerable`
//! and `configurable` flags.
//!
//! Descriptors are moved between objects whole. Cloning an accessor
//! descriptor clones the [`Arc`]s around its closures, so the copy reads and
//! writes through exactly the same captured state as the original.
//!
//! A [`DescriptorMap`] maps property names to descriptors. It is a plain
//! ordered map; there are no inherited or ambient keys that could collide with
//! property names.

use alloc::collections::BTreeMap;
use alloc::collections::btree_map;
use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use crate::value::Value;

/// Read half of an accessor property.
pub type Getter = Arc<dyn Fn() -> Value + Send + Sync>;

/// Write half of an accessor property.
pub type Setter = Arc<dyn Fn(Value) + Send + Sync>;

/// The value-or-accessor part of a [`PropertyDescriptor`].
#[derive(Clone)]
pub enum PropertyKind {
    /// A plain stored value.
    Data {
        /// The stored value.
        value: Value,
        /// Whether assignment may replace the value.
        writable: bool,
    },
    /// A computed property backed by closures.
    Accessor {
        /// Invoked on every read.
        get: Getter,
        /// Invoked on assignment, if present.
        set: Option<Setter>,
    },
}

impl fmt::Debug for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data { value, writable } => f
                .debug_struct("Data")
                .field("value", value)
                .field("writable", writable)
                .finish(),
            Self::Accessor { set, .. } => f
                .debug_struct("Accessor")
                .field("has_setter", &set.is_some())
                .finish_non_exhaustive(),
        }
    }
}

/// Full metadata for one named property.
#[derive(Clone, Debug)]
pub struct PropertyDescriptor {
    /// Value or accessor pair.
    pub kind: PropertyKind,
    /// Whether the property shows up in enumeration.
    pub enumerable: bool,
    /// Whether the property may be redefined or deleted.
    pub configurable: bool,
}

impl PropertyDescriptor {
    /// A writable, enumerable, configurable data property.
    #[must_use]
    pub fn data(value: impl Into<Value>) -> Self {
        Self {
            kind: PropertyKind::Data {
                value: value.into(),
                writable: true,
            },
            enumerable: true,
            configurable: true,
        }
    }

    /// An enumerable, configurable accessor property with no setter.
    #[must_use]
    pub fn accessor<G>(get: G) -> Self
    where
        G: Fn() -> Value + Send + Sync + 'static,
    {
        Self {
            kind: PropertyKind::Accessor {
                get: Arc::new(get),
                set: None,
            },
            enumerable: true,
            configurable: true,
        }
    }

    /// An enumerable, configurable accessor property with both halves.
    #[must_use]
    pub fn accessor_with_setter<G, S>(get: G, set: S) -> Self
    where
        G: Fn() -> Value + Send + Sync + 'static,
        S: Fn(Value) + Send + Sync + 'static,
    {
        Self {
            kind: PropertyKind::Accessor {
                get: Arc::new(get),
                set: Some(Arc::new(set)),
            },
            enumerable: true,
            configurable: true,
        }
    }

    /// Sets the `enumerable` flag.
    #[must_use]
    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = enumerable;
        self
    }

    /// Sets the `configurable` flag.
    #[must_use]
    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = configurable;
        self
    }

    /// Sets the `writable` flag. Accessor descriptors have no such flag and
    /// are returned unchanged.
    #[must_use]
    pub fn with_writable(mut self, writable: bool) -> Self {
        if let PropertyKind::Data { writable: w, .. } = &mut self.kind {
            *w = writable;
        }
        self
    }

    /// Returns whether this is an accessor descriptor.
    #[must_use]
    pub fn is_accessor(&self) -> bool {
        matches!(self.kind, PropertyKind::Accessor { .. })
    }

    /// Returns whether this is a writable data descriptor.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        matches!(self.kind, PropertyKind::Data { writable: true, .. })
    }

    /// Returns the stored value of a data descriptor.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            PropertyKind::Data { value, .. } => Some(value),
            PropertyKind::Accessor { .. } => None,
        }
    }

    /// Returns the getter of an accessor descriptor.
    #[must_use]
    pub fn getter(&self) -> Option<&Getter> {
        match &self.kind {
            PropertyKind::Accessor { get, .. } => Some(get),
            PropertyKind::Data { .. } => None,
        }
    }

    /// Returns the setter of an accessor descriptor, if it has one.
    #[must_use]
    pub fn setter(&self) -> Option<&Setter> {
        match &self.kind {
            PropertyKind::Accessor { set, .. } => set.as_ref(),
            PropertyKind::Data { .. } => None,
        }
    }

    /// Reads the property: clones a stored value or invokes the getter.
    #[must_use]
    pub fn read(&self) -> Value {
        match &self.kind {
            PropertyKind::Data { value, .. } => value.clone(),
            PropertyKind::Accessor { get, .. } => get(),
        }
    }
}

/// A mapping from property name to [`PropertyDescriptor`].
///
/// Iteration is in key order.
#[derive(Clone, Debug, Default)]
pub struct DescriptorMap {
    entries: BTreeMap<String, PropertyDescriptor>,
}

impl DescriptorMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the map holds no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the descriptor for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyDescriptor> {
        self.entries.get(key)
    }

    /// Returns a mutable reference to the descriptor for `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut PropertyDescriptor> {
        self.entries.get_mut(key)
    }

    /// Returns whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts a descriptor, returning the one it replaced.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        descriptor: PropertyDescriptor,
    ) -> Option<PropertyDescriptor> {
        self.entries.insert(key.into(), descriptor)
    }

    /// Removes and returns the descriptor for `key`.
    pub fn remove(&mut self, key: &str) -> Option<PropertyDescriptor> {
        self.entries.remove(key)
    }

    /// Iterates over property names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over `(name, descriptor)` pairs.
    pub fn iter(&self) -> btree_map::Iter<'_, String, PropertyDescriptor> {
        self.entries.iter()
    }
}

impl FromIterator<(String, PropertyDescriptor)> for DescriptorMap {
    fn from_iter<I: IntoIterator<Item = (String, PropertyDescriptor)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DescriptorMap {
    type Item = (&'a String, &'a PropertyDescriptor);
    type IntoIter = btree_map::Iter<'a, String, PropertyDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use core::sync::atomic::{AtomicI32, Ordering};

    use super::*;

    #[test]
    fn data_defaults_are_permissive() {
        let d = PropertyDescriptor::data(1);
        assert!(d.is_writable());
        assert!(d.enumerable);
        assert!(d.configurable);
        assert_eq!(d.value(), Some(&Value::Number(1.0)));
    }

    #[test]
    fn writable_flag_ignored_on_accessors() {
        let d = PropertyDescriptor::accessor(|| Value::Null).with_writable(true);
        assert!(d.is_accessor());
        assert!(!d.is_writable());
        assert!(d.setter().is_none());
    }

    #[test]
    fn cloned_accessor_shares_state() {
        static COUNTER: AtomicI32 = AtomicI32::new(0);
        let original =
            PropertyDescriptor::accessor(|| Value::from(COUNTER.load(Ordering::SeqCst)));
        let copy = original.clone();
        assert_eq!(copy.read(), Value::from(0));
        COUNTER.store(5, Ordering::SeqCst);
        assert_eq!(copy.read(), Value::from(5));
        assert!(Arc::ptr_eq(
            original.getter().unwrap(),
            copy.getter().unwrap()
        ));
    }

    #[test]
    fn map_has_no_ambient_keys() {
        let map = DescriptorMap::new();
        assert!(map.get("toString").is_none());
        assert!(!map.contains_key("constructor"));
        assert!(map.is_empty());
    }

    #[test]
    fn insert_replaces_and_reports_previous() {
        let mut map = DescriptorMap::new();
        assert!(map.insert("id", PropertyDescriptor::data("a")).is_none());
        let prev = map.insert("id", PropertyDescriptor::data("b"));
        assert_eq!(prev.unwrap().value(), Some(&Value::from("a")));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("id").unwrap().value(), Some(&Value::from("b")));
    }

    #[test]
    fn keys_iterate_in_order() {
        let map: DescriptorMap = ["b", "c", "a"]
            .into_iter()
            .map(|k| (String::from(k), PropertyDescriptor::data(Value::Null)))
            .collect();
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }
}
