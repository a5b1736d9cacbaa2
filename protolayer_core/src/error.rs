// Copyright 2026 the Protolayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors from property mutation on an [`ObjectStore`](crate::object::ObjectStore).
//!
//! Composition and flattening never fail. Only the store's mutation API can
//! refuse a request, and only for reasons the descriptor flags encode.

use alloc::string::String;
use core::fmt;

/// Errors from [`define_property`](crate::object::ObjectStore::define_property),
/// [`delete_property`](crate::object::ObjectStore::delete_property), and
/// [`set`](crate::object::ObjectStore::set).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyError {
    /// Assignment to a data property whose `writable` flag is off.
    ReadOnly {
        /// The property name.
        key: String,
    },
    /// Assignment to an accessor property that has no setter.
    NoSetter {
        /// The property name.
        key: String,
    },
    /// Redefinition or deletion of a property whose `configurable` flag is off.
    NonConfigurable {
        /// The property name.
        key: String,
    },
}

impl PropertyError {
    /// Returns the name of the property the error refers to.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::ReadOnly { key } | Self::NoSetter { key } | Self::NonConfigurable { key } => key,
        }
    }
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly { key } => write!(f, "cannot assign to read-only property `{key}`"),
            Self::NoSetter { key } => {
                write!(f, "cannot assign to accessor property `{key}` without a setter")
            }
            Self::NonConfigurable { key } => {
                write!(f, "property `{key}` is not configurable")
            }
        }
    }
}

impl core::error::Error for PropertyError {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn display_names_the_key() {
        let err = PropertyError::ReadOnly {
            key: String::from("foo"),
        };
        assert_eq!(err.to_string(), "cannot assign to read-only property `foo`");
        assert_eq!(err.key(), "foo");
    }
}
