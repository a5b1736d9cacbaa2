// Copyright 2026 the Protolayer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property values.
//!
//! [`Value`] is what a data property holds, what a getter returns, and what the
//! composer accepts as its base and extension arguments. Only
//! [`Value::Object`] counts as an object; everything else is skipped or
//! normalized away by [`compose`](crate::compose::compose).

use alloc::string::String;
use core::fmt;

use crate::object::ObjectId;

/// A property value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// The absent value.
    #[default]
    Undefined,
    /// The explicit null value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A double-precision number.
    Number(f64),
    /// A string.
    String(String),
    /// A reference to an object in an [`ObjectStore`](crate::object::ObjectStore).
    Object(ObjectId),
}

/// The coarse type of a [`Value`], as reported in trace events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Undefined`].
    Undefined,
    /// [`Value::Null`].
    Null,
    /// [`Value::Bool`].
    Bool,
    /// [`Value::Number`].
    Number,
    /// [`Value::String`].
    String,
    /// [`Value::Object`].
    Object,
}

impl ValueKind {
    /// Returns a short lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// Returns the coarse type of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Undefined => ValueKind::Undefined,
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// Returns the object handle if this value is an object.
    #[inline]
    #[must_use]
    pub const fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns whether this value is an object.
    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Returns the number if this value is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice if this value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(String::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Self::Object(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_objects_are_objects() {
        assert!(!Value::Undefined.is_object());
        assert!(!Value::Null.is_object());
        assert!(!Value::from(true).is_object());
        assert!(!Value::from(1).is_object());
        assert!(!Value::from("hello").is_object());
        assert_eq!(Value::Null.as_object(), None);
    }

    #[test]
    fn kind_names() {
        assert_eq!(Value::Undefined.kind().as_str(), "undefined");
        assert_eq!(Value::from(2.5).kind(), ValueKind::Number);
        assert_eq!(Value::from("x").kind(), ValueKind::String);
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::from(3).as_number(), Some(3.0));
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::default(), Value::Undefined);
    }

    #[test]
    fn owned_strings_and_handles_convert() {
        let owned = String::from("payload");
        assert_eq!(Value::from(owned).as_str(), Some("payload"));

        let id = ObjectId::from_parts(7, 2);
        let v = Value::from(id);
        assert_eq!(v.kind(), ValueKind::Object);
        assert_eq!(v.as_object(), Some(id));
    }
}
