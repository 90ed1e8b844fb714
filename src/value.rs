//! Stored values and lookup results.
//!
//! `Value` is what a `SafeMap` stores: the absent sentinel, a scalar, a plain
//! nested table, or an already-safe nested map. `ValueRef` is what a safe
//! lookup hands back; every nested mapping comes out as a `SafeRef` view no
//! matter which of the two mapping variants it was stored as.

use crate::safe_map::{SafeMap, SafeRef};
use crate::table::Table;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// A value stored in a [`SafeMap`].
#[derive(Clone)]
pub enum Value<K, V, S = RandomState> {
    /// The absent sentinel. Safe lookups treat it exactly like a missing key.
    Null,
    Scalar(V),
    /// A plain nested mapping; wrapped into a safe view when read.
    Map(Table<K, Value<K, V, S>, S>),
    /// A nested mapping that is already safe.
    Safe(SafeMap<K, V, S>),
}

impl<K, V, S> Value<K, V, S> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for both nested mapping variants.
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Map(_) | Value::Safe(_))
    }

    pub fn as_scalar(&self) -> Option<&V> {
        match self {
            Value::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_scalar_mut(&mut self) -> Option<&mut V> {
        match self {
            Value::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// The entries of a nested mapping, whichever variant holds them.
    pub fn as_table(&self) -> Option<&Table<K, Value<K, V, S>, S>> {
        match self {
            Value::Map(t) => Some(t),
            Value::Safe(m) => Some(m.as_table()),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table<K, Value<K, V, S>, S>> {
        match self {
            Value::Map(t) => Some(t),
            Value::Safe(m) => Some(m.as_table_mut()),
            _ => None,
        }
    }

    /// Read this value the way a safe lookup would.
    pub fn view(&self) -> ValueRef<'_, K, V, S> {
        ValueRef::from(self)
    }
}

impl<K, V, S> Default for Value<K, V, S> {
    fn default() -> Self {
        Value::Null
    }
}

impl<K, V, S> From<Option<V>> for Value<K, V, S> {
    fn from(v: Option<V>) -> Self {
        v.map_or(Value::Null, Value::Scalar)
    }
}

impl<K, V, S> From<Table<K, Value<K, V, S>, S>> for Value<K, V, S> {
    fn from(t: Table<K, Value<K, V, S>, S>) -> Self {
        Value::Map(t)
    }
}

impl<K, V, S> From<SafeMap<K, V, S>> for Value<K, V, S> {
    fn from(m: SafeMap<K, V, S>) -> Self {
        Value::Safe(m)
    }
}

impl<K, V, S> fmt::Debug for Value<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            Value::Map(t) => f.debug_tuple("Map").field(t).finish(),
            Value::Safe(m) => f.debug_tuple("Safe").field(m).finish(),
        }
    }
}

/// A plain and a safe nested mapping compare equal when their entries do.
impl<K, V, S> PartialEq for Value<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            _ => match (self.as_table(), other.as_table()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

/// Result of a safe lookup.
///
/// `Null` is the absent sentinel: the key was missing or stored `Value::Null`
/// and no default was given. Nested mappings always come back as `Map`.
pub enum ValueRef<'a, K, V, S = RandomState> {
    Null,
    Scalar(&'a V),
    Map(SafeRef<'a, K, V, S>),
}

impl<K, V, S> Clone for ValueRef<'_, K, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, S> Copy for ValueRef<'_, K, V, S> {}

impl<'a, K, V, S> From<&'a Value<K, V, S>> for ValueRef<'a, K, V, S> {
    fn from(v: &'a Value<K, V, S>) -> Self {
        match v {
            Value::Null => ValueRef::Null,
            Value::Scalar(s) => ValueRef::Scalar(s),
            Value::Map(t) => ValueRef::Map(SafeRef::new(t)),
            // Re-wrapping is a no-op: the view points at the inner table.
            Value::Safe(m) => ValueRef::Map(m.view()),
        }
    }
}

impl<'a, K, V, S> From<&'a SafeMap<K, V, S>> for ValueRef<'a, K, V, S> {
    fn from(m: &'a SafeMap<K, V, S>) -> Self {
        ValueRef::Map(m.view())
    }
}

impl<'a, K, V, S> ValueRef<'a, K, V, S> {
    pub fn is_null(&self) -> bool {
        matches!(self, ValueRef::Null)
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, ValueRef::Map(_))
    }

    pub fn as_scalar(&self) -> Option<&'a V> {
        match *self {
            ValueRef::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<SafeRef<'a, K, V, S>> {
        match *self {
            ValueRef::Map(m) => Some(m),
            _ => None,
        }
    }

    /// `Null` becomes `None`; anything else is `Some`.
    pub fn into_option(self) -> Option<Self> {
        match self {
            ValueRef::Null => None,
            other => Some(other),
        }
    }
}

impl<'a, K, V, S> ValueRef<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Continue a safe chain. A `Null` or scalar link has no entries, so the
    /// result is `Null`.
    pub fn get<Q>(self, key: &Q) -> ValueRef<'a, K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_or(key, ValueRef::Null)
    }

    pub fn get_or<Q>(self, key: &Q, default: ValueRef<'a, K, V, S>) -> ValueRef<'a, K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self {
            ValueRef::Map(m) => m.get_or(key, default),
            _ => default,
        }
    }
}

impl<K, V, S> ValueRef<'_, K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// Copy the viewed value out. Nested mappings become `Value::Safe`.
    pub fn to_value(&self) -> Value<K, V, S> {
        match *self {
            ValueRef::Null => Value::Null,
            ValueRef::Scalar(v) => Value::Scalar(v.clone()),
            ValueRef::Map(m) => Value::Safe(m.to_safe_map()),
        }
    }
}

impl<K, V, S> fmt::Debug for ValueRef<'_, K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRef::Null => f.write_str("Null"),
            ValueRef::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            ValueRef::Map(m) => f.debug_tuple("Map").field(m).finish(),
        }
    }
}

impl<K, V, S> PartialEq for ValueRef<'_, K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueRef::Null, ValueRef::Null) => true,
            (ValueRef::Scalar(a), ValueRef::Scalar(b)) => a == b,
            (ValueRef::Map(a), ValueRef::Map(b)) => a == b,
            _ => false,
        }
    }
}
