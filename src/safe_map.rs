//! SafeMap: the owned map, and SafeRef: a borrowed safe view over any
//! nested table.
//!
//! Both share one lookup path (`SafeRef::get_or`); `SafeMap` only adds
//! ownership and the mutating operations of its underlying `Table`.

use crate::error::LookupError;
use crate::table::{self, IntoIter, Iter, IterMut, Keys, Table};
use crate::value::{Value, ValueRef};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use std::collections::hash_map::RandomState;
use tracing::trace;

/// An insertion-ordered map whose `get` never fails: missing keys and
/// stored `Value::Null` yield the caller's default, and nested mappings
/// come back as safe views.
#[derive(Clone)]
pub struct SafeMap<K, V, S = RandomState> {
    table: Table<K, Value<K, V, S>, S>,
}

/// Borrowed view with the read operations of a [`SafeMap`].
pub struct SafeRef<'a, K, V, S = RandomState> {
    table: &'a Table<K, Value<K, V, S>, S>,
}

/// Values of a map, wrapped the way a safe lookup wraps them.
pub struct SafeValues<'a, K, V, S = RandomState> {
    it: table::Values<'a, K, Value<K, V, S>>,
}

impl<'a, K, V, S> Iterator for SafeValues<'a, K, V, S> {
    type Item = ValueRef<'a, K, V, S>;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(ValueRef::from)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V, S> DoubleEndedIterator for SafeValues<'_, K, V, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(ValueRef::from)
    }
}

impl<K, V, S> ExactSizeIterator for SafeValues<'_, K, V, S> {}

impl<K, V, S> Clone for SafeRef<'_, K, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, S> Copy for SafeRef<'_, K, V, S> {}

impl<'a, K, V, S> SafeRef<'a, K, V, S> {
    pub fn new(table: &'a Table<K, Value<K, V, S>, S>) -> Self {
        Self { table }
    }

    pub fn as_table(&self) -> &'a Table<K, Value<K, V, S>, S> {
        self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Raw entries in insertion order; nested values are not wrapped.
    pub fn iter(&self) -> Iter<'a, K, Value<K, V, S>> {
        self.table.iter()
    }

    pub fn keys(&self) -> Keys<'a, K, Value<K, V, S>> {
        self.table.keys()
    }

    /// Raw stored values in insertion order.
    pub fn values(&self) -> table::Values<'a, K, Value<K, V, S>> {
        self.table.values()
    }

    /// Values as a safe lookup would return them.
    pub fn safe_values(&self) -> SafeValues<'a, K, V, S> {
        SafeValues {
            it: self.table.values(),
        }
    }
}

impl<'a, K, V, S> SafeRef<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.contains_key(key)
    }

    /// Safe lookup with no default; `ValueRef::Null` when absent.
    pub fn get<Q>(self, key: &Q) -> ValueRef<'a, K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_or(key, ValueRef::Null)
    }

    /// Safe lookup. A missing key and a stored `Value::Null` both yield
    /// `default`; nested mappings are wrapped in a view.
    pub fn get_or<Q>(self, key: &Q, default: ValueRef<'a, K, V, S>) -> ValueRef<'a, K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.table.get(key) {
            Some(Value::Null) | None => {
                trace!(fallback_null = default.is_null(), "safe lookup missed");
                default
            }
            Some(found) => ValueRef::from(found),
        }
    }

    /// Lazily computed default.
    pub fn get_or_else<Q, F>(self, key: &Q, default: F) -> ValueRef<'a, K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce() -> ValueRef<'a, K, V, S>,
    {
        match self.get(key) {
            ValueRef::Null => default(),
            found => found,
        }
    }

    /// Direct access: the stored value as-is, or `KeyNotFound`.
    pub fn try_get<Q>(&self, key: &Q) -> Result<&'a Value<K, V, S>, LookupError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get(key).ok_or(LookupError::KeyNotFound)
    }
}

impl<K, V, S> SafeRef<'_, K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// Copy the viewed entries into an owned map.
    pub fn to_safe_map(&self) -> SafeMap<K, V, S> {
        SafeMap {
            table: self.table.clone(),
        }
    }
}

impl<K, V, S> fmt::Debug for SafeRef<'_, K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.table, f)
    }
}

impl<K, V, S> PartialEq for SafeRef<'_, K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
    }
}

impl<K, V, S> PartialEq<SafeMap<K, V, S>> for SafeRef<'_, K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &SafeMap<K, V, S>) -> bool {
        *self.table == other.table
    }
}

impl<K, V> SafeMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self { table: Table::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: Table::with_capacity(capacity),
        }
    }
}

impl<K, V, S> Default for SafeMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self {
            table: Table::default(),
        }
    }
}

impl<K, V, S> SafeMap<K, V, S> {
    pub fn view(&self) -> SafeRef<'_, K, V, S> {
        SafeRef::new(&self.table)
    }

    pub fn as_table(&self) -> &Table<K, Value<K, V, S>, S> {
        &self.table
    }

    pub fn as_table_mut(&mut self) -> &mut Table<K, Value<K, V, S>, S> {
        &mut self.table
    }

    pub fn into_table(self) -> Table<K, Value<K, V, S>, S> {
        self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, K, Value<K, V, S>> {
        self.table.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, Value<K, V, S>> {
        self.table.iter_mut()
    }

    pub fn keys(&self) -> Keys<'_, K, Value<K, V, S>> {
        self.table.keys()
    }

    pub fn values(&self) -> table::Values<'_, K, Value<K, V, S>> {
        self.table.values()
    }

    /// Values wrapped as [`SafeMap::get`] would return them.
    pub fn safe_values(&self) -> SafeValues<'_, K, V, S> {
        self.view().safe_values()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn pop_last(&mut self) -> Option<(K, Value<K, V, S>)> {
        self.table.pop_last()
    }
}

impl<K, V, S> SafeMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            table: Table::with_hasher(hasher),
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            table: Table::with_capacity_and_hasher(capacity, hasher),
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.contains_key(key)
    }

    /// Safe lookup with no default. See [`SafeRef::get_or`].
    pub fn get<Q>(&self, key: &Q) -> ValueRef<'_, K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.view().get(key)
    }

    pub fn get_or<'a, Q>(
        &'a self,
        key: &Q,
        default: ValueRef<'a, K, V, S>,
    ) -> ValueRef<'a, K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.view().get_or(key, default)
    }

    pub fn get_or_else<'a, Q, F>(&'a self, key: &Q, default: F) -> ValueRef<'a, K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce() -> ValueRef<'a, K, V, S>,
    {
        self.view().get_or_else(key, default)
    }

    /// Direct access: the stored value as-is, or `KeyNotFound`.
    pub fn try_get<Q>(&self, key: &Q) -> Result<&Value<K, V, S>, LookupError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get(key).ok_or(LookupError::KeyNotFound)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut Value<K, V, S>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get_mut(key)
    }

    /// Insert or replace; a replaced key keeps its position.
    pub fn insert(&mut self, key: K, value: Value<K, V, S>) -> Option<Value<K, V, S>> {
        self.table.insert(key, value)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<Value<K, V, S>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove(key)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, Value<K, V, S>)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove_entry(key)
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&K, &mut Value<K, V, S>) -> bool,
    {
        self.table.retain(keep);
    }
}

impl<K, V, S> fmt::Debug for SafeMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.table, f)
    }
}

impl<K, V, S> PartialEq for SafeMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
    }
}

impl<K, V, S> PartialEq<SafeRef<'_, K, V, S>> for SafeMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &SafeRef<'_, K, V, S>) -> bool {
        self.table == *other.table
    }
}

impl<K, V, S> Eq for SafeMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

/// Direct indexing is not safe: a missing key panics, as with `HashMap`.
/// Use [`SafeMap::get`] or [`SafeMap::try_get`] instead.
impl<K, Q, V, S> Index<&Q> for SafeMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = Value<K, V, S>;

    fn index(&self, key: &Q) -> &Self::Output {
        match self.table.get(key) {
            Some(v) => v,
            None => panic!("SafeMap index: {}", LookupError::KeyNotFound),
        }
    }
}

impl<K, V, S> From<Table<K, Value<K, V, S>, S>> for SafeMap<K, V, S> {
    fn from(table: Table<K, Value<K, V, S>, S>) -> Self {
        Self { table }
    }
}

impl<K, V, const N: usize> From<[(K, Value<K, V>); N]> for SafeMap<K, V>
where
    K: Eq + Hash,
{
    fn from(arr: [(K, Value<K, V>); N]) -> Self {
        Self {
            table: Table::from(arr),
        }
    }
}

impl<K, V, S> Extend<(K, Value<K, V, S>)> for SafeMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, Value<K, V, S>)>>(&mut self, iter: I) {
        self.table.extend(iter);
    }
}

impl<K, V, S> FromIterator<(K, Value<K, V, S>)> for SafeMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, Value<K, V, S>)>>(iter: I) -> Self {
        Self {
            table: iter.into_iter().collect(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a SafeMap<K, V, S> {
    type Item = (&'a K, &'a Value<K, V, S>);
    type IntoIter = Iter<'a, K, Value<K, V, S>>;
    fn into_iter(self) -> Self::IntoIter {
        self.table.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut SafeMap<K, V, S> {
    type Item = (&'a K, &'a mut Value<K, V, S>);
    type IntoIter = IterMut<'a, K, Value<K, V, S>>;
    fn into_iter(self) -> Self::IntoIter {
        self.table.iter_mut()
    }
}

impl<K, V, S> IntoIterator for SafeMap<K, V, S> {
    type Item = (K, Value<K, V, S>);
    type IntoIter = IntoIter<K, Value<K, V, S>>;
    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type M = SafeMap<String, i32>;

    fn k(s: &str) -> String {
        s.to_string()
    }

    /// Invariant: a stored null is still a key for membership and length,
    /// but not for safe lookup.
    #[test]
    fn stored_null_is_present_but_reads_as_missing() {
        let mut m = M::new();
        m.insert(k("n"), Value::Null);
        assert!(m.contains_key("n"));
        assert_eq!(m.len(), 1);
        assert!(m.get("n").is_null());
        assert_eq!(m.get_or("n", ValueRef::Scalar(&7)), ValueRef::Scalar(&7));
        assert_eq!(m.try_get("n"), Ok(&Value::Null));
    }

    #[test]
    fn try_get_reports_key_not_found() {
        let m: M = [(k("a"), Value::Scalar(1))].into();
        assert_eq!(m.try_get("a"), Ok(&Value::Scalar(1)));
        assert_eq!(m.try_get("b"), Err(LookupError::KeyNotFound));
        assert_eq!(m.view().try_get("b"), Err(LookupError::KeyNotFound));
        assert_eq!(LookupError::KeyNotFound.to_string(), "key not found");
    }

    #[test]
    fn index_returns_stored_value() {
        let m: M = [(k("a"), Value::Scalar(1)), (k("z"), Value::Null)].into();
        assert_eq!(m["a"], Value::Scalar(1));
        assert!(m["z"].is_null());
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn index_missing_key_panics() {
        let m = M::new();
        let _ = &m["missing"];
    }

    #[test]
    fn get_or_else_only_runs_on_miss() {
        let m: M = [(k("a"), Value::Scalar(1))].into();
        let mut calls = 0;
        let hit = m.get_or_else("a", || {
            calls += 1;
            ValueRef::Null
        });
        assert_eq!(hit, ValueRef::Scalar(&1));
        let miss = m.get_or_else("b", || {
            calls += 1;
            ValueRef::Scalar(&2)
        });
        assert_eq!(miss, ValueRef::Scalar(&2));
        assert_eq!(calls, 1);
    }

    /// Invariant: wrapping happens on read only; storage keeps `Value::Map`.
    #[test]
    fn nested_tables_are_wrapped_on_read_only() {
        let inner: Table<String, Value<String, i32>> = [(k("c"), Value::Scalar(2))].into();
        let mut m = M::new();
        m.insert(k("b"), Value::Map(inner));

        let view = m.get("b").as_map().expect("nested map");
        assert_eq!(view.get("c"), ValueRef::Scalar(&2));
        assert!(matches!(m.try_get("b"), Ok(Value::Map(_))));

        // Mutations through the raw table show up in later safe reads.
        if let Some(t) = m.get_mut("b").and_then(Value::as_table_mut) {
            t.insert(k("d"), Value::Scalar(4));
        }
        assert_eq!(m.get("b").get("d"), ValueRef::Scalar(&4));
    }

    #[test]
    fn to_safe_map_copies_entries() {
        let inner: Table<String, Value<String, i32>> = [(k("c"), Value::Scalar(2))].into();
        let m: M = [(k("b"), Value::Map(inner))].into();
        let mut copy = m.get("b").as_map().expect("nested map").to_safe_map();
        copy.insert(k("x"), Value::Scalar(9));
        assert_eq!(copy.len(), 2);
        assert_eq!(m.get("b").as_map().map(|v| v.len()), Some(1));
    }

    /// Invariant: `values` is raw like `iter`; only `safe_values` wraps.
    #[test]
    fn values_are_raw_and_safe_values_are_wrapped() {
        let inner: Table<String, Value<String, i32>> = Table::new();
        let m: M = [
            (k("a"), Value::Scalar(1)),
            (k("b"), Value::Map(inner)),
            (k("c"), Value::Null),
            (k("d"), Value::Safe(M::new())),
        ]
        .into();
        let raw: Vec<&str> = m
            .values()
            .map(|v| match v {
                Value::Null => "null",
                Value::Scalar(_) => "scalar",
                Value::Map(_) => "map",
                Value::Safe(_) => "safe",
            })
            .collect();
        assert_eq!(raw, ["scalar", "map", "null", "safe"]);
        let from_iter: Vec<&Value<String, i32>> = m.iter().map(|(_, v)| v).collect();
        assert!(m.values().eq(from_iter));
        assert!(m.view().values().eq(m.values()));

        let wrapped: Vec<&str> = m
            .safe_values()
            .map(|v| match v {
                ValueRef::Null => "null",
                ValueRef::Scalar(_) => "scalar",
                ValueRef::Map(_) => "map",
            })
            .collect();
        assert_eq!(wrapped, ["scalar", "map", "null", "map"]);
    }

    /// Invariant: a panicking `retain` predicate leaves safe lookups correct.
    #[test]
    fn retain_panic_keeps_lookups_total() {
        let mut m: M = (0..8).map(|i| (format!("k{i}"), Value::Scalar(i))).collect();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            m.retain(|key, v| {
                if key == "k4" {
                    panic!("predicate failed");
                }
                v.as_scalar().map_or(false, |n| n % 2 == 0)
            });
        }));
        assert!(res.is_err());
        for i in [0, 2, 4, 5, 6, 7] {
            assert_eq!(m.get(format!("k{i}").as_str()), ValueRef::Scalar(&i));
        }
        assert!(m.get("k1").is_null());
        assert!(m.get("k3").is_null());
    }

    #[test]
    fn mutation_operations_delegate_to_table() {
        let mut m: M = (0..6).map(|i| (format!("k{i}"), Value::Scalar(i))).collect();
        assert_eq!(m.remove("k2"), Some(Value::Scalar(2)));
        assert_eq!(m.remove_entry("k0"), Some((k("k0"), Value::Scalar(0))));
        m.retain(|_, v| v.as_scalar().map_or(false, |n| n % 2 == 1));
        let keys: Vec<&str> = m.keys().map(String::as_str).collect();
        assert_eq!(keys, ["k1", "k3", "k5"]);
        assert_eq!(m.pop_last(), Some((k("k5"), Value::Scalar(5))));
        m.extend([(k("k9"), Value::Null)]);
        assert_eq!(m.len(), 3);
        for (_, v) in m.iter_mut() {
            if let Some(n) = v.as_scalar_mut() {
                *n *= 100;
            }
        }
        assert_eq!(m.get("k3"), ValueRef::Scalar(&300));
        m.clear();
        assert!(m.is_empty());
    }
}
