//! Table: insertion-ordered hash table used as the storage layer.
//!
//! Entries live in a dense `Vec` in insertion order; a `hashbrown::HashTable`
//! maps each key's hash to the entry's position. Each entry stores its
//! precomputed hash so the index can be rebuilt or grown without calling
//! `K: Hash` again.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::HashTable;
use std::collections::hash_map::RandomState;

#[derive(Clone)]
struct Bucket<K, V> {
    hash: u64,
    key: K,
    value: V,
}

#[derive(Clone)]
pub struct Table<K, V, S = RandomState> {
    hasher: S,
    index: HashTable<usize>,   // hash -> position in `entries`
    entries: Vec<Bucket<K, V>>, // insertion order
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V, S> Default for Table<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

/// Iterator over entries in insertion order.
pub struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Bucket<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|b| (&b.key, &b.value))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|b| (&b.key, &b.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            it: self.it.clone(),
        }
    }
}

/// Iterator over entries in insertion order with mutable values.
pub struct IterMut<'a, K, V> {
    it: core::slice::IterMut<'a, Bucket<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|b| (&b.key, &mut b.value))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|b| (&b.key, &mut b.value))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// Owning iterator in insertion order.
pub struct IntoIter<K, V> {
    it: std::vec::IntoIter<Bucket<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|b| (b.key, b.value))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|b| (b.key, b.value))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

/// Keys in insertion order.
pub struct Keys<'a, K, V> {
    it: core::slice::Iter<'a, Bucket<K, V>>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|b| &b.key)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|b| &b.key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// Values in insertion order.
pub struct Values<'a, K, V> {
    it: core::slice::Iter<'a, Bucket<K, V>>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|b| &b.value)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|b| &b.value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

pub struct ValuesMut<'a, K, V> {
    it: core::slice::IterMut<'a, Bucket<K, V>>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|b| &mut b.value)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V, S> Table<K, V, S> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.entries.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.entries.iter_mut(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            it: self.entries.iter(),
        }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values {
            it: self.entries.iter(),
        }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            it: self.entries.iter_mut(),
        }
    }

    /// Entry at `position` in insertion order.
    pub fn get_index(&self, position: usize) -> Option<(&K, &V)> {
        self.entries.get(position).map(|b| (&b.key, &b.value))
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.entries.clear();
    }

    /// Remove and return the most recently inserted entry.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let bucket = self.entries.pop()?;
        let last = self.entries.len();
        // The popped position is the largest index, so no other slot shifts.
        if let Ok(occupied) = self.index.find_entry(bucket.hash, |&i| i == last) {
            occupied.remove();
        }
        Some((bucket.key, bucket.value))
    }
}

impl<K, V, S> Table<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn find_hashed<Q>(&self, hash: u64, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let entries = &self.entries;
        self.index
            .find(hash, |&i| entries[i].key.borrow() == q)
            .copied()
    }

    /// Position of `q` in insertion order.
    pub fn get_index_of<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.entries.is_empty() {
            return None;
        }
        self.find_hashed(self.make_hash(q), q)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_index_of(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.get_index_of(q)?;
        Some(&self.entries[i].value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.get_index_of(q)?;
        let b = &self.entries[i];
        Some((&b.key, &b.value))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.get_index_of(q)?;
        Some(&mut self.entries[i].value)
    }

    /// Insert `key -> value`. An existing key keeps its original key object
    /// and position; the old value is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.make_hash(&key);
        if let Some(i) = self.find_hashed(hash, &key) {
            return Some(core::mem::replace(&mut self.entries[i].value, value));
        }
        let position = self.entries.len();
        let entries = &self.entries;
        self.index
            .insert_unique(hash, position, |&i| entries[i].hash);
        self.entries.push(Bucket { hash, key, value });
        None
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Remove `q`, shifting later entries down so insertion order is kept.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if self.entries.is_empty() {
            return None;
        }
        let hash = self.make_hash(q);
        let entries = &self.entries;
        let position = match self
            .index
            .find_entry(hash, |&i| entries[i].key.borrow() == q)
        {
            Ok(occupied) => occupied.remove().0,
            Err(_) => return None,
        };
        let bucket = self.entries.remove(position);
        if position < self.entries.len() {
            for slot in self.index.iter_mut() {
                if *slot > position {
                    *slot -= 1;
                }
            }
        }
        Some((bucket.key, bucket.value))
    }

    /// Keep only the entries for which `keep` returns true.
    ///
    /// `keep` is user code and may panic; the index is rebuilt on unwind too,
    /// so a caught panic leaves the surviving entries reachable.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut guard = RebuildOnDrop {
            before: self.entries.len(),
            index: &mut self.index,
            entries: &mut self.entries,
        };
        guard.entries.retain_mut(|b| keep(&b.key, &mut b.value));
    }

    pub fn reserve(&mut self, additional: usize) {
        let entries = &self.entries;
        self.index.reserve(additional, |&i| entries[i].hash);
        self.entries.reserve(additional);
    }

}

/// Re-derives `index` from `entries` when dropped, if any entry was removed.
struct RebuildOnDrop<'t, K, V> {
    before: usize,
    index: &'t mut HashTable<usize>,
    entries: &'t mut Vec<Bucket<K, V>>,
}

impl<K, V> Drop for RebuildOnDrop<'_, K, V> {
    fn drop(&mut self) {
        if self.entries.len() == self.before {
            return;
        }
        self.index.clear();
        let entries = &*self.entries;
        for (i, b) in entries.iter().enumerate() {
            self.index.insert_unique(b.hash, i, |&j| entries[j].hash);
        }
    }
}

impl<K, V, S> fmt::Debug for Table<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Equality ignores insertion order.
impl<K, V, S> PartialEq for Table<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |o| v == o))
    }
}

impl<K, V, S> Eq for Table<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Extend<(K, V)> for Table<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for Table<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut t = Self::with_hasher(S::default());
        t.extend(iter);
        t
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Table<K, V>
where
    K: Eq + Hash,
{
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, V, S> IntoIterator for &'a Table<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut Table<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for Table<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            it: self.entries.into_iter(),
        }
    }
}
