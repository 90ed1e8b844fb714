//! safe-map: an insertion-ordered map whose lookups never fail. A missing
//! key or a stored null yields the caller's default, and nested maps come
//! back wrapped so chained lookups stay safe.
//!
//! ```
//! use safe_map::{SafeMap, Table, Value, ValueRef};
//!
//! let inner: Table<&str, Value<&str, i32>> = [("c", Value::Scalar(2))].into();
//! let m: SafeMap<&str, i32> = [
//!     ("a", Value::Scalar(1)),
//!     ("b", Value::Map(inner)),
//!     ("d", Value::Null),
//! ]
//! .into();
//!
//! assert_eq!(m.get("a"), ValueRef::Scalar(&1));
//! assert_eq!(m.get("b").get("c"), ValueRef::Scalar(&2));
//! assert!(m.get("d").is_null());
//! assert_eq!(m.get_or("missing", ValueRef::Scalar(&0)), ValueRef::Scalar(&0));
//! ```
//!
//! Internal Design:
//!
//! Summary
//! - Layers:
//!   - Table<K, V, S>: structural map. Entries sit in a dense `Vec` in
//!     insertion order, indexed by a `hashbrown::HashTable` of positions.
//!   - Value<K, V, S>: what a map stores. `Null` is the absent sentinel,
//!     `Scalar(V)` a leaf, `Map(Table)` a plain nested mapping and
//!     `Safe(SafeMap)` a nested mapping that is already safe.
//!   - SafeMap<K, V, S>: public map. Owns a `Table<K, Value<K, V, S>, S>`
//!     and delegates every standard operation to it; only `get`/`get_or`
//!     differ.
//!   - SafeRef<'a, K, V, S> / ValueRef<'a, K, V, S>: borrowed results of a
//!     safe lookup.
//!
//! Lookup rules (`get_or(key, default)`)
//! - Nested mapping (either variant): returned as `ValueRef::Map`, a view
//!   straight over the inner table. Views are never stacked, so wrapping an
//!   already-safe map is idempotent.
//! - Scalar: returned unchanged.
//! - Missing key or stored `Null`: `default`. `get(key)` is
//!   `get_or(key, ValueRef::Null)`.
//! - Wrapping happens on read. Storage keeps whatever variant was inserted.
//!
//! Direct access
//! - `try_get`, `Index`, `get_mut`, `contains_key`, `len` and iteration see
//!   the raw table: a stored `Null` is a present key, and `Index` on a
//!   missing key panics as `HashMap` does. `safe_values` is the one
//!   iterator that wraps values the way `get` does.
//!
//! Hasher and rehashing invariants
//! - Each entry stores a precomputed `u64` hash; growth and index rebuilds
//!   use the stored hash, so `K: Hash` runs once per insert or lookup.
//!
//! Notes and non-goals
//! - No path-based access (`"a.b.c"`). Chain `get` calls instead.
//! - Sequences and sets are scalars as far as the map is concerned.
//! - No internal locking; share across threads the way you would a
//!   `HashMap`.
//! - Removal shifts later entries down to keep insertion order, so it is
//!   O(n) in the number of entries.

mod error;
mod safe_map;
#[cfg(feature = "serde")]
mod serde_impl;
pub mod table;
mod table_proptest;
mod value;

// Public surface
pub use error::LookupError;
pub use safe_map::{SafeMap, SafeRef, SafeValues};
pub use table::Table;
pub use value::{Value, ValueRef};
