//! Serde support.
//!
//! Tables serialize as maps in insertion order. `Value::Null` is written as
//! a unit (`null` in JSON); both nested mapping variants are written as maps.
//! On the way in, unit becomes `Value::Null`, a map becomes a plain
//! `Value::Map`, and anything else is handed to `V`.
//!
//! Deciding between those cases goes through serde's untagged buffering, so
//! each nesting level is buffered again before it is read. Deep documents
//! pay one extra copy per level.

use crate::safe_map::SafeMap;
use crate::table::Table;
use crate::value::Value;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

impl<K, V, S> Serialize for Table<K, V, S>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<K, V, S> Serialize for Value<K, V, S>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Scalar(v) => v.serialize(serializer),
            Value::Map(t) => t.serialize(serializer),
            Value::Safe(m) => m.as_table().serialize(serializer),
        }
    }
}

impl<K, V, S> Serialize for SafeMap<K, V, S>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.as_table().serialize(serializer)
    }
}

struct TableVisitor<K, V, S> {
    _pd: PhantomData<fn() -> Table<K, V, S>>,
}

impl<'de, K, V, S> Visitor<'de> for TableVisitor<K, V, S>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    type Value = Table<K, V, S>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map")
    }

    // A repeated key keeps its first position and takes the last value.
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let capacity = access.size_hint().unwrap_or(0).min(4096);
        let mut table = Table::with_capacity_and_hasher(capacity, S::default());
        while let Some((k, v)) = access.next_entry()? {
            table.insert(k, v);
        }
        Ok(table)
    }
}

impl<'de, K, V, S> Deserialize<'de> for Table<K, V, S>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TableVisitor { _pd: PhantomData })
    }
}

// Variant order decides precedence: unit, then map, then whatever `V` accepts.
#[derive(serde::Deserialize)]
#[serde(untagged)]
#[serde(bound(deserialize = "K: Deserialize<'de> + Eq + Hash, \
                             V: Deserialize<'de>, \
                             S: BuildHasher + Default"))]
enum Repr<K, V, S> {
    Null,
    Map(Table<K, Value<K, V, S>, S>),
    Scalar(V),
}

impl<'de, K, V, S> Deserialize<'de> for Value<K, V, S>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Null => Value::Null,
            Repr::Map(t) => Value::Map(t),
            Repr::Scalar(v) => Value::Scalar(v),
        })
    }
}

impl<'de, K, V, S> Deserialize<'de> for SafeMap<K, V, S>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let table = Table::deserialize(deserializer)?;
        debug!(entries = table.len(), "seeded SafeMap from deserializer");
        Ok(SafeMap::from(table))
    }
}
