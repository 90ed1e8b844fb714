// SafeMap integration tests.
//
// Each test names the behavior it verifies. The core invariants exercised:
// - Totality: safe lookups never fail; missing keys yield the default.
// - Null equivalence: a stored Null reads exactly like a missing key.
// - Wrapping: nested tables come back as SafeRef views, recursively.
// - Idempotence: an already-safe nested map reads the same as a plain one.
// - Direct access keeps standard map behavior (KeyNotFound, panicking Index).
use safe_map::{LookupError, SafeMap, SafeRef, Table, Value, ValueRef};

#[derive(Clone, Debug, PartialEq)]
enum Scalar {
    Int(i64),
    Str(&'static str),
    List(Vec<i64>),
}

type M = SafeMap<&'static str, Scalar>;
type V = Value<&'static str, Scalar>;

fn int(n: i64) -> V {
    Value::Scalar(Scalar::Int(n))
}

// m = {"a": 1, "b": {"c": 2}, "d": null}
fn scenario() -> M {
    let b: Table<&'static str, V> = [("c", int(2))].into();
    [("a", int(1)), ("b", Value::Map(b)), ("d", Value::Null)].into()
}

// Test: the reference scenario, lookup by lookup.
#[test]
fn scenario_lookups() {
    let m = scenario();

    assert_eq!(m.get("a"), ValueRef::Scalar(&Scalar::Int(1)));

    let expected: M = [("c", int(2))].into();
    let b = m.get("b").as_map().expect("b is a mapping");
    assert_eq!(b, expected);
    assert_eq!(b.get("c"), ValueRef::Scalar(&Scalar::Int(2)));
    assert_eq!(m.get("b").get("c"), ValueRef::Scalar(&Scalar::Int(2)));

    let fallback = Scalar::Str("fallback");
    assert!(m.get("d").is_null());
    assert_eq!(m.get_or("d", ValueRef::Scalar(&fallback)), ValueRef::Scalar(&fallback));

    let zero = Scalar::Int(0);
    assert!(m.get("missing").is_null());
    assert_eq!(m.get_or("missing", ValueRef::Scalar(&zero)), ValueRef::Scalar(&zero));

    let empty_list = Scalar::List(Vec::new());
    assert_eq!(
        m.get("b").get_or("missing", ValueRef::Scalar(&empty_list)),
        ValueRef::Scalar(&empty_list)
    );
}

// Test: with no default, a miss is the absent sentinel, never an empty map.
#[test]
fn omitted_default_is_null_not_empty_map() {
    let m = scenario();
    for key in ["missing", "d"] {
        let got = m.get(key);
        assert!(got.is_null());
        assert!(!got.is_mapping());
        assert!(got.as_map().is_none());
    }
}

// Test: an empty nested map can be passed explicitly as the default.
#[test]
fn explicit_empty_map_default() {
    let m = scenario();
    let empty = M::new();
    let got = m.get_or("missing", ValueRef::from(&empty));
    let view = got.as_map().expect("default is a mapping");
    assert!(view.is_empty());
    // The default is itself safe.
    assert!(view.get("anything").is_null());
}

// Test: closure property to depth.
#[test]
fn deep_chains_stay_safe() {
    let level3: Table<&'static str, V> = [("leaf", int(3)), ("hole", Value::Null)].into();
    let level2: Table<&'static str, V> = [("l3", Value::Map(level3))].into();
    let level1: M = [("l2", Value::Map(level2))].into();
    let m: M = [("l1", Value::Safe(level1))].into();

    assert_eq!(
        m.get("l1").get("l2").get("l3").get("leaf"),
        ValueRef::Scalar(&Scalar::Int(3))
    );
    assert!(m.get("l1").get("l2").get("l3").get("hole").is_null());
    assert!(m.get("l1").get("nope").get("l3").get("leaf").is_null());
    // A scalar in the middle of a chain also ends it.
    assert!(m.get("l1").get("l2").get("l3").get("leaf").get("x").is_null());
}

// Test: plain and safe nested maps with the same entries read identically.
#[test]
fn rewrapping_safe_map_is_idempotent() {
    let entries = || -> Table<&'static str, V> { [("x", int(1)), ("y", Value::Null)].into() };
    let m: M = [
        ("plain", Value::Map(entries())),
        ("safe", Value::Safe(SafeMap::from(entries()))),
        ("safe2", Value::Safe(SafeMap::from(entries()))),
    ]
    .into();

    let plain = m.get("plain").as_map().unwrap();
    let safe = m.get("safe").as_map().unwrap();
    assert_eq!(plain, safe);
    assert_eq!(safe.len(), 2);
    assert_eq!(safe.get("x"), ValueRef::Scalar(&Scalar::Int(1)));

    // The view points at the SafeMap's own table: no extra layer.
    match m.try_get("safe2") {
        Ok(Value::Safe(inner)) => {
            let direct: SafeRef<'_, _, _> = inner.view();
            let through: SafeRef<'_, _, _> = m.get("safe2").as_map().unwrap();
            assert!(std::ptr::eq(direct.as_table(), through.as_table()));
        }
        other => panic!("unexpected stored value: {:?}", other),
    }
}

// Test: scalars come back unchanged, by identity.
#[test]
fn scalars_are_returned_by_reference() {
    let m: M = [("s", Value::Scalar(Scalar::List(vec![1, 2, 3])))].into();
    let stored = m.try_get("s").unwrap().as_scalar().unwrap();
    let got = m.get("s").as_scalar().unwrap();
    assert!(std::ptr::eq(stored, got));
}

// Test: standard map behavior of the other operations.
#[test]
fn standard_operations_are_not_safe() {
    let mut m = scenario();
    assert!(m.contains_key("d"));
    assert!(!m.contains_key("missing"));
    assert_eq!(m.len(), 3);
    assert_eq!(m.try_get("missing"), Err(LookupError::KeyNotFound));
    assert_eq!(m["a"], int(1));

    let keys: Vec<_> = m.keys().copied().collect();
    assert_eq!(keys, ["a", "b", "d"]);

    assert_eq!(m.insert("a", int(10)), Some(int(1)));
    assert_eq!(m.remove("d"), Some(Value::Null));
    assert!(m.get("d").is_null());
    let keys: Vec<_> = m.keys().copied().collect();
    assert_eq!(keys, ["a", "b"]);
}

#[test]
#[should_panic(expected = "key not found")]
fn index_on_missing_key_panics() {
    let m = scenario();
    let _ = &m["missing"];
}

// Test: assigning Null over a value makes it read as missing again.
#[test]
fn overwriting_with_null_hides_value() {
    let mut m = scenario();
    m.insert("a", Value::Null);
    let seven = Scalar::Int(7);
    assert_eq!(m.get_or("a", ValueRef::Scalar(&seven)), ValueRef::Scalar(&seven));
    assert!(m.contains_key("a"));
}

// Test: copying a view out and mutating the copy leaves the source alone.
#[test]
fn copied_view_is_independent() {
    let m = scenario();
    let mut copy = m.get("b").as_map().unwrap().to_safe_map();
    copy.insert("new", int(5));
    assert!(m.get("b").get("new").is_null());
    assert_eq!(copy.get("new"), ValueRef::Scalar(&Scalar::Int(5)));

    let owned = m.get("b").to_value();
    assert!(matches!(owned, Value::Safe(_)));
    assert_eq!(owned.view().get("c"), ValueRef::Scalar(&Scalar::Int(2)));
}
