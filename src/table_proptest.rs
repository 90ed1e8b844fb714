#![cfg(test)]

// Property tests for Table kept inside the crate next to the code they
// exercise.

use crate::table::Table;
use proptest::prelude::*;
use std::collections::HashMap;
use std::fmt;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    PopLast,
    RetainEven,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Get),
            1 => "[a-z]{0,5}".prop_map(Op::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::PopLast),
            1 => Just(Op::RetainEven),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against a HashMap plus an order log.
// Invariants exercised across random operation sequences:
// - `insert` returns the previous value; a replaced key keeps its position.
// - `remove`/`pop_last` return the model's value and keep the order of the rest.
// - `get`/`contains_key` agree with the model, including borrowed `&str` lookup.
// - `iter` yields exactly the model's entries in insertion order.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: Table<Key, i32> = Table::new();
        let mut model: HashMap<Key, i32> = HashMap::new();
        let mut order: Vec<Key> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(i, v) => {
                    let k = Key(pool[i].clone());
                    let prev = sut.insert(k.clone(), v);
                    let expected = model.insert(k.clone(), v);
                    prop_assert_eq!(prev, expected);
                    if expected.is_none() {
                        order.push(k);
                    }
                }
                Op::Remove(i) => {
                    let got = sut.remove(pool[i].as_str());
                    let expected = model.remove(pool[i].as_str());
                    prop_assert_eq!(got, expected);
                    order.retain(|k| k.0 != pool[i]);
                }
                Op::Get(i) => {
                    prop_assert_eq!(sut.get(pool[i].as_str()), model.get(pool[i].as_str()));
                    let pos = order.iter().position(|k| k.0 == pool[i]);
                    prop_assert_eq!(sut.get_index_of(pool[i].as_str()), pos);
                }
                Op::Contains(s) => {
                    prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(s.as_str()));
                }
                Op::Mutate(i, d) => {
                    if let Some(v) = sut.get_mut(pool[i].as_str()) {
                        *v = v.wrapping_add(d);
                    }
                    if let Some(v) = model.get_mut(pool[i].as_str()) {
                        *v = v.wrapping_add(d);
                    }
                }
                Op::PopLast => {
                    let got = sut.pop_last();
                    let expected = order.pop().map(|k| {
                        let v = model.remove(&k).unwrap();
                        (k, v)
                    });
                    prop_assert_eq!(got, expected);
                }
                Op::RetainEven => {
                    sut.retain(|_, v| *v % 2 == 0);
                    model.retain(|_, v| *v % 2 == 0);
                    order.retain(|k| model.contains_key(k));
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            let seen: Vec<(Key, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
            let expected: Vec<(Key, i32)> =
                order.iter().map(|k| (k.clone(), model[k])).collect();
            prop_assert_eq!(seen, expected);
        }
    }
}
