#![cfg(test)]

// Property tests for EqualToMap kept inside the crate so they can use the
// same key fixtures as the unit tests.

use crate::equal_to::EqualTo;
use crate::equal_to_map::{EqualToMap, Handle};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype whose `EqualTo<str>` exercises probing with another type.
// Deliberately has no `PartialEq`: the map must not need it.
#[derive(Clone, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl EqualTo for Key {
    fn equal_to(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl EqualTo<str> for Key {
    fn equal_to(&self, other: &str) -> bool {
        self.0 == other
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    RemoveHandle(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::RemoveHandle),
            idx.clone().prop_map(OpI::Get),
            prop_oneof![contains_pool, "[a-z]{0,5}".prop_map(|s| s)].prop_map(OpI::Contains),
            (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Runs one scenario against `std::collections::HashMap<String, i32>`.
// Invariants exercised across random operation sequences:
// - insert returns the previous value exactly when the model had one.
// - get/contains parity with the model, for `Key` and `str` queries.
// - remove by key or handle returns the stored pair and stales handles.
// - iter yields each live entry exactly once; len/is_empty parity.
fn run_scenario<S: BuildHasher>(
    mut sut: EqualToMap<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut stale: Vec<Handle> = Vec::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i].clone();
                let prev = sut.insert(Key(k.clone()), v);
                prop_assert_eq!(prev, model.insert(k, v));
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let h = sut.find(k.as_str());
                let got = sut.remove(k.as_str()).map(|(kk, vv)| (kk.0, vv));
                prop_assert_eq!(got, model.remove_entry(k));
                stale.extend(h);
            }
            OpI::RemoveHandle(i) => {
                let k = &pool[i];
                match sut.find(&Key(k.clone())) {
                    Some(h) => {
                        let (kk, vv) = sut.remove_handle(h).expect("live handle removes");
                        prop_assert_eq!(&kk.0, k);
                        prop_assert_eq!(Some(vv), model.remove(k));
                        stale.push(h);
                    }
                    None => prop_assert!(!model.contains_key(k)),
                }
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k.as_str()), model.get(k));
                prop_assert_eq!(sut.get(&Key(k.clone())), model.get(k));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(v) = sut.get_mut(k.as_str()) {
                    *v = v.saturating_add(d);
                    let mv = model.get_mut(k).expect("model has key");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(k));
                }
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = sut.iter().map(|(k, _)| k.0.clone()).collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
                prop_assert_eq!(sut.iter().count(), sut.len());
            }
        }

        // Post-conditions after each op
        for &h in &stale {
            prop_assert!(h.value(&sut).is_none());
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(EqualToMap::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress EqualTo resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same state-machine invariants as above, under worst-case
// collision behavior (constant hasher): every lookup is decided by EqualTo.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(EqualToMap::with_hasher(ConstBuildHasher), &pool, ops)?;
    }
}

// Property: building from pairs keeps the last value for each key and the
// first-seen key order.
proptest! {
    #[test]
    fn prop_from_pairs_last_value_wins(pairs in proptest::collection::vec(("[a-c]{1,2}", any::<u8>()), 0..40)) {
        let sut: EqualToMap<Key, u8> = pairs.iter().map(|(k, v)| (Key(k.clone()), *v)).collect();
        let mut expected_order: Vec<String> = Vec::new();
        let mut model: HashMap<String, u8> = HashMap::new();
        for (k, v) in &pairs {
            if model.insert(k.clone(), *v).is_none() {
                expected_order.push(k.clone());
            }
        }
        let order: Vec<String> = sut.keys().map(|k| k.0.clone()).collect();
        prop_assert_eq!(order, expected_order);
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k.as_str()), Some(v));
        }
    }
}
