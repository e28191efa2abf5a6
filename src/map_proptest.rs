#![cfg(test)]

// Model-based property tests for BlobMap kept inside the crate so they can
// assert counter invariants after every single operation.

use crate::{BlobHasher, BlobMap, HashValue, MapConfig, MapError};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;
use std::rc::Rc;

fn config(buckets: usize) -> MapConfig {
    MapConfig::new(buckets)
        .with_allocator(Rc::new(|len| Vec::with_capacity(len)), Rc::new(|buf: Vec<u8>| drop(buf)))
}

struct ConstHasher;
impl BlobHasher for ConstHasher {
    fn hash_blob(&self, _data: &[u8]) -> HashValue {
        0
    }
}

// Pool-indexed keys improve shrinking: indices shrink toward earlier keys and
// op lists shrink in length.
fn key(i: usize) -> Vec<u8> {
    format!("key-{i}").into_bytes()
}

#[derive(Clone, Debug)]
enum Op {
    Set(usize, Vec<u8>),
    Remove(usize),
    Get(usize),
    Contains(usize),
}

fn op_strategy(keys: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..keys, proptest::collection::vec(any::<u8>(), 0..24)).prop_map(|(k, v)| Op::Set(k, v)),
        (0..keys).prop_map(Op::Remove),
        (0..keys).prop_map(Op::Get),
        (0..keys).prop_map(Op::Contains),
    ]
}

fn check_counters(map: &BlobMap, model: &HashMap<Vec<u8>, Vec<u8>>) -> Result<(), TestCaseError> {
    prop_assert_eq!(map.entry_count().unwrap(), model.len());
    prop_assert_eq!(
        map.total_key_bytes().unwrap(),
        model.keys().map(Vec::len).sum::<usize>()
    );
    prop_assert_eq!(
        map.total_value_bytes().unwrap(),
        model.values().map(Vec::len).sum::<usize>()
    );
    Ok(())
}

fn run_against_model(mut map: BlobMap, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut model: HashMap<Vec<u8>, Vec<u8>> = HashMap::new();

    for op in ops {
        match op {
            Op::Set(k, v) => {
                map.set(&key(k), &v).unwrap();
                model.insert(key(k), v);
            }
            Op::Remove(k) => {
                // Absent keys are a successful no-op.
                map.remove(&key(k)).unwrap();
                model.remove(&key(k));
            }
            Op::Get(k) => {
                let mut out = Vec::new();
                match model.get(&key(k)) {
                    Some(expected) => {
                        map.get(&key(k), &mut out).unwrap();
                        prop_assert_eq!(&out, expected);
                    }
                    None => {
                        prop_assert_eq!(
                            map.get(&key(k), &mut out).unwrap_err(),
                            MapError::KeyNotFound
                        );
                    }
                }
            }
            Op::Contains(k) => {
                prop_assert_eq!(map.contains(&key(k)), model.contains_key(&key(k)));
            }
        }
        check_counters(&map, &model)?;
    }

    // Every surviving key round-trips at the end.
    for (k, v) in &model {
        let mut out = Vec::new();
        map.get(k, &mut out).unwrap();
        prop_assert_eq!(&out, v);
    }

    map.destroy().unwrap();
    prop_assert_eq!(map.destroy().unwrap_err(), MapError::Uninitialized);
    Ok(())
}

proptest! {
    // Agreement with std::collections::HashMap over random op sequences,
    // with counter invariants checked after every step.
    #[test]
    fn prop_matches_model(
        keys in 1usize..=8,
        ops in proptest::collection::vec(op_strategy(8), 1..120)
    ) {
        let ops: Vec<Op> = ops
            .into_iter()
            .map(|op| match op {
                Op::Set(k, v) => Op::Set(k % keys, v),
                Op::Remove(k) => Op::Remove(k % keys),
                Op::Get(k) => Op::Get(k % keys),
                Op::Contains(k) => Op::Contains(k % keys),
            })
            .collect();
        run_against_model(BlobMap::create(config(4)).unwrap(), ops)?;
    }

    // Same sequences under a constant custom hasher: every entry shares one
    // bucket and one exact hash value, so every operation exercises a long
    // collision chain with no candidate ceiling.
    #[test]
    fn prop_matches_model_under_total_collision(
        keys in 1usize..=8,
        ops in proptest::collection::vec(op_strategy(8), 1..120)
    ) {
        let ops: Vec<Op> = ops
            .into_iter()
            .map(|op| match op {
                Op::Set(k, v) => Op::Set(k % keys, v),
                Op::Remove(k) => Op::Remove(k % keys),
                Op::Get(k) => Op::Get(k % keys),
                Op::Contains(k) => Op::Contains(k % keys),
            })
            .collect();
        let map = BlobMap::create(config(4).with_custom_hasher(Rc::new(ConstHasher))).unwrap();
        run_against_model(map, ops)?;
    }
}
