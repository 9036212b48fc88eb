//! Property-based tests for the linked hash map, multi-level maps and the
//! local stack.
//!
//! Random operation sequences are applied both to [`Lhm`] and to a plain
//! ordered `Vec` model; the two must agree on contents and order after
//! every step, and the slot counters must stay consistent across
//! enlargements and tombstones.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use proptest::prelude::*;
use rill_core::{Lhm, LocalStack, Mlmv, Mlrval, ScopeId};

#[derive(Clone, Debug)]
enum Op {
    Put(u8, i32),
    Remove(u8),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // A small key space forces overwrites and re-inserts after removal.
    prop_oneof![
        6 => (0u8..48, any::<i32>()).prop_map(|(k, v)| Op::Put(k, v)),
        3 => (0u8..48).prop_map(Op::Remove),
        1 => Just(Op::Clear),
    ]
}

fn model_put(model: &mut Vec<(String, i32)>, key: String, value: i32) -> Option<i32> {
    if let Some(entry) = model.iter_mut().find(|(k, _)| *k == key) {
        return Some(std::mem::replace(&mut entry.1, value));
    }
    model.push((key, value));
    None
}

fn model_remove(model: &mut Vec<(String, i32)>, key: &str) -> Option<i32> {
    let index = model.iter().position(|(k, _)| k == key)?;
    Some(model.remove(index).1)
}

proptest! {
    #[test]
    fn lhm_matches_ordered_model(ops in prop::collection::vec(op_strategy(), 0..400)) {
        let mut map: Lhm<String, i32> = Lhm::new();
        let mut model: Vec<(String, i32)> = Vec::new();

        for op in ops {
            match op {
                Op::Put(k, v) => {
                    let key = format!("key{k}");
                    prop_assert_eq!(map.put(key.clone(), v), model_put(&mut model, key, v));
                }
                Op::Remove(k) => {
                    let key = format!("key{k}");
                    prop_assert_eq!(map.remove(key.as_str()), model_remove(&mut model, &key));
                }
                Op::Clear => {
                    map.clear();
                    model.clear();
                }
            }
            prop_assert!(map.check_counts().is_ok());
            prop_assert_eq!(map.len(), model.len());
        }

        let actual: Vec<(String, i32)> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(actual, model.clone());
        for (key, value) in &model {
            prop_assert_eq!(map.get(key.as_str()), Some(value));
        }
    }

    #[test]
    fn mlmv_put_then_get(paths in prop::collection::vec(
        prop::collection::vec("[a-c]", 1..4),
        1..30,
    )) {
        let mut value = Mlmv::empty_map();
        for (i, path) in paths.iter().enumerate() {
            value.put_terminal(path, Mlrval::Int(i as i64));
            prop_assert_eq!(value.get(path), Some(&Mlmv::from(Mlrval::Int(i as i64))));
        }
        // Every flattened entry reads back through its own path.
        for (name, leaf) in value.flatten("", ":") {
            let path: Vec<String> = name.split(':').map(str::to_owned).collect();
            prop_assert_eq!(value.get(&path), Some(&Mlmv::from(leaf)));
        }
    }
}

// ── Local stack ─────────────────────────────────────────────────────

#[derive(Clone, Debug)]
enum StackOp {
    Enter(usize),
    Exit,
    Write(usize, i64),
}

fn stack_op_strategy() -> impl Strategy<Value = StackOp> {
    prop_oneof![
        4 => (0usize..3).prop_map(StackOp::Enter),
        3 => Just(StackOp::Exit),
        4 => (1usize..4, any::<i64>()).prop_map(|(slot, v)| StackOp::Write(slot, v)),
    ]
}

proptest! {
    #[test]
    fn local_stack_frames_start_absent(ops in prop::collection::vec(stack_op_strategy(), 0..200)) {
        let mut stack = LocalStack::new();
        let scopes: Vec<ScopeId> = (0..3).map(|_| stack.register_scope(4)).collect();
        // Scope index of every entered frame, innermost last.
        let mut model: Vec<usize> = Vec::new();

        for op in ops {
            match op {
                StackOp::Enter(scope) => {
                    let reentry = model.contains(&scope);
                    let frame = stack.enter(scopes[scope]);
                    prop_assert_eq!(frame.is_ephemeral(), reentry);
                    for slot in 0..frame.size() {
                        prop_assert!(frame.get(slot).is_absent());
                    }
                    model.push(scope);
                }
                StackOp::Exit => {
                    if model.pop().is_some() {
                        stack.exit();
                    }
                }
                StackOp::Write(slot, v) => {
                    if !model.is_empty() {
                        stack.top_mut().assign(slot, Mlmv::from(Mlrval::Int(v))).unwrap();
                        prop_assert_eq!(
                            stack.top().get(slot),
                            &Mlmv::from(Mlrval::Int(v))
                        );
                    }
                }
            }
            prop_assert_eq!(stack.depth(), model.len());
            for (i, scope) in scopes.iter().enumerate() {
                prop_assert_eq!(stack.pooled(*scope).is_in_use(), model.contains(&i));
            }
        }

        while model.pop().is_some() {
            stack.exit();
        }
        for scope in &scopes {
            let frame = stack.pooled(*scope);
            prop_assert!(!frame.is_in_use());
            for slot in 0..frame.size() {
                prop_assert!(frame.get(slot).is_absent());
            }
        }
    }

    #[test]
    fn mlmv_copy_is_independent(
        paths in prop::collection::vec(prop::collection::vec("[a-c]", 1..4), 1..20),
        overwrite in prop::collection::vec("[a-c]", 1..4),
    ) {
        let mut original = Mlmv::empty_map();
        for (i, path) in paths.iter().enumerate() {
            original.put_terminal(path, Mlrval::Int(i as i64));
        }
        let snapshot = format!("{original}");
        let mut copy = original.clone();
        copy.put_terminal(&overwrite, Mlrval::from("changed"));
        copy.remove(&paths[0]);
        prop_assert_eq!(format!("{original}"), snapshot);
    }
}
