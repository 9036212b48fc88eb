use pretty_assertions::assert_eq;

use super::*;

fn int(i: i64) -> Mlmv {
    Mlmv::from(Mlrval::Int(i))
}

#[test]
fn enter_gives_absent_slots() {
    let mut stack = LocalStack::new();
    let scope = stack.register_scope(3);
    let frame = stack.enter(scope);
    assert_eq!(frame.size(), 3);
    assert!(!frame.is_ephemeral());
    for i in 0..3 {
        assert!(frame.get(i).is_absent());
    }
    stack.exit();
}

#[test]
fn zero_sized_scope_still_has_return_slot() {
    let mut stack = LocalStack::new();
    let scope = stack.register_scope(0);
    assert_eq!(stack.enter(scope).size(), 1);
    stack.exit();
}

#[test]
fn exit_clears_pooled_frame() {
    let mut stack = LocalStack::new();
    let scope = stack.register_scope(2);
    stack.enter(scope).assign(1, int(5)).unwrap();
    stack.exit();
    assert!(!stack.pooled(scope).is_in_use());
    let frame = stack.enter(scope);
    assert!(frame.get(1).is_absent());
    stack.exit();
}

#[test]
fn reentry_gets_an_ephemeral_frame() {
    let mut stack = LocalStack::new();
    let scope = stack.register_scope(2);

    stack.enter(scope).assign(1, int(1)).unwrap();
    let inner = stack.enter(scope);
    assert!(inner.is_ephemeral());
    assert!(inner.get(1).is_absent());
    inner.assign(1, int(2)).unwrap();
    assert_eq!(stack.depth(), 2);

    stack.exit();
    assert_eq!(stack.depth(), 1);
    // The outer activation is untouched and still holds the pooled frame.
    assert!(!stack.top().is_ephemeral());
    assert_eq!(stack.top().get(1), &int(1));
    assert!(stack.pooled(scope).is_in_use());

    stack.exit();
    assert!(!stack.pooled(scope).is_in_use());
    assert_eq!(stack.depth(), 0);
}

#[test]
#[should_panic(expected = "return-value slot")]
fn exit_with_return_slot_set_panics() {
    let mut stack = LocalStack::new();
    let scope = stack.register_scope(1);
    stack
        .enter(scope)
        .assign(RETURN_VALUE_SLOT, int(3))
        .unwrap();
    stack.exit();
}

#[test]
#[should_panic(expected = "no active frame")]
fn exit_without_enter_panics() {
    LocalStack::new().exit();
}

#[test]
fn take_leaves_absent() {
    let mut stack = LocalStack::new();
    let scope = stack.register_scope(1);
    let frame = stack.enter(scope);
    frame.assign(RETURN_VALUE_SLOT, int(9)).unwrap();
    assert_eq!(frame.take(RETURN_VALUE_SLOT), int(9));
    assert!(frame.get(RETURN_VALUE_SLOT).is_absent());
    stack.exit();
}

#[test]
fn gates() {
    let mut stack = LocalStack::new();
    let scope = stack.register_scope(4);
    let frame = stack.enter(scope);

    frame.define(1, TypeMask::NUM, int(1)).unwrap();
    frame.assign(1, Mlmv::from(Mlrval::Float(1.5))).unwrap();
    let err = frame.assign(1, Mlmv::from(Mlrval::from("x"))).unwrap_err();
    assert_eq!(err.to_string(), "type gate `num` rejects a value of type string");
    // Absent always passes.
    frame.assign(1, Mlmv::absent()).unwrap();

    frame.define(2, TypeMask::MAP_GATE, Mlmv::empty_map()).unwrap();
    frame
        .assign_indexed(2, &["a".to_owned()], int(1))
        .unwrap();
    assert_eq!(frame.get_indexed(2, &["a".to_owned()]), Some(&int(1)));
    assert!(frame.assign(2, int(1)).is_err());

    frame.define(3, TypeMask::STR, Mlmv::from(Mlrval::Empty)).unwrap();
    assert!(frame.assign_indexed(3, &["k".to_owned()], int(1)).is_err());
    assert!(frame.define(3, TypeMask::INT_GATE, Mlmv::from(Mlrval::Float(1.0))).is_err());

    frame.unset(1);
    frame.unset(2);
    stack.exit();
}

#[test]
fn exit_resets_gates() {
    let mut stack = LocalStack::new();
    let scope = stack.register_scope(2);
    stack.enter(scope).define(1, TypeMask::BOOL, Mlmv::absent()).unwrap();
    stack.exit();
    assert_eq!(stack.enter(scope).gate(1), TypeMask::VAR);
    stack.exit();
}

#[test]
fn gate_names_round_trip() {
    for name in ["var", "str", "num", "int", "float", "bool", "map"] {
        let mask = TypeMask::from_gate_name(name).unwrap();
        assert_eq!(mask.gate_name(), Some(name));
    }
    assert_eq!(TypeMask::from_gate_name("any"), Some(TypeMask::VAR));
    assert_eq!(TypeMask::from_gate_name("funct"), None);
}

#[test]
fn unset_indexed_removes_one_key() {
    let mut stack = LocalStack::new();
    let scope = stack.register_scope(2);
    let frame = stack.enter(scope);
    let a = ["a".to_owned()];
    let b = ["b".to_owned()];
    frame.assign_indexed(1, &a, int(1)).unwrap();
    frame.assign_indexed(1, &b, int(2)).unwrap();
    frame.unset_indexed(1, &a);
    assert_eq!(frame.get_indexed(1, &a), None);
    assert_eq!(frame.get_indexed(1, &b), Some(&int(2)));
    stack.exit();
}
