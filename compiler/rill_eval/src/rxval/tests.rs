use pretty_assertions::assert_eq;
use rill_core::{record, Mlrval, Record, TypeMask};

use super::*;
use crate::test_support::Fixture;

fn literal(value: impl Into<Mlrval>) -> RvalEvaluator {
    RvalEvaluator::Literal(value.into())
}

fn entry(key: &str, value: RxvalEvaluator) -> MapLiteralEntry {
    MapLiteralEntry {
        key: literal(key),
        value: MapLiteralValue::Value(Box::new(value)),
    }
}

fn path(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| (*k).to_owned()).collect()
}

#[test]
fn map_literal_builds_nested_levels_in_source_order() {
    let mut fixture = Fixture::new();
    let mut vars = fixture.vars(Record::new());
    let literal_map = RxvalEvaluator::MapLiteral(vec![
        entry("a", RxvalEvaluator::Scalar(literal(Mlrval::Int(1)))),
        MapLiteralEntry {
            key: literal("b"),
            value: MapLiteralValue::Nested(vec![entry(
                "x",
                RxvalEvaluator::Scalar(literal(Mlrval::Int(999))),
            )]),
        },
    ]);
    let value = literal_map.evaluate(&mut vars).unwrap();
    assert_eq!(
        value.flatten("", "."),
        vec![
            ("a".to_owned(), Mlrval::Int(1)),
            ("b.x".to_owned(), Mlrval::Int(999)),
        ]
    );
}

#[test]
fn map_literal_skips_absent_values_and_unusable_keys() {
    let mut fixture = Fixture::new();
    let mut vars = fixture.vars(record([("e", "")]));
    let literal_map = RxvalEvaluator::MapLiteral(vec![
        entry("gone", RxvalEvaluator::Scalar(RvalEvaluator::Field("nosuch".into()))),
        MapLiteralEntry {
            key: RvalEvaluator::Field("e".into()),
            value: MapLiteralValue::Value(Box::new(RxvalEvaluator::Scalar(literal("v")))),
        },
        entry("kept", RxvalEvaluator::Scalar(literal("yes"))),
    ]);
    let value = literal_map.evaluate(&mut vars).unwrap();
    assert_eq!(value.flatten("", "."), vec![("kept".to_owned(), Mlrval::from("yes"))]);
}

#[test]
fn numeric_keys_normalize_to_strings() {
    let mut fixture = Fixture::new();
    let mut vars = fixture.vars(Record::new());
    let literal_map = RxvalEvaluator::MapLiteral(vec![MapLiteralEntry {
        key: literal(Mlrval::Int(7)),
        value: MapLiteralValue::Value(Box::new(RxvalEvaluator::Scalar(literal(true)))),
    }]);
    let value = literal_map.evaluate(&mut vars).unwrap();
    assert_eq!(value.get(&path(&["7"])), Some(&Mlmv::from(Mlrval::Boolean(true))));
}

#[test]
fn reads_are_deep_copies() {
    let mut fixture = Fixture::new();
    fixture
        .oosvars
        .put_terminal(&path(&["m", "a"]), Mlrval::Int(1));
    let mut vars = fixture.vars(Record::new());

    let reference = RxvalEvaluator::Oosvar(OosvarRef {
        name: "m".into(),
        keys: Keylist::default(),
    });
    let mut copy = reference.evaluate(&mut vars).unwrap();
    copy.put_terminal(&path(&["a"]), Mlrval::Int(2));
    assert_eq!(
        vars.oosvars.get(&path(&["m", "a"])),
        Some(&Mlmv::from(Mlrval::Int(1)))
    );
}

#[test]
fn full_srec_uses_typed_values() {
    let mut fixture = Fixture::new();
    let mut vars = fixture.vars(record([("x", "3"), ("s", "hello")]));
    vars.assign_field("y", Mlrval::Float(0.5));
    let value = RxvalEvaluator::FullSrec.evaluate(&mut vars).unwrap();
    assert_eq!(
        value.flatten("", "."),
        vec![
            ("x".to_owned(), Mlrval::Int(3)),
            ("s".to_owned(), Mlrval::from("hello")),
            ("y".to_owned(), Mlrval::Float(0.5)),
        ]
    );
}

#[test]
fn locals_and_missing_paths() {
    let mut fixture = Fixture::new();
    let mut map = Mlmv::empty_map();
    map.put_terminal(&path(&["k", "j"]), Mlrval::from("deep"));
    fixture
        .locals
        .top_mut()
        .define(1, TypeMask::MAP_GATE, map.clone())
        .unwrap();
    let mut vars = fixture.vars(Record::new());

    assert_eq!(RxvalEvaluator::Local { slot: 1 }.evaluate(&mut vars).unwrap(), map);
    let inner = RxvalEvaluator::IndexedLocal {
        slot: 1,
        keys: Keylist(vec![literal("k")]),
    };
    assert!(inner.evaluate(&mut vars).unwrap().is_map());
    let missing = RxvalEvaluator::IndexedLocal {
        slot: 1,
        keys: Keylist(vec![literal("nope")]),
    };
    assert!(missing.evaluate(&mut vars).unwrap().is_absent());
}

#[test]
fn scalars_wrap_as_terminals() {
    let mut fixture = Fixture::new();
    let mut vars = fixture.vars(Record::new());
    let value = RxvalEvaluator::Scalar(literal(Mlrval::Int(4)))
        .evaluate(&mut vars)
        .unwrap();
    assert_eq!(value, Mlmv::Terminal(Mlrval::Int(4)));
}
