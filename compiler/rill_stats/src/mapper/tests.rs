use pretty_assertions::assert_eq;
use rill_core::{record, run_mapper, Record, RecordMapper, StreamContext};

use super::*;

fn run(options: Stats1Options, records: Vec<Record>) -> Vec<Record> {
    let mut mapper = Stats1Mapper::new(options).unwrap();
    run_mapper(&mut mapper, "in.dkvp", records).unwrap()
}

#[test]
fn ungrouped_summary() {
    let out = run(
        Stats1Options::new(["count", "sum"], ["x"]),
        vec![record([("x", "1")]), record([("x", "2")]), record([("x", "4")])],
    );
    assert_eq!(out, vec![record([("x_count", "3"), ("x_sum", "7")])]);
}

#[test]
fn records_without_group_by_field_are_skipped() {
    let mut mapper =
        Stats1Mapper::new(Stats1Options::new(["count"], ["x"]).group_by(["g"])).unwrap();
    let out = run_mapper(
        &mut mapper,
        "in.dkvp",
        vec![
            record([("g", "a"), ("x", "1")]),
            record([("x", "2")]),
            record([("g", "a"), ("x", "3")]),
        ],
    )
    .unwrap();
    assert_eq!(mapper.group_count(), 1);
    assert_eq!(out, vec![record([("g", "a"), ("x_count", "2")])]);
}

#[test]
fn group_seen_without_value_still_emits() {
    let out = run(
        Stats1Options::new(["count", "sum"], ["x"]).group_by(["g"]),
        vec![record([("g", "a"), ("y", "1")])],
    );
    assert_eq!(out, vec![record([("g", "a"), ("x_count", "0"), ("x_sum", "0")])]);
}

#[test]
fn multiple_value_fields_in_request_order() {
    let out = run(
        Stats1Options::new(["max"], ["y", "x"]),
        vec![record([("x", "1"), ("y", "5")]), record([("x", "3"), ("y", "2")])],
    );
    assert_eq!(out, vec![record([("y_max", "5"), ("x_max", "3")])]);
}

#[test]
fn multi_field_group_key() {
    let out = run(
        Stats1Options::new(["count"], ["x"]).group_by(["a", "b"]),
        vec![
            record([("a", "1"), ("b", "2"), ("x", "0")]),
            record([("a", "1"), ("b", "3"), ("x", "0")]),
            record([("a", "1"), ("b", "2"), ("x", "0")]),
        ],
    );
    assert_eq!(
        out,
        vec![
            record([("a", "1"), ("b", "2"), ("x_count", "2")]),
            record([("a", "1"), ("b", "3"), ("x_count", "1")]),
        ]
    );
}

#[test]
fn iterative_mode_annotates_each_record() {
    let mut mapper =
        Stats1Mapper::new(Stats1Options::new(["sum"], ["x"]).group_by(["g"]).iterative()).unwrap();
    let out = run_mapper(
        &mut mapper,
        "in.dkvp",
        vec![
            record([("g", "a"), ("x", "1")]),
            record([("g", "b"), ("x", "10")]),
            record([("g", "a"), ("x", "2")]),
            record([("x", "5")]),
        ],
    )
    .unwrap();
    assert_eq!(
        out,
        vec![
            record([("g", "a"), ("x", "1"), ("x_sum", "1")]),
            record([("g", "b"), ("x", "10"), ("x_sum", "10")]),
            record([("g", "a"), ("x", "2"), ("x_sum", "3")]),
            record([("x", "5")]),
        ]
    );
}

#[test]
fn non_numeric_value_is_an_error() {
    let mut mapper = Stats1Mapper::new(Stats1Options::new(["mean"], ["x"])).unwrap();
    let err = mapper
        .process(Some(record([("x", "abc")])), &StreamContext::new())
        .unwrap_err();
    assert_eq!(err.to_string(), "field `x` has non-numeric value `abc`");
}

#[test]
fn constructor_validates() {
    assert_eq!(
        Stats1Mapper::new(Stats1Options::new(["nope"], ["x"])).unwrap_err(),
        StatsError::UnknownAccumulator {
            name: "nope".into()
        }
    );
    assert_eq!(
        Stats1Mapper::new(Stats1Options::new(Vec::<String>::new(), ["x"])).unwrap_err(),
        StatsError::NoAccumulators
    );
    assert_eq!(
        Stats1Mapper::new(Stats1Options::new(["sum"], Vec::<String>::new())).unwrap_err(),
        StatsError::NoValueFields
    );
}
