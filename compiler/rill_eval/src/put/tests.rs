use pretty_assertions::assert_eq;
use rill_core::{record, run_mapper, Record};
use rill_ir::build::*;

use super::*;
use crate::test_support::run_put;

fn records(values: &[&str]) -> Vec<Record> {
    values.iter().map(|x| record([("x", *x)])).collect()
}

#[test]
fn emitted_records_precede_the_current_record() {
    let root = program(
        vec![
            assign_oosvar(oosvar("last", vec![]), field("x")),
            emit(oosvar("last", vec![]), vec![]),
        ],
        1,
    );
    let out = run_put(&root, PutOptions::default(), records(&["1", "2"]));
    assert_eq!(
        out,
        vec![
            record([("last", "1")]),
            record([("x", "1")]),
            record([("last", "2")]),
            record([("x", "2")]),
        ]
    );
}

#[test]
fn filter_and_its_inversion() {
    let root = program(vec![filter(binary(">", field("x"), number("1")))], 1);
    let input = records(&["1", "2", "3"]);
    assert_eq!(
        run_put(&root, PutOptions::default(), input.clone()),
        records(&["2", "3"])
    );
    assert_eq!(
        run_put(&root, PutOptions::default().invert_filter(), input),
        records(&["1"])
    );
}

#[test]
fn suppressed_records_still_emit() {
    let root = program(
        vec![
            assign_oosvar(
                oosvar("sum", vec![]),
                binary("+", binary("??", oosvar("sum", vec![]), number("0")), field("x")),
            ),
            end(vec![emit(oosvar("sum", vec![]), vec![])], 1),
        ],
        1,
    );
    let out = run_put(&root, PutOptions::default().suppress_records(), records(&["1", "2", "3"]));
    assert_eq!(out, vec![record([("sum", "6")])]);
}

#[test]
fn begin_runs_once_and_end_sees_accumulated_state() {
    let root = program(
        vec![
            begin(vec![assign_oosvar(oosvar("n", vec![]), number("100"))], 1),
            assign_oosvar(oosvar("n", vec![]), binary("+", oosvar("n", vec![]), number("1"))),
            assign_field("n", oosvar("n", vec![])),
            end(vec![emit(oosvar("n", vec![]), vec![])], 1),
        ],
        1,
    );
    let out = run_put(&root, PutOptions::default(), records(&["a", "b"]));
    assert_eq!(
        out,
        vec![
            record([("x", "a"), ("n", "101")]),
            record([("x", "b"), ("n", "102")]),
            record([("n", "102")]),
        ]
    );
}

#[test]
fn empty_stream_still_runs_begin_and_end() {
    let root = program(
        vec![end(
            vec![emit(
                map_literal(vec![pair(string("done"), boolean(true))]),
                vec![],
            )],
            1,
        )],
        1,
    );
    let out = run_put(&root, PutOptions::default(), Vec::new());
    assert_eq!(out, vec![record([("done", "true")])]);
}

#[test]
fn oosvars_persist_across_records() {
    let root = program(
        vec![assign_oosvar(
            oosvar("count", vec![field("x")]),
            binary("+", binary("??", oosvar("count", vec![field("x")]), number("0")), number("1")),
        )],
        1,
    );
    let mut mapper = PutMapper::compile(&root, PutOptions::default()).unwrap();
    run_mapper(&mut mapper, "in.dkvp", records(&["a", "b", "a"])).unwrap();
    assert_eq!(
        mapper.oosvars().flatten("", ":"),
        vec![
            ("count:a".to_owned(), rill_core::Mlrval::Int(2)),
            ("count:b".to_owned(), rill_core::Mlrval::Int(1)),
        ]
    );
}
