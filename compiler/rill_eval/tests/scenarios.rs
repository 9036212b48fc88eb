//! End-to-end scenarios: hand-built ASTs run through `PutMapper`.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use rill_core::{record, run_mapper, Record};
use rill_eval::{CompileError, EvalError, PutMapper, PutOptions, TypeInference};
use rill_ir::build::*;
use rill_ir::AstNode;

fn run(root: &AstNode, options: PutOptions, records: Vec<Record>) -> Vec<Record> {
    let mut mapper = PutMapper::compile(root, options).expect("program compiles");
    run_mapper(&mut mapper, "input.dkvp", records).expect("program runs")
}

#[test]
fn scalar_arithmetic() {
    let root = program(
        vec![assign_field("z", binary("+", field("x"), field("y")))],
        1,
    );
    let out = run(&root, PutOptions::default(), vec![record([("x", "3"), ("y", "4")])]);
    assert_eq!(out, vec![record([("x", "3"), ("y", "4"), ("z", "7")])]);

    // z is typed as an int: typeof sees it within the same record.
    let root = program(
        vec![
            assign_field("z", binary("+", field("x"), field("y"))),
            assign_field("t", call("typeof", vec![field("z")])),
        ],
        1,
    );
    let out = run(&root, PutOptions::default(), vec![record([("x", "3"), ("y", "4")])]);
    assert_eq!(out[0].get("t").map(String::as_str), Some("int"));
}

#[test]
fn map_literal_to_oosvar_then_emit() {
    let literal = map_literal(vec![
        pair(string("a"), number("1")),
        pair(string("b"), map_literal(vec![pair(string("x"), number("999"))])),
    ]);
    let root = program(
        vec![end(
            vec![
                assign_oosvar(oosvar("m", vec![]), literal),
                emit(oosvar("m", vec![]), vec![]),
            ],
            1,
        )],
        1,
    );
    let out = run(&root, PutOptions::default(), Vec::new());
    assert_eq!(out, vec![record([("a", "1"), ("b.x", "999")])]);
}

#[test]
fn absent_propagation_leaves_field_unset() {
    let root = program(vec![assign_field("z", binary("+", field("w"), number("1")))], 1);
    let out = run(&root, PutOptions::default(), vec![record([("x", "1")])]);
    assert_eq!(out, vec![record([("x", "1")])]);
}

#[test]
fn type_inference_modes() {
    let root = program(
        vec![assign_field("t", call("typeof", vec![field("x")]))],
        1,
    );
    let typed = |mode, x: &str| {
        let out = run(
            &root,
            PutOptions::default().with_type_inference(mode),
            vec![record([("x", x)])],
        );
        out[0].get("t").cloned().unwrap()
    };
    assert_eq!(typed(TypeInference::StringFloatInt, "3"), "int");
    assert_eq!(typed(TypeInference::StringFloatInt, "0xff"), "int");
    assert_eq!(typed(TypeInference::StringFloat, "3"), "string");
    assert_eq!(typed(TypeInference::StringFloat, "3.5"), "float");
    assert_eq!(typed(TypeInference::StringOnly, "3.5"), "string");
    assert_eq!(typed(TypeInference::StringOnly, ""), "empty");
}

#[test]
fn grouped_sums_with_split_emit() {
    let root = program(
        vec![
            assign_oosvar(
                oosvar("sum", vec![field("g")]),
                binary(
                    "+",
                    binary("??", oosvar("sum", vec![field("g")]), number("0")),
                    field("v"),
                ),
            ),
            end(vec![emit(oosvar("sum", vec![]), vec![string("g")])], 1),
        ],
        1,
    );
    let input = vec![
        record([("g", "A"), ("v", "1")]),
        record([("g", "B"), ("v", "2")]),
        record([("g", "A"), ("v", "3")]),
    ];
    let out = run(&root, PutOptions::default().suppress_records(), input);
    assert_eq!(
        out,
        vec![
            record([("g", "A"), ("sum", "4")]),
            record([("g", "B"), ("sum", "2")]),
        ]
    );
}

#[test]
fn regex_captures_flow_into_later_statements() {
    let root = program(
        vec![if_chain(
            vec![(
                binary("=~", field("name"), regex("^([a-z]+)-([0-9]+)$")),
                vec![
                    assign_field("word", string("\\1")),
                    assign_field("num", string("\\2")),
                ],
            )],
            Some(vec![assign_field("word", string("none"))]),
        )],
        1,
    );
    let out = run(
        &root,
        PutOptions::default(),
        vec![record([("name", "abc-42")]), record([("name", "ABC")])],
    );
    assert_eq!(
        out,
        vec![
            record([("name", "abc-42"), ("word", "abc"), ("num", "42")]),
            record([("name", "ABC"), ("word", "none")]),
        ]
    );

    let root = program(
        vec![assign_field(
            "m",
            binary("=~", field("name"), regex_i("^abc$")),
        )],
        1,
    );
    let out = run(&root, PutOptions::default(), vec![record([("name", "ABC")])]);
    assert_eq!(out[0].get("m").map(String::as_str), Some("true"));
}

#[test]
fn locals_and_loops() {
    // var total = 0; for (k, v in $*) { if (is_numeric(v)) { total = total + v } } $total = total
    let root = program(
        vec![
            define_local("num", "total", 1, Some(number("0"))),
            for_srec(
                ("k", 2),
                ("v", 3),
                vec![if_chain(
                    vec![(
                        call("is_numeric", vec![local("v", 3)]),
                        vec![assign_local(
                            local("total", 1),
                            binary("+", local("total", 1), local("v", 3)),
                        )],
                    )],
                    None,
                )],
            ),
            assign_field("total", local("total", 1)),
        ],
        4,
    );
    let out = run(
        &root,
        PutOptions::default(),
        vec![record([("a", "1"), ("b", "x"), ("c", "2.5")])],
    );
    assert_eq!(out[0].get("total").map(String::as_str), Some("3.5"));
}

#[test]
fn map_valued_locals_and_for_map() {
    // map m = {}; m[$k] = $v; for (k, v in m) { $[k . "_copy"] = v }
    let root = program(
        vec![
            define_local("map", "m", 1, Some(map_literal(vec![]))),
            assign_local(indexed_local("m", 1, vec![field("k")]), field("v")),
            for_map(
                ("key", 2),
                ("value", 3),
                local("m", 1),
                vec![assign_srec(
                    indirect_field(binary(".", local("key", 2), string("_copy"))),
                    local("value", 3),
                )],
            ),
        ],
        4,
    );
    let out = run(
        &root,
        PutOptions::default(),
        vec![record([("k", "color"), ("v", "red")])],
    );
    assert_eq!(
        out,
        vec![record([("k", "color"), ("v", "red"), ("color_copy", "red")])]
    );
}

#[test]
fn map_assignment_to_a_field_flattens() {
    let root = program(
        vec![assign_field(
            "o",
            map_literal(vec![pair(string("a"), number("1")), pair(string("b"), number("2"))]),
        )],
        1,
    );
    let out = run(
        &root,
        PutOptions::default().with_flatten_separator(":"),
        vec![record([("x", "0")])],
    );
    assert_eq!(out, vec![record([("x", "0"), ("o:a", "1"), ("o:b", "2")])]);
}

#[test]
fn full_record_round_trips_through_an_oosvar() {
    let root = program(
        vec![
            assign_oosvar(oosvar("saved", vec![]), full_srec()),
            unset(vec![full_srec()]),
            assign_srec(full_srec(), oosvar("saved", vec![])),
            assign_field("n", context("NR")),
        ],
        1,
    );
    let out = run(
        &root,
        PutOptions::default(),
        vec![record([("a", "1"), ("b", "two")])],
    );
    assert_eq!(out, vec![record([("a", "1"), ("b", "two"), ("n", "1")])]);
}

#[test]
fn deep_recursion_grows_the_stack() {
    // func depth(n) { if (n <= 0) { return 0 } return 1 + depth(n - 1) }
    let depth = func_def(
        "depth",
        &[("num", "n", 1)],
        vec![
            if_chain(
                vec![(
                    binary("<=", local("n", 1), number("0")),
                    vec![return_value(Some(number("0")))],
                )],
                None,
            ),
            return_value(Some(binary(
                "+",
                number("1"),
                call("depth", vec![binary("-", local("n", 1), number("1"))]),
            ))),
        ],
        2,
    );
    let root = program(vec![depth, assign_field("d", call("depth", vec![field("n")]))], 1);
    let out = run(&root, PutOptions::default(), vec![record([("n", "20000")])]);
    assert_eq!(out[0].get("d").map(String::as_str), Some("20000"));
}

#[test]
fn runtime_type_gate_errors_abort_the_stream() {
    let root = program(
        vec![define_local("str", "s", 1, Some(field("x")))],
        2,
    );
    let mut mapper = PutMapper::compile(&root, PutOptions::default()).unwrap();
    let err = run_mapper(&mut mapper, "input.dkvp", vec![record([("x", "12")])]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "couldn't assign variable `s`: type gate `str` rejects a value of type int"
    );
    assert!(matches!(err, EvalError::TypeGate { .. }));
}

#[test]
fn compile_errors_are_reported() {
    let root = program(vec![assign_field("y", call("no_such_function", vec![]))], 1);
    let err = PutMapper::compile(&root, PutOptions::default()).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnknownFunction {
            name: "no_such_function".into()
        }
    );
}

#[test]
fn execution_is_deterministic() {
    let root = program(
        vec![
            assign_oosvar(
                oosvar("seen", vec![field("k")]),
                binary("+", binary("??", oosvar("seen", vec![field("k")]), number("0")), number("1")),
            ),
            assign_field("seen", oosvar("seen", vec![field("k")])),
            assign_field("len", call("strlen", vec![field("k")])),
            emit(oosvar("seen", vec![]), vec![string("k")]),
        ],
        1,
    );
    let input: Vec<Record> = ["a", "b", "a", "c"]
        .iter()
        .map(|k| record([("k", *k)]))
        .collect();
    let first = run(&root, PutOptions::default(), input.clone());
    let second = run(&root, PutOptions::default(), input);
    assert_eq!(first, second);
    assert_eq!(first.last(), Some(&record([("k", "c"), ("seen", "1"), ("len", "1")])));
}

#[test]
fn builtin_results_match_direct_calls() {
    let root = program(
        vec![
            assign_field("up", call("toupper", vec![field("s")])),
            assign_field("sub", call("sub", vec![field("s"), regex("l+"), string("L")])),
            assign_field("fmt", call("fmtnum", vec![field("f"), string("%.2f")])),
            assign_field("max", call("max", vec![field("f"), number("2"), field("nosuch")])),
        ],
        1,
    );
    let out = run(
        &root,
        PutOptions::default(),
        vec![record([("s", "hello"), ("f", "7.12345")])],
    );
    assert_eq!(
        out,
        vec![record([
            ("s", "hello"),
            ("f", "7.12345"),
            ("up", "HELLO"),
            ("sub", "heLo"),
            ("fmt", "7.12"),
            ("max", "7.12345"),
        ])]
    );
}
