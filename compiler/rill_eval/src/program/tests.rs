use pretty_assertions::assert_eq;
use rill_core::{record, Mlrval};
use rill_ir::build::*;
use rill_ir::AstNode;

use super::*;
use crate::errors::EvalError;

/// `func fact(int n) { if (n <= 1) { return 1 } return n * fact(n - 1) }`
fn factorial() -> AstNode {
    func_def(
        "fact",
        &[("int", "n", 1)],
        vec![
            if_chain(
                vec![(
                    binary("<=", local("n", 1), number("1")),
                    vec![return_value(Some(number("1")))],
                )],
                None,
            ),
            return_value(Some(binary(
                "*",
                local("n", 1),
                call("fact", vec![binary("-", local("n", 1), number("1"))]),
            ))),
        ],
        2,
    )
}

fn run_main(program: &mut Program, record: Record) -> EvalResult<PassOutcome> {
    let mut oosvars = Mlmv::empty_map();
    let stream = StreamContext::new();
    program.run(Pass::Main, record, &mut oosvars, &stream, &PutOptions::default())
}

#[test]
fn recursion_uses_ephemeral_frames_and_unwinds() {
    let root = program(
        vec![
            factorial(),
            assign_field("f", call("fact", vec![field("n")])),
        ],
        1,
    );
    let mut program = Program::compile(&root).unwrap();
    let outcome = run_main(&mut program, record([("n", "10")])).unwrap();
    assert_eq!(outcome.record.get("f").map(String::as_str), Some("3628800"));
    assert_eq!(program.locals().depth(), 0);

    // Pooled frames are free again for the next record.
    let outcome = run_main(&mut program, record([("n", "5")])).unwrap();
    assert_eq!(outcome.record.get("f").map(String::as_str), Some("120"));
}

#[test]
fn type_gate_failure_in_a_function_still_exits_frames() {
    let root = program(
        vec![
            factorial(),
            assign_field("f", call("fact", vec![field("n")])),
        ],
        1,
    );
    let mut program = Program::compile(&root).unwrap();
    let err = run_main(&mut program, record([("n", "abc")])).unwrap_err();
    assert!(matches!(err, EvalError::TypeGate { ref name, .. } if name == "n"));
    assert_eq!(program.locals().depth(), 0);

    let outcome = run_main(&mut program, record([("n", "3")])).unwrap();
    assert_eq!(outcome.record.get("f").map(String::as_str), Some("6"));
}

#[test]
fn functions_take_and_return_maps() {
    // func wrap(x) { return {"inner": x} }
    let wrap = func_def(
        "wrap",
        &[("var", "x", 1)],
        vec![return_value(Some(map_literal(vec![pair(
            string("inner"),
            local("x", 1),
        )])))],
        2,
    );
    let root = program(
        vec![
            wrap,
            assign_oosvar(oosvar("w", vec![]), call("wrap", vec![field("a")])),
            assign_field("b", oosvar("w", vec![string("inner")])),
        ],
        1,
    );
    let mut program = Program::compile(&root).unwrap();
    let mut oosvars = Mlmv::empty_map();
    let stream = StreamContext::new();
    let outcome = program
        .run(
            Pass::Main,
            record([("a", "7")]),
            &mut oosvars,
            &stream,
            &PutOptions::default(),
        )
        .unwrap();
    assert_eq!(outcome.record.get("b").map(String::as_str), Some("7"));
    assert_eq!(
        oosvars.flatten("", ":"),
        vec![("w:inner".to_owned(), Mlrval::Int(7))]
    );
}

#[test]
fn function_without_return_yields_absent() {
    let noop = func_def("noop", &[], vec![], 1);
    let root = program(vec![noop, assign_field("y", call("noop", vec![]))], 1);
    let mut program = Program::compile(&root).unwrap();
    let outcome = run_main(&mut program, record([("x", "1")])).unwrap();
    assert!(!outcome.record.contains_key("y"));
}

#[test]
fn begin_blocks_run_in_order() {
    let root = program(
        vec![
            begin(vec![assign_oosvar(oosvar("trace", vec![]), string("a"))], 1),
            begin(
                vec![assign_oosvar(
                    oosvar("trace", vec![]),
                    binary(".", oosvar("trace", vec![]), string("b")),
                )],
                1,
            ),
        ],
        1,
    );
    let mut program = Program::compile(&root).unwrap();
    let mut oosvars = Mlmv::empty_map();
    let stream = StreamContext::new();
    program
        .run(
            Pass::Begin,
            Record::new(),
            &mut oosvars,
            &stream,
            &PutOptions::default(),
        )
        .unwrap();
    assert_eq!(
        oosvars.flatten("", ":"),
        vec![("trace".to_owned(), Mlrval::from("ab"))]
    );
}
