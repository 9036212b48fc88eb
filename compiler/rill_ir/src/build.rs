//! Terse constructors for hand-assembled syntax trees.
//!
//! Each function returns a node already shaped the way the compiler expects,
//! so callers never have to remember wrapper nodes such as
//! `MapLiteralKey`/`MapLiteralValue`.

use crate::{AstNode, NodeKind};

pub fn string(text: &str) -> AstNode {
    AstNode::new(NodeKind::StringLiteral, text)
}

pub fn regex(text: &str) -> AstNode {
    AstNode::new(NodeKind::RegexLiteral, text)
}

pub fn regex_i(text: &str) -> AstNode {
    AstNode::new(NodeKind::RegexCaseInsensitive, text)
}

pub fn number(text: &str) -> AstNode {
    AstNode::new(NodeKind::NumericLiteral, text)
}

pub fn boolean(value: bool) -> AstNode {
    AstNode::new(NodeKind::BooleanLiteral, if value { "true" } else { "false" })
}

pub fn field(name: &str) -> AstNode {
    AstNode::new(NodeKind::FieldName, name)
}

pub fn indirect_field(name: AstNode) -> AstNode {
    AstNode::new(NodeKind::IndirectFieldName, "$[]").with_child(name)
}

pub fn full_srec() -> AstNode {
    AstNode::new(NodeKind::FullSrec, "$*")
}

/// `@name[keys...]`.
pub fn oosvar(name: &str, keys: Vec<AstNode>) -> AstNode {
    AstNode::new(NodeKind::OosvarKeylist, name).with_children(keys)
}

pub fn full_oosvar() -> AstNode {
    AstNode::new(NodeKind::FullOosvar, "@*")
}

pub fn local(name: &str, slot: usize) -> AstNode {
    AstNode::new(NodeKind::NonindexedLocalVariable, name).with_slot(slot)
}

pub fn indexed_local(name: &str, slot: usize, keys: Vec<AstNode>) -> AstNode {
    AstNode::new(NodeKind::IndexedLocalVariable, name)
        .with_slot(slot)
        .with_children(keys)
}

pub fn context(name: &str) -> AstNode {
    AstNode::new(NodeKind::ContextVariable, name)
}

pub fn env(name: AstNode) -> AstNode {
    AstNode::new(NodeKind::EnvironmentVariable, "ENV").with_child(name)
}

/// A map-literal pair whose value is a scalar expression.
pub fn pair(key: AstNode, value: AstNode) -> AstNode {
    let value = if value.kind == NodeKind::MapLiteral {
        value
    } else {
        AstNode::new(NodeKind::MapLiteralValue, "mapval").with_child(value)
    };
    AstNode::new(NodeKind::MapLiteralPair, "mappair").with_children(vec![
        AstNode::new(NodeKind::MapLiteralKey, "mapkey").with_child(key),
        value,
    ])
}

/// `{k1: v1, ...}` from pairs built with [`pair`].
pub fn map_literal(pairs: Vec<AstNode>) -> AstNode {
    AstNode::new(NodeKind::MapLiteral, "map_literal").with_children(pairs)
}

pub fn call(name: &str, args: Vec<AstNode>) -> AstNode {
    AstNode::new(NodeKind::FunctionCallsite, name).with_children(args)
}

pub fn unary(op: &str, operand: AstNode) -> AstNode {
    AstNode::new(NodeKind::Operator, op).with_child(operand)
}

pub fn binary(op: &str, left: AstNode, right: AstNode) -> AstNode {
    AstNode::new(NodeKind::Operator, op).with_children(vec![left, right])
}

pub fn ternary(cond: AstNode, then: AstNode, otherwise: AstNode) -> AstNode {
    AstNode::new(NodeKind::Operator, "?:").with_children(vec![cond, then, otherwise])
}

pub fn block(statements: Vec<AstNode>) -> AstNode {
    AstNode::new(NodeKind::StatementBlock, "block").with_children(statements)
}

/// Top-level statement list; `frame_size` is the main block's slot count.
pub fn program(statements: Vec<AstNode>, frame_size: usize) -> AstNode {
    block(statements).with_frame_size(frame_size)
}

pub fn begin(statements: Vec<AstNode>, frame_size: usize) -> AstNode {
    AstNode::new(NodeKind::Begin, "begin")
        .with_child(block(statements))
        .with_frame_size(frame_size)
}

pub fn end(statements: Vec<AstNode>, frame_size: usize) -> AstNode {
    AstNode::new(NodeKind::End, "end")
        .with_child(block(statements))
        .with_frame_size(frame_size)
}

/// `func name(params) { body }`. Parameters are `(type gate, name, slot)`.
pub fn func_def(
    name: &str,
    params: &[(&str, &str, usize)],
    body: Vec<AstNode>,
    frame_size: usize,
) -> AstNode {
    let params = params
        .iter()
        .map(|(gate, name, slot)| {
            AstNode::new(NodeKind::Parameter, *gate).with_child(local(name, *slot))
        })
        .collect();
    AstNode::new(NodeKind::FuncDef, name)
        .with_children(vec![
            AstNode::new(NodeKind::ParameterList, "params").with_children(params),
            block(body),
        ])
        .with_frame_size(frame_size)
}

pub fn assign_field(name: &str, rhs: AstNode) -> AstNode {
    AstNode::new(NodeKind::SrecAssignment, "=").with_children(vec![field(name), rhs])
}

pub fn assign_srec(lhs: AstNode, rhs: AstNode) -> AstNode {
    AstNode::new(NodeKind::SrecAssignment, "=").with_children(vec![lhs, rhs])
}

pub fn assign_oosvar(lhs: AstNode, rhs: AstNode) -> AstNode {
    AstNode::new(NodeKind::OosvarAssignment, "=").with_children(vec![lhs, rhs])
}

/// `gate name = rhs`, e.g. `var x = 1` or `map m = {}`.
pub fn define_local(gate: &str, name: &str, slot: usize, rhs: Option<AstNode>) -> AstNode {
    let mut node = AstNode::new(NodeKind::LocalDefinition, gate).with_child(local(name, slot));
    if let Some(rhs) = rhs {
        node.children.push(rhs);
    }
    node
}

pub fn assign_local(lhs: AstNode, rhs: AstNode) -> AstNode {
    AstNode::new(NodeKind::LocalAssignment, "=").with_children(vec![lhs, rhs])
}

pub fn unset(lvalues: Vec<AstNode>) -> AstNode {
    AstNode::new(NodeKind::Unset, "unset").with_children(lvalues)
}

pub fn filter(condition: AstNode) -> AstNode {
    AstNode::new(NodeKind::Filter, "filter").with_child(condition)
}

pub fn bare_boolean(expr: AstNode) -> AstNode {
    AstNode::new(NodeKind::BareBoolean, "bare_boolean").with_child(expr)
}

/// `if`/`elif` arms as `(condition, body)`, then an optional `else` body.
pub fn if_chain(arms: Vec<(AstNode, Vec<AstNode>)>, otherwise: Option<Vec<AstNode>>) -> AstNode {
    let mut items: Vec<AstNode> = arms
        .into_iter()
        .enumerate()
        .map(|(i, (cond, body))| {
            let text = if i == 0 { "if" } else { "elif" };
            AstNode::new(NodeKind::IfItem, text).with_children(vec![cond, block(body)])
        })
        .collect();
    if let Some(body) = otherwise {
        items.push(AstNode::new(NodeKind::IfItem, "else").with_child(block(body)));
    }
    AstNode::new(NodeKind::IfChain, "if_chain").with_children(items)
}

pub fn while_loop(condition: AstNode, body: Vec<AstNode>) -> AstNode {
    AstNode::new(NodeKind::While, "while").with_children(vec![condition, block(body)])
}

pub fn do_while(body: Vec<AstNode>, condition: AstNode) -> AstNode {
    AstNode::new(NodeKind::DoWhile, "do").with_children(vec![block(body), condition])
}

pub fn break_statement() -> AstNode {
    AstNode::new(NodeKind::Break, "break")
}

pub fn continue_statement() -> AstNode {
    AstNode::new(NodeKind::Continue, "continue")
}

/// `for (k, v in $*) { body }` with key/value slots.
pub fn for_srec(key: (&str, usize), value: (&str, usize), body: Vec<AstNode>) -> AstNode {
    AstNode::new(NodeKind::ForSrec, "for").with_children(vec![
        local(key.0, key.1),
        local(value.0, value.1),
        block(body),
    ])
}

/// `for (k, v in map) { body }` with key/value slots.
pub fn for_map(
    key: (&str, usize),
    value: (&str, usize),
    map: AstNode,
    body: Vec<AstNode>,
) -> AstNode {
    AstNode::new(NodeKind::ForMap, "for").with_children(vec![
        local(key.0, key.1),
        local(value.0, value.1),
        map,
        block(body),
    ])
}

/// `emit emittable, "name1", ...`.
pub fn emit(emittable: AstNode, names: Vec<AstNode>) -> AstNode {
    let mut node = AstNode::new(NodeKind::Emit, "emit").with_child(emittable);
    node.children.extend(names);
    node
}

pub fn return_value(value: Option<AstNode>) -> AstNode {
    let node = AstNode::new(NodeKind::Return, "return");
    match value {
        Some(value) => node.with_child(value),
        None => node,
    }
}
