//! AST to evaluator-tree compilation.
//!
//! One [`Compiler`] walks a whole program. Expression nodes become
//! [`RvalEvaluator`](crate::rval::RvalEvaluator)s or
//! [`RxvalEvaluator`](crate::rxval::RxvalEvaluator)s depending on whether the
//! position wants a scalar or a map; statement nodes become
//! [`Statement`](crate::statement::Statement)s.
//!
//! Two kinds of failure are kept apart:
//! - a well-formed program the engine can't accept (unknown function,
//!   `break` outside a loop, ...) is a [`CompileError`];
//! - a node shape the parser can never produce is a bug upstream and
//!   panics through [`internal_coding_error`].

mod expr;
mod stmt;

use rill_core::{internal_coding_error, LocalStack, ScopeId, TypeMask, RETURN_VALUE_SLOT};
use rill_ir::{AstNode, NodeKind};
use rustc_hash::FxHashMap;

use crate::errors::{CompileError, CompileResult};
use crate::functions;
use crate::statement::Block;
use crate::udf::{Parameter, UserFunction};

/// Arity and index of a user-defined function, known before any body is
/// compiled so that calls may precede definitions.
#[derive(Copy, Clone, Debug)]
struct FunctionSignature {
    id: usize,
    arity: usize,
}

/// A `begin`, `end` or main block together with its frame.
#[derive(Debug)]
pub struct TopLevelBlock {
    pub scope: ScopeId,
    pub body: Block,
}

#[derive(Debug, Default)]
pub(crate) struct Compiler {
    functions: FxHashMap<String, FunctionSignature>,
    /// Nesting depth of loops around the statement being compiled.
    loop_depth: usize,
    in_function: bool,
    /// Slot count of the frame being compiled into.
    frame_size: usize,
}

impl Compiler {
    /// Registers a `func` so later calls can resolve to it.
    pub(crate) fn declare_function(&mut self, node: &AstNode) -> CompileResult<()> {
        let name = node.text.as_str();
        if functions::is_builtin(name) {
            return Err(CompileError::ShadowsBuiltin {
                name: name.to_owned(),
            });
        }
        if self.functions.contains_key(name) {
            return Err(CompileError::DuplicateFunction {
                name: name.to_owned(),
            });
        }
        let params = child(node, 0);
        expect_kind(params, NodeKind::ParameterList);
        let signature = FunctionSignature {
            id: self.functions.len(),
            arity: params.children.len(),
        };
        self.functions.insert(name.to_owned(), signature);
        Ok(())
    }

    pub(crate) fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub(crate) fn compile_function(
        &mut self,
        node: &AstNode,
        locals: &mut LocalStack,
    ) -> CompileResult<UserFunction> {
        expect_kind(node, NodeKind::FuncDef);
        expect_children(node, 2);
        self.frame_size = frame_size(node);
        self.in_function = true;
        self.loop_depth = 0;

        let mut params = Vec::new();
        for param in &child(node, 0).children {
            expect_kind(param, NodeKind::Parameter);
            expect_children(param, 1);
            let variable = child(param, 0);
            expect_kind(variable, NodeKind::NonindexedLocalVariable);
            params.push(Parameter {
                name: variable.text.clone(),
                slot: self.slot_of(variable),
                gate: gate(&param.text)?,
            });
        }
        let body = self.block(child(node, 1));
        self.in_function = false;

        Ok(UserFunction {
            name: node.text.clone(),
            scope: locals.register_scope(self.frame_size),
            params,
            body: body?,
        })
    }

    /// Compiles a `begin` or `end` block.
    pub(crate) fn compile_top_level(
        &mut self,
        node: &AstNode,
        locals: &mut LocalStack,
    ) -> CompileResult<TopLevelBlock> {
        expect_children(node, 1);
        self.frame_size = frame_size(node);
        let body = self.block(child(node, 0))?;
        Ok(TopLevelBlock {
            scope: locals.register_scope(self.frame_size),
            body,
        })
    }

    /// Compiles the main statements: every top-level node that is not a
    /// `begin`, `end` or `func`.
    pub(crate) fn compile_main(
        &mut self,
        root: &AstNode,
        locals: &mut LocalStack,
    ) -> CompileResult<TopLevelBlock> {
        self.frame_size = frame_size(root);
        let mut body = Vec::new();
        for node in &root.children {
            if !is_top_level_only(node.kind) {
                body.push(self.statement(node)?);
            }
        }
        Ok(TopLevelBlock {
            scope: locals.register_scope(self.frame_size),
            body,
        })
    }

    /// Slot index of a local-variable node, checked against the frame.
    #[track_caller]
    fn slot_of(&self, node: &AstNode) -> usize {
        let Some(slot) = node.slot else {
            malformed(node, "local variable without a slot");
        };
        if slot == RETURN_VALUE_SLOT || slot >= self.frame_size {
            malformed(node, "local slot outside its frame");
        }
        slot
    }
}

fn gate(name: &str) -> CompileResult<TypeMask> {
    TypeMask::from_gate_name(name).ok_or_else(|| CompileError::UnknownGate {
        name: name.to_owned(),
    })
}

fn is_top_level_only(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Begin | NodeKind::End | NodeKind::FuncDef)
}

/// Slot count for the frame `node` opens: the parser's figure if given,
/// else one past the highest slot used within it.
fn frame_size(node: &AstNode) -> usize {
    fn max_slot(node: &AstNode) -> usize {
        node.children
            .iter()
            .filter(|child| !is_top_level_only(child.kind))
            .map(max_slot)
            .fold(node.slot.unwrap_or(0), usize::max)
    }
    node.frame_size
        .unwrap_or_else(|| max_slot(node) + 1)
        .max(RETURN_VALUE_SLOT + 1)
}

// ── Shape checks ────────────────────────────────────────────────────

#[cold]
#[track_caller]
fn malformed(node: &AstNode, what: &str) -> ! {
    internal_coding_error(&format!(
        "malformed {} node \"{}\": {what}",
        node.kind, node.text
    ))
}

#[track_caller]
fn child(node: &AstNode, index: usize) -> &AstNode {
    match node.child(index) {
        Some(child) => child,
        None => malformed(node, "missing child"),
    }
}

#[track_caller]
fn expect_children(node: &AstNode, count: usize) {
    if node.children.len() != count {
        malformed(node, "wrong number of children");
    }
}

#[track_caller]
fn expect_kind(node: &AstNode, kind: NodeKind) {
    if node.kind != kind {
        malformed(node, &format!("expected {kind}"));
    }
}
