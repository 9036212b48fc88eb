//! A compiled DSL program.

use rill_core::{internal_coding_error, LocalStack, Mlmv, Record, ScopeId, StreamContext};
use rill_ir::{AstNode, NodeKind};

use crate::compile::{Compiler, TopLevelBlock};
use crate::config::PutOptions;
use crate::errors::{CompileResult, EvalResult};
use crate::statement::execute_block;
use crate::udf::UserFunction;
use crate::variables::{PassOutcome, Variables};

/// Which top-level blocks a pass runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pass {
    Begin,
    Main,
    End,
}

/// Every evaluator tree of one program, plus the frames its scopes run in.
#[derive(Debug)]
pub struct Program {
    begin: Vec<TopLevelBlock>,
    main: TopLevelBlock,
    end: Vec<TopLevelBlock>,
    udfs: Vec<UserFunction>,
    locals: LocalStack,
}

impl Program {
    /// Compiles a program from its root statement block.
    ///
    /// Function definitions are collected first, so a call may appear
    /// before the `func` it names and functions may call each other.
    #[tracing::instrument(level = "debug", skip_all, fields(nodes = root.subtree_len()))]
    pub fn compile(root: &AstNode) -> CompileResult<Self> {
        if root.kind != NodeKind::StatementBlock {
            internal_coding_error("program root is not a statement block");
        }
        let mut compiler = Compiler::default();
        let mut locals = LocalStack::new();

        for node in &root.children {
            if node.kind == NodeKind::FuncDef {
                compiler.declare_function(node)?;
            }
        }

        let mut udfs = Vec::with_capacity(compiler.function_count());
        let mut begin = Vec::new();
        let mut end = Vec::new();
        for node in &root.children {
            match node.kind {
                NodeKind::FuncDef => udfs.push(compiler.compile_function(node, &mut locals)?),
                NodeKind::Begin => begin.push(compiler.compile_top_level(node, &mut locals)?),
                NodeKind::End => end.push(compiler.compile_top_level(node, &mut locals)?),
                _ => {}
            }
        }
        let main = compiler.compile_main(root, &mut locals)?;

        tracing::debug!(
            begin = begin.len(),
            main = main.body.len(),
            end = end.len(),
            functions = udfs.len(),
            "compiled program"
        );
        Ok(Program {
            begin,
            main,
            end,
            udfs,
            locals,
        })
    }

    pub fn has_begin(&self) -> bool {
        !self.begin.is_empty()
    }

    pub fn has_end(&self) -> bool {
        !self.end.is_empty()
    }

    /// Names of the user-defined functions, in definition order.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.udfs.iter().map(|f| f.name.as_str())
    }

    pub fn main_scope(&self) -> ScopeId {
        self.main.scope
    }

    pub fn locals(&self) -> &LocalStack {
        &self.locals
    }

    /// Runs one pass over `record`: for [`Pass::Main`] the record being
    /// processed, for `begin`/`end` an empty one.
    ///
    /// Frames are always exited, even when a statement fails, so the next
    /// pass starts from an empty local stack.
    pub fn run(
        &mut self,
        pass: Pass,
        record: Record,
        oosvars: &mut Mlmv,
        stream: &StreamContext,
        options: &PutOptions,
    ) -> EvalResult<PassOutcome> {
        let Program {
            begin,
            main,
            end,
            udfs,
            locals,
        } = self;
        let blocks = match pass {
            Pass::Begin => begin.as_slice(),
            Pass::Main => std::slice::from_ref(&*main),
            Pass::End => end.as_slice(),
        };
        let mut vars = Variables::new(record, oosvars, locals, stream, &*udfs, options);
        for block in blocks {
            vars.locals.enter(block.scope);
            let outcome = execute_block(&block.body, &mut vars);
            vars.locals.exit();
            outcome?;
        }
        Ok(vars.finish())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]
mod tests;
