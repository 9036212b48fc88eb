//! Rill Eval - compiler and runtime for the rill record-stream DSL.
//!
//! A program arrives as a [`rill_ir::AstNode`] tree. [`Program::compile`]
//! turns it into evaluator trees once; [`PutMapper`] then runs them per
//! record through the [`rill_core::RecordMapper`] contract.
//!
//! # Architecture
//!
//! - [`RvalEvaluator`]: expressions producing one scalar
//! - [`RxvalEvaluator`]: expressions producing a scalar or a nested map
//! - [`Statement`]: assignments, control flow, `emit`, `filter`
//! - [`Variables`]: the per-record run-time context
//! - [`functions`]: the built-in function table, operators included
//!
//! Absent, empty and error are ordinary values that flow through every
//! evaluator. Only type-gate violations and non-boolean conditions abort a
//! record, as [`EvalError`]s.

mod compile;
pub mod config;
mod emit;
pub mod errors;
pub mod functions;
mod keylist;
mod program;
mod put;
mod rval;
mod rxval;
mod stack;
mod statement;
mod udf;
mod variables;

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]
mod test_support;

use std::sync::Once;

pub use compile::TopLevelBlock;
pub use config::{PutOptions, TypeInference, DEFAULT_FLATTEN_SEPARATOR};
pub use emit::{EmitStatement, Emittable, ANONYMOUS_NAME};
pub use errors::{CompileError, CompileResult, EvalError, EvalResult};
pub use keylist::{KeyPath, Keylist, OosvarRef};
pub use program::{Pass, Program};
pub use put::PutMapper;
pub use rval::{ContextVariable, RegexOperand, RvalEvaluator};
pub use rxval::{MapLiteralEntry, MapLiteralValue, RxvalEvaluator};
pub use statement::{execute_block, Block, Flow, Statement, UnsetTarget};
pub use udf::{Parameter, UdfCallsite, UserFunction};
pub use variables::{PassOutcome, Variables};

static TRACING_INIT: Once = Once::new();

/// Installs a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set; safe to call more than once,
/// and leaves an already-installed global subscriber in place.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let installed = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .try_init();
            if let Err(error) = installed {
                tracing::debug!(%error, "keeping the existing tracing subscriber");
            }
        }
    });
}
