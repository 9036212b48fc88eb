//! User-defined functions.

use rill_core::{internal_coding_error, Mlmv, ScopeId, TypeMask, RETURN_VALUE_SLOT};

use crate::errors::{type_gate, EvalResult};
use crate::rxval::RxvalEvaluator;
use crate::stack::ensure_sufficient_stack;
use crate::statement::{execute_block, Block};
use crate::variables::Variables;

#[derive(Debug)]
pub struct Parameter {
    pub name: String,
    pub slot: usize,
    pub gate: TypeMask,
}

/// A compiled `func`.
#[derive(Debug)]
pub struct UserFunction {
    pub name: String,
    pub scope: ScopeId,
    pub params: Vec<Parameter>,
    pub body: Block,
}

impl UserFunction {
    /// Runs the body in a fresh activation of this function's frame and
    /// returns whatever `return` left in the return-value slot.
    ///
    /// The frame is exited on every path, errors included.
    pub fn call(&self, args: Vec<Mlmv>, vars: &mut Variables<'_>) -> EvalResult<Mlmv> {
        vars.locals.enter(self.scope);
        let outcome = self.bind_and_run(args, vars);
        let value = vars.locals.top_mut().take(RETURN_VALUE_SLOT);
        vars.locals.exit();
        outcome.map(|()| value)
    }

    fn bind_and_run(&self, args: Vec<Mlmv>, vars: &mut Variables<'_>) -> EvalResult<()> {
        let frame = vars.locals.top_mut();
        for (param, value) in self.params.iter().zip(args) {
            frame
                .define(param.slot, param.gate, value)
                .map_err(|violation| type_gate(&param.name, violation))?;
        }
        execute_block(&self.body, vars)?;
        Ok(())
    }
}

/// A call to a user-defined function, resolved by index once every
/// definition has been collected.
#[derive(Debug)]
pub struct UdfCallsite {
    pub id: usize,
    pub name: String,
    pub args: Vec<RxvalEvaluator>,
}

impl UdfCallsite {
    /// Evaluates the arguments in the caller's frame, then calls.
    pub fn invoke(&self, vars: &mut Variables<'_>) -> EvalResult<Mlmv> {
        let mut args = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            args.push(arg.evaluate(vars)?);
        }
        let udfs = vars.udfs;
        let Some(function) = udfs.get(self.id) else {
            internal_coding_error("function callsite resolved to no definition");
        };
        tracing::trace!(function = %self.name, depth = vars.locals.depth(), "call");
        ensure_sufficient_stack(|| function.call(args, vars))
    }
}
