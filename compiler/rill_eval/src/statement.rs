//! Compiled statements and their execution.

use rill_core::{Mlmv, Mlrval, TypeMask, RETURN_VALUE_SLOT};

use crate::emit::EmitStatement;
use crate::errors::{type_gate, EvalError, EvalResult};
use crate::keylist::{Keylist, OosvarRef};
use crate::rval::RvalEvaluator;
use crate::rxval::RxvalEvaluator;
use crate::stack::ensure_sufficient_stack;
use crate::variables::Variables;

/// How control leaves a statement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Normal,
    Break,
    Continue,
    Return,
}

pub type Block = Vec<Statement>;

/// Target of `unset`.
#[derive(Debug)]
pub enum UnsetTarget {
    Field(String),
    IndirectField(RvalEvaluator),
    FullSrec,
    Oosvar(OosvarRef),
    FullOosvar,
    Local { slot: usize, keys: Keylist },
}

#[derive(Debug)]
pub enum Statement {
    AssignField {
        name: String,
        value: RxvalEvaluator,
    },
    AssignIndirectField {
        name: RvalEvaluator,
        value: RxvalEvaluator,
    },
    AssignFullSrec(RxvalEvaluator),
    AssignOosvar {
        target: OosvarRef,
        value: RxvalEvaluator,
    },
    AssignFullOosvar(RxvalEvaluator),
    DefineLocal {
        name: String,
        slot: usize,
        gate: TypeMask,
        value: Option<RxvalEvaluator>,
    },
    AssignLocal {
        name: String,
        slot: usize,
        keys: Keylist,
        value: RxvalEvaluator,
    },
    Unset(Vec<UnsetTarget>),
    Filter(RvalEvaluator),
    /// Evaluated for side effects such as captures; the value is dropped.
    BareBoolean(RvalEvaluator),
    If {
        arms: Vec<(RvalEvaluator, Block)>,
        otherwise: Option<Block>,
    },
    While {
        condition: RvalEvaluator,
        body: Block,
    },
    DoWhile {
        body: Block,
        condition: RvalEvaluator,
    },
    Break,
    Continue,
    ForSrec {
        key_slot: usize,
        value_slot: usize,
        body: Block,
    },
    ForMap {
        key_slot: usize,
        value_slot: usize,
        map: RxvalEvaluator,
        body: Block,
    },
    Emit(EmitStatement),
    Return(Option<RxvalEvaluator>),
    Block(Block),
}

/// Runs statements in order until one leaves with a non-normal flow.
pub fn execute_block(block: &[Statement], vars: &mut Variables<'_>) -> EvalResult<Flow> {
    ensure_sufficient_stack(|| {
        for statement in block {
            let flow = statement.execute(vars)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    })
}

/// Truth value of a condition. Absent counts as false.
fn condition(value: &Mlrval, context: &'static str) -> EvalResult<bool> {
    if value.is_absent() {
        return Ok(false);
    }
    value.as_bool().ok_or(EvalError::NonBooleanCondition {
        context,
        got: value.type_name(),
    })
}

/// What a loop does after its body ran once.
enum LoopStep {
    Next,
    Exit(Flow),
}

fn loop_step(flow: Flow) -> LoopStep {
    match flow {
        Flow::Normal | Flow::Continue => LoopStep::Next,
        Flow::Break => LoopStep::Exit(Flow::Normal),
        Flow::Return => LoopStep::Exit(Flow::Return),
    }
}

impl Statement {
    pub fn execute(&self, vars: &mut Variables<'_>) -> EvalResult<Flow> {
        match self {
            Statement::AssignField { name, value } => {
                let value = value.evaluate(vars)?;
                vars.assign_field_value(name, value);
            }
            Statement::AssignIndirectField { name, value } => {
                let name = name.evaluate(vars)?.to_key();
                let value = value.evaluate(vars)?;
                if let Some(name) = name {
                    vars.assign_field_value(&name, value);
                }
            }
            Statement::AssignFullSrec(value) => {
                if let Mlmv::Map(map) = value.evaluate(vars)? {
                    vars.replace_record(map);
                }
            }
            Statement::AssignOosvar { target, value } => {
                let path = target.resolve(vars)?;
                let value = value.evaluate(vars)?;
                if let Some(path) = path {
                    if !value.is_absent() {
                        vars.oosvars.put(&path, value);
                    }
                }
            }
            Statement::AssignFullOosvar(value) => {
                let value = value.evaluate(vars)?;
                if value.is_map() {
                    *vars.oosvars = value;
                }
            }
            Statement::DefineLocal {
                name,
                slot,
                gate,
                value,
            } => {
                let value = match value {
                    Some(value) => value.evaluate(vars)?,
                    None => Mlmv::absent(),
                };
                vars.locals
                    .top_mut()
                    .define(*slot, *gate, value)
                    .map_err(|violation| type_gate(name, violation))?;
            }
            Statement::AssignLocal {
                name,
                slot,
                keys,
                value,
            } => {
                let path = keys.evaluate(vars)?;
                let value = value.evaluate(vars)?;
                if let Some(path) = path {
                    if !value.is_absent() {
                        vars.locals
                            .top_mut()
                            .assign_indexed(*slot, &path, value)
                            .map_err(|violation| type_gate(name, violation))?;
                    }
                }
            }
            Statement::Unset(targets) => {
                for target in targets {
                    target.unset(vars)?;
                }
            }
            Statement::Filter(expression) => {
                let value = expression.evaluate(vars)?;
                if !value.is_absent() {
                    let keep = condition(&value, "filter")?;
                    vars.set_filter_condition(keep);
                }
            }
            Statement::BareBoolean(expression) => {
                expression.evaluate(vars)?;
            }
            Statement::If { arms, otherwise } => {
                for (test, body) in arms {
                    if condition(&test.evaluate(vars)?, "if")? {
                        return execute_block(body, vars);
                    }
                }
                if let Some(body) = otherwise {
                    return execute_block(body, vars);
                }
            }
            Statement::While { condition: test, body } => {
                while condition(&test.evaluate(vars)?, "while")? {
                    if let LoopStep::Exit(flow) = loop_step(execute_block(body, vars)?) {
                        return Ok(flow);
                    }
                }
            }
            Statement::DoWhile { body, condition: test } => loop {
                if let LoopStep::Exit(flow) = loop_step(execute_block(body, vars)?) {
                    return Ok(flow);
                }
                if !condition(&test.evaluate(vars)?, "do-while")? {
                    break;
                }
            },
            Statement::Break => return Ok(Flow::Break),
            Statement::Continue => return Ok(Flow::Continue),
            Statement::ForSrec {
                key_slot,
                value_slot,
                body,
            } => {
                for (name, value) in vars.typed_fields() {
                    let frame = vars.locals.top_mut();
                    bind_loop_variable(frame, *key_slot, Mlmv::Terminal(Mlrval::from_string(name)));
                    bind_loop_variable(frame, *value_slot, Mlmv::Terminal(value));
                    if let LoopStep::Exit(flow) = loop_step(execute_block(body, vars)?) {
                        return Ok(flow);
                    }
                }
            }
            Statement::ForMap {
                key_slot,
                value_slot,
                map,
                body,
            } => {
                let Mlmv::Map(map) = map.evaluate(vars)? else {
                    return Ok(Flow::Normal);
                };
                let inference = vars.type_inference();
                for (key, value) in map {
                    let frame = vars.locals.top_mut();
                    bind_loop_variable(frame, *key_slot, Mlmv::Terminal(Mlrval::infer(&key, inference)));
                    bind_loop_variable(frame, *value_slot, value);
                    if let LoopStep::Exit(flow) = loop_step(execute_block(body, vars)?) {
                        return Ok(flow);
                    }
                }
            }
            Statement::Emit(emit) => emit.execute(vars)?,
            Statement::Return(value) => {
                let value = match value {
                    Some(value) => value.evaluate(vars)?,
                    None => Mlmv::absent(),
                };
                *vars.locals.top_mut().get_mut(RETURN_VALUE_SLOT) = value;
                return Ok(Flow::Return);
            }
            Statement::Block(block) => return execute_block(block, vars),
        }
        Ok(Flow::Normal)
    }
}

/// Loop variables are untyped and rebound on every iteration.
fn bind_loop_variable(frame: &mut rill_core::Frame, slot: usize, value: Mlmv) {
    if frame.define(slot, TypeMask::VAR, value).is_err() {
        rill_core::internal_coding_error("untyped loop variable rejected a value");
    }
}

impl UnsetTarget {
    fn unset(&self, vars: &mut Variables<'_>) -> EvalResult<()> {
        match self {
            UnsetTarget::Field(name) => vars.unset_field(name),
            UnsetTarget::IndirectField(name) => {
                if let Some(name) = name.evaluate(vars)?.to_key() {
                    vars.unset_field(&name);
                }
            }
            UnsetTarget::FullSrec => vars.clear_record(),
            UnsetTarget::Oosvar(target) => {
                if let Some(path) = target.resolve(vars)? {
                    vars.oosvars.remove(&path);
                }
            }
            UnsetTarget::FullOosvar => *vars.oosvars = Mlmv::empty_map(),
            UnsetTarget::Local { slot, keys } => {
                if let Some(path) = keys.evaluate(vars)? {
                    vars.locals.top_mut().unset_indexed(*slot, &path);
                }
            }
        }
        Ok(())
    }
}
