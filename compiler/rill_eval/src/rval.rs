//! Scalar-valued evaluators.

use regex::Regex;
use rill_core::{Mlmv, Mlrval};

use crate::errors::EvalResult;
use crate::functions::{self, FunctionDescriptor};
use crate::keylist::{Keylist, OosvarRef};
use crate::rxval::RxvalEvaluator;
use crate::udf::UdfCallsite;
use crate::variables::Variables;

/// Built-in variables that describe the stream position or are constants.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContextVariable {
    Nr,
    Fnr,
    Nf,
    Filename,
    Filenum,
    Pi,
    E,
}

impl ContextVariable {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "NR" => ContextVariable::Nr,
            "FNR" => ContextVariable::Fnr,
            "NF" => ContextVariable::Nf,
            "FILENAME" => ContextVariable::Filename,
            "FILENUM" => ContextVariable::Filenum,
            "M_PI" => ContextVariable::Pi,
            "M_E" => ContextVariable::E,
            _ => return None,
        })
    }

    fn evaluate(self, vars: &Variables<'_>) -> Mlrval {
        let count = |n: u64| Mlrval::Int(i64::try_from(n).unwrap_or(i64::MAX));
        match self {
            ContextVariable::Nr => count(vars.stream.nr),
            ContextVariable::Fnr => count(vars.stream.fnr),
            ContextVariable::Nf => count(vars.record().len() as u64),
            ContextVariable::Filename => vars
                .stream
                .filename
                .as_deref()
                .map_or(Mlrval::Absent, Mlrval::from_string),
            ContextVariable::Filenum => count(vars.stream.filenum),
            ContextVariable::Pi => Mlrval::Float(std::f64::consts::PI),
            ContextVariable::E => Mlrval::Float(std::f64::consts::E),
        }
    }
}

/// Second argument of `=~` and the regex built-ins.
#[derive(Debug)]
pub enum RegexOperand {
    /// Compiled once, at compile time.
    Literal(Regex),
    /// Compiled on each evaluation; an invalid pattern yields error.
    Dynamic(Box<RvalEvaluator>),
}

impl RegexOperand {
    fn resolve(&self, vars: &mut Variables<'_>) -> EvalResult<Option<std::borrow::Cow<'_, Regex>>> {
        Ok(match self {
            RegexOperand::Literal(regex) => Some(std::borrow::Cow::Borrowed(regex)),
            RegexOperand::Dynamic(pattern) => {
                let pattern = pattern.evaluate(vars)?;
                Regex::new(&pattern.to_string())
                    .ok()
                    .map(std::borrow::Cow::Owned)
            }
        })
    }
}

#[derive(Debug)]
pub enum RvalEvaluator {
    Literal(Mlrval),
    /// String literal containing `\N` capture references.
    CaptureInterpolated(String),
    Field(String),
    IndirectField(Box<RvalEvaluator>),
    Oosvar(OosvarRef),
    Local {
        slot: usize,
    },
    IndexedLocal {
        slot: usize,
        keys: Keylist,
    },
    Context(ContextVariable),
    Env(Box<RvalEvaluator>),
    Builtin {
        function: &'static FunctionDescriptor,
        args: Vec<RvalEvaluator>,
    },
    RegexBuiltin {
        function: &'static FunctionDescriptor,
        input: Box<RvalEvaluator>,
        regex: RegexOperand,
        third: Option<Box<RvalEvaluator>>,
    },
    /// `=~` (sets captures) or `!=~` (does not).
    RegexMatch {
        input: Box<RvalEvaluator>,
        regex: RegexOperand,
        negate: bool,
    },
    And(Box<RvalEvaluator>, Box<RvalEvaluator>),
    Or(Box<RvalEvaluator>, Box<RvalEvaluator>),
    Xor(Box<RvalEvaluator>, Box<RvalEvaluator>),
    Ternary(Box<RvalEvaluator>, Box<RvalEvaluator>, Box<RvalEvaluator>),
    UdfCall(UdfCallsite),
    /// A map-valued expression read in scalar position: maps read as
    /// absent.
    FromMap(Box<RxvalEvaluator>),
}

/// Map-valued results read as absent in scalar position.
fn scalar_of(value: Mlmv) -> Mlrval {
    value.into_terminal().unwrap_or(Mlrval::Absent)
}

fn scalar_at(value: Option<&Mlmv>) -> Mlrval {
    value
        .and_then(Mlmv::as_terminal)
        .cloned()
        .unwrap_or(Mlrval::Absent)
}

impl RvalEvaluator {
    pub fn evaluate(&self, vars: &mut Variables<'_>) -> EvalResult {
        Ok(match self {
            RvalEvaluator::Literal(value) => value.clone(),
            RvalEvaluator::CaptureInterpolated(text) => match vars.captures() {
                Some(captures) => Mlrval::infer(
                    &functions::substitute_captures(text, captures),
                    vars.type_inference(),
                ),
                None => Mlrval::from_string(text.as_str()),
            },
            RvalEvaluator::Field(name) => vars.field(name),
            RvalEvaluator::IndirectField(name) => match name.evaluate(vars)?.to_key() {
                Some(name) => vars.field(&name),
                None => Mlrval::Absent,
            },
            RvalEvaluator::Oosvar(reference) => match reference.resolve(vars)? {
                Some(path) => scalar_at(vars.oosvars.get(&path)),
                None => Mlrval::Absent,
            },
            RvalEvaluator::Local { slot } => scalar_at(Some(vars.locals.top().get(*slot))),
            RvalEvaluator::IndexedLocal { slot, keys } => match keys.evaluate(vars)? {
                Some(path) => scalar_at(vars.locals.top().get_indexed(*slot, &path)),
                None => Mlrval::Absent,
            },
            RvalEvaluator::Context(variable) => variable.evaluate(vars),
            RvalEvaluator::Env(name) => match name.evaluate(vars)?.to_key() {
                Some(name) => std::env::var(name).map_or(Mlrval::Absent, Mlrval::from_string),
                None => Mlrval::Absent,
            },
            RvalEvaluator::Builtin { function, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(arg.evaluate(vars)?);
                }
                function.body.call(&values)
            }
            RvalEvaluator::RegexBuiltin {
                function,
                input,
                regex,
                third,
            } => {
                let input = input.evaluate(vars)?;
                // Left to right: a dynamic pattern sees captures as they were before `third`.
                let regex = regex.resolve(vars)?;
                let third = match third {
                    Some(third) => Some(third.evaluate(vars)?),
                    None => None,
                };
                match regex {
                    Some(regex) => function.body.call_with_regex(&input, &regex, third.as_ref()),
                    None => Mlrval::Error,
                }
            }
            RvalEvaluator::RegexMatch {
                input,
                regex,
                negate,
            } => {
                let input = input.evaluate(vars)?;
                if input.is_absent() || input.is_error() {
                    return Ok(input);
                }
                let subject = input.to_string();
                let Some(regex) = regex.resolve(vars)? else {
                    return Ok(Mlrval::Error);
                };
                if *negate {
                    Mlrval::Boolean(!regex.is_match(&subject))
                } else {
                    let captures = functions::regex_captures(&regex, &subject);
                    let matched = captures.is_some();
                    drop(regex);
                    vars.set_captures(captures.unwrap_or_default());
                    Mlrval::Boolean(matched)
                }
            }
            RvalEvaluator::And(left, right) => {
                let a = left.evaluate(vars)?;
                match a {
                    Mlrval::Absent => logical_operand(right.evaluate(vars)?),
                    _ => match a.as_bool() {
                        Some(false) => Mlrval::Boolean(false),
                        Some(true) => match right.evaluate(vars)? {
                            Mlrval::Absent => Mlrval::Boolean(true),
                            b => logical_operand(b),
                        },
                        None => Mlrval::Error,
                    },
                }
            }
            RvalEvaluator::Or(left, right) => {
                let a = left.evaluate(vars)?;
                match a {
                    Mlrval::Absent => logical_operand(right.evaluate(vars)?),
                    _ => match a.as_bool() {
                        Some(true) => Mlrval::Boolean(true),
                        Some(false) => match right.evaluate(vars)? {
                            Mlrval::Absent => Mlrval::Boolean(false),
                            b => logical_operand(b),
                        },
                        None => Mlrval::Error,
                    },
                }
            }
            RvalEvaluator::Xor(left, right) => {
                let a = left.evaluate(vars)?;
                let b = right.evaluate(vars)?;
                match (&a, &b) {
                    (Mlrval::Absent, _) => logical_operand(b),
                    (_, Mlrval::Absent) => logical_operand(a),
                    _ => match (a.as_bool(), b.as_bool()) {
                        (Some(x), Some(y)) => Mlrval::Boolean(x != y),
                        _ => Mlrval::Error,
                    },
                }
            }
            RvalEvaluator::Ternary(condition, then, otherwise) => {
                match condition.evaluate(vars)? {
                    Mlrval::Absent => Mlrval::Absent,
                    c => match c.as_bool() {
                        Some(true) => then.evaluate(vars)?,
                        Some(false) => otherwise.evaluate(vars)?,
                        None => Mlrval::Error,
                    },
                }
            }
            RvalEvaluator::UdfCall(callsite) => scalar_of(callsite.invoke(vars)?),
            RvalEvaluator::FromMap(map) => scalar_of(map.evaluate(vars)?),
        })
    }
}

/// A lone operand of a logical operator: booleans pass, absent stays
/// absent, anything else is an error.
fn logical_operand(value: Mlrval) -> Mlrval {
    match value {
        Mlrval::Absent => Mlrval::Absent,
        other => other.as_bool().map_or(Mlrval::Error, Mlrval::Boolean),
    }
}
