//! Compile-time and run-time errors.
//!
//! Only user-facing conditions live here. Absent, empty and error scalars
//! are values, not errors; broken engine invariants panic through
//! [`rill_core::internal_coding_error`].

use rill_core::TypeGateViolation;
use thiserror::Error;

/// A DSL program that parsed but cannot be compiled.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },

    #[error("function `{name}` takes {expected} argument(s) but was called with {got}")]
    WrongArity {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("invalid regex `{pattern}`: {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("unknown type gate `{name}`")]
    UnknownGate { name: String },

    #[error("unknown context variable `{name}`")]
    UnknownContextVariable { name: String },

    #[error("invalid numeric literal `{text}`")]
    InvalidNumber { text: String },

    #[error("`return` outside a function")]
    ReturnOutsideFunction,

    #[error("`{keyword}` outside a loop")]
    OutsideLoop { keyword: &'static str },

    #[error("function `{name}` is defined more than once")]
    DuplicateFunction { name: String },

    #[error("function `{name}` has the same name as a built-in function")]
    ShadowsBuiltin { name: String },

    #[error("{what} blocks are only allowed at top level")]
    NotTopLevel { what: &'static str },
}

/// A run-time failure that aborts the current record.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("couldn't assign variable `{name}`: {violation}")]
    TypeGate {
        name: String,
        #[source]
        violation: TypeGateViolation,
    },

    #[error("{context} condition evaluated to {got}, not boolean")]
    NonBooleanCondition {
        context: &'static str,
        got: &'static str,
    },
}

pub type CompileResult<T> = Result<T, CompileError>;

pub type EvalResult<T = rill_core::Mlrval> = Result<T, EvalError>;

pub fn wrong_arity(name: &str, expected: impl ToString, got: usize) -> CompileError {
    CompileError::WrongArity {
        name: name.to_owned(),
        expected: expected.to_string(),
        got,
    }
}

pub fn type_gate(name: &str, violation: TypeGateViolation) -> EvalError {
    EvalError::TypeGate {
        name: name.to_owned(),
        violation,
    }
}
