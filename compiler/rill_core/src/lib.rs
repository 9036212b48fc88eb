//! Rill core - the data model shared by the DSL evaluator and the verbs.
//!
//! - [`Lhm`]: the insertion-ordered hash map used for records, map values
//!   and grouping tables.
//! - [`Mlrval`]: scalar values, with type inference from field text.
//! - [`Mlmv`]: multi-level map values (terminal or nested map).
//! - [`LocalStack`]: frames for local variables, with ephemeral frames for
//!   recursion.
//! - [`Record`], [`StreamContext`] and [`RecordMapper`]: the record-stream
//!   interface.

mod internal;
pub mod lhm;
pub mod local_stack;
pub mod mlmv;
pub mod mlrval;
mod record;

pub use internal::{internal_coding_error, internal_coding_error_unless};
pub use lhm::{CountMismatch, Lhm};
pub use local_stack::{Frame, LocalStack, ScopeId, TypeGateViolation, TypeMask, RETURN_VALUE_SLOT};
pub use mlmv::{Mlmv, MlmvMap};
pub use mlrval::{format_float, Mlrval, TypeInference};
pub use record::{record, run_mapper, Record, RecordMapper, StreamContext};
