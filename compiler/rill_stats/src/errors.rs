//! Errors reported by the stats1 verb.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("unknown accumulator `{name}`")]
    UnknownAccumulator { name: String },

    #[error("accumulator name `{name}` is not a valid percentile (expected p0 through p100)")]
    BadPercentile { name: String },

    #[error("field `{field}` has non-numeric value `{value}`")]
    NonNumeric { field: String, value: String },

    #[error("no accumulators requested")]
    NoAccumulators,

    #[error("no value fields requested")]
    NoValueFields,
}

pub type StatsResult<T> = Result<T, StatsError>;
