//! Rill stats - the `stats1` verb: summary statistics of value fields,
//! optionally grouped by other fields.
//!
//! Records are grouped by the exact text of their group-by fields. Each
//! group keeps, per value field, a set of accumulators built once from the
//! requested names. At end of stream one record per group is emitted, in
//! first-seen order, holding the group-by fields followed by
//! `<field>_<accumulator>` for every value field and accumulator. In
//! iterative mode the running statistics are instead written onto each
//! record as it passes.
//!
//! Supported accumulators: `count`, `mode`, `antimode`, `sum`, `mean`,
//! `var`, `stddev`, `meaneb`, `skewness`, `kurtosis`, `min`, `max`,
//! `first`, `last`, `distinct_count`, `null_count`, `median`, and
//! percentiles `pNN` / `pNN.N`.

mod accumulator;
pub mod errors;
pub mod options;
mod mapper;
mod percentile;

pub use errors::{StatsError, StatsResult};
pub use mapper::Stats1Mapper;
pub use options::Stats1Options;
