//! The stats1 mapper: grouped accumulation with emission at end of stream
//! or, in iterative mode, onto every record.

use rill_core::{Lhm, Record, RecordMapper, StreamContext};
use tracing::{debug, trace};

use crate::accumulator::{FieldAccumulators, Sample};
use crate::errors::{StatsError, StatsResult};
use crate::options::Stats1Options;

/// Group-by values to per-value-field accumulators.
///
/// Groups and, within a group, value fields keep first-seen order, which
/// is the order they are emitted in.
type Groups = Lhm<Vec<String>, Lhm<String, FieldAccumulators>>;

#[derive(Debug)]
pub struct Stats1Mapper {
    options: Stats1Options,
    /// Fresh accumulators for one value field; cloned whenever a
    /// (group, field) pair is first seen.
    prototype: FieldAccumulators,
    groups: Groups,
}

impl Stats1Mapper {
    /// Validates the accumulator names up front so that bad names fail
    /// before any record is read.
    pub fn new(options: Stats1Options) -> StatsResult<Self> {
        if options.accumulators.is_empty() {
            return Err(StatsError::NoAccumulators);
        }
        if options.value_fields.is_empty() {
            return Err(StatsError::NoValueFields);
        }
        let prototype = FieldAccumulators::new(&options)?;
        debug!(
            accumulators = options.accumulators.len(),
            ingestors = prototype.ingestor_count(),
            value_fields = options.value_fields.len(),
            group_by = options.group_by.len(),
            "stats1 configured"
        );
        Ok(Stats1Mapper {
            options,
            prototype,
            groups: Lhm::new(),
        })
    }

    pub fn options(&self) -> &Stats1Options {
        &self.options
    }

    /// Number of distinct group-by value tuples seen so far.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn ingest(&mut self, record: &mut Record) -> StatsResult<()> {
        let Stats1Mapper {
            options,
            prototype,
            groups,
        } = self;
        let Some(key) = group_key(record, &options.group_by) else {
            trace!("record lacks a group-by field; skipped");
            return Ok(());
        };
        let group = groups.get_or_insert_with(key, || {
            trace!("new group");
            Lhm::new()
        });
        for field in &options.value_fields {
            // Setup runs once per (group, field), whether or not this
            // record carries the field.
            let accumulators = group.get_or_insert_with(field.clone(), || prototype.clone());
            let Some(text) = record.get(field.as_str()) else {
                continue;
            };
            accumulators.ingest(&Sample::new(field, text, options.allow_int_float))?;
            if options.iterative {
                accumulators.emit(field, record);
            }
        }
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(groups = self.groups.len()))]
    fn emit_all(&mut self) -> Vec<Record> {
        let group_by = &self.options.group_by;
        self.groups
            .iter_mut()
            .map(|(key, fields)| {
                let mut out: Record = group_by.iter().cloned().zip(key.iter().cloned()).collect();
                for (field, accumulators) in fields.iter_mut() {
                    accumulators.emit(field, &mut out);
                }
                out
            })
            .collect()
    }
}

/// The record's group-by values, or `None` if any is missing.
fn group_key(record: &Record, names: &[String]) -> Option<Vec<String>> {
    names
        .iter()
        .map(|name| record.get(name.as_str()).cloned())
        .collect()
}

impl RecordMapper for Stats1Mapper {
    type Error = StatsError;

    fn process(
        &mut self,
        record: Option<Record>,
        _context: &StreamContext,
    ) -> Result<Vec<Record>, StatsError> {
        match record {
            Some(mut record) => {
                self.ingest(&mut record)?;
                Ok(if self.options.iterative {
                    vec![record]
                } else {
                    Vec::new()
                })
            }
            None if self.options.iterative => Ok(Vec::new()),
            None => Ok(self.emit_all()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]
mod tests;
