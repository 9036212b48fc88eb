//! Run-time context for one evaluation pass.
//!
//! A [`Variables`] is built per record (and once each for the `begin` and
//! `end` passes). It owns the record being processed and its typed overlay;
//! the oosvars, the local stack and the user-defined functions belong to the
//! long-lived mapper and are only borrowed.

use rill_core::{Lhm, LocalStack, Mlmv, MlmvMap, Mlrval, Record, StreamContext, TypeInference};

use crate::config::PutOptions;
use crate::udf::UserFunction;

pub struct Variables<'a> {
    record: Record,
    /// Field name to already-inferred value, for this record only.
    typed_overlay: Lhm<String, Mlrval>,
    pub oosvars: &'a mut Mlmv,
    pub locals: &'a mut LocalStack,
    pub stream: &'a StreamContext,
    pub udfs: &'a [UserFunction],
    pub options: &'a PutOptions,
    /// `\0`..`\9` from the last `=~`. `None` until one has been evaluated.
    captures: Option<Vec<String>>,
    filter_condition: bool,
    emitted: Vec<Record>,
}

/// What a pass produced, handed back to the mapper.
#[derive(Debug)]
pub struct PassOutcome {
    pub record: Record,
    pub emitted: Vec<Record>,
    /// Last `filter` result; `true` when no `filter` ran.
    pub filter_condition: bool,
}

impl<'a> Variables<'a> {
    pub fn new(
        record: Record,
        oosvars: &'a mut Mlmv,
        locals: &'a mut LocalStack,
        stream: &'a StreamContext,
        udfs: &'a [UserFunction],
        options: &'a PutOptions,
    ) -> Self {
        Variables {
            record,
            typed_overlay: Lhm::new(),
            oosvars,
            locals,
            stream,
            udfs,
            options,
            captures: None,
            filter_condition: true,
            emitted: Vec::new(),
        }
    }

    pub fn finish(self) -> PassOutcome {
        PassOutcome {
            record: self.record,
            emitted: self.emitted,
            filter_condition: self.filter_condition,
        }
    }

    #[inline]
    pub fn type_inference(&self) -> TypeInference {
        self.options.type_inference
    }

    #[inline]
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Typed value of field `name`, inferring and caching on first read.
    pub fn field(&mut self, name: &str) -> Mlrval {
        if let Some(value) = self.typed_overlay.get(name) {
            return value.clone();
        }
        let Some(text) = self.record.get(name) else {
            return Mlrval::Absent;
        };
        let value = Mlrval::infer(text, self.options.type_inference);
        self.typed_overlay.put(name.to_owned(), value.clone());
        value
    }

    /// Sets a field's text and typed value. Absent is not assigned.
    pub fn assign_field(&mut self, name: &str, value: Mlrval) {
        if value.is_absent() {
            return;
        }
        self.record.put(name.to_owned(), value.to_string());
        self.typed_overlay.put(name.to_owned(), value);
    }

    /// Assigns a scalar, or a map flattened into `name<sep>key...` fields.
    pub fn assign_field_value(&mut self, name: &str, value: Mlmv) {
        match value {
            Mlmv::Terminal(scalar) => self.assign_field(name, scalar),
            Mlmv::Map(map) => {
                let separator = self.options.flatten_separator.clone();
                for (key, scalar) in Mlmv::Map(map).flatten(name, &separator) {
                    self.assign_field(&key, scalar);
                }
            }
        }
    }

    pub fn unset_field(&mut self, name: &str) {
        self.record.remove(name);
        self.typed_overlay.remove(name);
    }

    pub fn clear_record(&mut self) {
        self.record.clear();
        self.typed_overlay.clear();
    }

    /// Replaces every field with the flattened contents of `map`.
    pub fn replace_record(&mut self, map: MlmvMap) {
        self.clear_record();
        let separator = self.options.flatten_separator.clone();
        for (key, scalar) in Mlmv::Map(map).flatten("", &separator) {
            self.assign_field(&key, scalar);
        }
    }

    /// All fields in order with their typed values.
    pub fn typed_fields(&mut self) -> Vec<(String, Mlrval)> {
        let names: Vec<String> = self.record.keys().cloned().collect();
        names
            .into_iter()
            .map(|name| {
                let value = self.field(&name);
                (name, value)
            })
            .collect()
    }

    /// The record as a one-level map of typed terminals.
    pub fn record_as_map(&mut self) -> MlmvMap {
        self.typed_fields()
            .into_iter()
            .map(|(name, value)| (name, Mlmv::Terminal(value)))
            .collect()
    }

    pub fn captures(&self) -> Option<&[String]> {
        self.captures.as_deref()
    }

    pub fn set_captures(&mut self, captures: Vec<String>) {
        self.captures = Some(captures);
    }

    pub fn set_filter_condition(&mut self, keep: bool) {
        self.filter_condition = keep;
    }

    pub fn emit(&mut self, record: Record) {
        self.emitted.push(record);
    }
}

#[cfg(test)]
mod tests;
