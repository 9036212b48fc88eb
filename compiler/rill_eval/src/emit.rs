//! `emit`: turning map values into output records.
//!
//! With split-by names, each map level consumed by a name contributes a
//! `name=key` field and one record per key; a terminal met at such a level
//! emits as `name=key,base=value`. Once the names run out, the
//! remaining map is flattened into a single record, nested keys joined by
//! the flatten separator. A terminal emits as `base=value`.

use rill_core::{Mlmv, Mlrval, Record};

use crate::errors::EvalResult;
use crate::keylist::{Keylist, OosvarRef};
use crate::rval::RvalEvaluator;
use crate::rxval::RxvalEvaluator;
use crate::variables::Variables;

/// Base name for emittables with no variable name of their own.
pub const ANONYMOUS_NAME: &str = "_";

#[derive(Debug)]
pub enum Emittable {
    Oosvar(OosvarRef),
    /// `emit @*`: every oosvar, one after another.
    FullOosvar,
    Local {
        name: String,
        slot: usize,
        keys: Keylist,
    },
    /// A map literal or any other map-valued expression.
    Value(RxvalEvaluator),
}

#[derive(Debug)]
pub struct EmitStatement {
    pub emittable: Emittable,
    pub names: Vec<RvalEvaluator>,
}

impl EmitStatement {
    pub fn execute(&self, vars: &mut Variables<'_>) -> EvalResult<()> {
        let mut names = Vec::with_capacity(self.names.len());
        for name in &self.names {
            match name.evaluate(vars)?.to_key() {
                Some(name) => names.push(name),
                None => return Ok(()),
            }
        }

        let emissions: Vec<(String, Mlmv)> = match &self.emittable {
            Emittable::Oosvar(reference) => {
                let Some(path) = reference.resolve(vars)? else {
                    return Ok(());
                };
                let value = vars.oosvars.get(&path).cloned().unwrap_or_default();
                vec![(path.join(":"), value)]
            }
            Emittable::FullOosvar => match vars.oosvars.as_map() {
                Some(map) => map
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
                None => Vec::new(),
            },
            Emittable::Local { name, slot, keys } => {
                let Some(path) = keys.evaluate(vars)? else {
                    return Ok(());
                };
                let value = vars
                    .locals
                    .top()
                    .get_indexed(*slot, &path)
                    .cloned()
                    .unwrap_or_default();
                let mut base = name.clone();
                for key in &path {
                    base.push(':');
                    base.push_str(key);
                }
                vec![(base, value)]
            }
            Emittable::Value(rxval) => vec![(ANONYMOUS_NAME.to_owned(), rxval.evaluate(vars)?)],
        };

        let separator = vars.options.flatten_separator.clone();
        let mut out = Vec::new();
        for (base, value) in &emissions {
            emit_value(value, base, &names, &mut Vec::new(), &separator, &mut out);
        }
        tracing::trace!(records = out.len(), "emit");
        for record in out {
            vars.emit(record);
        }
        Ok(())
    }
}

/// Appends the records for `value` to `out`. `prefix` holds the `name=key`
/// fields of the split levels already consumed, outermost first.
fn emit_value(
    value: &Mlmv,
    base: &str,
    names: &[String],
    prefix: &mut Vec<(String, String)>,
    separator: &str,
    out: &mut Vec<Record>,
) {
    match value {
        Mlmv::Terminal(Mlrval::Absent) => {}
        Mlmv::Terminal(scalar) => {
            let mut record = prefixed(prefix);
            record.put(base.to_owned(), scalar.to_string());
            out.push(record);
        }
        Mlmv::Map(map) => match names.split_first() {
            Some((name, rest)) => {
                for (key, child) in map {
                    prefix.push((name.clone(), key.clone()));
                    emit_value(child, base, rest, prefix, separator, out);
                    prefix.pop();
                }
            }
            None => {
                let fields = value.flatten("", separator);
                if fields.is_empty() {
                    return;
                }
                let mut record = prefixed(prefix);
                for (key, scalar) in fields {
                    if !scalar.is_absent() {
                        record.put(key, scalar.to_string());
                    }
                }
                out.push(record);
            }
        },
    }
}

/// A fresh record holding the split-level fields.
fn prefixed(prefix: &[(String, String)]) -> Record {
    prefix.iter().cloned().collect()
}
