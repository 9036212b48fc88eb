//! Map-valued evaluators.
//!
//! Every read here returns a deep copy: the caller may mutate or store the
//! result without aliasing oosvars or locals.

use rill_core::{Mlmv, MlmvMap};

use crate::errors::EvalResult;
use crate::keylist::{Keylist, OosvarRef};
use crate::rval::RvalEvaluator;
use crate::stack::ensure_sufficient_stack;
use crate::udf::UdfCallsite;
use crate::variables::Variables;

/// One `key : value` entry of a map literal.
#[derive(Debug)]
pub struct MapLiteralEntry {
    pub key: RvalEvaluator,
    pub value: MapLiteralValue,
}

#[derive(Debug)]
pub enum MapLiteralValue {
    /// A `{...}` written in place.
    Nested(Vec<MapLiteralEntry>),
    Value(Box<RxvalEvaluator>),
}

#[derive(Debug)]
pub enum RxvalEvaluator {
    MapLiteral(Vec<MapLiteralEntry>),
    Local { slot: usize },
    IndexedLocal { slot: usize, keys: Keylist },
    Oosvar(OosvarRef),
    FullOosvar,
    /// `$*`, with each field typed through the overlay.
    FullSrec,
    UdfCall(UdfCallsite),
    /// Any scalar expression, boxed as a terminal.
    Scalar(RvalEvaluator),
}

impl RxvalEvaluator {
    pub fn evaluate(&self, vars: &mut Variables<'_>) -> EvalResult<Mlmv> {
        Ok(match self {
            RxvalEvaluator::MapLiteral(entries) => {
                let mut map = MlmvMap::new();
                build_map_literal(entries, vars, &mut map)?;
                Mlmv::Map(map)
            }
            RxvalEvaluator::Local { slot } => vars.locals.top().get(*slot).clone(),
            RxvalEvaluator::IndexedLocal { slot, keys } => match keys.evaluate(vars)? {
                Some(path) => vars
                    .locals
                    .top()
                    .get_indexed(*slot, &path)
                    .cloned()
                    .unwrap_or_default(),
                None => Mlmv::absent(),
            },
            RxvalEvaluator::Oosvar(reference) => match reference.resolve(vars)? {
                Some(path) => vars.oosvars.get(&path).cloned().unwrap_or_default(),
                None => Mlmv::absent(),
            },
            RxvalEvaluator::FullOosvar => vars.oosvars.clone(),
            RxvalEvaluator::FullSrec => Mlmv::Map(vars.record_as_map()),
            RxvalEvaluator::UdfCall(callsite) => callsite.invoke(vars)?,
            RxvalEvaluator::Scalar(rval) => Mlmv::Terminal(rval.evaluate(vars)?),
        })
    }
}

/// Fills `target` from `entries` in source order, key before value.
/// Entries whose key is not usable, or whose value is absent, are skipped.
fn build_map_literal(
    entries: &[MapLiteralEntry],
    vars: &mut Variables<'_>,
    target: &mut MlmvMap,
) -> EvalResult<()> {
    for entry in entries {
        let key = entry.key.evaluate(vars)?.to_key();
        let value = match &entry.value {
            MapLiteralValue::Nested(nested) => {
                let mut map = MlmvMap::new();
                ensure_sufficient_stack(|| build_map_literal(nested, vars, &mut map))?;
                Mlmv::Map(map)
            }
            MapLiteralValue::Value(rxval) => rxval.evaluate(vars)?,
        };
        if let Some(key) = key {
            if !value.is_absent() {
                target.put(key, value);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]
mod tests;
