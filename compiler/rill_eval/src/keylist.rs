//! Key paths for indexed oosvar and local references.

use smallvec::SmallVec;

use crate::errors::EvalResult;
use crate::rval::RvalEvaluator;
use crate::variables::Variables;

/// An evaluated key path.
pub type KeyPath = SmallVec<[String; 4]>;

/// The index expressions of `x[k1][k2]...`.
#[derive(Debug, Default)]
pub struct Keylist(pub Vec<RvalEvaluator>);

impl Keylist {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Evaluates every key, left to right. Any absent, empty or error key
    /// makes the whole path unusable, reported as `None`.
    pub fn evaluate(&self, vars: &mut Variables<'_>) -> EvalResult<Option<KeyPath>> {
        let mut path = KeyPath::new();
        let mut usable = true;
        for key in &self.0 {
            match key.evaluate(vars)?.to_key() {
                Some(key) => path.push(key),
                None => usable = false,
            }
        }
        Ok(usable.then_some(path))
    }
}

/// `@name[keys...]`.
#[derive(Debug)]
pub struct OosvarRef {
    pub name: String,
    pub keys: Keylist,
}

impl OosvarRef {
    /// The full path into the oosvar root: the name, then the keys.
    pub fn resolve(&self, vars: &mut Variables<'_>) -> EvalResult<Option<KeyPath>> {
        Ok(self.keys.evaluate(vars)?.map(|keys| {
            let mut path = KeyPath::with_capacity(keys.len() + 1);
            path.push(self.name.clone());
            path.extend(keys);
            path
        }))
    }
}
