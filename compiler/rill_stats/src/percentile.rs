//! Order statistics.

use std::cmp::Ordering;

use rill_core::Mlrval;

use crate::errors::{StatsError, StatsResult};

/// The percentile a name such as `p25`, `p99.9` or `median` asks for, or
/// `None` when the name is not a percentile at all.
pub(crate) fn percentile_of(name: &str) -> StatsResult<Option<f64>> {
    if name == "median" {
        return Ok(Some(50.0));
    }
    let Some(digits) = name.strip_prefix('p') else {
        return Ok(None);
    };
    match digits.parse::<f64>() {
        Ok(p) if (0.0..=100.0).contains(&p) => Ok(Some(p)),
        _ => Err(StatsError::BadPercentile {
            name: name.to_owned(),
        }),
    }
}

/// Keeps every ingested value so any number of percentiles can be read
/// from one copy.
#[derive(Clone, Debug, Default)]
pub(crate) struct PercentileKeeper {
    values: Vec<Mlrval>,
    sorted: bool,
    interpolate: bool,
}

impl PercentileKeeper {
    pub(crate) fn new(interpolate: bool) -> Self {
        PercentileKeeper {
            values: Vec::new(),
            sorted: true,
            interpolate,
        }
    }

    pub(crate) fn ingest(&mut self, value: Mlrval) {
        self.values.push(value);
        self.sorted = false;
    }

    /// The `p`th percentile, or empty if nothing was ingested.
    ///
    /// Without interpolation this is the order statistic at
    /// `floor(p/100 * n)`, clamped to the last one. With interpolation it
    /// blends the two order statistics around `p/100 * (n - 1)`.
    pub(crate) fn percentile(&mut self, p: f64) -> Mlrval {
        if self.values.is_empty() {
            return Mlrval::Empty;
        }
        if !self.sorted {
            self.values.sort_by(compare);
            self.sorted = true;
        }
        if self.interpolate {
            self.interpolated(p)
        } else {
            self.values[non_interpolated_index(self.values.len(), p)].clone()
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "index is clamped to 0..n"
    )]
    fn interpolated(&self, p: f64) -> Mlrval {
        let n = self.values.len();
        let findex = ((p / 100.0) * (n - 1) as f64).max(0.0);
        let lower = (findex.floor() as usize).min(n - 1);
        if lower + 1 >= n {
            return self.values[lower].clone();
        }
        let frac = findex - lower as f64;
        let lo = as_float(&self.values[lower]);
        let hi = as_float(&self.values[lower + 1]);
        Mlrval::Float(lo + frac * (hi - lo))
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "index is clamped to 0..n"
)]
fn non_interpolated_index(n: usize, p: f64) -> usize {
    let index = (p / 100.0) * n as f64;
    if index < 0.0 {
        0
    } else {
        (index as usize).min(n - 1)
    }
}

fn as_float(value: &Mlrval) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}

fn compare(a: &Mlrval, b: &Mlrval) -> Ordering {
    as_float(a).total_cmp(&as_float(b))
}
