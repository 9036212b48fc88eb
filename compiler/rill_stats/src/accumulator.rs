//! Per-field accumulators and the factory that builds them.
//!
//! Each value field of each group owns one [`FieldAccumulators`]: an
//! ingestion map with one entry per distinct accumulator, and an output
//! map with one entry per requested name. Every percentile name (`median`,
//! `p10`, `p99.9`, ...) reads from the same [`PercentileKeeper`], so the
//! output map can hold several names backed by one ingestion entry.

use rill_core::{internal_coding_error, Lhm, Mlrval, Record};

use crate::errors::{StatsError, StatsResult};
use crate::options::Stats1Options;
use crate::percentile::{percentile_of, PercentileKeeper};

/// Ingestion-map key of the shared percentile keeper.
const PERCENTILE_KEEPER: &str = "percentiles";

// ── Samples ─────────────────────────────────────────────────────────

/// One value-field value on its way into the accumulators.
///
/// The numeric reading is done once up front; only accumulators that
/// need a number fail on text that isn't one.
#[derive(Clone, Debug)]
pub(crate) struct Sample<'a> {
    field: &'a str,
    text: &'a str,
    number: Option<Mlrval>,
}

impl<'a> Sample<'a> {
    pub(crate) fn new(field: &'a str, text: &'a str, allow_int_float: bool) -> Self {
        let number = Mlrval::parse_number(text).map(|number| match number {
            Mlrval::Int(i) if !allow_int_float => Mlrval::Float(i as f64),
            other => other,
        });
        Sample {
            field,
            text,
            number,
        }
    }

    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn non_numeric(&self) -> StatsError {
        StatsError::NonNumeric {
            field: self.field.to_owned(),
            value: self.text.to_owned(),
        }
    }

    fn number(&self) -> StatsResult<&Mlrval> {
        self.number.as_ref().ok_or_else(|| self.non_numeric())
    }

    fn float(&self) -> StatsResult<f64> {
        self.number
            .as_ref()
            .and_then(Mlrval::as_f64)
            .ok_or_else(|| self.non_numeric())
    }
}

// ── Arithmetic ──────────────────────────────────────────────────────

fn zero(allow_int_float: bool) -> Mlrval {
    if allow_int_float {
        Mlrval::Int(0)
    } else {
        Mlrval::Float(0.0)
    }
}

fn one(allow_int_float: bool) -> Mlrval {
    if allow_int_float {
        Mlrval::Int(1)
    } else {
        Mlrval::Float(1.0)
    }
}

/// Int-preserving addition; overflows into float.
fn add(left: &Mlrval, right: &Mlrval) -> Mlrval {
    if let (Mlrval::Int(a), Mlrval::Int(b)) = (left, right) {
        return a
            .checked_add(*b)
            .map_or_else(|| Mlrval::Float(*a as f64 + *b as f64), Mlrval::Int);
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => Mlrval::Float(a + b),
        _ => Mlrval::Error,
    }
}

/// Power sums for the variance family.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Moments {
    n: u64,
    sumx: f64,
    sumx2: f64,
    sumx3: f64,
    sumx4: f64,
}

impl Moments {
    fn ingest(&mut self, x: f64) {
        let x2 = x * x;
        self.n += 1;
        self.sumx += x;
        self.sumx2 += x2;
        self.sumx3 += x2 * x;
        self.sumx4 += x2 * x2;
    }

    /// Unbiased sample variance; needs two points.
    pub(crate) fn variance(&self) -> Option<f64> {
        if self.n < 2 {
            return None;
        }
        let n = self.n as f64;
        let mean = self.sumx / n;
        let numerator = (self.sumx2 - mean * (2.0 * self.sumx - n * mean)).max(0.0);
        Some(numerator / (n - 1.0))
    }

    pub(crate) fn mean_error(&self) -> Option<f64> {
        self.variance().map(|var| (var / self.n as f64).sqrt())
    }

    /// Central moments about the mean, as `(second, third, fourth)`.
    fn central(&self) -> Option<(f64, f64, f64)> {
        if self.n < 2 {
            return None;
        }
        let n = self.n as f64;
        let mean = self.sumx / n;
        let (ex, ex2, ex3, ex4) = (mean, self.sumx2 / n, self.sumx3 / n, self.sumx4 / n);
        let m2 = ex2 - mean * ex;
        let m3 = ex3 - 3.0 * mean * ex2 + 2.0 * mean.powi(3);
        let m4 = ex4 - 4.0 * mean * ex3 + 6.0 * mean.powi(2) * ex2 - 3.0 * mean.powi(4);
        Some((m2, m3, m4))
    }

    pub(crate) fn skewness(&self) -> Option<f64> {
        self.central().map(|(m2, m3, _)| m3 / m2.powf(1.5))
    }

    /// Excess kurtosis.
    pub(crate) fn kurtosis(&self) -> Option<f64> {
        self.central().map(|(m2, _, m4)| m4 / (m2 * m2) - 3.0)
    }
}

/// Which statistic a [`Moments`] accumulator reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Statistic {
    Var,
    Stddev,
    Meaneb,
    Skewness,
    Kurtosis,
}

// ── Accumulators ────────────────────────────────────────────────────

/// Running state of one statistic.
///
/// Text-valued accumulators (`count`, `mode`, `first`, ...) take any
/// value; the rest need numbers. Empty values reach only `null_count`.
#[derive(Clone, Debug)]
pub(crate) enum Accumulator {
    Count { count: Mlrval, one: Mlrval },
    Mode { counts: Lhm<String, u64>, anti: bool },
    Sum { sum: Mlrval },
    Mean { sum: Mlrval, count: u64 },
    Moments { moments: Moments, statistic: Statistic },
    Extremum { best: Option<Mlrval>, max: bool },
    First { value: Option<String> },
    Last { value: Option<String> },
    DistinctCount { seen: Lhm<String, u64> },
    NullCount { count: Mlrval, one: Mlrval },
    Percentiles(PercentileKeeper),
}

impl Accumulator {
    /// Builds the named non-percentile accumulator.
    pub(crate) fn new(name: &str, allow_int_float: bool) -> StatsResult<Self> {
        let moments = |statistic| Accumulator::Moments {
            moments: Moments::default(),
            statistic,
        };
        Ok(match name {
            "count" => Accumulator::Count {
                count: zero(allow_int_float),
                one: one(allow_int_float),
            },
            "mode" => Accumulator::Mode {
                counts: Lhm::new(),
                anti: false,
            },
            "antimode" => Accumulator::Mode {
                counts: Lhm::new(),
                anti: true,
            },
            "sum" => Accumulator::Sum {
                sum: zero(allow_int_float),
            },
            "mean" => Accumulator::Mean {
                sum: zero(allow_int_float),
                count: 0,
            },
            "var" => moments(Statistic::Var),
            "stddev" => moments(Statistic::Stddev),
            "meaneb" => moments(Statistic::Meaneb),
            "skewness" => moments(Statistic::Skewness),
            "kurtosis" => moments(Statistic::Kurtosis),
            "min" => Accumulator::Extremum {
                best: None,
                max: false,
            },
            "max" => Accumulator::Extremum {
                best: None,
                max: true,
            },
            "first" => Accumulator::First { value: None },
            "last" => Accumulator::Last { value: None },
            "distinct_count" => Accumulator::DistinctCount { seen: Lhm::new() },
            "null_count" => Accumulator::NullCount {
                count: zero(allow_int_float),
                one: one(allow_int_float),
            },
            _ => {
                return Err(StatsError::UnknownAccumulator {
                    name: name.to_owned(),
                })
            }
        })
    }

    /// Whether a non-empty sample must read as a number.
    fn needs_number(&self) -> bool {
        matches!(
            self,
            Accumulator::Sum { .. }
                | Accumulator::Mean { .. }
                | Accumulator::Moments { .. }
                | Accumulator::Extremum { .. }
                | Accumulator::Percentiles(_)
        )
    }

    pub(crate) fn ingest(&mut self, sample: &Sample<'_>) -> StatsResult<()> {
        if sample.is_empty() {
            if let Accumulator::NullCount { count, one } = self {
                *count = add(count, one);
            }
            return Ok(());
        }
        match self {
            Accumulator::Count { count, one } => *count = add(count, one),
            Accumulator::Mode { counts, .. } | Accumulator::DistinctCount { seen: counts } => {
                *counts.get_or_insert_with(sample.text.to_owned(), || 0) += 1;
            }
            Accumulator::Sum { sum } => *sum = add(sum, sample.number()?),
            Accumulator::Mean { sum, count } => {
                *sum = add(sum, sample.number()?);
                *count += 1;
            }
            Accumulator::Moments { moments, .. } => moments.ingest(sample.float()?),
            Accumulator::Extremum { best, max } => {
                let candidate = sample.number()?;
                let x = sample.float()?;
                let replace = best.as_ref().and_then(Mlrval::as_f64).map_or(true, |b| {
                    if *max {
                        x > b
                    } else {
                        x < b
                    }
                });
                if replace {
                    *best = Some(candidate.clone());
                }
            }
            Accumulator::First { value } => {
                if value.is_none() {
                    *value = Some(sample.text.to_owned());
                }
            }
            Accumulator::Last { value } => *value = Some(sample.text.to_owned()),
            Accumulator::NullCount { .. } => {}
            Accumulator::Percentiles(keeper) => keeper.ingest(sample.number()?.clone()),
        }
        Ok(())
    }

    /// Current value; empty where the statistic is undefined so far.
    pub(crate) fn value(&self) -> Mlrval {
        let float = |x: Option<f64>| x.map_or(Mlrval::Empty, Mlrval::Float);
        match self {
            Accumulator::Count { count, .. } | Accumulator::NullCount { count, .. } => {
                count.clone()
            }
            Accumulator::Mode { counts, anti } => {
                let mut chosen: Option<(&String, u64)> = None;
                for (text, &n) in counts {
                    let better = chosen.map_or(true, |(_, best)| {
                        if *anti {
                            n < best
                        } else {
                            n > best
                        }
                    });
                    if better {
                        chosen = Some((text, n));
                    }
                }
                chosen.map_or(Mlrval::Empty, |(text, _)| Mlrval::from_string(text.clone()))
            }
            Accumulator::Sum { sum } => sum.clone(),
            Accumulator::Mean { sum, count } => match (sum.as_f64(), *count) {
                (Some(sum), n) if n > 0 => Mlrval::Float(sum / n as f64),
                _ => Mlrval::Empty,
            },
            Accumulator::Moments { moments, statistic } => float(match statistic {
                Statistic::Var => moments.variance(),
                Statistic::Stddev => moments.variance().map(f64::sqrt),
                Statistic::Meaneb => moments.mean_error(),
                Statistic::Skewness => moments.skewness(),
                Statistic::Kurtosis => moments.kurtosis(),
            }),
            Accumulator::Extremum { best, .. } => best.clone().unwrap_or(Mlrval::Empty),
            Accumulator::First { value } | Accumulator::Last { value } => {
                value.clone().map_or(Mlrval::Empty, Mlrval::from_string)
            }
            Accumulator::DistinctCount { seen } => {
                Mlrval::Int(i64::try_from(seen.len()).unwrap_or(i64::MAX))
            }
            Accumulator::Percentiles(_) => {
                internal_coding_error("percentile keeper read without a percentile")
            }
        }
    }
}

// ── Factory ─────────────────────────────────────────────────────────

/// What one output name reads.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Output {
    /// The ingestion entry stored under the same name.
    Own,
    /// A percentile of the shared keeper.
    Percentile(f64),
}

/// All accumulators for one value field of one group.
#[derive(Clone, Debug)]
pub(crate) struct FieldAccumulators {
    ingestors: Lhm<String, Accumulator>,
    outputs: Lhm<String, Output>,
}

impl FieldAccumulators {
    /// Builds accumulators for `options.accumulators`, failing on the first
    /// unknown or malformed name.
    pub(crate) fn new(options: &Stats1Options) -> StatsResult<Self> {
        let mut ingestors = Lhm::new();
        let mut outputs = Lhm::new();
        for name in &options.accumulators {
            if let Some(p) = percentile_of(name)? {
                ingestors.get_or_insert_with(PERCENTILE_KEEPER.to_owned(), || {
                    Accumulator::Percentiles(PercentileKeeper::new(options.interpolate_percentiles))
                });
                outputs.put(name.clone(), Output::Percentile(p));
            } else {
                ingestors.put(name.clone(), Accumulator::new(name, options.allow_int_float)?);
                outputs.put(name.clone(), Output::Own);
            }
        }
        Ok(FieldAccumulators { ingestors, outputs })
    }

    /// Number of distinct ingestion entries.
    pub(crate) fn ingestor_count(&self) -> usize {
        self.ingestors.len()
    }

    /// Feeds every accumulator, or none of them when the sample is
    /// non-numeric and some accumulator needs a number.
    pub(crate) fn ingest(&mut self, sample: &Sample<'_>) -> StatsResult<()> {
        if !sample.is_empty() && self.ingestors.values().any(Accumulator::needs_number) {
            sample.number()?;
        }
        for accumulator in self.ingestors.values_mut() {
            accumulator.ingest(sample)?;
        }
        Ok(())
    }

    /// Writes `<field>_<name>` for every output name, in request order.
    pub(crate) fn emit(&mut self, field: &str, out: &mut Record) {
        for (name, output) in &self.outputs {
            let value = match output {
                Output::Own => self.ingestors.get(name.as_str()).map(Accumulator::value),
                Output::Percentile(p) => match self.ingestors.get_mut(PERCENTILE_KEEPER) {
                    Some(Accumulator::Percentiles(keeper)) => Some(keeper.percentile(*p)),
                    _ => None,
                },
            };
            let Some(value) = value else {
                internal_coding_error(&format!("no accumulator behind output `{name}`"));
            };
            out.put(format!("{field}_{name}"), value.to_string());
        }
    }
}
