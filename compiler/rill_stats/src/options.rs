//! Verb options.

/// Options for [`Stats1Mapper`](crate::Stats1Mapper).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stats1Options {
    /// Accumulator names in output order, e.g. `["count", "p10", "mean"]`.
    pub accumulators: Vec<String>,
    pub value_fields: Vec<String>,
    pub group_by: Vec<String>,
    /// Append running statistics to every record instead of emitting
    /// summaries at end of stream.
    pub iterative: bool,
    /// Keep sums and counts integral while every input is an int. Off
    /// means all arithmetic is done in floats.
    pub allow_int_float: bool,
    /// Linear interpolation between order statistics for percentiles.
    pub interpolate_percentiles: bool,
}

impl Stats1Options {
    pub fn new<A, F>(
        accumulators: impl IntoIterator<Item = A>,
        value_fields: impl IntoIterator<Item = F>,
    ) -> Self
    where
        A: Into<String>,
        F: Into<String>,
    {
        Stats1Options {
            accumulators: accumulators.into_iter().map(Into::into).collect(),
            value_fields: value_fields.into_iter().map(Into::into).collect(),
            group_by: Vec::new(),
            iterative: false,
            allow_int_float: true,
            interpolate_percentiles: false,
        }
    }

    /// `-g`.
    #[must_use]
    pub fn group_by<G: Into<String>>(mut self, fields: impl IntoIterator<Item = G>) -> Self {
        self.group_by = fields.into_iter().map(Into::into).collect();
        self
    }

    /// `-s`.
    #[must_use]
    pub fn iterative(mut self) -> Self {
        self.iterative = true;
        self
    }

    /// `-F`.
    #[must_use]
    pub fn float_only(mut self) -> Self {
        self.allow_int_float = false;
        self
    }

    /// `-i`.
    #[must_use]
    pub fn interpolate_percentiles(mut self) -> Self {
        self.interpolate_percentiles = true;
        self
    }
}
