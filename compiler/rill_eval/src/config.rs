//! Engine options.

pub use rill_core::TypeInference;

/// Default separator joining nested map keys into emitted field names.
pub const DEFAULT_FLATTEN_SEPARATOR: &str = ".";

/// Options for running a DSL program over a record stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PutOptions {
    pub type_inference: TypeInference,
    /// Joins nested keys when a map is flattened into record fields.
    pub flatten_separator: String,
    /// Emit nothing for the records themselves; only `emit` output passes.
    pub suppress_records: bool,
    /// Pass records whose `filter` condition is false, and drop the rest.
    pub invert_filter: bool,
}

impl Default for PutOptions {
    fn default() -> Self {
        PutOptions {
            type_inference: TypeInference::default(),
            flatten_separator: DEFAULT_FLATTEN_SEPARATOR.to_owned(),
            suppress_records: false,
            invert_filter: false,
        }
    }
}

impl PutOptions {
    #[must_use]
    pub fn with_type_inference(mut self, type_inference: TypeInference) -> Self {
        self.type_inference = type_inference;
        self
    }

    #[must_use]
    pub fn with_flatten_separator(mut self, separator: impl Into<String>) -> Self {
        self.flatten_separator = separator.into();
        self
    }

    /// `-q`.
    #[must_use]
    pub fn suppress_records(mut self) -> Self {
        self.suppress_records = true;
        self
    }

    /// `-x`.
    #[must_use]
    pub fn invert_filter(mut self) -> Self {
        self.invert_filter = true;
        self
    }
}
