//! Records, stream position, and the mapper interface.

use crate::lhm::Lhm;

/// One stream record: ordered field name to field text.
pub type Record = Lhm<String, String>;

/// Builds a record from `(name, value)` pairs.
pub fn record<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Record
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Where in the input stream the current record came from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamContext {
    /// 1-up record number across all files.
    pub nr: u64,
    /// 1-up record number within the current file.
    pub fnr: u64,
    pub filename: Option<String>,
    /// 1-up index of the current file.
    pub filenum: u64,
}

impl StreamContext {
    pub fn new() -> Self {
        StreamContext::default()
    }

    /// Moves to the first record of a new input file.
    pub fn start_file(&mut self, filename: impl Into<String>) {
        self.filename = Some(filename.into());
        self.filenum += 1;
        self.fnr = 0;
    }

    /// Counts one more record.
    pub fn advance(&mut self) {
        self.nr += 1;
        self.fnr += 1;
    }
}

/// A record-stream transformation.
pub trait RecordMapper {
    type Error: std::error::Error;

    /// Called with `Some(record)` once per input record, then once with
    /// `None` at end of stream. Returns the records to pass downstream.
    fn process(
        &mut self,
        record: Option<Record>,
        context: &StreamContext,
    ) -> Result<Vec<Record>, Self::Error>;
}

/// Feeds `records`, as if read from one file named `filename`, through
/// `mapper` followed by the end-of-stream call, and collects all output.
pub fn run_mapper<M: RecordMapper>(
    mapper: &mut M,
    filename: &str,
    records: impl IntoIterator<Item = Record>,
) -> Result<Vec<Record>, M::Error> {
    let mut context = StreamContext::new();
    context.start_file(filename);
    let mut out = Vec::new();
    for rec in records {
        context.advance();
        out.extend(mapper.process(Some(rec), &context)?);
    }
    out.extend(mapper.process(None, &context)?);
    Ok(out)
}
