//! The `put` mapper: a compiled program run once per record.

use rill_core::{Mlmv, Record, RecordMapper, StreamContext};
use rill_ir::AstNode;

use crate::config::PutOptions;
use crate::errors::{CompileResult, EvalError};
use crate::program::{Pass, Program};

/// Runs `begin` blocks before the first record, the main statements on
/// every record and `end` blocks at end of stream.
///
/// Oosvars and the local-stack frame pool persist for the mapper's
/// lifetime; everything else is rebuilt per record.
#[derive(Debug)]
pub struct PutMapper {
    program: Program,
    oosvars: Mlmv,
    options: PutOptions,
    begun: bool,
}

impl PutMapper {
    pub fn new(program: Program, options: PutOptions) -> Self {
        PutMapper {
            program,
            oosvars: Mlmv::empty_map(),
            options,
            begun: false,
        }
    }

    /// Compiles `root` and wraps it.
    pub fn compile(root: &AstNode, options: PutOptions) -> CompileResult<Self> {
        Ok(PutMapper::new(Program::compile(root)?, options))
    }

    pub fn oosvars(&self) -> &Mlmv {
        &self.oosvars
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    fn run(
        &mut self,
        pass: Pass,
        record: Record,
        context: &StreamContext,
    ) -> Result<crate::variables::PassOutcome, EvalError> {
        self.program
            .run(pass, record, &mut self.oosvars, context, &self.options)
    }
}

impl RecordMapper for PutMapper {
    type Error = EvalError;

    fn process(
        &mut self,
        record: Option<Record>,
        context: &StreamContext,
    ) -> Result<Vec<Record>, EvalError> {
        let mut out = Vec::new();
        if !self.begun {
            self.begun = true;
            if self.program.has_begin() {
                out.extend(self.run(Pass::Begin, Record::new(), context)?.emitted);
            }
        }
        match record {
            Some(record) => {
                let outcome = self.run(Pass::Main, record, context)?;
                out.extend(outcome.emitted);
                let keep = outcome.filter_condition != self.options.invert_filter;
                if keep && !self.options.suppress_records {
                    out.push(outcome.record);
                }
            }
            None => {
                if self.program.has_end() {
                    out.extend(self.run(Pass::End, Record::new(), context)?.emitted);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]
mod tests;
