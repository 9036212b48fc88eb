//! Fixtures shared by the unit tests.

use rill_core::{run_mapper, LocalStack, Mlmv, Record, ScopeId, StreamContext};
use rill_ir::AstNode;

use crate::config::PutOptions;
use crate::put::PutMapper;
use crate::variables::Variables;

/// Slots in the frame a [`Fixture`] enters.
pub(crate) const FIXTURE_FRAME_SIZE: usize = 8;

/// Long-lived state for a hand-driven [`Variables`], with one frame
/// already entered.
pub(crate) struct Fixture {
    pub oosvars: Mlmv,
    pub locals: LocalStack,
    pub stream: StreamContext,
    pub options: PutOptions,
    pub scope: ScopeId,
}

impl Fixture {
    pub fn new() -> Self {
        Fixture::with_options(PutOptions::default())
    }

    pub fn with_options(options: PutOptions) -> Self {
        let mut locals = LocalStack::new();
        let scope = locals.register_scope(FIXTURE_FRAME_SIZE);
        locals.enter(scope);
        let mut stream = StreamContext::new();
        stream.start_file("in.dkvp");
        stream.advance();
        Fixture {
            oosvars: Mlmv::empty_map(),
            locals,
            stream,
            options,
            scope,
        }
    }

    pub fn vars(&mut self, record: Record) -> Variables<'_> {
        Variables::new(
            record,
            &mut self.oosvars,
            &mut self.locals,
            &self.stream,
            &[],
            &self.options,
        )
    }
}

/// Compiles `root` and streams `records` through it, end of stream
/// included.
pub(crate) fn run_put(root: &AstNode, options: PutOptions, records: Vec<Record>) -> Vec<Record> {
    let mut mapper = PutMapper::compile(root, options).unwrap();
    run_mapper(&mut mapper, "in.dkvp", records).unwrap()
}
