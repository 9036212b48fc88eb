//! Rill IR - the abstract syntax tree handed from the DSL parser to the
//! evaluator compiler.
//!
//! The parser itself lives outside this workspace. What crosses the boundary
//! is a plain tree of [`AstNode`]s:
//! - a stable [`NodeKind`] tag from a closed enumeration,
//! - the node's source text (field name, literal text, operator, ...),
//! - an ordered list of children,
//! - for local-variable references, a pre-resolved frame-relative slot index,
//! - for frame-bearing nodes (main block, `begin`, `end`, `func`), the number
//!   of slots their frame needs.
//!
//! The [`build`] module has terse constructors for assembling trees by hand,
//! used by tests and by embedders that generate programs directly.

mod node;

pub mod build;

pub use node::{AstNode, NodeKind, AST_VERSION};
