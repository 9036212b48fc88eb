//! AST node and its type tags.

use std::fmt;

/// Version of the [`NodeKind`] tag set.
///
/// Bumped whenever a tag is added, removed, or changes shape. No
/// compatibility is promised across versions.
pub const AST_VERSION: u32 = 1;

/// Type tag of an AST node.
///
/// Child shapes are fixed per tag; the compiler treats any other shape as an
/// internal error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Literals
    /// `"abc"`; may contain `\1`-style capture references.
    StringLiteral,
    /// Second operand of `=~`, `sub`, etc.: a case-sensitive regex.
    RegexLiteral,
    /// `"..."i`: a case-insensitive regex.
    RegexCaseInsensitive,
    /// `1`, `0xff`, `2.5e3`.
    NumericLiteral,
    /// `true` / `false`.
    BooleanLiteral,

    // Variable references
    /// `$name`. Text is the field name.
    FieldName,
    /// `$[expr]`. One child: the name expression.
    IndirectFieldName,
    /// `$*`.
    FullSrec,
    /// `@name[k1][k2]...`. Text is the oosvar name; children are the index
    /// expressions (possibly none).
    OosvarKeylist,
    /// `@*`.
    FullOosvar,
    /// `x`. Text is the variable name; carries a slot index.
    NonindexedLocalVariable,
    /// `x[k1][k2]...`. Carries a slot index; children are the index
    /// expressions.
    IndexedLocalVariable,
    /// `NR`, `FNR`, `NF`, `FILENAME`, `FILENUM`, `M_PI`, `M_E`.
    ContextVariable,
    /// `ENV[expr]`. One child: the variable-name expression.
    EnvironmentVariable,

    // Map literals
    /// `{...}`. Children are `MapLiteralPair`s.
    MapLiteral,
    /// One `key : value` entry. Children: `MapLiteralKey`, then either
    /// `MapLiteralValue` or a nested `MapLiteral`.
    MapLiteralPair,
    /// Wrapper around a pair's key expression (one child).
    MapLiteralKey,
    /// Wrapper around a pair's terminal value expression (one child).
    MapLiteralValue,

    // Calls
    /// `f(a, b)`. Text is the function name; children are the arguments.
    FunctionCallsite,
    /// Unary, binary, or ternary operator. Text is the operator (`+`, `!`,
    /// `?:`, ...); children are the operands.
    Operator,

    // Statements
    /// `{ ... }`. Children are statements. The top-level block carries the
    /// main frame size.
    StatementBlock,
    /// `begin { ... }`. One child: the block. Carries a frame size.
    Begin,
    /// `end { ... }`. One child: the block. Carries a frame size.
    End,
    /// `func name(params) { ... }`. Text is the name; children are a
    /// `ParameterList` and a `StatementBlock`. Carries a frame size.
    FuncDef,
    /// Children are `Parameter`s.
    ParameterList,
    /// Text is the type gate (`var`, `str`, `map`, ...); one child, the
    /// `NonindexedLocalVariable` being bound.
    Parameter,
    /// `$x = ...`, `$[e] = ...`, `$* = ...`. Children: lvalue, rvalue.
    SrecAssignment,
    /// `@x[...] = ...`, `@* = ...`. Children: lvalue, rvalue.
    OosvarAssignment,
    /// `var x = ...`. Text is the type gate; children: the
    /// `NonindexedLocalVariable`, then optionally the rvalue.
    LocalDefinition,
    /// `x = ...`, `x[k] = ...`. Children: lvalue, rvalue.
    LocalAssignment,
    /// `unset a, b, ...`. Children are lvalues.
    Unset,
    /// `filter expr`.
    Filter,
    /// A boolean expression used as a statement.
    BareBoolean,
    /// Children are `IfItem`s, in source order.
    IfChain,
    /// Text is `if`, `elif`, or `else`. Children: condition and block, or
    /// just the block for `else`.
    IfItem,
    /// Children: condition, block.
    While,
    /// Children: block, condition.
    DoWhile,
    Break,
    Continue,
    /// `for (k, v in $*) { ... }`. Children: key variable, value variable,
    /// block.
    ForSrec,
    /// `for (k, v in expr) { ... }`. Children: key variable, value variable,
    /// map expression, block.
    ForMap,
    /// `emit expr, "name1", ...`. Children: the emittable, then the
    /// split-by name expressions.
    Emit,
    /// `return` or `return expr`.
    Return,
}

impl NodeKind {
    /// Upper-case tag name, as printed in AST dumps.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::StringLiteral => "STRING_LITERAL",
            NodeKind::RegexLiteral => "REGEX",
            NodeKind::RegexCaseInsensitive => "REGEXI",
            NodeKind::NumericLiteral => "NUMERIC_LITERAL",
            NodeKind::BooleanLiteral => "BOOLEAN_LITERAL",
            NodeKind::FieldName => "FIELD_NAME",
            NodeKind::IndirectFieldName => "INDIRECT_FIELD_NAME",
            NodeKind::FullSrec => "FULL_SREC",
            NodeKind::OosvarKeylist => "OOSVAR_KEYLIST",
            NodeKind::FullOosvar => "FULL_OOSVAR",
            NodeKind::NonindexedLocalVariable => "NONINDEXED_LOCAL_VARIABLE",
            NodeKind::IndexedLocalVariable => "INDEXED_LOCAL_VARIABLE",
            NodeKind::ContextVariable => "CONTEXT_VARIABLE",
            NodeKind::EnvironmentVariable => "ENV",
            NodeKind::MapLiteral => "MAP_LITERAL",
            NodeKind::MapLiteralPair => "MAP_LITERAL_PAIR",
            NodeKind::MapLiteralKey => "MAP_LITERAL_KEY",
            NodeKind::MapLiteralValue => "MAP_LITERAL_VALUE",
            NodeKind::FunctionCallsite => "FUNCTION_CALLSITE",
            NodeKind::Operator => "OPERATOR",
            NodeKind::StatementBlock => "STATEMENT_BLOCK",
            NodeKind::Begin => "BEGIN",
            NodeKind::End => "END",
            NodeKind::FuncDef => "FUNC_DEF",
            NodeKind::ParameterList => "PARAMETER_LIST",
            NodeKind::Parameter => "PARAMETER",
            NodeKind::SrecAssignment => "SREC_ASSIGNMENT",
            NodeKind::OosvarAssignment => "OOSVAR_ASSIGNMENT",
            NodeKind::LocalDefinition => "LOCAL_DEFINITION",
            NodeKind::LocalAssignment => "LOCAL_ASSIGNMENT",
            NodeKind::Unset => "UNSET",
            NodeKind::Filter => "FILTER",
            NodeKind::BareBoolean => "BARE_BOOLEAN",
            NodeKind::IfChain => "IF_CHAIN",
            NodeKind::IfItem => "IF_ITEM",
            NodeKind::While => "WHILE",
            NodeKind::DoWhile => "DO_WHILE",
            NodeKind::Break => "BREAK",
            NodeKind::Continue => "CONTINUE",
            NodeKind::ForSrec => "FOR_SREC",
            NodeKind::ForMap => "FOR_MAP",
            NodeKind::Emit => "EMIT",
            NodeKind::Return => "RETURN",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the parser's abstract syntax tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AstNode {
    pub kind: NodeKind,
    pub text: String,
    pub children: Vec<AstNode>,
    /// Frame-relative slot of a local variable. `None` means unresolved.
    pub slot: Option<usize>,
    /// Slot count of the frame this node opens, for frame-bearing nodes.
    pub frame_size: Option<usize>,
}

impl AstNode {
    pub fn new(kind: NodeKind, text: impl Into<String>) -> Self {
        AstNode {
            kind,
            text: text.into(),
            children: Vec::new(),
            slot: None,
            frame_size: None,
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<AstNode>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }

    #[must_use]
    pub fn with_frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = Some(frame_size);
        self
    }

    /// The child at `index`, if present.
    #[inline]
    pub fn child(&self, index: usize) -> Option<&AstNode> {
        self.children.get(index)
    }

    /// Number of nodes in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(AstNode::subtree_len).sum::<usize>()
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:width$}", "", width = depth * 4)?;
        write!(f, "text=\"{}\", type={}", self.text, self.kind)?;
        if let Some(slot) = self.slot {
            write!(f, ", slot={slot}")?;
        }
        if self.children.is_empty() {
            writeln!(f, ".")
        } else {
            writeln!(f, ":")?;
            for child in &self.children {
                child.fmt_indented(f, depth + 1)?;
            }
            Ok(())
        }
    }
}

/// Indented parse-tree dump, one node per line.
impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
