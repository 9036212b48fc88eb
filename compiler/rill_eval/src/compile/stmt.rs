//! Statement nodes to [`Statement`]s.

use rill_ir::{AstNode, NodeKind};

use super::{child, expect_children, expect_kind, gate, malformed, Compiler};
use crate::emit::{EmitStatement, Emittable};
use crate::errors::{CompileError, CompileResult};
use crate::keylist::Keylist;
use crate::statement::{Block, Statement, UnsetTarget};

impl Compiler {
    pub(super) fn block(&mut self, node: &AstNode) -> CompileResult<Block> {
        expect_kind(node, NodeKind::StatementBlock);
        node.children.iter().map(|s| self.statement(s)).collect()
    }

    /// A block compiled one loop level deeper.
    fn loop_body(&mut self, node: &AstNode) -> CompileResult<Block> {
        self.loop_depth += 1;
        let body = self.block(node);
        self.loop_depth -= 1;
        body
    }

    pub(super) fn statement(&mut self, node: &AstNode) -> CompileResult<Statement> {
        Ok(match node.kind {
            NodeKind::SrecAssignment => {
                expect_children(node, 2);
                let lhs = child(node, 0);
                let value = self.rxval(child(node, 1))?;
                match lhs.kind {
                    NodeKind::FieldName => Statement::AssignField {
                        name: lhs.text.clone(),
                        value,
                    },
                    NodeKind::IndirectFieldName => {
                        expect_children(lhs, 1);
                        Statement::AssignIndirectField {
                            name: self.rval(child(lhs, 0))?,
                            value,
                        }
                    }
                    NodeKind::FullSrec => Statement::AssignFullSrec(value),
                    _ => malformed(lhs, "not a field lvalue"),
                }
            }
            NodeKind::OosvarAssignment => {
                expect_children(node, 2);
                let lhs = child(node, 0);
                let value = self.rxval(child(node, 1))?;
                match lhs.kind {
                    NodeKind::OosvarKeylist => Statement::AssignOosvar {
                        target: self.oosvar_ref(lhs)?,
                        value,
                    },
                    NodeKind::FullOosvar => Statement::AssignFullOosvar(value),
                    _ => malformed(lhs, "not an oosvar lvalue"),
                }
            }
            NodeKind::LocalDefinition => {
                let variable = child(node, 0);
                expect_kind(variable, NodeKind::NonindexedLocalVariable);
                Statement::DefineLocal {
                    name: variable.text.clone(),
                    slot: self.slot_of(variable),
                    gate: gate(&node.text)?,
                    value: match node.child(1) {
                        Some(value) => Some(self.rxval(value)?),
                        None => None,
                    },
                }
            }
            NodeKind::LocalAssignment => {
                expect_children(node, 2);
                let lhs = child(node, 0);
                let keys = match lhs.kind {
                    NodeKind::NonindexedLocalVariable => Keylist::default(),
                    NodeKind::IndexedLocalVariable => self.keylist(&lhs.children)?,
                    _ => malformed(lhs, "not a local lvalue"),
                };
                Statement::AssignLocal {
                    name: lhs.text.clone(),
                    slot: self.slot_of(lhs),
                    keys,
                    value: self.rxval(child(node, 1))?,
                }
            }
            NodeKind::Unset => Statement::Unset(
                node.children
                    .iter()
                    .map(|target| self.unset_target(target))
                    .collect::<CompileResult<_>>()?,
            ),
            NodeKind::Filter => {
                expect_children(node, 1);
                Statement::Filter(self.rval(child(node, 0))?)
            }
            NodeKind::BareBoolean => {
                expect_children(node, 1);
                Statement::BareBoolean(self.rval(child(node, 0))?)
            }
            NodeKind::IfChain => self.if_chain(node)?,
            NodeKind::While => {
                expect_children(node, 2);
                Statement::While {
                    condition: self.rval(child(node, 0))?,
                    body: self.loop_body(child(node, 1))?,
                }
            }
            NodeKind::DoWhile => {
                expect_children(node, 2);
                Statement::DoWhile {
                    body: self.loop_body(child(node, 0))?,
                    condition: self.rval(child(node, 1))?,
                }
            }
            NodeKind::Break | NodeKind::Continue => {
                let keyword = if node.kind == NodeKind::Break {
                    "break"
                } else {
                    "continue"
                };
                if self.loop_depth == 0 {
                    return Err(CompileError::OutsideLoop { keyword });
                }
                if node.kind == NodeKind::Break {
                    Statement::Break
                } else {
                    Statement::Continue
                }
            }
            NodeKind::ForSrec => {
                expect_children(node, 3);
                Statement::ForSrec {
                    key_slot: self.loop_variable(child(node, 0)),
                    value_slot: self.loop_variable(child(node, 1)),
                    body: self.loop_body(child(node, 2))?,
                }
            }
            NodeKind::ForMap => {
                expect_children(node, 4);
                Statement::ForMap {
                    key_slot: self.loop_variable(child(node, 0)),
                    value_slot: self.loop_variable(child(node, 1)),
                    map: self.rxval(child(node, 2))?,
                    body: self.loop_body(child(node, 3))?,
                }
            }
            NodeKind::Emit => self.emit(node)?,
            NodeKind::Return => {
                if !self.in_function {
                    return Err(CompileError::ReturnOutsideFunction);
                }
                Statement::Return(match node.child(0) {
                    Some(value) => Some(self.rxval(value)?),
                    None => None,
                })
            }
            NodeKind::StatementBlock => Statement::Block(self.block(node)?),
            NodeKind::Begin => return Err(CompileError::NotTopLevel { what: "begin" }),
            NodeKind::End => return Err(CompileError::NotTopLevel { what: "end" }),
            NodeKind::FuncDef => return Err(CompileError::NotTopLevel { what: "func" }),
            _ => malformed(node, "not a statement"),
        })
    }

    fn loop_variable(&self, node: &AstNode) -> usize {
        expect_kind(node, NodeKind::NonindexedLocalVariable);
        self.slot_of(node)
    }

    fn if_chain(&mut self, node: &AstNode) -> CompileResult<Statement> {
        let mut arms = Vec::new();
        let mut otherwise = None;
        for (i, item) in node.children.iter().enumerate() {
            expect_kind(item, NodeKind::IfItem);
            match item.text.as_str() {
                "if" | "elif" => {
                    expect_children(item, 2);
                    arms.push((self.rval(child(item, 0))?, self.block(child(item, 1))?));
                }
                "else" if i + 1 == node.children.len() => {
                    expect_children(item, 1);
                    otherwise = Some(self.block(child(item, 0))?);
                }
                _ => malformed(item, "misplaced if-chain item"),
            }
        }
        if arms.is_empty() {
            malformed(node, "if chain without an if");
        }
        Ok(Statement::If { arms, otherwise })
    }

    fn unset_target(&self, node: &AstNode) -> CompileResult<UnsetTarget> {
        Ok(match node.kind {
            NodeKind::FieldName => UnsetTarget::Field(node.text.clone()),
            NodeKind::IndirectFieldName => {
                expect_children(node, 1);
                UnsetTarget::IndirectField(self.rval(child(node, 0))?)
            }
            NodeKind::FullSrec => UnsetTarget::FullSrec,
            NodeKind::OosvarKeylist => UnsetTarget::Oosvar(self.oosvar_ref(node)?),
            NodeKind::FullOosvar => UnsetTarget::FullOosvar,
            NodeKind::NonindexedLocalVariable | NodeKind::IndexedLocalVariable => {
                UnsetTarget::Local {
                    slot: self.slot_of(node),
                    keys: self.keylist(&node.children)?,
                }
            }
            _ => malformed(node, "not an unsettable lvalue"),
        })
    }

    fn emit(&self, node: &AstNode) -> CompileResult<Statement> {
        let target = child(node, 0);
        let emittable = match target.kind {
            NodeKind::OosvarKeylist => Emittable::Oosvar(self.oosvar_ref(target)?),
            NodeKind::FullOosvar => Emittable::FullOosvar,
            NodeKind::NonindexedLocalVariable | NodeKind::IndexedLocalVariable => {
                Emittable::Local {
                    name: target.text.clone(),
                    slot: self.slot_of(target),
                    keys: self.keylist(&target.children)?,
                }
            }
            _ => Emittable::Value(self.rxval(target)?),
        };
        let names = node.children[1..]
            .iter()
            .map(|name| self.rval(name))
            .collect::<CompileResult<_>>()?;
        Ok(Statement::Emit(EmitStatement { emittable, names }))
    }
}
