//! Expression nodes to rval and rxval evaluators.

use rill_core::Mlrval;
use rill_ir::{AstNode, NodeKind};

use super::{child, expect_children, expect_kind, malformed, Compiler};
use crate::errors::{wrong_arity, CompileError, CompileResult};
use crate::functions::{self, compile_regex};
use crate::keylist::{Keylist, OosvarRef};
use crate::rval::{ContextVariable, RegexOperand, RvalEvaluator};
use crate::rxval::{MapLiteralEntry, MapLiteralValue, RxvalEvaluator};
use crate::udf::UdfCallsite;

/// Whether a string literal refers to `\0`..`\9`.
fn has_capture_reference(text: &str) -> bool {
    text.as_bytes()
        .windows(2)
        .any(|pair| pair[0] == b'\\' && pair[1].is_ascii_digit())
}

impl Compiler {
    /// Compiles `node` for a scalar position.
    pub(super) fn rval(&self, node: &AstNode) -> CompileResult<RvalEvaluator> {
        Ok(match node.kind {
            NodeKind::StringLiteral | NodeKind::RegexLiteral | NodeKind::RegexCaseInsensitive => {
                if node.kind == NodeKind::StringLiteral && has_capture_reference(&node.text) {
                    RvalEvaluator::CaptureInterpolated(node.text.clone())
                } else {
                    RvalEvaluator::Literal(Mlrval::from_string(node.text.as_str()))
                }
            }
            NodeKind::NumericLiteral => {
                RvalEvaluator::Literal(Mlrval::parse_number(&node.text).ok_or_else(|| {
                    CompileError::InvalidNumber {
                        text: node.text.clone(),
                    }
                })?)
            }
            NodeKind::BooleanLiteral => match node.text.as_str() {
                "true" => RvalEvaluator::Literal(Mlrval::Boolean(true)),
                "false" => RvalEvaluator::Literal(Mlrval::Boolean(false)),
                _ => malformed(node, "boolean literal is neither true nor false"),
            },
            NodeKind::FieldName => RvalEvaluator::Field(node.text.clone()),
            NodeKind::IndirectFieldName => {
                expect_children(node, 1);
                RvalEvaluator::IndirectField(Box::new(self.rval(child(node, 0))?))
            }
            NodeKind::OosvarKeylist => RvalEvaluator::Oosvar(self.oosvar_ref(node)?),
            NodeKind::NonindexedLocalVariable => RvalEvaluator::Local {
                slot: self.slot_of(node),
            },
            NodeKind::IndexedLocalVariable => RvalEvaluator::IndexedLocal {
                slot: self.slot_of(node),
                keys: self.keylist(&node.children)?,
            },
            NodeKind::ContextVariable => RvalEvaluator::Context(
                ContextVariable::from_name(&node.text).ok_or_else(|| {
                    CompileError::UnknownContextVariable {
                        name: node.text.clone(),
                    }
                })?,
            ),
            NodeKind::EnvironmentVariable => {
                expect_children(node, 1);
                RvalEvaluator::Env(Box::new(self.rval(child(node, 0))?))
            }
            NodeKind::FullSrec | NodeKind::FullOosvar | NodeKind::MapLiteral => {
                RvalEvaluator::FromMap(Box::new(self.rxval(node)?))
            }
            NodeKind::FunctionCallsite => match self.udf_callsite(node)? {
                Some(callsite) => RvalEvaluator::UdfCall(callsite),
                None => self.builtin_call(node, &node.text)?,
            },
            NodeKind::Operator => self.operator(node)?,
            _ => malformed(node, "not an expression"),
        })
    }

    /// Compiles `node` for a position that accepts maps.
    pub(super) fn rxval(&self, node: &AstNode) -> CompileResult<RxvalEvaluator> {
        Ok(match node.kind {
            NodeKind::MapLiteral => RxvalEvaluator::MapLiteral(self.map_literal(node)?),
            NodeKind::NonindexedLocalVariable => RxvalEvaluator::Local {
                slot: self.slot_of(node),
            },
            NodeKind::IndexedLocalVariable => RxvalEvaluator::IndexedLocal {
                slot: self.slot_of(node),
                keys: self.keylist(&node.children)?,
            },
            NodeKind::OosvarKeylist => RxvalEvaluator::Oosvar(self.oosvar_ref(node)?),
            NodeKind::FullOosvar => RxvalEvaluator::FullOosvar,
            NodeKind::FullSrec => RxvalEvaluator::FullSrec,
            NodeKind::FunctionCallsite => match self.udf_callsite(node)? {
                Some(callsite) => RxvalEvaluator::UdfCall(callsite),
                None => RxvalEvaluator::Scalar(self.builtin_call(node, &node.text)?),
            },
            _ => RxvalEvaluator::Scalar(self.rval(node)?),
        })
    }

    pub(super) fn keylist(&self, keys: &[AstNode]) -> CompileResult<Keylist> {
        let keys = keys
            .iter()
            .map(|key| self.rval(key))
            .collect::<CompileResult<_>>()?;
        Ok(Keylist(keys))
    }

    pub(super) fn oosvar_ref(&self, node: &AstNode) -> CompileResult<OosvarRef> {
        expect_kind(node, NodeKind::OosvarKeylist);
        Ok(OosvarRef {
            name: node.text.clone(),
            keys: self.keylist(&node.children)?,
        })
    }

    fn map_literal(&self, node: &AstNode) -> CompileResult<Vec<MapLiteralEntry>> {
        let mut entries = Vec::with_capacity(node.children.len());
        for pair in &node.children {
            expect_kind(pair, NodeKind::MapLiteralPair);
            expect_children(pair, 2);
            let key = child(pair, 0);
            expect_kind(key, NodeKind::MapLiteralKey);
            expect_children(key, 1);
            let value = child(pair, 1);
            let value = match value.kind {
                NodeKind::MapLiteral => MapLiteralValue::Nested(self.map_literal(value)?),
                NodeKind::MapLiteralValue => {
                    expect_children(value, 1);
                    MapLiteralValue::Value(Box::new(self.rxval(child(value, 0))?))
                }
                _ => malformed(value, "map-literal pair value"),
            };
            entries.push(MapLiteralEntry {
                key: self.rval(child(key, 0))?,
                value,
            });
        }
        Ok(entries)
    }

    /// A call to a user-defined function, or `None` if `node` names no
    /// such function.
    fn udf_callsite(&self, node: &AstNode) -> CompileResult<Option<UdfCallsite>> {
        let Some(signature) = self.functions.get(&node.text) else {
            return Ok(None);
        };
        if signature.arity != node.children.len() {
            return Err(wrong_arity(&node.text, signature.arity, node.children.len()));
        }
        let args = node
            .children
            .iter()
            .map(|arg| self.rxval(arg))
            .collect::<CompileResult<_>>()?;
        Ok(Some(UdfCallsite {
            id: signature.id,
            name: node.text.clone(),
            args,
        }))
    }

    /// A built-in function or operator applied to the children of `node`.
    fn builtin_call(&self, node: &AstNode, name: &str) -> CompileResult<RvalEvaluator> {
        let function = functions::lookup(name, node.children.len())?;
        if function.body.takes_regex() {
            return Ok(RvalEvaluator::RegexBuiltin {
                function,
                input: Box::new(self.rval(child(node, 0))?),
                regex: self.regex_operand(child(node, 1))?,
                third: match node.child(2) {
                    Some(third) => Some(Box::new(self.rval(third)?)),
                    None => None,
                },
            });
        }
        let args = node
            .children
            .iter()
            .map(|arg| self.rval(arg))
            .collect::<CompileResult<_>>()?;
        Ok(RvalEvaluator::Builtin { function, args })
    }

    fn operator(&self, node: &AstNode) -> CompileResult<RvalEvaluator> {
        let binary = |this: &Self| -> CompileResult<(Box<RvalEvaluator>, Box<RvalEvaluator>)> {
            expect_children(node, 2);
            Ok((
                Box::new(this.rval(child(node, 0))?),
                Box::new(this.rval(child(node, 1))?),
            ))
        };
        Ok(match node.text.as_str() {
            "&&" => {
                let (left, right) = binary(self)?;
                RvalEvaluator::And(left, right)
            }
            "||" => {
                let (left, right) = binary(self)?;
                RvalEvaluator::Or(left, right)
            }
            "^^" => {
                let (left, right) = binary(self)?;
                RvalEvaluator::Xor(left, right)
            }
            "?:" => {
                expect_children(node, 3);
                RvalEvaluator::Ternary(
                    Box::new(self.rval(child(node, 0))?),
                    Box::new(self.rval(child(node, 1))?),
                    Box::new(self.rval(child(node, 2))?),
                )
            }
            op @ ("=~" | "!=~") => {
                expect_children(node, 2);
                RvalEvaluator::RegexMatch {
                    input: Box::new(self.rval(child(node, 0))?),
                    regex: self.regex_operand(child(node, 1))?,
                    negate: op == "!=~",
                }
            }
            op => self.builtin_call(node, op)?,
        })
    }

    /// Literal regexes compile once here; anything else compiles per
    /// evaluation.
    fn regex_operand(&self, node: &AstNode) -> CompileResult<RegexOperand> {
        Ok(match node.kind {
            NodeKind::RegexLiteral | NodeKind::StringLiteral => {
                RegexOperand::Literal(compile_regex(&node.text, false)?)
            }
            NodeKind::RegexCaseInsensitive => RegexOperand::Literal(compile_regex(&node.text, true)?),
            _ => RegexOperand::Dynamic(Box::new(self.rval(node)?)),
        })
    }
}
