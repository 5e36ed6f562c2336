//! First-pass syntax tree.
//!
//! Produced by the grammar, consumed by the validators and the transformer.
//! Every node keeps the byte span of its full textual extent; a parent's span
//! always contains its children's spans.

use super::tokens::{Token, TokenKind};
use crate::ast::RangeOperator;

/// A field name as written, with its own span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldName {
    pub name: String,
    pub position: usize,
    pub length: usize,
}

impl FieldName {
    pub fn from_token(token: &Token<'_>) -> Self {
        Self {
            name: token.text.to_string(),
            position: token.position,
            length: token.length,
        }
    }
}

/// How a literal was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Quoted,
    Number,
    Date,
    Bare,
}

/// A literal value token, decoded, with its span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub text: String,
    pub kind: LiteralKind,
    pub position: usize,
    pub length: usize,
}

impl Literal {
    /// Build from a literal token. Callers check [`TokenKind::is_literal`].
    pub fn from_token(token: &Token<'_>) -> Self {
        let kind = match token.kind {
            TokenKind::QuotedString => LiteralKind::Quoted,
            TokenKind::Number => LiteralKind::Number,
            TokenKind::Date => LiteralKind::Date,
            _ => LiteralKind::Bare,
        };
        Self {
            text: token.value().into_owned(),
            kind,
            position: token.position,
            length: token.length,
        }
    }

    pub fn end(&self) -> usize {
        self.position + self.length
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxKind {
    SearchTerm {
        value: String,
    },
    Wildcard {
        prefix: String,
        quoted: bool,
    },
    FieldValue {
        field: FieldName,
        value: Literal,
    },
    Range {
        field: FieldName,
        operator: RangeOperator,
        value: Literal,
        value2: Option<Literal>,
    },
    And(Box<SyntaxNode>, Box<SyntaxNode>),
    Or(Box<SyntaxNode>, Box<SyntaxNode>),
    Not(Box<SyntaxNode>),
    In {
        field: FieldName,
        values: Vec<Literal>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub position: usize,
    pub length: usize,
    /// Height of the subtree rooted here; a leaf is 1.
    pub depth: usize,
}

impl SyntaxNode {
    pub fn new(kind: SyntaxKind, position: usize, end: usize) -> Self {
        let depth = match &kind {
            SyntaxKind::And(left, right) | SyntaxKind::Or(left, right) => {
                1 + left.depth.max(right.depth)
            }
            SyntaxKind::Not(inner) => 1 + inner.depth,
            _ => 1,
        };
        Self {
            kind,
            position,
            length: end.saturating_sub(position),
            depth,
        }
    }

    pub fn end(&self) -> usize {
        self.position + self.length
    }

    /// The field reference carried by this node, if it is field-scoped.
    pub fn field(&self) -> Option<&FieldName> {
        match &self.kind {
            SyntaxKind::FieldValue { field, .. }
            | SyntaxKind::Range { field, .. }
            | SyntaxKind::In { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Visit this node and every descendant, parents first.
    pub fn walk<'s>(&'s self, visit: &mut impl FnMut(&'s SyntaxNode)) {
        visit(self);
        match &self.kind {
            SyntaxKind::And(left, right) | SyntaxKind::Or(left, right) => {
                left.walk(visit);
                right.walk(visit);
            }
            SyntaxKind::Not(inner) => inner.walk(visit),
            _ => {}
        }
    }
}
