//! Semantic AST for search queries.
//!
//! An [`Expression`] is what a successful parse hands back. It has the same
//! shape as the syntax tree, but field references have been resolved against
//! the schema and literal tokens reduced to their decoded text.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::FieldType;

/// A field reference as written by the user, plus its declared type when a
/// schema was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
        }
    }

    pub fn typed(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type: Some(field_type),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Comparison used by a range clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeOperator {
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "BETWEEN")]
    Between,
}

impl RangeOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            RangeOperator::Gte => ">=",
            RangeOperator::Gt => ">",
            RangeOperator::Lte => "<=",
            RangeOperator::Lt => "<",
            RangeOperator::Between => "BETWEEN",
        }
    }
}

impl fmt::Display for RangeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed, schema-resolved search expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Expression {
    /// Unscoped term: `rust` or `"red shoes"`.
    SearchTerm { value: String },
    /// Unscoped prefix match: `prog*` or `"red sh"*`.
    Wildcard { prefix: String, quoted: bool },
    /// `field:value`
    FieldValue { field: Field, value: String },
    /// `field:>=value` or `field:value..value2`
    Range {
        field: Field,
        operator: RangeOperator,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value2: Option<String>,
    },
    And {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Or {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not { expression: Box<Expression> },
    /// `field:IN(v1, v2, ...)`
    In { field: Field, values: Vec<String> },
}

impl Expression {
    pub fn term(value: impl Into<String>) -> Self {
        Expression::SearchTerm {
            value: value.into(),
        }
    }

    pub fn wildcard(prefix: impl Into<String>, quoted: bool) -> Self {
        Expression::Wildcard {
            prefix: prefix.into(),
            quoted,
        }
    }

    pub fn field_value(field: Field, value: impl Into<String>) -> Self {
        Expression::FieldValue {
            field,
            value: value.into(),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn negate(expression: Expression) -> Self {
        Expression::Not {
            expression: Box::new(expression),
        }
    }

    /// The field this node is scoped to, if any.
    pub fn field(&self) -> Option<&Field> {
        match self {
            Expression::FieldValue { field, .. }
            | Expression::Range { field, .. }
            | Expression::In { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Depth of the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Expression::And { left, right } | Expression::Or { left, right } => {
                1 + left.depth().max(right.depth())
            }
            Expression::Not { expression } => 1 + expression.depth(),
            _ => 1,
        }
    }
}
