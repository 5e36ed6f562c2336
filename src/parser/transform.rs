//! Second pass: validated syntax tree → [`Expression`].
//!
//! Only reached once the merged diagnostic list is empty, so this step cannot
//! fail. Field references pick up their declared type from the schema map.

use super::syntax::{FieldName, SyntaxKind, SyntaxNode};
use crate::ast::{Expression, Field};
use crate::schema::SchemaMap;

pub fn transform(node: &SyntaxNode, schemas: &SchemaMap<'_>) -> Expression {
    match &node.kind {
        SyntaxKind::SearchTerm { value } => Expression::term(value.clone()),
        SyntaxKind::Wildcard { prefix, quoted } => Expression::wildcard(prefix.clone(), *quoted),
        SyntaxKind::FieldValue { field, value } => {
            Expression::field_value(resolve(field, schemas), value.text.clone())
        }
        SyntaxKind::Range {
            field,
            operator,
            value,
            value2,
        } => Expression::Range {
            field: resolve(field, schemas),
            operator: *operator,
            value: value.text.clone(),
            value2: value2.as_ref().map(|v| v.text.clone()),
        },
        SyntaxKind::And(left, right) => {
            Expression::and(transform(left, schemas), transform(right, schemas))
        }
        SyntaxKind::Or(left, right) => {
            Expression::or(transform(left, schemas), transform(right, schemas))
        }
        SyntaxKind::Not(inner) => Expression::negate(transform(inner, schemas)),
        SyntaxKind::In { field, values } => Expression::In {
            field: resolve(field, schemas),
            values: values.iter().map(|v| v.text.clone()).collect(),
        },
    }
}

fn resolve(field: &FieldName, schemas: &SchemaMap<'_>) -> Field {
    match schemas.get(&field.name) {
        Some(schema) => Field::typed(field.name.clone(), schema.field_type),
        None => Field::new(field.name.clone()),
    }
}
