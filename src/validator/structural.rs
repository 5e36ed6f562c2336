//! Context-free checks on field references and IN lists.

use nom::{
    bytes::complete::take_while,
    character::complete::satisfy,
    combinator::{all_consuming, recognize},
    sequence::pair,
    IResult,
};

use crate::error::{ErrorCode, ValidationError};
use crate::parser::syntax::{FieldName, SyntaxKind, SyntaxNode};
use crate::parser::tokens::Keyword;

/// Walk the whole tree and collect every structural diagnostic.
pub fn validate_structure(root: &SyntaxNode) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    root.walk(&mut |node| {
        if let Some(field) = node.field() {
            check_field_name(field, &mut errors);
        }
        if let SyntaxKind::In { values, .. } = &node.kind {
            for value in values.iter().filter(|v| v.text.contains(',')) {
                errors.push(
                    ValidationError::new(
                        ErrorCode::InvalidInValue,
                        format!("IN value '{}' must not contain a comma", value.text),
                        value.position,
                        value.length,
                    )
                    .with_value(value.text.clone()),
                );
            }
        }
    });

    errors
}

fn check_field_name(field: &FieldName, errors: &mut Vec<ValidationError>) {
    if !is_valid_field_name(&field.name) {
        errors.push(
            ValidationError::new(
                ErrorCode::InvalidFieldChars,
                format!(
                    "Invalid field name '{}': use a letter followed by letters, digits, '_' or '-'",
                    field.name
                ),
                field.position,
                field.length,
            )
            .with_value(field.name.clone()),
        );
    }

    if let Some(keyword) = Keyword::lookup(&field.name) {
        errors.push(
            ValidationError::new(
                ErrorCode::ReservedWordAsField,
                format!("'{}' is a reserved word and cannot be used as a field name", keyword.as_str()),
                field.position,
                field.length,
            )
            .with_value(field.name.clone()),
        );
    }
}

/// `^[A-Za-z][A-Za-z0-9_-]*$`
fn field_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic()),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
    ))(input)
}

pub fn is_valid_field_name(name: &str) -> bool {
    all_consuming(field_name)(name).is_ok()
}
