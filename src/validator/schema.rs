//! Schema-relative checks: unknown fields and type-incompatible values.

use chrono::NaiveDate;
use strsim::levenshtein;

use crate::error::{ErrorCode, ValidationError};
use crate::parser::syntax::{FieldName, Literal, SyntaxKind, SyntaxNode};
use crate::parser::tokens::{classify_literal, TokenKind};
use crate::schema::{FieldSchema, FieldType, SchemaMap};

/// Append schema diagnostics for every field-bearing node under `root`.
///
/// With an empty schema map nothing is checked.
pub fn validate_schema(root: &SyntaxNode, schemas: &SchemaMap<'_>, errors: &mut Vec<ValidationError>) {
    if schemas.is_empty() {
        return;
    }

    root.walk(&mut |node| {
        let Some(field) = node.field() else {
            return;
        };
        let Some(schema) = schemas.get(&field.name) else {
            errors.push(unknown_field(field, schemas));
            return;
        };

        match &node.kind {
            SyntaxKind::FieldValue { value, .. } => check_value(field, schema, value, errors),
            SyntaxKind::Range {
                operator,
                value,
                value2,
                ..
            } => {
                if !schema.field_type.is_ordered() {
                    errors.push(
                        ValidationError::new(
                            ErrorCode::TypeMismatch,
                            format!(
                                "Range '{}' is not supported for {} field '{}'",
                                operator, schema.field_type, field.name
                            ),
                            node.position,
                            node.length,
                        )
                        .with_value(field.name.clone()),
                    );
                    return;
                }
                check_value(field, schema, value, errors);
                if let Some(upper) = value2 {
                    check_value(field, schema, upper, errors);
                }
            }
            SyntaxKind::In { values, .. } => {
                for value in values {
                    check_value(field, schema, value, errors);
                }
            }
            _ => {}
        }
    });
}

fn unknown_field(field: &FieldName, schemas: &SchemaMap<'_>) -> ValidationError {
    let message = match did_you_mean(&field.name, &schemas.names()) {
        Some(suggestion) => format!(
            "Unknown field '{}'. Did you mean '{}'?",
            field.name, suggestion
        ),
        None => format!("Unknown field '{}'", field.name),
    };
    ValidationError::new(ErrorCode::UnknownField, message, field.position, field.length)
        .with_value(field.name.clone())
}

fn check_value(
    field: &FieldName,
    schema: &FieldSchema,
    literal: &Literal,
    errors: &mut Vec<ValidationError>,
) {
    if value_matches(schema.field_type, &literal.text) {
        return;
    }
    let expected = match schema.field_type {
        FieldType::String => "a string",
        FieldType::Number => "a number",
        FieldType::Date => "a date (YYYY-MM-DD)",
        FieldType::Boolean => "true or false",
    };
    errors.push(
        ValidationError::new(
            ErrorCode::TypeMismatch,
            format!(
                "Expected {} for field '{}', got '{}'",
                expected, field.name, literal.text
            ),
            literal.position,
            literal.length,
        )
        .with_value(literal.text.clone()),
    );
}

/// Whether `text` parses as a value of the given type.
pub fn value_matches(field_type: FieldType, text: &str) -> bool {
    match field_type {
        FieldType::String => true,
        FieldType::Number => classify_literal(text) == TokenKind::Number,
        FieldType::Date => {
            classify_literal(text) == TokenKind::Date
                && NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        }
        FieldType::Boolean => {
            text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false")
        }
    }
}

/// Find the closest candidate within a length-scaled edit distance.
fn did_you_mean(input: &str, candidates: &[&str]) -> Option<String> {
    let input = input.to_lowercase();
    let threshold = match input.len() {
        0..=2 => 0,
        3..=5 => 2,
        _ => 3,
    };

    let mut best_match = None;
    let mut min_dist = usize::MAX;
    for candidate in candidates {
        let dist = levenshtein(&input, &candidate.to_lowercase());
        if dist <= threshold && dist < min_dist {
            min_dist = dist;
            best_match = Some(candidate.to_string());
        }
    }
    best_match
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{syntax_tree, tokens::tokenize};

    fn schema_errors(input: &str, schemas: &[FieldSchema]) -> Vec<ValidationError> {
        let tokens = tokenize(input);
        let node = syntax_tree(&tokens, usize::MAX).unwrap().unwrap();
        let map = SchemaMap::new(schemas);
        let mut errors = Vec::new();
        validate_schema(&node, &map, &mut errors);
        errors
    }

    fn catalog() -> Vec<FieldSchema> {
        vec![
            FieldSchema::string("title"),
            FieldSchema::number("price"),
            FieldSchema::date("created"),
            FieldSchema::boolean("active"),
        ]
    }

    #[test]
    fn test_unrestricted_mode() {
        assert!(schema_errors("anything:goes AND price:abc", &[]).is_empty());
    }

    #[test]
    fn test_unknown_field_span_and_suggestion() {
        let errors = schema_errors("foo titel:x", &catalog());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::UnknownField);
        assert_eq!(errors[0].span(), (4, 5));
        assert_eq!(errors[0].message, "Unknown field 'titel'. Did you mean 'title'?");
    }

    #[test]
    fn test_case_insensitive_lookup() {
        assert!(schema_errors("TITLE:x Price:>=3", &catalog()).is_empty());
    }

    #[test]
    fn test_number_values() {
        assert!(schema_errors("price:10 price:-2.5 price:IN(1,2)", &catalog()).is_empty());
        let errors = schema_errors("price:cheap", &catalog());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::TypeMismatch);
        assert_eq!(errors[0].span(), (6, 5));
    }

    #[test]
    fn test_between_bounds_checked_individually() {
        let errors = schema_errors("price:1..x", &catalog());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].value.as_deref(), Some("x"));
        assert_eq!(errors[0].position, 9);
    }

    #[test]
    fn test_range_on_string_field() {
        let errors = schema_errors("title:>=a", &catalog());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::TypeMismatch);
        assert_eq!(errors[0].span(), (0, 9));
    }

    #[test]
    fn test_dates_are_calendar_checked() {
        assert!(schema_errors("created:2024-02-29", &catalog()).is_empty());
        let errors = schema_errors("created:2023-02-29 created:yesterday", &catalog());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_booleans() {
        assert!(schema_errors("active:true active:FALSE", &catalog()).is_empty());
        assert_eq!(schema_errors("active:yes", &catalog()).len(), 1);
        assert_eq!(schema_errors("active:true..false", &catalog()).len(), 1);
    }
}
