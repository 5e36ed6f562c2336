//! Semantic validation of the syntax tree.
//!
//! Unlike the parser, the validators never stop early: every problem in the
//! query is collected so the user sees them all at once. Structural checks
//! need nothing but the tree; schema checks need the caller's field list. The
//! two lists are merged with structural diagnostics taking precedence.

pub mod merge;
pub mod schema;
pub mod structural;

pub use merge::merge_errors;
pub use schema::{validate_schema, value_matches};
pub use structural::{is_valid_field_name, validate_structure};

use crate::error::ValidationError;
use crate::parser::syntax::SyntaxNode;
use crate::schema::SchemaMap;

/// Result of validation: `Ok` or every merged diagnostic.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Run both validators and merge their output.
pub fn validate(root: &SyntaxNode, schemas: &SchemaMap<'_>) -> ValidationResult {
    let structural = validate_structure(root);
    let mut schema_errors = Vec::new();
    validate_schema(root, schemas, &mut schema_errors);

    tracing::debug!(
        structural = structural.len(),
        schema = schema_errors.len(),
        "validated syntax tree"
    );

    let merged = merge_errors(structural, schema_errors);
    if merged.is_empty() {
        Ok(())
    } else {
        Err(merged)
    }
}
