//! Search query parser.
//!
//! Parsing runs in stages:
//!
//! ```text
//! input ──tokenize──▶ tokens ──grammar──▶ syntax tree ──validate──▶ diagnostics
//!                                              │                        │
//!                                              └────transform◀── (none) ┘
//!                                                      │
//!                                                      ▼
//!                                                 Expression
//! ```
//!
//! The tokenizer and grammar stop at the first problem. The validators then
//! collect every remaining problem so they can be reported together.

pub mod grammar;
pub mod syntax;
pub mod tokens;
pub mod transform;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::ast::Expression;
use crate::error::{ErrorCode, SearchQueryError, ValidationError};
use crate::schema::{FieldSchema, SchemaMap};
use crate::validator;

pub use grammar::{Parser, DEFAULT_MAX_DEPTH};
pub use syntax::{SyntaxKind, SyntaxNode};
pub use tokens::{tokenize, Token, TokenKind};

/// Default cap on input size, in bytes.
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 4096;

/// Limits applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Inputs longer than this many bytes are rejected with `INPUT_TOO_LONG`.
    pub max_input_length: usize,
    /// Maximum tree depth before `NESTING_TOO_DEEP`.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A successfully parsed query. `expression` is `None` for blank input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub expression: Option<Expression>,
}

impl SearchQuery {
    pub fn is_empty(&self) -> bool {
        self.expression.is_none()
    }
}

/// Parse user input against a field schema list.
///
/// An empty `schemas` slice puts the parser in unrestricted mode: any field
/// name with valid syntax is accepted and values are not type-checked.
///
/// # Example
///
/// ```rust
/// use searchql::{parse_search_input_query, FieldSchema};
///
/// let fields = [FieldSchema::number("price")];
/// let query = parse_search_input_query("laptop price:<1000", &fields).unwrap();
/// assert!(query.expression.is_some());
///
/// let err = parse_search_input_query("price:cheap", &fields).unwrap_err();
/// assert_eq!(err.errors[0].position, 6);
/// ```
pub fn parse_search_input_query(
    input: &str,
    schemas: &[FieldSchema],
) -> Result<SearchQuery, SearchQueryError> {
    parse_with_options(input, schemas, &ParseOptions::default())
}

/// [`parse_search_input_query`] with explicit limits.
pub fn parse_with_options(
    input: &str,
    schemas: &[FieldSchema],
    options: &ParseOptions,
) -> Result<SearchQuery, SearchQueryError> {
    if input.len() > options.max_input_length {
        tracing::debug!(len = input.len(), max = options.max_input_length, "input rejected");
        return Err(ValidationError::new(
            ErrorCode::InputTooLong,
            format!(
                "Query is {} bytes long; the limit is {}",
                input.len(),
                options.max_input_length
            ),
            options.max_input_length,
            input.len() - options.max_input_length,
        )
        .into());
    }

    let tokens = tokenize(input);
    tracing::trace!(count = tokens.len(), "tokenized input");

    let Some(root) = syntax_tree(&tokens, options.max_depth)? else {
        return Ok(SearchQuery { expression: None });
    };

    let schema_map = SchemaMap::new(schemas);
    if let Err(errors) = validator::validate(&root, &schema_map) {
        tracing::debug!(errors = errors.len(), "query failed validation");
        return Err(SearchQueryError::new(errors));
    }

    let expression = transform::transform(&root, &schema_map);
    tracing::debug!(depth = expression.depth(), "parsed search query");
    Ok(SearchQuery {
        expression: Some(expression),
    })
}

/// Run the grammar over a token stream and require it to be fully consumed.
pub fn syntax_tree(
    tokens: &[Token<'_>],
    max_depth: usize,
) -> Result<Option<SyntaxNode>, ValidationError> {
    let mut parser = Parser::new(tokens).with_max_depth(max_depth);
    let root = parser.parse()?;
    parser.expect_end()?;
    Ok(root)
}
