//! Error types for searchql.
//!
//! Two families live here. [`ValidationError`] is a positioned diagnostic that
//! points at a span of the user's input; a failed parse returns one or more of
//! them inside a [`SearchQueryError`]. [`CompileError`] is raised by the SQL
//! compiler when an expression cannot be lowered safely.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic codes.
///
/// The first group is produced by the tokenizer and parser (fail-fast), the
/// second by the validators (accumulated).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    SyntaxError,
    UnterminatedString,
    NestingTooDeep,
    InputTooLong,

    InvalidFieldChars,
    ReservedWordAsField,
    InvalidInValue,
    UnknownField,
    TypeMismatch,
}

impl ErrorCode {
    /// Whether this code comes from the fail-fast structural pass.
    pub fn is_syntax(self) -> bool {
        matches!(
            self,
            ErrorCode::SyntaxError
                | ErrorCode::UnterminatedString
                | ErrorCode::NestingTooDeep
                | ErrorCode::InputTooLong
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::SyntaxError => "SYNTAX_ERROR",
            ErrorCode::UnterminatedString => "UNTERMINATED_STRING",
            ErrorCode::NestingTooDeep => "NESTING_TOO_DEEP",
            ErrorCode::InputTooLong => "INPUT_TOO_LONG",
            ErrorCode::InvalidFieldChars => "INVALID_FIELD_CHARS",
            ErrorCode::ReservedWordAsField => "RESERVED_WORD_AS_FIELD",
            ErrorCode::InvalidInValue => "INVALID_IN_VALUE",
            ErrorCode::UnknownField => "UNKNOWN_FIELD",
            ErrorCode::TypeMismatch => "TYPE_MISMATCH",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A positioned, coded description of a problem in the query text.
///
/// `position` and `length` are byte offsets into the original input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message} at position {position}")]
pub struct ValidationError {
    pub message: String,
    pub code: ErrorCode,
    pub position: usize,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        position: usize,
        length: usize,
    ) -> Self {
        Self {
            message: message.into(),
            code,
            position,
            length,
            value: None,
        }
    }

    /// Create a structural (syntax) error at the given span.
    pub fn syntax(message: impl Into<String>, position: usize, length: usize) -> Self {
        Self::new(ErrorCode::SyntaxError, message, position, length)
    }

    /// Attach the offending text.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// The `(position, length)` key used when merging diagnostic lists.
    pub fn span(&self) -> (usize, usize) {
        (self.position, self.length)
    }
}

/// A failed parse: at least one diagnostic, sorted by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{}", summarize(.errors))]
pub struct SearchQueryError {
    pub errors: Vec<ValidationError>,
}

impl SearchQueryError {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self { errors }
    }

    /// Wrap a single fail-fast error.
    pub fn single(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    pub fn codes(&self) -> Vec<ErrorCode> {
        self.errors.iter().map(|e| e.code).collect()
    }
}

impl From<ValidationError> for SearchQueryError {
    fn from(error: ValidationError) -> Self {
        Self::single(error)
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    match errors {
        [] => "invalid query".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

/// Errors raised while lowering an expression to SQL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The query was empty; there is no predicate to build.
    #[error("Cannot compile an empty query")]
    EmptyQuery,

    /// A field reference is not declared in the schema list.
    #[error("Field '{0}' is not declared in the schema")]
    UnknownField(String),

    /// An unscoped term needs at least one searchable column.
    #[error("No searchable columns configured for unscoped search terms")]
    NoSearchableColumns,

    /// The tsvector configuration name is not a plain identifier.
    #[error("Invalid text search configuration '{0}'")]
    InvalidTextSearchConfig(String),
}

/// Result type alias for SQL compilation.
pub type CompileResult<T> = Result<T, CompileError>;
