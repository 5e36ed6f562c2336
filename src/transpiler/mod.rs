//! SQL compiler: [`Expression`] → parameterized PostgreSQL predicate.
//!
//! Field-scoped clauses compile to plain comparisons against the declared
//! column, with SQL-side casts carrying the field type. Unscoped terms expand
//! to an `OR` across the searchable columns using the configured
//! [`SearchType`]. Every literal is bound as a `$n` parameter; only
//! schema-declared field names and configured column names are written into
//! the SQL text, and always quoted.

pub mod search;
pub mod traits;


use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ast::{Expression, Field, RangeOperator};
use crate::error::{CompileError, CompileResult};
use crate::parser::SearchQuery;
use crate::schema::{FieldSchema, FieldType, SchemaMap};

pub use search::{IlikeSearch, ParadedbSearch, TsvectorSearch};
pub use traits::{escape_identifier, TextSearch};

/// How unscoped terms are matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Ilike,
    Tsvector,
    Paradedb,
}

impl SearchType {
    pub const ALL: [SearchType; 3] = [SearchType::Ilike, SearchType::Tsvector, SearchType::Paradedb];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Ilike => "ilike",
            SearchType::Tsvector => "tsvector",
            SearchType::Paradedb => "paradedb",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown search type '{}' (expected ilike, tsvector or paradedb)", s))
    }
}

/// Compiler options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlOptions {
    pub search_type: SearchType,
    /// Text search configuration used by [`SearchType::Tsvector`].
    pub ts_config: String,
}

impl Default for SqlOptions {
    fn default() -> Self {
        Self {
            search_type: SearchType::default(),
            ts_config: "english".to_string(),
        }
    }
}

impl SqlOptions {
    pub fn new(search_type: SearchType) -> Self {
        Self {
            search_type,
            ..Self::default()
        }
    }
}

/// A SQL boolean expression plus its parameters.
///
/// `values[i]` binds to placeholder `$(i + 1)`; every placeholder occurs in
/// `text` exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlQuery {
    pub text: String,
    pub values: Vec<String>,
}

impl fmt::Display for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Positional parameter collector.
#[derive(Debug, Default)]
pub struct Params {
    values: Vec<String>,
}

impl Params {
    /// Append a value and return its placeholder.
    pub fn bind(&mut self, value: impl Into<String>) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

/// Compile a parsed query.
///
/// # Example
///
/// ```rust
/// use searchql::{parse, search_query_to_sql, FieldSchema, SqlOptions};
///
/// let fields = [FieldSchema::number("price")];
/// let query = parse("laptop price:<1000", &fields).unwrap();
/// let sql = search_query_to_sql(&query, &["title"], &fields, &SqlOptions::default()).unwrap();
/// assert_eq!(sql.text, r#"("title" ILIKE $1 AND "price" < $2::numeric)"#);
/// assert_eq!(sql.values, vec!["%laptop%", "1000"]);
/// ```
pub fn search_query_to_sql<S: AsRef<str>>(
    query: &SearchQuery,
    searchable_columns: &[S],
    schemas: &[FieldSchema],
    options: &SqlOptions,
) -> CompileResult<SqlQuery> {
    let expression = query.expression.as_ref().ok_or(CompileError::EmptyQuery)?;
    expression_to_sql(expression, searchable_columns, schemas, options)
}

/// Compile a bare expression.
pub fn expression_to_sql<S: AsRef<str>>(
    expression: &Expression,
    searchable_columns: &[S],
    schemas: &[FieldSchema],
    options: &SqlOptions,
) -> CompileResult<SqlQuery> {
    let search: Box<dyn TextSearch> = match options.search_type {
        SearchType::Ilike => Box::new(IlikeSearch),
        SearchType::Tsvector => Box::new(TsvectorSearch::new(&options.ts_config)?),
        SearchType::Paradedb => Box::new(ParadedbSearch),
    };

    let mut columns: Vec<String> = Vec::new();
    for column in searchable_columns {
        let quoted = escape_identifier(column.as_ref());
        if !columns.contains(&quoted) {
            columns.push(quoted);
        }
    }

    let mut compiler = Compiler {
        schemas: SchemaMap::new(schemas),
        columns,
        search: search.as_ref(),
        params: Params::default(),
    };
    let text = compiler.compile(expression)?;
    let values = compiler.params.into_values();

    tracing::trace!(sql = %text, params = values.len(), search_type = %options.search_type, "compiled search query");
    Ok(SqlQuery { text, values })
}

struct Compiler<'a> {
    schemas: SchemaMap<'a>,
    columns: Vec<String>,
    search: &'a dyn TextSearch,
    params: Params,
}

impl Compiler<'_> {
    fn compile(&mut self, expr: &Expression) -> CompileResult<String> {
        match expr {
            Expression::SearchTerm { value } => {
                self.unscoped(|search, column, params| search.term_match(column, value, params))
            }
            Expression::Wildcard { prefix, .. } => {
                self.unscoped(|search, column, params| search.prefix_match(column, prefix, params))
            }
            Expression::FieldValue { field, value } => {
                let (column, ty) = self.column(field)?;
                let value = self.bind_typed(value, ty);
                Ok(format!("{} = {}", column, value))
            }
            Expression::Range {
                field,
                operator,
                value,
                value2,
            } => {
                let (column, ty) = self.column(field)?;
                match (operator, value2) {
                    (RangeOperator::Between, Some(upper)) => {
                        let low = self.bind_typed(value, ty);
                        let high = self.bind_typed(upper, ty);
                        Ok(format!("{} BETWEEN {} AND {}", column, low, high))
                    }
                    (RangeOperator::Between, None) => {
                        let low = self.bind_typed(value, ty);
                        Ok(format!("{} >= {}", column, low))
                    }
                    (op, _) => {
                        let bound = self.bind_typed(value, ty);
                        Ok(format!("{} {} {}", column, op.as_str(), bound))
                    }
                }
            }
            Expression::And { left, right } => {
                let left = self.compile(left)?;
                let right = self.compile(right)?;
                Ok(format!("({} AND {})", left, right))
            }
            Expression::Or { left, right } => {
                let left = self.compile(left)?;
                let right = self.compile(right)?;
                Ok(format!("({} OR {})", left, right))
            }
            Expression::Not { expression } => {
                let inner = self.compile(expression)?;
                Ok(format!("NOT ({})", inner))
            }
            Expression::In { field, values } => {
                let (column, ty) = self.column(field)?;
                let placeholders: Vec<String> =
                    values.iter().map(|v| self.bind_typed(v, ty)).collect();
                Ok(format!("{} IN ({})", column, placeholders.join(", ")))
            }
        }
    }

    /// OR the per-column match across every searchable column.
    fn unscoped(
        &mut self,
        matcher: impl Fn(&dyn TextSearch, &str, &mut Params) -> String,
    ) -> CompileResult<String> {
        let Self {
            columns,
            search,
            params,
            ..
        } = self;
        if columns.is_empty() {
            return Err(CompileError::NoSearchableColumns);
        }
        let parts: Vec<String> = columns
            .iter()
            .map(|column| matcher(*search, column, params))
            .collect();
        Ok(match parts.as_slice() {
            [single] => single.clone(),
            _ => format!("({})", parts.join(" OR ")),
        })
    }

    /// Resolve a field reference against the schema allow-list.
    fn column(&self, field: &Field) -> CompileResult<(String, FieldType)> {
        let schema = self
            .schemas
            .get(&field.name)
            .ok_or_else(|| CompileError::UnknownField(field.name.clone()))?;
        Ok((escape_identifier(&schema.name), schema.field_type))
    }

    fn bind_typed(&mut self, value: &str, ty: FieldType) -> String {
        let placeholder = self.params.bind(value);
        match ty {
            FieldType::String => placeholder,
            FieldType::Number => format!("{}::numeric", placeholder),
            FieldType::Date => format!("{}::date", placeholder),
            FieldType::Boolean => format!("{}::boolean", placeholder),
        }
    }
}
