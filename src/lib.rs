//! # searchql — search-box queries to SQL
//!
//! searchql parses the kind of query people type into a search box, checks
//! it against a list of known fields, and compiles it into a parameterized
//! PostgreSQL predicate.
//!
//! ## Quick Example
//!
//! ```rust
//! use searchql::prelude::*;
//!
//! let fields = [FieldSchema::string("status"), FieldSchema::number("price")];
//! let query = searchql::parse("laptop status:active price:10..50", &fields).unwrap();
//!
//! let sql = search_query_to_sql(&query, &["title"], &fields, &SqlOptions::default()).unwrap();
//! assert_eq!(sql.values, vec!["%laptop%", "active", "10", "50"]);
//! ```
//!
//! ## Syntax
//!
//! | Form                | Meaning                                 |
//! |---------------------|-----------------------------------------|
//! | `rust`, `"a b"`     | Term matched against searchable columns |
//! | `prog*`             | Prefix match                            |
//! | `field:value`       | Equality                                |
//! | `field:>=10`        | Comparison (`>=`, `>`, `<=`, `<`)       |
//! | `field:10..50`      | Inclusive range                         |
//! | `field:IN(a,b)`     | Membership                              |
//! | `AND` `OR` `NOT`    | Boolean connectives; adjacency is AND   |
//! | `( … )`             | Grouping                                |

pub mod ast;
pub mod config;
pub mod error;
pub mod fmt;
pub mod parser;
pub mod schema;
pub mod transpiler;
pub mod validator;

pub use ast::{Expression, Field, RangeOperator};
pub use config::{ConfigError, SearchConfig};
pub use error::{CompileError, ErrorCode, SearchQueryError, ValidationError};
pub use fmt::serialize;
pub use parser::{parse_search_input_query, parse_with_options, tokenize, ParseOptions, SearchQuery};
pub use schema::{FieldSchema, FieldType};
pub use transpiler::{expression_to_sql, search_query_to_sql, SearchType, SqlOptions, SqlQuery};

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::error::*;
    pub use crate::fmt::serialize;
    pub use crate::parser::{parse_search_input_query, ParseOptions, SearchQuery};
    pub use crate::schema::{FieldSchema, FieldType};
    pub use crate::transpiler::{search_query_to_sql, SearchType, SqlOptions, SqlQuery};
}

/// Parse a search query against a field schema list.
///
/// Shorthand for [`parse_search_input_query`].
///
/// # Example
///
/// ```
/// use searchql::parse;
///
/// let query = parse("title:rust OR go", &[]).unwrap();
/// assert_eq!(query.expression.unwrap().to_string(), "(title:rust OR go)");
/// ```
pub fn parse(input: &str, schemas: &[FieldSchema]) -> Result<SearchQuery, SearchQueryError> {
    parser::parse_search_input_query(input, schemas)
}
