//! Unscoped text search strategies.

mod ilike;
mod paradedb;
mod tsvector;

pub use ilike::IlikeSearch;
pub use paradedb::{escape_query, ParadedbSearch};
pub use tsvector::{prefix_tsquery, TsvectorSearch};
