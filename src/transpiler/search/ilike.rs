use crate::transpiler::traits::{escape_like, TextSearch};
use crate::transpiler::Params;

/// Case-insensitive pattern match: `"col" ILIKE '%term%'`.
pub struct IlikeSearch;

impl TextSearch for IlikeSearch {
    fn term_match(&self, column: &str, term: &str, params: &mut Params) -> String {
        let placeholder = params.bind(format!("%{}%", escape_like(term)));
        format!("{} ILIKE {}", column, placeholder)
    }

    fn prefix_match(&self, column: &str, prefix: &str, params: &mut Params) -> String {
        let placeholder = params.bind(format!("{}%", escape_like(prefix)));
        format!("{} ILIKE {}", column, placeholder)
    }
}
