//! Transpiler traits and utilities.

use super::Params;

/// Quote an identifier for PostgreSQL.
/// Handles dotted identifiers (e.g., `products.title`) by quoting each part.
pub fn escape_identifier(name: &str) -> String {
    name.split('.')
        .map(escape_single_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

fn escape_single_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Escape `%`, `_` and `\` so a term matches literally inside a LIKE pattern.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Strategy-specific matching for unscoped search terms.
///
/// Each method returns a predicate over one (already quoted) column and binds
/// whatever values it needs through `params`.
pub trait TextSearch {
    /// Match a plain search term.
    fn term_match(&self, column: &str, term: &str, params: &mut Params) -> String;

    /// Match a prefix (`prog*`). Defaults to a plain term match.
    fn prefix_match(&self, column: &str, prefix: &str, params: &mut Params) -> String {
        self.term_match(column, prefix, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_identifier() {
        assert_eq!(escape_identifier("title"), "\"title\"");
        assert_eq!(escape_identifier("p.title"), "\"p\".\"title\"");
        assert_eq!(escape_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
