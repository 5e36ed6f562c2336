use crate::transpiler::traits::TextSearch;
use crate::transpiler::Params;

/// ParadeDB BM25 match: `"col" @@@ $1`.
///
/// The bound value goes through ParadeDB's query parser, so its special
/// characters are backslash-escaped and the term is matched as plain text.
pub struct ParadedbSearch;

impl TextSearch for ParadedbSearch {
    fn term_match(&self, column: &str, term: &str, params: &mut Params) -> String {
        let value = if term.chars().any(char::is_whitespace) {
            format!("\"{}\"", escape_query(term))
        } else {
            escape_query(term)
        };
        let placeholder = params.bind(value);
        format!("{} @@@ {}", column, placeholder)
    }

    fn prefix_match(&self, column: &str, prefix: &str, params: &mut Params) -> String {
        let value = if prefix.chars().any(char::is_whitespace) {
            format!("\"{}\"*", escape_query(prefix))
        } else {
            format!("{}*", escape_query(prefix))
        };
        let placeholder = params.bind(value);
        format!("{} @@@ {}", column, placeholder)
    }
}

/// Backslash-escape the query-parser metacharacters.
pub fn escape_query(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '+' | '-' | '&' | '|' | '!' | '(' | ')' | '{' | '}' | '[' | ']' | '^' | '"' | '~'
                | '*' | '?' | ':' | '\\' | '/'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
