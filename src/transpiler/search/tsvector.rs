use crate::error::{CompileError, CompileResult};
use crate::transpiler::traits::TextSearch;
use crate::transpiler::Params;

/// Full-text match against a computed `tsvector`:
/// `to_tsvector('english', "col") @@ plainto_tsquery('english', $1)`.
pub struct TsvectorSearch {
    config: String,
}

impl TsvectorSearch {
    /// `config` is a text search configuration name such as `english`. It is
    /// written into the SQL text, so only `[A-Za-z0-9_]` names are accepted.
    pub fn new(config: &str) -> CompileResult<Self> {
        let valid = !config.is_empty()
            && config.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(CompileError::InvalidTextSearchConfig(config.to_string()));
        }
        Ok(Self {
            config: config.to_string(),
        })
    }
}

impl TextSearch for TsvectorSearch {
    fn term_match(&self, column: &str, term: &str, params: &mut Params) -> String {
        let placeholder = params.bind(term);
        format!(
            "to_tsvector('{cfg}', {}) @@ plainto_tsquery('{cfg}', {})",
            column,
            placeholder,
            cfg = self.config
        )
    }

    /// `prog*` becomes `to_tsquery('prog:*')`; a multi-word prefix requires
    /// every word, with only the last one treated as a prefix.
    fn prefix_match(&self, column: &str, prefix: &str, params: &mut Params) -> String {
        let Some(tsquery) = prefix_tsquery(prefix) else {
            return self.term_match(column, prefix, params);
        };
        let placeholder = params.bind(tsquery);
        format!(
            "to_tsvector('{cfg}', {}) @@ to_tsquery('{cfg}', {})",
            column,
            placeholder,
            cfg = self.config
        )
    }
}

/// Build a `to_tsquery` prefix expression from the alphanumeric words of
/// `prefix`. Returns `None` if there are no words.
pub fn prefix_tsquery(prefix: &str) -> Option<String> {
    let words: Vec<&str> = prefix
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let (last, rest) = words.split_last()?;

    let mut query = String::new();
    for word in rest {
        query.push_str(word);
        query.push_str(" & ");
    }
    query.push_str(last);
    query.push_str(":*");
    Some(query)
}
