//! Canonical serializer: [`Expression`] back to query text.
//!
//! Output is fully parenthesized (`(a AND b)`, `NOT (a)`) and quotes a value
//! only when its bare form would lex differently. Parsing the output yields
//! an equal expression.

use std::fmt::{self, Write};

use crate::ast::{Expression, RangeOperator};
use crate::parser::tokens::Keyword;


/// Render an expression as canonical query text.
pub fn serialize(expression: &Expression) -> String {
    expression.to_string()
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Formatter { out: f }.visit(self)
    }
}

struct Formatter<'w, W: Write> {
    out: &'w mut W,
}

impl<W: Write> Formatter<'_, W> {
    fn visit(&mut self, expr: &Expression) -> fmt::Result {
        match expr {
            Expression::SearchTerm { value } => self.value(value),
            Expression::Wildcard { prefix, quoted } => {
                if *quoted || !is_bare_word(prefix) {
                    self.quoted(prefix)?;
                } else {
                    self.out.write_str(prefix)?;
                }
                self.out.write_char('*')
            }
            Expression::FieldValue { field, value } => {
                write!(self.out, "{}:", field)?;
                self.value(value)
            }
            Expression::Range {
                field,
                operator,
                value,
                value2,
            } => {
                write!(self.out, "{}:", field)?;
                match (operator, value2) {
                    (RangeOperator::Between, Some(upper)) => {
                        self.value(value)?;
                        self.out.write_str("..")?;
                        self.value(upper)
                    }
                    // A BETWEEN without an upper bound has no text form; keep the lower one.
                    (RangeOperator::Between, None) => {
                        self.out.write_str(">=")?;
                        self.value(value)
                    }
                    (op, _) => {
                        self.out.write_str(op.as_str())?;
                        self.value(value)
                    }
                }
            }
            Expression::And { left, right } => self.binary(left, "AND", right),
            Expression::Or { left, right } => self.binary(left, "OR", right),
            Expression::Not { expression } => {
                self.out.write_str("NOT (")?;
                self.visit(expression)?;
                self.out.write_char(')')
            }
            Expression::In { field, values } => {
                write!(self.out, "{}:IN(", field)?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.out.write_char(',')?;
                    }
                    self.value(value)?;
                }
                self.out.write_char(')')
            }
        }
    }

    fn binary(&mut self, left: &Expression, op: &str, right: &Expression) -> fmt::Result {
        self.out.write_char('(')?;
        self.visit(left)?;
        write!(self.out, " {} ", op)?;
        self.visit(right)?;
        self.out.write_char(')')
    }

    fn value(&mut self, text: &str) -> fmt::Result {
        if needs_quotes(text) {
            self.quoted(text)
        } else {
            self.out.write_str(text)
        }
    }

    fn quoted(&mut self, text: &str) -> fmt::Result {
        self.out.write_char('"')?;
        for c in text.chars() {
            if matches!(c, '"' | '\\') {
                self.out.write_char('\\')?;
            }
            self.out.write_char(c)?;
        }
        self.out.write_char('"')
    }
}

/// Whether `text` must be quoted to lex back as a single literal.
///
/// Leading or trailing dots are quoted so a value never runs into the `..`
/// of a range.
pub fn needs_quotes(text: &str) -> bool {
    !is_bare_word(text)
        || text.starts_with('.')
        || text.ends_with('.')
        || Keyword::lookup(text).is_some()
}

fn is_bare_word(text: &str) -> bool {
    !text.is_empty()
        && !text.contains("..")
        && !text.chars().any(|c| {
            c.is_whitespace() || matches!(c, '"' | '(' | ')' | ':' | ',' | '<' | '>' | '*' | '\\')
        })
}
