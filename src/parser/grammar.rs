//! Recursive-descent parser: tokens → syntax tree.
//!
//! # Grammar
//!
//! ```text
//! expr     := or
//! or       := and (OR and)*
//! and      := unary (AND? unary)*        // juxtaposition implies AND
//! unary    := NOT unary | atom
//! atom     := '(' expr ')' | field ':' rangeVal | field ':' inList | field ':' value
//!           | wildcard | quotedTerm | bareTerm
//! rangeVal := ('>='|'<='|'>'|'<') literal | literal '..' literal
//! inList   := 'IN' '(' value (',' value)* ')'
//! ```
//!
//! The parser never backtracks and stops at the first structural problem.

use super::syntax::{FieldName, Literal, SyntaxKind, SyntaxNode};
use super::tokens::{Keyword, RangeOp, Token, TokenKind};
use crate::ast::RangeOperator;
use crate::error::{ErrorCode, ValidationError};

/// Default cap on tree depth.
///
/// Applies both to nesting (open groups plus `NOT`s) and to the height of the
/// built tree. Operator chains are left-deep, so a flat `a OR b OR c ...`
/// reaches the cap at 256 terms.
pub const DEFAULT_MAX_DEPTH: usize = 256;

type ParseResult<T> = Result<T, ValidationError>;

pub struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    index: usize,
    depth: usize,
    max_depth: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    /// `tokens` must end with an `Eof` token, as produced by `tokenize`.
    pub fn new(tokens: &'t [Token<'a>]) -> Self {
        Self {
            tokens,
            index: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse a full expression. Returns `None` for an empty token stream.
    ///
    /// Does not check that every token was consumed; see [`Parser::expect_end`].
    pub fn parse(&mut self) -> ParseResult<Option<SyntaxNode>> {
        if self.peek().kind == TokenKind::Eof {
            return Ok(None);
        }
        self.parse_or().map(Some)
    }

    /// Fail on any token left over after the expression.
    pub fn expect_end(&self) -> ParseResult<()> {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(unexpected(token))
        }
    }

    fn peek(&self) -> &Token<'a> {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.index.min(last)]
    }

    fn advance(&mut self) -> Token<'a> {
        let token = *self.peek();
        if token.kind != TokenKind::Eof {
            self.index += 1;
        }
        token
    }

    /// Guards parser recursion: open groups and `NOT`s on the current path.
    fn check_depth(&self, extra: usize, at: &Token<'a>) -> ParseResult<()> {
        if self.depth + extra > self.max_depth {
            return Err(self.too_deep(
                format!("Query is nested more than {} levels deep", self.max_depth),
                at,
            ));
        }
        Ok(())
    }

    /// Guards the height of a freshly built node. AND/OR are left-associative,
    /// so every operator in a chain adds a level.
    fn check_height(&self, node: &SyntaxNode, at: &Token<'a>) -> ParseResult<()> {
        if node.depth <= self.max_depth {
            return Ok(());
        }
        let message = match node.kind {
            SyntaxKind::And(..) | SyntaxKind::Or(..) => format!(
                "Query is more than {} levels deep; each AND/OR in a chain adds a level, \
                 group long chains with parentheses",
                self.max_depth
            ),
            _ => format!("Query is nested more than {} levels deep", self.max_depth),
        };
        Err(self.too_deep(message, at))
    }

    fn too_deep(&self, message: String, at: &Token<'a>) -> ValidationError {
        ValidationError::new(ErrorCode::NestingTooDeep, message, at.position, at.length)
    }

    /// or := and (OR and)*
    fn parse_or(&mut self) -> ParseResult<SyntaxNode> {
        let mut left = self.parse_and()?;

        while self.peek().kind == TokenKind::Keyword(Keyword::Or) {
            let op = self.advance();
            let right = self.parse_and()?;
            let (start, end) = (left.position, right.end());
            left = SyntaxNode::new(SyntaxKind::Or(Box::new(left), Box::new(right)), start, end);
            self.check_height(&left, &op)?;
        }

        Ok(left)
    }

    /// and := unary (AND? unary)*
    fn parse_and(&mut self) -> ParseResult<SyntaxNode> {
        let mut left = self.parse_unary()?;

        loop {
            let token = *self.peek();
            match token.kind {
                TokenKind::Keyword(Keyword::And) => {
                    self.advance();
                }
                // These end the conjunction; anything else is an implicit AND.
                TokenKind::Eof | TokenKind::RightParen | TokenKind::Keyword(Keyword::Or) => break,
                _ => {}
            }
            let right = self.parse_unary()?;
            let (start, end) = (left.position, right.end());
            left = SyntaxNode::new(SyntaxKind::And(Box::new(left), Box::new(right)), start, end);
            self.check_height(&left, &token)?;
        }

        Ok(left)
    }

    /// unary := NOT unary | atom
    fn parse_unary(&mut self) -> ParseResult<SyntaxNode> {
        if self.peek().kind != TokenKind::Keyword(Keyword::Not) {
            return self.parse_atom();
        }

        let not = self.advance();
        self.check_depth(1, &not)?;
        self.depth += 1;
        let inner = self.parse_unary();
        self.depth -= 1;
        let inner = inner?;

        let end = inner.end();
        let node = SyntaxNode::new(SyntaxKind::Not(Box::new(inner)), not.position, end);
        self.check_height(&node, &not)?;
        Ok(node)
    }

    fn parse_atom(&mut self) -> ParseResult<SyntaxNode> {
        let token = *self.peek();

        match token.kind {
            TokenKind::LeftParen => self.parse_group(),
            TokenKind::FieldName => self.parse_field_clause(),
            TokenKind::Wildcard => {
                self.advance();
                Ok(SyntaxNode::new(
                    SyntaxKind::Wildcard {
                        prefix: token.value().into_owned(),
                        quoted: token.is_quoted(),
                    },
                    token.position,
                    token.end(),
                ))
            }
            TokenKind::QuotedString
            | TokenKind::Identifier
            | TokenKind::Number
            | TokenKind::Date
            | TokenKind::Value => {
                self.advance();
                Ok(SyntaxNode::new(
                    SyntaxKind::SearchTerm {
                        value: token.value().into_owned(),
                    },
                    token.position,
                    token.end(),
                ))
            }
            TokenKind::Colon => Err(ValidationError::syntax(
                "Unexpected ':' without a field name",
                token.position,
                token.length,
            )),
            TokenKind::RangeOp(op) => Err(ValidationError::syntax(
                format!("Range operator '{}' must follow 'field:'", op.as_str()),
                token.position,
                token.length,
            )),
            _ => Err(unexpected(&token)),
        }
    }

    /// '(' expr ')'. The returned node's span is widened to cover the parens.
    fn parse_group(&mut self) -> ParseResult<SyntaxNode> {
        let open = self.advance();
        self.check_depth(1, &open)?;

        self.depth += 1;
        let inner = self.parse_or();
        self.depth -= 1;
        let mut inner = inner?;

        let close = *self.peek();
        if close.kind != TokenKind::RightParen {
            return Err(ValidationError::syntax(
                format!("Expected ')' to close '(' at position {}, found {}", open.position, close),
                close.position,
                close.length,
            ));
        }
        self.advance();

        inner.position = open.position;
        inner.length = close.end() - open.position;
        Ok(inner)
    }

    /// field ':' (rangeVal | inList | value)
    fn parse_field_clause(&mut self) -> ParseResult<SyntaxNode> {
        let name = self.advance();
        let field = FieldName::from_token(&name);
        // The tokenizer only emits a field name when a colon follows.
        let colon = self.advance();
        if colon.kind != TokenKind::Colon {
            return Err(unexpected(&colon));
        }

        let next = *self.peek();
        match next.kind {
            TokenKind::Keyword(Keyword::In) => self.parse_in_list(field),
            TokenKind::RangeOp(RangeOp::Span) => Err(ValidationError::syntax(
                format!("Range on '{}' is missing a lower bound", field.name),
                next.position,
                next.length,
            )),
            TokenKind::RangeOp(op) => {
                self.advance();
                let value = self.expect_literal(&field)?;
                let end = value.end();
                Ok(SyntaxNode::new(
                    SyntaxKind::Range {
                        field,
                        operator: bound_operator(op),
                        value,
                        value2: None,
                    },
                    name.position,
                    end,
                ))
            }
            _ => {
                let value = self.expect_literal(&field)?;
                if self.peek().kind != TokenKind::RangeOp(RangeOp::Span) {
                    let end = value.end();
                    return Ok(SyntaxNode::new(
                        SyntaxKind::FieldValue { field, value },
                        name.position,
                        end,
                    ));
                }
                self.advance();
                let upper = self.expect_literal(&field)?;
                let end = upper.end();
                Ok(SyntaxNode::new(
                    SyntaxKind::Range {
                        field,
                        operator: RangeOperator::Between,
                        value,
                        value2: Some(upper),
                    },
                    name.position,
                    end,
                ))
            }
        }
    }

    /// 'IN' '(' value (',' value)* ')'
    fn parse_in_list(&mut self, field: FieldName) -> ParseResult<SyntaxNode> {
        let start = field.position;
        self.advance();

        let open = self.advance();
        if open.kind != TokenKind::LeftParen {
            return Err(ValidationError::syntax(
                format!("Expected '(' after IN, found {}", open),
                open.position,
                open.length,
            ));
        }

        let mut values = Vec::new();
        loop {
            let token = *self.peek();
            if token.kind == TokenKind::RightParen && values.is_empty() {
                return Err(ValidationError::syntax(
                    format!("IN list for '{}' needs at least one value", field.name),
                    open.position,
                    token.end() - open.position,
                ));
            }
            values.push(self.expect_literal(&field)?);

            let separator = self.advance();
            match separator.kind {
                TokenKind::Comma => continue,
                TokenKind::RightParen => {
                    return Ok(SyntaxNode::new(
                        SyntaxKind::In { field, values },
                        start,
                        separator.end(),
                    ));
                }
                _ => {
                    return Err(ValidationError::syntax(
                        format!("Expected ',' or ')' in IN list, found {}", separator),
                        separator.position,
                        separator.length,
                    ));
                }
            }
        }
    }

    fn expect_literal(&mut self, field: &FieldName) -> ParseResult<Literal> {
        let token = *self.peek();
        if token.kind.is_literal() {
            self.advance();
            return Ok(Literal::from_token(&token));
        }
        match token.kind {
            TokenKind::Wildcard => Err(ValidationError::syntax(
                format!("Wildcards are not supported in the value of '{}'", field.name),
                token.position,
                token.length,
            )),
            TokenKind::UnterminatedString | TokenKind::Invalid => Err(unexpected(&token)),
            _ => Err(ValidationError::syntax(
                format!("Expected a value for '{}', found {}", field.name, token),
                token.position,
                token.length,
            )),
        }
    }
}

fn bound_operator(op: RangeOp) -> RangeOperator {
    match op {
        RangeOp::Gte => RangeOperator::Gte,
        RangeOp::Gt => RangeOperator::Gt,
        RangeOp::Lte => RangeOperator::Lte,
        RangeOp::Lt => RangeOperator::Lt,
        RangeOp::Span => RangeOperator::Between,
    }
}

/// The generic "this token does not fit here" error.
fn unexpected(token: &Token<'_>) -> ValidationError {
    match token.kind {
        TokenKind::UnterminatedString => ValidationError::new(
            ErrorCode::UnterminatedString,
            "Unterminated quoted string",
            token.position,
            token.length,
        ),
        TokenKind::Eof => ValidationError::syntax("Unexpected end of input", token.position, 0),
        TokenKind::Invalid => ValidationError::syntax(
            format!("Unexpected character '{}'", token.text),
            token.position,
            token.length,
        ),
        _ => ValidationError::syntax(
            format!("Unexpected {}", token),
            token.position,
            token.length,
        ),
    }
}
