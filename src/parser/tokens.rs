//! Tokenizer for the search-box grammar.
//!
//! Every token borrows its text straight from the input and records its byte
//! offset and length, so diagnostics can underline exactly what the user typed.
//! Tokenizing never fails: a broken fragment (an unterminated string, a lone
//! `*`) becomes a token of its own and the parser reports it.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1, take_while_m_n},
    character::complete::{anychar, char, digit1, none_of, one_of},
    combinator::{all_consuming, opt, recognize, value},
    multi::many0_count,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use std::borrow::Cow;
use std::fmt;

/// Reserved words. Recognized case-insensitively, only as standalone words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    And,
    Or,
    Not,
    In,
}

impl Keyword {
    pub const ALL: [Keyword; 4] = [Keyword::And, Keyword::Or, Keyword::Not, Keyword::In];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::Not => "NOT",
            Keyword::In => "IN",
        }
    }

    /// Match a word against the reserved set, ignoring case.
    pub fn lookup(word: &str) -> Option<Keyword> {
        Keyword::ALL
            .into_iter()
            .find(|k| word.eq_ignore_ascii_case(k.as_str()))
    }
}

/// `>=`, `<=`, `>`, `<` and the `..` span separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOp {
    Gte,
    Lte,
    Gt,
    Lt,
    Span,
}

impl RangeOp {
    pub fn as_str(self) -> &'static str {
        match self {
            RangeOp::Gte => ">=",
            RangeOp::Lte => "<=",
            RangeOp::Gt => ">",
            RangeOp::Lt => "<",
            RangeOp::Span => "..",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword(Keyword),
    /// A word immediately followed by `:`.
    FieldName,
    Colon,
    QuotedString,
    Number,
    /// `YYYY-MM-DD`
    Date,
    /// Any other literal in value position.
    Value,
    /// `prefix*` or `"quoted prefix"*`
    Wildcard,
    RangeOp(RangeOp),
    LeftParen,
    RightParen,
    Comma,
    /// A bare word outside value position.
    Identifier,
    UnterminatedString,
    /// A character that cannot start any token.
    Invalid,
    Eof,
}

impl TokenKind {
    /// Literal kinds accepted where a value is expected.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::QuotedString | TokenKind::Number | TokenKind::Date | TokenKind::Value
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw text, quotes and escapes included.
    pub text: &'a str,
    pub position: usize,
    pub length: usize,
}

impl<'a> Token<'a> {
    pub fn end(&self) -> usize {
        self.position + self.length
    }

    /// The decoded value: quotes stripped and escapes resolved for quoted
    /// strings, the trailing `*` dropped for wildcards.
    pub fn value(&self) -> Cow<'a, str> {
        match self.kind {
            TokenKind::QuotedString => Cow::Owned(unescape(strip_quotes(self.text))),
            TokenKind::Wildcard => {
                let prefix = self.text.strip_suffix('*').unwrap_or(self.text);
                if prefix.starts_with('"') {
                    Cow::Owned(unescape(strip_quotes(prefix)))
                } else {
                    Cow::Borrowed(prefix)
                }
            }
            _ => Cow::Borrowed(self.text),
        }
    }

    /// Whether a wildcard or string token was written in quotes.
    pub fn is_quoted(&self) -> bool {
        self.text.starts_with('"')
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str("end of input"),
            TokenKind::Keyword(k) => write!(f, "keyword '{}'", k.as_str()),
            _ => write!(f, "'{}'", self.text),
        }
    }
}

/// Tokenize the whole input. The last token is always [`TokenKind::Eof`].
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Streaming tokenizer. Yields tokens up to and including `Eof`.
pub struct Lexer<'a> {
    input: &'a str,
    rest: &'a str,
    prev: Option<TokenKind>,
    in_list: bool,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            rest: input,
            prev: None,
            in_list: false,
            done: false,
        }
    }

    fn offset(&self, rest: &str) -> usize {
        self.input.len() - rest.len()
    }

    /// Words after `:`, after a range operator, or inside `IN(...)` are
    /// classified as literals rather than keywords or search terms.
    fn in_value_position(&self) -> bool {
        self.in_list || matches!(self.prev, Some(TokenKind::Colon | TokenKind::RangeOp(_)))
    }

    fn next_token(&mut self) -> Token<'a> {
        let rest = skip_whitespace(self.rest);
        let position = self.offset(rest);

        if rest.is_empty() {
            self.rest = rest;
            return Token {
                kind: TokenKind::Eof,
                text: "",
                position,
                length: 0,
            };
        }

        let (remaining, kind) = self.scan_token(rest);
        let length = rest.len() - remaining.len();
        self.rest = remaining;

        match kind {
            TokenKind::LeftParen if self.prev == Some(TokenKind::Keyword(Keyword::In)) => {
                self.in_list = true;
            }
            TokenKind::RightParen => self.in_list = false,
            _ => {}
        }
        self.prev = Some(kind);

        Token {
            kind,
            text: &rest[..length],
            position,
            length,
        }
    }

    fn scan_token(&self, rest: &'a str) -> (&'a str, TokenKind) {
        if let Ok((remaining, kind)) = punctuation(rest) {
            return (remaining, kind);
        }

        if rest.starts_with('"') {
            return match quoted(rest) {
                Ok((remaining, _)) => match remaining.strip_prefix('*') {
                    Some(after_star) => (after_star, TokenKind::Wildcard),
                    None => (remaining, TokenKind::QuotedString),
                },
                Err(_) => ("", TokenKind::UnterminatedString),
            };
        }

        if let Ok((remaining, op)) = range_operator(rest) {
            return (remaining, TokenKind::RangeOp(op));
        }

        match word(rest) {
            Ok((after, text)) => match after.strip_prefix('*') {
                Some(after_star) => (after_star, TokenKind::Wildcard),
                None => (after, self.classify_word(text, after)),
            },
            Err(_) => {
                let width = rest.chars().next().map_or(1, char::len_utf8);
                (&rest[width..], TokenKind::Invalid)
            }
        }
    }

    fn classify_word(&self, text: &str, after: &'a str) -> TokenKind {
        if after.starts_with(':') {
            return TokenKind::FieldName;
        }
        if self.in_value_position() {
            if self.prev == Some(TokenKind::Colon)
                && text.eq_ignore_ascii_case("in")
                && skip_whitespace(after).starts_with('(')
            {
                return TokenKind::Keyword(Keyword::In);
            }
            return classify_literal(text);
        }
        match Keyword::lookup(text) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.done = true;
        }
        Some(token)
    }
}

fn skip_whitespace(input: &str) -> &str {
    let res: IResult<&str, &str> = take_while(char::is_whitespace)(input);
    match res {
        Ok((rest, _)) => rest,
        Err(_) => input,
    }
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '"' | '(' | ')' | ',' | ':' | '<' | '>' | '*')
}

/// Parse `(`, `)`, `,` or `:`.
fn punctuation(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::LeftParen, char('(')),
        value(TokenKind::RightParen, char(')')),
        value(TokenKind::Comma, char(',')),
        value(TokenKind::Colon, char(':')),
    ))(input)
}

/// Parse a range operator. Two-character operators are tried first.
fn range_operator(input: &str) -> IResult<&str, RangeOp> {
    alt((
        value(RangeOp::Gte, tag(">=")),
        value(RangeOp::Lte, tag("<=")),
        value(RangeOp::Span, tag("..")),
        value(RangeOp::Gt, char('>')),
        value(RangeOp::Lt, char('<')),
    ))(input)
}

/// Parse a double-quoted string with backslash escapes, quotes included.
fn quoted(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('"'),
        many0_count(alt((preceded(char('\\'), anychar), none_of("\"\\")))),
        char('"'),
    ))(input)
}

/// Parse a run of word characters, stopping before any `..`.
fn word(input: &str) -> IResult<&str, &str> {
    let (_, run) = take_while1(is_word_char)(input)?;
    let len = run.find("..").unwrap_or(run.len());
    if len == 0 {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::TakeWhile1,
        )));
    }
    Ok((&input[len..], &input[..len]))
}

/// Optionally signed integer or decimal.
fn number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(one_of("+-")),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(input)
}

fn four_digits(input: &str) -> IResult<&str, &str> {
    take_while_m_n(4, 4, |c: char| c.is_ascii_digit())(input)
}

fn two_digits(input: &str) -> IResult<&str, &str> {
    take_while_m_n(2, 2, |c: char| c.is_ascii_digit())(input)
}

/// ISO calendar date shape, `YYYY-MM-DD`.
fn date(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        four_digits,
        char('-'),
        two_digits,
        char('-'),
        two_digits,
    )))(input)
}

/// Classify a literal in value position: number, then date, then plain value.
pub fn classify_literal(text: &str) -> TokenKind {
    if all_consuming(number)(text).is_ok() {
        TokenKind::Number
    } else if all_consuming(date)(text).is_ok() {
        TokenKind::Date
    } else {
        TokenKind::Value
    }
}

fn strip_quotes(text: &str) -> &str {
    let inner = text.strip_prefix('"').unwrap_or(text);
    inner.strip_suffix('"').unwrap_or(inner)
}

/// Resolve backslash escapes: `\x` becomes `x`.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    fn texts(input: &str) -> Vec<&str> {
        tokenize(input).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize("   ");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert_eq!(tokens[0].position, 3);
    }

    #[test]
    fn test_field_value() {
        assert_eq!(
            kinds("title:foo"),
            vec![
                TokenKind::FieldName,
                TokenKind::Colon,
                TokenKind::Value,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            kinds("a and b Or NOT c"),
            vec![
                TokenKind::Identifier,
                TokenKind::Keyword(Keyword::And),
                TokenKind::Identifier,
                TokenKind::Keyword(Keyword::Or),
                TokenKind::Keyword(Keyword::Not),
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_keyword_only_standalone() {
        // `android` contains `and` but is a plain word; `and:` is a field name.
        assert_eq!(kinds("android")[0], TokenKind::Identifier);
        assert_eq!(kinds("and:foo")[0], TokenKind::FieldName);
        // After a colon, keywords are ordinary values.
        assert_eq!(kinds("status:and")[2], TokenKind::Value);
    }

    #[test]
    fn test_literal_priority() {
        assert_eq!(kinds("price:10")[2], TokenKind::Number);
        assert_eq!(kinds("price:-3.5")[2], TokenKind::Number);
        assert_eq!(kinds("created:2024-01-31")[2], TokenKind::Date);
        assert_eq!(kinds("name:\"10\"")[2], TokenKind::QuotedString);
        assert_eq!(kinds("code:10a")[2], TokenKind::Value);
    }

    #[test]
    fn test_span_range() {
        assert_eq!(
            kinds("price:10..50"),
            vec![
                TokenKind::FieldName,
                TokenKind::Colon,
                TokenKind::Number,
                TokenKind::RangeOp(RangeOp::Span),
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            texts("d:2024-01-01..2024-12-31"),
            vec!["d", ":", "2024-01-01", "..", "2024-12-31", ""]
        );
    }

    #[test]
    fn test_bound_range() {
        assert_eq!(
            kinds("price:>=10"),
            vec![
                TokenKind::FieldName,
                TokenKind::Colon,
                TokenKind::RangeOp(RangeOp::Gte),
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
        assert_eq!(kinds("price:<5")[2], TokenKind::RangeOp(RangeOp::Lt));
    }

    #[test]
    fn test_in_list() {
        assert_eq!(
            kinds("category:IN(a, 2, \"c d\")"),
            vec![
                TokenKind::FieldName,
                TokenKind::Colon,
                TokenKind::Keyword(Keyword::In),
                TokenKind::LeftParen,
                TokenKind::Value,
                TokenKind::Comma,
                TokenKind::Number,
                TokenKind::Comma,
                TokenKind::QuotedString,
                TokenKind::RightParen,
                TokenKind::Eof
            ]
        );
        // Without a following paren `in` is just a value.
        assert_eq!(kinds("status:in")[2], TokenKind::Value);
    }

    #[test]
    fn test_list_state_ends_at_paren() {
        let k = kinds("c:in(a) and");
        assert_eq!(k[6], TokenKind::Keyword(Keyword::And));
    }

    #[test]
    fn test_quoted_escapes() {
        let tokens = tokenize(r#""say \"hi\" \\ now""#);
        assert_eq!(tokens[0].kind, TokenKind::QuotedString);
        assert_eq!(tokens[0].value(), r#"say "hi" \ now"#);
        assert_eq!(tokens[0].length, tokens[0].text.len());
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = tokenize("title:\"open");
        assert_eq!(tokens[2].kind, TokenKind::UnterminatedString);
        assert_eq!(tokens[2].position, 6);
        assert_eq!(tokens[2].length, 5);
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn test_wildcards() {
        let tokens = tokenize("prog* \"red sh\"*");
        assert_eq!(tokens[0].kind, TokenKind::Wildcard);
        assert_eq!(tokens[0].text, "prog*");
        assert_eq!(tokens[0].value(), "prog");
        assert!(!tokens[0].is_quoted());
        assert_eq!(tokens[1].kind, TokenKind::Wildcard);
        assert_eq!(tokens[1].value(), "red sh");
        assert!(tokens[1].is_quoted());
        assert_eq!(tokens[1].length, 9);
    }

    #[test]
    fn test_lone_star_is_invalid() {
        assert_eq!(kinds("*")[0], TokenKind::Invalid);
    }

    #[test]
    fn test_positions_are_byte_offsets() {
        let input = "  café:\"naïve\"  (x)";
        for token in tokenize(input) {
            assert_eq!(&input[token.position..token.end()], token.text);
        }
        let tokens = tokenize(input);
        assert_eq!(tokens[0].position, 2);
        assert_eq!(tokens[0].length, "café".len());
    }

    #[test]
    fn test_lexer_streams_and_stops_after_eof() {
        let mut lexer = Lexer::new("a:(b)");
        let first: Vec<TokenKind> = lexer.by_ref().take(3).map(|t| t.kind).collect();
        assert_eq!(
            first,
            vec![TokenKind::FieldName, TokenKind::Colon, TokenKind::LeftParen]
        );
        let rest: Vec<&str> = lexer.by_ref().map(|t| t.text).collect();
        assert_eq!(rest, vec!["b", ")", ""]);
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_structural_tokens() {
        assert_eq!(
            kinds("(a OR b)"),
            vec![
                TokenKind::LeftParen,
                TokenKind::Identifier,
                TokenKind::Keyword(Keyword::Or),
                TokenKind::Identifier,
                TokenKind::RightParen,
                TokenKind::Eof
            ]
        );
    }
}
