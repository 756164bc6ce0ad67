//! Defines the `Token`, `TokenKind` and `TokenSequence` types.
//!
//! These are the interface between the `Lexer` and the parser: the lexer
//! produces a `TokenSequence` in source order, the parser matches grammar
//! rules against it.

use crate::value::Payload;
use std::fmt;
use std::io;
use std::ops::Deref;

/// The specific kind of a `Token`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    /// `[`
    ArrayOpen,
    /// `]`
    ArrayClose,
    /// `{`
    ObjectOpen,
    /// `}`
    ObjectClose,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// A string, e.g., `"hello"`
    StringLit,
    /// A number, e.g., `123.4`
    NumberLit,
    /// The `true` keyword
    True,
    /// The `false` keyword
    False,
    /// The `null` keyword
    Null,
}

impl TokenKind {
    /// The source text of punctuation tokens.
    pub fn punctuation(self) -> Option<char> {
        match self {
            TokenKind::ArrayOpen => Some('['),
            TokenKind::ArrayClose => Some(']'),
            TokenKind::ObjectOpen => Some('{'),
            TokenKind::ObjectClose => Some('}'),
            TokenKind::Colon => Some(':'),
            TokenKind::Comma => Some(','),
            _ => None,
        }
    }

    /// A short human-readable name, used in parse error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::ArrayOpen => "'['",
            TokenKind::ArrayClose => "']'",
            TokenKind::ObjectOpen => "'{'",
            TokenKind::ObjectClose => "'}'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::StringLit => "string",
            TokenKind::NumberLit => "number",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
        }
    }
}

/// A single token produced by the `Lexer`.
///
/// Tokens are immutable once produced. The payload is `Payload::String`
/// for `StringLit`, `Payload::Number` for `NumberLit` and `Payload::None`
/// for everything else.
#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) payload: Payload,
    /// The 1-indexed line number where the token starts.
    pub(crate) line: usize,
    /// The 1-indexed byte column where the token starts.
    pub(crate) column: usize,
}

impl Token {
    /// A token of the given kind with that kind's default payload: an
    /// empty string for `StringLit`, zero for `NumberLit` and no payload
    /// for punctuation and keywords.
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        let payload = match kind {
            TokenKind::StringLit => Payload::String(String::new()),
            TokenKind::NumberLit => Payload::Number(0.0),
            _ => Payload::None,
        };
        Token {
            kind,
            payload,
            line,
            column,
        }
    }

    pub fn string(value: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind: TokenKind::StringLit,
            payload: Payload::String(value.into()),
            line,
            column,
        }
    }

    pub fn number(value: f64, line: usize, column: usize) -> Self {
        Token {
            kind: TokenKind::NumberLit,
            payload: Payload::Number(value),
            line,
            column,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn as_str(&self) -> Option<&str> {
        self.payload.as_str()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.payload.as_f64()
    }
}

/// Renders `line: N: <text>`, where keywords are written in upper case.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line: {}: ", self.line)?;
        if let Some(c) = self.kind.punctuation() {
            return write!(f, "{}", c);
        }
        match self.kind {
            TokenKind::True => f.write_str("TRUE"),
            TokenKind::False => f.write_str("FALSE"),
            TokenKind::Null => f.write_str("NULL"),
            _ => write!(f, "{}", self.payload),
        }
    }
}

/// An ordered, owned list of tokens in source order.
///
/// Produced by the `Lexer`, read by the parser. Repeated tokens are
/// expected; grammar violations are the parser's concern.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct TokenSequence {
    tokens: Vec<Token>,
}

impl TokenSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// The first token, or `None` for an empty sequence.
    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// Writes every token on its own line, as rendered by `Display`.
    pub fn print<W: io::Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl fmt::Display for TokenSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            writeln!(f, "{}", token)?;
        }
        Ok(())
    }
}

impl Deref for TokenSequence {
    type Target = [Token];

    fn deref(&self) -> &[Token] {
        &self.tokens
    }
}

impl From<Vec<Token>> for TokenSequence {
    fn from(tokens: Vec<Token>) -> Self {
        TokenSequence { tokens }
    }
}

impl FromIterator<Token> for TokenSequence {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        TokenSequence {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TokenSequence {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenSequence {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
