//! The byte-based lexer.
//!
//! Input is read one line at a time. Every line is scanned by a
//! `Tokenizer`, which classifies bytes through a lookup table and uses
//! `memchr` to find the end of string literals. A token never spans a line
//! boundary. The first line that fails to scan aborts the whole read, and
//! every token collected up to that point is dropped.

use crate::config::Config;
use crate::error::LexError;
use crate::token::{Token, TokenKind, TokenSequence};
use memchr::memchr;
use std::io::{BufRead, Read};
use std::str;
use tracing::debug;

// Byte classes. A 256-entry table lets us dispatch on any byte with a
// single lookup.
const W: u8 = 1; // Whitespace
const S: u8 = 2; // Structural
const L: u8 = 3; // Keyword start
const D: u8 = 4; // Number start
const Q: u8 = 5; // Quote

static BYTE_PROPERTIES: [u8; 256] = {
    let mut table = [0; 256];
    // The C `isspace` set.
    table[b' ' as usize] = W;
    table[b'\t' as usize] = W;
    table[b'\n' as usize] = W;
    table[0x0B] = W;
    table[0x0C] = W;
    table[b'\r' as usize] = W;

    table[b'{' as usize] = S;
    table[b'}' as usize] = S;
    table[b'[' as usize] = S;
    table[b']' as usize] = S;
    table[b':' as usize] = S;
    table[b',' as usize] = S;

    table[b't' as usize] = L;
    table[b'f' as usize] = L;
    table[b'n' as usize] = L;

    table[b'"' as usize] = Q;

    table[b'-' as usize] = D;
    let mut digit = b'0';
    while digit <= b'9' {
        table[digit as usize] = D;
        digit += 1;
    }

    // 0: anything else starts no token
    table
};

const KEYWORDS: [(&[u8], TokenKind); 3] = [
    (b"true", TokenKind::True),
    (b"false", TokenKind::False),
    (b"null", TokenKind::Null),
];

/// Turns JSON text into a `TokenSequence`.
///
/// ```
/// use rill_cst::{Lexer, TokenKind};
///
/// let tokens = Lexer::new().tokenize_str(r#"{"id": -1.5e2}"#).unwrap();
/// assert_eq!(tokens.len(), 5);
/// assert_eq!(tokens[3].kind(), TokenKind::NumberLit);
/// assert_eq!(tokens[3].as_f64(), Some(-150.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Lexer {
    config: Config,
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Lexer { config }
    }

    /// Tokenizes a string slice.
    pub fn tokenize_str(&self, input: &str) -> Result<TokenSequence, LexError> {
        self.tokenize(input.as_bytes())
    }

    /// Reads `input` to the end and tokenizes it.
    ///
    /// # Errors
    /// Returns a `LexError` if any line contains text that is not a token,
    /// if a string is not closed on its own line, if a line or the whole
    /// input exceeds the configured limits, or if reading fails. No tokens
    /// are returned in that case.
    pub fn tokenize<R: BufRead>(&self, input: R) -> Result<TokenSequence, LexError> {
        self.read_tokens(input).map_err(|err| {
            debug!(error = %err, line = ?err.line(), "lexing failed");
            err
        })
    }

    fn read_tokens<R: BufRead>(&self, mut input: R) -> Result<TokenSequence, LexError> {
        let mut tokens = TokenSequence::new();
        let mut buffer = Vec::new();
        let mut line = 0;
        let mut total = 0;
        // Room for a full line, its `\r\n` terminator, and one byte more.
        let read_limit = (self.config.max_line_length as u64).saturating_add(3);

        loop {
            buffer.clear();
            let read = (&mut input).take(read_limit).read_until(b'\n', &mut buffer)?;
            if read == 0 {
                break;
            }
            line += 1;
            total += read;
            if total > self.config.max_input_size {
                return Err(LexError::InputTooLarge {
                    limit: self.config.max_input_size,
                });
            }
            if line_content(&buffer).len() > self.config.max_line_length {
                return Err(LexError::LineTooLong {
                    line,
                    limit: self.config.max_line_length,
                });
            }

            for token in Tokenizer::new(&buffer, line) {
                tokens.push(token?);
            }
        }

        debug!(lines = line, tokens = tokens.len(), "tokenized input");
        Ok(tokens)
    }
}

/// The line without its `\n` or `\r\n` terminator.
fn line_content(line: &[u8]) -> &[u8] {
    match line.strip_suffix(b"\n") {
        Some(rest) => rest.strip_suffix(b"\r").unwrap_or(rest),
        None => line,
    }
}

/// Scans the tokens of a single line.
pub(crate) struct Tokenizer<'a> {
    /// The raw bytes of the line, terminator included.
    bytes: &'a [u8],
    /// The current position (index) in `bytes`.
    cursor: usize,
    /// The 1-indexed line number, stamped on every token.
    line: usize,
}

impl<'a> Tokenizer<'a> {
    pub(crate) fn new(bytes: &'a [u8], line: usize) -> Self {
        Tokenizer {
            bytes,
            cursor: 0,
            line,
        }
    }

    #[inline]
    fn column(&self) -> usize {
        self.cursor + 1
    }

    #[inline]
    fn peek_at(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    #[inline]
    fn skip_whitespace(&mut self) {
        while let Some(byte) = self.peek_at(self.cursor) {
            if BYTE_PROPERTIES[byte as usize] != W {
                break;
            }
            self.cursor += 1;
        }
    }

    fn unexpected(&self) -> LexError {
        let ch = String::from_utf8_lossy(&self.bytes[self.cursor..])
            .chars()
            .next()
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        LexError::UnexpectedCharacter {
            ch,
            line: self.line,
            column: self.column(),
        }
    }

    fn lex_punctuation(&mut self, byte: u8) -> Option<TokenKind> {
        let kind = match byte {
            b'[' => TokenKind::ArrayOpen,
            b']' => TokenKind::ArrayClose,
            b'{' => TokenKind::ObjectOpen,
            b'}' => TokenKind::ObjectClose,
            b':' => TokenKind::Colon,
            b',' => TokenKind::Comma,
            _ => return None,
        };
        self.cursor += 1;
        Some(kind)
    }

    /// Matches `true`, `false` or `null`, unless the keyword runs on into
    /// an identifier character (`truex`, `null_`).
    fn lex_keyword(&mut self) -> Option<TokenKind> {
        let rest = &self.bytes[self.cursor..];
        for (text, kind) in KEYWORDS {
            if !rest.starts_with(text) {
                continue;
            }
            let runs_on = rest
                .get(text.len())
                .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_');
            if !runs_on {
                self.cursor += text.len();
                return Some(kind);
            }
        }
        None
    }

    /// Scans a string literal. `\"` is the only escape sequence; it stands
    /// for a literal quote. Any other backslash is kept verbatim.
    fn lex_string(&mut self) -> Result<String, LexError> {
        let open = self.cursor;
        let content_start = open + 1;

        let mut search = content_start;
        let close = loop {
            match memchr(b'"', &self.bytes[search..]) {
                Some(i) => {
                    let quote = search + i;
                    if quote > content_start && self.bytes[quote - 1] == b'\\' {
                        search = quote + 1;
                    } else {
                        break quote;
                    }
                }
                None => {
                    return Err(LexError::UnterminatedString {
                        line: self.line,
                        column: open + 1,
                    })
                }
            }
        };

        let content = &self.bytes[content_start..close];
        let text = if memchr(b'\\', content).is_some() {
            let mut unescaped = Vec::with_capacity(content.len());
            let mut i = 0;
            while i < content.len() {
                if content[i] == b'\\' && content.get(i + 1) == Some(&b'"') {
                    unescaped.push(b'"');
                    i += 2;
                } else {
                    unescaped.push(content[i]);
                    i += 1;
                }
            }
            String::from_utf8(unescaped).ok()
        } else {
            str::from_utf8(content).ok().map(str::to_string)
        };

        let text = text.ok_or(LexError::InvalidUtf8 {
            line: self.line,
            column: open + 1,
        })?;
        self.cursor = close + 1;
        Ok(text)
    }

    /// Matches `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`, taking the
    /// longest prefix that fits. A `.` or exponent marker without digits
    /// after it is left for the next token.
    fn lex_number(&mut self) -> Option<f64> {
        let is_digit = |b: Option<u8>| b.is_some_and(|b| b.is_ascii_digit());
        let start = self.cursor;
        let mut pos = start;

        if self.peek_at(pos) == Some(b'-') {
            pos += 1;
        }
        match self.peek_at(pos) {
            Some(b'0') => pos += 1,
            Some(b'1'..=b'9') => {
                pos += 1;
                while is_digit(self.peek_at(pos)) {
                    pos += 1;
                }
            }
            _ => return None,
        }

        if self.peek_at(pos) == Some(b'.') && is_digit(self.peek_at(pos + 1)) {
            pos += 2;
            while is_digit(self.peek_at(pos)) {
                pos += 1;
            }
        }

        if matches!(self.peek_at(pos), Some(b'e' | b'E')) {
            let mut exp = pos + 1;
            if matches!(self.peek_at(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            if is_digit(self.peek_at(exp)) {
                while is_digit(self.peek_at(exp)) {
                    exp += 1;
                }
                pos = exp;
            }
        }

        let value = str::from_utf8(&self.bytes[start..pos])
            .ok()?
            .parse::<f64>()
            .ok()?;
        self.cursor = pos;
        Some(value)
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();

        // End of line.
        let byte = self.peek_at(self.cursor)?;
        let (line, column) = (self.line, self.column());

        // An attempt that does not advance is a non-match; falling through
        // every kind is an error.
        let token = match BYTE_PROPERTIES[byte as usize] {
            S => self
                .lex_punctuation(byte)
                .map(|kind| Ok(Token::new(kind, line, column))),
            L => self
                .lex_keyword()
                .map(|kind| Ok(Token::new(kind, line, column))),
            Q => Some(
                self.lex_string()
                    .map(|text| Token::string(text, line, column)),
            ),
            D => self
                .lex_number()
                .map(|value| Ok(Token::number(value, line, column))),
            _ => None,
        };

        Some(token.unwrap_or_else(|| Err(self.unexpected())))
    }
}
