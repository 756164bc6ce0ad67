//! Error types for the lexer and the parser.
//!
//! Lexing and parsing fail independently: the lexer reports a [`LexError`]
//! and discards every token read so far, the parser reports a [`ParseError`]
//! located at the farthest token it managed to reach. The one-shot entry
//! points wrap both in [`Error`].
use thiserror::Error;

/// Errors produced while turning input text into a `TokenSequence`.
#[derive(Debug, Error)]
pub enum LexError {
    /// No token kind matches at this position.
    #[error("Unexpected character '{ch}' at line {line}, column {column}.")]
    UnexpectedCharacter {
        /// The offending character.
        ch: char,
        /// The line number (1-indexed).
        line: usize,
        /// The byte column (1-indexed).
        column: usize,
    },
    /// A string literal reached the end of its line without a closing quote.
    #[error("Unterminated string starting at line {line}, column {column}.")]
    UnterminatedString { line: usize, column: usize },
    /// A string literal does not hold valid UTF-8.
    #[error("Invalid UTF-8 in string at line {line}, column {column}.")]
    InvalidUtf8 { line: usize, column: usize },
    /// A single line is longer than `Config::max_line_length`.
    #[error("Line {line} exceeds the maximum length of {limit} bytes.")]
    LineTooLong { line: usize, limit: usize },
    /// The whole input is larger than `Config::max_input_size`.
    #[error("Input exceeds the maximum size of {limit} bytes.")]
    InputTooLarge { limit: usize },
    /// The underlying reader failed.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl LexError {
    /// The line the error was detected on, if it is tied to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            LexError::UnexpectedCharacter { line, .. }
            | LexError::UnterminatedString { line, .. }
            | LexError::InvalidUtf8 { line, .. }
            | LexError::LineTooLong { line, .. } => Some(*line),
            LexError::InputTooLarge { .. } | LexError::Io(_) => None,
        }
    }
}

/// A grammar violation found by the parser.
///
/// The location is the farthest token any grammar rule looked at before the
/// parse was abandoned. Line and column are both `0` when the parser ran
/// out of tokens.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Error: {message} at line {line}, column {column}.")]
pub struct ParseError {
    /// A description of what went wrong.
    pub message: String,
    /// The line number (1-indexed) where the error was detected.
    pub line: usize,
    /// The column number (1-indexed) where the error was detected.
    pub column: usize,
}

/// Either stage failing, as returned by `parse_str` and `parse_reader`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
