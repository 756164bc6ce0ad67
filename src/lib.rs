//! # rill-cst
//!
//! `rill-cst` turns JSON text into a token stream and then into a concrete
//! syntax tree that mirrors JSON's grammar: objects, arrays, pairs, strings,
//! numbers, booleans and null.
//!
//! ## Key Features
//!
//! * **Two explicit stages:** a line-based byte [`Lexer`] produces a
//!   [`TokenSequence`]; a recursive-descent [`Parser`] matches it against the
//!   grammar and builds a [`SyntaxTree`].
//! * **Owned tree:** every node owns its children. `Clone` is a full deep
//!   copy and dropping a tree releases the whole subtree, however deep.
//! * **All-or-nothing:** a lexing failure discards every token read so far,
//!   and a failed grammar rule releases whatever it had built.
//! * **Bounded:** line length, input size and nesting depth are capped by a
//!   [`Config`].
//!
//! ## Quick Start
//!
//! ```
//! use rill_cst::{parse_str, SyntaxType};
//!
//! let tree = parse_str(r#"{ "name": "Babbage", "born": 1791, "tags": [true, null] }"#).unwrap();
//!
//! assert_eq!(tree.get_field("name").and_then(|n| n.as_str()), Some("Babbage"));
//! assert_eq!(tree.get_field("born").and_then(|n| n.as_f64()), Some(1791.0));
//!
//! let tags = tree.get_field("tags").unwrap();
//! assert_eq!(tags.kind(), SyntaxType::Array);
//! assert_eq!(tags.children().len(), 2);
//! ```
//!
//! ## Limitations
//!
//! * A token never spans a line: a string literal must close on the line it
//!   opened on.
//! * `\"` is the only escape sequence that is decoded. Every other
//!   backslash sequence is kept verbatim.
//! * The document root must be an array or an object.

/// Resource limits for lexing and parsing.
pub mod config;
/// Contains the `LexError`, `ParseError` and `Error` types.
pub mod error;
/// Contains the recursive-descent `Parser`.
pub mod parser;
/// Contains the `Token`, `TokenKind` and `TokenSequence` types.
pub mod token;
/// Contains the `SyntaxTree` and its traversal helpers.
pub mod tree;
/// Contains the `Payload` carried by tokens and tree leaves.
pub mod value;

mod tokenizer;

pub use config::Config;
pub use error::{Error, LexError, ParseError};
pub use parser::{parse, parse_tokens, Parsed, Parser};
pub use token::{Token, TokenKind, TokenSequence};
pub use tokenizer::Lexer;
pub use tree::{Child, SyntaxTree, SyntaxType};
pub use value::Payload;

use std::io::BufRead;

/// Tokenizes everything `input` yields, with the default limits.
///
/// # Errors
/// Returns a `LexError` if the input holds anything that is not a token.
/// No partial sequence is returned.
pub fn tokenize<R: BufRead>(input: R) -> Result<TokenSequence, LexError> {
    Lexer::new().tokenize(input)
}

/// Parses a JSON document held in a string slice.
///
/// # Errors
/// Returns `Error::Lex` if the text cannot be tokenized and `Error::Parse`
/// if the tokens do not form exactly one array or object.
///
/// # Examples
/// ```
/// use rill_cst::{parse_str, Error};
///
/// assert!(parse_str("[1, 2]").is_ok());
/// assert!(matches!(parse_str("[1, 2,]"), Err(Error::Parse(_))));
/// assert!(matches!(parse_str("[1, 2, &]"), Err(Error::Lex(_))));
/// ```
pub fn parse_str(input: &str) -> Result<SyntaxTree, Error> {
    parse_reader(input.as_bytes())
}

/// Reads and parses a JSON document, with the default limits.
pub fn parse_reader<R: BufRead>(input: R) -> Result<SyntaxTree, Error> {
    parse_reader_with_config(input, Config::default())
}

/// Reads and parses a JSON document under the given limits.
pub fn parse_reader_with_config<R: BufRead>(input: R, config: Config) -> Result<SyntaxTree, Error> {
    let tokens = Lexer::with_config(config).tokenize(input)?;
    let tree = Parser::with_config(&tokens, config).parse().into_result()?;
    Ok(tree)
}
