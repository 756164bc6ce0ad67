//! The recursive-descent parser.
//!
//! Every grammar rule is a matcher that takes a position in the token slice
//! and either returns the node it built together with the position right
//! after it, or `None` without consuming anything:
//!
//! ```text
//! value    := object | array | true | false | null | string | number
//! pair     := string ':' value
//! members  := pair (',' pair)*
//! object   := '{' members? '}'
//! elements := value (',' value)*
//! array    := '[' elements? ']'
//! ```
//!
//! The first token decides between alternatives, so a rule that matched is
//! never retried. Only an array or an object is accepted as the document
//! root.

use crate::config::Config;
use crate::error::ParseError;
use crate::token::{Token, TokenKind, TokenSequence};
use crate::tree::{SyntaxTree, SyntaxType};
use tracing::{debug, trace};

/// A matched node and the position of the first token after it.
type Match = Option<(SyntaxTree, usize)>;

/// A grammar rule.
type Rule<'t> = fn(&mut Parser<'t>, usize) -> Match;

/// The outcome of `parse`: the tree, if one matched, and the tokens left
/// over after it.
///
/// On failure `tree` is `None` and `remainder` is the whole input. A
/// non-empty remainder next to a tree means trailing tokens followed the
/// document; `into_result` treats that as an error too.
#[derive(Debug)]
pub struct Parsed<'t> {
    pub tree: Option<SyntaxTree>,
    pub remainder: &'t [Token],
    failure: Option<ParseError>,
}

impl<'t> Parsed<'t> {
    /// Converts the outcome into a `Result`, rejecting trailing tokens.
    pub fn into_result(self) -> Result<SyntaxTree, ParseError> {
        match (self.tree, self.remainder.first()) {
            (Some(tree), None) => Ok(tree),
            (Some(_), Some(token)) => Err(error_at(
                "Unexpected trailing token".to_string(),
                Some(token),
            )),
            (None, _) => Err(self.failure.unwrap_or_else(|| {
                error_at("Expected '[' or '{'".to_string(), self.remainder.first())
            })),
        }
    }
}

fn error_at(message: String, token: Option<&Token>) -> ParseError {
    let (line, column) = token.map_or((0, 0), |t| (t.line, t.column));
    ParseError {
        message,
        line,
        column,
    }
}

/// Parses a token sequence with the default limits.
///
/// ```
/// use rill_cst::{parse, Lexer, SyntaxType};
///
/// let tokens = Lexer::new().tokenize_str("[1, 2] 3").unwrap();
/// let parsed = parse(&tokens);
/// assert_eq!(parsed.tree.as_ref().map(|t| t.kind()), Some(SyntaxType::Array));
/// assert_eq!(parsed.remainder.len(), 1);
/// ```
pub fn parse(tokens: &TokenSequence) -> Parsed<'_> {
    Parser::new(tokens).parse()
}

/// Parses a token sequence that must hold exactly one document.
pub fn parse_tokens(tokens: &TokenSequence) -> Result<SyntaxTree, ParseError> {
    parse(tokens).into_result()
}

/// The recursive-descent matcher over a borrowed token slice.
pub struct Parser<'t> {
    tokens: &'t [Token],
    /// The maximum allowed nesting depth.
    max_depth: usize,
    /// The current nesting depth.
    depth: usize,
    /// The farthest position any rule looked at, for error reporting.
    furthest: usize,
    /// Where a container first went past `max_depth`.
    too_deep: Option<usize>,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self::with_config(tokens, Config::default())
    }

    pub fn with_config(tokens: &'t [Token], config: Config) -> Self {
        Parser {
            tokens,
            max_depth: config.max_depth,
            depth: 0,
            furthest: 0,
            too_deep: None,
        }
    }

    /// Matches one array or object at the start of the tokens.
    pub fn parse(mut self) -> Parsed<'t> {
        let matched = self
            .match_array(0)
            .or_else(|| self.match_object(0));

        match matched {
            Some((tree, next)) => {
                debug!(
                    root = tree.kind().tag(),
                    consumed = next,
                    trailing = self.tokens.len() - next,
                    "parsed document"
                );
                let tokens = self.tokens;
                Parsed {
                    tree: Some(tree),
                    remainder: &tokens[next..],
                    failure: None,
                }
            }
            None => {
                let failure = self.failure();
                debug!(error = %failure, "parsing failed");
                Parsed {
                    tree: None,
                    remainder: self.tokens,
                    failure: Some(failure),
                }
            }
        }
    }

    fn failure(&self) -> ParseError {
        if let Some(pos) = self.too_deep {
            return error_at(
                "Maximum nesting depth exceeded".to_string(),
                self.tokens.get(pos),
            );
        }
        match self.tokens.get(self.furthest) {
            Some(token) => error_at(
                format!("Unexpected {}", token.kind.describe()),
                Some(token),
            ),
            None => error_at("Unexpected end of input".to_string(), None),
        }
    }

    fn peek(&mut self, pos: usize) -> Option<&'t Token> {
        self.furthest = self.furthest.max(pos);
        self.tokens.get(pos)
    }

    /// Returns the position after the token at `pos` if it is a `kind`.
    fn expect(&mut self, pos: usize, kind: TokenKind) -> Option<usize> {
        match self.peek(pos) {
            Some(token) if token.kind == kind => Some(pos + 1),
            _ => None,
        }
    }

    fn match_value(&mut self, pos: usize) -> Match {
        let alternatives: [Rule<'t>; 7] = [
            Parser::match_object,
            Parser::match_array,
            Parser::match_true,
            Parser::match_false,
            Parser::match_null,
            Parser::match_string,
            Parser::match_number,
        ];
        alternatives.iter().find_map(|rule| rule(self, pos))
    }

    fn match_leaf(&mut self, pos: usize, kind: TokenKind, node: SyntaxType) -> Match {
        let token = self.peek(pos).filter(|t| t.kind == kind)?;
        Some((SyntaxTree::new(node, token.payload.clone()), pos + 1))
    }

    fn match_true(&mut self, pos: usize) -> Match {
        self.match_leaf(pos, TokenKind::True, SyntaxType::True)
    }

    fn match_false(&mut self, pos: usize) -> Match {
        self.match_leaf(pos, TokenKind::False, SyntaxType::False)
    }

    fn match_null(&mut self, pos: usize) -> Match {
        self.match_leaf(pos, TokenKind::Null, SyntaxType::Null)
    }

    fn match_string(&mut self, pos: usize) -> Match {
        self.match_leaf(pos, TokenKind::StringLit, SyntaxType::String)
    }

    fn match_number(&mut self, pos: usize) -> Match {
        self.match_leaf(pos, TokenKind::NumberLit, SyntaxType::Number)
    }

    fn match_pair(&mut self, pos: usize) -> Match {
        let (name, after_name) = self.match_string(pos)?;
        let after_colon = self.expect(after_name, TokenKind::Colon)?;
        let (value, next) = self.match_value(after_colon)?;

        let mut pair = SyntaxTree::node(SyntaxType::Pair);
        pair.add_child(name);
        pair.add_child(value);
        Some((pair, next))
    }

    fn match_elements(&mut self, pos: usize) -> Match {
        self.match_list(pos, SyntaxType::Elements, Parser::match_value)
    }

    fn match_members(&mut self, pos: usize) -> Match {
        self.match_list(pos, SyntaxType::Members, Parser::match_pair)
    }

    /// `item (',' item)*` collected under a grouping node. Once a comma is
    /// consumed, another item is mandatory.
    fn match_list(&mut self, pos: usize, group: SyntaxType, item: Rule<'t>) -> Match {
        let (first, mut next) = item(self, pos)?;
        let mut list = SyntaxTree::node(group);
        list.add_child(first);

        while let Some(after_comma) = self.expect(next, TokenKind::Comma) {
            match item(self, after_comma) {
                Some((child, after_item)) => {
                    list.add_child(child);
                    next = after_item;
                }
                None => {
                    trace!(rule = group.tag(), position = after_comma, "dangling comma");
                    return None;
                }
            }
        }
        Some((list, next))
    }

    fn match_array(&mut self, pos: usize) -> Match {
        self.match_container(
            pos,
            [TokenKind::ArrayOpen, TokenKind::ArrayClose],
            SyntaxType::Array,
            Parser::match_elements,
        )
    }

    fn match_object(&mut self, pos: usize) -> Match {
        self.match_container(
            pos,
            [TokenKind::ObjectOpen, TokenKind::ObjectClose],
            SyntaxType::Object,
            Parser::match_members,
        )
    }

    /// `open body? close`. The body's grouping node is emptied into the
    /// container and the shell is dropped.
    fn match_container(
        &mut self,
        pos: usize,
        [open, close]: [TokenKind; 2],
        kind: SyntaxType,
        body: Rule<'t>,
    ) -> Match {
        let after_open = self.expect(pos, open)?;
        if self.depth >= self.max_depth {
            self.too_deep.get_or_insert(pos);
            return None;
        }

        self.depth += 1;
        let group = body(self, after_open);
        self.depth -= 1;

        let (children, before_close) = match group {
            Some((mut group, next)) => (group.take_children(), next),
            None => (Vec::new(), after_open),
        };

        let Some(next) = self.expect(before_close, close) else {
            trace!(rule = kind.tag(), position = before_close, "missing close bracket");
            return None;
        };

        let mut container = SyntaxTree::node(kind);
        for child in children {
            container.add_child(child);
        }
        Some((container, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind) -> Token {
        Token::new(kind, 1, 1)
    }

    fn check(tokens: Vec<Token>) -> Result<SyntaxTree, ParseError> {
        parse_tokens(&TokenSequence::from(tokens))
    }

    #[test]
    fn test_parse_empty_containers() {
        let array = check(vec![tok(TokenKind::ArrayOpen), tok(TokenKind::ArrayClose)]).unwrap();
        assert_eq!(array.kind(), SyntaxType::Array);
        assert!(array.children().is_empty());

        let object = check(vec![tok(TokenKind::ObjectOpen), tok(TokenKind::ObjectClose)]).unwrap();
        assert_eq!(object.kind(), SyntaxType::Object);
        assert!(object.children().is_empty());
    }

    #[test]
    fn test_parse_array_elements_are_spliced() {
        // [null, 16, "x"]
        let tree = check(vec![
            tok(TokenKind::ArrayOpen),
            tok(TokenKind::Null),
            tok(TokenKind::Comma),
            Token::number(16.0, 1, 8),
            tok(TokenKind::Comma),
            Token::string("x", 1, 12),
            tok(TokenKind::ArrayClose),
        ])
        .unwrap();

        let kinds: Vec<SyntaxType> = tree.children().iter().map(SyntaxTree::kind).collect();
        assert_eq!(
            kinds,
            vec![SyntaxType::Null, SyntaxType::Number, SyntaxType::String]
        );
        assert_eq!(tree.children()[1].as_f64(), Some(16.0));
        assert_eq!(tree.children()[2].as_str(), Some("x"));
    }

    #[test]
    fn test_parse_nested_object() {
        // {"a": {"b": []}}
        let tree = check(vec![
            tok(TokenKind::ObjectOpen),
            Token::string("a", 1, 2),
            tok(TokenKind::Colon),
            tok(TokenKind::ObjectOpen),
            Token::string("b", 1, 8),
            tok(TokenKind::Colon),
            tok(TokenKind::ArrayOpen),
            tok(TokenKind::ArrayClose),
            tok(TokenKind::ObjectClose),
            tok(TokenKind::ObjectClose),
        ])
        .unwrap();

        let inner = tree.get_field("a").unwrap();
        assert_eq!(inner.kind(), SyntaxType::Object);
        assert_eq!(inner.children()[0].kind(), SyntaxType::Pair);
        assert_eq!(
            inner.get_field("b").map(SyntaxTree::kind),
            Some(SyntaxType::Array)
        );
    }

    #[test]
    fn test_parse_keeps_duplicate_fields() {
        // {"k": true, "k": false}
        let tree = check(vec![
            tok(TokenKind::ObjectOpen),
            Token::string("k", 1, 2),
            tok(TokenKind::Colon),
            tok(TokenKind::True),
            tok(TokenKind::Comma),
            Token::string("k", 1, 13),
            tok(TokenKind::Colon),
            tok(TokenKind::False),
            tok(TokenKind::ObjectClose),
        ])
        .unwrap();
        assert_eq!(tree.children().len(), 2);
        assert_eq!(
            tree.get_field("k").map(SyntaxTree::kind),
            Some(SyntaxType::True)
        );
    }

    #[test]
    fn test_parse_rejects_scalar_root() {
        let err = check(vec![Token::string("hello", 1, 1)]).unwrap_err();
        assert_eq!(err.message, "Unexpected string");
        assert_eq!((err.line, err.column), (1, 1));

        let tokens = TokenSequence::from(vec![tok(TokenKind::True)]);
        let parsed = parse(&tokens);
        assert!(parsed.tree.is_none());
        assert_eq!(parsed.remainder.len(), 1);
    }

    #[test]
    fn test_parse_empty_input() {
        let err = check(vec![]).unwrap_err();
        assert_eq!(err.message, "Unexpected end of input");
        assert_eq!((err.line, err.column), (0, 0));
    }

    #[test]
    fn test_parse_trailing_comma() {
        // [1, 2,]
        let tokens = TokenSequence::from(vec![
            Token::new(TokenKind::ArrayOpen, 1, 1),
            Token::number(1.0, 1, 2),
            Token::new(TokenKind::Comma, 1, 3),
            Token::number(2.0, 1, 5),
            Token::new(TokenKind::Comma, 1, 6),
            Token::new(TokenKind::ArrayClose, 1, 7),
        ]);
        let parsed = parse(&tokens);
        assert!(parsed.tree.is_none());
        assert_eq!(parsed.remainder.len(), tokens.len());

        let err = parsed.into_result().unwrap_err();
        assert_eq!(err.message, "Unexpected ']'");
        assert_eq!((err.line, err.column), (1, 7));
    }

    #[test]
    fn test_parse_missing_colon() {
        // {"key" 1}
        let err = check(vec![
            Token::new(TokenKind::ObjectOpen, 1, 1),
            Token::string("key", 1, 2),
            Token::number(1.0, 1, 8),
            Token::new(TokenKind::ObjectClose, 1, 9),
        ])
        .unwrap_err();
        assert_eq!(err.message, "Unexpected number");
        assert_eq!((err.line, err.column), (1, 8));
    }

    #[test]
    fn test_parse_mismatched_brackets() {
        // [1}
        let err = check(vec![
            Token::new(TokenKind::ArrayOpen, 1, 1),
            Token::number(1.0, 1, 2),
            Token::new(TokenKind::ObjectClose, 1, 3),
        ])
        .unwrap_err();
        assert_eq!(err.message, "Unexpected '}'");

        // {"a": 1
        let err = check(vec![
            tok(TokenKind::ObjectOpen),
            Token::string("a", 1, 2),
            tok(TokenKind::Colon),
            Token::number(1.0, 1, 6),
        ])
        .unwrap_err();
        assert_eq!(err.message, "Unexpected end of input");
    }

    #[test]
    fn test_parse_trailing_tokens() {
        // [] ]
        let tokens = TokenSequence::from(vec![
            Token::new(TokenKind::ArrayOpen, 1, 1),
            Token::new(TokenKind::ArrayClose, 1, 2),
            Token::new(TokenKind::ArrayClose, 2, 1),
        ]);
        let parsed = parse(&tokens);
        assert_eq!(
            parsed.tree.as_ref().map(SyntaxTree::kind),
            Some(SyntaxType::Array)
        );
        assert_eq!(parsed.remainder, &tokens[2..]);

        let err = parsed.into_result().unwrap_err();
        assert_eq!(err.message, "Unexpected trailing token");
        assert_eq!((err.line, err.column), (2, 1));
    }

    #[test]
    fn test_parse_depth_limit() {
        let nested = |depth: usize| -> TokenSequence {
            let mut tokens = vec![tok(TokenKind::ArrayOpen); depth];
            tokens.extend(vec![tok(TokenKind::ArrayClose); depth]);
            tokens.into()
        };

        let config = Config::default().max_depth(4);
        let tokens = nested(4);
        assert!(Parser::with_config(&tokens, config).parse().tree.is_some());

        let tokens = nested(5);
        let err = Parser::with_config(&tokens, config)
            .parse()
            .into_result()
            .unwrap_err();
        assert_eq!(err.message, "Maximum nesting depth exceeded");
    }
}
