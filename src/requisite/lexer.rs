//! Splits normalised requisite text into tokens.
//!
//! Only module codes, `and`, `or` and parentheses survive. Whitespace and
//! every other word are dropped, so tokenising never fails.

use std::fmt;

use regex::Captures;
use serde::Serialize;

/// The kinds of token the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// A module code.
    Module,
    /// The word `and`.
    And,
    /// The word `or`.
    Or,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
}

/// A lexical token and the text it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// What the token is.
    pub kind: TokenKind,
    /// The matched text.
    pub text: String,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Returns `true` for `and` and `or`.
    #[must_use]
    pub const fn is_operator(&self) -> bool {
        matches!(self.kind, TokenKind::And | TokenKind::Or)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Tokenises normalised text.
///
/// Alternatives are tried in priority order at each position: whitespace,
/// module code, `and`, `or`, `(`, `)`, and finally any other run of
/// characters, which is discarded.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    let lexer = regex!(
        r"(?x)
        (?P<space>\s+)
        | (?P<module>[A-Z]{2,3}[0-9]{4}[A-Z]{0,2})
        | (?P<and>and\b)
        | (?P<or>or\b)
        | (?P<left>\()
        | (?P<right>\))
        | (?P<word>[^\s()]+)
        "
    );

    lexer.captures_iter(text).filter_map(classify).collect()
}

fn classify(caps: Captures<'_>) -> Option<Token> {
    let kinds = [
        ("module", TokenKind::Module),
        ("and", TokenKind::And),
        ("or", TokenKind::Or),
        ("left", TokenKind::LeftParen),
        ("right", TokenKind::RightParen),
    ];
    kinds
        .into_iter()
        .find_map(|(group, kind)| caps.name(group).map(|m| Token::new(kind, m.as_str())))
}
