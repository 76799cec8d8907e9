//! Builds requisite trees from tokens.
//!
//! Most requisites are simple, so the token stream is first checked for a few
//! shapes that need no grammar at all. Only text mixing `and` with `or` goes
//! through the recursive-descent parser:
//!
//! ```text
//! expression := and_expr
//! and_expr   := or_expr ( "and" or_expr )*
//! or_expr    := atomic ( "or" atomic )*
//! atomic     := "(" expression ")" | MODULE
//! ```
//!
//! `and` binds looser than `or`, so `A or B and C or D` reads as
//! `(A or B) and (C or D)`.

use crate::{
    diagnostics::Diagnostic,
    domain::{ModuleCode, RequisiteNode},
    requisite::{
        lexer::{Token, TokenKind},
        Recovered,
    },
};

/// Deepest bracket nesting that is parsed as written.
///
/// Anything deeper is parsed as if it had no brackets at all, with a
/// [`Diagnostic::NestingTooDeep`].
pub const MAX_NESTING: usize = 64;

/// Parses a token stream into a requisite tree.
///
/// The value is `None` when the tokens contain no module code. Malformed
/// input never fails: the parser skips what it cannot use and reports each
/// recovery as a [`Diagnostic`].
#[must_use]
pub fn parse(tokens: &[Token]) -> Recovered<Option<RequisiteNode>> {
    let mut modules: Vec<RequisiteNode> = tokens
        .iter()
        .filter(|token| token.kind == TokenKind::Module)
        .filter_map(|token| ModuleCode::new(token.text.clone()).ok())
        .map(RequisiteNode::Leaf)
        .collect();
    let has_and = tokens.iter().any(|token| token.kind == TokenKind::And);
    let has_or = tokens.iter().any(|token| token.kind == TokenKind::Or);

    match (modules.len(), has_and, has_or) {
        (0, ..) => Recovered::clean(None),
        (1, ..) => Recovered::clean(modules.pop()),
        // `CS1010 CS1231 Some module title` or `CS1010 or CS1231`
        (_, false, _) => Recovered::clean(Some(RequisiteNode::or(modules))),
        (_, true, false) => Recovered::clean(Some(RequisiteNode::and(modules))),
        (_, true, true) => parse_expression(tokens),
    }
}

fn parse_expression(tokens: &[Token]) -> Recovered<Option<RequisiteNode>> {
    let text = render(tokens);
    let mut diagnostics = Vec::new();

    let opening = tokens.iter().filter(|t| t.kind == TokenKind::LeftParen).count();
    let closing = tokens.iter().filter(|t| t.kind == TokenKind::RightParen).count();
    if opening != closing {
        diagnostics.push(Diagnostic::UnbalancedParentheses { text: text.clone() });
    }

    let depth = nesting_depth(tokens);
    if depth > MAX_NESTING {
        diagnostics.push(Diagnostic::NestingTooDeep {
            text: text.clone(),
            depth,
        });
    }

    let cleaned = clean_operators(tokens);
    tracing::trace!(tokens = %render(&cleaned), "cleaned operators");

    let mut parser = Parser {
        tokens: &cleaned,
        pos: 0,
        text,
        diagnostics,
    };
    let value = parser.expression();
    parser.finish();

    Recovered {
        value,
        diagnostics: parser.diagnostics,
    }
}

fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| token.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

const fn is_bracket(token: &Token) -> bool {
    matches!(token.kind, TokenKind::LeftParen | TokenKind::RightParen)
}

/// Removes operators that cannot take part in a valid expression.
///
/// - the interior of every parenthesised span is cleaned recursively, and a
///   span that cleans to nothing is dropped together with its brackets
/// - leading and trailing tokens before the first / after the last module or
///   bracket are trimmed
/// - a run of adjacent operators collapses to its last operator
///
/// An unclosed `(` keeps its cleaned interior without a closing bracket; the
/// parser reports the missing `)`. Input nested deeper than [`MAX_NESTING`]
/// is cleaned with all of its brackets removed.
#[must_use]
pub fn clean_operators(tokens: &[Token]) -> Vec<Token> {
    if nesting_depth(tokens) > MAX_NESTING {
        let flat: Vec<Token> = tokens.iter().filter(|t| !is_bracket(t)).cloned().collect();
        return clean_span(&flat, &[], 0, flat.len());
    }

    let partners = matching_parens(tokens);
    clean_span(tokens, &partners, 0, tokens.len())
}

/// Cleans `tokens[start..end]`. `partners` maps each `(` to its `)`.
fn clean_span(tokens: &[Token], partners: &[Option<usize>], start: usize, end: usize) -> Vec<Token> {
    let mut output = Vec::with_capacity(end - start);
    let mut i = start;
    while i < end {
        let token = &tokens[i];
        if token.kind != TokenKind::LeftParen {
            output.push(token.clone());
            i += 1;
            continue;
        }

        let close = partners.get(i).copied().flatten().filter(|&close| close < end);
        let interior_end = close.unwrap_or(end);
        let interior = clean_span(tokens, partners, i + 1, interior_end);
        if !interior.is_empty() {
            output.push(token.clone());
            output.extend(interior);
            if let Some(close) = close {
                output.push(tokens[close].clone());
            }
        }
        i = interior_end + 1;
    }

    let first = output
        .iter()
        .position(|t| matches!(t.kind, TokenKind::Module | TokenKind::LeftParen));
    let last = output
        .iter()
        .rposition(|t| matches!(t.kind, TokenKind::Module | TokenKind::RightParen));
    let trimmed = match (first, last) {
        (Some(first), Some(last)) if first <= last => &output[first..=last],
        _ => return Vec::new(),
    };

    let len = trimmed.len();
    trimmed
        .iter()
        .enumerate()
        .filter(|&(pos, token)| {
            pos == 0 || pos == len - 1 || !(token.is_operator() && trimmed[pos + 1].is_operator())
        })
        .map(|(_, token)| token.clone())
        .collect()
}

/// For every `(`, the index of its matching `)`, found in a single pass.
///
/// Stray `)` and unclosed `(` have no partner.
fn matching_parens(tokens: &[Token]) -> Vec<Option<usize>> {
    let mut partners = vec![None; tokens.len()];
    let mut open = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LeftParen => open.push(i),
            TokenKind::RightParen => {
                if let Some(start) = open.pop() {
                    partners[start] = Some(i);
                }
            }
            _ => {}
        }
    }
    partners
}

/// The deepest bracket nesting reached, counting unclosed `(`.
fn nesting_depth(tokens: &[Token]) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0;
    for token in tokens {
        match token.kind {
            TokenKind::LeftParen => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Recursive-descent parser over a cleaned token slice.
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    text: String,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + offset).map(|token| token.kind)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        let matched = self.peek_kind(0) == Some(kind);
        if matched {
            self.pos += 1;
        }
        matched
    }

    fn expression(&mut self) -> Option<RequisiteNode> {
        self.and_expression()
    }

    fn and_expression(&mut self) -> Option<RequisiteNode> {
        let mut operands: Vec<RequisiteNode> = self.or_expression().into_iter().collect();
        while self.eat(TokenKind::And) {
            operands.extend(self.or_expression());
        }
        combine(operands, RequisiteNode::and)
    }

    fn or_expression(&mut self) -> Option<RequisiteNode> {
        let mut operands: Vec<RequisiteNode> = self.atomic().into_iter().collect();
        while self.eat(TokenKind::Or) {
            operands.extend(self.atomic());
        }
        combine(operands, RequisiteNode::or)
    }

    fn atomic(&mut self) -> Option<RequisiteNode> {
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Module => {
                    self.pos += 1;
                    return ModuleCode::new(token.text.clone())
                        .ok()
                        .map(RequisiteNode::Leaf);
                }
                TokenKind::LeftParen => {
                    self.pos += 1;
                    let inner = self.expression();
                    self.expect_right_paren();
                    return inner;
                }
                // Left for the enclosing bracket or the trailing-token check.
                TokenKind::RightParen => {
                    self.unexpected(token);
                    return None;
                }
                TokenKind::And | TokenKind::Or => {
                    self.unexpected(token);
                    self.pos += 1;
                }
            }
        }
        None
    }

    fn expect_right_paren(&mut self) {
        if self.eat(TokenKind::RightParen) {
            return;
        }

        // A single stray token before `)` is dropped.
        if let Some(stray) = self.peek().filter(|_| self.peek_kind(1) == Some(TokenKind::RightParen)) {
            self.unexpected(stray);
            self.pos += 2;
            return;
        }

        self.diagnostics.push(Diagnostic::MissingRightParen {
            text: self.text.clone(),
            position: self.pos,
        });
    }

    fn unexpected(&mut self, token: &Token) {
        self.diagnostics.push(Diagnostic::UnexpectedToken {
            text: self.text.clone(),
            token: token.text.clone(),
            position: self.pos,
        });
    }

    fn finish(&mut self) {
        if self.pos < self.tokens.len() {
            let tokens = self.tokens[self.pos..]
                .iter()
                .map(|token| token.text.clone())
                .collect();
            self.diagnostics.push(Diagnostic::TrailingTokens {
                text: self.text.clone(),
                tokens,
            });
            self.pos = self.tokens.len();
        }
    }
}

fn combine(
    mut operands: Vec<RequisiteNode>,
    branch: impl FnOnce(Vec<RequisiteNode>) -> RequisiteNode,
) -> Option<RequisiteNode> {
    match operands.len() {
        0 | 1 => operands.pop(),
        _ => Some(branch(operands)),
    }
}
