//! Turning requisite text into trees.
//!
//! A raw string goes through three stages:
//!
//! 1. [`normalize`] rewrites the many ways people write the same requirement
//!    into one canonical form (`CS 1010 & CS1231` → `CS1010 and CS1231`).
//! 2. [`tokenize`] reduces the canonical text to module codes, operators and
//!    parentheses.
//! 3. [`parse`] builds a [`RequisiteNode`] from the tokens, recovering from
//!    malformed input instead of failing.

pub mod lexer;
pub mod normalize;
pub mod parser;

pub use lexer::{tokenize, Token, TokenKind};
pub use normalize::{normalize, normalize_text};
pub use parser::{clean_operators, parse};

use crate::{diagnostics::Diagnostic, domain::ModuleCode, RequisiteNode};

/// A best-effort result together with the problems met producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered<T> {
    /// The value produced, possibly partial.
    pub value: T,
    /// Recoverable problems, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Recovered<T> {
    /// A value produced without any diagnostics.
    #[must_use]
    pub const fn clean(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    /// Returns `true` if no diagnostics were raised.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Splits into the value and its diagnostics.
    #[must_use]
    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.value, self.diagnostics)
    }
}

/// Normalises, tokenises and parses one requisite string for `module`.
///
/// Returns `None` as the value if the text mentions no module code.
#[must_use]
pub fn parse_requisite(module: &ModuleCode, text: &str) -> Recovered<Option<RequisiteNode>> {
    let normalized = normalize(module, text);
    let tokens = tokenize(&normalized);
    tracing::trace!(module_code = %module, %normalized, "tokenised requisite");
    parse(&tokens)
}
