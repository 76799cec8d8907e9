//! Recoverable diagnostics raised while compiling requisites.
//!
//! Nothing reported here stops a compilation run. Callers choose where
//! diagnostics go by passing a [`DiagnosticSink`]: [`TracingSink`] logs them,
//! and a `Vec<Diagnostic>` collects them for inspection.

use std::fmt;

use serde::Serialize;

/// Which requisite field a diagnostic concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    /// The `Prerequisite` text.
    Prerequisite,
    /// The `Preclusion` text.
    Preclusion,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prerequisite => "Prerequisite",
            Self::Preclusion => "Preclusion",
        })
    }
}

/// A non-fatal problem found while parsing one requisite string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// The numbers of `(` and `)` differ.
    UnbalancedParentheses {
        /// The normalised text.
        text: String,
    },
    /// A token appeared where an operand was expected and was skipped.
    UnexpectedToken {
        /// The normalised text.
        text: String,
        /// The skipped token.
        token: String,
        /// Index of the token in the cleaned token stream.
        position: usize,
    },
    /// A `)` was expected but not found.
    MissingRightParen {
        /// The normalised text.
        text: String,
        /// Index in the cleaned token stream where `)` was expected.
        position: usize,
    },
    /// Brackets nest too deeply to follow and were ignored.
    NestingTooDeep {
        /// The normalised text.
        text: String,
        /// The nesting depth reached.
        depth: usize,
    },
    /// Tokens remained after the top-level expression and were ignored.
    TrailingTokens {
        /// The normalised text.
        text: String,
        /// The ignored tokens.
        tokens: Vec<String>,
    },
}

impl Diagnostic {
    /// The normalised text the diagnostic was raised for.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::UnbalancedParentheses { text }
            | Self::UnexpectedToken { text, .. }
            | Self::MissingRightParen { text, .. }
            | Self::NestingTooDeep { text, .. }
            | Self::TrailingTokens { text, .. } => text,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnbalancedParentheses { text } => {
                write!(f, "'{text}': brackets do not self enclose")
            }
            Self::UnexpectedToken {
                text,
                token,
                position,
            } => write!(f, "'{text}': skipped unexpected '{token}' at token {position}"),
            Self::MissingRightParen { text, position } => {
                write!(f, "'{text}': expected ')' at token {position}")
            }
            Self::NestingTooDeep { text, depth } => {
                write!(f, "'{text}': brackets nested {depth} deep, parsed without brackets")
            }
            Self::TrailingTokens { text, tokens } => {
                write!(f, "'{text}': ignored trailing tokens {}", tokens.join(" "))
            }
        }
    }
}

/// Receives diagnostics as they are raised.
pub trait DiagnosticSink {
    /// Records one diagnostic for `module`'s `field`.
    fn report(&mut self, module: &str, field: Field, diagnostic: Diagnostic);
}

/// Logs every diagnostic through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, module: &str, field: Field, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::UnbalancedParentheses { .. } => {
                tracing::warn!(module_code = module, %field, "{diagnostic}");
            }
            _ => tracing::error!(module_code = module, %field, "{diagnostic}"),
        }
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, _module: &str, _field: Field, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, module: &str, field: Field, diagnostic: Diagnostic) {
        (**self).report(module, field, diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_collects_in_order() {
        let mut sink = Vec::new();
        sink.report(
            "CS2040",
            Field::Prerequisite,
            Diagnostic::UnbalancedParentheses {
                text: "(CS1010".into(),
            },
        );
        sink.report(
            "CS2040",
            Field::Preclusion,
            Diagnostic::MissingRightParen {
                text: "(CS1010".into(),
                position: 2,
            },
        );

        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].text(), "(CS1010");
    }

    #[test]
    fn display_names_the_text() {
        let diagnostic = Diagnostic::TrailingTokens {
            text: "CS1010 ) CS1231".into(),
            tokens: vec![")".into(), "CS1231".into()],
        };
        assert_eq!(
            diagnostic.to_string(),
            "'CS1010 ) CS1231': ignored trailing tokens ) CS1231"
        );
    }
}
