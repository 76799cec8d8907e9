//! Module requisite compilation
//!
//! Free-text prerequisite and preclusion descriptions are normalised, lexed and
//! parsed into boolean trees of module codes. A dataset-wide pass then inverts
//! the prerequisite trees into a "locked modules" index.

#[macro_use]
mod macros;

pub mod domain;
pub use domain::{
    Config, ConfigError, ModuleCode, ModuleRecord, PresentationNode, RequisiteNode,
    RestrictedKeywords,
};

/// The string-to-tree pipeline: normaliser, lexer and parser.
pub mod requisite;
pub use requisite::{normalize, parse, parse_requisite, tokenize, Recovered, Token, TokenKind};

/// Dataset-wide compilation of module records.
pub mod compiler;
pub use compiler::{compile, CompileError, Summary};

/// Recoverable diagnostics and the sinks that receive them.
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticSink, Field, TracingSink};
