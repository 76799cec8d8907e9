//! Domain models for requisite compilation.
//!
//! This module contains the core domain types including module codes,
//! requisite trees, module records and configuration.

/// Validated module codes and the shared code patterns.
pub mod module_code;
pub use module_code::{InvalidModuleCode, ModuleCode};

/// Parsed requisite trees.
pub mod requisite_tree;
pub use requisite_tree::RequisiteNode;

mod presentation;
pub use presentation::PresentationNode;

/// Module records as consumed and produced by the compiler.
pub mod record;
pub use record::ModuleRecord;

mod config;
pub use config::{Config, ConfigError, RestrictedKeywords};
