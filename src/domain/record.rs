use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{ModuleCode, PresentationNode, RequisiteNode};

/// A module record as it passes through compilation.
///
/// Input records need only `ModuleCode` and, optionally, the raw
/// `Prerequisite` / `Preclusion` texts. The compiler fills in the derived
/// fields. Any other fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleRecord {
    /// The module's own code.
    ///
    /// Kept as raw text until the compiler validates the whole dataset.
    pub module_code: String,

    /// Free-text prerequisite description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisite: Option<String>,

    /// Free-text preclusion description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preclusion: Option<String>,

    /// Parsed form of [`Self::prerequisite`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_prerequisite: Option<RequisiteNode>,

    /// Parsed form of [`Self::preclusion`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_preclusion: Option<RequisiteNode>,

    /// Display tree built from the parsed prerequisite.
    #[serde(
        rename = "ModmavenTree",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub presentation_tree: Option<PresentationNode>,

    /// Modules that list this one anywhere in their prerequisite.
    #[serde(default)]
    pub locked_modules: Vec<ModuleCode>,

    /// Fields the compiler does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModuleRecord {
    /// Creates a record with no requisite text.
    #[must_use]
    pub fn new(module_code: impl Into<String>) -> Self {
        Self {
            module_code: module_code.into(),
            ..Self::default()
        }
    }

    /// Sets the raw prerequisite text.
    #[must_use]
    pub fn with_prerequisite(mut self, text: impl Into<String>) -> Self {
        self.prerequisite = Some(text.into());
        self
    }

    /// Sets the raw preclusion text.
    #[must_use]
    pub fn with_preclusion(mut self, text: impl Into<String>) -> Self {
        self.preclusion = Some(text.into());
        self
    }
}
