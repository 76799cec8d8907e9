use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Finds module codes anywhere in a string.
///
/// Two or three uppercase letters, four digits, then up to two uppercase
/// letters (e.g. `CS1010`, `CS1010S`, `GEK1000AR`, `CS1010FC`).
pub(crate) fn module_regex() -> &'static Regex {
    regex!(r"[A-Z]{2,3}[0-9]{4}[A-Z]{0,2}")
}

fn exact_module_regex() -> &'static Regex {
    regex!(r"^[A-Z]{2,3}[0-9]{4}[A-Z]{0,2}$")
}

/// Operator words and characters that must never appear in a module code.
fn operator_regex() -> &'static Regex {
    regex!(r"(?i)\b(?:and|or)\b|[|/;&,()\s]")
}

/// Returns `true` if `s` contains a module code anywhere.
#[must_use]
pub fn contains_module_code(s: &str) -> bool {
    module_regex().is_match(s)
}

/// Returns `true` if `s` contains an operator word or operator character.
#[must_use]
pub fn contains_operator(s: &str) -> bool {
    operator_regex().is_match(s)
}

/// A validated module code such as `CS1010` or `BMA5000A`.
///
/// The whole string must match the module code pattern. Module codes are
/// used both as lexical tokens and as map keys, so they are immutable once
/// constructed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleCode(NonEmptyString);

impl ModuleCode {
    /// Creates a new `ModuleCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidModuleCode` if the string is not exactly one module code.
    pub fn new(s: String) -> Result<Self, InvalidModuleCode> {
        if !exact_module_regex().is_match(&s) {
            return Err(InvalidModuleCode(s));
        }

        NonEmptyString::new(s)
            .map(Self)
            .map_err(InvalidModuleCode)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The code up to and including its last digit (`CS1010S` → `CS1010`).
    #[must_use]
    pub fn base(&self) -> &str {
        let s = self.as_str();
        let end = s
            .rfind(|c: char| c.is_ascii_digit())
            .map_or(s.len(), |i| i + 1);
        &s[..end]
    }
}

impl TryFrom<String> for ModuleCode {
    type Error = InvalidModuleCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ModuleCode {
    type Error = InvalidModuleCode;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl From<ModuleCode> for String {
    fn from(code: ModuleCode) -> Self {
        code.0.into_inner()
    }
}

impl FromStr for ModuleCode {
    type Err = InvalidModuleCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl AsRef<str> for ModuleCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for ModuleCode {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for ModuleCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not a well-formed module code.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid module code '{0}': expected 2-3 uppercase letters, 4 digits and an optional suffix")]
pub struct InvalidModuleCode(String);

impl InvalidModuleCode {
    /// The rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.0
    }
}
