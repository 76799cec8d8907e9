use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Phrases marking a requirement that cannot be expressed as module logic.
///
/// Grade thresholds, cohort rules, credit counts and non-module qualifications
/// all fall in this category. A requisite text containing any keyword is left
/// unparsed.
const DEFAULT_RESTRICTED_KEYWORDS: &[&str] = &[
    // programme membership
    "USP",
    // cohort or academic-year bound rules
    "Cohort",
    "cohort",
    "AY20",
    // qualifications that are not modules
    "Qualifying English Test",
    "A-level",
    "H1 ",
    "H2 ",
    // grade thresholds
    "grade",
    "Grade",
    "At least a B-",
    "Honours eligibility requirements",
    // credit counts
    "MC",
    // "n of m" selections
    "4 out of the 5",
    "4 of the 5",
];

/// Configuration for requisite compilation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keywords that exclude a requisite text from parsing.
    pub restricted_keywords: RestrictedKeywords,

    /// Whether to parse records on a thread pool.
    ///
    /// The locked-module pass always runs sequentially.
    pub parallel: bool,
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// An ordered list of restricted keywords, matched as plain substrings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestrictedKeywords(Vec<String>);

impl Default for RestrictedKeywords {
    fn default() -> Self {
        Self(
            DEFAULT_RESTRICTED_KEYWORDS
                .iter()
                .map(ToString::to_string)
                .collect(),
        )
    }
}

impl RestrictedKeywords {
    /// Creates a keyword list from the given phrases.
    #[must_use]
    pub fn new(keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(keywords.into_iter().map(Into::into).collect())
    }

    /// Returns the first keyword contained in `text`, if any.
    #[must_use]
    pub fn find_in(&self, text: &str) -> Option<&str> {
        self.0
            .iter()
            .map(String::as_str)
            .find(|keyword| text.contains(keyword))
    }
}

/// Errors that can occur when loading or saving a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {}", path.display())]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file {}", path.display())]
    Parse {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
    /// The config could not be serialised.
    #[error("failed to serialize config")]
    Serialize(#[from] toml::ser::Error),
    /// The config file could not be written.
    #[error("failed to write config file {}", path.display())]
    Write {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn default_keywords_filter_grade_and_cohort_rules() {
        let keywords = RestrictedKeywords::default();
        assert_eq!(keywords.find_in("CS1010 with a grade of B"), Some("grade"));
        assert_eq!(keywords.find_in("Cohort 2019 and before"), Some("Cohort"));
        assert_eq!(keywords.find_in("CS1010 or CS1101S"), None);
    }

    #[test]
    fn keyword_matching_is_case_sensitive() {
        let keywords = RestrictedKeywords::new(["USP"]);
        assert_eq!(keywords.find_in("usp students"), None);
        assert_eq!(keywords.find_in("USP students"), Some("USP"));
    }

    #[test]
    fn round_trips_through_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reqtree.toml");

        let config = Config {
            restricted_keywords: RestrictedKeywords::new(["grade", "Cohort"]),
            parallel: true,
        };
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reqtree.toml");
        std::fs::write(&path, "parallel = true\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.parallel);
        assert_eq!(config.restricted_keywords, RestrictedKeywords::default());
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reqtree.toml");
        std::fs::write(&path, "parallel = maybe\n").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }
}
