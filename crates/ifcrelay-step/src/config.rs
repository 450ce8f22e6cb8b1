//! Validator configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! global_id_types = ["IFCGLOBALLYUNIQUEID"]
//! global_id_pattern = "^[0-9A-Za-z_$]{22}$"
//! line_numbering = "source"   # or "filtered"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::section::LineNumbering;

/// Entity type whose first parameter is checked as a global identifier.
pub const DEFAULT_GLOBAL_ID_TYPE: &str = "IFCGLOBALLYUNIQUEID";

/// 22 characters from the IFC base-64 alphabet.
pub const DEFAULT_GLOBAL_ID_PATTERN: &str = r"^[0-9A-Za-z_$]{22}$";

/// Settings for [`crate::Validator`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Entity types subject to the global identifier format check.
    pub global_id_types: Vec<String>,
    /// Pattern the unquoted global identifier must match.
    pub global_id_pattern: String,
    /// Line numbers attached to entities and findings.
    pub line_numbering: LineNumbering,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            global_id_types: vec![DEFAULT_GLOBAL_ID_TYPE.to_string()],
            global_id_pattern: DEFAULT_GLOBAL_ID_PATTERN.to_string(),
            line_numbering: LineNumbering::Source,
        }
    }
}

impl ValidatorConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
