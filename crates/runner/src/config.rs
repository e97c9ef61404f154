//! Runner configuration via `snapfix.toml`
//!
//! A missing file means defaults. To change settings, drop a `snapfix.toml`
//! next to the suite and rerun.

use std::path::Path;

use serde::{Deserialize, Serialize};
use snapfix_core::{SnapfixError, SnapfixResult};

/// Config file name looked up by [`RunnerConfig::load`]
pub const CONFIG_FILE_NAME: &str = "snapfix.toml";

/// Runner configuration loaded from `snapfix.toml`.
///
/// # Example
///
/// ```toml
/// # Stop after the first failing test or hook
/// bail = false
///
/// # Only run tests whose full title contains this text
/// # grep = "Should have 2 wei"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Stop after the first failure; remaining tests are reported skipped.
    #[serde(default)]
    pub bail: bool,
    /// Only run tests whose full title contains this substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grep: Option<String>,
}

impl RunnerConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# snapfix runner configuration
#
# Stop after the first failing test or hook. Tests that did not run are
# reported as skipped.
bail = false

# Only run tests whose full title (scope titles and test title joined by
# spaces) contains this text.
# grep = "Should have 2 wei"
"#
    }

    /// Parse a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or has unknown keys.
    pub fn from_toml_str(text: &str) -> SnapfixResult<Self> {
        toml::from_str(text)
            .map_err(|e| SnapfixError::config(format!("invalid {}: {}", CONFIG_FILE_NAME, e)))
    }

    /// Load `snapfix.toml` from `dir`, falling back to defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(dir: &Path) -> SnapfixResult<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|e| SnapfixError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Whether a test with `full_title` passes the `grep` filter
    pub fn selects(&self, full_title: &str) -> bool {
        match &self.grep {
            Some(pattern) => full_title.contains(pattern.as_str()),
            None => true,
        }
    }
}
