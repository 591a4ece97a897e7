//! Triage run configuration.
//!
//! Loaded from a JSON file; the rule list inside it is validated (regexes
//! compiled) at load time. A missing required key or a malformed rule is a
//! [`Error::Config`] and the process never starts a partial run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::rules::RuleSet;

fn default_max_messages() -> u64 {
    100
}

fn default_account() -> String {
    "default".to_string()
}

fn data_file(name: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailtriage")
        .join(name)
}

fn default_kept_path() -> PathBuf {
    data_file("kept.txt")
}

fn default_excluded_path() -> PathBuf {
    data_file("excluded.txt")
}

/// Everything one triage run needs, minus the secret token.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriageConfig {
    /// Base URL of the JMAP server.
    pub server_url: String,
    /// Name used to look the API token up in the keyring.
    #[serde(default = "default_account")]
    pub account: String,
    /// Name of the folder the run scans.
    pub scan_folder: String,
    /// Ceiling on messages fetched per run, newest first.
    #[serde(default = "default_max_messages")]
    pub max_messages: u64,
    /// Label/folder names the run creates when missing.
    #[serde(default)]
    pub required_labels: Vec<String>,
    /// Also clear legacy keyword markers when removing labels.
    #[serde(default)]
    pub keyword_cleanup: bool,
    /// Path of the kept ledger file.
    #[serde(default = "default_kept_path")]
    pub kept_path: PathBuf,
    /// Path of the excluded ledger file.
    #[serde(default = "default_excluded_path")]
    pub excluded_path: PathBuf,
    /// The ordered rule list.
    pub rules: RuleSet,
}

impl TriageConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file is missing, not valid JSON,
    /// missing a required key, or carries a malformed rule.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid config {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            return Err(Error::Config("server_url must not be empty".to_string()));
        }
        if self.scan_folder.trim().is_empty() {
            return Err(Error::Config("scan_folder must not be empty".to_string()));
        }
        if self.max_messages == 0 {
            return Err(Error::Config("max_messages must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Default config file location
    /// (`$XDG_CONFIG_HOME/mailtriage/config.json` on Linux).
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mailtriage")
            .join("config.json")
    }
}
