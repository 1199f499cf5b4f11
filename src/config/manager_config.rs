use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::errors::{ManagerError, Result};
use crate::core::models::record_schema::DEFAULT_KEY_PREFIX;

/// Current format version supported by this build.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Default comment prefix for identities this manager installs in the agent.
pub const DEFAULT_COMMENT_PREFIX: &str = "agentkeys:";

/// Key manager configuration, usually read from a TOML file.
///
/// Every section is optional; missing values fall back to defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Format version for backward compatibility. Defaults to 1 if missing.
    pub format_version: u32,
    pub storage: StorageSection,
    pub agent: AgentSection,
}

impl ManagerConfig {
    /// Load the configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ManagerError::InvalidConfig {
                detail: format!("{} not found", path.display()),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ManagerError::InvalidConfig {
            detail: format!("Failed to parse configuration: {e}"),
        })?;

        if config.format_version > CURRENT_FORMAT_VERSION {
            return Err(ManagerError::FormatVersionTooNew {
                config_version: config.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }

        // An empty prefix would claim every entry in a shared namespace.
        if config.storage.key_prefix.is_empty() {
            return Err(ManagerError::InvalidConfig {
                detail: "storage.key_prefix must not be empty".into(),
            });
        }
        if config.agent.comment_prefix.is_empty() {
            return Err(ManagerError::InvalidConfig {
                detail: "agent.comment_prefix must not be empty".into(),
            });
        }

        Ok(config)
    }

    /// Path of the JSON store file, defaulting to the user data directory.
    pub fn store_path(&self) -> Option<PathBuf> {
        self.storage.path.clone().or_else(default_store_path)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            format_version: CURRENT_FORMAT_VERSION,
            storage: StorageSection::default(),
            agent: AgentSection::default(),
        }
    }
}

/// `<data dir>/agentkeys/keys.json`, if the platform has a data directory.
pub fn default_store_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("agentkeys").join("keys.json"))
}

/// The `[storage]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Prefix of the storage keys holding key records.
    pub key_prefix: String,
    /// Location of the JSON store file (optional).
    pub path: Option<PathBuf>,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            path: None,
        }
    }
}

/// The `[agent]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// Prefix of the comment attached to identities loaded by the manager.
    pub comment_prefix: String,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
        }
    }
}
