//! Optional config file with store location and default context.
//!
//! Precedence for every value: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store_url: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub cluster: Option<String>,
}

impl Config {
    /// `<config dir>/tfinv/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tfinv").join("config.json"))
    }

    /// Loads `path`, or the default location when `None`. A missing file
    /// yields defaults; an unreadable or malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ExtractError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| ExtractError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Fills unset values from `self`.
    pub fn or_default(&self, value: Option<String>, field: ConfigField) -> Option<String> {
        value.or_else(|| match field {
            ConfigField::StoreUrl => self.store_url.clone(),
            ConfigField::Provider => self.provider.clone(),
            ConfigField::Cluster => self.cluster.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    StoreUrl,
    Provider,
    Cluster,
}
