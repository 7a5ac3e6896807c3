use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::net::Format;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PnConfig {
    /// Maximum number of history entries kept; unbounded when absent.
    #[serde(default)]
    pub history_limit: Option<usize>,
    /// Log every marking change at `info` level.
    #[serde(default)]
    pub log_transitions: bool,
    /// Format assumed for description files whose extension is neither `.json` nor `.ron`.
    #[serde(default)]
    pub format: Format,
    #[serde(default = "default_show_enabled")]
    pub show_enabled: bool,
}

impl Default for PnConfig {
    fn default() -> Self {
        Self {
            history_limit: None,
            log_transitions: false,
            format: Format::default(),
            show_enabled: default_show_enabled(),
        }
    }
}

impl PnConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn default_show_enabled() -> bool {
    true
}
