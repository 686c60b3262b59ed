use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_LOG_DIR: &str = "logs";

pub(crate) const DEFAULT_LOG_FILE: &str = "default.log";

pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

/// Where and how verbosely the store logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub dir: String,
    pub file: String,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            dir: DEFAULT_LOG_DIR.to_owned(),
            file: DEFAULT_LOG_FILE.to_owned(),
            level: DEFAULT_LOG_LEVEL.to_owned(),
        }
    }
}

/// Configuration of a graph store instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Check that every holder of a node community agrees on its community
    /// before answering `get_community`. When off, the first holder wins.
    pub strict_partition_checks: bool,
    pub log: LogConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            strict_partition_checks: true,
            log: LogConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("failed to parse store config")
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read store config {}", path.display()))?;
        Self::from_yaml_str(&content)
    }
}
