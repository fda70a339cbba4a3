use crate::conflict::ConflictPolicy;
use crate::executor::DEFAULT_MAX_CONCURRENCY;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default conflict policy for file destinations
    #[serde(default)]
    pub file_conflict: ConflictPolicy,

    /// Default conflict policy for directory destinations
    #[serde(default)]
    pub dir_conflict: ConflictPolicy,

    /// Default similarity threshold for dissolve gating
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,

    /// Default worker-pool bound for file-level operations
    #[serde(default = "default_concurrency")]
    pub max_concurrency: usize,

    /// Override the per-user journal directory
    #[serde(default)]
    pub journal_dir: Option<PathBuf>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            file_conflict: ConflictPolicy::Auto,
            dir_conflict: ConflictPolicy::Auto,
            similarity_threshold: default_threshold(),
            max_concurrency: default_concurrency(),
            journal_dir: None,
        }
    }
}

fn default_threshold() -> f64 {
    0.8
}

fn default_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl Config {
    /// Load config from the per-user config file if it exists
    pub fn load() -> Result<Self> {
        if let Some(base) = dirs::config_dir() {
            let config_path = base.join("reorgify").join("config.toml");
            if config_path.exists() {
                return Self::load_from_path(&config_path);
            }
        }

        // Return default config if no config file exists
        Ok(Self::default())
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
