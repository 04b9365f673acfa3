use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Startup configuration. Read once; the application never writes it back.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub default_model: Option<String>,
    pub reply_delay_min_ms: u64,
    pub reply_delay_max_ms: u64,
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_model: None,
            reply_delay_min_ms: 1000,
            reply_delay_max_ms: 3000,
            log_filter: None,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// `PARLEY_MODEL` and `PARLEY_LOG` take precedence over the file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("PARLEY_MODEL") {
            if !model.trim().is_empty() {
                self.default_model = Some(model);
            }
        }
        if let Ok(filter) = std::env::var("PARLEY_LOG") {
            if !filter.trim().is_empty() {
                self.log_filter = Some(filter);
            }
        }
        self
    }

    /// Model selected at startup.
    pub fn model(&self) -> &str {
        self.default_model
            .as_deref()
            .unwrap_or(crate::store::DEFAULT_MODEL)
    }

    /// Simulated reply latency bounds, always ordered `(min, max)`.
    pub fn reply_delay_range(&self) -> (Duration, Duration) {
        let (lo, hi) = if self.reply_delay_min_ms <= self.reply_delay_max_ms {
            (self.reply_delay_min_ms, self.reply_delay_max_ms)
        } else {
            (self.reply_delay_max_ms, self.reply_delay_min_ms)
        };
        (Duration::from_millis(lo), Duration::from_millis(hi))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("parley").join("config.json"))
    }
}
