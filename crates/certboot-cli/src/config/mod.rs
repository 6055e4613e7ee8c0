//! Configuration management.

use anyhow::{Context as _, Result};
use certboot::RetryPolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::output::OutputFormat;

/// CLI configuration.
///
/// Every field is optional; unset fields fall back to the library defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum number of certificate fetch attempts.
    pub max_attempts: Option<u32>,

    /// Pause between fetch attempts, in milliseconds.
    pub interval_ms: Option<u64>,

    /// Limit on the authenticated dial, in milliseconds.
    pub connect_timeout_ms: Option<u64>,

    /// Whether a peer presenting no certificate is retried.
    pub retry_on_missing_certificate: Option<bool>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,
}

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("io", "certboot", "certprobe")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Retry policy with this file's overrides applied to the defaults.
    pub fn retry_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::default();
        if let Some(max) = self.max_attempts {
            policy = policy.max_attempts(max);
        }
        if let Some(ms) = self.interval_ms {
            policy = policy.interval(Duration::from_millis(ms));
        }
        if let Some(retry) = self.retry_on_missing_certificate {
            policy = policy.retry_on_missing_certificate(retry);
        }
        policy
    }

    /// Dial timeout from the file, if set.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}
