use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// Settings consumed by the cache engine. Owned and loaded by the host
/// application; the cache only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Articles older than this many days are purged. 0 disables the policy;
    /// negative values are treated as disabled rather than erroring.
    #[serde(default)]
    pub keep_articles_days: i64,

    #[serde(default)]
    pub cleanup_on_quit: bool,

    #[serde(default)]
    pub delete_read_articles_on_quit: bool,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("feedcache");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("cache.db").to_string_lossy().to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            keep_articles_days: 0,
            cleanup_on_quit: false,
            delete_read_articles_on_quit: false,
        }
    }
}

impl CacheConfig {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = CacheConfig::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CacheConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("feedcache")
            .join("config.toml")
    }

    /// Retention window in days, if the policy is enabled.
    pub fn retention_days(&self) -> Option<i64> {
        if self.keep_articles_days > 0 {
            Some(self.keep_articles_days)
        } else {
            None
        }
    }
}
