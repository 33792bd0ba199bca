//! # Velum Configuration
//!
//! Configuration for the caching resolver stage: typed, validated, with
//! sensible defaults, loadable from YAML, JSON, or TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod logging;

pub use logging::{LogConfig, LogFormat, init_tracing};

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("File not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Caching stage configuration.
///
/// Durations are whole seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CachingConfig {
    /// Lower clamp applied to positive-answer record TTLs (seconds).
    /// `0` leaves record TTLs alone.
    pub min_cache_time: u64,

    /// Upper clamp applied to positive-answer record TTLs (seconds).
    /// `0` leaves record TTLs alone; a negative value disables the
    /// caching stage entirely.
    pub max_cache_time: i64,

    /// TTL for cached NXDOMAIN answers (seconds). `<= 0` disables
    /// negative caching.
    pub cache_time_negative: i64,

    /// Soft cap on result-cache entries; `0` means unlimited.
    pub max_items_count: usize,

    /// Enables the prefetch engine.
    pub prefetching: bool,

    /// Rolling window for the per-name query tracker (seconds).
    pub prefetch_expires: u64,

    /// A name becomes eligible for prefetch once it was queried strictly
    /// more than this many times within the window. `0` means always.
    pub prefetch_threshold: usize,

    /// Soft cap on tracker entries; `0` means unlimited.
    pub prefetch_max_items_count: usize,
}

impl Default for CachingConfig {
    fn default() -> Self {
        Self {
            min_cache_time: 0,
            max_cache_time: 0,
            cache_time_negative: 30 * 60,
            max_items_count: 0,
            prefetching: false,
            prefetch_expires: 2 * 60 * 60,
            prefetch_threshold: 5,
            prefetch_max_items_count: 0,
        }
    }
}

impl CachingConfig {
    /// Loads configuration from a file, keyed on its extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?, // Default to YAML
        };

        config.validate()?;

        Ok(config)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_cache_time > 0 && self.min_cache_time > self.max_cache_time as u64 {
            return Err(ConfigError::InvalidValue {
                field: "min_cache_time".to_string(),
                message: "cannot be greater than max_cache_time".to_string(),
            });
        }

        Ok(())
    }

    /// Returns true if `max_cache_time` disables the caching stage.
    pub fn is_disabled(&self) -> bool {
        self.max_cache_time < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CachingConfig::default();

        assert_eq!(config.cache_time_negative, 1800);
        assert_eq!(config.prefetch_expires, 7200);
        assert_eq!(config.prefetch_threshold, 5);
        assert!(!config.prefetching);
        assert!(config.validate().is_ok());
        assert!(!config.is_disabled());
    }

    #[test]
    fn test_from_yaml() {
        let config = CachingConfig::from_yaml(
            "min_cache_time: 60\nmax_cache_time: 3600\nprefetching: true\n",
        )
        .unwrap();

        assert_eq!(config.min_cache_time, 60);
        assert_eq!(config.max_cache_time, 3600);
        assert!(config.prefetching);
        // Untouched fields keep their defaults.
        assert_eq!(config.cache_time_negative, 1800);
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let config = CachingConfig {
            min_cache_time: 600,
            max_cache_time: 60,
            ..Default::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_negative_max_disables() {
        let config = CachingConfig {
            max_cache_time: -1,
            ..Default::default()
        };

        assert!(config.is_disabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(CachingConfig::from_yaml("min_cache_tiem: 60\n").is_err());
    }
}
