//! Configuration management for the SUVI poster.
//!
//! Configuration is loaded from the platform config directory with defaults
//! that reproduce the production bot. Credentials are never stored directly;
//! the defaults reference `${BSKY_USER}` / `${BSKY_PSWD}`.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Image feed settings
    pub feed: FeedConfig,

    /// Enhancement settings
    pub processing: ProcessingConfig,

    /// Network limits
    pub limits: LimitsConfig,

    /// Bluesky settings
    pub bluesky: BlueskyConfig,

    /// Debug output
    pub debug: DebugConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Resolve `${ENV_VAR}` references in config strings.
///
/// Plain values pass through; empty values and unset variables yield `None`.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.suvi.suvi/config.toml
    /// - Linux: ~/.config/suvi/config.toml
    ///
    /// Falls back to ~/.suvi/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "suvi", "suvi")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".suvi").join("config.toml")
            })
    }

    /// Get the resolved debug save path (with ~ expansion), if any.
    pub fn save_path(&self) -> Option<PathBuf> {
        self.debug.save_path.as_ref().map(|p| {
            let path_str = p.to_string_lossy();
            PathBuf::from(shellexpand::tilde(&path_str).into_owned())
        })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.feed.filename_marker, "or_suvi");
        assert_eq!(config.feed.timestamp_token, 4);
        assert_eq!(config.processing.crop_bottom, 50);
        assert_eq!(config.processing.jpeg_quality, 80);
        assert_eq!(config.bluesky.hashtags.len(), 4);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[feed]"));
        assert!(toml.contains("[bluesky]"));
        assert!(toml.contains("${BSKY_PSWD}"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[processing]\njpeg_quality = 90\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.processing.jpeg_quality, 90);
        assert_eq!(config.processing.crop_bottom, 50);
        assert_eq!(config.bluesky.pds_url, "https://bsky.social");
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[processing]\njpeg_quality = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("alice.bsky.social"), Some("alice.bsky.social".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_SUVI_123}"), None);
    }

    #[test]
    fn test_save_path_expands_tilde() {
        let mut config = Config::default();
        assert!(config.save_path().is_none());

        config.debug.save_path = Some(PathBuf::from("~/suvi.jpg"));
        let path = config.save_path().unwrap();
        assert!(!path.to_string_lossy().starts_with('~'));
    }
}
