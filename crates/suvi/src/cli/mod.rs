//! Subcommand implementations.

pub mod config;
pub mod run;

use std::path::Path;
use suvi_core::{Config, ConfigError};

/// Load config from an explicit file, or the default location when `None`.
///
/// An explicit file must exist; the default location may be absent.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suvi.toml");
        std::fs::write(&path, "[bluesky]\npds_url = \"https://pds.example.test\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.bluesky.pds_url, "https://pds.example.test");
    }
}
