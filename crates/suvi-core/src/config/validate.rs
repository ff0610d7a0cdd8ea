//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.listing_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "feed.listing_url must not be empty".into(),
            ));
        }
        if self.feed.filename_marker.is_empty() {
            return Err(ConfigError::ValidationError(
                "feed.filename_marker must not be empty".into(),
            ));
        }
        let p = &self.processing;
        if p.jpeg_quality == 0 || p.jpeg_quality > 100 {
            return Err(ConfigError::ValidationError(
                "processing.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        for (name, value) in [("brightness", p.brightness), ("contrast", p.contrast)] {
            if !(-100.0..=100.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "processing.{name} must be between -100 and 100"
                )));
            }
        }
        if !(-100.0..=500.0).contains(&p.saturation) {
            return Err(ConfigError::ValidationError(
                "processing.saturation must be between -100 and 500".into(),
            ));
        }
        if !(p.sharpen_sigma >= 0.0 && p.sharpen_sigma.is_finite()) {
            return Err(ConfigError::ValidationError(
                "processing.sharpen_sigma must be a finite number >= 0".into(),
            ));
        }
        if self.limits.http_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.http_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_image_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_bytes must be > 0".into(),
            ));
        }
        if self.bluesky.pds_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "bluesky.pds_url must not be empty".into(),
            ));
        }
        for tag in &self.bluesky.hashtags {
            if tag.is_empty() || tag.starts_with('#') || tag.chars().any(char::is_whitespace) {
                return Err(ConfigError::ValidationError(format!(
                    "bluesky.hashtags entry '{tag}' must be a bare word without '#'"
                )));
            }
        }
        Ok(())
    }
}
