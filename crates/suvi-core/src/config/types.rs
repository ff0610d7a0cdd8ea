//! Sub-configuration structs with defaults matching the production feed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where to find candidate images.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Directory listing to scrape for image links
    pub listing_url: String,

    /// Substring a link must contain to be considered
    pub filename_marker: String,

    /// Index of the timestamp token in the `_`-split filename
    pub timestamp_token: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            listing_url: "https://services.swpc.noaa.gov/images/animations/suvi/primary/171/"
                .to_string(),
            filename_marker: "or_suvi".to_string(),
            timestamp_token: 4,
        }
    }
}

/// Enhancement parameters, applied in a fixed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Pixels removed from the bottom edge (legend band)
    pub crop_bottom: u32,

    /// Brightness change in percent (-100..=100)
    pub brightness: f32,

    /// Contrast change in percent (-100..=100)
    pub contrast: f32,

    /// Saturation change in percent (-100..=500)
    pub saturation: f32,

    /// Gaussian sigma of the unsharp mask
    pub sharpen_sigma: f32,

    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            crop_bottom: 50,
            brightness: 4.0,
            contrast: 2.5,
            saturation: 10.0,
            sharpen_sigma: 1.0,
            jpeg_quality: 80,
        }
    }
}

/// Resource limits for network reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Per-request HTTP timeout in milliseconds
    pub http_timeout_ms: u64,

    /// Largest image body accepted, in bytes
    pub max_image_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            http_timeout_ms: 30_000,
            max_image_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Bluesky account and post settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueskyConfig {
    /// PDS base URL
    pub pds_url: String,

    /// Account handle or DID (supports ${ENV_VAR} syntax)
    pub identifier: String,

    /// App password (supports ${ENV_VAR} syntax)
    pub password: String,

    /// Hashtags appended to the caption, without the leading `#`
    pub hashtags: Vec<String>,
}

impl Default for BlueskyConfig {
    fn default() -> Self {
        Self {
            pds_url: "https://bsky.social".to_string(),
            identifier: "${BSKY_USER}".to_string(),
            password: "${BSKY_PSWD}".to_string(),
            hashtags: vec![
                "NASA".to_string(),
                "NOAA".to_string(),
                "GOES16".to_string(),
                "Space".to_string(),
            ],
        }
    }
}

/// Developer switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Also write the processed image here
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_path: Option<PathBuf>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: pretty, json
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
