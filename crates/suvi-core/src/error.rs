//! Error types for the SUVI poster.
//!
//! Errors are organized by stage so a failed run says which step broke and
//! carries the context needed to act on it (URL, filename, HTTP status).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for a run.
#[derive(Error, Debug)]
pub enum SuviError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Locate / process / assemble errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Bluesky publishing errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A required credential resolved to nothing
    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

/// Errors from the locate, process and assemble stages.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The HTTP client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    /// HTTP fetch failed or returned a non-success status
    #[error("Fetch failed for {url}: {message}")]
    Fetch {
        url: String,
        message: String,
        status_code: Option<u16>,
    },

    /// The listing had no usable image link
    #[error("No image matching '{marker}' found at {url}")]
    NoCandidates { url: String, marker: String },

    /// A filename did not carry a parseable timestamp token
    #[error("Bad timestamp in {name}: {message}")]
    Timestamp { name: String, message: String },

    /// Image decoding failed
    #[error("Decode error for {url}: {message}")]
    Decode { url: String, message: String },

    /// Image re-encoding failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Downloaded body exceeds the size limit
    #[error("Image too large: {url} ({size} bytes > {max} bytes)")]
    TooLarge { url: String, size: u64, max: u64 },

    /// Writing the processed image to the debug sink failed
    #[error("Failed to write image to {path}: {source}")]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the three Bluesky XRPC calls.
#[derive(Error, Debug)]
pub enum PublishError {
    /// createSession failed
    #[error("Authentication failed: {message}")]
    Auth {
        message: String,
        status_code: Option<u16>,
    },

    /// uploadBlob failed
    #[error("Blob upload failed: {message}")]
    Upload {
        message: String,
        status_code: Option<u16>,
    },

    /// createRecord failed
    #[error("Post creation failed: {message}")]
    CreateRecord {
        message: String,
        status_code: Option<u16>,
    },

    /// Transport-level failure before any status was received
    #[error("Request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },
}

impl PublishError {
    /// HTTP status attached to the failure, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            PublishError::Auth { status_code, .. }
            | PublishError::Upload { status_code, .. }
            | PublishError::CreateRecord { status_code, .. } => *status_code,
            PublishError::Request { .. } => None,
        }
    }
}

/// Convenience type alias for run results.
pub type Result<T> = std::result::Result<T, SuviError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_extracted() {
        let err = PublishError::Upload {
            message: "HTTP 401".to_string(),
            status_code: Some(401),
        };
        assert_eq!(err.status_code(), Some(401));

        let err = PublishError::Request {
            endpoint: "createSession".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_config_error_wraps_into_top_level() {
        let err: SuviError = ConfigError::MissingCredential("bluesky.password".into()).into();
        assert!(err.to_string().contains("bluesky.password"));
    }
}
