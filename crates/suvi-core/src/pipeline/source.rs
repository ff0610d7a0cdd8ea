//! HTTP reads used by the locate and process stages.
//!
//! The stages talk to an [`HttpSource`] rather than to `reqwest` directly so
//! tests can serve canned listings and images.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};

/// Read-only HTTP access.
#[async_trait]
pub trait HttpSource: Send + Sync {
    /// GET a URL and return the body as text.
    async fn get_text(&self, url: &str) -> PipelineResult<String>;

    /// GET a URL and return the raw body.
    async fn get_bytes(&self, url: &str) -> PipelineResult<Vec<u8>>;
}

/// Build a client with the configured request timeout.
pub(crate) fn build_client(limits: &LimitsConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(limits.http_timeout_ms))
        .user_agent(concat!("suvi/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// [`HttpSource`] backed by a shared `reqwest::Client`.
pub struct ReqwestSource {
    client: reqwest::Client,
    max_bytes: u64,
}

impl ReqwestSource {
    pub fn new(limits: &LimitsConfig) -> PipelineResult<Self> {
        let client = build_client(limits).map_err(|e| PipelineError::Client(e.to_string()))?;
        Ok(Self {
            client,
            max_bytes: limits.max_image_bytes,
        })
    }

    async fn get(&self, url: &str) -> PipelineResult<reqwest::Response> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::Fetch {
                url: url.to_string(),
                message: format!("request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        tracing::debug!("GET {url} -> {status}");
        if !status.is_success() {
            return Err(PipelineError::Fetch {
                url: url.to_string(),
                message: format!("HTTP {status}"),
                status_code: Some(status.as_u16()),
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl HttpSource for ReqwestSource {
    async fn get_text(&self, url: &str) -> PipelineResult<String> {
        let resp = self.get(url).await?;
        resp.text().await.map_err(|e| PipelineError::Fetch {
            url: url.to_string(),
            message: format!("failed to read body: {e}"),
            status_code: None,
        })
    }

    async fn get_bytes(&self, url: &str) -> PipelineResult<Vec<u8>> {
        let resp = self.get(url).await?;

        if let Some(len) = resp.content_length() {
            if len > self.max_bytes {
                return Err(PipelineError::TooLarge {
                    url: url.to_string(),
                    size: len,
                    max: self.max_bytes,
                });
            }
        }

        let bytes = resp.bytes().await.map_err(|e| PipelineError::Fetch {
            url: url.to_string(),
            message: format!("failed to read body: {e}"),
            status_code: None,
        })?;

        // Content-Length is optional; check the real size too.
        if bytes.len() as u64 > self.max_bytes {
            return Err(PipelineError::TooLarge {
                url: url.to_string(),
                size: bytes.len() as u64,
                max: self.max_bytes,
            });
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reqwest_source_builds_with_defaults() {
        let source = ReqwestSource::new(&LimitsConfig::default()).unwrap();
        assert_eq!(source.max_bytes, 20 * 1024 * 1024);
    }
}
