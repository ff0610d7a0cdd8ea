//! Bluesky publisher using the AT Protocol XRPC endpoints.
//!
//! A post takes three sequential calls: `createSession`, `uploadBlob`,
//! `createRecord`. The session lives only for the duration of one publish.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::facets::{Facet, RichText};
use super::publisher::Publisher;
use crate::config::{resolve_env_var, BlueskyConfig, LimitsConfig};
use crate::error::{ConfigError, PublishError, Result};
use crate::pipeline::source::build_client;
use crate::types::{BlobRef, Post, ProcessedImage, PublishReceipt, Session};

const CREATE_SESSION: &str = "com.atproto.server.createSession";
const UPLOAD_BLOB: &str = "com.atproto.repo.uploadBlob";
const CREATE_RECORD: &str = "com.atproto.repo.createRecord";

/// Record collection and type for feed posts.
pub const POST_COLLECTION: &str = "app.bsky.feed.post";
/// Embed type for image posts.
pub const IMAGES_EMBED: &str = "app.bsky.embed.images";

/// Account credentials, resolved once at construction.
#[derive(Clone)]
pub struct Credentials {
    identifier: String,
    password: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
        }
    }

    /// Resolve `${ENV_VAR}` references; fail if either value ends up empty.
    pub fn resolve(config: &BlueskyConfig) -> std::result::Result<Self, ConfigError> {
        let identifier = resolve_env_var(&config.identifier).ok_or_else(|| {
            ConfigError::MissingCredential(format!(
                "bluesky.identifier ('{}') is empty. Set BSKY_USER env var.",
                config.identifier
            ))
        })?;
        let password = resolve_env_var(&config.password).ok_or_else(|| {
            ConfigError::MissingCredential(
                "bluesky.password is empty. Set BSKY_PSWD env var.".to_string(),
            )
        })?;
        Ok(Self::new(identifier, password))
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

// --- Request types ---

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct CreateRecordRequest<'a> {
    repo: &'a str,
    collection: &'static str,
    record: &'a PostRecord,
}

/// The `app.bsky.feed.post` record body.
#[derive(Debug, Serialize)]
pub struct PostRecord {
    #[serde(rename = "$type")]
    pub record_type: &'static str,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub embed: ImagesEmbed,
    pub facets: Vec<Facet>,
}

#[derive(Debug, Serialize)]
pub struct ImagesEmbed {
    #[serde(rename = "$type")]
    pub embed_type: &'static str,
    pub images: Vec<EmbeddedImage>,
}

#[derive(Debug, Serialize)]
pub struct EmbeddedImage {
    pub alt: String,
    pub image: BlobRef,
}

impl PostRecord {
    /// Build the record for `post`, referencing an uploaded `blob`.
    pub fn build<S: AsRef<str>>(
        post: &Post,
        blob: BlobRef,
        hashtags: &[S],
        created_at: DateTime<Utc>,
    ) -> Self {
        let (text, facets) = RichText::with_hashtags(&post.caption, hashtags).into_parts();
        Self {
            record_type: POST_COLLECTION,
            text,
            created_at: created_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            embed: ImagesEmbed {
                embed_type: IMAGES_EMBED,
                images: vec![EmbeddedImage {
                    alt: post.alt.clone(),
                    image: blob,
                }],
            },
            facets,
        }
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct UploadBlobResponse {
    blob: BlobRef,
}

#[derive(Deserialize)]
struct CreateRecordResponse {
    uri: Option<String>,
}

type ErrorCtor = fn(String, Option<u16>) -> PublishError;

/// Publishes to a Bluesky PDS.
pub struct BlueskyPublisher {
    pds_url: String,
    credentials: Credentials,
    hashtags: Vec<String>,
    client: reqwest::Client,
}

impl BlueskyPublisher {
    /// Resolve credentials and build the HTTP client. Fails fast on missing credentials.
    pub fn new(config: &BlueskyConfig, limits: &LimitsConfig) -> Result<Self> {
        let credentials = Credentials::resolve(config)?;
        Self::with_credentials(config, limits, credentials)
    }

    pub fn with_credentials(
        config: &BlueskyConfig,
        limits: &LimitsConfig,
        credentials: Credentials,
    ) -> Result<Self> {
        let client = build_client(limits).map_err(|e| PublishError::Request {
            endpoint: config.pds_url.clone(),
            message: format!("client setup failed: {e}"),
        })?;
        Ok(Self {
            pds_url: config.pds_url.trim_end_matches('/').to_string(),
            credentials,
            hashtags: config.hashtags.clone(),
            client,
        })
    }

    fn endpoint(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.pds_url, nsid)
    }

    /// Send a request; map transport failures and non-2xx statuses to errors.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        nsid: &str,
        on_status: ErrorCtor,
    ) -> std::result::Result<reqwest::Response, PublishError> {
        let resp = request.send().await.map_err(|e| PublishError::Request {
            endpoint: nsid.to_string(),
            message: e.to_string(),
        })?;

        let status = resp.status();
        tracing::info!("{nsid} response code: {}", status.as_u16());
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(on_status(
                format!("HTTP {status}: {body}"),
                Some(status.as_u16()),
            ));
        }
        Ok(resp)
    }

    async fn create_session(&self) -> std::result::Result<Session, PublishError> {
        let body = CreateSessionRequest {
            identifier: &self.credentials.identifier,
            password: &self.credentials.password,
        };
        let request = self.client.post(self.endpoint(CREATE_SESSION)).json(&body);
        let resp = self
            .send(request, CREATE_SESSION, |message, status_code| {
                PublishError::Auth {
                    message,
                    status_code,
                }
            })
            .await?;

        let session: Session = resp.json().await.map_err(|e| PublishError::Auth {
            message: format!("Failed to parse session: {e}"),
            status_code: None,
        })?;
        tracing::debug!("Logged in as {}", session.did);
        Ok(session)
    }

    async fn upload_blob(
        &self,
        session: &Session,
        image: &ProcessedImage,
    ) -> std::result::Result<BlobRef, PublishError> {
        let request = self
            .client
            .post(self.endpoint(UPLOAD_BLOB))
            .header(reqwest::header::CONTENT_TYPE, &image.mime_type)
            .bearer_auth(&session.access_jwt)
            .body(image.bytes.clone());
        let resp = self
            .send(request, UPLOAD_BLOB, |message, status_code| {
                PublishError::Upload {
                    message,
                    status_code,
                }
            })
            .await?;

        let upload: UploadBlobResponse = resp.json().await.map_err(|e| PublishError::Upload {
            message: format!("Failed to parse blob descriptor: {e}"),
            status_code: None,
        })?;
        tracing::debug!(
            "Uploaded blob {} ({} bytes)",
            upload.blob.link.link,
            upload.blob.size
        );
        Ok(upload.blob)
    }

    async fn create_record(
        &self,
        session: &Session,
        record: &PostRecord,
    ) -> std::result::Result<Option<String>, PublishError> {
        let body = CreateRecordRequest {
            repo: &session.did,
            collection: POST_COLLECTION,
            record,
        };
        let request = self
            .client
            .post(self.endpoint(CREATE_RECORD))
            .bearer_auth(&session.access_jwt)
            .json(&body);
        let resp = self
            .send(request, CREATE_RECORD, |message, status_code| {
                PublishError::CreateRecord {
                    message,
                    status_code,
                }
            })
            .await?;

        // Only the URI is of interest; a body we cannot read is not a failure.
        Ok(resp
            .json::<CreateRecordResponse>()
            .await
            .ok()
            .and_then(|r| r.uri))
    }
}

#[async_trait]
impl Publisher for BlueskyPublisher {
    fn name(&self) -> &str {
        "bluesky"
    }

    async fn publish(&self, post: &Post) -> std::result::Result<PublishReceipt, PublishError> {
        tracing::info!(
            "Publishing to {} as {}",
            self.pds_url,
            self.credentials.identifier()
        );
        let session = self.create_session().await?;
        let blob = self.upload_blob(&session, &post.image).await?;
        let record = PostRecord::build(post, blob.clone(), &self.hashtags, Utc::now());
        let uri = self.create_record(&session, &record).await?;

        if let Some(uri) = &uri {
            tracing::info!("Created post {uri}");
        }
        Ok(PublishReceipt {
            uri,
            text: record.text,
            blob,
        })
    }
}
