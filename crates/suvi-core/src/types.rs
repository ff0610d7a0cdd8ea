//! Core data types passed between the pipeline stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// UTC instant used for capture and creation times.
pub type Timestamp = DateTime<Utc>;

/// An image link found in the directory listing, with its capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateImage {
    /// Absolute URL of the image
    pub url: String,

    /// Filename as it appeared in the listing
    pub file_name: String,

    /// Timestamp parsed from the filename
    pub captured_at: Timestamp,
}

/// The enhanced image, ready to upload.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// Encoded image bytes
    pub bytes: Vec<u8>,

    /// MIME type of `bytes`
    pub mime_type: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Size of the downloaded source in bytes
    pub source_size: u64,
}

/// One post: image plus caption. Built once per run, consumed by the publisher.
#[derive(Debug, Clone)]
pub struct Post {
    pub image: ProcessedImage,
    pub caption: String,
    /// Accessibility text for the embedded image
    pub alt: String,
}

/// Result of `com.atproto.server.createSession`.
#[derive(Clone, Deserialize)]
pub struct Session {
    pub did: String,
    #[serde(rename = "accessJwt")]
    pub access_jwt: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("did", &self.did)
            .field("access_jwt", &"<redacted>")
            .finish()
    }
}

/// Blob descriptor returned by `com.atproto.repo.uploadBlob`.
///
/// Serialized back verbatim into the post embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    #[serde(rename = "$type")]
    pub blob_type: String,

    #[serde(rename = "ref")]
    pub link: BlobLink,

    #[serde(rename = "mimeType")]
    pub mime_type: String,

    pub size: u64,
}

/// Content-addressed link inside a [`BlobRef`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobLink {
    #[serde(rename = "$link")]
    pub link: String,
}

/// What a successful publish produced.
#[derive(Debug, Clone, Serialize)]
pub struct PublishReceipt {
    /// AT URI of the created record, when the server returned one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Final post text including hashtags
    pub text: String,

    /// Uploaded blob
    pub blob: BlobRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_ref_deserializes_upload_response() {
        let json = r#"{
            "$type": "blob",
            "ref": {"$link": "bafkreib2abc"},
            "mimeType": "image/jpeg",
            "size": 123456
        }"#;
        let blob: BlobRef = serde_json::from_str(json).unwrap();
        assert_eq!(blob.blob_type, "blob");
        assert_eq!(blob.link.link, "bafkreib2abc");
        assert_eq!(blob.size, 123456);
    }

    #[test]
    fn test_blob_ref_serializes_with_dollar_keys() {
        let blob = BlobRef {
            blob_type: "blob".to_string(),
            link: BlobLink {
                link: "bafk".to_string(),
            },
            mime_type: "image/jpeg".to_string(),
            size: 1,
        };
        let value = serde_json::to_value(&blob).unwrap();
        assert_eq!(value["$type"], "blob");
        assert_eq!(value["ref"]["$link"], "bafk");
        assert_eq!(value["mimeType"], "image/jpeg");
    }

    #[test]
    fn test_session_debug_hides_token() {
        let session: Session =
            serde_json::from_str(r#"{"did":"did:plc:abc","accessJwt":"secret-token"}"#).unwrap();
        let debug = format!("{session:?}");
        assert!(debug.contains("did:plc:abc"));
        assert!(!debug.contains("secret-token"));
    }
}
