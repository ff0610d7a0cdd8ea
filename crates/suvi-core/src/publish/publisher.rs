//! Publisher trait.

use async_trait::async_trait;

use crate::error::PublishError;
use crate::types::{Post, PublishReceipt};

/// Something that can publish a finished [`Post`].
///
/// Uses `async_trait` so the run loop can hold a `Box<dyn Publisher>`.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Name for logging (e.g., "bluesky").
    fn name(&self) -> &str;

    /// Publish the post. One call, one post.
    async fn publish(&self, post: &Post) -> Result<PublishReceipt, PublishError>;
}
