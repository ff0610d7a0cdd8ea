//! SUVI Core - fetch, enhance and post the latest GOES-16 SUVI solar image.
//!
//! # Architecture
//!
//! One run is a straight line with no retries:
//!
//! ```text
//! Listing → Locate latest → Download → Enhance → Caption → Bluesky
//! ```
//!
//! Every stage returns a `Result`; the first failure ends the run and is
//! returned from [`Suvi::run`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use suvi_core::{Config, RunOptions, Suvi};
//!
//! #[tokio::main]
//! async fn main() -> suvi_core::Result<()> {
//!     let config = Config::load()?;
//!     let suvi = Suvi::new(config, RunOptions::default())?;
//!     let report = suvi.run().await?;
//!     println!("Posted: {}", report.caption);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod publish;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, PublishError, Result, SuviError};
pub use pipeline::{HttpSource, ImageLocator, ImageProcessor, ImageSink, PostAssembler};
pub use publish::{BlueskyPublisher, Publisher};
pub use types::{BlobRef, CandidateImage, Post, ProcessedImage, PublishReceipt};

use serde::Serialize;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options for a single run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Locate, process and caption, but do not publish
    pub dry_run: bool,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// The image that was selected
    pub image: CandidateImage,
    /// Caption without hashtags
    pub caption: String,
    /// Processed image size in bytes
    pub bytes: usize,
    pub width: u32,
    pub height: u32,
    /// Present unless this was a dry run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<PublishReceipt>,
}

/// The poster - wires the four stages together.
pub struct Suvi {
    source: Box<dyn HttpSource>,
    locator: ImageLocator,
    processor: ImageProcessor,
    assembler: PostAssembler,
    publisher: Option<Box<dyn Publisher>>,
}

impl Suvi {
    /// Build a poster backed by real HTTP and Bluesky.
    ///
    /// Credentials are resolved here unless `options.dry_run` is set, so a
    /// misconfigured account fails before any network traffic.
    pub fn new(config: Config, options: RunOptions) -> Result<Self> {
        tracing::debug!("Initializing suvi v{}", VERSION);
        let source = pipeline::ReqwestSource::new(&config.limits)?;
        let sink = pipeline::sink_for(config.save_path());
        let publisher: Option<Box<dyn Publisher>> = if options.dry_run {
            None
        } else {
            Some(Box::new(BlueskyPublisher::new(
                &config.bluesky,
                &config.limits,
            )?))
        };
        Ok(Self::from_parts(&config, Box::new(source), sink, publisher))
    }

    /// Assemble a poster from explicit parts.
    pub fn from_parts(
        config: &Config,
        source: Box<dyn HttpSource>,
        sink: Box<dyn ImageSink>,
        publisher: Option<Box<dyn Publisher>>,
    ) -> Self {
        Self {
            source,
            locator: ImageLocator::new(config.feed.clone()),
            processor: ImageProcessor::with_sink(config.processing.clone(), sink),
            assembler: PostAssembler::new(config.feed.timestamp_token),
            publisher,
        }
    }

    /// Run Locate → Process → Assemble → Publish once.
    pub async fn run(&self) -> Result<RunReport> {
        let image = self.locator.locate(self.source.as_ref()).await?;
        let processed = self.processor.process(self.source.as_ref(), &image).await?;
        let post = self.assembler.assemble(&image, processed)?;

        let receipt = match &self.publisher {
            Some(publisher) => {
                tracing::debug!("Publishing via {}", publisher.name());
                Some(publisher.publish(&post).await?)
            }
            None => {
                tracing::info!("Dry run: not publishing '{}'", post.caption);
                None
            }
        };

        Ok(RunReport {
            bytes: post.image.bytes.len(),
            width: post.image.width,
            height: post.image.height,
            caption: post.caption,
            image,
            receipt,
        })
    }
}
