//! Download + enhance + sink, for the image chosen by the locator.

use std::time::Instant;

use crate::config::ProcessingConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{CandidateImage, ProcessedImage};

use super::enhance::{Enhancer, OUTPUT_MIME};
use super::sink::{ImageSink, NullSink};
use super::source::HttpSource;

/// Turns a located image into upload-ready bytes.
pub struct ImageProcessor {
    enhancer: Enhancer,
    sink: Box<dyn ImageSink>,
}

impl ImageProcessor {
    /// Create a processor that keeps nothing on disk.
    pub fn new(config: ProcessingConfig) -> Self {
        Self::with_sink(config, Box::new(NullSink))
    }

    /// Create a processor that also hands every result to `sink`.
    pub fn with_sink(config: ProcessingConfig, sink: Box<dyn ImageSink>) -> Self {
        Self {
            enhancer: Enhancer::new(config),
            sink,
        }
    }

    /// Download `candidate` and run the enhancement chain on it.
    pub async fn process(
        &self,
        source: &dyn HttpSource,
        candidate: &CandidateImage,
    ) -> PipelineResult<ProcessedImage> {
        let start = Instant::now();
        let raw = source.get_bytes(&candidate.url).await?;
        let source_size = raw.len() as u64;
        tracing::debug!("Downloaded {} ({} bytes)", candidate.file_name, source_size);

        // Pixel work is CPU-bound; keep it off the async worker.
        let enhancer = self.enhancer.clone();
        let url = candidate.url.clone();
        let enhanced = tokio::task::spawn_blocking(move || enhancer.enhance(&raw, &url))
            .await
            .map_err(|e| PipelineError::Decode {
                url: candidate.url.clone(),
                message: format!("Task join error: {e}"),
            })??;

        self.sink.write(&enhanced.bytes)?;

        tracing::info!(
            "Processed {} in {:?} ({}x{}, {} -> {} bytes)",
            candidate.file_name,
            start.elapsed(),
            enhanced.width,
            enhanced.height,
            source_size,
            enhanced.bytes.len()
        );

        Ok(ProcessedImage {
            bytes: enhanced.bytes,
            mime_type: OUTPUT_MIME.to_string(),
            width: enhanced.width,
            height: enhanced.height,
            source_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::enhance::tests::sample_png;
    use crate::pipeline::locate::tests::MockSource;
    use crate::pipeline::sink::FileSink;
    use chrono::Utc;

    fn candidate(url: &str) -> CandidateImage {
        CandidateImage {
            url: url.to_string(),
            file_name: "img.png".to_string(),
            captured_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_process_downloads_and_encodes() {
        let url = "https://example.test/img.png";
        let source = MockSource::new().with_bytes(url, sample_png(80, 100));
        let processor = ImageProcessor::new(ProcessingConfig::default());

        let out = processor.process(&source, &candidate(url)).await.unwrap();
        assert_eq!((out.width, out.height), (80, 100));
        assert_eq!(out.mime_type, "image/jpeg");
        assert!(out.source_size > 0);
    }

    #[tokio::test]
    async fn test_process_writes_to_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.jpg");
        let url = "https://example.test/img.png";
        let source = MockSource::new().with_bytes(url, sample_png(64, 64));
        let processor = ImageProcessor::with_sink(
            ProcessingConfig::default(),
            Box::new(FileSink::new(&path)),
        );

        let out = processor.process(&source, &candidate(url)).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), out.bytes);
    }

    #[tokio::test]
    async fn test_process_propagates_decode_error() {
        let url = "https://example.test/img.png";
        let source = MockSource::new().with_bytes(url, b"not an image".to_vec());
        let processor = ImageProcessor::new(ProcessingConfig::default());

        let err = processor.process(&source, &candidate(url)).await.unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }
}
