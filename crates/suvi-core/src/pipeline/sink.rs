//! Optional destination for the processed image besides the upload.

use std::path::PathBuf;

use crate::error::{PipelineError, PipelineResult};

/// Receives the encoded image once per run.
pub trait ImageSink: Send + Sync {
    fn write(&self, bytes: &[u8]) -> PipelineResult<()>;
}

/// Discards everything. The production default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ImageSink for NullSink {
    fn write(&self, _bytes: &[u8]) -> PipelineResult<()> {
        Ok(())
    }
}

/// Writes the image to a fixed path, creating parent directories.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSink for FileSink {
    fn write(&self, bytes: &[u8]) -> PipelineResult<()> {
        let to_err = |source| PipelineError::Sink {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(to_err)?;
        }
        std::fs::write(&self.path, bytes).map_err(to_err)?;
        tracing::info!("Saved processed image to {}", self.path.display());
        Ok(())
    }
}

/// Pick the sink for an optional debug path.
pub fn sink_for(path: Option<PathBuf>) -> Box<dyn ImageSink> {
    match path {
        Some(path) => Box::new(FileSink::new(path)),
        None => Box::new(NullSink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink_accepts_anything() {
        assert!(NullSink.write(&[1, 2, 3]).is_ok());
    }

    #[test]
    fn test_file_sink_writes_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("image.jpg");
        let sink = FileSink::new(&path);

        sink.write(b"jpeg-bytes").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg-bytes");
    }

    #[test]
    fn test_file_sink_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be overwritten as a file.
        let sink = FileSink::new(dir.path());
        let err = sink.write(b"x").unwrap_err();
        match err {
            PipelineError::Sink { path, .. } => assert_eq!(path, dir.path()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
