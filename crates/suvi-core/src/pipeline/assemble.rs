//! Caption formatting and post assembly.

use crate::error::PipelineResult;
use crate::types::{CandidateImage, Post, ProcessedImage};

use super::locate::timestamp_token;

/// Format the filename timestamp as `YYYY-MM-DD HH:MM:SSZ`.
///
/// Works on the raw token digits, so a well-formed token like
/// `e20240615T133045Z` becomes `2024-06-15 13:30:45Z`.
pub fn caption_from_filename(file_name: &str, token_index: usize) -> PipelineResult<String> {
    let d = timestamp_token(file_name, token_index)?;
    Ok(format!(
        "{}-{}-{} {}:{}:{}Z",
        &d[0..4],
        &d[4..6],
        &d[6..8],
        &d[9..11],
        &d[11..13],
        &d[13..15]
    ))
}

/// Pairs the processed image with its caption.
pub struct PostAssembler {
    token_index: usize,
}

impl PostAssembler {
    pub fn new(token_index: usize) -> Self {
        Self { token_index }
    }

    pub fn assemble(&self, source: &CandidateImage, image: ProcessedImage) -> PipelineResult<Post> {
        let caption = caption_from_filename(&source.file_name, self.token_index)?;
        tracing::debug!("Caption: {caption}");
        Ok(Post {
            image,
            alt: caption.clone(),
            caption,
        })
    }
}
