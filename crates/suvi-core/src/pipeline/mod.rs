//! Image pipeline components.
//!
//! - **source**: HTTP reads behind a mockable trait
//! - **locate**: Pick the newest image from the directory listing
//! - **enhance**: Crop, pad, colour adjustments, sharpen, JPEG encode
//! - **sink**: Optional local copy of the processed image
//! - **processor**: Download + enhance + sink
//! - **assemble**: Caption formatting and post assembly

pub mod assemble;
pub mod enhance;
pub mod locate;
pub mod processor;
pub mod sink;
pub mod source;

// Re-exports for convenient access
pub use assemble::{caption_from_filename, PostAssembler};
pub use enhance::{EnhancedImage, Enhancer};
pub use locate::{select_latest, ImageLocator};
pub use processor::ImageProcessor;
pub use sink::{sink_for, FileSink, ImageSink, NullSink};
pub use source::{HttpSource, ReqwestSource};
