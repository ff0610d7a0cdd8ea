//! Post text with hashtag facets.
//!
//! Bluesky facets address UTF-8 byte ranges of the post text. [`RichText`]
//! records each range while appending the hashtag, so the offsets always
//! match the text that is actually sent.

use serde::Serialize;

/// Facet feature type for hashtags.
pub const TAG_FEATURE: &str = "app.bsky.richtext.facet#tag";

/// A byte range plus what it means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facet {
    pub index: ByteSlice,
    pub features: Vec<FacetFeature>,
}

/// Half-open UTF-8 byte range into the post text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteSlice {
    #[serde(rename = "byteStart")]
    pub byte_start: usize,
    #[serde(rename = "byteEnd")]
    pub byte_end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "$type")]
pub enum FacetFeature {
    #[serde(rename = "app.bsky.richtext.facet#tag")]
    Tag { tag: String },
}

/// Post text under construction.
#[derive(Debug, Clone, Default)]
pub struct RichText {
    text: String,
    facets: Vec<Facet>,
}

impl RichText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            facets: Vec::new(),
        }
    }

    /// Caption followed by ` #Tag` for every entry of `hashtags`.
    pub fn with_hashtags<S: AsRef<str>>(caption: &str, hashtags: &[S]) -> Self {
        let mut rich = Self::new(caption);
        for tag in hashtags {
            rich.push_hashtag(tag.as_ref());
        }
        rich
    }

    /// Append ` #tag` and a facet covering `#tag`.
    ///
    /// The facet's tag value is lower-cased, the visible text keeps its case.
    pub fn push_hashtag(&mut self, tag: &str) -> &mut Self {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        let byte_start = self.text.len();
        self.text.push('#');
        self.text.push_str(tag);
        let byte_end = self.text.len();

        self.facets.push(Facet {
            index: ByteSlice {
                byte_start,
                byte_end,
            },
            features: vec![FacetFeature::Tag {
                tag: tag.to_lowercase(),
            }],
        });
        self
    }

    pub fn into_parts(self) -> (String, Vec<Facet>) {
        (self.text, self.facets)
    }
}
