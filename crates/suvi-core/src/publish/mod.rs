//! Publishing the assembled post.
//!
//! Provides the [`Publisher`] abstraction, the Bluesky implementation and the
//! hashtag facet builder it uses for post text.

pub mod bluesky;
pub mod facets;
pub mod publisher;

pub use bluesky::{BlueskyPublisher, Credentials, PostRecord};
pub use facets::{Facet, RichText};
pub use publisher::Publisher;
