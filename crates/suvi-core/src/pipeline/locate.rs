//! Latest-image selection from the SUVI directory listing.
//!
//! SUVI filenames look like
//! `or_suvi-l2-ci171_g16_s20240615T132645Z_e20240615T133045Z_v1-0-2.png`:
//! underscore-delimited, with one-letter-prefixed timestamps. The token at
//! `FeedConfig::timestamp_token` decides which image is the most recent.

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use reqwest::Url;
use std::sync::OnceLock;

use crate::config::FeedConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::CandidateImage;

use super::source::HttpSource;

/// Layout of the timestamp token once its prefix letter is removed.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

fn href_pattern() -> &'static Regex {
    static HREF: OnceLock<Regex> = OnceLock::new();
    HREF.get_or_init(|| Regex::new(r#"href="([^"]+)""#).expect("href pattern is a valid regex"))
}

/// Return the raw timestamp digits (`YYYYMMDDTHHMMSSZ`) embedded in a filename.
pub fn timestamp_token(file_name: &str, token_index: usize) -> PipelineResult<&str> {
    let token = file_name
        .split('_')
        .nth(token_index)
        .ok_or_else(|| PipelineError::Timestamp {
            name: file_name.to_string(),
            message: format!("fewer than {} '_'-separated tokens", token_index + 1),
        })?;

    // Skip the one-letter prefix ('s' / 'e'); get() keeps us on char boundaries.
    let digits = token
        .char_indices()
        .nth(1)
        .and_then(|(i, _)| token.get(i..))
        .unwrap_or("");
    if digits.len() != 16 || !digits.is_ascii() {
        return Err(PipelineError::Timestamp {
            name: file_name.to_string(),
            message: format!("token '{token}' is not a prefixed YYYYMMDDTHHMMSSZ timestamp"),
        });
    }
    Ok(digits)
}

/// Parse the capture time embedded in a filename.
pub fn parse_timestamp(file_name: &str, token_index: usize) -> PipelineResult<DateTime<Utc>> {
    let digits = timestamp_token(file_name, token_index)?;
    NaiveDateTime::parse_from_str(digits, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| PipelineError::Timestamp {
            name: file_name.to_string(),
            message: e.to_string(),
        })
}

/// Parse the listing URL as a directory, so relative hrefs resolve inside it.
fn listing_base(base_url: &str) -> PipelineResult<Url> {
    let dir = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };
    Url::parse(&dir).map_err(|e| PipelineError::Fetch {
        url: base_url.to_string(),
        message: format!("invalid listing URL: {e}"),
        status_code: None,
    })
}

/// Pick the most recent matching image from a listing body.
///
/// Links whose timestamp token does not parse are logged and skipped. On equal
/// timestamps the entry listed first wins.
pub fn select_latest(
    body: &str,
    base_url: &str,
    marker: &str,
    token_index: usize,
) -> PipelineResult<CandidateImage> {
    let base = listing_base(base_url)?;
    let mut latest: Option<CandidateImage> = None;
    let mut seen = 0usize;

    for caps in href_pattern().captures_iter(body) {
        let href = &caps[1];
        if !href.contains(marker) {
            continue;
        }
        seen += 1;

        let file_name = href.rsplit('/').next().unwrap_or(href);
        let captured_at = match parse_timestamp(file_name, token_index) {
            Ok(ts) => ts,
            Err(e) => {
                tracing::warn!("Skipping listing entry: {e}");
                continue;
            }
        };

        let newer = latest
            .as_ref()
            .map_or(true, |current| captured_at > current.captured_at);
        if newer {
            let url = match base.join(href) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Skipping listing entry {href}: {e}");
                    continue;
                }
            };
            latest = Some(CandidateImage {
                url: url.into(),
                file_name: file_name.to_string(),
                captured_at,
            });
        }
    }

    tracing::debug!("Listing had {seen} links matching '{marker}'");
    latest.ok_or_else(|| PipelineError::NoCandidates {
        url: base_url.to_string(),
        marker: marker.to_string(),
    })
}

/// Finds the newest image in the configured listing.
pub struct ImageLocator {
    config: FeedConfig,
}

impl ImageLocator {
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }

    /// Fetch the listing and return its most recent image.
    pub async fn locate(&self, source: &dyn HttpSource) -> PipelineResult<CandidateImage> {
        let url = &self.config.listing_url;
        tracing::debug!("Fetching listing {url}");
        let body = source.get_text(url).await?;

        let latest = select_latest(
            &body,
            url,
            &self.config.filename_marker,
            self.config.timestamp_token,
        )?;
        tracing::info!("Latest image: {} ({})", latest.url, latest.captured_at);
        Ok(latest)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const BASE: &str = "https://services.swpc.noaa.gov/images/animations/suvi/primary/171/";

    pub(crate) fn suvi_name(end: &str) -> String {
        format!("or_suvi-l2-ci171_g16_s20240615T095600Z_e{end}_v1-0-2.png")
    }

    pub(crate) fn listing(names: &[String]) -> String {
        let mut body = String::from("<html><body><pre><a href=\"../\">../</a>\n");
        for name in names {
            body.push_str(&format!("<a href=\"{name}\">{name}</a>   15-Jun-2024 13:31  812K\n"));
        }
        body.push_str("</pre></body></html>");
        body
    }

    /// Serves canned bodies keyed by URL and counts requests.
    pub(crate) struct MockSource {
        pub(crate) texts: HashMap<String, String>,
        pub(crate) bytes: HashMap<String, Vec<u8>>,
        pub(crate) calls: Arc<AtomicU32>,
    }

    impl MockSource {
        pub(crate) fn new() -> Self {
            Self {
                texts: HashMap::new(),
                bytes: HashMap::new(),
                calls: Arc::new(AtomicU32::new(0)),
            }
        }

        pub(crate) fn with_text(mut self, url: &str, body: String) -> Self {
            self.texts.insert(url.to_string(), body);
            self
        }

        pub(crate) fn with_bytes(mut self, url: &str, body: Vec<u8>) -> Self {
            self.bytes.insert(url.to_string(), body);
            self
        }
    }

    fn not_found(url: &str) -> PipelineError {
        PipelineError::Fetch {
            url: url.to_string(),
            message: "HTTP 404 Not Found".to_string(),
            status_code: Some(404),
        }
    }

    #[async_trait]
    impl HttpSource for MockSource {
        async fn get_text(&self, url: &str) -> PipelineResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.texts.get(url).cloned().ok_or_else(|| not_found(url))
        }

        async fn get_bytes(&self, url: &str) -> PipelineResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bytes.get(url).cloned().ok_or_else(|| not_found(url))
        }
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp(&suvi_name("20240615T133045Z"), 4).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 6, 15, 13, 30, 45).unwrap());
    }

    #[test]
    fn test_parse_timestamp_rejects_short_name() {
        let err = parse_timestamp("or_suvi_only.png", 4).unwrap_err();
        assert!(matches!(err, PipelineError::Timestamp { .. }));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage_token() {
        let err = parse_timestamp("or_suvi-l2-ci171_g16_sX_e2024061XT133045Z_v1.png", 4);
        assert!(err.is_err());
    }

    #[test]
    fn test_select_latest_ignores_listing_order() {
        let a = suvi_name("20240615T100000Z");
        let b = suvi_name("20240615T120000Z");
        let orders = [
            vec![a.clone(), b.clone()],
            vec![b.clone(), a.clone()],
        ];
        for names in orders {
            let latest = select_latest(&listing(&names), BASE, "or_suvi", 4).unwrap();
            assert_eq!(latest.file_name, b);
        }
    }

    #[test]
    fn test_select_latest_first_wins_on_tie() {
        let a = suvi_name("20240615T120000Z");
        let b = a.replace("_s20240615T095600Z_", "_s20240615T095700Z_");
        let latest = select_latest(&listing(&[a.clone(), b]), BASE, "or_suvi", 4).unwrap();
        assert_eq!(latest.file_name, a);
    }

    #[test]
    fn test_select_latest_skips_malformed_and_foreign_links() {
        let good = suvi_name("20240615T110000Z");
        let names = vec![
            "or_suvi-broken.png".to_string(),
            "thumbnail_g16_x_y_e20990101T000000Z.png".to_string(),
            good.clone(),
        ];
        let latest = select_latest(&listing(&names), BASE, "or_suvi", 4).unwrap();
        assert_eq!(latest.file_name, good);
        assert_eq!(latest.url, format!("{BASE}{good}"));
    }

    #[test]
    fn test_select_latest_empty_listing() {
        let err = select_latest(&listing(&[]), BASE, "or_suvi", 4).unwrap_err();
        assert!(matches!(err, PipelineError::NoCandidates { .. }));
    }

    #[test]
    fn test_listing_base_joins_hrefs() {
        let join = |base: &str, href: &str| listing_base(base).unwrap().join(href).unwrap().to_string();
        assert_eq!(join("https://x/dir/", "a.png"), "https://x/dir/a.png");
        assert_eq!(join("https://x/dir", "a.png"), "https://x/dir/a.png");
        assert_eq!(join("https://x/dir/", "https://y/b.png"), "https://y/b.png");
        assert_eq!(join("https://x/dir/", "/images/a.png"), "https://x/images/a.png");
        assert_eq!(join("https://x/dir/sub/", "../a.png"), "https://x/dir/a.png");
    }

    #[test]
    fn test_select_latest_resolves_root_relative_href() {
        let name = suvi_name("20240615T120000Z");
        let body = format!("<a href=\"/images/suvi/{name}\">{name}</a>");
        let latest = select_latest(&body, BASE, "or_suvi", 4).unwrap();
        assert_eq!(
            latest.url,
            format!("https://services.swpc.noaa.gov/images/suvi/{name}")
        );
        assert_eq!(latest.file_name, name);
    }

    #[test]
    fn test_select_latest_rejects_invalid_listing_url() {
        let names = vec![suvi_name("20240615T120000Z")];
        let err = select_latest(&listing(&names), "not a url", "or_suvi", 4).unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_locate_picks_noon_image_from_stubbed_listing() {
        let names = vec![
            suvi_name("20240615T100000Z"),
            suvi_name("20240615T120000Z"),
            suvi_name("20240615T110000Z"),
        ];
        let source = MockSource::new().with_text(BASE, listing(&names));
        let calls = source.calls.clone();

        let locator = ImageLocator::new(FeedConfig::default());
        let latest = locator.locate(&source).await.unwrap();

        assert!(latest.file_name.contains("T120000Z"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_locate_propagates_fetch_error() {
        let locator = ImageLocator::new(FeedConfig::default());
        let err = locator.locate(&MockSource::new()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Fetch {
                status_code: Some(404),
                ..
            }
        ));
    }
}
