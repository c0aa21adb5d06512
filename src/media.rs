use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
}

/// HTTP client for the two startup fetches. Cheap to clone; the underlying
/// connection pool is shared.
#[derive(Clone)]
pub struct MediaFetcher {
    client: Client,
}

impl MediaFetcher {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("beatplay/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    /// Fetch a remote audio resource as raw bytes.
    pub async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!(url, "fetching audio");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let bytes = response.bytes().await?;
        debug!(len = bytes.len(), "audio fetched");
        Ok(bytes.to_vec())
    }

    /// Fetch a remote lyrics document as text.
    pub async fn fetch_lyrics(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "fetching lyrics");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let text = response.text().await?;
        debug!(len = text.len(), "lyrics fetched");
        Ok(text)
    }
}

impl Default for MediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive a codec hint from the file extension of a URL path, ignoring any
/// query string or fragment.
pub fn extension_hint(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    let name = path.rsplit('/').next()?;
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_hint_from_plain_url() {
        assert_eq!(
            extension_hint("https://example.com/tmp/beat.mp3"),
            Some("mp3")
        );
    }

    #[test]
    fn extension_hint_ignores_query_and_fragment() {
        assert_eq!(
            extension_hint("https://example.com/a/song.flac?token=abc#t=10"),
            Some("flac")
        );
    }

    #[test]
    fn extension_hint_absent_when_path_has_none() {
        assert_eq!(extension_hint("https://example.com/lyrics"), None);
        assert_eq!(extension_hint("https://example.com/.hidden"), None);
    }
}
