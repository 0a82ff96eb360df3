//! Network tier: where downloaded documents come from.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::types::TierError;

/// Default bound on a single download, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

const USER_AGENT: &str = concat!("wailt-metadata/", env!("CARGO_PKG_VERSION"));

/// A remote origin that can produce the raw text of a document.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Human-readable label used in log messages.
    fn label(&self) -> &str;

    /// Download `url` and return its body as text.
    async fn fetch_text(&self, url: &Url) -> Result<String, TierError>;
}

/// HTTP(S) source backed by reqwest.
///
/// One attempt per call: no retries, bounded by the configured timeout.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a new HTTP source whose requests give up after `timeout_ms`.
    pub fn new(timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self { client }
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    fn label(&self) -> &str {
        "http"
    }

    async fn fetch_text(&self, url: &Url) -> Result<String, TierError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TierError::Network(format!("GET {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TierError::Status(status.as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| TierError::Network(format!("reading body of {url} failed: {e}")))?;

        // Kept byte-for-byte; no lossy replacement of invalid UTF-8.
        Ok(String::from_utf8(body.to_vec())?)
    }
}
