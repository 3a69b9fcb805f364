//! # Document Fetcher Seam
//!
//! Fetching is the first suspension point of a registration attempt and the
//! only part of validation that touches the network, so it sits behind a
//! trait: tests serve documents from memory, production uses reqwest with
//! an explicit timeout.
//!
//! Timeouts, connection errors, and non-2xx statuses are all `Fetch`
//! errors — no partial success.

use std::future::Future;
use std::time::Duration;

use opdsreg_core::RegistryError;

/// A fetched document plus the URL that finally served it (after
/// redirects). The document's `id` must match this final URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    /// Raw response body.
    pub bytes: Vec<u8>,
    /// The URL that served the body, post-redirect.
    pub final_url: String,
}

/// Fetches authentication documents.
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document at `url`.
    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<FetchedDocument, RegistryError>> + Send;
}

/// reqwest-backed [`DocumentFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Fetch(format!("fetcher client: {e}")))?;
        Ok(Self { client })
    }
}

impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, RegistryError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!(url, error = %e, "document fetch failed");
            RegistryError::Fetch(format!("error retrieving document at {url}: {e}"))
        })?;
        if !response.status().is_success() {
            return Err(RegistryError::Fetch(format!(
                "document at {url} returned status {}",
                response.status()
            )));
        }
        let final_url = response.url().to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RegistryError::Fetch(format!("error reading document body: {e}")))?;
        Ok(FetchedDocument {
            bytes: bytes.to_vec(),
            final_url,
        })
    }
}
