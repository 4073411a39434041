//! Cache-aware document fetching behind a fixed capacity gate.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument};

use super::client::HttpClient;
use super::error::FetchError;
use super::filename::cache_filename;

/// Maximum number of concurrent fetches, system-wide.
///
/// Bounds outbound network and cache-write concurrency regardless of
/// how many documents a batch contains.
pub const DOWNLOAD_CONCURRENCY: usize = 3;

/// Idempotent, concurrency-bounded document fetcher.
///
/// Every fetch acquires one of [`DOWNLOAD_CONCURRENCY`] permits before
/// touching the network or the cache directory; the permit is released
/// when the fetch ends, success or failure (RAII). A document already
/// present in the cache is returned without any network access.
#[derive(Debug)]
pub struct Fetcher {
    client: HttpClient,
    cache_dir: PathBuf,
    permits: Arc<Semaphore>,
}

impl Fetcher {
    /// Creates a fetcher that caches documents under `cache_dir`.
    ///
    /// The directory must already exist; the binary creates it at
    /// startup.
    #[must_use]
    pub fn new(client: HttpClient, cache_dir: PathBuf) -> Self {
        Self {
            client,
            cache_dir,
            permits: Arc::new(Semaphore::new(DOWNLOAD_CONCURRENCY)),
        }
    }

    /// Returns the cache directory this fetcher writes into.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Fetches a document into the cache and returns its local path.
    ///
    /// The local filename is a pure function of the URL, so a file left
    /// by a previous run satisfies the fetch with zero network
    /// requests.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on invalid URLs, transport or HTTP
    /// failures, and cache I/O failures. Callers treat any error as
    /// "skip this document"; it never aborts the batch.
    #[instrument(skip(self, title), fields(url = %url))]
    pub async fn fetch(&self, url: &str, title: &str) -> Result<PathBuf, FetchError> {
        let file_name = cache_filename(url)?;
        let target = self.cache_dir.join(file_name);

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchError::CapacityGateClosed)?;

        match tokio::fs::try_exists(&target).await {
            Ok(true) => {
                debug!(path = %target.display(), "cache hit, skipping download");
                return Ok(target);
            }
            Ok(false) => {}
            Err(e) => return Err(FetchError::io(&target, e)),
        }

        info!(title = %title, "downloading");
        self.client.download_to_path(url, &target).await?;
        debug!(path = %target.display(), "download complete");

        Ok(target)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Network behavior (idempotence, concurrency bound, failure
    // reporting) is covered by tests/pipeline_integration.rs with a
    // mock HTTP server; these tests cover the cache-path contract.

    #[tokio::test]
    async fn test_fetch_returns_cached_file_without_network() {
        let cache = tempfile::tempdir().unwrap();
        std::fs::write(cache.path().join("jan.pdf"), b"cached bytes").unwrap();

        // The URL's host does not resolve; a cache miss would error.
        let fetcher = Fetcher::new(HttpClient::new(), cache.path().to_path_buf());
        let path = fetcher
            .fetch("http://cagscan.invalid/minutes/jan.pdf", "January")
            .await
            .unwrap();

        assert_eq!(path, cache.path().join("jan.pdf"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_url_before_taking_a_permit() {
        let cache = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(HttpClient::new(), cache.path().to_path_buf());

        let result = fetcher.fetch("::not a url::", "Broken").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }
}
