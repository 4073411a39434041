//! HTTP client wrapper for downloading documents.
//!
//! This module provides the `HttpClient` struct which handles streaming
//! downloads with proper timeout configuration and error handling.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use super::error::FetchError;

/// Connection timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Total request timeout in seconds (generous for large documents).
const READ_TIMEOUT_SECS: u64 = 300;

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("cagscan/", env!("CARGO_PKG_VERSION"));

/// HTTP client for downloading documents with streaming support.
///
/// Designed to be created once and reused for every fetch, taking
/// advantage of connection pooling.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(std::time::Duration::from_secs(READ_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Downloads a URL and writes the full body to `target`.
    ///
    /// The body is streamed to a `.part` sidecar file and renamed into
    /// place only once complete, so a failed transfer never leaves a
    /// truncated file at the target path.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] / [`FetchError::Timeout`] for
    /// transport failures, [`FetchError::HttpStatus`] for non-success
    /// responses, and [`FetchError::Io`] for filesystem failures.
    #[instrument(skip(self), fields(url = %url, target = %target.display()))]
    pub async fn download_to_path(&self, url: &str, target: &Path) -> Result<(), FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::request(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        let part = partial_path(target);
        let file = File::create(&part)
            .await
            .map_err(|e| FetchError::io(&part, e))?;
        let mut writer = BufWriter::new(file);

        let mut stream = response.bytes_stream();
        let mut bytes_written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::request(url, e))?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| FetchError::io(&part, e))?;
            bytes_written += chunk.len() as u64;
        }

        writer.flush().await.map_err(|e| FetchError::io(&part, e))?;

        tokio::fs::rename(&part, target)
            .await
            .map_err(|e| FetchError::io(target, e))?;

        debug!(bytes = bytes_written, "download written to cache");
        Ok(())
    }
}

/// In-progress sidecar path for a download target.
fn partial_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}
