//! Document fetching with an idempotent local cache.
//!
//! This module downloads referenced documents over HTTP/HTTPS into a
//! local cache directory, bounded by a fixed concurrency limit.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Deterministic cache filenames derived from URLs
//! - Skip-if-cached: a present file means zero network requests
//! - Capacity gate limiting concurrent fetches to [`DOWNLOAD_CONCURRENCY`]
//! - Structured error types with full context
//!
//! # Example
//!
//! ```no_run
//! use cagscan_core::download::{Fetcher, HttpClient};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::new(HttpClient::new(), PathBuf::from("./downloads"));
//! let path = fetcher
//!     .fetch("https://example.com/minutes/jan.pdf", "January minutes")
//!     .await?;
//! println!("Cached at: {}", path.display());
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod fetcher;
mod filename;

pub use client::HttpClient;
pub use error::FetchError;
pub use fetcher::{DOWNLOAD_CONCURRENCY, Fetcher};
pub use filename::cache_filename;
