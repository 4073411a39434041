//! Per-document processing orchestration.
//!
//! The pipeline fans out one independent task per document reference
//! and drives each through check → download → hash → extract → scan →
//! compress → commit. A failure in any step is contained at that
//! document's task boundary: it is logged, counted, and never cancels
//! or fails sibling documents. The batch as a whole succeeds whenever
//! it ran to completion over all documents.
//!
//! # Example
//!
//! ```no_run
//! use cagscan_core::{Database, DocumentStore, Fetcher, HttpClient, Processor};
//! use std::path::{Path, PathBuf};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(Path::new("minutes.db")).await?;
//! let store = Arc::new(DocumentStore::new(db));
//! let fetcher = Arc::new(Fetcher::new(HttpClient::new(), PathBuf::from("downloads")));
//! let processor = Processor::new(store, fetcher);
//! let stats = processor.process_all().await?;
//! println!("processed: {}, skipped: {}, failed: {}",
//!     stats.processed(), stats.skipped(), stats.failed());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::download::{FetchError, Fetcher};
use crate::extract::{ExtractError, PdfTextExtractor, TextExtractor, scan_pages};
use crate::hash;
use crate::pages::compress_pages;
use crate::store::{DocumentRef, DocumentStore, StoreError};

/// Errors that can occur while processing a single document, or while
/// starting the batch itself.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Persistence gateway operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Document could not be fetched into the cache.
    #[error("download error: {0}")]
    Download(#[from] FetchError),

    /// Document could not be decoded into page text.
    #[error("extract error: {0}")]
    Extract(#[from] ExtractError),

    /// Content digest could not be computed.
    #[error("hash error for {path}: {source}")]
    Hash {
        /// The cached file that could not be read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The blocking extraction task was cancelled or panicked.
    #[error("extraction task failed: {0}")]
    ExtractionTask(String),
}

/// Statistics from one batch run.
///
/// Uses atomic counters for thread-safe updates from concurrent
/// document tasks.
#[derive(Debug, Default)]
pub struct ProcessStats {
    processed: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

impl ProcessStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents scanned and committed this run.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    /// Returns the number of documents skipped as already processed.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Returns the number of documents that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Returns the total number of documents attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.processed() + self.skipped() + self.failed()
    }

    fn increment_processed(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Outcome of one document's pipeline run.
enum DocumentOutcome {
    /// Skipped: a processed-state row already exists for the URL.
    AlreadyProcessed,
    /// Scanned and committed, with the count of distinct identifiers.
    Committed { references: usize },
}

/// Pipeline orchestrator.
///
/// Holds the injected persistence gateway, fetcher, and text extractor
/// shared by all document tasks. The fetcher owns the download
/// capacity gate and the store owns the datastore write gate; the
/// orchestrator itself imposes no further limits, so documents overlap
/// freely in their pure stages.
pub struct Processor {
    store: Arc<DocumentStore>,
    fetcher: Arc<Fetcher>,
    extractor: Arc<dyn TextExtractor>,
}

impl Processor {
    /// Creates a processor using the production PDF text extractor.
    #[must_use]
    pub fn new(store: Arc<DocumentStore>, fetcher: Arc<Fetcher>) -> Self {
        Self::with_extractor(store, fetcher, Arc::new(PdfTextExtractor))
    }

    /// Creates a processor with an explicit text extractor.
    #[must_use]
    pub fn with_extractor(
        store: Arc<DocumentStore>,
        fetcher: Arc<Fetcher>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            store,
            fetcher,
            extractor,
        }
    }

    /// Processes every document in the reference list concurrently.
    ///
    /// Spawns one task per document and joins them all; per-document
    /// failures (download, decode, commit) are logged and counted, not
    /// propagated. Task panics are logged and counted as failures.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] only if the input reference
    /// list cannot be read; that is the sole batch-level failure.
    #[instrument(skip(self))]
    pub async fn process_all(&self) -> Result<ProcessStats, PipelineError> {
        let documents = self.store.list_documents().await?;

        info!(documents = documents.len(), "starting batch");

        let stats = Arc::new(ProcessStats::new());
        let mut handles = Vec::new();

        for document in documents {
            let store = Arc::clone(&self.store);
            let fetcher = Arc::clone(&self.fetcher);
            let extractor = Arc::clone(&self.extractor);
            let stats = Arc::clone(&stats);

            handles.push(tokio::spawn(async move {
                process_document(&store, &fetcher, &extractor, &document, &stats).await;
            }));
        }

        for handle in handles {
            // A panicked task is a failed document, never a failed batch.
            if let Err(e) = handle.await {
                warn!(error = %e, "document task panicked");
                stats.increment_failed();
            }
        }

        info!(
            processed = stats.processed(),
            skipped = stats.skipped(),
            failed = stats.failed(),
            total = stats.total(),
            "batch complete"
        );

        // All tasks are done, so we should have sole ownership of the
        // stats. If not, rebuild from the atomic values.
        match Arc::try_unwrap(stats) {
            Ok(stats) => Ok(stats),
            Err(arc_stats) => {
                let fresh = ProcessStats::new();
                fresh
                    .processed
                    .store(arc_stats.processed(), Ordering::SeqCst);
                fresh.skipped.store(arc_stats.skipped(), Ordering::SeqCst);
                fresh.failed.store(arc_stats.failed(), Ordering::SeqCst);
                Ok(fresh)
            }
        }
    }
}

/// Runs one document and records its outcome.
async fn process_document(
    store: &DocumentStore,
    fetcher: &Fetcher,
    extractor: &Arc<dyn TextExtractor>,
    document: &DocumentRef,
    stats: &ProcessStats,
) {
    debug!(title = %document.title, url = %document.url, "processing document");

    match run_document(store, fetcher, extractor, document).await {
        Ok(DocumentOutcome::AlreadyProcessed) => {
            info!(title = %document.title, "already processed");
            stats.increment_skipped();
        }
        Ok(DocumentOutcome::Committed { references }) => {
            info!(title = %document.title, references, "reference scan committed");
            stats.increment_processed();
        }
        Err(error) => {
            warn!(title = %document.title, url = %document.url, error = %error, "document processing failed");
            stats.increment_failed();
        }
    }
}

/// The per-document state machine: check → download → hash → extract →
/// scan → compress → commit.
async fn run_document(
    store: &DocumentStore,
    fetcher: &Fetcher,
    extractor: &Arc<dyn TextExtractor>,
    document: &DocumentRef,
) -> Result<DocumentOutcome, PipelineError> {
    // Skip decision is row existence alone; the stored hash is not
    // compared against the current content.
    if store.is_processed(&document.url).await? {
        return Ok(DocumentOutcome::AlreadyProcessed);
    }

    let local_path = fetcher.fetch(&document.url, &document.title).await?;

    let content_hash = hash::digest_file(&local_path)
        .await
        .map_err(|source| PipelineError::Hash {
            path: local_path.clone(),
            source,
        })?;

    let pages = {
        let extractor = Arc::clone(extractor);
        let path = local_path.clone();
        tokio::task::spawn_blocking(move || extractor.extract_pages(&path))
            .await
            .map_err(|e| PipelineError::ExtractionTask(e.to_string()))??
    };

    let locations = scan_pages(&pages);
    let references: BTreeMap<String, String> = locations
        .iter()
        .map(|(reference_id, page_set)| (reference_id.clone(), compress_pages(page_set)))
        .collect();

    store
        .commit(&document.url, &content_hash, &references)
        .await?;

    Ok(DocumentOutcome::Committed {
        references: references.len(),
    })
}
