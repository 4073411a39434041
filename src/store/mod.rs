//! Persistence gateway for the shared minutes database.
//!
//! This module is the single point of contact with the `SQLite`
//! datastore. All operations funnel through one write gate so only one
//! attempt touches the database at a time, matching SQLite's
//! single-writer locking model, and every attempt that fails with a
//! busy/locked classification is retried with a linear backoff.
//!
//! # Overview
//!
//! The gateway consists of:
//! - [`DocumentStore`] - Main interface for persistence operations
//! - [`DocumentRef`] / [`ProcessedDocument`] / [`ReferenceLocation`] - Row types
//! - [`StoreError`] - Operation error types with busy/locked classification
//!
//! # Example
//!
//! ```ignore
//! use cagscan_core::{Database, DocumentStore};
//! use std::collections::BTreeMap;
//!
//! let db = Database::new(Path::new("minutes.db")).await?;
//! let store = DocumentStore::new(db);
//!
//! if !store.is_processed("https://example.com/jan.pdf").await? {
//!     let mut references = BTreeMap::new();
//!     references.insert("22/CAG/0099".to_string(), "p3-p5".to_string());
//!     store.commit("https://example.com/jan.pdf", "ab12...", &references).await?;
//! }
//! ```

mod error;
mod record;

pub use error::{StoreDbErrorKind, StoreError};
pub use record::{DocumentRef, ProcessedDocument, ReferenceLocation};

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use sqlx::Row;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{instrument, warn};

use crate::db::Database;

/// Total attempts per operation, including the first.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Base delay between attempts; multiplied by the attempt index.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Result type for persistence gateway operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence gateway owning the database handle and its write gate.
///
/// One instance is shared (via `Arc`) by all concurrent document tasks;
/// the internal mutex guarantees a single in-flight database attempt
/// across the whole process.
#[derive(Debug)]
pub struct DocumentStore {
    db: Database,
    write_gate: Mutex<()>,
}

impl DocumentStore {
    /// Creates a new gateway over the given database connection.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self {
            db,
            write_gate: Mutex::new(()),
        }
    }

    /// Runs one fallible datastore operation under the write gate,
    /// retrying on busy/locked classifications.
    ///
    /// The gate is held for the duration of a single attempt and
    /// released before any backoff sleep, so other pending operations
    /// are not starved by a contended one. Non-contention errors are
    /// returned immediately; exhausting all attempts yields
    /// [`StoreError::RetriesExhausted`].
    async fn run_serialized<T, F, Fut>(&self, op_name: &'static str, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let outcome = {
                let _gate = self.write_gate.lock().await;
                op().await
            };
            match outcome {
                Err(error) if error.is_busy_or_locked() => {
                    if attempt >= MAX_WRITE_ATTEMPTS {
                        return Err(StoreError::RetriesExhausted {
                            attempts: attempt,
                            message: error.to_string(),
                        });
                    }
                    let delay = RETRY_BASE_DELAY * attempt;
                    warn!(
                        op = op_name,
                        attempt,
                        delay_ms = delay.as_millis(),
                        "datastore busy, backing off"
                    );
                    sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    /// Checks whether a document URL already has a processed-state row.
    ///
    /// This is the pipeline's skip decision: row existence alone, with
    /// no hash comparison.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails, or
    /// [`StoreError::RetriesExhausted`] after repeated contention.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn is_processed(&self, url: &str) -> Result<bool> {
        let pool = self.db.pool().clone();
        let url = url.to_owned();
        self.run_serialized("is_processed", move || {
            let pool = pool.clone();
            let url = url.clone();
            async move {
                let row = sqlx::query(
                    r"SELECT COUNT(*) as count FROM processed_documents WHERE url = ?",
                )
                .bind(&url)
                .fetch_one(&pool)
                .await?;

                Ok(row.get::<i64, _>("count") > 0)
            }
        })
        .await
    }

    /// Commits a completed scan for one document in a single transaction.
    ///
    /// Upserts the processed-state row, deletes every existing
    /// reference-location row for the URL, and inserts one row per
    /// entry of `references` (identifier → compressed page ranges).
    /// The replacement is all-or-nothing: a failure at any point rolls
    /// the whole transaction back.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the transaction fails, or
    /// [`StoreError::RetriesExhausted`] after repeated contention.
    #[instrument(skip(self, references), fields(url = %url, references = references.len()))]
    pub async fn commit(
        &self,
        url: &str,
        content_hash: &str,
        references: &BTreeMap<String, String>,
    ) -> Result<()> {
        let pool = self.db.pool().clone();
        let url = url.to_owned();
        let content_hash = content_hash.to_owned();
        let references = references.clone();
        self.run_serialized("commit", move || {
            let pool = pool.clone();
            let url = url.clone();
            let content_hash = content_hash.clone();
            let references = references.clone();
            async move {
                let mut tx = pool.begin().await?;

                sqlx::query(
                    r"INSERT INTO processed_documents (url, content_hash, processed_at)
                      VALUES (?, ?, datetime('now'))
                      ON CONFLICT(url) DO UPDATE SET
                          content_hash = excluded.content_hash,
                          processed_at = excluded.processed_at",
                )
                .bind(&url)
                .bind(&content_hash)
                .execute(&mut *tx)
                .await?;

                sqlx::query(r"DELETE FROM reference_locations WHERE document_url = ?")
                    .bind(&url)
                    .execute(&mut *tx)
                    .await?;

                for (reference_id, page_ranges) in &references {
                    sqlx::query(
                        r"INSERT INTO reference_locations
                              (document_url, reference_id, page_ranges, processed_at)
                          VALUES (?, ?, ?, datetime('now'))",
                    )
                    .bind(&url)
                    .bind(reference_id)
                    .bind(page_ranges)
                    .execute(&mut *tx)
                    .await?;
                }

                tx.commit().await?;
                Ok(())
            }
        })
        .await
    }

    /// Reads the full reference-discovery list in discovery order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails, or
    /// [`StoreError::RetriesExhausted`] after repeated contention.
    #[instrument(skip(self))]
    pub async fn list_documents(&self) -> Result<Vec<DocumentRef>> {
        let pool = self.db.pool().clone();
        self.run_serialized("list_documents", move || {
            let pool = pool.clone();
            async move {
                let documents = sqlx::query_as::<_, DocumentRef>(
                    r"SELECT id, title, url FROM minutes ORDER BY id ASC",
                )
                .fetch_all(&pool)
                .await?;

                Ok(documents)
            }
        })
        .await
    }

    /// Adds one document reference to the discovery list.
    ///
    /// This is the ingestion boundary used by the upstream minutes
    /// crawler (and by tests to seed inputs).
    ///
    /// # Returns
    ///
    /// The ID of the newly created row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the insert fails, or
    /// [`StoreError::RetriesExhausted`] after repeated contention.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn add_document(&self, url: &str, title: &str) -> Result<i64> {
        let pool = self.db.pool().clone();
        let url = url.to_owned();
        let title = title.to_owned();
        self.run_serialized("add_document", move || {
            let pool = pool.clone();
            let url = url.clone();
            let title = title.clone();
            async move {
                let row = sqlx::query(r"INSERT INTO minutes (title, url) VALUES (?, ?) RETURNING id")
                    .bind(&title)
                    .bind(&url)
                    .fetch_one(&pool)
                    .await?;

                Ok(row.get("id"))
            }
        })
        .await
    }

    /// Reads the processed-state row for a URL, when one exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails, or
    /// [`StoreError::RetriesExhausted`] after repeated contention.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_processed(&self, url: &str) -> Result<Option<ProcessedDocument>> {
        let pool = self.db.pool().clone();
        let url = url.to_owned();
        self.run_serialized("get_processed", move || {
            let pool = pool.clone();
            let url = url.clone();
            async move {
                let document = sqlx::query_as::<_, ProcessedDocument>(
                    r"SELECT url, content_hash, processed_at
                      FROM processed_documents WHERE url = ?",
                )
                .bind(&url)
                .fetch_optional(&pool)
                .await?;

                Ok(document)
            }
        })
        .await
    }

    /// Lists the reference locations recorded for one document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails, or
    /// [`StoreError::RetriesExhausted`] after repeated contention.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn locations_for_document(&self, url: &str) -> Result<Vec<ReferenceLocation>> {
        let pool = self.db.pool().clone();
        let url = url.to_owned();
        self.run_serialized("locations_for_document", move || {
            let pool = pool.clone();
            let url = url.clone();
            async move {
                let locations = sqlx::query_as::<_, ReferenceLocation>(
                    r"SELECT id, document_url, reference_id, page_ranges, processed_at
                      FROM reference_locations
                      WHERE document_url = ?
                      ORDER BY reference_id ASC",
                )
                .bind(&url)
                .fetch_all(&pool)
                .await?;

                Ok(locations)
            }
        })
        .await
    }

    /// Lists every document a reference identifier was found in.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails, or
    /// [`StoreError::RetriesExhausted`] after repeated contention.
    #[instrument(skip(self), fields(reference_id = %reference_id))]
    pub async fn locations_for_reference(
        &self,
        reference_id: &str,
    ) -> Result<Vec<ReferenceLocation>> {
        let pool = self.db.pool().clone();
        let reference_id = reference_id.to_owned();
        self.run_serialized("locations_for_reference", move || {
            let pool = pool.clone();
            let reference_id = reference_id.clone();
            async move {
                let locations = sqlx::query_as::<_, ReferenceLocation>(
                    r"SELECT id, document_url, reference_id, page_ranges, processed_at
                      FROM reference_locations
                      WHERE reference_id = ?
                      ORDER BY document_url ASC",
                )
                .bind(&reference_id)
                .fetch_all(&pool)
                .await?;

                Ok(locations)
            }
        })
        .await
    }
}
