//! Cagscan Core Library
//!
//! This library provides the core functionality for the cagscan tool,
//! which turns a curated list of committee meeting minutes (URL + title)
//! into a queryable index of CAG reference identifiers and the pages
//! they appear on.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`db`] - Database connection and schema management
//! - [`store`] - Persistence gateway for processed-document state
//! - [`download`] - Cache-aware document fetching with bounded concurrency
//! - [`hash`] - Streaming content digests
//! - [`extract`] - Page text extraction and reference scanning
//! - [`pages`] - Page-set to range-list compression
//! - [`pipeline`] - Per-document processing orchestration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod db;
pub mod download;
pub mod extract;
pub mod hash;
pub mod pages;
pub mod pipeline;
pub mod store;

// Re-export commonly used types
pub use db::Database;
pub use download::{DOWNLOAD_CONCURRENCY, FetchError, Fetcher, HttpClient};
pub use extract::{ExtractError, PageText, PdfTextExtractor, TextExtractor, scan_pages};
pub use pages::compress_pages;
pub use pipeline::{PipelineError, ProcessStats, Processor};
pub use store::{DocumentRef, DocumentStore, ProcessedDocument, ReferenceLocation, StoreError};
