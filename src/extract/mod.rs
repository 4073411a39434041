//! Page text extraction and reference identifier scanning.
//!
//! Extraction wraps an external PDF text decoder behind the
//! [`TextExtractor`] trait so the pipeline can be exercised with stub
//! page sources in tests. Decoding a corrupt or unsupported file is an
//! expected per-document failure, reported and contained by the
//! orchestrator.

mod scanner;

pub use scanner::scan_pages;

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while extracting page text from a document.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The decoder could not read the document.
    #[error("failed to decode {path}: {message}")]
    Decode {
        /// The file that failed to decode.
        path: PathBuf,
        /// Decoder error text.
        message: String,
    },
}

impl ExtractError {
    /// Creates a decode error with the source decoder's message.
    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Text of one document page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-indexed page number in document order.
    pub number: u32,
    /// Full text of the page.
    pub text: String,
}

/// Source of page-indexed document text.
///
/// Implementations are synchronous and CPU-bound; the pipeline runs
/// them on the blocking thread pool.
pub trait TextExtractor: Send + Sync {
    /// Extracts the pages of a local document, 1-indexed, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Decode`] for unreadable or unsupported
    /// files.
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractError>;
}

/// Production extractor backed by the `pdf-extract` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractError> {
        let pages = pdf_extract::extract_text_by_pages(path)
            .map_err(|e| ExtractError::decode(path, e.to_string()))?;

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(index, text)| PageText {
                number: index as u32 + 1,
                text,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_display_includes_path_and_message() {
        let error = ExtractError::decode("/tmp/bad.pdf", "unexpected end of stream");
        let msg = error.to_string();
        assert!(msg.contains("/tmp/bad.pdf"));
        assert!(msg.contains("unexpected end of stream"));
    }

    #[test]
    fn test_pdf_extractor_reports_decode_failure_for_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-pdf.pdf");
        std::fs::write(&path, "plain text, not a PDF").unwrap();

        let result = PdfTextExtractor.extract_pages(&path);
        assert!(matches!(result, Err(ExtractError::Decode { .. })));
    }
}
