//! Row types for the minutes input list and processed-document state.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One entry of the reference-discovery list: a fetchable document.
///
/// Produced by the upstream minutes crawler; the pipeline treats these
/// rows as read-only input.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Unique identifier within the discovery list.
    pub id: i64,
    /// Human-readable title, used for log lines only.
    pub title: String,
    /// Absolute URL of the document.
    pub url: String,
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.url)
    }
}

/// Marker row recording that a URL's content has been fully scanned.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProcessedDocument {
    /// The document URL; unique per document.
    pub url: String,
    /// Hex SHA-256 digest of the fetched file, kept for change detection.
    pub content_hash: String,
    /// When the scan committed.
    pub processed_at: String,
}

/// Compressed page locations of one reference identifier in one document.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ReferenceLocation {
    /// Unique identifier.
    pub id: i64,
    /// The document this identifier was found in.
    pub document_url: String,
    /// The reference identifier, e.g. `22/CAG/0099`.
    pub reference_id: String,
    /// Compressed page range text, e.g. `p3-p5, p9`.
    pub page_ranges: String,
    /// When the scan committed.
    pub processed_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_ref_display_includes_title_and_url() {
        let doc = DocumentRef {
            id: 1,
            title: "Minutes of the January meeting".to_string(),
            url: "https://example.com/jan.pdf".to_string(),
        };
        let text = doc.to_string();
        assert!(text.contains("January meeting"));
        assert!(text.contains("https://example.com/jan.pdf"));
    }
}
