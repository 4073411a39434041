//! Deterministic cache filename derivation from document URLs.
//!
//! The cache contract requires that the same URL always maps to the
//! same local path across runs, so a file that is already present can
//! satisfy a fetch without any network access.

use url::Url;

use super::error::FetchError;
use crate::hash;

/// Characters that are never allowed in a cache filename.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Digest prefix length used for fallback filenames.
const FALLBACK_DIGEST_CHARS: usize = 16;

/// Derives the deterministic cache filename for a document URL.
///
/// Uses the final path segment of the URL, percent-decoded and
/// sanitized. URLs whose path yields no usable name (e.g. a trailing
/// slash) fall back to a digest-derived name, which is still stable
/// per URL.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if the URL cannot be parsed.
pub fn cache_filename(url: &str) -> Result<String, FetchError> {
    let parsed = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

    let raw_segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    let decoded = urlencoding::decode(raw_segment)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| raw_segment.to_owned());

    let name = sanitize_filename(&decoded);
    if name.is_empty() {
        return Ok(fallback_filename(url));
    }

    Ok(name)
}

/// Replaces path separators and other unsafe characters, and trims
/// leading/trailing dots and whitespace so the name cannot escape the
/// cache directory or collide with hidden files.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if FORBIDDEN_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace()).to_owned()
}

/// Stable digest-derived name for URLs without a usable path segment.
fn fallback_filename(url: &str) -> String {
    let digest = hash::digest_str(url);
    format!("document-{}.pdf", &digest[..FALLBACK_DIGEST_CHARS])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_filename_uses_last_path_segment() {
        let name = cache_filename("https://example.com/minutes/january-2024.pdf").unwrap();
        assert_eq!(name, "january-2024.pdf");
    }

    #[test]
    fn test_cache_filename_ignores_query_string() {
        let name = cache_filename("https://example.com/doc.pdf?version=2&download=1").unwrap();
        assert_eq!(name, "doc.pdf");
    }

    #[test]
    fn test_cache_filename_percent_decodes_segment() {
        let name = cache_filename("https://example.com/minutes%20jan%202024.pdf").unwrap();
        assert_eq!(name, "minutes jan 2024.pdf");
    }

    #[test]
    fn test_cache_filename_is_deterministic() {
        let url = "https://example.com/minutes/march.pdf";
        assert_eq!(cache_filename(url).unwrap(), cache_filename(url).unwrap());
    }

    #[test]
    fn test_cache_filename_trailing_slash_falls_back_to_digest() {
        let name = cache_filename("https://example.com/minutes/").unwrap();
        assert!(name.starts_with("document-"), "got: {name}");
        assert!(name.ends_with(".pdf"), "got: {name}");

        // Fallback names are still deterministic per URL.
        let again = cache_filename("https://example.com/minutes/").unwrap();
        assert_eq!(name, again);

        // ...and distinct URLs get distinct fallbacks.
        let other = cache_filename("https://example.com/archive/").unwrap();
        assert_ne!(name, other);
    }

    #[test]
    fn test_cache_filename_rejects_invalid_url() {
        let result = cache_filename("not a url at all");
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[test]
    fn test_sanitize_filename_replaces_forbidden_chars() {
        assert_eq!(sanitize_filename("a:b*c?.pdf"), "a_b_c_.pdf");
        assert_eq!(sanitize_filename("nested\\name.pdf"), "nested_name.pdf");
    }

    #[test]
    fn test_sanitize_filename_trims_dots_and_whitespace() {
        assert_eq!(sanitize_filename("  .hidden.pdf. "), "hidden.pdf");
        assert_eq!(sanitize_filename("..."), "");
    }
}
