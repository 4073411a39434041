//! Reference identifier scanning over page text.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use super::PageText;

/// The fixed shape of a CAG reference identifier: two digits, the
/// literal `/CAG/` separator, four digits.
#[allow(clippy::expect_used)]
static REFERENCE_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{2}/CAG/\d{4}").expect("reference identifier regex is valid")
});

/// Scans pages for reference identifiers and collects their locations.
///
/// Every match on a page contributes that page's number to the
/// identifier's page set; duplicate matches on the same page are
/// absorbed by the set. Page sets accumulate across the whole
/// document. The result is ordered by identifier for deterministic
/// persistence.
#[must_use]
pub fn scan_pages(pages: &[PageText]) -> BTreeMap<String, BTreeSet<u32>> {
    let mut locations: BTreeMap<String, BTreeSet<u32>> = BTreeMap::new();

    for page in pages {
        for found in REFERENCE_ID_PATTERN.find_iter(&page.text) {
            locations
                .entry(found.as_str().to_owned())
                .or_default()
                .insert(page.number);
        }
    }

    locations
}
