//! Compression of page-number sets into compact range lists.

use std::collections::BTreeSet;
use std::fmt::Write;

/// Renders a set of page numbers as a compact, ascending range list.
///
/// Maximal runs of consecutive pages are merged: a run of one page
/// renders as `p{n}`, a longer run as `p{start}-p{end}`, and runs are
/// joined with `", "`. Example: `{3,4,5,9,11,12}` → `"p3-p5, p9,
/// p11-p12"`.
///
/// Callers only invoke this for identifiers with at least one observed
/// page; an empty set renders as an empty string by construction.
#[must_use]
pub fn compress_pages(pages: &BTreeSet<u32>) -> String {
    let mut iter = pages.iter().copied();
    let Some(first) = iter.next() else {
        return String::new();
    };

    let mut rendered = String::new();
    let mut start = first;
    let mut prev = first;

    for page in iter {
        if page == prev + 1 {
            prev = page;
            continue;
        }
        render_run(&mut rendered, start, prev);
        start = page;
        prev = page;
    }
    render_run(&mut rendered, start, prev);

    rendered
}

/// Appends one run, separating it from any previous run.
fn render_run(rendered: &mut String, start: u32, end: u32) {
    if !rendered.is_empty() {
        rendered.push_str(", ");
    }
    if start == end {
        let _ = write!(rendered, "p{start}");
    } else {
        let _ = write!(rendered, "p{start}-p{end}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pages(values: &[u32]) -> BTreeSet<u32> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_compress_single_page() {
        assert_eq!(compress_pages(&pages(&[5])), "p5");
    }

    #[test]
    fn test_compress_single_run() {
        assert_eq!(compress_pages(&pages(&[1, 2, 3])), "p1-p3");
    }

    #[test]
    fn test_compress_isolated_pages() {
        assert_eq!(compress_pages(&pages(&[1, 3, 5])), "p1, p3, p5");
    }

    #[test]
    fn test_compress_mixed_runs() {
        assert_eq!(
            compress_pages(&pages(&[2, 3, 7, 8, 9, 15])),
            "p2-p3, p7-p9, p15"
        );
        assert_eq!(
            compress_pages(&pages(&[3, 4, 5, 9, 11, 12])),
            "p3-p5, p9, p11-p12"
        );
    }

    #[test]
    fn test_compress_is_order_independent() {
        // BTreeSet already sorts; build from descending input anyway.
        assert_eq!(compress_pages(&pages(&[12, 11, 9, 5, 4, 3])), "p3-p5, p9, p11-p12");
    }

    /// Parses a range list back into the page set it was built from.
    fn parse_ranges(text: &str) -> BTreeSet<u32> {
        let mut parsed = BTreeSet::new();
        for run in text.split(", ") {
            let mut bounds = run.split('-').map(|part| {
                part.strip_prefix('p')
                    .and_then(|n| n.parse::<u32>().ok())
                    .unwrap()
            });
            let start = bounds.next().unwrap();
            let end = bounds.next().unwrap_or(start);
            parsed.extend(start..=end);
        }
        parsed
    }

    #[test]
    fn test_compress_round_trips_the_set() {
        let cases: Vec<BTreeSet<u32>> = vec![
            pages(&[1]),
            pages(&[1, 2]),
            pages(&[1, 100]),
            pages(&[3, 4, 5, 9, 11, 12]),
            pages(&[7, 8, 9, 10, 11]),
            (1..=50).collect(),
            (1..=50).filter(|n| n % 3 != 0).collect(),
        ];

        for case in cases {
            let compressed = compress_pages(&case);
            assert_eq!(
                parse_ranges(&compressed),
                case,
                "round-trip failed for {compressed:?}"
            );
        }
    }
}
