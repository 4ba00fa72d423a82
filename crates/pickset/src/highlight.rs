//! Query highlighting for row renderers.

use regex::RegexBuilder;
use serde::Serialize;

/// A run of text that either matched the query or did not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

/// Split `text` into matched and unmatched runs of `query`.
///
/// Matching is literal and case-insensitive. A blank query yields the
/// whole text as one unmatched segment. Empty runs are never produced.
///
/// ```
/// use pickset::highlight::highlight;
///
/// let parts = highlight("SKINTIFIC-470", "tif");
/// let marked: Vec<_> = parts.iter().filter(|s| s.matched).map(|s| s.text).collect();
/// assert_eq!(marked, ["TIF"]);
/// ```
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<Segment<'a>> {
    let whole = || {
        vec![Segment {
            text,
            matched: false,
        }]
    };
    if query.trim().is_empty() || text.is_empty() {
        return whole();
    }

    let Ok(pattern) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return whole();
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for found in pattern.find_iter(text) {
        if found.start() > last {
            segments.push(Segment {
                text: &text[last..found.start()],
                matched: false,
            });
        }
        segments.push(Segment {
            text: found.as_str(),
            matched: true,
        });
        last = found.end();
    }
    if last < text.len() {
        segments.push(Segment {
            text: &text[last..],
            matched: false,
        });
    }
    segments
}
