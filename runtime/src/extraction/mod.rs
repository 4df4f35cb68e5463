//! Candidate extraction from rendered markup.
//!
//! A page is run through the headline heuristics and the trained pattern
//! matcher, then merged into at most `limit` unique candidates.

pub mod heuristic;
pub mod merge;
pub mod pattern;

use pattern::{PatternError, PatternMatcher};

/// Everything extracted from one page.
#[derive(Debug, Default)]
pub struct PageExtraction {
    /// Merged, deduplicated, capped candidates.
    pub candidates: Vec<String>,
    pub heuristic_count: usize,
    pub learned_count: usize,
    /// Set when the pattern matcher failed; its contribution is then empty.
    pub pattern_error: Option<PatternError>,
}

/// Extract and merge candidates from one page.
pub fn extract_page(
    html: &str,
    page_url: &str,
    matcher: &dyn PatternMatcher,
    limit: usize,
) -> PageExtraction {
    let heuristic = heuristic::extract_headlines(html);
    let (learned, pattern_error) = match matcher.similar(html, page_url) {
        Ok(found) => (found, None),
        Err(e) => (Vec::new(), Some(e)),
    };

    let heuristic_count = heuristic.len();
    let learned_count = learned.len();
    PageExtraction {
        candidates: merge::merge_page(heuristic, learned, limit),
        heuristic_count,
        learned_count,
        pattern_error,
    }
}
