//! Headline heuristics over rendered markup.
//!
//! Two independent rules run against one parsed document:
//!
//! * headings: every `h1`/`h2`/`h3` with non-empty trimmed text;
//! * link text: every `a[href]` whose trimmed text is strictly longer than
//!   [`MIN_LINK_TEXT`] and strictly shorter than [`MAX_LINK_TEXT`] characters.
//!
//! Results are concatenated, headings first, without deduplication.

use scraper::{ElementRef, Html, Selector};

/// Exclusive lower bound on link text length, in characters.
pub const MIN_LINK_TEXT: usize = 10;

/// Exclusive upper bound on link text length, in characters.
pub const MAX_LINK_TEXT: usize = 200;

/// Run both rules on `html`.
pub fn extract_headlines(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut headlines = headings(&document);
    headlines.extend(link_texts(&document));
    headlines
}

/// Rule A: heading text in document order.
pub fn headings(document: &Html) -> Vec<String> {
    let sel = Selector::parse("h1, h2, h3").expect("heading selector is valid");
    document
        .select(&sel)
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
        .collect()
}

/// Rule B: anchor text of headline-like length.
pub fn link_texts(document: &Html) -> Vec<String> {
    let sel = Selector::parse("a[href]").expect("anchor selector is valid");
    document
        .select(&sel)
        .map(|el| element_text(&el))
        .filter(|text| {
            let len = text.chars().count();
            len > MIN_LINK_TEXT && len < MAX_LINK_TEXT
        })
        .collect()
}

/// All descendant text, concatenated and trimmed.
pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
