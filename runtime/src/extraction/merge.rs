//! Per-page merge of heuristic and learned candidates.

use indexmap::IndexSet;

/// Default cap on unique candidates kept from one page.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Concatenate both sources, trim, drop empties, deduplicate exactly, and keep
/// at most `limit` entries. Heuristic candidates come first, in order.
pub fn merge_page(heuristic: Vec<String>, learned: Vec<String>, limit: usize) -> Vec<String> {
    let mut unique: IndexSet<String> = IndexSet::new();
    for candidate in heuristic.into_iter().chain(learned) {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            unique.insert(trimmed.to_string());
        }
    }
    unique.into_iter().take(limit).collect()
}
