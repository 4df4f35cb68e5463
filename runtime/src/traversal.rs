//! Single-seed traversal: fetch, extract, follow the next-page link.
//!
//! The loop is an explicit state machine:
//!
//! ```text
//! Fetching ──ok──▶ Extracting ──▶ LocatingNext ──unvisited──▶ Fetching
//!     └───fetch error────────────────▲      └──otherwise──▶ Done
//! ```
//!
//! The current address enters the visited set before its fetch is attempted,
//! so a pagination cycle ends after at most one step per distinct address.

use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::extraction::{self, pattern::PatternMatcher};
use crate::renderer::{RenderContext, SelectorMatch};
use indexmap::IndexSet;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-traversal knobs, taken from [`HarvestConfig`].
#[derive(Debug, Clone)]
pub struct TraversalSettings {
    pub pagination_selector: Option<String>,
    pub settle: Duration,
    pub navigation_timeout_ms: u64,
    pub per_page_limit: usize,
}

impl From<&HarvestConfig> for TraversalSettings {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            pagination_selector: config.pagination_selector.clone(),
            settle: config.settle_delay(),
            navigation_timeout_ms: config.navigation_timeout_ms,
            per_page_limit: config.per_page_limit,
        }
    }
}

/// Traversal state.
#[derive(Debug)]
enum Step {
    Fetching,
    Extracting { html: String },
    LocatingNext,
    Done,
}

/// What one seed's traversal produced.
#[derive(Debug, Serialize)]
pub struct SeedOutcome {
    pub seed: String,
    /// Addresses in the order they were entered.
    pub visited: IndexSet<String>,
    /// Per-page merged candidates, appended in page order.
    pub results: Vec<String>,
    /// Absorbed failures, in order of occurrence.
    #[serde(serialize_with = "serialize_errors")]
    pub failures: Vec<HarvestError>,
}

fn serialize_errors<S: serde::Serializer>(
    errors: &[HarvestError],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(|e| e.to_string()))
}

/// Walk from `seed` through the pagination chain using `ctx`.
///
/// Never fails: fetch, pattern and pagination errors are logged, recorded in
/// the outcome, and turned into state transitions.
pub async fn traverse(
    ctx: &mut dyn RenderContext,
    matcher: &dyn PatternMatcher,
    seed: &str,
    settings: &TraversalSettings,
) -> SeedOutcome {
    let mut outcome = SeedOutcome {
        seed: seed.to_string(),
        visited: IndexSet::new(),
        results: Vec::new(),
        failures: Vec::new(),
    };
    let mut current = seed.to_string();
    let mut step = Step::Fetching;

    loop {
        step = match step {
            Step::Fetching => {
                info!("visiting {current}");
                outcome.visited.insert(current.clone());
                match fetch_page(ctx, &current, settings).await {
                    Ok(html) => Step::Extracting { html },
                    Err(e) => {
                        warn!("{e}");
                        outcome.failures.push(e);
                        Step::LocatingNext
                    }
                }
            }
            Step::Extracting { html } => {
                let page =
                    extraction::extract_page(&html, &current, matcher, settings.per_page_limit);
                if let Some(source) = page.pattern_error {
                    let e = HarvestError::Pattern {
                        url: current.clone(),
                        source,
                    };
                    warn!("{e}");
                    outcome.failures.push(e);
                }
                info!(
                    "found {} headlines on {current} ({} heuristic, {} learned)",
                    page.candidates.len(),
                    page.heuristic_count,
                    page.learned_count
                );
                outcome.results.extend(page.candidates);
                Step::LocatingNext
            }
            Step::LocatingNext => {
                match next_address(ctx, settings.pagination_selector.as_deref(), &current).await {
                    Ok(Some(next)) if !outcome.visited.contains(&next) => {
                        current = next;
                        Step::Fetching
                    }
                    Ok(Some(next)) => {
                        debug!("next page {next} already visited, stopping");
                        Step::Done
                    }
                    Ok(None) => Step::Done,
                    Err(e) => {
                        warn!("{e}");
                        outcome.failures.push(e);
                        Step::Done
                    }
                }
            }
            Step::Done => break,
        };
    }

    info!(
        "finished {seed}: {} pages, {} headlines",
        outcome.visited.len(),
        outcome.results.len()
    );
    outcome
}

/// Navigate, wait for the settle delay, read the markup.
async fn fetch_page(
    ctx: &mut dyn RenderContext,
    url: &str,
    settings: &TraversalSettings,
) -> Result<String, HarvestError> {
    let fetch_error = |e: anyhow::Error| HarvestError::Fetch {
        url: url.to_string(),
        message: format!("{e:#}"),
    };

    let nav = ctx
        .navigate(url, settings.navigation_timeout_ms)
        .await
        .map_err(fetch_error)?;
    debug!("loaded {} in {}ms", nav.final_url, nav.load_time_ms);

    tokio::time::sleep(settings.settle).await;
    ctx.get_html().await.map_err(fetch_error)
}

/// Resolve the next page address, if pagination continues.
async fn next_address(
    ctx: &dyn RenderContext,
    selector: Option<&str>,
    current: &str,
) -> Result<Option<String>, HarvestError> {
    let Some(selector) = selector else {
        return Ok(None);
    };

    let found = ctx
        .first_match(selector, "href")
        .await
        .map_err(|e| HarvestError::Pagination {
            url: current.to_string(),
            message: format!("{e:#}"),
        })?;

    match found {
        SelectorMatch::Missing => {
            debug!("no element matches `{selector}` on {current}");
            Ok(None)
        }
        SelectorMatch::Found { attribute: None } => Ok(None),
        SelectorMatch::Found {
            attribute: Some(href),
        } => Ok(resolve_href(current, &href)),
    }
}

/// Turn a pagination `href` into an absolute address.
///
/// Hrefs starting with `http` are taken verbatim; anything else is joined
/// against `current`. Empty or unresolvable hrefs yield `None`.
pub fn resolve_href(current: &str, href: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http") {
        return Some(href.to_string());
    }
    let base = url::Url::parse(current).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}
