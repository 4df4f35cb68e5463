//! Failure taxonomy for a harvest run.
//!
//! Every variant is absorbed where it occurs: the traversal and the run driver
//! log it with its address (or path) and move on. Nothing here aborts a run.

use crate::extraction::pattern::PatternError;
use std::path::PathBuf;

/// A recoverable failure at one of the harvest boundaries.
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    /// Navigation or markup retrieval failed for a page.
    #[error("scraping error at {url}: {message}")]
    Fetch { url: String, message: String },

    /// The trained pattern extractor failed on a page.
    #[error("pattern extraction failed at {url}: {source}")]
    Pattern {
        url: String,
        #[source]
        source: PatternError,
    },

    /// Locating or reading the next-page link failed.
    #[error("pagination error at {url}: {message}")]
    Pagination { url: String, message: String },

    /// A seed could not be processed at all (browser launch, page context,
    /// pattern training).
    #[error("error scraping {url}: {message}")]
    Seed { url: String, message: String },

    /// The results file could not be written.
    #[error("error saving {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The configuration document is missing or invalid.
    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl HarvestError {
    /// The address or file the failure is attached to.
    pub fn subject(&self) -> String {
        match self {
            Self::Fetch { url, .. }
            | Self::Pattern { url, .. }
            | Self::Pagination { url, .. }
            | Self::Seed { url, .. } => url.clone(),
            Self::Output { path, .. } | Self::Config { path, .. } => path.display().to_string(),
        }
    }
}
