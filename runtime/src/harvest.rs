//! Run driver: every seed, one after another.
//!
//! Each seed gets its own browser and page context, a freshly trained pattern
//! matcher, and a traversal. Browser resources are released on every path
//! before the next seed starts. A seed that cannot be processed is logged and
//! skipped; the run always reaches the end and reports what it gathered.

use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::extraction::pattern::PatternSource;
use crate::renderer::{BrowserLauncher, RenderContext};
use crate::traversal::{self, SeedOutcome, TraversalSettings};
use indexmap::IndexSet;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Summary of one seed.
#[derive(Debug, Serialize)]
pub struct SeedReport {
    pub seed: String,
    pub pages_visited: usize,
    pub results: usize,
    /// Absorbed per-page failures.
    pub failures: Vec<String>,
    /// Set when the seed could not be processed at all.
    pub error: Option<String>,
}

impl From<&SeedOutcome> for SeedReport {
    fn from(outcome: &SeedOutcome) -> Self {
        Self {
            seed: outcome.seed.clone(),
            pages_visited: outcome.visited.len(),
            results: outcome.results.len(),
            failures: outcome.failures.iter().map(|e| e.to_string()).collect(),
            error: None,
        }
    }
}

/// Summary of a whole run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub seeds: Vec<SeedReport>,
    /// Globally deduplicated candidates, in first-seen order.
    pub results: IndexSet<String>,
}

impl RunReport {
    pub fn failed_seeds(&self) -> usize {
        self.seeds.iter().filter(|s| s.error.is_some()).count()
    }
}

/// Drives a harvest over all configured seeds.
pub struct Harvester {
    launcher: Arc<dyn BrowserLauncher>,
    patterns: Arc<dyn PatternSource>,
    config: HarvestConfig,
}

impl Harvester {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        patterns: Arc<dyn PatternSource>,
        config: HarvestConfig,
    ) -> Self {
        Self {
            launcher,
            patterns,
            config,
        }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Process every seed in order and aggregate the results.
    pub async fn run(&self) -> RunReport {
        let mut seeds = Vec::with_capacity(self.config.start_urls.len());
        let mut results: IndexSet<String> = IndexSet::new();

        for seed in &self.config.start_urls {
            match self.harvest_seed(seed).await {
                Ok(outcome) => {
                    seeds.push(SeedReport::from(&outcome));
                    results.extend(outcome.results);
                }
                Err(e) => {
                    error!("{e}");
                    seeds.push(SeedReport {
                        seed: seed.clone(),
                        pages_visited: 0,
                        results: 0,
                        failures: Vec::new(),
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let report = RunReport { seeds, results };
        info!(
            "run complete: {} seeds ({} failed), {} unique headlines",
            report.seeds.len(),
            report.failed_seeds(),
            report.results.len()
        );
        report
    }

    /// One seed: acquire browser and context, train, traverse, release.
    async fn harvest_seed(&self, seed: &str) -> Result<SeedOutcome, HarvestError> {
        let seed_error = |message: String| HarvestError::Seed {
            url: seed.to_string(),
            message,
        };

        let renderer = self
            .launcher
            .launch()
            .await
            .map_err(|e| seed_error(format!("browser launch failed: {e:#}")))?;

        let outcome = match renderer.new_context().await {
            Ok(mut ctx) => {
                let outcome = self.train_and_traverse(ctx.as_mut(), seed).await;
                if let Err(e) = ctx.close().await {
                    warn!("failed to close page for {seed}: {e:#}");
                }
                outcome
            }
            Err(e) => Err(seed_error(format!("could not open page: {e:#}"))),
        };

        if let Err(e) = renderer.shutdown().await {
            warn!("failed to shut down browser for {seed}: {e:#}");
        }
        outcome
    }

    async fn train_and_traverse(
        &self,
        ctx: &mut dyn RenderContext,
        seed: &str,
    ) -> Result<SeedOutcome, HarvestError> {
        info!("training pattern extractor on {seed}");
        let matcher = self
            .patterns
            .train(seed, &self.config.examples.wanted())
            .await
            .map_err(|e| HarvestError::Seed {
                url: seed.to_string(),
                message: e.to_string(),
            })?;

        let settings = TraversalSettings::from(&self.config);
        Ok(traversal::traverse(ctx, matcher.as_ref(), seed, &settings).await)
    }
}
