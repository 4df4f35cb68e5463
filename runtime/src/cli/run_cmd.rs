//! `pagesift run`: harvest every seed and write the results file.
//!
//! Always returns `Ok`: configuration, seed and output failures are logged.

use crate::acquisition::http_client::HttpClient;
use crate::config::HarvestConfig;
use crate::extraction::pattern::HttpPatternSource;
use crate::harvest::{Harvester, RunReport};
use crate::output::{self, Persisted};
use crate::renderer::chromium::ChromiumLauncher;
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::error;

/// Command-line overrides applied on top of the configuration file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub output: Option<PathBuf>,
    pub settle_ms: Option<u64>,
}

impl RunOverrides {
    pub fn apply(&self, config: &mut HarvestConfig) {
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(settle_ms) = self.settle_ms {
            config.settle_ms = settle_ms;
        }
    }
}

#[derive(Serialize)]
struct RunSummary<'a> {
    report: &'a RunReport,
    output: Option<Persisted>,
}

/// Run the harvest command.
pub async fn run(config_path: &Path, overrides: &RunOverrides, json: bool) -> Result<()> {
    let mut config = match HarvestConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return Ok(());
        }
    };
    overrides.apply(&mut config);

    let launcher = Arc::new(ChromiumLauncher::new(
        config.chromium_path.clone(),
        config.headless,
    ));
    let patterns = Arc::new(HttpPatternSource::new(HttpClient::new(
        config.training_timeout_ms,
    )));
    let output_path = config.output.clone();

    let harvester = Harvester::new(launcher, patterns, config);
    let report = harvester.run().await;

    let results: Vec<String> = report.results.iter().cloned().collect();
    let persisted = match output::persist_results(&output_path, &results) {
        Ok(persisted) => Some(persisted),
        Err(e) => {
            error!("{e}");
            None
        }
    };

    if json {
        let summary = RunSummary {
            report: &report,
            output: persisted,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
