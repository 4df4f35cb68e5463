//! Harvest configuration.
//!
//! Loaded once at startup from a JSON document and passed by reference to
//! every component that needs it. Only `start_urls` and `examples` are
//! required; every tuning knob has a serde default.

use crate::error::HarvestError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the configuration document.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Default location of the results file.
pub const DEFAULT_OUTPUT_PATH: &str = "results/output.csv";

/// Example strings used to train the pattern extractor.
///
/// Either a flat list of wanted strings, or a map of alias to wanted strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Examples {
    List(Vec<String>),
    Grouped(BTreeMap<String, Vec<String>>),
}

impl Examples {
    /// Flatten into the ordered list of wanted strings, trimmed, blanks dropped.
    pub fn wanted(&self) -> Vec<String> {
        let raw: Vec<&String> = match self {
            Self::List(items) => items.iter().collect(),
            Self::Grouped(groups) => groups.values().flatten().collect(),
        };
        raw.into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

impl Default for Examples {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// Full run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Seed addresses, processed in order.
    pub start_urls: Vec<String>,
    /// Training data for the pattern extractor.
    pub examples: Examples,
    /// CSS selector for the "next page" link. Blank means absent.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub pagination_selector: Option<String>,
    /// Wait after each navigation before the markup is read.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Upper bound on a single page navigation.
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,
    /// Upper bound on the static fetch of a seed page for training.
    #[serde(default = "default_training_timeout_ms")]
    pub training_timeout_ms: u64,
    /// Maximum unique candidates kept from one page.
    #[serde(default = "default_per_page_limit")]
    pub per_page_limit: usize,
    /// Results file.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// Explicit browser binary; discovered when absent.
    #[serde(default)]
    pub chromium_path: Option<PathBuf>,
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_navigation_timeout_ms() -> u64 {
    30_000
}

fn default_training_timeout_ms() -> u64 {
    30_000
}

fn default_per_page_limit() -> usize {
    10
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

fn default_headless() -> bool {
    true
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

impl HarvestConfig {
    /// Read and validate the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, HarvestError> {
        let raw = std::fs::read_to_string(path).map_err(|e| HarvestError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw, path)
    }

    /// Parse and validate a configuration document. `origin` is only used
    /// for error reporting.
    pub fn from_json_str(raw: &str, origin: &Path) -> Result<Self, HarvestError> {
        let config: Self = serde_json::from_str(raw).map_err(|e| HarvestError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate(origin)?;
        Ok(config)
    }

    fn validate(&self, origin: &Path) -> Result<(), HarvestError> {
        if self.per_page_limit == 0 {
            return Err(HarvestError::Config {
                path: origin.to_path_buf(),
                message: "per_page_limit must be at least 1".to_string(),
            });
        }
        if self.output.as_os_str().is_empty() {
            return Err(HarvestError::Config {
                path: origin.to_path_buf(),
                message: "output path is empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
