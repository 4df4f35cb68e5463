//! Results file writer.
//!
//! A single-column CSV with a `results` header and one row per candidate.

use crate::error::HarvestError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Header of the only column.
pub const RESULTS_COLUMN: &str = "results";

/// What happened to the results file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Persisted {
    Written { path: PathBuf, rows: usize },
    /// Nothing to write; no file was created.
    Empty,
}

/// Create the output directory, then write `results` unless empty.
pub fn persist_results(path: &Path, results: &[String]) -> Result<Persisted, HarvestError> {
    let output_error = |source: csv::Error| HarvestError::Output {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| output_error(e.into()))?;
    }

    if results.is_empty() {
        info!("No data found to save.");
        return Ok(Persisted::Empty);
    }

    write_csv(path, results).map_err(output_error)?;
    info!("saved {} records to {}", results.len(), path.display());
    Ok(Persisted::Written {
        path: path.to_path_buf(),
        rows: results.len(),
    })
}

fn write_csv(path: &Path, results: &[String]) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)?;
    writer.write_record([RESULTS_COLUMN])?;
    for row in results {
        writer.write_record([row])?;
    }
    writer.flush()?;
    Ok(())
}
