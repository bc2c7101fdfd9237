use crate::batch::{BatchOutcome, BatchStatus};
use crate::model::{ErrorRecord, ReportRow};
use serde::{Deserialize, Serialize};

/// Message shown with every run: inputs are read, converted and dropped.
pub const PRIVACY_NOTICE: &str =
    "Uploaded files are processed in memory only and are not kept once this run ends.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    pub files_total: usize,
    pub rows: usize,
    pub errors: usize,
    pub total_area_hectares: f64,
}

/// JSON-friendly view of a finished batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub has_data: bool,
    pub stats: StatsReport,
    pub rows: Vec<ReportRow>,
    pub errors: Vec<ErrorRecord>,
}

impl BatchReport {
    pub fn from_outcome(outcome: &BatchOutcome) -> Self {
        Self {
            has_data: outcome.status() == BatchStatus::HasData,
            stats: StatsReport {
                files_total: outcome.files_total(),
                rows: outcome.rows.len(),
                errors: outcome.errors.len(),
                total_area_hectares: outcome.rows.iter().map(|r| r.area_hectares).sum(),
            },
            rows: outcome.rows.clone(),
            errors: outcome.errors.clone(),
        }
    }
}

/// Human-readable summary lines for a terminal or status bar.
pub fn summary_lines(outcome: &BatchOutcome) -> Vec<String> {
    let mut lines = vec![format!("{} file(s) received.", outcome.files_total())];
    match outcome.status() {
        BatchStatus::HasData => lines.push(format!("{} polygon(s) converted.", outcome.rows.len())),
        BatchStatus::NoValidData => lines.push("No valid data was produced.".to_string()),
    }
    if !outcome.errors.is_empty() {
        lines.push("Files ignored or failed:".to_string());
        for err in &outcome.errors {
            lines.push(format!("  {err}"));
        }
    }
    lines
}
