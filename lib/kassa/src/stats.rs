use serde::Serialize;
use std::path::Path;

#[derive(Default, Clone, Debug, Serialize)]
pub struct MapStats {
    pub records_in: u64,
    pub emits: u64,
    pub filtered: u64,
    pub faults: u64,
    pub wall_ms: u64,
}

#[derive(Default, Clone, Debug, Serialize)]
pub struct ReduceStats {
    pub groups: u64,
    pub results: u64,
    pub wall_ms: u64,
}

/// Per-phase stats of one pipeline run; one entry per executed stage, in
/// execution order.
#[derive(Default, Clone, Debug, Serialize)]
pub struct PipelineStats {
    pub map: Vec<MapStats>,
    pub reduce: Vec<ReduceStats>,
}

/// Outcome counters of the cleaning/join stage.
///
/// File-level rejects (listed in the reject file) and row-level rejects
/// (dropped before dedup, counted only) are kept separate; the percentage
/// helpers merge them the way the summary report presents totals.
#[derive(Clone, Debug, Serialize)]
pub struct CleanSummary {
    pub executed_at: String,
    pub source_files: Vec<String>,
    pub valid_rows: u64,
    pub rejected_files: u64,
    pub rejected_rows: u64,
    pub unique_transactions: u64,
}

impl CleanSummary {
    pub fn new(
        sources: &[impl AsRef<Path>],
        valid_rows: u64,
        rejected_files: u64,
        rejected_rows: u64,
        unique_transactions: u64,
    ) -> Self {
        Self {
            executed_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            source_files: sources.iter().map(|p| file_name(p.as_ref())).collect(),
            valid_rows,
            rejected_files,
            rejected_rows,
            unique_transactions,
        }
    }

    pub fn total_rejected(&self) -> u64 {
        self.rejected_files + self.rejected_rows
    }

    pub fn total_rows(&self) -> u64 {
        self.valid_rows + self.total_rejected()
    }

    pub fn pct_valid(&self) -> f64 {
        pct(self.valid_rows, self.total_rows())
    }

    pub fn pct_rejected(&self) -> f64 {
        pct(self.total_rejected(), self.total_rows())
    }
}

fn pct(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
