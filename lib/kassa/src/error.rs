use std::path::PathBuf;
use thiserror::Error;

/// Failures of the cleaning/join stage.
///
/// `Schema` and `FileMissing` are file-level: the offending file becomes a
/// reject record and processing continues with the remaining sources.
/// `NoValidInput` is the top-level abort when not a single source was
/// readable. Row-level problems never surface here; invalid rows are
/// dropped and counted in the clean summary.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("{file}: required columns missing after alias resolution: {missing:?}")]
    Schema { file: String, missing: Vec<String> },

    #[error("input file not found: {0}")]
    FileMissing(PathBuf),

    #[error("no readable input files")]
    NoValidInput,

    #[error("failed to read {file}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
