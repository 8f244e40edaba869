use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::ColumnName;

/// Error type for configuration, validation, and persistence failures.
///
/// Every variant is fatal: the current run aborts and no partial artifact is
/// considered valid. Non-fatal anomalies (null counts, duplicates,
/// non-convergence) are logged instead of surfacing here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("schema validation failed: missing column '{column}'")]
    Schema { column: ColumnName },
    #[error("dataset at '{path}' has no rows")]
    EmptyDataset { path: PathBuf },
    #[error("label class {label} has {count} rows but stratification requires at least {required}")]
    InsufficientData {
        label: u8,
        count: usize,
        required: usize,
    },
    #[error("feature dimension mismatch: model expects {expected} columns, matrix has {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("artifact failure: {0}")]
    Artifact(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("csv failure: {0}")]
    Csv(#[from] csv::Error),
}
