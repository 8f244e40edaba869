#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Pipeline configuration types and range validation.
pub mod config;
/// Centralized constants used across stages, artifacts, and encoding.
pub mod constants;
/// Record, dataset, and label types.
pub mod data;
/// TF-IDF vectorizer, fitted transform, and sparse matrices.
pub mod features;
/// Dataset ingestion stage.
pub mod ingestion;
/// Classification metrics and report rendering.
pub mod metrics;
/// Logistic-regression training and evaluation.
pub mod model;
/// Stage orchestration and isolated stage runners.
pub mod pipeline;
/// Dataset normalization stage.
pub mod preprocess;
/// Deterministic label-stratified train/test splitting.
pub mod splits;
/// Filesystem artifact store with versioned binary payloads.
pub mod store;
/// Run-tracking sink trait and built-in trackers.
pub mod tracking;
/// Shared type aliases.
pub mod types;
/// Text normalization applied before vectorization.
pub mod utils;
/// Schema validation gate.
pub mod validation;

mod errors;

pub use config::{FeatureParams, PipelineConfig, SplitParams, TrainParams};
pub use data::{CleanDataset, CleanRecord, RawDataset, Sentiment};
pub use errors::PipelineError;
pub use features::{FittedVectorizer, SparseMatrix, TfidfVectorizer};
pub use metrics::{ClassMetrics, ClassificationReport, Metrics};
pub use model::{EvalOutcome, Model};
pub use pipeline::{Pipeline, RunArtifacts};
pub use splits::{SplitLabel, stratified_split};
pub use store::ArtifactStore;
pub use tracking::{FileRunTracker, NoopTracker, RunTracker};
pub use types::{CellValue, ColumnName, DocumentText, RunId, Term};
pub use utils::clean_text;
pub use validation::{ValidationSummary, validate};
