use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use crate::constants::columns;
use crate::data::RawDataset;
use crate::errors::PipelineError;
use crate::types::ColumnName;

/// Non-fatal anomalies observed while validating a dataset.
///
/// Null and duplicate counts are reported, never enforced; downstream stages
/// must tolerate rows that survive validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationSummary {
    /// Per-column count of null (empty) cells.
    pub null_counts: HashMap<ColumnName, usize>,
    /// Number of duplicated values in the identifying column.
    pub duplicate_rows: usize,
}

/// Gate a dataset on schema and non-emptiness.
///
/// Fails with [`PipelineError::Schema`] when an expected column is absent and
/// with [`PipelineError::EmptyDataset`] when there are no rows. Idempotent:
/// validating an already-validated dataset yields the same result.
pub fn validate(
    dataset: &RawDataset,
    expected_columns: &[&str],
    source: &Path,
) -> Result<ValidationSummary, PipelineError> {
    for column in expected_columns {
        if dataset.column_index(column).is_none() {
            return Err(PipelineError::Schema {
                column: (*column).to_string(),
            });
        }
    }

    if dataset.is_empty() {
        return Err(PipelineError::EmptyDataset {
            path: source.to_path_buf(),
        });
    }

    let mut summary = ValidationSummary::default();
    for (idx, column) in dataset.columns.iter().enumerate() {
        let nulls = dataset
            .rows
            .iter()
            .filter(|row| row.get(idx).is_none_or(|cell| cell.is_empty()))
            .count();
        if nulls > 0 {
            warn!(column = column.as_str(), nulls, "null values detected");
        }
        summary.null_counts.insert(column.clone(), nulls);
    }

    if let Some(idx) = dataset.column_index(columns::IDENTIFYING) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for row in &dataset.rows {
            if let Some(cell) = row.get(idx) {
                *seen.entry(cell.as_str()).or_insert(0) += 1;
            }
        }
        summary.duplicate_rows = seen.values().filter(|count| **count > 1).map(|c| c - 1).sum();
        if summary.duplicate_rows > 0 {
            warn!(
                duplicates = summary.duplicate_rows,
                column = columns::IDENTIFYING,
                "duplicated rows detected"
            );
        }
    }

    Ok(summary)
}
