use serde::{Deserialize, Serialize};

use crate::constants::labels;
use crate::types::{CellValue, ColumnName};

/// Binary sentiment label with a sentinel for unmapped values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sentiment {
    /// Negative class (encoded as 0).
    Negative,
    /// Positive class (encoded as 1).
    Positive,
    /// Sentinel for strings outside the fixed two-value set.
    /// Rows carrying it are excluded before training.
    Unknown,
}

impl Sentiment {
    /// Map a raw sentiment string onto the fixed two-value set.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            labels::POSITIVE => Self::Positive,
            labels::NEGATIVE => Self::Negative,
            _ => Self::Unknown,
        }
    }

    /// Integer encoding used in the normalized dataset, if mapped.
    pub fn class(self) -> Option<u8> {
        match self {
            Self::Negative => Some(labels::NEGATIVE_CLASS),
            Self::Positive => Some(labels::POSITIVE_CLASS),
            Self::Unknown => None,
        }
    }
}

/// Ingested tabular dataset: the column schema plus raw row cells.
///
/// Cells are kept as read from the CSV; an empty string is the tabular
/// representation of a null.
#[derive(Clone, Debug, Default)]
pub struct RawDataset {
    /// Column schema captured from the CSV header row.
    pub columns: Vec<ColumnName>,
    /// Row cells, aligned with `columns`.
    pub rows: Vec<Vec<CellValue>>,
}

impl RawDataset {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` in the column schema, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col == name)
    }

    /// Cell at `(row, column)`; `None` when the column is absent or the row
    /// is ragged.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}

/// One row of the normalized dataset produced by preprocessing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CleanRecord {
    /// Original review text.
    pub review: String,
    /// Original sentiment string.
    pub sentiment: String,
    /// Normalized review text (lowercase letters and single spaces only).
    pub clean_review: String,
    /// Integer class label (0 negative, 1 positive).
    pub label: u8,
}

/// Normalized dataset consumed by the split and feature stages.
#[derive(Clone, Debug, Default)]
pub struct CleanDataset {
    /// Normalized rows in stable order.
    pub rows: Vec<CleanRecord>,
}

impl CleanDataset {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Normalized texts in row order.
    pub fn texts(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.clean_review.as_str()).collect()
    }

    /// Integer labels aligned with `texts()`.
    pub fn labels(&self) -> Vec<u8> {
        self.rows.iter().map(|row| row.label).collect()
    }
}
