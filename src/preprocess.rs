use std::collections::HashSet;

use tracing::{debug, warn};

use crate::constants::columns;
use crate::data::{CleanDataset, CleanRecord, RawDataset, Sentiment};
use crate::errors::PipelineError;
use crate::utils::clean_text;

/// Normalize a validated dataset into the form consumed by the split stage.
///
/// Rows with a null review or sentiment are dropped before normalization,
/// exact duplicate rows are dropped, review text is cleaned, and sentiment
/// strings are encoded as integer labels. Rows whose sentiment falls outside
/// the fixed two-value set are excluded with a warning.
pub fn preprocess(dataset: &RawDataset) -> Result<CleanDataset, PipelineError> {
    let review_idx = dataset
        .column_index(columns::REVIEW)
        .ok_or_else(|| PipelineError::Schema {
            column: columns::REVIEW.to_string(),
        })?;
    let sentiment_idx =
        dataset
            .column_index(columns::SENTIMENT)
            .ok_or_else(|| PipelineError::Schema {
                column: columns::SENTIMENT.to_string(),
            })?;

    let mut dropped_null = 0usize;
    let mut dropped_duplicate = 0usize;
    let mut dropped_unknown = 0usize;
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut rows = Vec::with_capacity(dataset.len());

    for row in &dataset.rows {
        let review = row.get(review_idx).map(String::as_str).unwrap_or("");
        let sentiment = row.get(sentiment_idx).map(String::as_str).unwrap_or("");
        if review.is_empty() || sentiment.is_empty() {
            dropped_null += 1;
            continue;
        }
        if !seen.insert((review.to_string(), sentiment.to_string())) {
            dropped_duplicate += 1;
            continue;
        }
        let Some(label) = Sentiment::parse(sentiment).class() else {
            dropped_unknown += 1;
            continue;
        };
        rows.push(CleanRecord {
            review: review.to_string(),
            sentiment: sentiment.to_string(),
            clean_review: clean_text(review),
            label,
        });
    }

    if dropped_null > 0 {
        warn!(rows = dropped_null, "dropped rows with null review or sentiment");
    }
    if dropped_duplicate > 0 {
        warn!(rows = dropped_duplicate, "dropped duplicated rows");
    }
    if dropped_unknown > 0 {
        warn!(rows = dropped_unknown, "dropped rows with unmapped sentiment");
    }
    debug!(rows = rows.len(), "preprocessing complete");

    Ok(CleanDataset { rows })
}
