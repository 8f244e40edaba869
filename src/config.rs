use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

/// Controls the deterministic train/test partition.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitParams {
    /// Fraction of rows assigned to the test partition (must lie in (0,1)).
    pub test_size: f64,
    /// Seed for the stratified shuffle.
    pub random_state: u64,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
        }
    }
}

/// Controls TF-IDF vocabulary construction and weighting.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureParams {
    /// Upper bound on vocabulary size.
    pub max_features: usize,
    /// Inclusive word n-gram span `(min, max)` with `1 <= min <= max`.
    pub ngram_range: (usize, usize),
    /// Max fraction of documents a term may appear in to be retained.
    pub max_df: f64,
    /// Min number of documents a term must appear in to be retained.
    pub min_df: usize,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            max_features: 50_000,
            ngram_range: (1, 2),
            max_df: 0.9,
            min_df: 2,
        }
    }
}

/// Controls classifier fitting.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainParams {
    /// Iteration budget for the gradient-descent solver.
    pub max_iter: usize,
    /// Inverse regularization strength (larger means weaker regularization).
    pub c: f64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            c: 1.0,
        }
    }
}

/// Full pipeline configuration, validated once before any stage executes.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PipelineConfig {
    /// Split stage parameters.
    pub split: SplitParams,
    /// Feature extraction parameters.
    pub features: FeatureParams,
    /// Training parameters.
    pub train: TrainParams,
}

impl PipelineConfig {
    /// Load a configuration from a JSON params file.
    ///
    /// Unknown fields are rejected so a typo cannot silently fall back to a
    /// default value.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw).map_err(|err| {
            PipelineError::Config(format!(
                "invalid params file '{}': {err}",
                path.as_ref().display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every range rule, returning the first violation.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.split.test_size > 0.0 && self.split.test_size < 1.0) {
            return Err(PipelineError::Config(format!(
                "split.test_size must lie in (0,1), got {}",
                self.split.test_size
            )));
        }
        if self.features.max_features == 0 {
            return Err(PipelineError::Config(
                "features.max_features must be positive".into(),
            ));
        }
        let (min_n, max_n) = self.features.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(PipelineError::Config(format!(
                "features.ngram_range must satisfy 1 <= min <= max, got ({min_n}, {max_n})"
            )));
        }
        if !(self.features.max_df > 0.0 && self.features.max_df <= 1.0) {
            return Err(PipelineError::Config(format!(
                "features.max_df must lie in (0,1], got {}",
                self.features.max_df
            )));
        }
        if self.features.min_df == 0 {
            return Err(PipelineError::Config(
                "features.min_df must be at least 1".into(),
            ));
        }
        if self.train.max_iter == 0 {
            return Err(PipelineError::Config(
                "train.max_iter must be positive".into(),
            ));
        }
        if self.train.c <= 0.0 {
            return Err(PipelineError::Config(format!(
                "train.c must be positive, got {}",
                self.train.c
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        PipelineConfig::default().validate().expect("valid");
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut config = PipelineConfig::default();
        config.split.test_size = 1.0;
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));

        let mut config = PipelineConfig::default();
        config.split.test_size = 0.0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.features.max_features = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.features.ngram_range = (2, 1);
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.features.max_df = 1.5;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.features.min_df = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.train.max_iter = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.train.c = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_params_fields_are_rejected() {
        let raw = r#"{"split": {"test_size": 0.2, "random_state": 1, "shuffle": true}}"#;
        let parsed: Result<PipelineConfig, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn partial_params_fill_in_defaults() {
        let raw = r#"{"train": {"max_iter": 50, "c": 0.5}}"#;
        let parsed: PipelineConfig = serde_json::from_str(raw).expect("parse");
        assert_eq!(parsed.train.max_iter, 50);
        assert!((parsed.split.test_size - 0.2).abs() < 1e-12);
    }
}
