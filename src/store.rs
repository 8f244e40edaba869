use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::constants::{artifacts, encoding};
use crate::data::{CleanDataset, CleanRecord, RawDataset};
use crate::errors::PipelineError;
use crate::splits::SplitLabel;

/// Filesystem-backed store for every pipeline artifact.
///
/// Artifacts live at stable paths under one root; parent directories are
/// created before any write, and re-running a stage overwrites the artifact
/// at the same logical path (overwrite semantics, never append).
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `root`. Nothing is written until a stage
    /// produces an artifact.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the ingested dataset copy.
    pub fn raw_data(&self) -> PathBuf {
        self.root.join(artifacts::RAW_DATA)
    }

    /// Path of the validated dataset.
    pub fn validated_data(&self) -> PathBuf {
        self.root.join(artifacts::VALIDATED_DATA)
    }

    /// Path of the normalized dataset.
    pub fn clean_data(&self) -> PathBuf {
        self.root.join(artifacts::CLEAN_DATA)
    }

    /// Path of one partition of the normalized dataset.
    pub fn partition_data(&self, label: SplitLabel) -> PathBuf {
        match label {
            SplitLabel::Train => self.root.join(artifacts::TRAIN_DATA),
            SplitLabel::Test => self.root.join(artifacts::TEST_DATA),
        }
    }

    /// Path of one partition's feature matrix.
    pub fn feature_matrix(&self, label: SplitLabel) -> PathBuf {
        match label {
            SplitLabel::Train => self.root.join(artifacts::X_TRAIN),
            SplitLabel::Test => self.root.join(artifacts::X_TEST),
        }
    }

    /// Path of one partition's label vector.
    pub fn label_vector(&self, label: SplitLabel) -> PathBuf {
        match label {
            SplitLabel::Train => self.root.join(artifacts::Y_TRAIN),
            SplitLabel::Test => self.root.join(artifacts::Y_TEST),
        }
    }

    /// Path of the fitted vectorizer.
    pub fn vectorizer(&self) -> PathBuf {
        self.root.join(artifacts::VECTORIZER)
    }

    /// Path of the trained model.
    pub fn model(&self) -> PathBuf {
        self.root.join(artifacts::MODEL)
    }

    /// Path of the metrics record.
    pub fn metrics(&self) -> PathBuf {
        self.root.join(artifacts::METRICS)
    }

    /// Path of the classification report.
    pub fn report(&self) -> PathBuf {
        self.root.join(artifacts::REPORT)
    }

    /// Directory for run-tracking output.
    pub fn runs_dir(&self) -> PathBuf {
        self.root.join(artifacts::RUNS_DIR)
    }

    /// Write a raw tabular dataset (schema header plus row cells).
    pub fn write_raw_csv(&self, path: &Path, dataset: &RawDataset) -> Result<(), PipelineError> {
        ensure_parent_dir(path)?;
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&dataset.columns)?;
        for row in &dataset.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        debug!(path = %path.display(), rows = dataset.len(), "wrote tabular artifact");
        Ok(())
    }

    /// Read a raw tabular dataset, capturing the header row as the schema.
    pub fn read_raw_csv(&self, path: &Path) -> Result<RawDataset, PipelineError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|err| artifact_error(path, &err.to_string()))?;
        let columns = reader
            .headers()
            .map_err(|err| artifact_error(path, &err.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(RawDataset { columns, rows })
    }

    /// Write a normalized dataset with `clean_review` and `label` columns.
    pub fn write_clean_csv(&self, path: &Path, dataset: &CleanDataset) -> Result<(), PipelineError> {
        ensure_parent_dir(path)?;
        let mut writer = csv::Writer::from_path(path)?;
        for row in &dataset.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        debug!(path = %path.display(), rows = dataset.len(), "wrote tabular artifact");
        Ok(())
    }

    /// Read a normalized dataset.
    pub fn read_clean_csv(&self, path: &Path) -> Result<CleanDataset, PipelineError> {
        let mut reader =
            csv::Reader::from_path(path).map_err(|err| artifact_error(path, &err.to_string()))?;
        let mut rows: Vec<CleanRecord> = Vec::new();
        for record in reader.deserialize() {
            rows.push(record?);
        }
        Ok(CleanDataset { rows })
    }

    /// Write a bitcode record under the versioned payload envelope.
    pub fn write_payload(
        &self,
        path: &Path,
        version: u8,
        record: &[u8],
    ) -> Result<(), PipelineError> {
        ensure_parent_dir(path)?;
        fs::write(path, encode_payload(version, record))?;
        debug!(path = %path.display(), version, "wrote binary artifact");
        Ok(())
    }

    /// Read a bitcode record, checking the envelope version.
    pub fn read_payload(&self, path: &Path, expected_version: u8) -> Result<Vec<u8>, PipelineError> {
        let bytes = fs::read(path).map_err(|err| artifact_error(path, &err.to_string()))?;
        decode_payload(&bytes, expected_version).map_err(|reason| artifact_error(path, &reason))
    }

    /// Write a JSON artifact.
    pub fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), PipelineError> {
        ensure_parent_dir(path)?;
        let raw = serde_json::to_string_pretty(value)
            .map_err(|err| artifact_error(path, &err.to_string()))?;
        fs::write(path, raw)?;
        debug!(path = %path.display(), "wrote json artifact");
        Ok(())
    }

    /// Read a JSON artifact.
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, PipelineError> {
        let raw = fs::read_to_string(path).map_err(|err| artifact_error(path, &err.to_string()))?;
        serde_json::from_str(&raw).map_err(|err| artifact_error(path, &err.to_string()))
    }

    /// Write a plain-text artifact.
    pub fn write_text(&self, path: &Path, text: &str) -> Result<(), PipelineError> {
        ensure_parent_dir(path)?;
        fs::write(path, text)?;
        debug!(path = %path.display(), "wrote text artifact");
        Ok(())
    }
}

/// Create the parent directory of `path` when missing.
pub fn ensure_parent_dir(path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Wrap a bitcode record as `[version, prefix, payload...]`.
fn encode_payload(version: u8, record: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(2 + record.len());
    buf.push(version);
    buf.push(encoding::PAYLOAD_PREFIX);
    buf.extend_from_slice(record);
    buf
}

/// Strip and verify the payload envelope.
fn decode_payload(bytes: &[u8], expected_version: u8) -> Result<Vec<u8>, String> {
    match bytes {
        [] | [_] => Err("payload truncated".into()),
        [version, _, ..] if *version != expected_version => Err(format!(
            "record version mismatch (expected {expected_version}, found {version})"
        )),
        [_, prefix, ..] if *prefix != encoding::PAYLOAD_PREFIX => {
            Err("payload prefix marker missing".into())
        }
        [_, _, rest @ ..] => Ok(rest.to_vec()),
    }
}

fn artifact_error(path: &Path, reason: &str) -> PipelineError {
    PipelineError::Artifact(format!("{}: {reason}", path.display()))
}
