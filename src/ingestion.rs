use std::path::Path;

use tracing::info;

use crate::data::RawDataset;
use crate::errors::PipelineError;
use crate::store::ArtifactStore;

/// Copy the external dataset into the artifact store.
///
/// Reads the input CSV, captures its header row as the dataset schema, and
/// writes the raw artifact copy at the store's stable path. No validation
/// happens here; the validation gate consumes this stage's artifact.
pub fn ingest(store: &ArtifactStore, input: &Path) -> Result<RawDataset, PipelineError> {
    info!(input = %input.display(), "reading dataset");
    let dataset = store.read_raw_csv(input)?;
    info!(
        rows = dataset.len(),
        columns = dataset.columns.len(),
        "dataset loaded"
    );
    store.write_raw_csv(&store.raw_data(), &dataset)?;
    info!(output = %store.raw_data().display(), "raw dataset saved");
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn ingest_copies_the_dataset_into_the_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("input.csv");
        fs::write(&input, "review,sentiment\nnice film,positive\n").expect("write input");

        let store = ArtifactStore::new(dir.path().join("artifacts"));
        let dataset = ingest(&store, &input).expect("ingest");
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.columns, vec!["review", "sentiment"]);
        assert!(store.raw_data().exists());
    }

    #[test]
    fn missing_input_is_an_artifact_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ArtifactStore::new(dir.path());
        let err = ingest(&store, &dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Artifact(_)));
    }
}
