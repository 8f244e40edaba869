use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::PipelineConfig;
use crate::constants::{columns, encoding};
use crate::data::{CleanDataset, RawDataset};
use crate::errors::PipelineError;
use crate::features::{
    FittedVectorizer, PersistedMatrix, PersistedVectorizer, SparseMatrix, TfidfVectorizer,
};
use crate::ingestion;
use crate::metrics::Metrics;
use crate::model::{self, Model, PersistedModel};
use crate::preprocess;
use crate::splits::{SplitLabel, stratified_split};
use crate::store::ArtifactStore;
use crate::tracking::RunTracker;
use crate::types::RunId;
use crate::validation::{ValidationSummary, validate};

/// Durable outputs of one pipeline execution.
#[derive(Clone, Debug)]
pub struct RunArtifacts {
    /// Identifier the run tracker associated with this execution.
    pub run_id: RunId,
    /// Path of the serialized model.
    pub model_path: PathBuf,
    /// Path of the serialized fitted vectorizer.
    pub vectorizer_path: PathBuf,
    /// Evaluation metrics.
    pub metrics: Metrics,
    /// Path of the plain-text classification report.
    pub report_path: PathBuf,
}

/// Sequential stage orchestrator.
///
/// Stages execute strictly in order, each consuming the previous stage's
/// persisted artifact, and every stage is also callable in isolation (it
/// re-reads its declared inputs from the store). A failed stage aborts the
/// run and all unstarted downstream stages; no partial artifact is
/// considered valid and nothing is retried automatically.
pub struct Pipeline<'a, T: RunTracker> {
    config: PipelineConfig,
    store: ArtifactStore,
    tracker: &'a T,
}

impl<'a, T: RunTracker> Pipeline<'a, T> {
    /// Create a pipeline. The configuration is validated immediately so an
    /// invalid value aborts before any stage runs.
    pub fn new(
        config: PipelineConfig,
        store: ArtifactStore,
        tracker: &'a T,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            tracker,
        })
    }

    /// Artifact store backing this pipeline.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Execute every stage in order on the dataset at `input`.
    pub fn run(&self, input: &Path) -> Result<RunArtifacts, PipelineError> {
        self.run_ingestion(input)?;
        self.run_validation()?;
        self.run_preprocessing()?;
        self.run_split()?;
        self.run_features()?;
        let run_id = self.tracker.start_run();
        let outcome = self
            .run_training(&run_id)
            .and_then(|_| self.run_evaluation(&run_id));
        self.tracker.end_run(&run_id);
        let metrics = outcome?;
        Ok(RunArtifacts {
            run_id,
            model_path: self.store.model(),
            vectorizer_path: self.store.vectorizer(),
            metrics,
            report_path: self.store.report(),
        })
    }

    /// Ingestion stage: copy the external dataset into the store.
    pub fn run_ingestion(&self, input: &Path) -> Result<RawDataset, PipelineError> {
        ingestion::ingest(&self.store, input)
    }

    /// Validation stage: gate the raw artifact on schema and non-emptiness.
    pub fn run_validation(&self) -> Result<ValidationSummary, PipelineError> {
        let raw_path = self.store.raw_data();
        let dataset = self.store.read_raw_csv(&raw_path)?;
        let summary = validate(&dataset, &columns::EXPECTED, &raw_path)?;
        self.store
            .write_raw_csv(&self.store.validated_data(), &dataset)?;
        info!(output = %self.store.validated_data().display(), "validation passed");
        Ok(summary)
    }

    /// Preprocessing stage: normalize the validated artifact.
    pub fn run_preprocessing(&self) -> Result<CleanDataset, PipelineError> {
        let dataset = self.store.read_raw_csv(&self.store.validated_data())?;
        let clean = preprocess::preprocess(&dataset)?;
        self.store.write_clean_csv(&self.store.clean_data(), &clean)?;
        info!(output = %self.store.clean_data().display(), rows = clean.len(), "preprocessing saved");
        Ok(clean)
    }

    /// Split stage: deterministic stratified partition of the clean artifact.
    pub fn run_split(&self) -> Result<(CleanDataset, CleanDataset), PipelineError> {
        let clean = self.store.read_clean_csv(&self.store.clean_data())?;
        let (train, test) = stratified_split(
            &clean,
            self.config.split.test_size,
            self.config.split.random_state,
        )?;
        self.store
            .write_clean_csv(&self.store.partition_data(SplitLabel::Train), &train)?;
        self.store
            .write_clean_csv(&self.store.partition_data(SplitLabel::Test), &test)?;
        info!(
            train = train.len(),
            test = test.len(),
            "partitions saved"
        );
        Ok((train, test))
    }

    /// Feature stage: fit TF-IDF on the train partition only, transform both
    /// partitions, and persist vectorizer, matrices, and label vectors.
    ///
    /// The five writes succeed together or the stage fails.
    pub fn run_features(&self) -> Result<FittedVectorizer, PipelineError> {
        let train = self
            .store
            .read_clean_csv(&self.store.partition_data(SplitLabel::Train))?;
        let test = self
            .store
            .read_clean_csv(&self.store.partition_data(SplitLabel::Test))?;

        let vectorizer = TfidfVectorizer::new(self.config.features);
        let fitted = vectorizer.fit(&train.texts())?;
        let x_train = fitted.transform(&train.texts());
        let x_test = fitted.transform(&test.texts());

        self.write_matrix(SplitLabel::Train, &x_train)?;
        self.write_labels(SplitLabel::Train, &train.labels())?;
        self.write_matrix(SplitLabel::Test, &x_test)?;
        self.write_labels(SplitLabel::Test, &test.labels())?;
        self.store.write_payload(
            &self.store.vectorizer(),
            encoding::VECTORIZER_RECORD_VERSION,
            &bitcode::encode(&PersistedVectorizer::from(&fitted)),
        )?;
        info!(
            vocabulary = fitted.vocabulary_size(),
            "feature artifacts saved"
        );
        Ok(fitted)
    }

    /// Training stage: fit the classifier on the persisted train features.
    ///
    /// The run tracker receives the training parameters and a copy of the
    /// fitted model; tracker failures never abort the stage.
    pub fn run_training(&self, run: &RunId) -> Result<Model, PipelineError> {
        let x_train = self.read_matrix(SplitLabel::Train)?;
        let y_train = self.read_labels(SplitLabel::Train)?;

        self.tracker
            .log_param(run, "max_iter", &self.config.train.max_iter.to_string());
        self.tracker.log_param(run, "c", &self.config.train.c.to_string());
        self.tracker.log_param(
            run,
            "random_state",
            &self.config.split.random_state.to_string(),
        );

        let trained = model::train(&x_train, &y_train, &self.config.train)?;
        self.store.write_payload(
            &self.store.model(),
            encoding::MODEL_RECORD_VERSION,
            &bitcode::encode(&PersistedModel::from(&trained)),
        )?;
        self.tracker.log_model(run, &self.store.model(), "model.bin");
        info!(output = %self.store.model().display(), "model saved");
        Ok(trained)
    }

    /// Evaluation stage: score the persisted model on the test features and
    /// persist the metrics record and classification report.
    pub fn run_evaluation(&self, run: &RunId) -> Result<Metrics, PipelineError> {
        let record: PersistedModel = self.decode_record(
            &self.store.model(),
            encoding::MODEL_RECORD_VERSION,
        )?;
        let trained = Model::from(record);
        let x_test = self.read_matrix(SplitLabel::Test)?;
        let y_test = self.read_labels(SplitLabel::Test)?;

        let outcome = model::evaluate(&trained, &x_test, &y_test)?;
        self.store.write_json(&self.store.metrics(), &outcome.metrics)?;
        self.store
            .write_text(&self.store.report(), &outcome.report.to_string())?;
        self.tracker
            .log_metric(run, "accuracy", outcome.metrics.accuracy);
        self.tracker
            .log_metric(run, "f1_score", outcome.metrics.f1_score);
        info!(output = %self.store.metrics().display(), "evaluation artifacts saved");
        Ok(outcome.metrics)
    }

    /// Reload the persisted fitted vectorizer.
    pub fn load_vectorizer(&self) -> Result<FittedVectorizer, PipelineError> {
        let record: PersistedVectorizer = self.decode_record(
            &self.store.vectorizer(),
            encoding::VECTORIZER_RECORD_VERSION,
        )?;
        FittedVectorizer::try_from(record)
    }

    fn write_matrix(&self, label: SplitLabel, matrix: &SparseMatrix) -> Result<(), PipelineError> {
        self.store.write_payload(
            &self.store.feature_matrix(label),
            encoding::MATRIX_RECORD_VERSION,
            &bitcode::encode(&PersistedMatrix::from(matrix)),
        )
    }

    fn read_matrix(&self, label: SplitLabel) -> Result<SparseMatrix, PipelineError> {
        let record: PersistedMatrix = self.decode_record(
            &self.store.feature_matrix(label),
            encoding::MATRIX_RECORD_VERSION,
        )?;
        SparseMatrix::try_from(record)
    }

    fn write_labels(&self, label: SplitLabel, labels: &[u8]) -> Result<(), PipelineError> {
        self.store.write_payload(
            &self.store.label_vector(label),
            encoding::LABELS_RECORD_VERSION,
            &bitcode::encode(&labels.to_vec()),
        )
    }

    fn read_labels(&self, label: SplitLabel) -> Result<Vec<u8>, PipelineError> {
        self.decode_record(
            &self.store.label_vector(label),
            encoding::LABELS_RECORD_VERSION,
        )
    }

    fn decode_record<R: for<'de> bitcode::Decode<'de>>(
        &self,
        path: &Path,
        version: u8,
    ) -> Result<R, PipelineError> {
        let raw = self.store.read_payload(path, version)?;
        bitcode::decode(&raw).map_err(|err| {
            PipelineError::Artifact(format!("failed to decode {}: {err}", path.display()))
        })
    }
}
