//! Operator entry point: run the whole pipeline or a single stage.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use sentiment_pipeline::{
    ArtifactStore, FileRunTracker, Pipeline, PipelineConfig, RunTracker,
};

/// Train a sentiment classifier from a labeled review CSV, producing a
/// reproducible artifact at every stage.
#[derive(Parser, Debug)]
#[command(name = "run-pipeline", version)]
struct Cli {
    /// Input CSV with `review` and `sentiment` columns.
    #[arg(long)]
    input: PathBuf,

    /// Artifact store root directory.
    #[arg(long, default_value = "artifacts")]
    artifacts: PathBuf,

    /// Optional JSON params file; defaults apply when omitted.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Run a single stage in isolation instead of the whole pipeline.
    #[arg(long, value_enum)]
    stage: Option<Stage>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Stage {
    Ingest,
    Validate,
    Preprocess,
    Split,
    Features,
    Train,
    Evaluate,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentiment_pipeline=info,run_pipeline=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pipeline failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<(), sentiment_pipeline::PipelineError> {
    let config = match &cli.params {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    let store = ArtifactStore::new(&cli.artifacts);
    let tracker = FileRunTracker::new(store.runs_dir());
    let pipeline = Pipeline::new(config, store, &tracker)?;

    match cli.stage {
        None => {
            let artifacts = pipeline.run(&cli.input)?;
            println!(
                "run {} complete: accuracy={:.4} f1={:.4}",
                artifacts.run_id, artifacts.metrics.accuracy, artifacts.metrics.f1_score
            );
            println!("model: {}", artifacts.model_path.display());
            println!("report: {}", artifacts.report_path.display());
        }
        Some(Stage::Ingest) => {
            pipeline.run_ingestion(&cli.input)?;
        }
        Some(Stage::Validate) => {
            pipeline.run_validation()?;
        }
        Some(Stage::Preprocess) => {
            pipeline.run_preprocessing()?;
        }
        Some(Stage::Split) => {
            pipeline.run_split()?;
        }
        Some(Stage::Features) => {
            pipeline.run_features()?;
        }
        Some(Stage::Train) => {
            let run = tracker.start_run();
            let result = pipeline.run_training(&run);
            tracker.end_run(&run);
            result?;
        }
        Some(Stage::Evaluate) => {
            let run = tracker.start_run();
            let result = pipeline.run_evaluation(&run);
            tracker.end_run(&run);
            result?;
        }
    }
    Ok(())
}
