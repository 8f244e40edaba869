use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tracing::{debug, warn};

use crate::types::RunId;

/// Sink that records parameters, metrics, and the fitted model for a run.
///
/// A fire-and-forget side channel: implementations must swallow their own
/// failures (logging them) so the pipeline's primary artifact writes are
/// never aborted by tracking problems.
pub trait RunTracker {
    /// Open a new uniquely identified run.
    fn start_run(&self) -> RunId;
    /// Attach a configuration parameter to the run.
    fn log_param(&self, run: &RunId, key: &str, value: &str);
    /// Attach a metric value to the run.
    fn log_metric(&self, run: &RunId, key: &str, value: f64);
    /// Attach a copy of a fitted model artifact to the run.
    fn log_model(&self, run: &RunId, model_path: &Path, name: &str);
    /// Close the run, flushing anything buffered.
    fn end_run(&self, run: &RunId);
}

/// Tracker that records nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracker;

impl RunTracker for NoopTracker {
    fn start_run(&self) -> RunId {
        next_run_id()
    }

    fn log_param(&self, _run: &RunId, _key: &str, _value: &str) {}

    fn log_metric(&self, _run: &RunId, _key: &str, _value: f64) {}

    fn log_model(&self, _run: &RunId, _model_path: &Path, _name: &str) {}

    fn end_run(&self, _run: &RunId) {}
}

#[derive(Debug, Default)]
struct RunState {
    params: BTreeMap<String, String>,
    metrics: BTreeMap<String, f64>,
}

/// Tracker that writes each run under its own directory.
///
/// Layout: `<root>/<run_id>/params.json`, `<root>/<run_id>/metrics.json`,
/// plus a copy of any logged model. Filesystem failures are logged at `warn`
/// and otherwise ignored.
#[derive(Debug)]
pub struct FileRunTracker {
    root: PathBuf,
    open_runs: Mutex<BTreeMap<RunId, RunState>>,
}

impl FileRunTracker {
    /// Create a tracker rooted at `root`.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            open_runs: Mutex::new(BTreeMap::new()),
        }
    }

    fn run_dir(&self, run: &RunId) -> PathBuf {
        self.root.join(run)
    }

    fn with_run(&self, run: &RunId, apply: impl FnOnce(&mut RunState)) {
        let Ok(mut guard) = self.open_runs.lock() else {
            warn!(run = %run, "run tracker state poisoned; dropping update");
            return;
        };
        apply(guard.entry(run.clone()).or_default());
    }

    fn flush(&self, run: &RunId, state: &RunState) -> std::io::Result<()> {
        let dir = self.run_dir(run);
        fs::create_dir_all(&dir)?;
        let params = serde_json::to_string_pretty(&state.params).map_err(std::io::Error::other)?;
        fs::write(dir.join("params.json"), params)?;
        let metrics =
            serde_json::to_string_pretty(&state.metrics).map_err(std::io::Error::other)?;
        fs::write(dir.join("metrics.json"), metrics)?;
        Ok(())
    }
}

impl RunTracker for FileRunTracker {
    fn start_run(&self) -> RunId {
        let run = next_run_id();
        self.with_run(&run, |_| {});
        debug!(run = %run, "run started");
        run
    }

    fn log_param(&self, run: &RunId, key: &str, value: &str) {
        self.with_run(run, |state| {
            state.params.insert(key.to_string(), value.to_string());
        });
    }

    fn log_metric(&self, run: &RunId, key: &str, value: f64) {
        self.with_run(run, |state| {
            state.metrics.insert(key.to_string(), value);
        });
    }

    fn log_model(&self, run: &RunId, model_path: &Path, name: &str) {
        let dir = self.run_dir(run);
        let copy = || -> std::io::Result<()> {
            fs::create_dir_all(&dir)?;
            fs::copy(model_path, dir.join(name))?;
            Ok(())
        };
        if let Err(err) = copy() {
            warn!(run = %run, model = %model_path.display(), %err, "failed to log model");
        }
    }

    fn end_run(&self, run: &RunId) {
        let state = match self.open_runs.lock() {
            Ok(mut guard) => guard.remove(run),
            Err(_) => {
                warn!(run = %run, "run tracker state poisoned; run not flushed");
                return;
            }
        };
        let Some(state) = state else {
            return;
        };
        if let Err(err) = self.flush(run, &state) {
            warn!(run = %run, %err, "failed to flush run");
        } else {
            debug!(run = %run, "run flushed");
        }
    }
}

/// Unique run identifier: UTC timestamp plus a process-local counter.
fn next_run_id() -> RunId {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{seq}", Utc::now().format("%Y%m%dT%H%M%S%3f"))
}
