use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::error::NormalizeError;

use super::pipeline::PipelineReport;
use super::runner::StageReport;
use crate::processing::Stage;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    /// Informational event.
    Info,
    /// Warning-level event (file dropped, batch continues).
    Warning,
    /// The file's content could not be transformed.
    Error,
    /// I/O or write failures.
    Critical,
}

/// Map a per-file error to the severity it is reported with.
pub fn severity_for_error(e: &NormalizeError) -> Severity {
    match e {
        NormalizeError::MissingInput { .. } => Severity::Warning,
        NormalizeError::Io(_) | NormalizeError::Write(_) => Severity::Critical,
        NormalizeError::Excel(_)
        | NormalizeError::Malformed { .. }
        | NormalizeError::Config { .. }
        | NormalizeError::Toml(_)
        | NormalizeError::Logging { .. } => Severity::Error,
    }
}

/// Which file a callback is about.
#[derive(Debug, Clone)]
pub struct FileContext {
    /// Label of the running stage (e.g. `step 3: removing metadata rows`).
    pub stage: String,
    /// Batch entry path, relative to the base directory.
    pub path: PathBuf,
}

/// Observer interface for pipeline progress.
///
/// Every method has a no-op default so implementors pick the events they care about.
pub trait PipelineObserver: Send + Sync {
    /// Called before the first file of a stage is processed.
    fn on_stage_started(&self, _stage: &str, _input_count: usize) {}

    /// Called after a file was transformed and written to `_output` (relative path).
    fn on_file_transformed(&self, _ctx: &FileContext, _output: &Path) {}

    /// Called when a file passes through a stage unchanged.
    fn on_file_skipped(&self, _ctx: &FileContext) {}

    /// Called when a file fails; the file is dropped from the batch.
    fn on_file_failed(&self, _ctx: &FileContext, _severity: Severity, _error: &NormalizeError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_file_failed`].
    fn on_alert(&self, ctx: &FileContext, severity: Severity, error: &NormalizeError) {
        self.on_file_failed(ctx, severity, error)
    }

    /// Called with the stage summary once every file was processed.
    fn on_stage_finished(&self, _report: &StageReport) {}

    /// Called when a stage produced no output and the pipeline stops.
    fn on_pipeline_halted(&self, _stage: Stage) {}

    /// Called once when a pipeline run ends (halted or not).
    fn on_pipeline_finished(&self, _report: &PipelineReport) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_stage_started(&self, stage: &str, input_count: usize) {
        for o in &self.observers {
            o.on_stage_started(stage, input_count);
        }
    }

    fn on_file_transformed(&self, ctx: &FileContext, output: &Path) {
        for o in &self.observers {
            o.on_file_transformed(ctx, output);
        }
    }

    fn on_file_skipped(&self, ctx: &FileContext) {
        for o in &self.observers {
            o.on_file_skipped(ctx);
        }
    }

    fn on_file_failed(&self, ctx: &FileContext, severity: Severity, error: &NormalizeError) {
        for o in &self.observers {
            o.on_file_failed(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &FileContext, severity: Severity, error: &NormalizeError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }

    fn on_stage_finished(&self, report: &StageReport) {
        for o in &self.observers {
            o.on_stage_finished(report);
        }
    }

    fn on_pipeline_halted(&self, stage: Stage) {
        for o in &self.observers {
            o.on_pipeline_halted(stage);
        }
    }

    fn on_pipeline_finished(&self, report: &PipelineReport) {
        for o in &self.observers {
            o.on_pipeline_finished(report);
        }
    }
}

/// Emits pipeline events as `tracing` events. This is the default observer.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_stage_started(&self, stage: &str, input_count: usize) {
        info!(stage, input_count, "Starting {stage}");
    }

    fn on_file_transformed(&self, ctx: &FileContext, output: &Path) {
        info!(
            stage = %ctx.stage,
            path = %ctx.path.display(),
            output = %output.display(),
            "file transformed"
        );
    }

    fn on_file_skipped(&self, ctx: &FileContext) {
        info!(
            stage = %ctx.stage,
            path = %ctx.path.display(),
            "Skipping specially formatted file"
        );
    }

    fn on_file_failed(&self, ctx: &FileContext, severity: Severity, error: &NormalizeError) {
        match severity {
            Severity::Info | Severity::Warning => warn!(
                stage = %ctx.stage,
                path = %ctx.path.display(),
                "{error}. Skipping transformation."
            ),
            Severity::Error | Severity::Critical => error!(
                stage = %ctx.stage,
                path = %ctx.path.display(),
                ?severity,
                "An error occurred while processing file: {error}"
            ),
        }
    }

    fn on_alert(&self, ctx: &FileContext, severity: Severity, error: &NormalizeError) {
        error!(
            stage = %ctx.stage,
            path = %ctx.path.display(),
            ?severity,
            "ALERT: {error}"
        );
    }

    fn on_stage_finished(&self, report: &StageReport) {
        info!(
            stage = %report.stage,
            selected = report.input_count,
            succeeded = report.transformed.len(),
            failed = report.failed.len(),
            "Selected files to transform: {}",
            report.input_count
        );
        if !report.transformed.is_empty() {
            info!("Successfully saved:");
            for entry in &report.transformed {
                info!("    {}", entry.path.display());
            }
        }
        if !report.failed.is_empty() {
            error!("Errors occurred during transformation for the following files:");
            for failed in &report.failed {
                error!("    {}", failed.path.display());
            }
        }
    }

    fn on_pipeline_halted(&self, stage: Stage) {
        warn!(%stage, "No files to process after {stage}. Exiting pipeline.");
    }

    fn on_pipeline_finished(&self, report: &PipelineReport) {
        match report.halted_after {
            Some(_) => info!(stages_run = report.stages.len(), "Transformation pipeline halted early."),
            None => info!(
                stages_run = report.stages.len(),
                outputs = report.output.as_ref().map_or(0, Vec::len),
                "Transformation pipeline completed."
            ),
        }
    }
}

/// Appends one JSON object per event to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, level: &str, event: &str, fields: serde_json::Value) {
        let line = json!({
            "ts": chrono::Utc::now().to_rfc3339(),
            "level": level,
            "event": event,
            "fields": fields,
        });
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_stage_started(&self, stage: &str, input_count: usize) {
        self.append(
            "INFO",
            "stage_started",
            json!({ "stage": stage, "input_count": input_count }),
        );
    }

    fn on_file_transformed(&self, ctx: &FileContext, output: &Path) {
        self.append(
            "INFO",
            "file_transformed",
            json!({
                "stage": ctx.stage,
                "path": ctx.path.display().to_string(),
                "output": output.display().to_string(),
            }),
        );
    }

    fn on_file_skipped(&self, ctx: &FileContext) {
        self.append(
            "INFO",
            "file_skipped",
            json!({ "stage": ctx.stage, "path": ctx.path.display().to_string() }),
        );
    }

    fn on_file_failed(&self, ctx: &FileContext, severity: Severity, error: &NormalizeError) {
        let level = if severity <= Severity::Warning { "WARNING" } else { "ERROR" };
        self.append(
            level,
            "file_failed",
            json!({
                "stage": ctx.stage,
                "path": ctx.path.display().to_string(),
                "severity": severity,
                "error": error.to_string(),
            }),
        );
    }

    fn on_alert(&self, ctx: &FileContext, severity: Severity, error: &NormalizeError) {
        self.append(
            "ERROR",
            "alert",
            json!({
                "stage": ctx.stage,
                "path": ctx.path.display().to_string(),
                "severity": severity,
                "error": error.to_string(),
            }),
        );
    }

    fn on_stage_finished(&self, report: &StageReport) {
        let fields = serde_json::to_value(report).unwrap_or_default();
        self.append("INFO", "stage_finished", fields);
    }

    fn on_pipeline_halted(&self, stage: Stage) {
        self.append("WARNING", "pipeline_halted", json!({ "stage": stage.to_string() }));
    }

    fn on_pipeline_finished(&self, report: &PipelineReport) {
        self.append(
            "INFO",
            "pipeline_finished",
            json!({
                "stages_run": report.stages.len(),
                "halted_after": report.halted_after.map(|s| s.to_string()),
                "output": report
                    .output
                    .as_ref()
                    .map(|entries| paths(entries)),
            }),
        );
    }
}

fn paths(entries: &[crate::types::BatchEntry]) -> Vec<String> {
    entries.iter().map(|e| e.path.display().to_string()).collect()
}
