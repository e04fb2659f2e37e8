//! Generic stage runner: apply one transform to every file of a batch in isolation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{NormalizeError, NormalizeResult};
use crate::export::write_stage_output;
use crate::ingestion::read_document;
use crate::processing::Stage;
use crate::types::{BatchEntry, Document, StageOutput};

use super::PipelineOptions;
use super::observer::{FileContext, Severity, severity_for_error};

/// A file that a stage could not process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedFile {
    /// The batch identifier as it was passed in.
    pub path: PathBuf,
    pub severity: Severity,
    /// Rendered error message.
    pub error: String,
}

/// Outcome of running one stage over a batch.
///
/// `transformed` and `failed` are disjoint; together they cover every input entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    /// Stage label used in logs.
    pub stage: String,
    /// Number of entries in the input batch.
    pub input_count: usize,
    /// Entries for the next stage: written outputs, plus skipped inputs at their original path.
    pub transformed: Vec<BatchEntry>,
    /// Entries that failed, with their error.
    pub failed: Vec<FailedFile>,
}

impl StageReport {
    /// Relative paths of the successfully transformed files.
    pub fn transformed_paths(&self) -> Vec<&Path> {
        self.transformed.iter().map(|e| e.path.as_path()).collect()
    }

    /// Relative paths of the failed files.
    pub fn failed_paths(&self) -> Vec<&Path> {
        self.failed.iter().map(|f| f.path.as_path()).collect()
    }
}

enum FileOutcome {
    Transformed(BatchEntry),
    Skipped(BatchEntry),
}

/// Apply `transform` to each file of `batch`, one at a time, and persist the results.
///
/// For every entry:
///
/// - a path missing under `base_dir` is recorded as failed
/// - an entry matching `skip` is passed through at its original path
/// - otherwise the file is loaded, transformed and written to
///   `<parent>/<output_dir_name>/<file name>` (reusing `<parent>` when it already is the output
///   directory)
///
/// Any error is confined to its file: the file is listed in [`StageReport::failed`], reported to
/// the observer, and the batch continues. An empty batch produces an empty report and touches
/// nothing on disk.
pub fn process_batch<F>(
    label: &str,
    batch: &[BatchEntry],
    base_dir: impl AsRef<Path>,
    mut transform: F,
    skip: Option<&dyn Fn(&BatchEntry) -> bool>,
    options: &PipelineOptions,
) -> StageReport
where
    F: FnMut(&Document) -> NormalizeResult<StageOutput>,
{
    let base_dir = base_dir.as_ref();
    let observer = options.observer.as_ref();
    observer.on_stage_started(label, batch.len());

    let mut report = StageReport {
        stage: label.to_string(),
        input_count: batch.len(),
        transformed: Vec::with_capacity(batch.len()),
        failed: Vec::new(),
    };

    for entry in batch {
        let ctx = FileContext {
            stage: label.to_string(),
            path: entry.path.clone(),
        };

        match process_file(entry, base_dir, &mut transform, skip, &options.config.output_dir_name) {
            Ok(FileOutcome::Transformed(out)) => {
                observer.on_file_transformed(&ctx, &out.path);
                report.transformed.push(out);
            }
            Ok(FileOutcome::Skipped(out)) => {
                observer.on_file_skipped(&ctx);
                report.transformed.push(out);
            }
            Err(e) => {
                let severity = severity_for_error(&e);
                observer.on_file_failed(&ctx, severity, &e);
                if severity >= options.alert_at_or_above {
                    observer.on_alert(&ctx, severity, &e);
                }
                report.failed.push(FailedFile {
                    path: entry.path.clone(),
                    severity,
                    error: e.to_string(),
                });
            }
        }
    }

    observer.on_stage_finished(&report);
    report
}

/// Run one of the seven pipeline stages over `batch`.
///
/// [`Stage::NormalizeHeader`] passes specially-formatted entries through unchanged.
pub fn run_stage(
    stage: Stage,
    batch: &[BatchEntry],
    base_dir: impl AsRef<Path>,
    options: &PipelineOptions,
) -> StageReport {
    let skip_special = |e: &BatchEntry| e.specially_formatted;
    let skip: Option<&dyn Fn(&BatchEntry) -> bool> = if stage.skips_specially_formatted() {
        Some(&skip_special)
    } else {
        None
    };

    process_batch(
        &stage.to_string(),
        batch,
        base_dir,
        |doc| stage.apply(doc, &options.config),
        skip,
        options,
    )
}

fn process_file<F>(
    entry: &BatchEntry,
    base_dir: &Path,
    transform: &mut F,
    skip: Option<&dyn Fn(&BatchEntry) -> bool>,
    output_dir_name: &str,
) -> NormalizeResult<FileOutcome>
where
    F: FnMut(&Document) -> NormalizeResult<StageOutput>,
{
    let input = base_dir.join(&entry.path);
    if !input.exists() {
        return Err(NormalizeError::MissingInput {
            path: entry.path.clone(),
        });
    }

    if skip.is_some_and(|pred| pred(entry)) {
        return Ok(FileOutcome::Skipped(entry.clone()));
    }

    let output = output_location(&input, output_dir_name)?;

    let doc = read_document(&input)?;
    let result = transform(&doc)?;
    drop(doc);

    if let Some(dir) = output.parent() {
        fs::create_dir_all(dir)?;
    }
    write_stage_output(&output, &result)?;

    let relative = output
        .strip_prefix(base_dir)
        .map(Path::to_path_buf)
        .unwrap_or(output.clone());
    Ok(FileOutcome::Transformed(entry.with_path(relative)))
}

/// `<parent>/<output_dir_name>/<file name>`, or `<parent>/<file name>` when `<parent>` already is
/// an output directory.
pub fn output_location(input: &Path, output_dir_name: &str) -> NormalizeResult<PathBuf> {
    let file_name = input.file_name().ok_or_else(|| {
        NormalizeError::malformed(format!("'{}' has no file name", input.display()))
    })?;
    let parent = input.parent().unwrap_or_else(|| Path::new(""));

    let out_dir = if parent.file_name().and_then(|n| n.to_str()) == Some(output_dir_name) {
        parent.to_path_buf()
    } else {
        parent.join(output_dir_name)
    };
    Ok(out_dir.join(file_name))
}
