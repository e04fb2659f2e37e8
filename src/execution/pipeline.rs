//! Pipeline sequencer: stages 1 to 7 in order, each fed by the previous stage's output.

use std::path::Path;

use serde::Serialize;

use crate::processing::Stage;
use crate::types::BatchEntry;

use super::PipelineOptions;
use super::runner::{StageReport, run_stage};

/// Outcome of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    /// One report per stage that ran, in order.
    pub stages: Vec<StageReport>,
    /// The stage whose output batch was empty, if the run stopped early.
    pub halted_after: Option<Stage>,
    /// Merged-document entries from the last stage; `None` when the run halted early.
    pub output: Option<Vec<BatchEntry>>,
}

impl PipelineReport {
    /// `true` if every stage ran and produced output.
    pub fn completed(&self) -> bool {
        self.halted_after.is_none()
    }

    /// Every failure across all stages, in the order they happened.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &super::FailedFile)> {
        self.stages
            .iter()
            .flat_map(|s| s.failed.iter().map(move |f| (s.stage.as_str(), f)))
    }
}

/// Run all seven stages over `batch`.
///
/// Each stage's successful output becomes the next stage's input. If a stage yields no output
/// the run stops there; this is not an error, and files that failed along the way simply drop
/// out. Nothing is returned as `Err`: failures are in the per-stage reports and the logs.
pub fn run_pipeline(
    batch: &[BatchEntry],
    base_dir: impl AsRef<Path>,
    options: &PipelineOptions,
) -> PipelineReport {
    let base_dir = base_dir.as_ref();
    let observer = options.observer.as_ref();

    let mut stages = Vec::with_capacity(Stage::ALL.len());
    let mut current: Vec<BatchEntry> = batch.to_vec();
    let mut halted_after = None;

    for stage in Stage::ALL {
        let report = run_stage(stage, &current, base_dir, options);
        current = report.transformed.clone();
        stages.push(report);

        if current.is_empty() {
            observer.on_pipeline_halted(stage);
            halted_after = Some(stage);
            break;
        }
    }

    let output = match halted_after {
        Some(_) => None,
        None => Some(current),
    };
    let report = PipelineReport {
        stages,
        halted_after,
        output,
    };
    observer.on_pipeline_finished(&report);
    report
}
