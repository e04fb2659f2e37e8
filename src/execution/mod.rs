//! Running stages over batches of files on disk.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - [`process_batch`]: the generic per-file harness (read, transform, write, isolate failures)
//! - [`run_stage`]: one of the seven stages over a batch
//! - [`run_pipeline`]: all seven stages in order, halting when a stage yields nothing
//! - observer hooks ([`PipelineObserver`]) for logging and alerting
//!
//! Everything runs sequentially on the calling thread; files are processed one at a time.
//! Callers must keep other writers out of the base directory during a run.

mod observer;
mod pipeline;
mod runner;

use std::fmt;
use std::sync::Arc;

use crate::config::NormalizeConfig;

pub use observer::{
    CompositeObserver, FileContext, FileObserver, PipelineObserver, Severity, TracingObserver,
    severity_for_error,
};
pub use pipeline::{PipelineReport, run_pipeline};
pub use runner::{FailedFile, StageReport, output_location, process_batch, run_stage};

/// Options shared by every stage of a run.
///
/// Use [`Default`] for the built-in vocabulary and `tracing` logging.
#[derive(Clone)]
pub struct PipelineOptions {
    /// Marker vocabularies, names and flags used by the stages.
    pub config: NormalizeConfig,
    /// Receives progress, failures and summaries.
    pub observer: Arc<dyn PipelineObserver>,
    /// Severity at which `on_alert` is invoked in addition to `on_file_failed`.
    pub alert_at_or_above: Severity,
}

impl PipelineOptions {
    /// Default options with a custom configuration.
    pub fn with_config(config: NormalizeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Replace the observer.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }
}

impl fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("config", &self.config)
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish_non_exhaustive()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            config: NormalizeConfig::default(),
            observer: Arc::new(TracingObserver),
            alert_at_or_above: Severity::Critical,
        }
    }
}
