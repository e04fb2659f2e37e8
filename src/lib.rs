//! `sheet-normalizer` turns downloaded survey-report spreadsheets into clean, merged tables.
//!
//! Report files arrive with title rows, metadata lines, boilerplate sheets, total and
//! percentage columns, and questions printed above their answer options. The pipeline applies
//! seven stages to a batch of files, one file at a time:
//!
//! 1. drop boilerplate sheets (`Overview`, `Content`, `Lists`)
//! 2. promote the first numeric row to the header and strip empty columns
//! 3. strip metadata rows (`Survey period`, `Base n =`, ...)
//! 4. collapse runs of blank rows
//! 5. drop `Grand Total` / `in %` columns
//! 6. fold question text into the option rows below it
//! 7. merge all sheets into one
//!
//! Each stage writes its result to `<parent>/transformed/<file name>` and hands the written
//! paths to the next stage. Inputs are never modified. A file that fails is logged, listed in
//! the stage report and dropped; the rest of the batch carries on.
//!
//! ## Quick example: run the whole pipeline
//!
//! ```no_run
//! use std::path::Path;
//!
//! use sheet_normalizer::config::NormalizeConfig;
//! use sheet_normalizer::execution::{run_pipeline, PipelineOptions};
//! use sheet_normalizer::ingestion::discover_batch;
//!
//! # fn main() -> Result<(), sheet_normalizer::NormalizeError> {
//! sheet_normalizer::logging::init_logging(Some(Path::new("normalize.log")))?;
//!
//! let options = PipelineOptions::with_config(NormalizeConfig::default());
//! let batch = discover_batch("report_data", &options.config)?;
//! let report = run_pipeline(&batch, "report_data", &options);
//!
//! for entry in report.output.unwrap_or_default() {
//!     println!("merged: {}", entry.path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Running a single stage
//!
//! ```no_run
//! use sheet_normalizer::execution::{run_stage, PipelineOptions};
//! use sheet_normalizer::processing::Stage;
//! use sheet_normalizer::types::BatchEntry;
//!
//! let batch = vec![
//!     BatchEntry::new("retail/consumer_survey.xlsx"),
//!     BatchEntry::specially_formatted("retail/brand_tracker_adv.xlsx"),
//! ];
//! let report = run_stage(Stage::DropBoilerplateSheets, &batch, "report_data", &PipelineOptions::default());
//! println!("ok={} failed={}", report.transformed.len(), report.failed.len());
//! ```
//!
//! ## Modules
//!
//! - [`types`]: cells, sheets, documents, tables and batch entries
//! - [`processing`]: the seven stage transforms (pure, in-memory)
//! - [`execution`]: stage runner, pipeline sequencer and observers
//! - [`ingestion`]: spreadsheet reading and batch discovery
//! - [`export`]: spreadsheet writing
//! - [`config`]: marker vocabularies and other settings
//! - [`logging`]: tracing subscriber setup
//! - [`error`]: error type

pub mod config;
pub mod error;
pub mod execution;
pub mod export;
pub mod ingestion;
pub mod logging;
pub mod processing;
pub mod types;

pub use error::{NormalizeError, NormalizeResult};
