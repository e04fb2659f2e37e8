//! The seven normalization stages.
//!
//! Each stage is a pure transform over an in-memory [`crate::types::Document`]; the per-stage
//! modules expose the table-level functions so they can be used (and tested) without touching
//! the filesystem:
//!
//! | # | [`Stage`] | Function |
//! |---|---|---|
//! | 1 | [`Stage::DropBoilerplateSheets`] | [`drop_boilerplate_sheets`] |
//! | 2 | [`Stage::NormalizeHeader`] | [`normalize_header`] |
//! | 3 | [`Stage::StripMetadataRows`] | [`strip_metadata_rows`] |
//! | 4 | [`Stage::CollapseBlankRows`] | [`collapse_blank_runs`] |
//! | 5 | [`Stage::DropAggregateColumns`] | [`drop_marked_columns`] |
//! | 6 | [`Stage::FoldQuestions`] | [`fold_questions`] |
//! | 7 | [`Stage::MergeSheets`] | [`merge_sheets`] |
//!
//! ## Example: clean one sheet in memory
//!
//! ```rust
//! use sheet_normalizer::config::NormalizeConfig;
//! use sheet_normalizer::processing::{collapse_blank_runs, fold_questions, normalize_header};
//! use sheet_normalizer::types::Cell;
//!
//! let config = NormalizeConfig::default();
//! let raw = vec![
//!     vec![Cell::from("Statistic: brand preference")],
//!     vec![Cell::Empty, Cell::Number(2024.0)],
//!     vec![Cell::from("Which brand do you prefer?")],
//!     vec![Cell::from("A"), Cell::Number(0.6)],
//!     vec![],
//!     vec![],
//!     vec![Cell::from("B"), Cell::Number(0.4)],
//! ];
//!
//! let mut table = normalize_header(&raw, &config.placeholder_prefix).unwrap();
//! collapse_blank_runs(&mut table);
//! fold_questions(&mut table);
//!
//! assert_eq!(table.rows[0][0], Cell::from("Which brand do you prefer? A"));
//! assert_eq!(table.row_count(), 3);
//! ```

pub mod aggregates;
pub mod blank_rows;
pub mod drop_sheets;
pub mod header;
pub mod merge;
pub mod metadata;
pub mod questions;

use std::fmt;

use serde::Serialize;

use crate::config::NormalizeConfig;
use crate::error::{NormalizeError, NormalizeResult};
use crate::types::{Document, StageOutput, Table};

pub use aggregates::drop_marked_columns;
pub use blank_rows::collapse_blank_runs;
pub use drop_sheets::drop_boilerplate_sheets;
pub use header::normalize_header;
pub use merge::merge_sheets;
pub use metadata::strip_metadata_rows;
pub use questions::fold_questions;

/// One step of the normalization pipeline, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    /// Remove overview/contents/index sheets.
    DropBoilerplateSheets,
    /// Promote the first numeric row to the header and strip empty columns.
    NormalizeHeader,
    /// Remove rows carrying survey metadata markers.
    StripMetadataRows,
    /// Collapse runs of blank rows to one.
    CollapseBlankRows,
    /// Remove grand-total and percentage columns.
    DropAggregateColumns,
    /// Prefix option rows with their question text.
    FoldQuestions,
    /// Merge all sheets into a single sheet.
    MergeSheets,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 7] = [
        Stage::DropBoilerplateSheets,
        Stage::NormalizeHeader,
        Stage::StripMetadataRows,
        Stage::CollapseBlankRows,
        Stage::DropAggregateColumns,
        Stage::FoldQuestions,
        Stage::MergeSheets,
    ];

    /// 1-based position in the pipeline.
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0) + 1
    }

    /// Short human-readable description used in logs.
    pub fn description(self) -> &'static str {
        match self {
            Stage::DropBoilerplateSheets => "removing boilerplate sheets",
            Stage::NormalizeHeader => "removing header rows and empty columns",
            Stage::StripMetadataRows => "removing metadata rows",
            Stage::CollapseBlankRows => "reducing empty lines",
            Stage::DropAggregateColumns => "removing grand total and percentage columns",
            Stage::FoldQuestions => "appending questions to options",
            Stage::MergeSheets => "merging sheets",
        }
    }

    /// Whether specially-formatted batch entries pass through this stage unchanged.
    pub fn skips_specially_formatted(self) -> bool {
        matches!(self, Stage::NormalizeHeader)
    }

    /// Run this stage's transform over one loaded document.
    pub fn apply(self, doc: &Document, config: &NormalizeConfig) -> NormalizeResult<StageOutput> {
        match self {
            Stage::DropBoilerplateSheets => Ok(StageOutput::Tables(drop_boilerplate_sheets(
                doc,
                &config.excluded_sheets,
            ))),
            Stage::NormalizeHeader => {
                let mut tables = Vec::with_capacity(doc.sheets.len());
                for sheet in &doc.sheets {
                    let table = normalize_header(&sheet.rows, &config.placeholder_prefix)
                        .map_err(|e| with_sheet(&sheet.name, e))?;
                    tables.push((sheet.name.clone(), table));
                }
                Ok(StageOutput::Tables(tables))
            }
            Stage::StripMetadataRows => Ok(per_headed_sheet(doc, |t| {
                strip_metadata_rows(t, &config.metadata_markers)
            })),
            Stage::CollapseBlankRows => Ok(per_headed_sheet(doc, collapse_blank_runs)),
            Stage::DropAggregateColumns => Ok(per_headed_sheet(doc, |t| {
                drop_marked_columns(t, &config.aggregate_markers)
            })),
            Stage::FoldQuestions => Ok(per_headed_sheet(doc, fold_questions)),
            Stage::MergeSheets => Ok(StageOutput::Merged(merge_sheets(
                doc,
                &config.merged_sheet_name,
                config.drop_first_merged_row,
            ))),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}: {}", self.number(), self.description())
    }
}

/// Read every sheet as header + data rows and apply `transform` to each independently.
fn per_headed_sheet<F>(doc: &Document, mut transform: F) -> StageOutput
where
    F: FnMut(&mut Table),
{
    let tables = doc
        .sheets
        .iter()
        .map(|sheet| {
            let mut table = sheet.to_headed_table();
            transform(&mut table);
            (sheet.name.clone(), table)
        })
        .collect();
    StageOutput::Tables(tables)
}

fn with_sheet(sheet: &str, err: NormalizeError) -> NormalizeError {
    match err {
        NormalizeError::Malformed { message } => NormalizeError::Malformed {
            message: format!("sheet '{sheet}': {message}"),
        },
        other => other,
    }
}
