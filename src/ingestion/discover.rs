//! Batch discovery under a base directory.

use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::config::NormalizeConfig;
use crate::error::{NormalizeError, NormalizeResult};
use crate::types::BatchEntry;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm"];

/// Collect every spreadsheet under `base_dir` as a batch, walking directories in file-name order.
///
/// - Output directories (`config.output_dir_name`) are not descended into
/// - Office lock files (`~$report.xlsx`) are ignored
/// - Entries are tagged via [`BatchEntry::tagged_by_name`] with `config.special_format_marker`
pub fn discover_batch(
    base_dir: impl AsRef<Path>,
    config: &NormalizeConfig,
) -> NormalizeResult<Vec<BatchEntry>> {
    let base_dir = base_dir.as_ref();
    let mut batch = Vec::new();

    let walker = WalkDir::new(base_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_output_dir(e, &config.output_dir_name));

    for entry in walker {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io) => NormalizeError::Io(io),
            None => NormalizeError::malformed("filesystem loop while walking base directory"),
        })?;
        if !entry.file_type().is_file() || !is_spreadsheet(entry.path()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(base_dir)
            .unwrap_or_else(|_| entry.path());
        batch.push(BatchEntry::tagged_by_name(
            relative,
            &config.special_format_marker,
        ));
    }

    Ok(batch)
}

fn is_output_dir(entry: &DirEntry, output_dir_name: &str) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_str() == Some(output_dir_name)
}

fn is_spreadsheet(path: &Path) -> bool {
    let is_lock_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("~$"));
    let has_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SPREADSHEET_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    has_extension && !is_lock_file
}
