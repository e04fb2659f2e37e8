//! Stage 7: merge all sheets of a document into one.

use crate::types::{Document, Sheet};

/// Concatenate every sheet's rows (in workbook order) into one sheet named `name`, with one
/// blank separator row after each sheet.
///
/// When `drop_first_row` is set, the first merged row is deleted afterwards. For documents coming
/// out of the earlier stages that row is the first sheet's header.
pub fn merge_sheets(doc: &Document, name: &str, drop_first_row: bool) -> Sheet {
    let capacity = doc.sheets.iter().map(|s| s.rows.len() + 1).sum();
    let mut rows = Vec::with_capacity(capacity);
    for sheet in &doc.sheets {
        rows.extend(sheet.rows.iter().cloned());
        rows.push(Vec::new());
    }
    if drop_first_row && !rows.is_empty() {
        rows.remove(0);
    }
    Sheet::new(name, rows)
}
