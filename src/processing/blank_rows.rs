//! Stage 4: collapse runs of blank rows.

use crate::types::{Table, row_is_blank};

/// Collapse every run of two or more blank data rows into a single blank row.
///
/// A blank header counts as the row before the first data row.
pub fn collapse_blank_runs(table: &mut Table) {
    let mut prev_blank = table.header.as_deref().is_some_and(row_is_blank);
    table.rows.retain(|row| {
        let blank = row_is_blank(row);
        let keep = !(blank && prev_blank);
        prev_blank = blank;
        keep
    });
}
