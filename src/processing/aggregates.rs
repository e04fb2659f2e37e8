//! Stage 5: remove aggregate and percentage columns.

use crate::config::MarkerSet;
use crate::types::Table;

/// Drop every column in which any cell (header included) contains an aggregate marker.
pub fn drop_marked_columns(table: &mut Table, markers: &MarkerSet) {
    let marked: Vec<bool> = (0..table.width())
        .map(|c| table.column(c).any(|cell| markers.matches(&cell.text())))
        .collect();
    table.retain_columns(|c| !marked[c]);
}
