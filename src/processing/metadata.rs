//! Stage 3: remove survey metadata rows.

use crate::config::MarkerSet;
use crate::types::Table;

/// Drop every data row in which any cell's text contains a metadata marker.
///
/// The header row is left alone.
pub fn strip_metadata_rows(table: &mut Table, markers: &MarkerSet) {
    table
        .rows
        .retain(|row| !row.iter().any(|cell| markers.matches(&cell.text())));
}
