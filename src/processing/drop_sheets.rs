//! Stage 1: remove boilerplate sheets (overview, contents, lists).

use crate::types::{Document, Table};

/// Keep every sheet whose name is not in `excluded`, as headerless tables in workbook order.
pub fn drop_boilerplate_sheets(doc: &Document, excluded: &[String]) -> Vec<(String, Table)> {
    doc.sheets
        .iter()
        .filter(|sheet| !excluded.iter().any(|name| *name == sheet.name))
        .map(|sheet| (sheet.name.clone(), sheet.to_raw_table()))
        .collect()
}
