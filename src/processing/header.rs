//! Stage 2: promote the first numeric row to the header and strip empty columns.
//!
//! Title and metadata rows sit above the data in downloaded reports; the first row that holds
//! a number is where the table starts.

use std::collections::HashSet;

use crate::error::{NormalizeError, NormalizeResult};
use crate::types::{Cell, Table};

/// Normalize a raw sheet grid:
///
/// 1. find the first row (top-down) with at least one [`Cell::Number`] (dates do not count)
/// 2. drop every row above it and promote it to the header
/// 3. drop columns whose data cells are all blank (the header cell is not counted); whitespace
///    text is a value
/// 4. replace blank header cells with `<placeholder_prefix><position>`, unique within the sheet
///
/// Returns [`NormalizeError::Malformed`] when no row holds a number.
pub fn normalize_header(rows: &[Vec<Cell>], placeholder_prefix: &str) -> NormalizeResult<Table> {
    let start = rows
        .iter()
        .position(|row| row.iter().any(Cell::is_numeric))
        .ok_or_else(|| NormalizeError::malformed("no row contains a numeric cell"))?;

    let mut table = Table::new(rows[start].clone(), rows[start + 1..].to_vec());
    let width = table.width();
    if let Some(header) = table.header.as_mut() {
        header.resize(width, Cell::Empty);
    }

    let data_present: Vec<bool> = (0..width)
        .map(|c| {
            table
                .rows
                .iter()
                .any(|row| row.get(c).is_some_and(|cell| !cell.is_blank()))
        })
        .collect();
    table.retain_columns(|c| data_present[c]);

    if let Some(header) = table.header.as_mut() {
        fill_placeholders(header, placeholder_prefix);
    }
    Ok(table)
}

fn fill_placeholders(header: &mut [Cell], prefix: &str) {
    let mut taken: HashSet<String> = header
        .iter()
        .filter(|c| !c.is_blank())
        .map(Cell::text)
        .collect();

    for (idx, cell) in header.iter_mut().enumerate() {
        if !cell.is_blank() {
            continue;
        }
        let mut name = format!("{prefix}{idx}");
        let mut n = 1;
        while taken.contains(&name) {
            name = format!("{prefix}{idx}_{n}");
            n += 1;
        }
        taken.insert(name.clone());
        *cell = Cell::Text(name);
    }
}
