use std::fs;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};

use crate::error::NormalizeResult;
use crate::types::{Cell, Document, Sheet};

/// Load every sheet of a spreadsheet file (`.xlsx`, `.xlsm`, `.xls`, `.ods`, ...) into memory.
///
/// Behavior:
/// - Sheets are returned in workbook order
/// - Cell positions are absolute: leading empty rows/columns that the reader trims are restored
///   as [`Cell::Empty`]
/// - Only cached values are read; formulas and styles are not carried
/// - The format is detected from the file content, not the extension
///
/// The file is read into memory up front, so the caller may overwrite `path`.
pub fn read_document(path: impl AsRef<Path>) -> NormalizeResult<Document> {
    let bytes = fs::read(path)?;
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        let rows = range_to_rows(&range);
        sheets.push(Sheet::new(name, rows));
    }

    Ok(Document::new(sheets))
}

fn range_to_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(start_row as usize + range.height());
    rows.resize_with(start_row as usize, Vec::new);

    for row in range.rows() {
        let mut out: Vec<Cell> = Vec::with_capacity(start_col as usize + row.len());
        out.resize(start_col as usize, Cell::Empty);
        out.extend(row.iter().map(convert_cell));
        trim_trailing_empty(&mut out);
        rows.push(out);
    }

    rows
}

fn trim_trailing_empty(row: &mut Vec<Cell>) {
    while matches!(row.last(), Some(Cell::Empty)) {
        row.pop();
    }
}

fn convert_cell(c: &Data) -> Cell {
    match c {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("{e:?}")),
    }
}
