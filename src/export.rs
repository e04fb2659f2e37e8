//! Persisting stage output as `.xlsx` files.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::{NormalizeError, NormalizeResult};
use crate::types::{Cell, StageOutput};

const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Write a stage's output to `path`, replacing any existing file.
///
/// - [`StageOutput::Tables`]: one worksheet per entry in insertion order; the header row (if
///   any) is written first, no index column
/// - [`StageOutput::Merged`]: a single worksheet with the merged rows
///
/// Values only: no formulas or styles are written. Date cells get a date number format so they
/// read back as dates.
pub fn write_stage_output(path: impl AsRef<Path>, output: &StageOutput) -> NormalizeResult<()> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format(DATE_FORMAT);

    match output {
        StageOutput::Tables(tables) => {
            if tables.is_empty() {
                return Err(NormalizeError::malformed("no sheets left to write"));
            }
            for (name, table) in tables {
                let ws = workbook.add_worksheet();
                ws.set_name(name)?;
                write_rows(ws, table.header.iter().chain(table.rows.iter()), &date_format)?;
            }
        }
        StageOutput::Merged(sheet) => {
            let ws = workbook.add_worksheet();
            ws.set_name(&sheet.name)?;
            write_rows(ws, sheet.rows.iter(), &date_format)?;
        }
    }

    workbook.save(path.as_ref())?;
    Ok(())
}

fn write_rows<'a, I>(ws: &mut Worksheet, rows: I, date_format: &Format) -> NormalizeResult<()>
where
    I: Iterator<Item = &'a Vec<Cell>>,
{
    for (r, row) in rows.enumerate() {
        let r = u32::try_from(r)
            .map_err(|_| NormalizeError::malformed(format!("row index {r} out of range")))?;
        for (c, cell) in row.iter().enumerate() {
            let c = u16::try_from(c)
                .map_err(|_| NormalizeError::malformed(format!("column index {c} out of range")))?;
            match cell {
                Cell::Empty => {}
                Cell::Number(f) => {
                    ws.write_number(r, c, *f)?;
                }
                Cell::DateTime(serial) => {
                    ws.write_number_with_format(r, c, *serial, date_format)?;
                }
                Cell::Bool(b) => {
                    ws.write_boolean(r, c, *b)?;
                }
                Cell::Text(s) => {
                    ws.write_string(r, c, s)?;
                }
            }
        }
    }
    Ok(())
}
