//! Core data model for the normalization pipeline.
//!
//! A spreadsheet file is loaded into a [`Document`] (a list of raw [`Sheet`] grids). Stages
//! interpret sheets as [`Table`]s, transform them, and hand back a [`StageOutput`] that the
//! runner persists. Files move between stages as [`BatchEntry`] values.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;

/// A single typed spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// Missing/empty cell.
    #[default]
    Empty,
    /// Numeric cell (integers and floats).
    Number(f64),
    /// Date or time cell, stored as its spreadsheet serial number. Not numeric.
    DateTime(f64),
    /// Boolean cell.
    Bool(bool),
    /// Text cell.
    Text(String),
}

impl Cell {
    /// `true` for [`Cell::Number`].
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// `true` for [`Cell::Empty`] and empty text. Whitespace-only text is a value.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Text representation used for marker matching and question folding.
    ///
    /// Integral numbers render without a fractional part (`3.0` -> `"3"`); dates render as
    /// `YYYY-MM-DD HH:MM:SS`.
    pub fn text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(f) => format_number(*f),
            Self::DateTime(serial) => format_serial_datetime(*serial),
            Self::Bool(b) => b.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Self::Number(f)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Self::Number(i as f64)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

fn format_number(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

fn format_serial_datetime(serial: f64) -> String {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0));
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch
        .zip(TimeDelta::try_milliseconds(millis))
        .filter(|_| serial.is_finite())
        .and_then(|(epoch, offset)| epoch.checked_add_signed(offset))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format_number(serial))
}

/// `true` if every cell in `row` is blank (an empty row is blank too).
pub fn row_is_blank(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_blank)
}

/// One named page of a spreadsheet, as a raw row-major grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    /// Sheet name as shown in the workbook tab.
    pub name: String,
    /// Row-major cells. Rows may have different lengths.
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Create a sheet from a name and rows.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Interpret this sheet as a table whose first row is the header.
    pub fn to_headed_table(&self) -> Table {
        Table::from_headed_rows(self.rows.clone())
    }

    /// Interpret this sheet as a headerless table.
    pub fn to_raw_table(&self) -> Table {
        Table::raw(self.rows.clone())
    }
}

/// A loaded spreadsheet file: its sheets in workbook order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub sheets: Vec<Sheet>,
}

impl Document {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    /// Look up a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Tabular view of a sheet: an optional header row plus data rows.
///
/// `header == None` is a headerless grid (written back verbatim).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub header: Option<Vec<Cell>>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create a table with a header row.
    pub fn new(header: Vec<Cell>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            header: Some(header),
            rows,
        }
    }

    /// Create a headerless table.
    pub fn raw(rows: Vec<Vec<Cell>>) -> Self {
        Self { header: None, rows }
    }

    /// Split `rows` into a header (the first row) and data rows.
    ///
    /// An empty grid yields an empty headerless table.
    pub fn from_headed_rows(mut rows: Vec<Vec<Cell>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let header = rows.remove(0);
        Self::new(header, rows)
    }

    /// Number of data rows (the header is not counted).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row, header included.
    pub fn width(&self) -> usize {
        self.header
            .iter()
            .chain(self.rows.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    /// All rows as they are written to a sheet: the header (if any) followed by data rows.
    pub fn to_grid(&self) -> Vec<Vec<Cell>> {
        self.header
            .iter()
            .chain(self.rows.iter())
            .cloned()
            .collect()
    }

    /// Keep only the columns whose index satisfies `keep`, in every row and the header.
    pub fn retain_columns<F>(&mut self, mut keep: F)
    where
        F: FnMut(usize) -> bool,
    {
        let width = self.width();
        let kept: Vec<bool> = (0..width).map(&mut keep).collect();
        let project = |row: &mut Vec<Cell>| {
            let mut idx = 0;
            row.retain(|_| {
                let k = kept[idx];
                idx += 1;
                k
            });
        };
        if let Some(h) = self.header.as_mut() {
            project(h);
        }
        for row in &mut self.rows {
            project(row);
        }
    }

    /// Iterate the cells of column `idx`, header first; short rows contribute [`Cell::Empty`].
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> {
        self.header
            .iter()
            .chain(self.rows.iter())
            .map(move |row| row.get(idx).unwrap_or(&EMPTY))
    }
}

static EMPTY: Cell = Cell::Empty;

/// What a stage transform produces for one document.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    /// One table per output sheet, in insertion order.
    Tables(Vec<(String, Table)>),
    /// A single pre-built merged sheet.
    Merged(Sheet),
}

/// One file in a batch, relative to the batch's base directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BatchEntry {
    /// Path relative to the base directory.
    pub path: PathBuf,
    /// Marks files delivered in the specially-formatted layout; header normalization passes them
    /// through unchanged.
    pub specially_formatted: bool,
}

impl BatchEntry {
    /// A regular entry.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            specially_formatted: false,
        }
    }

    /// An entry tagged as specially formatted.
    pub fn specially_formatted(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            specially_formatted: true,
        }
    }

    /// Derive the tag from the file name: tagged when the lowercased file name contains
    /// `marker` (lowercased). An empty marker never tags.
    pub fn tagged_by_name(path: impl Into<PathBuf>, marker: &str) -> Self {
        let path = path.into();
        let specially_formatted = !marker.is_empty() && file_name_contains(&path, marker);
        Self {
            path,
            specially_formatted,
        }
    }

    /// Same tag, different path.
    pub fn with_path(&self, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            specially_formatted: self.specially_formatted,
        }
    }
}

fn file_name_contains(path: &Path, marker: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_lowercase().contains(&marker.to_lowercase()))
        .unwrap_or(false)
}
