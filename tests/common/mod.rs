#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use rust_xlsxwriter::{Format, Workbook};
use sheet_normalizer::NormalizeError;
use sheet_normalizer::execution::{FileContext, PipelineObserver, Severity, StageReport};
use sheet_normalizer::ingestion::read_document;
use sheet_normalizer::processing::Stage;
use sheet_normalizer::types::{Cell, Document};

pub fn t(s: &str) -> Cell {
    Cell::from(s)
}

pub fn n(v: f64) -> Cell {
    Cell::Number(v)
}

/// Write a workbook with the given sheets, creating parent directories.
pub fn write_xlsx(path: &Path, sheets: &[(&str, Vec<Vec<Cell>>)]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }

    let mut wb = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    for (name, rows) in sheets {
        let ws = wb.add_worksheet();
        ws.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Cell::Empty => {}
                    Cell::Number(v) => {
                        ws.write_number(r, c, *v).unwrap();
                    }
                    Cell::DateTime(serial) => {
                        ws.write_number_with_format(r, c, *serial, &date_format)
                            .unwrap();
                    }
                    Cell::Bool(b) => {
                        ws.write_boolean(r, c, *b).unwrap();
                    }
                    Cell::Text(s) => {
                        ws.write_string(r, c, s).unwrap();
                    }
                }
            }
        }
    }
    wb.save(path).unwrap();
}

pub fn read(path: &Path) -> Document {
    read_document(path).unwrap()
}

/// A downloaded report: boilerplate sheets, title rows, metadata, totals and questions.
pub fn survey_report() -> Vec<(&'static str, Vec<Vec<Cell>>)> {
    vec![
        ("Overview", vec![vec![t("Consumer survey 2024")]]),
        (
            "Brands",
            vec![
                vec![t("Brand preference")],
                vec![t("Survey period: March 2024")],
                vec![Cell::Empty, n(2024.0), t("Grand Total")],
                vec![t("Which brand do you prefer?")],
                vec![t("Brand A"), n(0.6), n(1.0)],
                vec![],
                vec![],
                vec![t("Brand B"), n(0.4), n(1.0)],
                vec![t("Sample size n = 1,000")],
            ],
        ),
        ("Content", vec![vec![t("Contents")]]),
        (
            "Usage",
            vec![
                vec![t("Usage frequency")],
                vec![Cell::Empty, n(2024.0), t("Share in %")],
                vec![t("How often do you shop online? Select one")],
                vec![t("Daily"), n(0.1), t("10")],
                vec![t("Weekly"), n(0.5), t("50")],
            ],
        ),
    ]
}

/// Records what the pipeline reports, for assertions.
#[derive(Default)]
pub struct RecordingObserver {
    pub started: Mutex<Vec<(String, usize)>>,
    pub skipped: Mutex<Vec<String>>,
    pub failures: Mutex<Vec<(String, Severity)>>,
    pub alerts: Mutex<Vec<Severity>>,
    pub summaries: Mutex<Vec<StageReport>>,
    pub halted: Mutex<Vec<Stage>>,
}

impl PipelineObserver for RecordingObserver {
    fn on_stage_started(&self, stage: &str, input_count: usize) {
        self.started
            .lock()
            .unwrap()
            .push((stage.to_string(), input_count));
    }

    fn on_file_skipped(&self, ctx: &FileContext) {
        self.skipped
            .lock()
            .unwrap()
            .push(ctx.path.display().to_string());
    }

    fn on_file_failed(&self, ctx: &FileContext, severity: Severity, _error: &NormalizeError) {
        self.failures
            .lock()
            .unwrap()
            .push((ctx.path.display().to_string(), severity));
    }

    fn on_alert(&self, _ctx: &FileContext, severity: Severity, _error: &NormalizeError) {
        self.alerts.lock().unwrap().push(severity);
    }

    fn on_stage_finished(&self, report: &StageReport) {
        self.summaries.lock().unwrap().push(report.clone());
    }

    fn on_pipeline_halted(&self, stage: Stage) {
        self.halted.lock().unwrap().push(stage);
    }
}
