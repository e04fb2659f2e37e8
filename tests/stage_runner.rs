mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::{RecordingObserver, n, read, survey_report, t, write_xlsx};
use sheet_normalizer::execution::{PipelineOptions, Severity, process_batch, run_stage};
use sheet_normalizer::processing::Stage;
use sheet_normalizer::types::{BatchEntry, Cell, Sheet, StageOutput, Table};

fn options_with(obs: Arc<RecordingObserver>) -> PipelineOptions {
    PipelineOptions::default().with_observer(obs)
}

#[test]
fn stage_writes_into_sibling_transformed_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_xlsx(&dir.path().join("retail/survey.xlsx"), &survey_report());

    let batch = vec![BatchEntry::new("retail/survey.xlsx")];
    let report = run_stage(
        Stage::DropBoilerplateSheets,
        &batch,
        dir.path(),
        &PipelineOptions::default(),
    );

    assert!(report.failed.is_empty());
    assert_eq!(
        report.transformed_paths(),
        vec![Path::new("retail/transformed/survey.xlsx")]
    );

    let out = read(&dir.path().join("retail/transformed/survey.xlsx"));
    assert_eq!(out.sheet_names().collect::<Vec<_>>(), vec!["Brands", "Usage"]);
    // Input is untouched.
    let original = read(&dir.path().join("retail/survey.xlsx"));
    assert_eq!(original.sheets.len(), 4);
}

#[test]
fn stage_on_transformed_input_does_not_nest_directories() {
    let dir = tempfile::tempdir().unwrap();
    write_xlsx(&dir.path().join("retail/survey.xlsx"), &survey_report());
    let opts = PipelineOptions::default();

    let first = run_stage(
        Stage::DropBoilerplateSheets,
        &[BatchEntry::new("retail/survey.xlsx")],
        dir.path(),
        &opts,
    );
    let second = run_stage(Stage::DropBoilerplateSheets, &first.transformed, dir.path(), &opts);

    assert_eq!(second.transformed, first.transformed);
    assert!(!dir.path().join("retail/transformed/transformed").exists());
    let out = read(&dir.path().join("retail/transformed/survey.xlsx"));
    assert_eq!(out.sheet_names().collect::<Vec<_>>(), vec!["Brands", "Usage"]);
}

#[test]
fn missing_file_fails_alone_and_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    write_xlsx(&dir.path().join("a.xlsx"), &survey_report());
    write_xlsx(&dir.path().join("c.xlsx"), &survey_report());

    let obs = Arc::new(RecordingObserver::default());
    let batch = vec![
        BatchEntry::new("a.xlsx"),
        BatchEntry::new("b.xlsx"),
        BatchEntry::new("c.xlsx"),
    ];
    let report = run_stage(
        Stage::DropBoilerplateSheets,
        &batch,
        dir.path(),
        &options_with(obs.clone()),
    );

    assert_eq!(
        report.transformed_paths(),
        vec![
            Path::new("transformed/a.xlsx"),
            Path::new("transformed/c.xlsx")
        ]
    );
    assert_eq!(report.failed_paths(), vec![Path::new("b.xlsx")]);
    assert_eq!(report.failed[0].severity, Severity::Warning);
    assert!(report.failed[0].error.contains("file not found"));
    assert!(report.transformed.len() <= report.input_count);

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![("b.xlsx".to_string(), Severity::Warning)]);
    assert!(obs.alerts.lock().unwrap().is_empty());
    assert_eq!(obs.summaries.lock().unwrap().len(), 1);
}

#[test]
fn unreadable_file_is_recorded_as_failure() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.xlsx"), b"this is not a zip archive").unwrap();
    write_xlsx(&dir.path().join("good.xlsx"), &survey_report());

    let obs = Arc::new(RecordingObserver::default());
    let batch = vec![BatchEntry::new("broken.xlsx"), BatchEntry::new("good.xlsx")];
    let report = run_stage(
        Stage::DropBoilerplateSheets,
        &batch,
        dir.path(),
        &options_with(obs.clone()),
    );

    assert_eq!(report.failed_paths(), vec![Path::new("broken.xlsx")]);
    assert_eq!(report.failed[0].severity, Severity::Error);
    assert_eq!(report.transformed.len(), 1);
    assert!(!dir.path().join("transformed/broken.xlsx").exists());
}

#[test]
fn empty_batch_returns_empty_report_and_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let obs = Arc::new(RecordingObserver::default());

    let report = run_stage(
        Stage::NormalizeHeader,
        &[],
        dir.path(),
        &options_with(obs.clone()),
    );

    assert!(report.transformed.is_empty());
    assert!(report.failed.is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(
        obs.started.lock().unwrap().clone(),
        vec![(Stage::NormalizeHeader.to_string(), 0)]
    );
}

#[test]
fn header_stage_passes_specially_formatted_files_through() {
    let dir = tempfile::tempdir().unwrap();
    // No numeric row at all: would fail header normalization if it were processed.
    write_xlsx(
        &dir.path().join("retail/tracker_adv.xlsx"),
        &[("Data", vec![vec![t("Option"), t("Share")], vec![t("Yes"), t("most")]])],
    );

    let obs = Arc::new(RecordingObserver::default());
    let batch = vec![BatchEntry::specially_formatted("retail/tracker_adv.xlsx")];
    let report = run_stage(
        Stage::NormalizeHeader,
        &batch,
        dir.path(),
        &options_with(obs.clone()),
    );

    assert_eq!(report.transformed, batch);
    assert!(report.failed.is_empty());
    assert!(!dir.path().join("retail/transformed").exists());
    assert_eq!(
        obs.skipped.lock().unwrap().clone(),
        vec!["retail/tracker_adv.xlsx".to_string()]
    );

    // Other stages do not skip tagged files.
    let report = run_stage(
        Stage::DropBoilerplateSheets,
        &batch,
        dir.path(),
        &PipelineOptions::default(),
    );
    assert_eq!(
        report.transformed,
        vec![BatchEntry::specially_formatted(
            "retail/transformed/tracker_adv.xlsx"
        )]
    );
}

#[test]
fn header_stage_fails_sheet_without_numbers() {
    let dir = tempfile::tempdir().unwrap();
    write_xlsx(
        &dir.path().join("text_only.xlsx"),
        &[("Data", vec![vec![t("Option")], vec![t("Yes")]])],
    );

    let report = run_stage(
        Stage::NormalizeHeader,
        &[BatchEntry::new("text_only.xlsx")],
        dir.path(),
        &PipelineOptions::default(),
    );

    assert!(report.transformed.is_empty());
    assert!(report.failed[0].error.contains("no row contains a numeric cell"));
}

#[test]
fn header_stage_promotes_first_numeric_row() {
    let dir = tempfile::tempdir().unwrap();
    write_xlsx(
        &dir.path().join("q.xlsx"),
        &[(
            "Q1",
            vec![
                vec![t("meta")],
                vec![t("meta2")],
                vec![n(1.0), n(2.0), n(3.0)],
                vec![t("a"), t("b"), t("c")],
            ],
        )],
    );

    let report = run_stage(
        Stage::NormalizeHeader,
        &[BatchEntry::new("q.xlsx")],
        dir.path(),
        &PipelineOptions::default(),
    );
    assert!(report.failed.is_empty());

    let out = read(&dir.path().join("transformed/q.xlsx"));
    assert_eq!(
        out.sheets[0].rows,
        vec![vec![n(1.0), n(2.0), n(3.0)], vec![t("a"), t("b"), t("c")]]
    );
}

#[test]
fn custom_transform_can_return_a_merged_document() {
    let dir = tempfile::tempdir().unwrap();
    write_xlsx(&dir.path().join("x.xlsx"), &survey_report());

    let report = process_batch(
        "custom",
        &[BatchEntry::new("x.xlsx")],
        dir.path(),
        |doc| {
            Ok(StageOutput::Merged(Sheet::new(
                "Names",
                doc.sheet_names().map(|name| vec![Cell::from(name)]).collect(),
            )))
        },
        None,
        &PipelineOptions::default(),
    );
    assert_eq!(report.stage, "custom");
    assert_eq!(report.transformed_paths(), vec![Path::new("transformed/x.xlsx")]);

    let out = read(&dir.path().join("transformed/x.xlsx"));
    assert_eq!(out.sheets.len(), 1);
    assert_eq!(out.sheets[0].name, "Names");
    assert_eq!(out.sheets[0].rows.len(), 4);
}

#[test]
fn write_failure_is_critical_and_alerts() {
    let dir = tempfile::tempdir().unwrap();
    write_xlsx(&dir.path().join("x.xlsx"), &survey_report());
    // A regular file where the output directory should go.
    std::fs::write(dir.path().join("transformed"), b"").unwrap();

    let obs = Arc::new(RecordingObserver::default());
    let report = process_batch(
        "write-fail",
        &[BatchEntry::new("x.xlsx")],
        dir.path(),
        |_| Ok(StageOutput::Tables(vec![("S".to_string(), Table::raw(vec![vec![n(1.0)]]))])),
        None,
        &options_with(obs.clone()),
    );

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].severity, Severity::Critical);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![Severity::Critical]);
    assert_eq!(report.failed[0].path, PathBuf::from("x.xlsx"));
}

#[test]
fn transform_that_keeps_no_sheets_fails_the_file() {
    let dir = tempfile::tempdir().unwrap();
    write_xlsx(
        &dir.path().join("boiler.xlsx"),
        &[("Overview", vec![vec![t("x")]]), ("Lists", vec![vec![t("y")]])],
    );

    let report = run_stage(
        Stage::DropBoilerplateSheets,
        &[BatchEntry::new("boiler.xlsx")],
        dir.path(),
        &PipelineOptions::default(),
    );
    assert!(report.transformed.is_empty());
    assert!(report.failed[0].error.contains("no sheets left to write"));
}

#[test]
fn non_xlsx_file_name_survives_two_stages() {
    let dir = tempfile::tempdir().unwrap();
    write_xlsx(&dir.path().join("legacy.xls"), &survey_report());
    let opts = PipelineOptions::default();

    let first = run_stage(
        Stage::DropBoilerplateSheets,
        &[BatchEntry::new("legacy.xls")],
        dir.path(),
        &opts,
    );
    assert_eq!(first.transformed_paths(), vec![Path::new("transformed/legacy.xls")]);

    let second = run_stage(Stage::NormalizeHeader, &first.transformed, dir.path(), &opts);
    assert!(second.failed.is_empty(), "{:?}", second.failed);
    assert_eq!(second.transformed, first.transformed);

    let out = read(&dir.path().join("transformed/legacy.xls"));
    assert_eq!(out.sheets[0].rows[0], vec![t("Column_0"), n(2024.0), t("Grand Total")]);
}

#[test]
fn date_row_stays_out_of_the_header_and_keeps_its_type() {
    let dir = tempfile::tempdir().unwrap();
    write_xlsx(
        &dir.path().join("dated.xlsx"),
        &[(
            "Brands",
            vec![
                vec![t("Brand preference")],
                vec![t("Release date"), Cell::DateTime(45352.0)],
                vec![t("Option"), n(2024.0)],
                vec![t("Yes"), n(0.5)],
                vec![t("Fielded"), Cell::DateTime(45353.0)],
            ],
        )],
    );

    let report = run_stage(
        Stage::NormalizeHeader,
        &[BatchEntry::new("dated.xlsx")],
        dir.path(),
        &PipelineOptions::default(),
    );
    assert!(report.failed.is_empty());

    let out = read(&dir.path().join("transformed/dated.xlsx"));
    assert_eq!(
        out.sheets[0].rows,
        vec![
            vec![t("Option"), n(2024.0)],
            vec![t("Yes"), n(0.5)],
            vec![t("Fielded"), Cell::DateTime(45353.0)],
        ]
    );
}
