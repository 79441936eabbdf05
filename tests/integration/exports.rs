//! Export tests: every format lands on disk and reads back as a dataset.

use std::fs;

use crate::common::static_catalog;
use bookrank::dataset::{DataFormat, Dataset};
use bookrank::error::ExportError;
use bookrank::export::{ExportFormat, Exporter, SearchSummary};
use bookrank::pipeline::{run_search, SearchOutcome, SearchRequest};
use bookrank::scoring::RankerConfig;
use bookrank::tokenizer::TokenizerConfig;
use bookrank::types::{Cell, Query};
use tempfile::TempDir;

fn outcome() -> SearchOutcome {
    let request = SearchRequest::new(Query::new("distributed systems"), 3);
    run_search(&static_catalog(), &request, &RankerConfig::default(), 25).unwrap()
}

fn exporter(dir: &TempDir) -> Exporter {
    Exporter::new(dir.path().join("output"), dir.path().join("summaries"))
}

#[test]
fn test_export_creates_directories_and_appends_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = exporter(&dir)
        .export_results(&outcome().results, "my results", ExportFormat::Csv)
        .unwrap();
    assert_eq!(path, dir.path().join("output").join("my_results.csv"));
    assert!(path.exists());

    let path = exporter(&dir)
        .export_results(&outcome().results, "named.json", ExportFormat::Json)
        .unwrap();
    assert_eq!(path.file_name().unwrap(), "named.json");
}

#[test]
fn test_csv_export_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = exporter(&dir)
        .export_results(&outcome().results, "r", ExportFormat::Csv)
        .unwrap();
    let dataset = Dataset::load(&path, None).unwrap();

    assert_eq!(dataset.len(), 3);
    let title = dataset.column_index("title").unwrap();
    let year = dataset.column_index("year").unwrap();
    assert_eq!(dataset.rows[0][title], Cell::Text("Designing Distributed Systems".into()));
    assert_eq!(dataset.rows[0][year], Cell::Integer(2018));
    assert_eq!(dataset.rows[1][dataset.column_index("publisher").unwrap()], Cell::NotAvailable);
}

#[test]
fn test_json_export_is_typed_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = exporter(&dir)
        .export_results(&outcome().results, "r", ExportFormat::Json)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["rank"], 1);
    assert_eq!(records[0]["year"], 2018);
    assert_eq!(records[0]["score"], 1.5);
    assert_eq!(records[1]["authors"], "Unknown");
    assert!(records[1].get("url").is_none());
}

#[test]
fn test_txt_export_is_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let results = outcome().results;
    let path = exporter(&dir).export_results(&results, "r", ExportFormat::Txt).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, bookrank::report::render_report(&results));

    let dataset = Dataset::load(&path, Some(DataFormat::Txt)).unwrap();
    assert_eq!(dataset.len(), 3);
    assert_eq!(
        dataset.rows[2][dataset.column_index("authors").unwrap()],
        Cell::Text("Jane Doe".into())
    );
}

#[test]
fn test_xlsx_and_html_exports() {
    let dir = tempfile::tempdir().unwrap();
    let results = outcome().results;
    let xlsx = exporter(&dir).export_results(&results, "r", ExportFormat::Xlsx).unwrap();
    let dataset = Dataset::load(&xlsx, None).unwrap();
    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.rows[0][dataset.column_index("rank").unwrap()], Cell::Integer(1));

    let html = exporter(&dir).export_results(&results, "r", ExportFormat::Html).unwrap();
    let page = fs::read_to_string(html).unwrap();
    assert!(page.contains("<td>Designing Distributed Systems</td>"));
    assert!(page.contains("<td>O&#39;Reilly Media</td>"));
}

#[test]
fn test_none_format_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let err = exporter(&dir)
        .export_results(&outcome().results, "r", ExportFormat::None)
        .unwrap_err();
    assert!(matches!(err, ExportError::NoFormat));
    assert!(!dir.path().join("output").exists());
}

#[test]
fn test_unwritable_directory_is_export_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, b"a file, not a directory").unwrap();

    let exporter = Exporter::new(blocker.join("output"), blocker.join("summaries"));
    let err = exporter
        .export_results(&outcome().results, "r", ExportFormat::Csv)
        .unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
}

#[test]
fn test_summary_and_log_go_to_summary_dir() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = outcome();
    let exporter = exporter(&dir);

    let summary = SearchSummary::from_outcome(&outcome, &TokenizerConfig::default());
    let path = exporter.write_summary(&summary, ExportFormat::Html).unwrap();
    assert!(path.starts_with(dir.path().join("summaries")));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.ends_with("_summary_distributed_systems.html"), "{}", name);

    let log = exporter
        .write_search_log("distributed systems", 3, outcome.candidates, &outcome.results)
        .unwrap();
    let name = log.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("search_log_") && name.ends_with(".txt"), "{}", name);

    let text = fs::read_to_string(log).unwrap();
    assert!(text.contains("Query: distributed systems\nLimit: 3\nTotal results found: 5\n"));
    assert!(text.contains("Top 3 Results:"));
}
