//! Filter and analyze over previously exported result files.

use std::path::PathBuf;

use crate::common::static_catalog;
use bookrank::analysis::{Analysis, ColumnStats, FilterCriteria};
use bookrank::dataset::Dataset;
use bookrank::error::{DatasetError, ValidationError};
use bookrank::export::{ExportFormat, Exporter};
use bookrank::pipeline::{run_search, SearchRequest};
use bookrank::scoring::RankerConfig;
use bookrank::tokenizer::TokenizerConfig;
use bookrank::types::{Cell, Query};
use tempfile::TempDir;

/// Export the full "distributed systems" result set (ids 102, 103, 101,
/// 0042, 104) and return the file.
fn exported(dir: &TempDir, format: ExportFormat) -> PathBuf {
    let request = SearchRequest::new(Query::new("distributed systems"), 10);
    let outcome = run_search(&static_catalog(), &request, &RankerConfig::default(), 25).unwrap();
    Exporter::new(dir.path(), dir.path())
        .export_results(&outcome.results, "results", format)
        .unwrap()
}

fn ids(dataset: &Dataset) -> Vec<String> {
    let id = dataset.column_index("id").unwrap();
    dataset.rows.iter().map(|row| row[id].to_string()).collect()
}

// ============================================================================
// FILTER
// ============================================================================

#[test]
fn test_filter_equality_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&exported(&dir, ExportFormat::Csv), None).unwrap();
    let filtered = FilterCriteria::parse(r#"{"extension": "PDF"}"#).unwrap().apply(&dataset);
    assert_eq!(ids(&filtered), vec!["103", "101"]);
}

#[test]
fn test_filter_range_and_membership() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&exported(&dir, ExportFormat::Json), None).unwrap();

    let recent = FilterCriteria::parse(r#"{"year": {"min": 2010}}"#).unwrap().apply(&dataset);
    assert_eq!(ids(&recent), vec!["102", "103", "101"]);

    let bounded = FilterCriteria::parse(r#"{"year": {"min": 2005, "max": 2017}}"#)
        .unwrap()
        .apply(&dataset);
    assert_eq!(ids(&bounded), vec!["103", "104"]);

    let picked = FilterCriteria::parse(r#"{"id": ["0042", 104]}"#).unwrap().apply(&dataset);
    assert_eq!(ids(&picked), vec!["0042", "104"]);
}

#[test]
fn test_filter_combines_criteria_and_skips_unknown_columns() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&exported(&dir, ExportFormat::Xlsx), None).unwrap();
    let filtered = FilterCriteria::parse(r#"{"extension": ["pdf", "epub"], "year": {"max": 2018}, "shelf": 3}"#)
        .unwrap()
        .apply(&dataset);
    assert_eq!(ids(&filtered), vec!["102", "103"]);
}

#[test]
fn test_filter_on_report_file() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&exported(&dir, ExportFormat::Txt), None).unwrap();
    let filtered = FilterCriteria::parse(r#"{"author": "jane doe"}"#).unwrap().apply(&dataset);
    assert_eq!(ids(&filtered), vec!["101"]);
}

#[test]
fn test_malformed_filters_are_rejected() {
    for text in [
        "not json",
        r#"["extension", "pdf"]"#,
        r#"{"year": {}}"#,
        r#"{"year": {"from": 2000}}"#,
        r#"{"year": {"min": "2000"}}"#,
    ] {
        assert!(
            matches!(
                FilterCriteria::parse(text),
                Err(ValidationError::MalformedFilter { .. })
            ),
            "accepted {}",
            text
        );
    }
}

#[test]
fn test_unknown_input_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.parquet");
    std::fs::write(&path, b"").unwrap();
    assert!(matches!(
        Dataset::load(&path, None),
        Err(DatasetError::UnsupportedFormat { .. })
    ));
}

// ============================================================================
// ANALYZE
// ============================================================================

#[test]
fn test_analysis_keywords_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&exported(&dir, ExportFormat::Csv), None).unwrap();
    let fields = vec!["title".to_string(), "author".to_string(), "blurb".to_string()];
    let analysis = Analysis::run(&dataset, &fields, 3, &TokenizerConfig::default());

    // Unknown "blurb" is skipped.
    assert_eq!(analysis.keywords.len(), 2);
    let titles: Vec<(&str, usize)> = analysis.keywords[0]
        .keywords
        .iter()
        .map(|k| (k.term.as_str(), k.count))
        .collect();
    assert_eq!(titles, vec![("systems", 4), ("distributed", 2), ("designing", 1)]);

    // "Unknown" authors are not counted.
    assert_eq!(analysis.keywords[1].field, "author");
    assert!(analysis.keywords[1].keywords.iter().all(|k| k.term != "unknown"));

    let summary = &analysis.summary;
    assert_eq!(summary.row_count, 5);
    let column = |name: &str| summary.columns.iter().find(|c| c.name == name).unwrap();

    match &column("year").stats {
        ColumnStats::Numeric {
            min,
            max,
            median,
            std,
            ..
        } => {
            assert_eq!(*min, 2002.0);
            assert_eq!(*max, 2020.0);
            assert_eq!(*median, 2017.0);
            assert!(std.is_some());
        }
        other => panic!("year should be numeric, got {:?}", other),
    }

    let extension = column("extension");
    assert_eq!(extension.missing, 2);
    match &extension.stats {
        ColumnStats::Categorical {
            unique_values,
            top_values,
        } => {
            assert_eq!(*unique_values, 2);
            assert_eq!(top_values[0].value, "pdf");
            assert_eq!(top_values[0].count, 2);
        }
        other => panic!("extension should be categorical, got {:?}", other),
    }
}

#[test]
fn test_analysis_export_is_json() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&exported(&dir, ExportFormat::Csv), None).unwrap();
    let analysis = Analysis::run(&dataset, &["title".to_string()], 5, &TokenizerConfig::default());

    let path = Exporter::new(dir.path().join("out"), dir.path())
        .export_analysis(&analysis, "analysis")
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(value["summary"]["row_count"], 5);
    assert_eq!(value["keywords"][0]["keywords"][0]["term"], "systems");
    assert_eq!(
        value["summary"]["columns"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["name"] == "year")
            .unwrap()["stats"]["kind"],
        "numeric"
    );
}

#[test]
fn test_dataset_from_results_keeps_na_cells() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = Dataset::load(&exported(&dir, ExportFormat::Csv), None).unwrap();
    let language = dataset.column_index("language").unwrap();
    assert_eq!(dataset.rows[1][language], Cell::NotAvailable);
    assert_eq!(dataset.rows[0][language], Cell::Text("English".into()));
}
