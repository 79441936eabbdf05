//! Search pipeline tests against in-memory and file-backed catalogs.

use crate::common::{
    assert_ranking_well_formed, catalog_records, make_record, ranked_ids, static_catalog,
    write_catalog_file,
};
use bookrank::catalog::{Catalog, CatalogRequest, StaticCatalog};
use bookrank::error::{BookrankError, CatalogError, ValidationError};
use bookrank::pipeline::{run_search, SearchRequest};
use bookrank::report::{parse_report, render_report, ReportField};
use bookrank::scoring::{rank, RankerConfig};
use bookrank::types::{Cell, Query, RawRecord};

fn search(query: Query, limit: usize) -> bookrank::pipeline::SearchOutcome {
    let request = SearchRequest::new(query, limit);
    run_search(&static_catalog(), &request, &RankerConfig::default(), 25).unwrap()
}

// ============================================================================
// RANKING SCENARIOS
// ============================================================================

#[test]
fn test_title_substring_matches_rank_first() {
    let outcome = search(Query::new("distributed systems"), 10);

    assert_eq!(ranked_ids(&outcome.scored), vec!["102", "103", "101", "0042", "104"]);
    assert_eq!(outcome.scored[0].score, 1.5);
    assert_eq!(outcome.scored[1].score, 1.5);
    assert_eq!(outcome.scored[2].score, 0.5);
    assert_eq!(outcome.scored[4].score, 0.0);
    assert_ranking_well_formed(&outcome.scored);
}

#[test]
fn test_limit_truncates_after_sorting() {
    let outcome = search(Query::new("distributed systems"), 3);

    assert_eq!(outcome.candidates, 5);
    assert_eq!(ranked_ids(&outcome.scored), vec!["102", "103", "101"]);
    let ranks: Vec<usize> = outcome.results.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[test]
fn test_field_restriction_limits_matching() {
    let outcome = search(Query::new("jane").with_fields(["author"]), 5);
    assert_eq!(ranked_ids(&outcome.scored)[0], "101");
    assert_eq!(outcome.scored[0].score, 1.0);
    assert!(outcome.scored[1..].iter().all(|s| s.score == 0.0));

    // "jane" only occurs in an author, so a title restriction finds nothing.
    let outcome = search(Query::new("jane").with_fields(["title"]), 5);
    assert!(outcome.scored.iter().all(|s| s.score == 0.0));
}

#[test]
fn test_unknown_fields_fall_back_to_all() {
    let restricted = search(Query::new("jane").with_fields(["isbn", "blurb"]), 5);
    let open = search(Query::new("jane"), 5);
    assert_eq!(ranked_ids(&restricted.scored), ranked_ids(&open.scored));
}

#[test]
fn test_stop_word_only_query_scores_zero_and_keeps_order() {
    let outcome = search(Query::new("the of and"), 5);
    assert_eq!(ranked_ids(&outcome.scored), vec!["101", "102", "103", "104", "0042"]);
    assert!(outcome.scored.iter().all(|s| s.score == 0.0));
}

#[test]
fn test_rank_is_reachable_without_a_catalog() {
    let records = vec![
        make_record("a", "Gardening"),
        make_record("b", "Rust for Rustaceans"),
    ];
    let scored = rank(&Query::new("rust"), records, 1, &RankerConfig::default()).unwrap();
    assert_eq!(ranked_ids(&scored), vec!["b"]);
}

// ============================================================================
// NORMALIZATION THROUGH THE PIPELINE
// ============================================================================

#[test]
fn test_results_are_display_ready() {
    let outcome = search(Query::new("systems programming rust"), 1);
    let top = &outcome.results[0];

    assert_eq!(top.id, Cell::Text("101".into()));
    assert_eq!(top.authors, Cell::Text("Jane Doe".into()));
    assert_eq!(top.year, Cell::Integer(2020));
    assert_eq!(top.size, Cell::Text("5.00 MB".into()));
    assert_eq!(top.extension, Cell::Text("pdf".into()));
    assert_eq!(
        top.get_download.as_deref(),
        Some("https://library.lol/main/0123456789abcdef0123456789abcdef")
    );
    assert_eq!(top.url, None);
}

#[test]
fn test_missing_and_empty_fields() {
    let outcome = search(Query::new("distributed"), 5);
    let bare = outcome.results.iter().find(|r| r.id.to_string() == "103").unwrap();
    assert_eq!(bare.authors, Cell::Text("Unknown".into()));
    assert_eq!(bare.publisher, Cell::NotAvailable);
    assert_eq!(bare.size, Cell::NotAvailable);
    assert_eq!(bare.language, Cell::NotAvailable);

    let padded = outcome.results.iter().find(|r| r.id.to_string() == "0042").unwrap();
    assert_eq!(padded.id, Cell::Text("0042".into()));
    assert_eq!(padded.size, Cell::Text("12 Mb".into()));
}

#[test]
fn test_report_of_search_parses_back() {
    let outcome = search(Query::new("distributed systems"), 5);
    let report = render_report(&outcome.results);
    assert!(report.starts_with("Top 5 Results:\n\n1. ID 102\n"));

    let entries = parse_report(&report);
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].get(ReportField::Title), Some("Designing Distributed Systems"));
    assert_eq!(
        entries[0].get(ReportField::Url),
        Some("http://libgen.test/book/index.php?md5=102")
    );
    assert_eq!(entries[1].get(ReportField::Url), None);
    assert_eq!(entries[3].id, "0042");
}

// ============================================================================
// ERRORS
// ============================================================================

/// Panics if the pipeline reaches it.
struct Untouchable;

impl Catalog for Untouchable {
    fn search(&self, _: &CatalogRequest) -> Result<Vec<RawRecord>, CatalogError> {
        panic!("catalog queried before validation");
    }

    fn lookup(&self, _: &str) -> Result<Option<RawRecord>, CatalogError> {
        panic!("catalog queried before validation");
    }
}

#[test]
fn test_validation_happens_before_io() {
    let config = RankerConfig::default();
    let empty = SearchRequest::new(Query::new(" \t "), 5);
    assert!(matches!(
        run_search(&Untouchable, &empty, &config, 25),
        Err(BookrankError::Validation(ValidationError::EmptyQuery))
    ));

    let zero = SearchRequest::new(Query::new("rust"), 0);
    assert!(matches!(
        run_search(&Untouchable, &zero, &config, 25),
        Err(BookrankError::Validation(ValidationError::NonPositiveLimit { limit: 0 }))
    ));
}

#[test]
fn test_empty_catalog_gives_empty_report() {
    let catalog = StaticCatalog::new(Vec::new());
    let request = SearchRequest::new(Query::new("rust"), 5);
    let outcome = run_search(&catalog, &request, &RankerConfig::default(), 25).unwrap();
    assert!(outcome.results.is_empty());
    assert_eq!(render_report(&outcome.results), "Top 0 Results:\n");
}

// ============================================================================
// FILE-BACKED CATALOG
// ============================================================================

#[test]
fn test_static_catalog_from_file_matches_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_catalog_file(dir.path());
    let catalog = StaticCatalog::from_json_file(&path).unwrap();
    assert_eq!(catalog.len(), catalog_records().len());

    let request = SearchRequest::new(Query::new("distributed systems"), 10);
    let from_file = run_search(&catalog, &request, &RankerConfig::default(), 25).unwrap();
    let in_memory = search(Query::new("distributed systems"), 10);
    assert_eq!(from_file.results, in_memory.results);
}

#[test]
fn test_json_output_feeds_back_as_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let first = search(Query::new("distributed systems"), 3);
    let path = dir.path().join("results.json");
    std::fs::write(&path, serde_json::to_vec(&first.results).unwrap()).unwrap();

    let catalog = StaticCatalog::from_json_file(&path).unwrap();
    let request = SearchRequest::new(Query::new("distributed systems"), 3);
    let second = run_search(&catalog, &request, &RankerConfig::default(), 25).unwrap();

    let titles = |o: &bookrank::pipeline::SearchOutcome| -> Vec<String> {
        o.results.iter().map(|r| r.title.to_string()).collect()
    };
    assert_eq!(titles(&first), titles(&second));
    assert_eq!(second.results[0].authors, Cell::Text("Brendan Burns".into()));
}

#[test]
fn test_lookup_by_identifier() {
    let catalog = static_catalog();
    let record = catalog.lookup(" 0042 ").unwrap().unwrap();
    assert_eq!(
        record.text(bookrank::types::Field::Title).as_deref(),
        Some("The Systems Bible")
    );
    assert!(catalog.lookup("999").unwrap().is_none());
}

#[test]
fn test_missing_catalog_file_is_dataset_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = StaticCatalog::from_json_file(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, bookrank::error::DatasetError::Io { .. }));
}
