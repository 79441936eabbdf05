//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use bookrank::catalog::StaticCatalog;
use bookrank::types::{Field, RawRecord, ScoredRecord};
use serde_json::{json, Value};

// Re-export canonical test utilities from bookrank::testing
pub use bookrank::testing::{make_book, make_full_record, make_record};

// ============================================================================
// CATALOG FIXTURES
// ============================================================================

/// A small catalog response, shaped the way the JSON endpoint answers.
pub fn catalog_json() -> Value {
    json!([
        {
            "id": "101",
            "title": "Systems Programming with Rust",
            "author": "Jane Doe",
            "publisher": "No Starch Press",
            "year": "2020",
            "language": "English",
            "filesize": "5242880",
            "extension": "PDF",
            "md5": "0123456789ABCDEF0123456789ABCDEF"
        },
        {
            "id": "102",
            "title": "Designing Distributed Systems",
            "author": ["Brendan Burns"],
            "publisher": "O'Reilly Media",
            "year": 2018,
            "language": "English",
            "filesize": 1048576,
            "extension": "epub",
            "url": "http://libgen.test/book/index.php?md5=102"
        },
        {
            "id": "103",
            "title": "Distributed Systems",
            "author": "",
            "year": "2017",
            "extension": "pdf"
        },
        {
            "id": "104",
            "title": "Cooking for Engineers",
            "author": "Sam Chef",
            "year": "2009"
        },
        {
            "id": "0042",
            "title": "The Systems Bible",
            "author": "John Gall",
            "year": "2002",
            "filesize": "12 Mb"
        }
    ])
}

/// Records parsed from [`catalog_json`].
pub fn catalog_records() -> Vec<RawRecord> {
    bookrank::catalog::parse_json_records(&catalog_json()).unwrap()
}

pub fn static_catalog() -> StaticCatalog {
    StaticCatalog::new(catalog_records())
}

/// Write [`catalog_json`] into `dir` and return the path.
pub fn write_catalog_file(dir: &Path) -> PathBuf {
    let path = dir.join("catalog.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&catalog_json()).unwrap()).unwrap();
    path
}

// ============================================================================
// ASSERTIONS
// ============================================================================

/// Identifiers of ranked records, in rank order.
pub fn ranked_ids(scored: &[ScoredRecord]) -> Vec<String> {
    scored
        .iter()
        .map(|entry| entry.record.text(Field::Id).unwrap_or_default())
        .collect()
}

/// Ranks are `1..=n`, scores never increase, every score is in range.
pub fn assert_ranking_well_formed(scored: &[ScoredRecord]) {
    for (i, entry) in scored.iter().enumerate() {
        assert_eq!(entry.rank, i + 1, "rank out of sequence at position {}", i);
        assert!(
            (0.0..=bookrank::scoring::MAX_SCORE).contains(&entry.score),
            "score {} out of range",
            entry.score
        );
    }
    for pair in scored.windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "scores not descending: {} then {}",
            pair[0].score,
            pair[1].score
        );
    }
}
