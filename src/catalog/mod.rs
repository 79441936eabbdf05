// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Catalog access.
//!
//! A [`Catalog`] turns a query into raw candidate records. The pipeline only
//! sees the trait, so the HTTP client and the in-memory catalog used for
//! offline runs and tests are interchangeable.

mod http;

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

pub use http::{md5_in, parse_json_records, parse_search_html, parse_size, HttpCatalog};

use crate::error::{CatalogError, DatasetError};
use crate::types::{Field, RawRecord, SearchField};

/// Mirrors probed in order when none is configured explicitly.
pub const DEFAULT_MIRRORS: &[&str] = &["http://libgen.rs", "http://libgen.is", "http://libgen.st"];

/// Candidates fetched per search when the result limit is smaller.
pub const DEFAULT_FETCH_LIMIT: usize = 25;

/// `[catalog]` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Use this mirror without probing.
    pub mirror: Option<String>,
    /// Candidates for probing, in order.
    pub mirrors: Vec<String>,
    pub timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub user_agent: String,
    pub fetch_limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            mirror: None,
            mirrors: DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
            timeout_secs: 10,
            probe_timeout_secs: 5,
            user_agent: concat!("bookrank/", env!("CARGO_PKG_VERSION")).to_string(),
            fetch_limit: DEFAULT_FETCH_LIMIT,
        }
    }
}

/// One catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRequest {
    pub query: String,
    /// Resolved field restriction, in canonical order.
    pub fields: Vec<SearchField>,
    /// Upper bound on candidates returned.
    pub ceiling: Option<usize>,
}

impl CatalogRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            fields: SearchField::ALL.to_vec(),
            ceiling: None,
        }
    }
}

/// A source of raw candidate records.
pub trait Catalog {
    /// Fetch candidates for a query, in catalog order.
    fn search(&self, request: &CatalogRequest) -> Result<Vec<RawRecord>, CatalogError>;

    /// Fetch one record by identifier.
    fn lookup(&self, id: &str) -> Result<Option<RawRecord>, CatalogError>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn search(&self, request: &CatalogRequest) -> Result<Vec<RawRecord>, CatalogError> {
        (**self).search(request)
    }

    fn lookup(&self, id: &str) -> Result<Option<RawRecord>, CatalogError> {
        (**self).lookup(id)
    }
}

/// An in-memory catalog over a fixed record list.
///
/// Returns every record for every query, in list order; ranking decides
/// relevance.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    records: Vec<RawRecord>,
}

impl StaticCatalog {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    /// Load records from a JSON array of objects, such as a previous
    /// `search --json` run or a JSON export.
    pub fn from_json_file(path: &Path) -> Result<Self, DatasetError> {
        let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|e| DatasetError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let records = parse_json_records(&value).map_err(|e| DatasetError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Catalog for StaticCatalog {
    fn search(&self, request: &CatalogRequest) -> Result<Vec<RawRecord>, CatalogError> {
        let take = request.ceiling.unwrap_or(usize::MAX);
        Ok(self.records.iter().take(take).cloned().collect())
    }

    fn lookup(&self, id: &str) -> Result<Option<RawRecord>, CatalogError> {
        let id = id.trim();
        Ok(self
            .records
            .iter()
            .find(|record| record.text(Field::Id).is_some_and(|value| value.trim() == id))
            .cloned())
    }
}
