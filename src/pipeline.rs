// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The search pipeline: validate, fetch, rank, normalize.
//!
//! ```text
//! SearchRequest ──validate──▶ CatalogRequest ──Catalog::search──▶ Vec<RawRecord>
//!                                                                      │
//!          SearchOutcome ◀──normalize── Vec<ScoredRecord> ◀──rank──────┘
//! ```
//!
//! Validation happens before any catalog call. A catalog that answers with
//! garbage degrades to zero candidates; one that cannot be reached aborts.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogRequest, StaticCatalog};
use crate::error::{BookrankResult, CatalogError, ValidationError};
use crate::normalize::{normalize_all, normalize_record};
use crate::scoring::{rank_prepared, PreparedQuery, RankerConfig};
use crate::types::{NormalizedResult, Query, ScoredRecord};

/// Default number of results kept.
pub const DEFAULT_LIMIT: usize = 25;

/// A search as the user asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: Query,
    pub limit: usize,
}

impl SearchRequest {
    pub fn new(query: Query, limit: usize) -> Self {
        Self { query, limit }
    }

    /// Reject empty queries and zero limits.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.query.text.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        if self.limit == 0 {
            return Err(ValidationError::NonPositiveLimit { limit: 0 });
        }
        Ok(())
    }
}

/// Convert a row limit given on the command line, rejecting zero and
/// negative values.
pub fn positive_limit(limit: i64) -> Result<usize, ValidationError> {
    usize::try_from(limit)
        .ok()
        .filter(|&n| n > 0)
        .ok_or(ValidationError::NonPositiveLimit { limit })
}

/// Everything a search produced.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub query: Query,
    /// Candidates the catalog returned before truncation.
    pub candidates: usize,
    pub scored: Vec<ScoredRecord>,
    pub results: Vec<NormalizedResult>,
}

/// Run one search against a catalog.
///
/// The catalog is asked for `max(limit, fetch_limit)` candidates so a small
/// limit still ranks a useful pool.
pub fn run_search<C: Catalog + ?Sized>(
    catalog: &C,
    request: &SearchRequest,
    config: &RankerConfig,
    fetch_limit: usize,
) -> BookrankResult<SearchOutcome> {
    request.validate()?;

    let (prepared, unknown) = PreparedQuery::new(&request.query, config);
    for field in &unknown {
        warn!(field = %field.name, "ignoring unknown field restriction");
    }

    let catalog_request = CatalogRequest {
        query: request.query.text.trim().to_string(),
        fields: prepared.fields.clone(),
        ceiling: Some(request.limit.max(fetch_limit)),
    };
    info!(query = %catalog_request.query, limit = request.limit, "searching catalog");

    let records = match catalog.search(&catalog_request) {
        Ok(records) => records,
        Err(CatalogError::MalformedResponse { message }) => {
            warn!(%message, "catalog response unreadable, continuing with no candidates");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };
    let candidates = records.len();

    let scored = rank_prepared(&prepared, records, request.limit, config)?;
    let results = normalize_all(&scored);
    info!(candidates, results = results.len(), "search complete");

    Ok(SearchOutcome {
        query: request.query.clone(),
        candidates,
        scored,
        results,
    })
}

/// Run one search against a local JSON catalog file.
///
/// The request is validated before the file is opened.
pub fn run_search_from_file(
    path: &Path,
    request: &SearchRequest,
    config: &RankerConfig,
    fetch_limit: usize,
) -> BookrankResult<SearchOutcome> {
    request.validate()?;
    let catalog = StaticCatalog::from_json_file(path)?;
    info!(path = %path.display(), records = catalog.len(), "using local catalog");
    run_search(&catalog, request, config, fetch_limit)
}

/// Look up one record by identifier and normalize it as the only result.
///
/// Returns `Ok(None)` when the catalog has no such record.
pub fn lookup_details<C: Catalog + ?Sized>(
    catalog: &C,
    id: &str,
) -> BookrankResult<Option<NormalizedResult>> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::EmptyIdentifier.into());
    }
    debug!(id, "looking up record");
    Ok(catalog.lookup(id)?.map(|record| {
        let mut result = normalize_record(record);
        result.rank = 1;
        result
    }))
}
