// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Result ranking: how scored records get ordered and cut.
//!
//! Sort order is descending score only. Ties keep the order the catalog
//! returned them in, which makes ranking stable and idempotent: ranking a
//! ranked list again with the same query changes nothing.

use std::cmp::Ordering;

use tracing::{debug, warn};

use super::core::{score_record, PreparedQuery, RankerConfig};
use crate::error::ValidationError;
use crate::types::{Query, RawRecord, ScoredRecord};

/// Compare two scored records for ranking (higher score first).
///
/// Equal scores compare `Equal`; used with a stable sort this preserves the
/// original relative order.
pub fn compare_scored(a: &ScoredRecord, b: &ScoredRecord) -> Ordering {
    b.score.total_cmp(&a.score)
}

/// Score, sort and truncate candidates for a query.
///
/// Returns at most `limit` records with ranks `1..=n`. `limit == 0` is a
/// validation error; an empty candidate list yields an empty result.
/// Unknown field-restriction names are logged and ignored.
pub fn rank(
    query: &Query,
    records: Vec<RawRecord>,
    limit: usize,
    config: &RankerConfig,
) -> Result<Vec<ScoredRecord>, ValidationError> {
    if limit == 0 {
        return Err(ValidationError::NonPositiveLimit { limit: 0 });
    }
    let (prepared, unknown) = PreparedQuery::new(query, config);
    for field in &unknown {
        warn!(field = %field.name, "ignoring unknown field restriction");
    }
    rank_prepared(&prepared, records, limit, config)
}

/// [`rank`] for a query that has already been prepared.
pub fn rank_prepared(
    query: &PreparedQuery,
    records: Vec<RawRecord>,
    limit: usize,
    config: &RankerConfig,
) -> Result<Vec<ScoredRecord>, ValidationError> {
    if limit == 0 {
        return Err(ValidationError::NonPositiveLimit { limit: 0 });
    }

    let candidates = records.len();
    let mut scored: Vec<ScoredRecord> = records
        .into_iter()
        .map(|record| {
            let breakdown = score_record(query, &record, config);
            ScoredRecord {
                score: breakdown.total(),
                record,
                rank: 0,
                breakdown,
            }
        })
        .collect();

    // `sort_by` is stable: equal scores keep catalog order.
    scored.sort_by(compare_scored);
    scored.truncate(limit);
    for (i, entry) in scored.iter_mut().enumerate() {
        entry.rank = i + 1;
    }

    debug!(candidates, kept = scored.len(), "ranked candidates");
    Ok(scored)
}
