// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Per-record scoring.
//!
//! # CONSTANTS (DO NOT CHANGE WITHOUT A NEW RANKING RATIONALE)
//!
//! - `SUBSTRING_BONUS = 0.5`
//! - minimum token length 2, stop-word list in `tokenizer::DEFAULT_STOP_WORDS`
//!
//! Scores live in `[0, 1 + bonus]`. Test scenarios and exported scores depend
//! on these exact values.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::UnknownFieldName;
use crate::tokenizer::{tokenize_unique, TokenizerConfig};
use crate::types::{Field, Query, RawRecord, ScoreBreakdown, SearchField};

/// Added when the full query is a contiguous substring of the title.
pub const SUBSTRING_BONUS: f64 = 0.5;

/// Upper bound of any score under the default configuration.
pub const MAX_SCORE: f64 = 1.0 + SUBSTRING_BONUS;

/// Ranking settings. One value per invocation; nothing is global.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    #[serde(flatten)]
    pub tokenizer: TokenizerConfig,
    pub substring_bonus: f64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerConfig::default(),
            substring_bonus: SUBSTRING_BONUS,
        }
    }
}

/// A query tokenized once and reused against every candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    /// Unique query tokens `Q`, in first-seen order.
    pub tokens: Vec<String>,
    /// Lowercased, trimmed query text for the title substring check.
    pub needle: String,
    /// Fields whose values make up the candidate text.
    pub fields: Vec<SearchField>,
}

impl PreparedQuery {
    /// Tokenize the query and resolve its field restriction.
    ///
    /// Unknown field names are returned for the caller to report; they never
    /// fail the search.
    pub fn new(query: &Query, config: &RankerConfig) -> (Self, Vec<UnknownFieldName>) {
        let (fields, unknown) = query.resolve_fields();
        let prepared = Self {
            tokens: tokenize_unique(&query.text, &config.tokenizer),
            needle: config.tokenizer.fold(query.text.trim()),
            fields,
        };
        (prepared, unknown)
    }
}

/// Concatenate the selected fields of a record into one searchable string.
pub fn searchable_text(record: &RawRecord, fields: &[SearchField]) -> String {
    fields
        .iter()
        .filter_map(|field| record.text(field.field()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fraction of query tokens present in the candidate tokens.
///
/// Returns the score and the matched tokens in query order. An empty query
/// token set scores 0.
pub fn overlap_score(query_tokens: &[String], candidate: &HashSet<String>) -> (f64, Vec<String>) {
    if query_tokens.is_empty() {
        return (0.0, Vec::new());
    }
    let matched: Vec<String> = query_tokens
        .iter()
        .filter(|token| candidate.contains(*token))
        .cloned()
        .collect();
    let score = matched.len() as f64 / query_tokens.len() as f64;
    (score, matched)
}

/// The substring bonus, if the whole query appears in the record's title.
pub fn title_bonus(needle: &str, record: &RawRecord, config: &RankerConfig) -> f64 {
    if needle.is_empty() {
        return 0.0;
    }
    match record.text(Field::Title) {
        Some(title) if config.tokenizer.fold(&title).contains(needle) => config.substring_bonus,
        _ => 0.0,
    }
}

/// Score one record against a prepared query.
///
/// Pure and deterministic: the same query, record and config always produce
/// the same breakdown. A record with no overlap and no title match scores
/// exactly 0 and is still a valid candidate.
pub fn score_record(query: &PreparedQuery, record: &RawRecord, config: &RankerConfig) -> ScoreBreakdown {
    let text = searchable_text(record, &query.fields);
    let candidate: HashSet<String> = tokenize_unique(&text, &config.tokenizer)
        .into_iter()
        .collect();
    let (overlap, matched_terms) = overlap_score(&query.tokens, &candidate);
    ScoreBreakdown {
        overlap,
        bonus: title_bonus(&query.needle, record, config),
        matched_terms,
        query_terms: query.tokens.len(),
    }
}
