// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Filtering and summarising datasets, and explaining scores.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::dataset::Dataset;
use crate::error::ValidationError;
use crate::normalize::{normalize, UNKNOWN_AUTHOR};
use crate::tokenizer::{tokenize, TokenizerConfig};
use crate::types::{Cell, Field, ScoredRecord};

/// Default number of keywords kept per field.
pub const DEFAULT_TOP_KEYWORDS: usize = 10;

/// Values listed per non-numeric column in a summary.
const TOP_VALUES: usize = 5;

// =============================================================================
// FILTERS
// =============================================================================

/// One column condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Equal to the value: numerically when both sides are numbers,
    /// otherwise case-insensitive text.
    Equals(Cell),
    /// Equal to any of the values.
    OneOf(Vec<Cell>),
    /// Numeric and within the inclusive bounds.
    Range { min: Option<f64>, max: Option<f64> },
}

impl Criterion {
    fn from_json(column: &str, value: &Value) -> Result<Criterion, ValidationError> {
        let malformed = |message: String| ValidationError::MalformedFilter { message };
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Array(_) | Value::Object(_) => Err(malformed(format!(
                        "`{column}`: list entries must be plain values"
                    ))),
                    scalar => Ok(Cell::from_json(scalar)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Criterion::OneOf),
            Value::Object(bounds) => {
                if bounds.is_empty() {
                    return Err(malformed(format!("`{column}`: range needs `min` or `max`")));
                }
                let mut min = None;
                let mut max = None;
                for (key, bound) in bounds {
                    let number = bound.as_f64().ok_or_else(|| {
                        malformed(format!("`{column}`: range bound `{key}` must be a number"))
                    })?;
                    match key.as_str() {
                        "min" => min = Some(number),
                        "max" => max = Some(number),
                        other => {
                            return Err(malformed(format!(
                                "`{column}`: unknown range key `{other}`"
                            )))
                        }
                    }
                }
                Ok(Criterion::Range { min, max })
            }
            scalar => Ok(Criterion::Equals(Cell::from_json(scalar))),
        }
    }

    pub fn matches(&self, cell: &Cell) -> bool {
        match self {
            Criterion::Equals(expected) => cells_equal(cell, expected),
            Criterion::OneOf(options) => options.iter().any(|option| cells_equal(cell, option)),
            Criterion::Range { min, max } => match cell.as_f64() {
                Some(x) => min.map_or(true, |lo| x >= lo) && max.map_or(true, |hi| x <= hi),
                None => false,
            },
        }
    }
}

fn cells_equal(cell: &Cell, expected: &Cell) -> bool {
    match (cell.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => cell.to_string().to_lowercase() == expected.to_string().to_lowercase(),
    }
}

/// Column conditions, all of which a row must satisfy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub criteria: Vec<(String, Criterion)>,
}

impl FilterCriteria {
    /// Parse a JSON object of `column → criterion`.
    ///
    /// ```
    /// use bookrank::analysis::FilterCriteria;
    ///
    /// let filters = FilterCriteria::parse(r#"{"extension": "pdf", "year": {"min": 2010}}"#).unwrap();
    /// assert_eq!(filters.criteria.len(), 2);
    /// ```
    pub fn parse(text: &str) -> Result<FilterCriteria, ValidationError> {
        let value: Value = serde_json::from_str(text).map_err(|e| ValidationError::MalformedFilter {
            message: e.to_string(),
        })?;
        let Value::Object(object) = value else {
            return Err(ValidationError::MalformedFilter {
                message: "expected a JSON object mapping columns to criteria".to_string(),
            });
        };
        let criteria = object
            .iter()
            .map(|(column, value)| Ok((column.clone(), Criterion::from_json(column, value)?)))
            .collect::<Result<Vec<_>, ValidationError>>()?;
        Ok(FilterCriteria { criteria })
    }

    /// Rows of `dataset` matching every criterion on a known column.
    ///
    /// Criteria naming unknown columns are logged and skipped.
    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        let resolved: Vec<(usize, &Criterion)> = self
            .criteria
            .iter()
            .filter_map(|(column, criterion)| match find_column(dataset, column) {
                Some(index) => Some((index, criterion)),
                None => {
                    warn!(column = %column, "filter column not found, skipping");
                    None
                }
            })
            .collect();
        let filtered = dataset.retain_rows(|row| {
            resolved
                .iter()
                .all(|(index, criterion)| row.get(*index).is_some_and(|cell| criterion.matches(cell)))
        });
        info!(before = dataset.len(), after = filtered.len(), "filtered dataset");
        filtered
    }
}

/// Find a column by exact name, else by catalog field alias
/// (`author` finds `authors`).
pub fn find_column(dataset: &Dataset, name: &str) -> Option<usize> {
    dataset.column_index(name).or_else(|| {
        let field = Field::from_key(name)?;
        dataset
            .columns
            .iter()
            .position(|column| Field::from_key(column) == Some(field))
    })
}

// =============================================================================
// KEYWORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keyword {
    pub term: String,
    pub count: usize,
}

/// Top keywords of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldKeywords {
    pub field: String,
    pub keywords: Vec<Keyword>,
}

/// Most frequent tokens per requested column.
///
/// Uses the scoring tokenizer, so stop words and short tokens never show up.
/// `N/A` and `Unknown` markers are not counted. Ties keep first-seen order.
pub fn extract_keywords(
    dataset: &Dataset,
    fields: &[String],
    top_k: usize,
    config: &TokenizerConfig,
) -> Vec<FieldKeywords> {
    let mut out = Vec::new();
    for field in fields {
        let Some(index) = find_column(dataset, field) else {
            warn!(field = %field, "keyword field not found, skipping");
            continue;
        };
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for cell in dataset.column(index) {
            let text = match cell {
                Cell::NotAvailable => continue,
                Cell::Text(s) if s == UNKNOWN_AUTHOR => continue,
                other => other.to_string(),
            };
            for token in tokenize(&text, config) {
                let count = counts.entry(token.clone()).or_insert(0);
                if *count == 0 {
                    order.push(token);
                }
                *count += 1;
            }
        }
        let mut keywords: Vec<Keyword> = order
            .into_iter()
            .map(|term| Keyword {
                count: counts[&term],
                term,
            })
            .collect();
        // Stable: ties stay in first-seen order.
        keywords.sort_by(|a, b| b.count.cmp(&a.count));
        keywords.truncate(top_k);
        out.push(FieldKeywords {
            field: field.clone(),
            keywords,
        });
    }
    out
}

// =============================================================================
// SUMMARY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStats {
    Numeric {
        min: f64,
        max: f64,
        mean: f64,
        median: f64,
        /// Sample standard deviation; absent with fewer than two values.
        std: Option<f64>,
    },
    Categorical {
        unique_values: usize,
        top_values: Vec<ValueCount>,
    },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub missing: usize,
    pub stats: ColumnStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnSummary>,
}

/// Row and column counts, missing values, and per-column statistics.
///
/// A column whose present values are all numeric gets numeric stats; any
/// other column with values gets its most common values.
pub fn summarize(dataset: &Dataset) -> DatasetSummary {
    let columns = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let present: Vec<&Cell> = dataset.column(index).filter(|c| c.is_available()).collect();
            let missing = dataset.len() - present.len();
            let numbers: Option<Vec<f64>> = present.iter().map(|c| c.as_f64()).collect();
            let stats = match numbers {
                _ if present.is_empty() => ColumnStats::Empty,
                Some(numbers) => numeric_stats(numbers),
                None => categorical_stats(&present),
            };
            ColumnSummary {
                name: name.clone(),
                missing,
                stats,
            }
        })
        .collect();
    DatasetSummary {
        row_count: dataset.len(),
        column_count: dataset.columns.len(),
        columns,
    }
}

fn numeric_stats(mut values: Vec<f64>) -> ColumnStats {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    };
    let std = (n > 1).then(|| {
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    });
    ColumnStats::Numeric {
        min: values[0],
        max: values[n - 1],
        mean,
        median,
        std,
    }
}

fn categorical_stats(present: &[&Cell]) -> ColumnStats {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for cell in present {
        let value = cell.to_string();
        let count = counts.entry(value.clone()).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }
    let unique_values = order.len();
    let mut top_values: Vec<ValueCount> = order
        .into_iter()
        .map(|value| ValueCount {
            count: counts[&value],
            value,
        })
        .collect();
    top_values.sort_by(|a, b| b.count.cmp(&a.count));
    top_values.truncate(TOP_VALUES);
    ColumnStats::Categorical {
        unique_values,
        top_values,
    }
}

/// Result of `analyze`: keywords plus a dataset summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub source: Option<String>,
    pub keywords: Vec<FieldKeywords>,
    pub summary: DatasetSummary,
}

impl Analysis {
    pub fn run(
        dataset: &Dataset,
        fields: &[String],
        top_k: usize,
        config: &TokenizerConfig,
    ) -> Analysis {
        Analysis {
            source: None,
            keywords: extract_keywords(dataset, fields, top_k, config),
            summary: summarize(dataset),
        }
    }
}

// =============================================================================
// RATING EXPLANATIONS
// =============================================================================

/// Why a record scored what it scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingExplanation {
    pub rank: usize,
    pub title: String,
    pub authors: String,
    pub score: f64,
    pub overlap: f64,
    pub bonus: f64,
    pub matched_terms: Vec<String>,
    pub explanation: String,
}

/// Explain each ranked record's score.
pub fn explain(scored: &[ScoredRecord]) -> Vec<RatingExplanation> {
    scored
        .iter()
        .map(|entry| {
            let display = normalize(entry);
            let breakdown = &entry.breakdown;
            let mut explanation = format!(
                "Matched {} of {} query terms",
                breakdown.matched_terms.len(),
                breakdown.query_terms
            );
            if !breakdown.matched_terms.is_empty() {
                explanation.push_str(&format!(" ({})", breakdown.matched_terms.join(", ")));
            }
            explanation.push_str(&format!(": overlap {:.2}", breakdown.overlap));
            if breakdown.bonus > 0.0 {
                explanation.push_str(&format!(
                    "; title contains the full query (+{:.2})",
                    breakdown.bonus
                ));
            }
            RatingExplanation {
                rank: entry.rank,
                title: display.title.to_string(),
                authors: display.authors.to_string(),
                score: entry.score,
                overlap: breakdown.overlap,
                bonus: breakdown.bonus,
                matched_terms: breakdown.matched_terms.clone(),
                explanation,
            }
        })
        .collect()
}
