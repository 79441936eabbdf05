// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Coercion of raw catalog records into the fixed display schema.
//!
//! Every rule lives here and is applied per field, independently:
//!
//! | Field            | Rule                                                   |
//! |------------------|--------------------------------------------------------|
//! | author(s)        | split on `, ; & \|`, rejoin with `", "`; blank → Unknown |
//! | year, pages      | numeric strings become numbers, anything else verbatim |
//! | size             | byte counts → largest of B/KB/MB ≥ 1, two decimals     |
//! | text fields      | trimmed, inner whitespace collapsed                    |
//! | extension        | lowercased                                             |
//! | download links   | trimmed; missing or broken ones omitted, never `N/A`   |
//!
//! Any field the record lacks renders as `N/A`.

use crate::types::{
    Cell, DownloadLinks, Field, FieldValue, Mirror, NormalizedResult, RawRecord, ScoredRecord,
};
use crate::utils::{collapse_whitespace, format_number, format_size, looks_numeric};

/// Rendered when an author field is present but holds no names.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

const LIST_DELIMITERS: &[char] = &[',', ';', '&', '|'];

/// Normalize one scored record.
pub fn normalize(scored: &ScoredRecord) -> NormalizedResult {
    let record = &scored.record;
    let links = normalize_links(&record.links);
    NormalizedResult {
        rank: scored.rank,
        id: text_cell(record.get(Field::Id)),
        title: text_cell(record.get(Field::Title)),
        authors: authors_cell(record.get(Field::Author)),
        publisher: text_cell(record.get(Field::Publisher)),
        year: numeric_cell(record.get(Field::Year)),
        language: list_cell(record.get(Field::Language)),
        size: size_cell(record.get(Field::Size)),
        extension: match text_cell(record.get(Field::Extension)) {
            Cell::Text(ext) => Cell::Text(ext.to_lowercase()),
            other => other,
        },
        url: links.url,
        get_download: links.get,
        mirrors: links.mirrors,
        score: scored.score,
    }
}

/// Normalize a ranked list, preserving order.
pub fn normalize_all(scored: &[ScoredRecord]) -> Vec<NormalizedResult> {
    scored.iter().map(normalize).collect()
}

/// Normalize a bare record (rank 0, score 0), e.g. a catalog lookup.
pub fn normalize_record(record: RawRecord) -> NormalizedResult {
    normalize(&ScoredRecord {
        record,
        score: 0.0,
        rank: 0,
        breakdown: Default::default(),
    })
}

fn non_empty(value: &str) -> Option<String> {
    let collapsed = collapse_whitespace(value);
    (!collapsed.is_empty()).then_some(collapsed)
}

fn text_cell(value: Option<&FieldValue>) -> Cell {
    let text = match value {
        None => return Cell::NotAvailable,
        Some(FieldValue::Number(n)) => format_number(*n),
        Some(FieldValue::Text(s)) => s.clone(),
        Some(FieldValue::List(items)) => items.join(", "),
    };
    non_empty(&text).map_or(Cell::NotAvailable, Cell::Text)
}

fn split_names(value: &FieldValue) -> Vec<String> {
    let parts: Vec<String> = match value {
        FieldValue::Number(n) => vec![format_number(*n)],
        FieldValue::Text(s) => s.split(LIST_DELIMITERS).map(str::to_string).collect(),
        FieldValue::List(items) => items.clone(),
    };
    parts.iter().filter_map(|part| non_empty(part)).collect()
}

fn list_cell(value: Option<&FieldValue>) -> Cell {
    let Some(value) = value else {
        return Cell::NotAvailable;
    };
    let names = split_names(value);
    if names.is_empty() {
        Cell::NotAvailable
    } else {
        Cell::Text(names.join(", "))
    }
}

fn authors_cell(value: Option<&FieldValue>) -> Cell {
    match list_cell(value) {
        Cell::NotAvailable if value.is_some() => Cell::Text(UNKNOWN_AUTHOR.to_string()),
        cell => cell,
    }
}

fn number_cell(n: f64) -> Cell {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Cell::Integer(n as i64)
    } else {
        Cell::Decimal(n)
    }
}

fn numeric_cell(value: Option<&FieldValue>) -> Cell {
    match value {
        Some(FieldValue::Number(n)) if n.is_finite() => number_cell(*n),
        Some(FieldValue::Text(s)) if looks_numeric(s.trim()) => {
            s.trim().parse::<f64>().map_or_else(|_| text_cell(value), number_cell)
        }
        _ => text_cell(value),
    }
}

fn size_cell(value: Option<&FieldValue>) -> Cell {
    match value {
        Some(FieldValue::Number(bytes)) if bytes.is_finite() => Cell::Text(format_size(*bytes)),
        Some(FieldValue::Text(s)) if looks_numeric(s.trim()) => match s.trim().parse::<f64>() {
            Ok(bytes) => Cell::Text(format_size(bytes)),
            Err(_) => text_cell(value),
        },
        _ => text_cell(value),
    }
}

fn normalize_links(links: &DownloadLinks) -> DownloadLinks {
    DownloadLinks {
        url: links.url.as_deref().and_then(clean_link),
        get: links.get.as_deref().and_then(clean_link),
        mirrors: links
            .mirrors
            .iter()
            .filter_map(|mirror| {
                clean_link(&mirror.url).map(|url| Mirror {
                    label: collapse_whitespace(&mirror.label),
                    url,
                })
            })
            .collect(),
    }
}

/// A trimmed link, or `None` when empty or when whitespace or control
/// characters remain inside it.
fn clean_link(value: &str) -> Option<String> {
    let value = value.trim();
    let valid = !value.is_empty() && !value.chars().any(|c| c.is_whitespace() || c.is_control());
    valid.then(|| value.to_string())
}
