// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of a ranked result set.
//!
//! Catalog records arrive sparse and inconsistent: any field may be missing,
//! authors may be one delimited string or a list, sizes may be byte counts or
//! free text. `RawRecord` keeps them as a map from a known field enum to an
//! optional typed value and never assumes presence. Coercion into the fixed
//! display schema (`NormalizedResult`) happens in one place, `normalize`.
//!
//! # Invariants
//!
//! - **ScoredRecord**: within one result set, `a.rank < b.rank ⇒ a.score ≥ b.score`,
//!   and ranks are `1..=len` with no gaps.
//! - **NormalizedResult**: every display field is either a value or the `"N/A"`
//!   marker. Download descriptors are the only optional parts; absence means
//!   "no button", not "N/A".

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::UnknownFieldName;
use crate::utils::{format_number, looks_numeric};

/// Marker rendered for any field the catalog did not supply.
pub const NOT_AVAILABLE: &str = "N/A";

// =============================================================================
// FIELDS
// =============================================================================

/// Every catalog field the pipeline knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Id,
    Title,
    Author,
    Publisher,
    Year,
    Pages,
    Language,
    Size,
    Extension,
    Isbn,
    Md5,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Id,
        Field::Title,
        Field::Author,
        Field::Publisher,
        Field::Year,
        Field::Pages,
        Field::Language,
        Field::Size,
        Field::Extension,
        Field::Isbn,
        Field::Md5,
    ];

    /// Canonical lowercase name, as used in exports.
    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Author => "author",
            Field::Publisher => "publisher",
            Field::Year => "year",
            Field::Pages => "pages",
            Field::Language => "language",
            Field::Size => "size",
            Field::Extension => "extension",
            Field::Isbn => "isbn",
            Field::Md5 => "md5",
        }
    }

    /// Map a catalog key (canonical name or known alias) to a field.
    ///
    /// Catalog mirrors disagree on naming: `filesize` vs `size`, `authors`
    /// vs `author`, `identifier` vs `isbn`. Matching is case-insensitive.
    pub fn from_key(key: &str) -> Option<Field> {
        let field = match key.trim().to_ascii_lowercase().as_str() {
            "id" => Field::Id,
            "title" => Field::Title,
            "author" | "authors" | "author(s)" => Field::Author,
            "publisher" => Field::Publisher,
            "year" => Field::Year,
            "pages" => Field::Pages,
            "language" | "languages" | "language(s)" | "lang" => Field::Language,
            "size" | "filesize" => Field::Size,
            "extension" | "ext" => Field::Extension,
            "isbn" | "identifier" => Field::Isbn,
            "md5" => Field::Md5,
            _ => return None,
        };
        Some(field)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The subset of fields that feed relevance scoring.
///
/// This set is both the default field restriction and the meaning of
/// "search all known fields".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Title,
    Author,
    Publisher,
    Year,
    Language,
}

impl SearchField {
    pub const ALL: [SearchField; 5] = [
        SearchField::Title,
        SearchField::Author,
        SearchField::Publisher,
        SearchField::Year,
        SearchField::Language,
    ];

    /// The record field this search field reads from.
    pub fn field(self) -> Field {
        match self {
            SearchField::Title => Field::Title,
            SearchField::Author => Field::Author,
            SearchField::Publisher => Field::Publisher,
            SearchField::Year => Field::Year,
            SearchField::Language => Field::Language,
        }
    }

    pub fn name(self) -> &'static str {
        self.field().name()
    }
}

impl std::str::FromStr for SearchField {
    type Err = UnknownFieldName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownFieldName {
            name: s.to_string(),
        };
        match Field::from_key(s).ok_or_else(unknown)? {
            Field::Title => Ok(SearchField::Title),
            Field::Author => Ok(SearchField::Author),
            Field::Publisher => Ok(SearchField::Publisher),
            Field::Year => Ok(SearchField::Year),
            Field::Language => Ok(SearchField::Language),
            _ => Err(unknown()),
        }
    }
}

// =============================================================================
// RAW RECORDS
// =============================================================================

/// A value as the catalog sent it. Untrusted and unnormalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Convert a JSON value, dropping shapes the pipeline cannot use
    /// (null, booleans, nested objects).
    pub fn from_json(value: &Value) -> Option<FieldValue> {
        match value {
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            Value::Array(items) => {
                let list: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect();
                Some(FieldValue::List(list))
            }
            _ => None,
        }
    }

    /// String form used for tokenization.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(" "),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

/// A named alternative download location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mirror {
    pub label: String,
    pub url: String,
}

/// Download descriptors attached to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadLinks {
    /// Primary page for the record.
    pub url: Option<String>,
    /// Direct GET download link.
    pub get: Option<String>,
    pub mirrors: Vec<Mirror>,
}

impl DownloadLinks {
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.get.is_none() && self.mirrors.is_empty()
    }

    /// Collect descriptors from the loosely structured keys catalogs use:
    /// `url`/`link`, `get`, a `download_links` object, or a `mirrors` list.
    fn from_json(object: &serde_json::Map<String, Value>) -> DownloadLinks {
        let mut links = DownloadLinks::default();
        let string_at = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        links.url = string_at("url").or_else(|| string_at("link"));
        links.get = string_at("get").or_else(|| string_at("get_download"));

        if let Some(Value::Object(download)) = object.get("download_links") {
            for (label, value) in download {
                let Some(url) = value.as_str() else { continue };
                if label == "get" && links.get.is_none() {
                    links.get = Some(url.to_string());
                } else {
                    links.mirrors.push(Mirror {
                        label: label.clone(),
                        url: url.to_string(),
                    });
                }
            }
        }

        if let Some(Value::Array(mirrors)) = object.get("mirrors") {
            for (i, entry) in mirrors.iter().enumerate() {
                let mirror = match entry {
                    Value::String(url) => Some(Mirror {
                        label: format!("mirror {}", i + 1),
                        url: url.clone(),
                    }),
                    Value::Object(m) => m.get("url").and_then(Value::as_str).map(|url| Mirror {
                        label: m
                            .get("label")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("mirror {}", i + 1)),
                        url: url.to_string(),
                    }),
                    _ => None,
                };
                links.mirrors.extend(mirror);
            }
        }

        links
    }
}

/// One catalog entry, exactly as received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: BTreeMap<Field, FieldValue>,
    pub links: DownloadLinks,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn with_links(mut self, links: DownloadLinks) -> Self {
        self.links = links;
        self
    }

    pub fn set(&mut self, field: Field, value: impl Into<FieldValue>) {
        self.fields.insert(field, value.into());
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// String form of a field, if present.
    pub fn text(&self, field: Field) -> Option<String> {
        self.get(field).map(FieldValue::as_text)
    }

    pub fn fields(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.fields.iter().map(|(field, value)| (*field, value))
    }

    /// Build a record from one JSON object. Returns `None` for non-objects.
    ///
    /// Unknown keys and values of unexpected shape are skipped; a record is
    /// never rejected for what it lacks.
    pub fn from_json(value: &Value) -> Option<RawRecord> {
        let object = value.as_object()?;
        let mut record = RawRecord {
            links: DownloadLinks::from_json(object),
            ..RawRecord::default()
        };
        for (key, value) in object {
            let Some(field) = Field::from_key(key) else {
                continue;
            };
            // First spelling wins when a catalog sends both `size` and `filesize`.
            if record.fields.contains_key(&field) {
                continue;
            }
            if let Some(value) = FieldValue::from_json(value) {
                record.fields.insert(field, value);
            }
        }
        Some(record)
    }
}

// =============================================================================
// QUERIES AND SCORES
// =============================================================================

/// A user query plus an optional field restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub fields: Option<Vec<String>>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fields: None,
        }
    }

    pub fn with_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Resolve the field restriction against the known searchable fields.
    ///
    /// Returns the fields in canonical order plus one `UnknownFieldName` per
    /// unrecognised name. An empty or fully unknown restriction collapses to
    /// all searchable fields.
    pub fn resolve_fields(&self) -> (Vec<SearchField>, Vec<UnknownFieldName>) {
        let Some(requested) = &self.fields else {
            return (SearchField::ALL.to_vec(), Vec::new());
        };

        let mut unknown = Vec::new();
        let mut chosen = Vec::new();
        for name in requested {
            match name.parse::<SearchField>() {
                Ok(field) => chosen.push(field),
                Err(err) => unknown.push(err),
            }
        }

        let resolved: Vec<SearchField> = SearchField::ALL
            .into_iter()
            .filter(|field| chosen.contains(field))
            .collect();

        if resolved.is_empty() {
            (SearchField::ALL.to_vec(), unknown)
        } else {
            (resolved, unknown)
        }
    }
}

/// How a score was reached. Kept for rating explanations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// `|Q ∩ C| / |Q|`, in `[0, 1]`.
    pub overlap: f64,
    /// Substring bonus, `0` or the configured constant.
    pub bonus: f64,
    /// Query tokens found in the candidate, in query order.
    pub matched_terms: Vec<String>,
    /// `|Q|`, the number of unique query tokens.
    pub query_terms: usize,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.overlap + self.bonus
    }
}

/// A record with its relevance score and 1-based position.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: RawRecord,
    pub score: f64,
    pub rank: usize,
    pub breakdown: ScoreBreakdown,
}

// =============================================================================
// NORMALIZED RESULTS
// =============================================================================

/// A display-ready value: a number, a string, or the "not available" marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i64),
    Decimal(f64),
    Text(String),
    NotAvailable,
}

impl Cell {
    /// Type a raw string: numbers become numeric cells, blanks and `N/A`
    /// become `NotAvailable`, everything else stays text.
    pub fn parse(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == NOT_AVAILABLE {
            return Cell::NotAvailable;
        }
        if looks_numeric(trimmed) {
            if let Ok(n) = trimmed.parse::<i64>() {
                return Cell::Integer(n);
            }
            if let Ok(x) = trimmed.parse::<f64>() {
                if x.is_finite() {
                    return Cell::Decimal(x);
                }
            }
        }
        Cell::Text(trimmed.to_string())
    }

    /// Convert a JSON scalar. Objects and arrays are kept as their JSON text.
    pub fn from_json(value: &Value) -> Cell {
        match value {
            Value::Null => Cell::NotAvailable,
            Value::Bool(b) => Cell::Text(b.to_string()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Integer(i),
                None => n.as_f64().map_or(Cell::NotAvailable, Cell::Decimal),
            },
            Value::String(s) => Cell::parse(s),
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(n) => Some(*n as f64),
            Cell::Decimal(x) => Some(*x),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Cell::NotAvailable)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(n) => write!(f, "{}", n),
            Cell::Decimal(x) => write!(f, "{}", x),
            Cell::Text(s) => f.write_str(s),
            Cell::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Integer(n) => serializer.serialize_i64(*n),
            Cell::Decimal(x) if x.is_finite() => serializer.serialize_f64(*x),
            Cell::Decimal(x) => serializer.serialize_str(&x.to_string()),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// The fixed export/display schema for one ranked record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedResult {
    pub rank: usize,
    pub id: Cell,
    pub title: Cell,
    pub authors: Cell,
    pub publisher: Cell,
    pub year: Cell,
    pub language: Cell,
    pub size: Cell,
    pub extension: Cell,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get_download: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mirrors: Vec<Mirror>,
    pub score: f64,
}
