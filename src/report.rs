// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Plain-text result report.
//!
//! The report is a presentation view derived from [`NormalizedResult`]s.
//! Consumers that still read it locate each record by its `<n>. ID` line and
//! each field by the label at line start (after leading whitespace), never
//! by column offset. Typed consumers should use the JSON form instead.
//!
//! ```text
//! Top 1 Results:
//!
//! 1. ID 42
//!     Title          Designing Data-Intensive Applications
//!     Author(s)      Martin Kleppmann
//!     ...
//!     URL:           http://libgen.test/book/index.php?md5=...
//! ```

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::NormalizedResult;

const LABEL_WIDTH: usize = 15;
const INDENT: &str = "    ";

/// One field line of a report block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportField {
    Title,
    Authors,
    Publisher,
    Year,
    Language,
    Size,
    Extension,
    Url,
    GetDownload,
}

impl ReportField {
    /// Fields in the order they are rendered.
    pub const ALL: [ReportField; 9] = [
        ReportField::Title,
        ReportField::Authors,
        ReportField::Publisher,
        ReportField::Year,
        ReportField::Language,
        ReportField::Size,
        ReportField::Extension,
        ReportField::Url,
        ReportField::GetDownload,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReportField::Title => "Title",
            ReportField::Authors => "Author(s)",
            ReportField::Publisher => "Publisher",
            ReportField::Year => "Year",
            ReportField::Language => "Language(s)",
            ReportField::Size => "Size",
            ReportField::Extension => "Extension",
            ReportField::Url => "URL:",
            ReportField::GetDownload => "GET Download:",
        }
    }

    /// Column name used when a report is loaded as a dataset.
    pub fn column(self) -> &'static str {
        match self {
            ReportField::Title => "title",
            ReportField::Authors => "authors",
            ReportField::Publisher => "publisher",
            ReportField::Year => "year",
            ReportField::Language => "language",
            ReportField::Size => "size",
            ReportField::Extension => "extension",
            ReportField::Url => "url",
            ReportField::GetDownload => "get_download",
        }
    }

    fn value(self, result: &NormalizedResult) -> Option<String> {
        match self {
            ReportField::Title => Some(result.title.to_string()),
            ReportField::Authors => Some(result.authors.to_string()),
            ReportField::Publisher => Some(result.publisher.to_string()),
            ReportField::Year => Some(result.year.to_string()),
            ReportField::Language => Some(result.language.to_string()),
            ReportField::Size => Some(result.size.to_string()),
            ReportField::Extension => Some(result.extension.to_string()),
            ReportField::Url => result.url.clone(),
            ReportField::GetDownload => result.get_download.clone(),
        }
    }

    /// Match a trimmed line against this field's label.
    fn strip<'a>(self, line: &'a str) -> Option<&'a str> {
        let rest = line.strip_prefix(self.label())?;
        if rest.is_empty() {
            return Some(rest);
        }
        rest.starts_with(char::is_whitespace).then(|| rest.trim())
    }
}

/// One record recovered from a plain-text report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportEntry {
    pub ordinal: usize,
    pub id: String,
    /// Field values in the order they appeared.
    pub fields: Vec<(ReportField, String)>,
}

impl ReportEntry {
    pub fn get(&self, field: ReportField) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value.as_str())
    }
}

/// Render results as the plain-text report.
pub fn render_report(results: &[NormalizedResult]) -> String {
    let mut out = format!("Top {} Results:\n", results.len());
    for result in results {
        out.push('\n');
        render_block(&mut out, result);
    }
    out
}

/// Render a single record block (no trailing blank line).
pub fn render_block(out: &mut String, result: &NormalizedResult) {
    let _ = writeln!(out, "{}. ID {}", result.rank, result.id);
    for field in ReportField::ALL {
        if let Some(value) = field.value(result) {
            let _ = writeln!(out, "{INDENT}{:<LABEL_WIDTH$}{}", field.label(), value);
        }
    }
}

static RECORD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s+ID(?:\s+(.*))?$").unwrap());

/// Parse a plain-text report back into entries.
///
/// Lines before the first record and lines matching no known label are
/// ignored.
pub fn parse_report(text: &str) -> Vec<ReportEntry> {
    let mut entries: Vec<ReportEntry> = Vec::new();
    for raw in text.lines() {
        let line = raw.trim_start();
        if let Some(caps) = RECORD_LINE.captures(line) {
            entries.push(ReportEntry {
                ordinal: caps[1].parse().unwrap_or(entries.len() + 1),
                id: caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
                fields: Vec::new(),
            });
            continue;
        }
        let Some(entry) = entries.last_mut() else {
            continue;
        };
        if let Some((field, value)) = ReportField::ALL
            .into_iter()
            .find_map(|field| field.strip(line).map(|value| (field, value)))
        {
            entry.fields.push((field, value.to_string()));
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_record;
    use crate::testing::{make_full_record, make_record};

    #[test]
    fn test_render_block_layout() {
        let mut result = normalize_record(make_full_record("abc", "Designing Data-Intensive Applications"));
        result.rank = 1;
        let report = render_report(&[result]);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "Top 1 Results:");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "1. ID abc");
        assert_eq!(lines[3], "    Title          Designing Data-Intensive Applications");
        assert_eq!(lines[4], "    Author(s)      Kleppmann, Martin");
        assert_eq!(lines[9], "    Extension      pdf");
        assert_eq!(lines[10], "    URL:           http://libgen.test/book/index.php?md5=abc");
        assert_eq!(lines[11], "    GET Download:  https://library.lol/main/abc");
    }

    #[test]
    fn test_missing_links_omit_lines() {
        let result = normalize_record(make_record("1", "Plain"));
        let report = render_report(&[result]);
        assert!(!report.contains("URL:"));
        assert!(!report.contains("GET Download:"));
        assert!(report.contains("    Publisher      N/A"));
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(render_report(&[]), "Top 0 Results:\n");
        assert!(parse_report("Top 0 Results:\n").is_empty());
    }

    #[test]
    fn test_blank_line_between_blocks() {
        let mut a = normalize_record(make_record("1", "A"));
        let mut b = normalize_record(make_record("2", "B"));
        a.rank = 1;
        b.rank = 2;
        let report = render_report(&[a, b]);
        assert!(report.contains("N/A\n\n2. ID 2\n"));
    }

    #[test]
    fn test_parse_matches_labels_not_offsets() {
        let text = "1. ID 7\n  Title   Odd Spacing\n\tAuthor(s) Someone\nGarbage line\n  Year 2001\n";
        let entries = parse_report(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ordinal, 1);
        assert_eq!(entries[0].id, "7");
        assert_eq!(entries[0].get(ReportField::Title), Some("Odd Spacing"));
        assert_eq!(entries[0].get(ReportField::Authors), Some("Someone"));
        assert_eq!(entries[0].get(ReportField::Year), Some("2001"));
        assert_eq!(entries[0].get(ReportField::Url), None);
    }

    #[test]
    fn test_round_trip_recovers_present_fields() {
        let mut result = normalize_record(make_full_record("f00d", "Rust for Rustaceans"));
        result.rank = 3;
        let entries = parse_report(&render_report(std::slice::from_ref(&result)));
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.ordinal, 3);
        assert_eq!(entry.id, result.id.to_string());
        for field in ReportField::ALL {
            assert_eq!(entry.get(field).map(str::to_string), field.value(&result));
        }
    }
}
