// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Utility functions for string and number processing.

#[cfg(feature = "unicode-normalization")]
use unicode_normalization::UnicodeNormalization;

/// Strip diacritics: "café" → "cafe", "naïve" → "naive".
///
/// NFD-decomposes, then drops nonspacing combining marks. Without the
/// `unicode-normalization` feature the input is returned unchanged.
#[cfg(feature = "unicode-normalization")]
pub fn fold_diacritics(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

#[cfg(not(feature = "unicode-normalization"))]
pub fn fold_diacritics(value: &str) -> String {
    value.to_string()
}

/// Check if a character is a combining mark (diacritic).
#[cfg(feature = "unicode-normalization")]
fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |  // Combining Diacritical Marks
        '\u{1AB0}'..='\u{1AFF}' |  // Combining Diacritical Marks Extended
        '\u{1DC0}'..='\u{1DFF}' |  // Combining Diacritical Marks Supplement
        '\u{20D0}'..='\u{20FF}' |  // Combining Diacritical Marks for Symbols
        '\u{FE20}'..='\u{FE2F}'    // Combining Half Marks
    )
}

/// Trim and collapse internal runs of whitespace to a single space.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Format a number without a trailing `.0` when it is whole.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// True when `value` is a plain decimal number: optional `-`, digits, at most
/// one `.`, and no leading zero on multi-digit integer parts (so identifiers
/// like ISBN `0134685997` stay text).
pub fn looks_numeric(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if int_part.len() > 1 && int_part.starts_with('0') {
        return false;
    }
    match frac_part {
        Some(f) => !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()),
        None => true,
    }
}

/// Format a byte count with the largest of B/KB/MB whose magnitude is ≥ 1.
pub fn format_size(bytes: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    if bytes >= MB {
        format!("{:.2} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes / KB)
    } else {
        format!("{:.2} B", bytes)
    }
}

/// Make a string safe to use as a file name stem.
///
/// Replaces path and shell-hostile characters and whitespace with `_`,
/// and caps the result at 50 characters.
pub fn sanitize_filename(value: &str) -> String {
    const INVALID: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| {
            if INVALID.contains(&c) || c.is_whitespace() || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .take(50)
        .collect();
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "unicode-normalization")]
    fn test_fold_diacritics() {
        assert_eq!(fold_diacritics("café"), "cafe");
        assert_eq!(fold_diacritics("naïve"), "naive");
        assert_eq!(fold_diacritics("plain"), "plain");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  The   Rust\tBook \n"), "The Rust Book");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2019.0), "2019");
        assert_eq!(format_number(1.5), "1.5");
    }

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("2048"));
        assert!(looks_numeric("0"));
        assert!(looks_numeric("-3.25"));
        assert!(looks_numeric("0.5"));
        assert!(!looks_numeric("0134685997"));
        assert!(!looks_numeric("1e5"));
        assert!(!looks_numeric("12 Mb"));
        assert!(!looks_numeric("1."));
        assert!(!looks_numeric(""));
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(2048.0), "2.00 KB");
        assert_eq!(format_size(512.0), "512.00 B");
        assert_eq!(format_size(5.5 * 1024.0 * 1024.0), "5.50 MB");
        assert_eq!(format_size(0.0), "0.00 B");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("rust: the book?"), "rust__the_book_");
        assert_eq!(sanitize_filename("   "), "untitled");
        assert_eq!(sanitize_filename(&"x".repeat(80)).len(), 50);
    }
}
