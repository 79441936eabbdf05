// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal display utilities for the bookrank CLI.
//!
//! OneDark for dark terminals, One Light for light ones. The detection tries
//! `BOOKRANK_THEME` first, then `COLORFGBG`, then macOS system appearance,
//! then defaults to dark. Respects `NO_COLOR` and non-TTY stdout, in which
//! case every renderer here falls back to the plain text the library writes.
//!
//! # Theme detection order
//!
//! 1. `BOOKRANK_THEME` env var ("dark" or "light")
//! 2. `COLORFGBG` env var (terminal background hint)
//! 3. macOS appearance (via defaults read)
//! 4. Default to dark theme

use std::fmt::Write as _;
use std::sync::OnceLock;

use bookrank::analysis::{Analysis, ColumnStats};
use bookrank::dataset::Dataset;
use bookrank::report::{render_block, render_report, ReportField};
use bookrank::types::NormalizedResult;

// Width between │ and │ (excluding border chars)
pub const BOX_WIDTH: usize = 80;

/// Widest a table column gets before values are cut.
const MAX_COLUMN_WIDTH: usize = 32;

const LABEL_WIDTH: usize = 15;

// ═══════════════════════════════════════════════════════════════════════════
// THEME DETECTION
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

static THEME: OnceLock<Theme> = OnceLock::new();

fn detect_theme() -> Theme {
    if let Ok(theme) = std::env::var("BOOKRANK_THEME") {
        match theme.to_lowercase().as_str() {
            "light" | "l" => return Theme::Light,
            "dark" | "d" => return Theme::Dark,
            _ => {}
        }
    }

    // "fg;bg": colors 0-6 and 8 are dark backgrounds
    if let Ok(colorfgbg) = std::env::var("COLORFGBG") {
        if let Some(bg) = colorfgbg.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                if bg_num >= 7 && bg_num != 8 {
                    return Theme::Light;
                }
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Ok(output) = std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
        {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if !stdout.contains("Dark") && output.status.success() {
                return Theme::Light;
            }
        }
    }

    Theme::Dark
}

/// Get the current theme (cached)
pub fn theme() -> Theme {
    *THEME.get_or_init(detect_theme)
}

// ═══════════════════════════════════════════════════════════════════════════
// ONEDARK / ONE LIGHT COLOR PALETTES (True Color)
// ═══════════════════════════════════════════════════════════════════════════

fn rgb(r: u8, g: u8, b: u8) -> String {
    format!("\x1b[38;2;{};{};{}m", r, g, b)
}

pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
}

pub use colors::*;

mod onedark {
    pub const GREEN: (u8, u8, u8) = (152, 195, 121); // #98c379
    pub const YELLOW: (u8, u8, u8) = (229, 192, 123); // #e5c07b
    pub const BLUE: (u8, u8, u8) = (97, 175, 239); // #61afef
    pub const MAGENTA: (u8, u8, u8) = (198, 120, 221); // #c678dd
    pub const CYAN: (u8, u8, u8) = (86, 182, 194); // #56b6c2
    pub const WHITE: (u8, u8, u8) = (171, 178, 191); // #abb2bf
    pub const GRAY: (u8, u8, u8) = (92, 99, 112); // #5c6370
    pub const BRIGHT_GREEN: (u8, u8, u8) = (166, 226, 46);
}

mod onelight {
    pub const GREEN: (u8, u8, u8) = (80, 161, 79); // #50a14f
    pub const YELLOW: (u8, u8, u8) = (193, 132, 1); // #c18401
    pub const BLUE: (u8, u8, u8) = (64, 120, 242); // #4078f2
    pub const MAGENTA: (u8, u8, u8) = (166, 38, 164); // #a626a4
    pub const CYAN: (u8, u8, u8) = (1, 132, 188); // #0184bc
    pub const WHITE: (u8, u8, u8) = (56, 58, 66); // #383a42
    pub const GRAY: (u8, u8, u8) = (160, 161, 167); // #a0a1a7
    pub const BRIGHT_GREEN: (u8, u8, u8) = (68, 140, 39);
}

macro_rules! theme_color {
    ($name:ident) => {
        #[allow(non_snake_case)]
        pub fn $name() -> String {
            let (r, g, b) = match theme() {
                Theme::Dark => onedark::$name,
                Theme::Light => onelight::$name,
            };
            rgb(r, g, b)
        }
    };
}

theme_color!(GREEN);
theme_color!(YELLOW);
theme_color!(BLUE);
theme_color!(MAGENTA);
theme_color!(CYAN);
theme_color!(WHITE);
theme_color!(GRAY);
theme_color!(BRIGHT_GREEN);

// ═══════════════════════════════════════════════════════════════════════════
// CORE UTILITIES
// ═══════════════════════════════════════════════════════════════════════════

/// Check if colors should be used (TTY detection)
pub fn use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    atty::is(atty::Stream::Stdout)
}

/// Apply theme color with optional modifiers
pub fn themed(color_fn: fn() -> String, modifiers: &[&str], text: &str) -> String {
    if use_colors() {
        format!("{}{}{}{}", modifiers.join(""), color_fn(), text, RESET)
    } else {
        text.to_string()
    }
}

/// Calculate visible length (excluding ANSI codes)
pub fn visible_len(s: &str) -> usize {
    let mut in_escape = false;
    let mut len = 0;
    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape && c == 'm' {
            in_escape = false;
        } else if !in_escape {
            len += 1;
        }
    }
    len
}

/// Right-pad a styled string to a fixed visible width
pub fn pad_right(s: &str, width: usize) -> String {
    let visible = visible_len(s);
    if visible >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visible))
    }
}

/// Cut plain text to `max` characters, marking the cut with `…`.
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

// ═══════════════════════════════════════════════════════════════════════════
// BOX DRAWING
// ═══════════════════════════════════════════════════════════════════════════

fn border() -> (String, &'static str) {
    if use_colors() {
        (GRAY(), RESET)
    } else {
        (String::new(), "")
    }
}

/// Print a content line: │ content          │
pub fn row(content: &str) {
    let (border, reset) = border();
    let content = truncate_styled(content, BOX_WIDTH);
    let pad = BOX_WIDTH.saturating_sub(visible_len(&content));
    println!(
        "{}│{}{}{}{}│{}",
        border,
        reset,
        content,
        " ".repeat(pad),
        border,
        reset
    );
}

// Only plain rows are cut; cutting through an escape sequence breaks the line.
fn truncate_styled(content: &str, width: usize) -> String {
    if visible_len(content) <= width || content.contains('\x1b') {
        content.to_string()
    } else {
        truncate_text(content, width)
    }
}

/// Print section header: ┌─ LABEL ──────────┐
pub fn section_top(label: &str) {
    let (border, reset) = border();
    let colored_label = themed(CYAN, &[BOLD], label);
    let label_part = format!("─ {} ", colored_label);
    let remaining = BOX_WIDTH.saturating_sub(visible_len(&label_part));
    println!(
        "{}┌{}{}{}{}┐{}",
        border,
        reset,
        label_part,
        border,
        "─".repeat(remaining),
        reset
    );
}

/// Print section footer: └──────────────────┘
pub fn section_bot() {
    let (border, reset) = border();
    println!("{}└{}┘{}", border, "─".repeat(BOX_WIDTH), reset);
}

// ═══════════════════════════════════════════════════════════════════════════
// SEMANTIC FORMATTERS
// ═══════════════════════════════════════════════════════════════════════════

/// Color-coded relevance score. Above 1.0 means the title bonus fired.
pub fn score_value(score: f64) -> String {
    let text = format!("{:.2}", score);
    if !use_colors() {
        return text;
    }
    let color = if score > 1.0 {
        BRIGHT_GREEN()
    } else if score >= 0.5 {
        GREEN()
    } else if score > 0.0 {
        YELLOW()
    } else {
        GRAY()
    };
    format!("{}{}{}", color, text, RESET)
}

/// The result report, colored when the terminal allows it.
///
/// Without colors this is exactly the plain-text report, so piping stdout
/// into a file gives something `filter --format txt` can read back.
pub fn render_results(results: &[NormalizedResult]) -> String {
    if !use_colors() {
        return render_report(results);
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        themed(WHITE, &[BOLD], &format!("Top {} Results:", results.len()))
    );
    for result in results {
        out.push('\n');
        colored_block(&mut out, result);
    }
    out
}

/// One record block without the report header.
pub fn render_record(result: &NormalizedResult) -> String {
    let mut out = String::new();
    if use_colors() {
        colored_block(&mut out, result);
    } else {
        render_block(&mut out, result);
    }
    out
}

fn colored_block(out: &mut String, result: &NormalizedResult) {
    let _ = writeln!(
        out,
        "{} {}  {}",
        themed(CYAN, &[BOLD], &format!("{}.", result.rank)),
        themed(WHITE, &[BOLD], &format!("ID {}", result.id)),
        score_value(result.score)
    );
    for field in ReportField::ALL {
        let value = match field {
            ReportField::Title => themed(WHITE, &[BOLD], &result.title.to_string()),
            ReportField::Authors => themed(MAGENTA, &[], &result.authors.to_string()),
            ReportField::Publisher => result.publisher.to_string(),
            ReportField::Year => themed(YELLOW, &[], &result.year.to_string()),
            ReportField::Language => result.language.to_string(),
            ReportField::Size => result.size.to_string(),
            ReportField::Extension => themed(GREEN, &[], &result.extension.to_string()),
            ReportField::Url => match &result.url {
                Some(url) => themed(BLUE, &[], url),
                None => continue,
            },
            ReportField::GetDownload => match &result.get_download {
                Some(url) => themed(BLUE, &[], url),
                None => continue,
            },
        };
        let label = pad_right(&themed(GRAY, &[], field.label()), LABEL_WIDTH);
        let _ = writeln!(out, "    {}{}", label, value);
    }
}

/// A dataset as an aligned table, values cut to a readable width.
pub fn render_table(dataset: &Dataset) -> String {
    let cells: Vec<Vec<String>> = dataset
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| truncate_text(&cell.to_string(), MAX_COLUMN_WIDTH))
                .collect()
        })
        .collect();
    let widths: Vec<usize> = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|v| v.chars().count())
                .chain(std::iter::once(truncate_text(name, MAX_COLUMN_WIDTH).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = dataset
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, w)| pad_right(&themed(CYAN, &[BOLD], &truncate_text(name, MAX_COLUMN_WIDTH)), *w))
        .collect();
    let _ = writeln!(out, "{}", header.join("  ").trim_end());
    for row in &cells {
        let line: Vec<String> = row.iter().zip(&widths).map(|(v, w)| pad_right(v, *w)).collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    let _ = writeln!(
        out,
        "{}",
        themed(GRAY, &[DIM], &format!("({} rows)", dataset.len()))
    );
    out
}

/// Print an analysis as boxed sections.
pub fn print_analysis(analysis: &Analysis) {
    let summary = &analysis.summary;
    section_top("DATASET");
    if let Some(source) = &analysis.source {
        row(&format!("  source   {}", source));
    }
    row(&format!(
        "  {} rows, {} columns",
        themed(WHITE, &[BOLD], &summary.row_count.to_string()),
        themed(WHITE, &[BOLD], &summary.column_count.to_string())
    ));
    section_bot();

    section_top("KEYWORDS");
    for field in &analysis.keywords {
        row(&format!("  {}", themed(MAGENTA, &[BOLD], &field.field)));
        if field.keywords.is_empty() {
            row(&themed(GRAY, &[DIM], "    (none)"));
        }
        for keyword in &field.keywords {
            row(&format!(
                "    {} {}",
                pad_right(&keyword.term, 24),
                themed(YELLOW, &[], &keyword.count.to_string())
            ));
        }
    }
    section_bot();

    section_top("COLUMNS");
    for column in &summary.columns {
        let name = pad_right(&themed(WHITE, &[BOLD], &truncate_text(&column.name, 18)), 20);
        let missing = themed(GRAY, &[], &format!("missing {}", column.missing));
        let detail = match &column.stats {
            ColumnStats::Numeric {
                min,
                max,
                mean,
                median,
                std,
            } => {
                let std = std.map_or_else(|| "-".to_string(), |s| format!("{:.2}", s));
                format!(
                    "min {:.2}  max {:.2}  mean {:.2}  median {:.2}  std {}",
                    min, max, mean, median, std
                )
            }
            ColumnStats::Categorical {
                unique_values,
                top_values,
            } => {
                let top = top_values
                    .first()
                    .map(|v| format!("  top {} ({})", truncate_text(&v.value, 20), v.count))
                    .unwrap_or_default();
                format!("{} unique{}", unique_values, top)
            }
            ColumnStats::Empty => "no values".to_string(),
        };
        row(&format!("  {}{}", name, missing));
        row(&format!("    {}", detail));
    }
    section_bot();
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
