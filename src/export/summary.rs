// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Search summaries: top results, keywords and rating explanations.

use std::fmt::Write as _;

use chrono::Local;
use serde::Serialize;

use super::tabular::escape_html;
use crate::analysis::{explain, extract_keywords, FieldKeywords, RatingExplanation, DEFAULT_TOP_KEYWORDS};
use crate::dataset::Dataset;
use crate::pipeline::SearchOutcome;
use crate::tokenizer::TokenizerConfig;
use crate::types::NormalizedResult;

/// Results listed in a summary.
pub const SUMMARY_TOP_RESULTS: usize = 10;

const SUMMARY_FIELDS: [&str; 2] = ["title", "authors"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSummary {
    pub query: String,
    pub generated_at: String,
    /// Candidates the catalog returned.
    pub total_candidates: usize,
    pub results: Vec<NormalizedResult>,
    pub keywords: Vec<FieldKeywords>,
    pub ratings: Vec<RatingExplanation>,
}

impl SearchSummary {
    pub fn from_outcome(outcome: &SearchOutcome, tokenizer: &TokenizerConfig) -> Self {
        let fields: Vec<String> = SUMMARY_FIELDS.iter().map(|f| f.to_string()).collect();
        let dataset = Dataset::from_results(&outcome.results);
        let top = SUMMARY_TOP_RESULTS.min(outcome.scored.len());
        Self {
            query: outcome.query.text.trim().to_string(),
            generated_at: Local::now().to_rfc3339(),
            total_candidates: outcome.candidates,
            results: outcome.results.iter().take(SUMMARY_TOP_RESULTS).cloned().collect(),
            keywords: extract_keywords(&dataset, &fields, DEFAULT_TOP_KEYWORDS, tokenizer),
            ratings: explain(&outcome.scored[..top]),
        }
    }
}

pub fn render_summary_txt(summary: &SearchSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SEARCH SUMMARY");
    let _ = writeln!(out, "==============\n");
    let _ = writeln!(out, "Search Query: {}", summary.query);
    let _ = writeln!(out, "Generated: {}", summary.generated_at);
    let _ = writeln!(out, "Candidates Found: {}", summary.total_candidates);
    let _ = writeln!(out, "Results Kept: {}\n", summary.results.len());

    let _ = writeln!(out, "TOP RESULTS");
    let _ = writeln!(out, "-----------\n");
    for result in &summary.results {
        let _ = writeln!(
            out,
            "{}. {} by {} ({})",
            result.rank, result.title, result.authors, result.year
        );
        let _ = writeln!(out, "   Format: {}, Size: {}\n", result.extension, result.size);
    }

    if summary.keywords.iter().any(|k| !k.keywords.is_empty()) {
        let _ = writeln!(out, "EXTRACTED KEYWORDS");
        let _ = writeln!(out, "------------------\n");
        for field in &summary.keywords {
            let _ = writeln!(out, "From {}:", field.field);
            for keyword in &field.keywords {
                let _ = writeln!(out, "  - {}: {}", keyword.term, keyword.count);
            }
            out.push('\n');
        }
    }

    if !summary.ratings.is_empty() {
        let _ = writeln!(out, "RATING EXPLANATIONS");
        let _ = writeln!(out, "-------------------\n");
        for rating in &summary.ratings {
            let _ = writeln!(out, "{}. {} by {}", rating.rank, rating.title, rating.authors);
            let _ = writeln!(out, "   Score: {:.2}", rating.score);
            let _ = writeln!(out, "   - {}\n", rating.explanation);
        }
    }
    out
}

pub fn render_summary_html(summary: &SearchSummary) -> String {
    let e = escape_html;
    let mut out = String::from(concat!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n",
        "<title>Search Summary</title>\n<style>\n",
        "  body { font-family: sans-serif; margin: 40px; line-height: 1.6; }\n",
        "  .result { margin-bottom: 20px; border-bottom: 1px solid #eee; padding-bottom: 15px; }\n",
        "  .meta { color: #7f8c8d; font-size: 0.9em; }\n",
        "  .keyword { display: inline-block; background: #f1f1f1; padding: 5px 10px; margin: 5px; }\n",
        "</style>\n</head>\n<body>\n",
    ));
    let _ = writeln!(out, "<h1>Search Summary</h1>");
    let _ = writeln!(out, "<p><strong>Search Query:</strong> {}</p>", e(&summary.query));
    let _ = writeln!(out, "<p><strong>Candidates Found:</strong> {}</p>", summary.total_candidates);
    let _ = writeln!(out, "<h2>Top Results</h2>");
    for result in &summary.results {
        let _ = writeln!(out, "<div class=\"result\">");
        let _ = writeln!(out, "  <h3>{}. {}</h3>", result.rank, e(&result.title.to_string()));
        let _ = writeln!(
            out,
            "  <p class=\"meta\">Author: {} | Year: {} | Format: {} | Size: {}</p>",
            e(&result.authors.to_string()),
            e(&result.year.to_string()),
            e(&result.extension.to_string()),
            e(&result.size.to_string())
        );
        if let Some(get) = &result.get_download {
            let _ = writeln!(out, "  <p><a href=\"{}\">GET</a></p>", e(get));
        }
        let _ = writeln!(out, "</div>");
    }

    if summary.keywords.iter().any(|k| !k.keywords.is_empty()) {
        let _ = writeln!(out, "<h2>Extracted Keywords</h2>");
        for field in &summary.keywords {
            let _ = writeln!(out, "<h3>From {}:</h3>\n<div>", e(&field.field));
            for keyword in &field.keywords {
                let _ = writeln!(out, "  <span class=\"keyword\">{} ({})</span>", e(&keyword.term), keyword.count);
            }
            let _ = writeln!(out, "</div>");
        }
    }

    if !summary.ratings.is_empty() {
        let _ = writeln!(out, "<h2>Rating Explanations</h2>");
        for rating in &summary.ratings {
            let _ = writeln!(out, "<div class=\"result\">");
            let _ = writeln!(
                out,
                "  <h3>{}. {} by {}</h3>",
                rating.rank,
                e(&rating.title),
                e(&rating.authors)
            );
            let _ = writeln!(out, "  <p>Score: {:.2}</p>", rating.score);
            let _ = writeln!(out, "  <p>{}</p>", e(&rating.explanation));
            let _ = writeln!(out, "</div>");
        }
    }
    out.push_str("</body>\n</html>\n");
    out
}
