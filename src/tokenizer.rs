// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Tokenization shared by scoring and keyword analysis.
//!
//! The query side and the candidate side must tokenize identically, or token
//! overlap stops meaning anything. Both go through [`tokenize`] with the same
//! [`TokenizerConfig`]; there is no module-level state.

use std::collections::HashSet;

use serde::Deserialize;

use crate::utils::fold_diacritics;

/// Articles, conjunctions, common prepositions and copulas.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "with", "by", "of",
    "from", "as", "is", "are", "was", "were", "be", "this", "that", "these", "those", "it",
];

/// Tokens shorter than this many characters are dropped.
pub const DEFAULT_MIN_TOKEN_LEN: usize = 2;

/// Tokenizer settings, passed explicitly to every call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub min_token_len: usize,
    pub stop_words: HashSet<String>,
    /// Fold "café" and "cafe" to the same token.
    pub fold_diacritics: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            fold_diacritics: false,
        }
    }
}

impl TokenizerConfig {
    /// Lowercase (and optionally fold) text the way tokens are compared.
    pub fn fold(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        if self.fold_diacritics {
            fold_diacritics(&lowered)
        } else {
            lowered
        }
    }

    fn keep(&self, token: &str) -> bool {
        token.chars().count() >= self.min_token_len && !self.stop_words.contains(token)
    }
}

/// Split text into tokens.
///
/// Lowercases, splits on non-alphanumeric boundaries, drops short tokens and
/// stop words. Order is preserved and duplicates are kept.
///
/// # Example
///
/// ```
/// use bookrank::tokenizer::{tokenize, TokenizerConfig};
///
/// let tokens = tokenize("The Rust Programming Language", &TokenizerConfig::default());
/// assert_eq!(tokens, vec!["rust", "programming", "language"]);
/// ```
pub fn tokenize(text: &str, config: &TokenizerConfig) -> Vec<String> {
    config
        .fold(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| config.keep(token))
        .map(String::from)
        .collect()
}

/// Tokenize and deduplicate, keeping first-seen order.
pub fn tokenize_unique(text: &str, config: &TokenizerConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text, config)
        .into_iter()
        .filter(|token| seen.insert(token.clone()))
        .collect()
}
