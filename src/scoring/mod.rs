// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scoring and ranking: how candidate records get their numbers.
//!
//! A score is token overlap with the query (at most 1.0) plus a fixed bonus
//! when the whole query appears verbatim in the title. The bonus is large
//! enough that a title substring match beats any pure overlap match, even a
//! full one. Ranking is a stable descending sort on that score.

mod core;
pub mod ranking;

pub use self::core::*;
pub use ranking::{compare_scored, rank, rank_prepared};
