// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Catalog search with relevance ranking, normalization and export.
//!
//! A free-text query goes to a bibliographic catalog; the candidates that
//! come back are scored by token overlap with the query plus a bonus when the
//! whole query appears in the title, then truncated, normalized into a fixed
//! display schema, and rendered or exported.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌─────────────┐    ┌────────────┐    ┌─────────────┐
//! │  catalog   │───▶│   scoring   │───▶│ normalize  │───▶│ report /    │
//! │ (RawRecord)│    │(ScoredRecord│    │(Normalized │    │ export      │
//! │            │    │  rank, cut) │    │  Result)   │    │             │
//! └────────────┘    └─────────────┘    └────────────┘    └─────────────┘
//!        ▲                 │                                    │
//!        │          ┌──────┴──────┐                      ┌──────┴──────┐
//!    pipeline       │  tokenizer  │                      │   dataset   │
//!                   └─────────────┘                      │  analysis   │
//!                                                        └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use bookrank::catalog::StaticCatalog;
//! use bookrank::pipeline::{run_search, SearchRequest};
//! use bookrank::scoring::RankerConfig;
//! use bookrank::types::{Field, Query, RawRecord};
//!
//! let catalog = StaticCatalog::new(vec![
//!     RawRecord::new().with(Field::Id, "1").with(Field::Title, "Systems Programming"),
//!     RawRecord::new().with(Field::Id, "2").with(Field::Title, "Designing Distributed Systems"),
//! ]);
//! let request = SearchRequest::new(Query::new("distributed systems"), 10);
//! let outcome = run_search(&catalog, &request, &RankerConfig::default(), 25).unwrap();
//!
//! assert_eq!(outcome.results[0].id.to_string(), "2");
//! assert_eq!(outcome.results[0].score, 1.5);
//! ```

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod tokenizer;
pub mod types;
pub mod utils;

#[doc(hidden)]
pub mod testing;

pub use catalog::{Catalog, CatalogRequest, HttpCatalog, StaticCatalog};
pub use config::Config;
pub use error::{BookrankError, BookrankResult};
pub use export::{ExportFormat, Exporter};
pub use pipeline::{run_search, SearchOutcome, SearchRequest};
pub use scoring::{rank, RankerConfig};
pub use types::{Cell, Field, NormalizedResult, Query, RawRecord, ScoredRecord};
