// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error types, one per concern, with diagnostic codes and help text.
//!
//! Propagation policy: validation errors fail before any I/O; a catalog
//! response that cannot be parsed degrades to zero results; only transport
//! failures abort a search. Export failures are reported without discarding
//! the ranked results.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error for the crate.
#[derive(Debug, Error, Diagnostic)]
pub enum BookrankError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

pub type BookrankResult<T> = std::result::Result<T, BookrankError>;

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ValidationError {
    #[error("search query is empty")]
    #[diagnostic(
        code(bookrank::input::empty_query),
        help("Pass at least one non-whitespace character, e.g. `bookrank search \"rust\"`.")
    )]
    EmptyQuery,

    #[error("row limit must be positive, got {limit}")]
    #[diagnostic(
        code(bookrank::input::limit),
        help("Row limits such as `--limit` and `--top-n` take a value of 1 or more.")
    )]
    NonPositiveLimit { limit: i64 },

    #[error("record identifier is empty")]
    #[diagnostic(
        code(bookrank::input::empty_identifier),
        help("Pass a catalog id or md5, e.g. `bookrank details 1234567`.")
    )]
    EmptyIdentifier,

    #[error("malformed filter criteria: {message}")]
    #[diagnostic(
        code(bookrank::input::filter),
        help(
            "Filters are a JSON object mapping column names to a value, a list of \
             values, or a range: {{\"extension\": \"pdf\", \"year\": {{\"min\": 2010}}}}"
        )
    )]
    MalformedFilter { message: String },
}

/// A field-restriction or keyword field that is not recognised.
///
/// Never fatal: callers log it and carry on with the fields they know.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
#[error("unknown field name `{name}`")]
#[diagnostic(
    code(bookrank::input::unknown_field),
    severity(Warning),
    help("Known searchable fields: title, author, publisher, year, language.")
)]
pub struct UnknownFieldName {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("catalog unavailable at {target}: {message}")]
    #[diagnostic(
        code(bookrank::catalog::unavailable),
        help(
            "Check your network connection, or point `--mirror` (or `catalog.mirror` \
             in the config file) at a reachable mirror."
        )
    )]
    ServiceUnavailable { target: String, message: String },

    #[error("catalog response could not be parsed: {message}")]
    #[diagnostic(code(bookrank::catalog::malformed))]
    MalformedResponse { message: String },
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("failed to write {path}")]
    #[diagnostic(
        code(bookrank::export::io),
        help("Check that the output directory exists and is writable.")
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {format} export: {message}")]
    #[diagnostic(code(bookrank::export::encode))]
    Encode {
        format: &'static str,
        message: String,
    },

    #[error("export format `none` does not produce a file")]
    #[diagnostic(code(bookrank::export::none))]
    NoFormat,
}

// ---------------------------------------------------------------------------
// Datasets (filter / analyze inputs)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DatasetError {
    #[error("failed to read {path}")]
    #[diagnostic(code(bookrank::dataset::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    #[diagnostic(
        code(bookrank::dataset::parse),
        help("Pass `--format` if the file extension does not match its contents.")
    )]
    Parse { path: PathBuf, message: String },

    #[error("unsupported input format `{format}`")]
    #[diagnostic(
        code(bookrank::dataset::format),
        help("Inputs can be csv, json, xlsx, or a txt report.")
    )]
    UnsupportedFormat { format: String },
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    #[diagnostic(code(bookrank::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    #[diagnostic(
        code(bookrank::config::parse),
        help("Valid sections are [catalog], [ranking] and [export]; every key is optional.")
    )]
    Parse { path: PathBuf, message: String },

    #[error("invalid value for `{key}` in {path}: {message}")]
    #[diagnostic(code(bookrank::config::value))]
    Invalid {
        path: PathBuf,
        key: &'static str,
        message: String,
    },
}
