// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the bookrank command-line interface.
//!
//! Four subcommands: `search` queries the catalog and ranks what comes back,
//! `filter` and `analyze` work on previously exported result files, and
//! `details` looks up a single record by identifier.

pub mod display;

use std::path::PathBuf;

use bookrank::dataset::DataFormat;
use bookrank::export::ExportFormat;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bookrank",
    about = "Search a book catalog, rank results by relevance, and export them",
    version
)]
pub struct Cli {
    /// Config file (TOML). Falls back to $BOOKRANK_CONFIG, then defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where exported files go, shared by every command that writes one.
#[derive(clap::Args, Debug, Clone)]
pub struct ExportArgs {
    /// Export format
    #[arg(long, value_enum, default_value_t = ExportFormat::None)]
    pub export: ExportFormat,

    /// Output directory (overrides `export.output_dir`)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Output file name; a timestamped name is generated when omitted
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the catalog and print ranked results
    Search(SearchArgs),

    /// Filter a result file by column criteria
    ///
    /// Criteria are a JSON object: a value for equality, a list for
    /// membership, or {"min": .., "max": ..} for an inclusive range.
    Filter(FilterArgs),

    /// Extract keywords and column statistics from a result file
    Analyze(AnalyzeArgs),

    /// Look up one record by catalog identifier
    Details(DetailsArgs),
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Free-text query
    pub query: String,

    /// Maximum number of results to keep
    #[arg(short, long, default_value_t = 25, allow_negative_numbers = true)]
    pub limit: i64,

    /// Restrict matching to these fields (title, author, publisher, year, language)
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub fields: Vec<String>,

    #[command(flatten)]
    pub export: ExportArgs,

    /// Summary and search-log directory (overrides `export.summary_dir`)
    #[arg(long)]
    pub summary_dir: Option<PathBuf>,

    /// Write a search summary (txt, html or json, following --export)
    #[arg(long)]
    pub summary: bool,

    /// Write a timestamped search log
    #[arg(long)]
    pub log: bool,

    /// Print results as JSON instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Rank records from a local JSON file instead of the online catalog
    #[arg(long, value_name = "FILE")]
    pub from: Option<PathBuf>,

    /// Catalog mirror base URL (skips mirror probing)
    #[arg(long)]
    pub mirror: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct FilterArgs {
    /// Input file (csv, json, xlsx, or a txt report)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Input format; inferred from the extension when omitted
    #[arg(long, value_enum)]
    pub format: Option<DataFormat>,

    /// Filter criteria as JSON, e.g. '{"extension": "pdf", "year": {"min": 2015}}'
    #[arg(long)]
    pub filters: String,

    /// Keep at most this many rows
    #[arg(short, long, allow_negative_numbers = true)]
    pub limit: Option<i64>,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Input file (csv, json, xlsx, or a txt report)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Input format; inferred from the extension when omitted
    #[arg(long, value_enum)]
    pub format: Option<DataFormat>,

    /// Columns to extract keywords from
    #[arg(
        long,
        num_args = 1..,
        value_delimiter = ',',
        default_values_t = [String::from("title"), String::from("author")]
    )]
    pub fields: Vec<String>,

    /// Keywords kept per column
    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    pub top_n: i64,

    /// Print the analysis as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(clap::Args, Debug)]
pub struct DetailsArgs {
    /// Catalog identifier or md5
    pub id: String,

    /// Catalog mirror base URL (skips mirror probing)
    #[arg(long)]
    pub mirror: Option<String>,

    /// Print the record as JSON
    #[arg(long)]
    pub json: bool,
}
