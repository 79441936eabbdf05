// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! bookrank CLI: search, filter, analyze, details.
//!
//! Results go to stdout; logs and diagnostics go to stderr. An export that
//! fails is reported but never hides the results it was meant to save.

mod cli;

use std::path::{Path, PathBuf};

use bookrank::analysis::{Analysis, FilterCriteria};
use bookrank::catalog::HttpCatalog;
use bookrank::config::Config;
use bookrank::dataset::Dataset;
use bookrank::error::ExportError;
use bookrank::export::{default_name, ExportFormat, Exporter, SearchSummary};
use bookrank::pipeline::{
    lookup_details, positive_limit, run_search, run_search_from_file, SearchOutcome, SearchRequest,
};
use bookrank::types::Query;
use clap::Parser;
use cli::display;
use cli::{AnalyzeArgs, Cli, Commands, DetailsArgs, ExportArgs, FilterArgs, SearchArgs};
use miette::{miette, IntoDiagnostic, Result};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Search(args) => run_search_command(&config, args),
        Commands::Filter(args) => run_filter(&config, args),
        Commands::Analyze(args) => run_analyze(&config, args),
        Commands::Details(args) => run_details(&config, args),
    }
}

/// `-v`/`-q` win over `RUST_LOG`; without either, `RUST_LOG` or `info`.
fn init_tracing(verbose: bool, quiet: bool) {
    let filter = match (verbose, quiet) {
        (true, _) => EnvFilter::new("debug"),
        (_, true) => EnvFilter::new("warn"),
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exporter(config: &Config, output: Option<PathBuf>, summary_dir: Option<PathBuf>) -> Exporter {
    Exporter::new(
        output.unwrap_or_else(|| config.export.output_dir.clone()),
        summary_dir.unwrap_or_else(|| config.export.summary_dir.clone()),
    )
}

/// Print an export failure as a diagnostic and keep going.
fn report_export(result: std::result::Result<PathBuf, ExportError>, what: &str) {
    match result {
        Ok(path) => eprintln!("{} saved to {}", what, path.display()),
        Err(err) => eprintln!("{:?}", miette::Report::new(err)),
    }
}

fn input_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string())
}

// ═══════════════════════════════════════════════════════════════════════════
// SEARCH
// ═══════════════════════════════════════════════════════════════════════════

fn run_search_command(config: &Config, args: SearchArgs) -> Result<()> {
    let limit = positive_limit(args.limit)?;
    let mut query = Query::new(args.query.as_str());
    if !args.fields.is_empty() {
        query = query.with_fields(args.fields.iter().cloned());
    }
    let request = SearchRequest::new(query, limit);
    request.validate()?;

    let fetch_limit = config.catalog.fetch_limit;
    let outcome = match &args.from {
        Some(path) => run_search_from_file(path, &request, &config.ranking, fetch_limit)?,
        None => {
            let mut catalog_config = config.catalog.clone();
            if let Some(mirror) = &args.mirror {
                catalog_config.mirror = Some(mirror.clone());
            }
            let catalog = HttpCatalog::new(catalog_config);
            run_search(&catalog, &request, &config.ranking, fetch_limit)?
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.results).into_diagnostic()?);
    } else {
        print!("{}", display::render_results(&outcome.results));
    }

    write_search_outputs(config, &args, limit, &outcome);
    Ok(())
}

fn write_search_outputs(config: &Config, args: &SearchArgs, limit: usize, outcome: &SearchOutcome) {
    let exporter = exporter(config, args.export.output.clone(), args.summary_dir.clone());
    let query = outcome.query.text.trim();

    if args.export.export != ExportFormat::None {
        let name = args
            .export
            .name
            .clone()
            .unwrap_or_else(|| default_name(&format!("search_{}", query)));
        report_export(
            exporter.export_results(&outcome.results, &name, args.export.export),
            "Results",
        );
    }

    if args.summary {
        let summary = SearchSummary::from_outcome(outcome, &config.ranking.tokenizer);
        report_export(exporter.write_summary(&summary, args.export.export), "Summary");
    }

    if args.log {
        report_export(
            exporter.write_search_log(
                query,
                limit,
                outcome.candidates,
                &outcome.results,
            ),
            "Search log",
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FILTER / ANALYZE
// ═══════════════════════════════════════════════════════════════════════════

fn run_filter(config: &Config, args: FilterArgs) -> Result<()> {
    let limit = args.limit.map(positive_limit).transpose()?;
    let criteria = FilterCriteria::parse(&args.filters)?;
    let dataset = Dataset::load(&args.input, args.format)?;

    let mut filtered = criteria.apply(&dataset);
    if let Some(limit) = limit {
        filtered.truncate(limit);
        debug!(limit, kept = filtered.len(), "truncated");
    }

    print!("{}", display::render_table(&filtered));

    if args.export.export != ExportFormat::None {
        let exporter = exporter(config, args.export.output.clone(), None);
        let name = args
            .export
            .name
            .clone()
            .unwrap_or_else(|| default_name(&format!("filtered_{}", input_stem(&args.input))));
        report_export(
            exporter.export_dataset(&filtered, &name, args.export.export),
            "Filtered data",
        );
    }
    Ok(())
}

fn run_analyze(config: &Config, args: AnalyzeArgs) -> Result<()> {
    let top_n = positive_limit(args.top_n)?;
    let dataset = Dataset::load(&args.input, args.format)?;
    let mut analysis = Analysis::run(&dataset, &args.fields, top_n, &config.ranking.tokenizer);
    analysis.source = Some(args.input.display().to_string());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis).into_diagnostic()?);
    } else {
        display::print_analysis(&analysis);
    }

    export_analysis(config, &args.export, &args.input, &analysis);
    Ok(())
}

fn export_analysis(config: &Config, export: &ExportArgs, input: &Path, analysis: &Analysis) {
    match export.export {
        ExportFormat::None => return,
        ExportFormat::Json => {}
        other => warn!(format = %other, "analysis exports are JSON only, writing json"),
    }
    let exporter = exporter(config, export.output.clone(), None);
    let name = export
        .name
        .clone()
        .unwrap_or_else(|| default_name(&format!("analysis_{}", input_stem(input))));
    report_export(exporter.export_analysis(analysis, &name), "Analysis");
}

// ═══════════════════════════════════════════════════════════════════════════
// DETAILS
// ═══════════════════════════════════════════════════════════════════════════

fn run_details(config: &Config, args: DetailsArgs) -> Result<()> {
    let mut catalog_config = config.catalog.clone();
    if let Some(mirror) = args.mirror {
        catalog_config.mirror = Some(mirror);
    }
    let catalog = HttpCatalog::new(catalog_config);

    let Some(result) = lookup_details(&catalog, &args.id)? else {
        return Err(miette!("no record with identifier `{}`", args.id.trim()));
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result).into_diagnostic()?);
    } else {
        print!("{}", display::render_record(&result));
    }
    Ok(())
}
