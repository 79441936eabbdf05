// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Writing results, datasets, analyses, summaries and search logs to disk.
//!
//! Two directories: `output_dir` for exports and `summary_dir` for summary
//! reports and search logs. Both are created on first write. One file per
//! call; names are caller-chosen or `<YYYYmmdd_HHMMSS>_<stem>`.

mod summary;
mod tabular;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use summary::{render_summary_html, render_summary_txt, SearchSummary, SUMMARY_TOP_RESULTS};
pub use tabular::{encode_csv, encode_html, encode_tsv, encode_xlsx, escape_html};

use crate::analysis::Analysis;
use crate::dataset::Dataset;
use crate::error::ExportError;
use crate::report::render_report;
use crate::types::NormalizedResult;
use crate::utils::sanitize_filename;

/// Timestamp prefix for generated file names.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Html,
    #[value(alias = "excel")]
    Xlsx,
    Txt,
    #[default]
    None,
}

impl ExportFormat {
    /// File extension, or `None` for [`ExportFormat::None`].
    pub fn extension(self) -> Option<&'static str> {
        match self {
            ExportFormat::Json => Some("json"),
            ExportFormat::Csv => Some("csv"),
            ExportFormat::Html => Some("html"),
            ExportFormat::Xlsx => Some("xlsx"),
            ExportFormat::Txt => Some("txt"),
            ExportFormat::None => None,
        }
    }

    fn name(self) -> &'static str {
        self.extension().unwrap_or("none")
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "html" => Ok(ExportFormat::Html),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "txt" => Ok(ExportFormat::Txt),
            "none" => Ok(ExportFormat::None),
            other => Err(format!("unknown export format `{other}`")),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `[export]` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub summary_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            summary_dir: PathBuf::from("summaries"),
        }
    }
}

/// `<YYYYmmdd_HHMMSS>_<sanitized stem>`.
pub fn default_name(stem: &str) -> String {
    format!("{}_{}", Local::now().format(TIMESTAMP_FORMAT), sanitize_filename(stem))
}

/// Sanitize a caller-chosen name and append the extension when missing.
fn file_name(name: &str, extension: &str) -> String {
    let suffix = format!(".{extension}");
    let stem = name.strip_suffix(&suffix).unwrap_or(name);
    format!("{}{}", sanitize_filename(stem), suffix)
}

#[derive(Debug, Clone)]
pub struct Exporter {
    pub output_dir: PathBuf,
    pub summary_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>, summary_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            summary_dir: summary_dir.into(),
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(&config.output_dir, &config.summary_dir)
    }

    /// Export a ranked result set.
    ///
    /// JSON keeps the typed records; CSV, HTML and XLSX go through the
    /// tabular view; TXT is the plain-text report.
    pub fn export_results(
        &self,
        results: &[NormalizedResult],
        name: &str,
        format: ExportFormat,
    ) -> Result<PathBuf, ExportError> {
        let bytes = match format {
            ExportFormat::Json => to_json_bytes(results)?,
            ExportFormat::Txt => render_report(results).into_bytes(),
            ExportFormat::None => return Err(ExportError::NoFormat),
            tabular => return self.export_dataset(&Dataset::from_results(results), name, tabular),
        };
        self.write(&self.output_dir, name, format, &bytes, results.len())
    }

    /// Export a dataset. TXT is tab-separated.
    pub fn export_dataset(
        &self,
        dataset: &Dataset,
        name: &str,
        format: ExportFormat,
    ) -> Result<PathBuf, ExportError> {
        if dataset.is_empty() {
            warn!("exporting an empty dataset");
        }
        let bytes = match format {
            ExportFormat::Json => to_json_bytes(&dataset.to_json())?,
            ExportFormat::Csv => encode_csv(dataset)?,
            ExportFormat::Html => encode_html(dataset).into_bytes(),
            ExportFormat::Xlsx => encode_xlsx(dataset)?,
            ExportFormat::Txt => encode_tsv(dataset)?,
            ExportFormat::None => return Err(ExportError::NoFormat),
        };
        self.write(&self.output_dir, name, format, &bytes, dataset.len())
    }

    /// Export an analysis as pretty JSON.
    pub fn export_analysis(&self, analysis: &Analysis, name: &str) -> Result<PathBuf, ExportError> {
        let bytes = to_json_bytes(analysis)?;
        self.write(&self.output_dir, name, ExportFormat::Json, &bytes, 1)
    }

    /// Write a search summary into the summary directory.
    ///
    /// Summaries come as txt, html or json; other formats fall back to txt.
    pub fn write_summary(&self, summary: &SearchSummary, format: ExportFormat) -> Result<PathBuf, ExportError> {
        let format = match format {
            ExportFormat::Txt | ExportFormat::Html | ExportFormat::Json => format,
            other => {
                if other != ExportFormat::None {
                    warn!(format = %other, "unsupported summary format, using txt");
                }
                ExportFormat::Txt
            }
        };
        let bytes = match format {
            ExportFormat::Html => render_summary_html(summary).into_bytes(),
            ExportFormat::Json => to_json_bytes(summary)?,
            _ => render_summary_txt(summary).into_bytes(),
        };
        let name = default_name(&format!("summary_{}", summary.query));
        self.write(&self.summary_dir, &name, format, &bytes, summary.results.len())
    }

    /// Write `search_log_<YYYYmmdd_HHMMSS>.txt` into the summary directory.
    pub fn write_search_log(
        &self,
        query: &str,
        limit: usize,
        total: usize,
        results: &[NormalizedResult],
    ) -> Result<PathBuf, ExportError> {
        let now = Local::now();
        let body = format!(
            "Time: {}\nQuery: {}\nLimit: {}\nTotal results found: {}\n\n{}",
            now.format("%Y-%m-%d %H:%M:%S"),
            query,
            limit,
            total,
            render_report(results)
        );
        let name = format!("search_log_{}", now.format(TIMESTAMP_FORMAT));
        self.write(&self.summary_dir, &name, ExportFormat::Txt, body.as_bytes(), results.len())
    }

    fn write(
        &self,
        dir: &Path,
        name: &str,
        format: ExportFormat,
        bytes: &[u8],
        rows: usize,
    ) -> Result<PathBuf, ExportError> {
        let extension = format.extension().ok_or(ExportError::NoFormat)?;
        std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(file_name(name, extension));
        std::fs::write(&path, bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), rows, %format, "exported");
        Ok(path)
    }
}

fn to_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, ExportError> {
    serde_json::to_vec_pretty(value).map_err(|e| ExportError::Encode {
        format: "json",
        message: e.to_string(),
    })
}
