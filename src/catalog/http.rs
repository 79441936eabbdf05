// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! HTTP client for LibGen-style catalog mirrors.
//!
//! Uses `ureq` for synchronous requests with a fixed timeout. Mirrors answer
//! either JSON or an HTML results page; both are decoded tolerantly into
//! [`RawRecord`]s. Only transport failures are errors worth aborting for;
//! a body we cannot read is reported as `MalformedResponse`.

use std::sync::{LazyLock, OnceLock};
use std::time::Duration;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{Catalog, CatalogConfig, CatalogRequest};
use crate::error::CatalogError;
use crate::types::{DownloadLinks, Field, FieldValue, Mirror, RawRecord, SearchField};

const SEARCH_ENDPOINT: &str = "search.php";
const LOOKUP_ENDPOINT: &str = "json.php";
const GET_BASE: &str = "https://library.lol/main/";

/// Rows with fewer cells are layout rows, not results.
const MIN_RESULT_CELLS: usize = 9;
const LINK_CELL: usize = 9;

/// Page sizes the search endpoint accepts.
const PAGE_SIZES: [usize; 3] = [25, 50, 100];

static RESULTS_TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table.c").unwrap());
static RESULTS_TABLE_FALLBACK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"table[cellpadding="2"][cellspacing="1"]"#).unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static MD5: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b([0-9a-f]{32})\b").unwrap());

/// Catalog client bound to one mirror, chosen on first use.
pub struct HttpCatalog {
    agent: ureq::Agent,
    config: CatalogConfig,
    resolved: OnceLock<String>,
}

impl HttpCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build();
        Self {
            agent,
            config,
            resolved: OnceLock::new(),
        }
    }

    /// The mirror in use: the configured one, else the first probe that
    /// answers `200`.
    pub fn mirror(&self) -> Result<&str, CatalogError> {
        if let Some(mirror) = self.resolved.get() {
            return Ok(mirror.as_str());
        }
        let mirror = match &self.config.mirror {
            Some(mirror) => mirror.trim_end_matches('/').to_string(),
            None => self.probe()?,
        };
        info!(mirror = %mirror, "using catalog mirror");
        Ok(self.resolved.get_or_init(|| mirror).as_str())
    }

    fn probe(&self) -> Result<String, CatalogError> {
        let timeout = Duration::from_secs(self.config.probe_timeout_secs);
        for candidate in &self.config.mirrors {
            match self.agent.get(candidate).timeout(timeout).call() {
                Ok(response) if response.status() == 200 => {
                    return Ok(candidate.trim_end_matches('/').to_string());
                }
                Ok(response) => {
                    debug!(mirror = %candidate, status = response.status(), "mirror probe rejected");
                }
                Err(e) => debug!(mirror = %candidate, error = %e, "mirror probe failed"),
            }
        }
        Err(CatalogError::ServiceUnavailable {
            target: self.config.mirrors.join(", "),
            message: "no mirror answered".to_string(),
        })
    }

    fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<ureq::Response, CatalogError> {
        let mut request = self.agent.get(url).set("Accept", "application/json, text/html");
        for (key, value) in params {
            request = request.query(key, value);
        }
        debug!(url, ?params, "catalog request");
        request.call().map_err(|e| {
            let message = match e {
                ureq::Error::Status(code, _) => format!("HTTP {code}"),
                ureq::Error::Transport(transport) => transport.to_string(),
            };
            CatalogError::ServiceUnavailable {
                target: url.to_string(),
                message,
            }
        })
    }

    fn read_body(url: &str, response: ureq::Response) -> Result<(String, String), CatalogError> {
        let content_type = response.content_type().to_string();
        let body = response
            .into_string()
            .map_err(|e| CatalogError::ServiceUnavailable {
                target: url.to_string(),
                message: format!("read body: {e}"),
            })?;
        Ok((content_type, body))
    }
}

impl Catalog for HttpCatalog {
    fn search(&self, request: &CatalogRequest) -> Result<Vec<RawRecord>, CatalogError> {
        let mirror = self.mirror()?;
        let url = format!("{mirror}/{SEARCH_ENDPOINT}");
        let page = page_size(request.ceiling);
        let column = column_param(&request.fields);

        let response = self.get(
            &url,
            &[
                ("req", request.query.as_str()),
                ("res", page.as_str()),
                ("column", column),
            ],
        )?;
        let (content_type, body) = Self::read_body(&url, response)?;

        let mut records = if content_type.contains("json") {
            let value: Value = serde_json::from_str(&body).map_err(|e| CatalogError::MalformedResponse {
                message: e.to_string(),
            })?;
            parse_json_records(&value)?
        } else {
            parse_search_html(&body, mirror)?
        };
        if let Some(ceiling) = request.ceiling {
            records.truncate(ceiling);
        }
        info!(count = records.len(), "catalog returned candidates");
        Ok(records)
    }

    fn lookup(&self, id: &str) -> Result<Option<RawRecord>, CatalogError> {
        let mirror = self.mirror()?;
        let url = format!("{mirror}/{LOOKUP_ENDPOINT}");
        let response = self.get(&url, &[("ids", id.trim()), ("fields", "*")])?;
        let (_, body) = Self::read_body(&url, response)?;
        let value: Value = serde_json::from_str(&body).map_err(|e| CatalogError::MalformedResponse {
            message: e.to_string(),
        })?;
        Ok(parse_json_records(&value)?.into_iter().next())
    }
}

fn page_size(ceiling: Option<usize>) -> String {
    let wanted = ceiling.unwrap_or(PAGE_SIZES[0]);
    let size = PAGE_SIZES
        .into_iter()
        .find(|size| *size >= wanted)
        .unwrap_or(PAGE_SIZES[PAGE_SIZES.len() - 1]);
    size.to_string()
}

/// The search endpoint takes one column; anything broader searches the
/// default column set.
fn column_param(fields: &[SearchField]) -> &'static str {
    match fields {
        [single] => single.name(),
        _ => "def",
    }
}

/// Decode a JSON array of record objects.
///
/// Non-object elements are skipped. A non-array body is malformed.
pub fn parse_json_records(value: &Value) -> Result<Vec<RawRecord>, CatalogError> {
    let Value::Array(items) = value else {
        return Err(CatalogError::MalformedResponse {
            message: "expected a JSON array of records".to_string(),
        });
    };
    Ok(items
        .iter()
        .filter_map(RawRecord::from_json)
        .map(with_md5_links)
        .collect())
}

/// Fill in a GET link for records that carry an md5 but no links.
fn with_md5_links(mut record: RawRecord) -> RawRecord {
    if record.links.get.is_none() {
        if let Some(md5) = record.text(Field::Md5).and_then(|text| md5_in(&text)) {
            record.links.get = Some(format!("{GET_BASE}{md5}"));
        }
    }
    record
}

/// Find an md5 hash in a link or field, lowercased.
pub fn md5_in(text: &str) -> Option<String> {
    MD5.captures(text).map(|caps| caps[1].to_lowercase())
}

/// Convert size text such as `"12 Mb"` or `"1,5 GB"` to bytes.
pub fn parse_size(text: &str) -> Option<f64> {
    let mut parts = text.split_whitespace();
    let (number, unit) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let value: f64 = number.replace(',', ".").parse().ok()?;
    let unit = unit.to_ascii_uppercase();
    let factor = if unit.contains("GB") {
        1024.0 * 1024.0 * 1024.0
    } else if unit.contains("MB") {
        1024.0 * 1024.0
    } else if unit.contains("KB") {
        1024.0
    } else if unit.contains('B') {
        1.0
    } else {
        return None;
    };
    Some(value * factor)
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

fn resolve_href(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        format!("{}/{}", base.trim_end_matches('/'), href.trim_start_matches('/'))
    }
}

/// Scrape the results table of an HTML search page.
///
/// The first row is the header. Columns: id, author, title, publisher, year,
/// pages, language, size, extension, then mirror links.
pub fn parse_search_html(html: &str, base: &str) -> Result<Vec<RawRecord>, CatalogError> {
    let document = Html::parse_document(html);
    let table = document
        .select(&RESULTS_TABLE)
        .next()
        .or_else(|| document.select(&RESULTS_TABLE_FALLBACK).next())
        .ok_or_else(|| CatalogError::MalformedResponse {
            message: "no results table in HTML response".to_string(),
        })?;

    let mut records = Vec::new();
    for row in table.select(&ROW).skip(1) {
        let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
        if cells.len() < MIN_RESULT_CELLS {
            continue;
        }
        records.push(parse_row(&cells, base));
    }
    debug!(count = records.len(), "parsed HTML results");
    Ok(records)
}

fn parse_row(cells: &[ElementRef<'_>], base: &str) -> RawRecord {
    const COLUMNS: [Field; 9] = [
        Field::Id,
        Field::Author,
        Field::Title,
        Field::Publisher,
        Field::Year,
        Field::Pages,
        Field::Language,
        Field::Size,
        Field::Extension,
    ];

    let mut record = RawRecord::new();
    for (field, cell) in COLUMNS.into_iter().zip(cells) {
        let text = cell_text(cell);
        let value = match field {
            Field::Size => match parse_size(&text) {
                Some(bytes) => FieldValue::Number(bytes),
                None => {
                    if !text.is_empty() {
                        warn!(size = %text, "could not parse size");
                    }
                    FieldValue::Text(text)
                }
            },
            _ => FieldValue::Text(text),
        };
        record.set(field, value);
    }

    let md5 = cells
        .iter()
        .flat_map(|cell| cell.select(&LINK))
        .filter_map(|a| a.value().attr("href"))
        .find_map(md5_in);

    let links: Vec<(String, String)> = cells
        .iter()
        .skip(LINK_CELL)
        .flat_map(|cell| cell.select(&LINK))
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            Some((cell_text(&a), resolve_href(base, href)))
        })
        .collect();

    let mut download = DownloadLinks {
        get: md5.as_ref().map(|md5| format!("{GET_BASE}{md5}")),
        ..DownloadLinks::default()
    };
    let mut links = links.into_iter();
    if let Some((_, url)) = links.next() {
        download.url = Some(url);
    }
    download.mirrors = links
        .enumerate()
        .map(|(i, (label, url))| Mirror {
            label: if label.is_empty() { format!("mirror {}", i + 2) } else { label },
            url,
        })
        .collect();

    if let Some(md5) = md5 {
        record.set(Field::Md5, md5);
    }
    record.with_links(download)
}
