// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Dataset encoders: CSV, tab-separated text, HTML table and XLSX.

use std::fmt::Write as _;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::dataset::Dataset;
use crate::error::ExportError;
use crate::types::Cell;

fn delimited(dataset: &Dataset, delimiter: u8, format: &'static str) -> Result<Vec<u8>, ExportError> {
    let encode_err = |message: String| ExportError::Encode { format, message };
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer
        .write_record(&dataset.columns)
        .map_err(|e| encode_err(e.to_string()))?;
    for row in &dataset.rows {
        writer
            .write_record(row.iter().map(Cell::to_string))
            .map_err(|e| encode_err(e.to_string()))?;
    }
    writer.into_inner().map_err(|e| encode_err(e.to_string()))
}

pub fn encode_csv(dataset: &Dataset) -> Result<Vec<u8>, ExportError> {
    delimited(dataset, b',', "csv")
}

pub fn encode_tsv(dataset: &Dataset) -> Result<Vec<u8>, ExportError> {
    delimited(dataset, b'\t', "txt")
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// A standalone HTML page holding one table.
pub fn encode_html(dataset: &Dataset) -> String {
    let mut out = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n</head>\n<body>\n<table border=\"1\">\n",
    );
    out.push_str("  <thead>\n    <tr>");
    for column in &dataset.columns {
        let _ = write!(out, "<th>{}</th>", escape_html(column));
    }
    out.push_str("</tr>\n  </thead>\n  <tbody>\n");
    for row in &dataset.rows {
        out.push_str("    <tr>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", escape_html(&cell.to_string()));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("  </tbody>\n</table>\n</body>\n</html>\n");
    out
}

/// One worksheet, bold header row, numbers as numbers.
pub fn encode_xlsx(dataset: &Dataset) -> Result<Vec<u8>, ExportError> {
    build_workbook(dataset).map_err(|e| ExportError::Encode {
        format: "xlsx",
        message: e.to_string(),
    })
}

fn build_workbook(dataset: &Dataset) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Results")?;

    for (col, name) in dataset.columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &header)?;
    }
    for (r, row) in dataset.rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Integer(n) => sheet.write_number(r, col, *n as f64)?,
                Cell::Decimal(x) => sheet.write_number(r, col, *x)?,
                other => sheet.write_string(r, col, other.to_string())?,
            };
        }
    }
    workbook.save_to_buffer()
}
