// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Column-oriented tables of typed cells.
//!
//! A [`Dataset`] is what `filter` and `analyze` work on and what the tabular
//! exporters write. It can be built from a ranked result set or loaded from
//! a previous export in any readable format.

use std::fmt;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::DatasetError;
use crate::report::{parse_report, ReportEntry, ReportField};
use crate::types::{Cell, NormalizedResult};

/// Formats a dataset can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DataFormat {
    Csv,
    Json,
    #[value(alias = "excel")]
    Xlsx,
    Txt,
}

impl DataFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<DataFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        ext.parse().ok()
    }

    pub fn name(self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Json => "json",
            DataFormat::Xlsx => "xlsx",
            DataFormat::Txt => "txt",
        }
    }
}

impl std::str::FromStr for DataFormat {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(DataFormat::Csv),
            "json" => Ok(DataFormat::Json),
            "xlsx" | "xls" | "excel" => Ok(DataFormat::Xlsx),
            "txt" => Ok(DataFormat::Txt),
            other => Err(DatasetError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A table: named columns and rows of cells, every row as wide as `columns`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or cutting it to the column count.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::NotAvailable);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// A dataset with the same columns and only the rows `keep` accepts.
    pub fn retain_rows(&self, mut keep: impl FnMut(&[Cell]) -> bool) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    /// Keep at most `limit` rows.
    pub fn truncate(&mut self, limit: usize) {
        self.rows.truncate(limit);
    }

    /// Tabular view of a ranked result set.
    pub fn from_results(results: &[NormalizedResult]) -> Dataset {
        let columns = [
            "rank",
            "id",
            "title",
            "authors",
            "publisher",
            "year",
            "language",
            "size",
            "extension",
            "url",
            "get_download",
            "mirrors",
            "score",
        ];
        let mut dataset = Dataset::new(columns.iter().map(|c| c.to_string()).collect());
        let link = |value: &Option<String>| value.clone().map_or(Cell::NotAvailable, Cell::Text);
        for result in results {
            let mirrors = if result.mirrors.is_empty() {
                Cell::NotAvailable
            } else {
                Cell::Text(
                    result
                        .mirrors
                        .iter()
                        .map(|m| format!("{}={}", m.label, m.url))
                        .collect::<Vec<_>>()
                        .join(" | "),
                )
            };
            dataset.push_row(vec![
                Cell::Integer(result.rank as i64),
                result.id.clone(),
                result.title.clone(),
                result.authors.clone(),
                result.publisher.clone(),
                result.year.clone(),
                result.language.clone(),
                result.size.clone(),
                result.extension.clone(),
                link(&result.url),
                link(&result.get_download),
                mirrors,
                Cell::Decimal(result.score),
            ]);
        }
        dataset
    }

    /// Tabular view of a parsed plain-text report.
    pub fn from_report_entries(entries: &[ReportEntry]) -> Dataset {
        let mut columns = vec!["rank".to_string(), "id".to_string()];
        columns.extend(ReportField::ALL.iter().map(|f| f.column().to_string()));
        let mut dataset = Dataset::new(columns);
        for entry in entries {
            let mut row = vec![Cell::Integer(entry.ordinal as i64), Cell::parse(&entry.id)];
            row.extend(
                ReportField::ALL
                    .iter()
                    .map(|field| entry.get(*field).map_or(Cell::NotAvailable, Cell::parse)),
            );
            dataset.push_row(row);
        }
        dataset
    }

    /// Rows as JSON objects, keys in column order.
    pub fn to_json(&self) -> Value {
        let records = self
            .rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, cell)| {
                        let value = serde_json::to_value(cell).unwrap_or(Value::Null);
                        (column.clone(), value)
                    })
                    .collect();
                Value::Object(object)
            })
            .collect();
        Value::Array(records)
    }

    /// Load a dataset, taking the format from the argument or the file
    /// extension.
    pub fn load(path: &Path, format: Option<DataFormat>) -> Result<Dataset, DatasetError> {
        let format = match format.or_else(|| DataFormat::from_path(path)) {
            Some(format) => format,
            None => {
                return Err(DatasetError::UnsupportedFormat {
                    format: path
                        .extension()
                        .map(|e| e.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                })
            }
        };
        debug!(path = %path.display(), %format, "loading dataset");

        let parse_err = |message: String| DatasetError::Parse {
            path: path.to_path_buf(),
            message,
        };
        match format {
            DataFormat::Csv => {
                let file = open(path)?;
                Dataset::from_csv(file).map_err(|e| parse_err(e.to_string()))
            }
            DataFormat::Json => {
                let text = read_to_string(path)?;
                let value: Value = serde_json::from_str(&text).map_err(|e| parse_err(e.to_string()))?;
                Dataset::from_json(&value).map_err(parse_err)
            }
            DataFormat::Xlsx => Dataset::from_xlsx(path).map_err(parse_err),
            DataFormat::Txt => {
                let text = read_to_string(path)?;
                Ok(Dataset::from_report_entries(&parse_report(&text)))
            }
        }
    }

    /// Read CSV with a header row. Short rows are padded.
    pub fn from_csv<R: Read>(reader: R) -> Result<Dataset, csv::Error> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut dataset = Dataset::new(columns);
        for record in reader.records() {
            let record = record?;
            dataset.push_row(record.iter().map(Cell::parse).collect());
        }
        Ok(dataset)
    }

    /// Read a JSON array of objects. Columns appear in first-seen order;
    /// keys missing from a row are `N/A`.
    pub fn from_json(value: &Value) -> Result<Dataset, String> {
        let Value::Array(items) = value else {
            return Err("expected a JSON array of objects".to_string());
        };
        let mut columns: Vec<String> = Vec::new();
        for item in items {
            let Value::Object(object) = item else {
                return Err("expected every array element to be an object".to_string());
            };
            for key in object.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        let mut dataset = Dataset::new(columns);
        for item in items {
            let row = dataset
                .columns
                .iter()
                .map(|column| item.get(column).map_or(Cell::NotAvailable, Cell::from_json))
                .collect();
            dataset.push_row(row);
        }
        Ok(dataset)
    }

    /// Read the first worksheet; the first row is the header.
    pub fn from_xlsx(path: &Path) -> Result<Dataset, String> {
        let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;
        let Some(sheet) = workbook.sheet_names().first().cloned() else {
            return Ok(Dataset::default());
        };
        let range = workbook.worksheet_range(&sheet).map_err(|e| e.to_string())?;
        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Ok(Dataset::default());
        };
        let mut dataset = Dataset::new(header.iter().map(|c| c.to_string().trim().to_string()).collect());
        for row in rows {
            dataset.push_row(row.iter().map(xlsx_cell).collect());
        }
        Ok(dataset)
    }
}

fn xlsx_cell(data: &Data) -> Cell {
    match data {
        Data::Int(n) => Cell::Integer(*n),
        Data::Float(x) if x.fract() == 0.0 && x.abs() < 1e15 => Cell::Integer(*x as i64),
        Data::Float(x) => Cell::Decimal(*x),
        Data::String(s) => Cell::parse(s),
        Data::Empty => Cell::NotAvailable,
        other => Cell::Text(other.to_string()),
    }
}

fn open(path: &Path) -> Result<std::fs::File, DatasetError> {
    std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_to_string(path: &Path) -> Result<String, DatasetError> {
    std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_record;
    use crate::report::render_report;
    use crate::testing::make_full_record;

    #[test]
    fn test_format_from_path() {
        assert_eq!(DataFormat::from_path(Path::new("a/b.CSV")), Some(DataFormat::Csv));
        assert_eq!(DataFormat::from_path(Path::new("b.xlsx")), Some(DataFormat::Xlsx));
        assert_eq!(DataFormat::from_path(Path::new("b.parquet")), None);
        assert_eq!(DataFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_from_csv_types_cells() {
        let data = "id,title,year,isbn\n1,Rust,2019,0134685997\n2,Go,,\n3\n";
        let dataset = Dataset::from_csv(data.as_bytes()).unwrap();
        assert_eq!(dataset.columns, vec!["id", "title", "year", "isbn"]);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.rows[0][2], Cell::Integer(2019));
        assert_eq!(dataset.rows[0][3], Cell::Text("0134685997".into()));
        assert_eq!(dataset.rows[1][2], Cell::NotAvailable);
        assert_eq!(dataset.rows[2].len(), 4);
    }

    #[test]
    fn test_from_json_first_seen_columns() {
        let value = serde_json::json!([
            {"b": 1, "a": "x"},
            {"a": "y", "c": null}
        ]);
        let dataset = Dataset::from_json(&value).unwrap();
        assert_eq!(dataset.columns, vec!["b", "a", "c"]);
        assert_eq!(dataset.rows[1][0], Cell::NotAvailable);
        assert_eq!(dataset.rows[1][2], Cell::NotAvailable);
    }

    #[test]
    fn test_from_json_rejects_scalars() {
        assert!(Dataset::from_json(&serde_json::json!({"a": 1})).is_err());
        assert!(Dataset::from_json(&serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn test_from_results_and_report_agree() {
        let mut result = normalize_record(make_full_record("abc", "Rust in Action"));
        result.rank = 1;
        let from_results = Dataset::from_results(std::slice::from_ref(&result));
        let from_report = Dataset::from_report_entries(&parse_report(&render_report(&[result])));

        for column in ["id", "title", "authors", "year", "size", "url", "get_download"] {
            let a = from_results.column_index(column).unwrap();
            let b = from_report.column_index(column).unwrap();
            assert_eq!(from_results.rows[0][a], from_report.rows[0][b], "column {column}");
        }
    }

    #[test]
    fn test_to_json_keeps_column_order() {
        let mut dataset = Dataset::new(vec!["z".into(), "a".into()]);
        dataset.push_row(vec![Cell::Integer(1), Cell::NotAvailable]);
        assert_eq!(dataset.to_json().to_string(), r#"[{"z":1,"a":"N/A"}]"#);
    }

    #[test]
    fn test_load_unknown_extension() {
        let err = Dataset::load(Path::new("results.parquet"), None).unwrap_err();
        assert!(matches!(err, DatasetError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Dataset::load(Path::new("/nonexistent/results.csv"), None).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
