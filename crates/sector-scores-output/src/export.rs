//! Export of the combined dataset.
//!
//! The artifact is a flat table: CSV with a header row, or a JSON array of
//! row objects. Column names and order are taken from the frame.

use polars::prelude::*;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars DataFrame error.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Pretty-printed JSON array of row objects.
    Json,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ExportError::InvalidFormat(format!(
                "unknown export format {other:?} (expected csv or json)"
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
    Null,
}

impl Cell {
    fn to_field(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(v) => v.to_string(),
            Self::Null => String::new(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Number(v) => serde_json::Number::from_f64(*v)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Null => serde_json::Value::Null,
        }
    }
}

fn column_cells(column: &Column) -> Result<Vec<Cell>, ExportError> {
    let series = column.as_materialized_series();
    match series.dtype() {
        DataType::String => Ok(series
            .str()?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, |s| Cell::Text(s.to_string())))
            .collect()),
        DataType::Float64
        | DataType::Float32
        | DataType::Int64
        | DataType::Int32
        | DataType::UInt64
        | DataType::UInt32 => {
            let floats = series.cast(&DataType::Float64)?;
            Ok(floats
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()).map_or(Cell::Null, Cell::Number))
                .collect())
        }
        other => Err(ExportError::InvalidFormat(format!(
            "column {} has unsupported type {other}",
            series.name()
        ))),
    }
}

/// Header and row-major cells of a frame.
fn table(df: &DataFrame) -> Result<(Vec<String>, Vec<Vec<Cell>>), ExportError> {
    let header: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let columns = df
        .get_columns()
        .iter()
        .map(column_cells)
        .collect::<Result<Vec<_>, _>>()?;

    let rows = (0..df.height())
        .map(|i| columns.iter().map(|c| c[i].clone()).collect())
        .collect();

    Ok((header, rows))
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for DataFrame {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let (header, rows) = table(self)?;
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(&header)?;
                for row in &rows {
                    wtr.write_record(row.iter().map(Cell::to_field))?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
            }
            ExportFormat::Json => {
                let records: Vec<serde_json::Map<String, serde_json::Value>> = rows
                    .iter()
                    .map(|row| {
                        header
                            .iter()
                            .cloned()
                            .zip(row.iter().map(Cell::to_json))
                            .collect()
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&records)?)
            }
        }
    }
}

/// Render the dataset in `format` without touching the filesystem.
pub fn dataset_to_string(df: &DataFrame, format: ExportFormat) -> Result<String, ExportError> {
    df.export_to_string(format)
}

/// Write the dataset to `path`.
pub fn write_dataset(df: &DataFrame, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
    df.export_to_file(path, format)?;
    tracing::info!(path = %path.display(), rows = df.height(), %format, "dataset written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dataset() -> DataFrame {
        DataFrame::new(vec![
            Series::new("Sector".into(), vec!["energy", "energy"]).into(),
            Series::new("Ticker".into(), vec!["XOM", "CVX"]).into(),
            Series::new("Risk_Score".into(), vec![Some(0.25), None]).into(),
            Series::new("PE".into(), vec![13.5, 15.0]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_csv_header_and_nulls() {
        let csv = dataset().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Sector,Ticker,Risk_Score,PE");
        assert_eq!(lines[1], "energy,XOM,0.25,13.5");
        assert_eq!(lines[2], "energy,CVX,,15");
    }

    #[test]
    fn test_json_rows() {
        let json = dataset().export_to_string(ExportFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = parsed.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Ticker"], "XOM");
        assert_eq!(rows[0]["Risk_Score"], 0.25);
        assert!(rows[1]["Risk_Score"].is_null());
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv)]
    #[case("CSV", ExportFormat::Csv)]
    #[case("json", ExportFormat::Json)]
    fn test_format_parsing(#[case] input: &str, #[case] expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_format() {
        assert!(matches!(
            "parquet".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_dataset_to_string_matches_exporter() {
        let df = dataset();
        assert_eq!(
            dataset_to_string(&df, ExportFormat::Json).unwrap(),
            df.export_to_string(ExportFormat::Json).unwrap()
        );
    }

    #[test]
    fn test_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
    }
}
