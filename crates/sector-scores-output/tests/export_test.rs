//! Writing the combined dataset to disk.

use polars::prelude::*;
use sector_scores_output::{ExportFormat, write_dataset};
use std::path::PathBuf;

fn combined() -> DataFrame {
    DataFrame::new(vec![
        Series::new("Sector".into(), vec!["energy", "technology", "technology"]).into(),
        Series::new("Ticker".into(), vec!["XOM", "AAPL", "MSFT"]).into(),
        Series::new("Risk_Score".into(), vec![0.1, -0.4, 0.3]).into(),
        Series::new("Growth_Score".into(), vec![0.2, 1.1, -0.9]).into(),
        Series::new("Quality_Score".into(), vec![-0.3, 0.8, 0.5]).into(),
        Series::new("PE".into(), vec![13.2, 31.5, 35.0]).into(),
        Series::new("PE_ZScore".into(), vec![0.0, -1.0, 1.0]).into(),
    ])
    .unwrap()
}

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("sector-scores-{}-{name}", std::process::id()))
}

#[test]
fn test_write_csv_artifact() {
    let path = scratch("combined.csv");
    write_dataset(&combined(), &path, ExportFormat::Csv).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Sector,Ticker,Risk_Score,Growth_Score,Quality_Score,PE,PE_ZScore")
    );
    assert_eq!(lines.count(), 3);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_write_json_artifact() {
    let path = scratch("combined.json");
    write_dataset(&combined(), &path, ExportFormat::Json).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1]["Ticker"], "AAPL");
    assert_eq!(rows[2]["PE_ZScore"], 1.0);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_unwritable_path_is_an_error() {
    let path = std::env::temp_dir()
        .join("sector-scores-missing-dir")
        .join("nested")
        .join("out.csv");
    assert!(write_dataset(&combined(), &path, ExportFormat::Csv).is_err());
}
