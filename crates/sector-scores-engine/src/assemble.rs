//! Dataset assembly.
//!
//! Turns the scheduler's per-company records into one row per company with
//! a nullable `Float64` column per configured metric.

use crate::error::Result;
use polars::prelude::*;
use sector_scores_data::catalog::{SECTOR_COLUMN, TICKER_COLUMN};
use sector_scores_data::{CompanyRecord, MetricCatalog};

/// Build the raw sector dataset.
///
/// Columns: `Sector`, `Ticker`, then every catalog metric in catalog order.
/// A metric a company did not return is null.
pub fn assemble(
    sector: &str,
    records: &[CompanyRecord],
    catalog: &MetricCatalog,
) -> Result<DataFrame> {
    let sectors = vec![sector; records.len()];
    let tickers: Vec<&str> = records.iter().map(|r| r.ticker.as_str()).collect();

    let mut columns: Vec<Column> = vec![
        Series::new(SECTOR_COLUMN.into(), sectors).into(),
        Series::new(TICKER_COLUMN.into(), tickers).into(),
    ];

    for (_, key) in catalog.all() {
        let values: Vec<Option<f64>> = records.iter().map(|r| r.value(&key.name)).collect();
        columns.push(Series::new(key.name.as_str().into(), values).into());
    }

    Ok(DataFrame::new(columns)?)
}
