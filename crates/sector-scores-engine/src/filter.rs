//! Outlier filtering and final projection.

use crate::error::{EngineError, Result};
use polars::prelude::*;
use sector_scores_data::catalog::{SECTOR_COLUMN, TICKER_COLUMN};
use sector_scores_data::{MetricCatalog, MetricCategory, MetricKey};

/// Default bound on the absolute value of every filtered score.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 2.5;

/// `-threshold <= column <= threshold`; null never passes.
fn within(column: &str, threshold: f64) -> Expr {
    col(column)
        .gt_eq(lit(-threshold))
        .and(col(column).lt_eq(lit(threshold)))
}

/// Columns the outlier predicate is applied to.
///
/// The three composite scores always take part; the valuation z-score only
/// when the frame has it.
pub fn filtered_columns(df: &DataFrame, valuation: &MetricKey) -> Vec<String> {
    let mut columns: Vec<String> = MetricCategory::SCORED
        .iter()
        .filter_map(MetricCategory::score_column)
        .map(str::to_string)
        .collect();

    let valuation_z = valuation.zscore_column();
    if df.column(&valuation_z).is_ok() {
        columns.push(valuation_z);
    }
    columns
}

/// Keep rows whose composite scores and valuation z-score are all within
/// `threshold` in absolute value. Re-filtering the result is a no-op.
pub fn filter_outliers(df: &DataFrame, valuation: &MetricKey, threshold: f64) -> Result<DataFrame> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(EngineError::InvalidThreshold(threshold));
    }

    let predicate = filtered_columns(df, valuation)
        .iter()
        .fold(lit(true), |acc, c| acc.and(within(c, threshold)));

    let out = df.clone().lazy().filter(predicate).collect()?;
    tracing::debug!(
        before = df.height(),
        after = out.height(),
        threshold,
        "outlier filter applied"
    );
    Ok(out)
}

/// Output columns for a scored frame, in output order.
pub fn output_columns(df: &DataFrame, catalog: &MetricCatalog) -> Vec<String> {
    let mut columns = vec![SECTOR_COLUMN.to_string(), TICKER_COLUMN.to_string()];
    columns.extend(
        MetricCategory::SCORED
            .iter()
            .filter_map(MetricCategory::score_column)
            .map(str::to_string),
    );

    let valuation = &catalog.valuation;
    if df.column(&valuation.name).is_ok() {
        columns.push(valuation.name.clone());
        let valuation_z = valuation.zscore_column();
        if df.column(&valuation_z).is_ok() {
            columns.push(valuation_z);
        }
    }
    columns
}

/// Project to `Sector, Ticker, Risk_Score, Growth_Score, Quality_Score`
/// plus the valuation metric and its z-score when present.
pub fn project(df: &DataFrame, catalog: &MetricCatalog) -> Result<DataFrame> {
    let exprs: Vec<Expr> = output_columns(df, catalog)
        .iter()
        .map(|c| col(c.as_str()))
        .collect();
    Ok(df.clone().lazy().select(exprs).collect()?)
}
