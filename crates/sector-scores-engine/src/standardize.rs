//! Cross-sectional z-scores.
//!
//! Z-scores use the population standard deviation (`ddof = 0`) over the rows
//! present in the frame. A column whose spread is not measurable (one row,
//! or every value identical) standardizes to null rather than NaN.

use crate::error::Result;
use polars::prelude::*;
use sector_scores_data::{MetricCatalog, MetricCategory, MetricKey, zscore_column};

/// Standard deviations at or below this are treated as zero.
pub const MIN_STD: f64 = 1e-12;

/// Z-score of an expression over the current frame.
pub fn zscore(values: Expr) -> Expr {
    let std = values.clone().std(0);
    when(std.clone().gt(lit(MIN_STD)))
        .then((values.clone() - values.mean()) / std)
        .otherwise(lit(NULL).cast(DataType::Float64))
}

/// Mean-imputed z-score: nulls take the column mean before standardizing.
pub fn imputed_zscore(column: &str) -> Expr {
    zscore(col(column).fill_null(col(column).mean()))
}

/// True when the frame has the column and at least one non-null value in it.
pub fn has_values(df: &DataFrame, column: &str) -> bool {
    df.column(column)
        .map(|c| c.null_count() < c.len())
        .unwrap_or(false)
}

/// Metrics of the scored categories that can be standardized in this frame.
pub fn standardizable<'a>(df: &DataFrame, catalog: &'a MetricCatalog) -> Vec<&'a MetricKey> {
    MetricCategory::SCORED
        .iter()
        .flat_map(|category| catalog.keys(*category))
        .filter(|key| has_values(df, &key.name))
        .collect()
}

/// Add `<metric>_ZScore` for every Risk, Growth and Quality metric present.
///
/// Missing values are imputed with the column mean first; the raw columns
/// are left untouched. Columns with no values at all are skipped.
pub fn standardize_features(df: &DataFrame, catalog: &MetricCatalog) -> Result<DataFrame> {
    let exprs: Vec<Expr> = standardizable(df, catalog)
        .into_iter()
        .map(|key| imputed_zscore(&key.name).alias(key.zscore_column()))
        .collect();

    if exprs.is_empty() {
        tracing::debug!("no feature metric has values; skipping feature z-scores");
        return Ok(df.clone());
    }

    Ok(df.clone().lazy().with_columns(exprs).collect()?)
}

/// Drop rows without the valuation metric, then add its z-score.
///
/// The valuation target is never imputed. When the column does not exist
/// the frame is returned unchanged.
pub fn standardize_valuation(df: &DataFrame, valuation: &MetricKey) -> Result<DataFrame> {
    let name = valuation.name.as_str();
    if df.column(name).is_err() {
        return Ok(df.clone());
    }

    let out = df
        .clone()
        .lazy()
        .filter(col(name).is_not_null())
        .collect()?;

    let out = out
        .lazy()
        .with_column(zscore(col(name)).alias(zscore_column(name)))
        .collect()?;

    tracing::debug!(
        before = df.height(),
        after = out.height(),
        metric = name,
        "dropped rows without valuation metric"
    );

    Ok(out)
}
