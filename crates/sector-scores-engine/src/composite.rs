//! Composite category scores.
//!
//! A category score is the unweighted row-wise mean of the z-score columns
//! of that category that exist in the frame. Nulls are skipped; a row with
//! no usable z-score, or a category with no z-score column at all, scores null.

use crate::error::Result;
use polars::prelude::*;
use sector_scores_data::{MetricCatalog, MetricCategory};

/// Row-wise mean over columns, ignoring nulls.
pub fn row_mean(columns: &[String]) -> Expr {
    let null = lit(NULL).cast(DataType::Float64);
    if columns.is_empty() {
        return null;
    }

    let sum = columns.iter().fold(lit(0.0), |acc, c| {
        acc + col(c.as_str()).fill_null(lit(0.0))
    });
    let count = columns.iter().fold(lit(0.0), |acc, c| {
        acc + col(c.as_str()).is_not_null().cast(DataType::Float64)
    });

    when(count.clone().gt(lit(0.0)))
        .then(sum / count)
        .otherwise(null)
}

/// Z-score columns of a category present in the frame, in catalog order.
pub fn category_zscore_columns(
    df: &DataFrame,
    catalog: &MetricCatalog,
    category: MetricCategory,
) -> Vec<String> {
    catalog
        .keys(category)
        .iter()
        .map(|key| key.zscore_column())
        .filter(|name| df.column(name).is_ok())
        .collect()
}

/// Add `Risk_Score`, `Growth_Score` and `Quality_Score`.
pub fn composite_scores(df: &DataFrame, catalog: &MetricCatalog) -> Result<DataFrame> {
    let exprs: Vec<Expr> = MetricCategory::SCORED
        .iter()
        .filter_map(|category| {
            let score = category.score_column()?;
            let columns = category_zscore_columns(df, catalog, *category);
            if columns.is_empty() {
                tracing::debug!(%category, "no z-score columns; composite is null");
            }
            Some(row_mean(&columns).alias(score))
        })
        .collect();

    Ok(df.clone().lazy().with_columns(exprs).collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn values(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
        df.column(column)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_mean_skips_nulls() {
        let df = DataFrame::new(vec![
            Series::new("Beta_ZScore".into(), vec![Some(1.0), Some(-1.0), None]).into(),
            Series::new("Volatility_ZScore".into(), vec![Some(0.0), None, None]).into(),
            Series::new("DebtToEquity_ZScore".into(), vec![Some(2.0), Some(0.5), None]).into(),
        ])
        .unwrap();

        let out = composite_scores(&df, &MetricCatalog::default()).unwrap();
        let risk = values(&out, "Risk_Score");
        assert_abs_diff_eq!(risk[0].unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(risk[1].unwrap(), -0.25, epsilon = 1e-12);
        assert_eq!(risk[2], None);
    }

    #[test]
    fn test_absent_category_is_null() {
        let df = DataFrame::new(vec![
            Series::new("ROE_ZScore".into(), vec![0.5, -0.5]).into(),
        ])
        .unwrap();

        let out = composite_scores(&df, &MetricCatalog::default()).unwrap();
        assert_eq!(values(&out, "Risk_Score"), vec![None, None]);
        assert_eq!(values(&out, "Growth_Score"), vec![None, None]);
        assert_eq!(values(&out, "Quality_Score"), vec![Some(0.5), Some(-0.5)]);
    }

    #[test]
    fn test_category_columns_follow_catalog() {
        let df = DataFrame::new(vec![
            Series::new("ROA_ZScore".into(), vec![0.1]).into(),
            Series::new("ROE_ZScore".into(), vec![0.2]).into(),
        ])
        .unwrap();
        let columns =
            category_zscore_columns(&df, &MetricCatalog::default(), MetricCategory::Quality);
        assert_eq!(columns, vec!["ROE_ZScore", "ROA_ZScore"]);
    }
}
