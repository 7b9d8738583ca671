//! Sector scoring driver.
//!
//! Runs the normalization steps in order over one sector's raw dataset:
//! feature z-scores (imputed), valuation z-score (rows without the target
//! dropped first), composite scores, outlier filter, projection.

use crate::composite::composite_scores;
use crate::error::Result;
use crate::filter::{DEFAULT_OUTLIER_THRESHOLD, filter_outliers, project};
use crate::standardize::{standardize_features, standardize_valuation};
use polars::prelude::*;
use sector_scores_data::MetricCatalog;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scoring parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Maximum absolute composite score and valuation z-score kept.
    pub outlier_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
        }
    }
}

/// Step at which a sector ran out of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyStage {
    /// The raw dataset had no rows.
    NoRows,
    /// No row has the valuation metric.
    NoValuation,
    /// The outlier filter removed every row.
    AllFiltered,
}

impl fmt::Display for EmptyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRows => f.write_str("no rows"),
            Self::NoValuation => f.write_str("no valuation"),
            Self::AllFiltered => f.write_str("all filtered"),
        }
    }
}

/// Result of scoring one sector.
#[derive(Debug, Clone)]
pub enum ScoreOutcome {
    /// Projected rows that passed the filter.
    Scored(DataFrame),
    /// No usable row remained.
    Empty(EmptyStage),
}

impl ScoreOutcome {
    /// The scored frame, if any.
    pub fn into_scored(self) -> Option<DataFrame> {
        match self {
            Self::Scored(df) => Some(df),
            Self::Empty(_) => None,
        }
    }

    /// Where scoring stopped, if it produced nothing.
    pub const fn empty_stage(&self) -> Option<EmptyStage> {
        match self {
            Self::Scored(_) => None,
            Self::Empty(stage) => Some(*stage),
        }
    }
}

/// Score a raw sector dataset.
pub fn score_sector(
    raw: &DataFrame,
    catalog: &MetricCatalog,
    config: &ScoringConfig,
) -> Result<ScoreOutcome> {
    if raw.height() == 0 {
        return Ok(ScoreOutcome::Empty(EmptyStage::NoRows));
    }

    let df = standardize_features(raw, catalog)?;
    let df = standardize_valuation(&df, &catalog.valuation)?;
    if df.height() == 0 {
        return Ok(ScoreOutcome::Empty(EmptyStage::NoValuation));
    }

    let df = composite_scores(&df, catalog)?;
    let before = df.height();
    let df = filter_outliers(&df, &catalog.valuation, config.outlier_threshold)?;
    tracing::debug!(before, after = df.height(), "outlier filter applied");
    if df.height() == 0 {
        return Ok(ScoreOutcome::Empty(EmptyStage::AllFiltered));
    }

    Ok(ScoreOutcome::Scored(project(&df, catalog)?))
}
