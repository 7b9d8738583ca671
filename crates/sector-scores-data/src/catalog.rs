//! Metric catalog.
//!
//! Every metric pairs the semantic column name used throughout the pipeline
//! with the provider field it is read from, and belongs to exactly one of
//! four fixed categories. Membership is static configuration.

use crate::error::{DataError, Result};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Suffix of the derived per-metric z-score column.
pub const ZSCORE_SUFFIX: &str = "_ZScore";

/// Name of the sector column in every dataset.
pub const SECTOR_COLUMN: &str = "Sector";

/// Name of the ticker column in every dataset.
pub const TICKER_COLUMN: &str = "Ticker";

/// Returns the z-score column name for a metric.
pub fn zscore_column(name: &str) -> String {
    format!("{name}{ZSCORE_SUFFIX}")
}

/// Metric categories.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricCategory {
    /// Risk profile (beta, leverage, trading activity)
    #[display("Risk")]
    Risk,
    /// Growth potential (revenue, earnings, margins)
    #[display("Growth")]
    Growth,
    /// Operational quality (returns on capital, operating margin)
    #[display("Quality")]
    Quality,
    /// The valuation target prepared for downstream comparison
    #[display("Valuation")]
    Valuation,
}

impl MetricCategory {
    /// Categories that are folded into a composite score.
    pub const SCORED: [Self; 3] = [Self::Risk, Self::Growth, Self::Quality];

    /// Returns the composite score column, `None` for the valuation target.
    pub const fn score_column(&self) -> Option<&'static str> {
        match self {
            Self::Risk => Some("Risk_Score"),
            Self::Growth => Some("Growth_Score"),
            Self::Quality => Some("Quality_Score"),
            Self::Valuation => None,
        }
    }
}

/// A semantic metric name and the provider field it is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricKey {
    /// Column name in the assembled dataset (e.g. `"Beta"`)
    pub name: String,
    /// Provider field name (e.g. `"beta"`)
    pub field: String,
}

impl MetricKey {
    /// Create a new metric key.
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
        }
    }

    /// Name of this metric's z-score column.
    pub fn zscore_column(&self) -> String {
        zscore_column(&self.name)
    }
}

/// The four metric groups consumed by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricCatalog {
    /// Risk metrics
    pub risk: Vec<MetricKey>,
    /// Growth metrics
    pub growth: Vec<MetricKey>,
    /// Quality metrics
    pub quality: Vec<MetricKey>,
    /// Valuation target (not imputed, filtered on its own z-score)
    pub valuation: MetricKey,
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self {
            risk: vec![
                MetricKey::new("Beta", "beta"),
                MetricKey::new("Volatility", "regularMarketVolume"),
                MetricKey::new("DebtToEquity", "debtToEquity"),
            ],
            growth: vec![
                MetricKey::new("RevenueGrowth", "revenueGrowth"),
                MetricKey::new("EarningsGrowth", "earningsGrowth"),
                MetricKey::new("ProfitMargins", "profitMargins"),
            ],
            quality: vec![
                MetricKey::new("ROE", "returnOnEquity"),
                MetricKey::new("ROA", "returnOnAssets"),
                MetricKey::new("OperatingMargin", "operatingMargins"),
            ],
            valuation: MetricKey::new("PE", "trailingPE"),
        }
    }
}

impl MetricCatalog {
    /// Metrics of one category, in configuration order.
    pub fn keys(&self, category: MetricCategory) -> &[MetricKey] {
        match category {
            MetricCategory::Risk => &self.risk,
            MetricCategory::Growth => &self.growth,
            MetricCategory::Quality => &self.quality,
            MetricCategory::Valuation => std::slice::from_ref(&self.valuation),
        }
    }

    /// Every metric with its category; the valuation target comes last.
    pub fn all(&self) -> Vec<(MetricCategory, &MetricKey)> {
        MetricCategory::SCORED
            .into_iter()
            .chain(std::iter::once(MetricCategory::Valuation))
            .flat_map(|category| self.keys(category).iter().map(move |key| (category, key)))
            .collect()
    }

    /// Every metric key, in the same order as [`Self::all`].
    pub fn metric_keys(&self) -> Vec<MetricKey> {
        self.all().into_iter().map(|(_, key)| key.clone()).collect()
    }

    /// Number of configured metrics.
    pub fn len(&self) -> usize {
        self.risk.len() + self.growth.len() + self.quality.len() + 1
    }

    /// A catalog always carries the valuation target.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Reject catalogs that would produce ambiguous columns.
    pub fn validate(&self) -> Result<()> {
        let reserved: Vec<&str> = MetricCategory::SCORED
            .iter()
            .filter_map(MetricCategory::score_column)
            .chain([SECTOR_COLUMN, TICKER_COLUMN])
            .collect();

        let mut seen = HashSet::new();
        for (category, key) in self.all() {
            if key.name.trim().is_empty() || key.field.trim().is_empty() {
                return Err(DataError::InvalidCatalog(format!(
                    "{category} metric has an empty name or field"
                )));
            }
            if reserved.contains(&key.name.as_str()) || key.name.ends_with(ZSCORE_SUFFIX) {
                return Err(DataError::InvalidCatalog(format!(
                    "metric name {} collides with a derived column",
                    key.name
                )));
            }
            if !seen.insert(key.name.as_str()) {
                return Err(DataError::InvalidCatalog(format!(
                    "metric {} is configured more than once",
                    key.name
                )));
            }
        }
        Ok(())
    }
}
