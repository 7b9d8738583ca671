//! Per-company fetch results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One ticker and the value of every requested metric.
///
/// A value is either finite or missing; non-finite inputs are stored as
/// missing so a record never holds a partially computed number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Ticker symbol
    pub ticker: String,
    values: BTreeMap<String, Option<f64>>,
}

impl CompanyRecord {
    /// Create an empty record for a ticker.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            values: BTreeMap::new(),
        }
    }

    /// Store a metric value; `NaN` and infinities become missing.
    pub fn insert(&mut self, metric: impl Into<String>, value: Option<f64>) {
        self.values
            .insert(metric.into(), value.filter(|v| v.is_finite()));
    }

    /// Builder-style [`Self::insert`].
    pub fn with(mut self, metric: impl Into<String>, value: Option<f64>) -> Self {
        self.insert(metric, value);
        self
    }

    /// Value of a metric; `None` when missing or never requested.
    pub fn value(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied().flatten()
    }

    /// Whether the metric was requested for this company.
    pub fn contains(&self, metric: &str) -> bool {
        self.values.contains_key(metric)
    }

    /// Number of requested metrics that came back missing.
    pub fn missing_count(&self) -> usize {
        self.values.values().filter(|v| v.is_none()).count()
    }

    /// Iterate over `(metric, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_values_are_missing() {
        let record = CompanyRecord::new("AAPL")
            .with("PE", Some(f64::NAN))
            .with("Beta", Some(f64::INFINITY))
            .with("ROE", Some(0.25))
            .with("ROA", None);

        assert_eq!(record.value("PE"), None);
        assert_eq!(record.value("Beta"), None);
        assert_eq!(record.value("ROE"), Some(0.25));
        assert_eq!(record.value("ROA"), None);
        assert_eq!(record.missing_count(), 3);
        assert!(record.contains("ROA"));
        assert!(!record.contains("ProfitMargins"));
    }

    #[test]
    fn test_iter_is_name_ordered() {
        let record = CompanyRecord::new("XOM")
            .with("b", Some(2.0))
            .with("a", Some(1.0));
        let names: Vec<&str> = record.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
