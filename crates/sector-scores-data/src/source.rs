//! Boundaries to the external metrics provider.

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Single-value lookup against a metrics provider.
///
/// Implementations may be slow, rate limited and unreliable. `Ok(None)`
/// means the provider answered but has no value for the field.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Fetch one provider field for one ticker.
    async fn fetch(&self, ticker: &str, field: &str) -> Result<Option<f64>>;
}

#[async_trait]
impl<T: MetricSource + ?Sized> MetricSource for Arc<T> {
    async fn fetch(&self, ticker: &str, field: &str) -> Result<Option<f64>> {
        (**self).fetch(ticker, field).await
    }
}

/// Sector membership lookup.
#[async_trait]
pub trait SectorResolver: Send + Sync {
    /// Tickers belonging to a sector, in provider order. May be empty.
    async fn resolve(&self, sector: &str) -> Result<Vec<String>>;
}

#[async_trait]
impl<T: SectorResolver + ?Sized> SectorResolver for Arc<T> {
    async fn resolve(&self, sector: &str) -> Result<Vec<String>> {
        (**self).resolve(sector).await
    }
}
