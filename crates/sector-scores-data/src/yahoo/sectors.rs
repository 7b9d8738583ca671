//! Sector membership from the Yahoo Finance sectors endpoint.

use crate::error::{DataError, Result};
use crate::source::SectorResolver;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;

/// Default sectors endpoint.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v1/finance/sectors";

/// Resolves a sector key (e.g. `"technology"`) to its top companies.
#[derive(Debug, Clone)]
pub struct YahooSectorResolver {
    client: reqwest::Client,
    base_url: String,
}

impl YahooSectorResolver {
    /// Create a resolver against the public endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a resolver against a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(super::USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl SectorResolver for YahooSectorResolver {
    async fn resolve(&self, sector: &str) -> Result<Vec<String>> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), sector);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(super::status_error(status, &url));
        }

        let body: Value = response.json().await?;
        parse_top_companies(&body)
    }
}

/// Extract `data.topCompanies[].symbol`, keeping order and dropping repeats.
pub fn parse_top_companies(body: &Value) -> Result<Vec<String>> {
    let companies = body
        .get("data")
        .and_then(|d| d.get("topCompanies"))
        .and_then(Value::as_array)
        .ok_or_else(|| DataError::Parse("response has no data.topCompanies".to_string()))?;

    let mut seen = HashSet::new();
    Ok(companies
        .iter()
        .filter_map(|c| c.get("symbol").and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_string()))
        .map(str::to_string)
        .collect())
}
