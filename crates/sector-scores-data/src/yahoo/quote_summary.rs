//! Single-field lookups against the Yahoo Finance quote summary endpoint.

use crate::error::{DataError, Result};
use crate::source::MetricSource;
use async_trait::async_trait;
use serde_json::Value;

/// Default quote summary endpoint.
pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

/// Quote summary modules searched for a field, in order.
pub const MODULES: [&str; 4] = [
    "summaryDetail",
    "defaultKeyStatistics",
    "financialData",
    "price",
];

/// Yahoo Finance metric source.
///
/// Each call issues one request; rate limiting is the scheduler's job.
#[derive(Debug, Clone)]
pub struct YahooMetricSource {
    client: reqwest::Client,
    base_url: String,
}

impl YahooMetricSource {
    /// Create a source against the public endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a source against a custom endpoint (proxy, mirror).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(super::USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch the raw quote summary document for a symbol.
    pub async fn fetch_summary(&self, symbol: &str) -> Result<Value> {
        if symbol.trim().is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), symbol);
        let response = self
            .client
            .get(&url)
            .query(&[("modules", MODULES.join(","))])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(super::status_error(status, &url));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DataError::Parse(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MetricSource for YahooMetricSource {
    async fn fetch(&self, ticker: &str, field: &str) -> Result<Option<f64>> {
        let summary = self.fetch_summary(ticker).await?;
        extract_field(&summary, ticker, field)
    }
}

/// Look a field up in a quote summary document.
///
/// Yahoo reports numbers either bare or as `{"raw": 1.2, "fmt": "1.20"}`;
/// empty objects and nulls mean the value is not available.
pub fn extract_field(summary: &Value, symbol: &str, field: &str) -> Result<Option<f64>> {
    let root = summary
        .get("quoteSummary")
        .ok_or_else(|| DataError::Parse("response has no quoteSummary".to_string()))?;

    if let Some(error) = root.get("error").filter(|e| !e.is_null()) {
        let description = error
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(DataError::YahooApi(format!("{symbol}: {description}")));
    }

    let result = root
        .get("result")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .ok_or_else(|| DataError::MissingData {
            symbol: symbol.to_string(),
            reason: "empty quote summary".to_string(),
        })?;

    let value = MODULES
        .iter()
        .filter_map(|module| result.get(*module))
        .find_map(|module| module.get(field));

    Ok(value.and_then(numeric_value).filter(|v| v.is_finite()))
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(map) => map.get("raw").and_then(Value::as_f64),
        _ => None,
    }
}
