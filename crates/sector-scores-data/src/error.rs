//! Error types for data operations.

use std::time::Duration;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while talking to the metric provider.
///
/// Inside the fetch scheduler every variant is recovered locally: a failed
/// `(ticker, metric)` unit degrades to a missing value and a failed company
/// is dropped from its batch.
#[derive(Debug, Error)]
pub enum DataError {
    /// Yahoo Finance API error
    #[error("Yahoo Finance API error: {0}")]
    YahooApi(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Missing data
    #[error("Missing data for {symbol}: {reason}")]
    MissingData {
        /// Symbol that was queried
        symbol: String,
        /// Reason for missing data
        reason: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rate limit error
    #[error("Rate limit exceeded, please retry after {retry_after_ms}ms")]
    RateLimit {
        /// Milliseconds to wait before retrying
        retry_after_ms: u64,
    },

    /// Provider call did not complete in time
    #[error("Request for {field} of {symbol} timed out after {elapsed:?}")]
    Timeout {
        /// Symbol that was queried
        symbol: String,
        /// Provider field that was requested
        field: String,
        /// Configured timeout
        elapsed: Duration,
    },

    /// Invalid symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Invalid metric configuration
    #[error("Invalid metric catalog: {0}")]
    InvalidCatalog(String),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Company task aborted before producing a record
    #[error("Task for {symbol} failed: {reason}")]
    Task {
        /// Symbol the task was assembling
        symbol: String,
        /// Join failure description
        reason: String,
    },
}
