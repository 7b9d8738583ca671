//! Yahoo Finance data providers.

pub mod quote_summary;
pub mod sectors;

pub use quote_summary::YahooMetricSource;
pub use sectors::YahooSectorResolver;

/// Browser-like user agent; Yahoo rejects the reqwest default.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)";

/// Map a non-success status to a provider error.
pub(crate) fn status_error(status: reqwest::StatusCode, url: &str) -> crate::DataError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        crate::DataError::RateLimit {
            retry_after_ms: 60_000,
        }
    } else {
        crate::DataError::Http(format!("{status} from {url}"))
    }
}
