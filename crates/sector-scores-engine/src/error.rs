//! Error types for the scoring engine.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised while assembling or scoring a sector dataset.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Polars DataFrame error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Outlier threshold is not a positive finite number
    #[error("Invalid outlier threshold: {0}")]
    InvalidThreshold(f64),
}
