//! Pipeline errors.

use crate::config::ConfigError;
use sector_scores_output::RunReport;
use thiserror::Error;

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Combining sector frames failed.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// No sector produced any row.
    #[error("no data collected from any of {sectors} sectors")]
    EmptyCombinedResult {
        /// Sectors attempted.
        sectors: usize,
        /// Outcome of every sector.
        report: Box<RunReport>,
    },
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
