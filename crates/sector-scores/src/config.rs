//! Pipeline configuration.
//!
//! Defaults reproduce the production run: eleven sectors, two requests in
//! flight, half a second between requests and one second between sectors.
//! Any field may be overridden from a TOML file.

use sector_scores_data::scheduler::SchedulerConfig;
use sector_scores_data::{DataError, MetricCatalog, Sector};
use sector_scores_engine::{DEFAULT_OUTLIER_THRESHOLD, ScoringConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// File that could not be read.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// TOML parse error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The metric catalog is inconsistent.
    #[error(transparent)]
    Catalog(#[from] DataError),
}

/// Everything the pipeline needs to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Maximum fetch units in flight within a sector.
    pub max_concurrent: usize,
    /// Seconds each fetch unit waits after acquiring capacity.
    pub request_delay_secs: f64,
    /// Seconds waited before resolving each sector.
    pub sector_delay_secs: f64,
    /// Seconds after which a provider call is abandoned.
    pub request_timeout_secs: f64,
    /// Absolute bound on composite scores and the valuation z-score.
    pub outlier_threshold: f64,
    /// Sector identifiers, processed in this order.
    pub sectors: Vec<String>,
    /// Metric catalog.
    pub metrics: MetricCatalog,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            request_delay_secs: 0.5,
            sector_delay_secs: 1.0,
            request_timeout_secs: 30.0,
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            sectors: Sector::all().iter().map(|s| s.key().to_string()).collect(),
            metrics: MetricCatalog::default(),
        }
    }
}

fn seconds(name: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| ConfigError::Invalid(format!("{name} must be a finite number >= 0, got {value}")))
}

impl PipelineConfig {
    /// Parse a TOML document; absent fields keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        self.request_delay()?;
        self.sector_delay()?;
        if self.request_timeout()?.is_zero() {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !self.outlier_threshold.is_finite() || self.outlier_threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "outlier_threshold must be positive, got {}",
                self.outlier_threshold
            )));
        }
        if self.sectors.is_empty() {
            return Err(ConfigError::Invalid("no sectors configured".to_string()));
        }
        if let Some(blank) = self.sectors.iter().position(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("sector #{blank} is blank")));
        }
        self.metrics.validate()?;
        Ok(())
    }

    /// Per-request delay.
    pub fn request_delay(&self) -> Result<Duration, ConfigError> {
        seconds("request_delay_secs", self.request_delay_secs)
    }

    /// Delay before each sector.
    pub fn sector_delay(&self) -> Result<Duration, ConfigError> {
        seconds("sector_delay_secs", self.sector_delay_secs)
    }

    /// Per-call timeout.
    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        seconds("request_timeout_secs", self.request_timeout_secs)
    }

    /// Fetch scheduler parameters.
    pub fn scheduler(&self) -> Result<SchedulerConfig, ConfigError> {
        Ok(SchedulerConfig {
            max_concurrent: self.max_concurrent,
            request_delay: self.request_delay()?,
            request_timeout: self.request_timeout()?,
        })
    }

    /// Scoring parameters.
    pub const fn scoring(&self) -> ScoringConfig {
        ScoringConfig {
            outlier_threshold: self.outlier_threshold,
        }
    }
}
