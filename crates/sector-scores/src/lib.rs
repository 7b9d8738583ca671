#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sector-scores/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod pipeline;

// Re-export main types from sub-crates
pub use sector_scores_data as data;
pub use sector_scores_engine as engine;
pub use sector_scores_output as output;

pub use config::{ConfigError, PipelineConfig};
pub use error::{PipelineError, Result};
pub use pipeline::{
    PipelineOutput, SectorOutcome, SectorPipeline, SectorResult, SectorState, SkipReason,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
