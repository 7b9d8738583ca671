#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sector-scores/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod assemble;
pub mod composite;
pub mod error;
pub mod filter;
pub mod scoring;
pub mod standardize;

pub use assemble::assemble;
pub use composite::composite_scores;
pub use error::{EngineError, Result};
pub use filter::{DEFAULT_OUTLIER_THRESHOLD, filter_outliers, project};
pub use scoring::{EmptyStage, ScoreOutcome, ScoringConfig, score_sector};
pub use standardize::{standardize_features, standardize_valuation};
