#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sector-scores/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod record;
pub mod scheduler;
pub mod source;
pub mod universe;
pub mod yahoo;

pub use catalog::{MetricCatalog, MetricCategory, MetricKey, zscore_column};
pub use error::{DataError, Result};
pub use record::CompanyRecord;
pub use scheduler::{FetchScheduler, SchedulerConfig};
pub use source::{MetricSource, SectorResolver};
pub use universe::{Sector, StaticUniverse};
pub use yahoo::{YahooMetricSource, YahooSectorResolver};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
