//! Sector-by-sector orchestration.
//!
//! Each sector moves through
//! `Pending → Resolving → Fetching → Assembled → Scored → Filtered`
//! and ends as either `Done` or `SkippedEmpty`. Sectors run strictly one
//! after another with a fixed pause before each resolution; concurrency is
//! bounded only inside a sector's fetch step.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use indicatif::ProgressBar;
use polars::prelude::*;
use sector_scores_data::{CompanyRecord, FetchScheduler, MetricSource, SectorResolver};
use sector_scores_engine::{EmptyStage, EngineError, ScoreOutcome, assemble, score_sector};
use sector_scores_output::{RunReport, SectorStatus, SectorSummary};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Processing state of one sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorState {
    /// Not started.
    Pending,
    /// Asking the resolver for constituents.
    Resolving,
    /// Retrieving metrics.
    Fetching,
    /// Raw dataset built.
    Assembled,
    /// Z-scores and composites computed.
    Scored,
    /// Outlier filter applied.
    Filtered,
    /// Rows contributed.
    Done,
    /// Nothing contributed.
    SkippedEmpty,
}

impl fmt::Display for SectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Resolving => "resolving",
            Self::Fetching => "fetching",
            Self::Assembled => "assembled",
            Self::Scored => "scored",
            Self::Filtered => "filtered",
            Self::Done => "done",
            Self::SkippedEmpty => "skipped_empty",
        };
        f.write_str(name)
    }
}

/// Why a sector contributed no rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The resolver returned no companies, or failed.
    NoCompanies,
    /// No company record survived fetching.
    NoRows,
    /// No company has the valuation metric.
    NoValuation,
    /// The outlier filter removed every row.
    AllFiltered,
    /// Normalization failed.
    Failed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCompanies => f.write_str("no companies resolved"),
            Self::NoRows => f.write_str("no company data retrieved"),
            Self::NoValuation => f.write_str("no company has the valuation metric"),
            Self::AllFiltered => f.write_str("all rows removed as outliers"),
            Self::Failed(reason) => write!(f, "normalization failed: {reason}"),
        }
    }
}

/// Terminal outcome of one sector.
#[derive(Debug, Clone)]
pub enum SectorOutcome {
    /// Scored rows for the sector.
    Done(DataFrame),
    /// The sector contributes nothing.
    SkippedEmpty(SkipReason),
}

/// Result of running one sector.
#[derive(Debug, Clone)]
pub struct SectorResult {
    /// Sector identifier.
    pub sector: String,
    /// Companies the resolver returned.
    pub companies: usize,
    /// Terminal outcome.
    pub outcome: SectorOutcome,
}

impl SectorResult {
    /// Final state reached.
    pub const fn state(&self) -> SectorState {
        match self.outcome {
            SectorOutcome::Done(_) => SectorState::Done,
            SectorOutcome::SkippedEmpty(_) => SectorState::SkippedEmpty,
        }
    }

    /// Rows contributed.
    pub fn rows(&self) -> usize {
        match &self.outcome {
            SectorOutcome::Done(df) => df.height(),
            SectorOutcome::SkippedEmpty(_) => 0,
        }
    }

    fn summary(&self) -> SectorSummary {
        let status = match &self.outcome {
            SectorOutcome::Done(df) => SectorStatus::Done { rows: df.height() },
            SectorOutcome::SkippedEmpty(reason) => SectorStatus::SkippedEmpty {
                reason: reason.to_string(),
            },
        };
        SectorSummary {
            sector: self.sector.clone(),
            companies: self.companies,
            status,
        }
    }
}

/// Combined dataset and per-sector report of a run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Rows of every sector that produced data, in sector order.
    pub dataset: DataFrame,
    /// Outcome of every sector.
    pub report: RunReport,
}

/// Runs the configured sectors against a metric source and a resolver.
pub struct SectorPipeline {
    config: PipelineConfig,
    sector_delay: Duration,
    scheduler: FetchScheduler,
    source: Arc<dyn MetricSource>,
    resolver: Arc<dyn SectorResolver>,
}

impl fmt::Debug for SectorPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectorPipeline")
            .field("config", &self.config)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

fn transition(sector: &str, state: SectorState) {
    tracing::debug!(sector, %state, "sector state");
}

impl SectorPipeline {
    /// Create a pipeline after validating `config`.
    pub fn new(
        config: PipelineConfig,
        source: Arc<dyn MetricSource>,
        resolver: Arc<dyn SectorResolver>,
    ) -> Result<Self> {
        config.validate()?;
        let scheduler = FetchScheduler::new(config.scheduler()?);
        let sector_delay = config.sector_delay()?;
        Ok(Self {
            config,
            sector_delay,
            scheduler,
            source,
            resolver,
        })
    }

    /// Configuration in effect.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every configured sector.
    pub async fn run(&self) -> Result<PipelineOutput> {
        self.run_with_progress(None, None).await
    }

    /// Run every configured sector, advancing `sector_bar` once per sector
    /// and `company_bar` once per company.
    pub async fn run_with_progress(
        &self,
        sector_bar: Option<&ProgressBar>,
        company_bar: Option<&ProgressBar>,
    ) -> Result<PipelineOutput> {
        if let Some(pb) = sector_bar {
            pb.set_length(self.config.sectors.len() as u64);
        }

        let mut report = RunReport::new();
        let mut frames = Vec::new();

        for sector in &self.config.sectors {
            if let Some(pb) = sector_bar {
                pb.set_message(sector.clone());
            }
            tokio::time::sleep(self.sector_delay).await;

            let result = self.run_sector(sector, company_bar).await;
            report.push(result.summary());
            if let SectorOutcome::Done(df) = result.outcome {
                frames.push(df.lazy());
            }

            if let Some(pb) = sector_bar {
                pb.inc(1);
            }
        }

        if frames.is_empty() {
            tracing::error!(sectors = self.config.sectors.len(), "no data collected");
            return Err(PipelineError::EmptyCombinedResult {
                sectors: self.config.sectors.len(),
                report: Box::new(report),
            });
        }

        let dataset = concat(frames, UnionArgs::default())?.collect()?;
        tracing::info!(
            rows = dataset.height(),
            sectors = report.sectors_with_data(),
            "combined dataset ready"
        );
        Ok(PipelineOutput { dataset, report })
    }

    /// Run a single sector to its terminal state.
    pub async fn run_sector(&self, sector: &str, company_bar: Option<&ProgressBar>) -> SectorResult {
        transition(sector, SectorState::Pending);
        transition(sector, SectorState::Resolving);

        let companies = match self.resolver.resolve(sector).await {
            Ok(companies) => companies,
            Err(e) => {
                tracing::warn!(sector, error = %e, "sector resolution failed");
                Vec::new()
            }
        };
        tracing::info!(sector, companies = companies.len(), "sector resolved");

        let skipped = |reason: SkipReason| {
            tracing::warn!(sector, %reason, "sector skipped");
            transition(sector, SectorState::SkippedEmpty);
            SectorResult {
                sector: sector.to_string(),
                companies: companies.len(),
                outcome: SectorOutcome::SkippedEmpty(reason),
            }
        };

        if companies.is_empty() {
            return skipped(SkipReason::NoCompanies);
        }

        transition(sector, SectorState::Fetching);
        let catalog = &self.config.metrics;
        let records = self
            .scheduler
            .fetch_companies(
                Arc::clone(&self.source),
                &companies,
                &catalog.metric_keys(),
                company_bar,
            )
            .await;
        if records.is_empty() {
            return skipped(SkipReason::NoRows);
        }

        match self.normalize(sector, &records) {
            Ok(df) => {
                tracing::info!(sector, rows = df.height(), "sector scored");
                transition(sector, SectorState::Done);
                SectorResult {
                    sector: sector.to_string(),
                    companies: companies.len(),
                    outcome: SectorOutcome::Done(df),
                }
            }
            Err(Skip::Reason(reason)) => skipped(reason),
            Err(Skip::Engine(e)) => skipped(SkipReason::Failed(e.to_string())),
        }
    }

    fn normalize(
        &self,
        sector: &str,
        records: &[CompanyRecord],
    ) -> std::result::Result<DataFrame, Skip> {
        let catalog = &self.config.metrics;

        let raw = assemble(sector, records, catalog)?;
        transition(sector, SectorState::Assembled);

        match score_sector(&raw, catalog, &self.config.scoring())? {
            ScoreOutcome::Scored(df) => {
                transition(sector, SectorState::Scored);
                transition(sector, SectorState::Filtered);
                Ok(df)
            }
            ScoreOutcome::Empty(stage) => Err(Skip::Reason(SkipReason::from(stage))),
        }
    }
}

impl From<EmptyStage> for SkipReason {
    fn from(stage: EmptyStage) -> Self {
        match stage {
            EmptyStage::NoRows => Self::NoRows,
            EmptyStage::NoValuation => Self::NoValuation,
            EmptyStage::AllFiltered => Self::AllFiltered,
        }
    }
}

/// Early exit from normalization.
#[derive(Debug)]
enum Skip {
    Reason(SkipReason),
    Engine(EngineError),
}

impl From<EngineError> for Skip {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}
