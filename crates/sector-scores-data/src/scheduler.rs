//! Bounded-concurrency, rate-limited metric retrieval.
//!
//! Every `(company, metric)` pair is an independent unit of work. A unit
//! acquires a permit from the scheduler's capacity pool, waits the request
//! delay, calls the provider under a timeout and releases the permit when it
//! returns. A company's record is the join of its units; companies run as a
//! task group and are collected in completion order.

use crate::catalog::MetricKey;
use crate::error::{DataError, Result};
use crate::record::CompanyRecord;
use crate::source::MetricSource;
use futures::FutureExt;
use futures::future::join_all;
use indicatif::ProgressBar;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Default number of fetch units allowed in flight.
pub const DEFAULT_MAX_CONCURRENT: usize = 2;

/// Default wait inside a permit before each provider call.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Default upper bound on a single provider call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Scheduling parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Maximum number of units holding a permit at once (at least 1).
    pub max_concurrent: usize,
    /// Delay after acquiring a permit and before the provider call.
    pub request_delay: Duration,
    /// A provider call running longer than this is abandoned.
    pub request_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            request_delay: DEFAULT_REQUEST_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Fetch scheduler owning the capacity pool.
#[derive(Debug, Clone)]
pub struct FetchScheduler {
    pool: Arc<Semaphore>,
    config: SchedulerConfig,
}

impl FetchScheduler {
    /// Create a scheduler. A concurrency cap of zero is raised to one.
    pub fn new(mut config: SchedulerConfig) -> Self {
        config.max_concurrent = config.max_concurrent.max(1);
        Self {
            pool: Arc::new(Semaphore::new(config.max_concurrent)),
            config,
        }
    }

    /// Scheduling parameters in effect.
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Permits not currently held by a unit.
    pub fn available_permits(&self) -> usize {
        self.pool.available_permits()
    }

    /// Fetch every metric for every company.
    ///
    /// Returns one record per company whose task completed, in completion
    /// order. Repeated tickers are fetched once. Unit failures become missing
    /// values; a company whose task fails is logged and left out.
    pub async fn fetch_companies<S>(
        &self,
        source: Arc<S>,
        companies: &[String],
        metrics: &[MetricKey],
        progress: Option<&ProgressBar>,
    ) -> Vec<CompanyRecord>
    where
        S: MetricSource + ?Sized + 'static,
    {
        let metrics: Arc<[MetricKey]> = metrics.into();
        let mut seen = HashSet::new();
        let mut tasks = JoinSet::new();

        for ticker in companies {
            if !seen.insert(ticker.as_str()) {
                tracing::debug!(ticker = %ticker, "skipping repeated ticker");
                continue;
            }
            let unit = CompanyFetch {
                source: Arc::clone(&source),
                pool: Arc::clone(&self.pool),
                config: self.config.clone(),
                ticker: ticker.clone(),
                metrics: Arc::clone(&metrics),
            };
            tasks.spawn(unit.run());
        }

        if let Some(pb) = progress {
            pb.set_length(tasks.len() as u64);
            pb.set_position(0);
        }

        let mut records = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(record)) => {
                    tracing::debug!(
                        ticker = %record.ticker,
                        missing = record.missing_count(),
                        "company fetched"
                    );
                    if let Some(pb) = progress {
                        pb.set_message(record.ticker.clone());
                    }
                    records.push(record);
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "dropping company from batch");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "company task did not complete");
                }
            }
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        records
    }
}

/// Everything one company task owns.
struct CompanyFetch<S: ?Sized> {
    source: Arc<S>,
    pool: Arc<Semaphore>,
    config: SchedulerConfig,
    ticker: String,
    metrics: Arc<[MetricKey]>,
}

impl<S: MetricSource + ?Sized> CompanyFetch<S> {
    async fn run(self) -> Result<CompanyRecord> {
        let ticker = self.ticker.clone();
        AssertUnwindSafe(self.assemble())
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(DataError::Task {
                    symbol: ticker,
                    reason: panic_message(panic.as_ref()),
                })
            })
    }

    async fn assemble(&self) -> Result<CompanyRecord> {
        if self.ticker.trim().is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let units = self.metrics.iter().map(|key| self.fetch_unit(key));
        let values = join_all(units).await;

        let mut record = CompanyRecord::new(self.ticker.clone());
        for (key, value) in self.metrics.iter().zip(values) {
            record.insert(key.name.clone(), value);
        }
        Ok(record)
    }

    async fn fetch_unit(&self, key: &MetricKey) -> Option<f64> {
        // Released on drop, whichever way this unit exits.
        let _permit = match self.pool.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                tracing::error!(ticker = %self.ticker, metric = %key.name, error = %e, "capacity pool closed");
                return None;
            }
        };

        tokio::time::sleep(self.config.request_delay).await;

        let call = self.source.fetch(&self.ticker, &key.field);
        let result = match tokio::time::timeout(self.config.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(DataError::Timeout {
                symbol: self.ticker.clone(),
                field: key.field.clone(),
                elapsed: self.config.request_timeout,
            }),
        };

        match result {
            Ok(value) => value.filter(|v| v.is_finite()),
            Err(e) => {
                tracing::warn!(
                    ticker = %self.ticker,
                    metric = %key.name,
                    field = %key.field,
                    error = %e,
                    "metric fetch failed, treating as missing"
                );
                None
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panicked".to_string())
}
