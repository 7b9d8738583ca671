//! Multi-sector runs against in-memory adapters.

use approx::assert_abs_diff_eq;
use async_trait::async_trait;
use polars::prelude::*;
use rstest::rstest;
use sector_scores::data::{DataError, MetricCatalog, MetricKey, MetricSource, SectorResolver};
use sector_scores::output::SectorStatus;
use sector_scores::{
    PipelineConfig, PipelineError, SectorOutcome, SectorPipeline, SectorState, SkipReason,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Answers from a fixed table keyed by ticker; a field value of `None`
/// becomes a provider error.
#[derive(Default)]
struct TableSource {
    rows: HashMap<String, HashMap<String, Option<f64>>>,
}

impl TableSource {
    fn company(mut self, ticker: &str, fields: &[(&str, Option<f64>)]) -> Self {
        let values = fields.iter().map(|(f, v)| (f.to_string(), *v)).collect();
        self.rows.insert(ticker.to_string(), values);
        self
    }
}

#[async_trait]
impl MetricSource for TableSource {
    async fn fetch(&self, ticker: &str, field: &str) -> sector_scores::data::Result<Option<f64>> {
        match self.rows.get(ticker).and_then(|fields| fields.get(field)) {
            Some(Some(v)) => Ok(Some(*v)),
            Some(None) => Err(DataError::Http(format!("500 for {ticker}/{field}"))),
            None => Ok(None),
        }
    }
}

/// Fixed sector membership; unknown sectors fail. Records the call order.
#[derive(Default)]
struct TableResolver {
    sectors: HashMap<String, Vec<String>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl TableResolver {
    fn sector(mut self, key: &str, tickers: &[&str]) -> Self {
        self.sectors
            .insert(key.to_string(), tickers.iter().map(|t| t.to_string()).collect());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.stamps().into_iter().map(|(sector, _)| sector).collect()
    }

    fn stamps(&self) -> Vec<(String, Instant)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SectorResolver for TableResolver {
    async fn resolve(&self, sector: &str) -> sector_scores::data::Result<Vec<String>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((sector.to_string(), Instant::now()));
        }
        self.sectors
            .get(sector)
            .cloned()
            .ok_or_else(|| DataError::MissingData {
                symbol: sector.to_string(),
                reason: "unknown sector".to_string(),
            })
    }
}

fn catalog() -> MetricCatalog {
    MetricCatalog {
        risk: vec![MetricKey::new("Beta", "beta")],
        growth: vec![MetricKey::new("RevenueGrowth", "revenueGrowth")],
        quality: vec![MetricKey::new("ROE", "returnOnEquity")],
        valuation: MetricKey::new("PE", "trailingPE"),
    }
}

fn config(sectors: &[&str]) -> PipelineConfig {
    PipelineConfig {
        max_concurrent: 3,
        request_delay_secs: 0.0,
        sector_delay_secs: 0.0,
        request_timeout_secs: 5.0,
        sectors: sectors.iter().map(|s| s.to_string()).collect(),
        metrics: catalog(),
        ..PipelineConfig::default()
    }
}

fn fields(x: f64, pe: Option<f64>) -> Vec<(&'static str, Option<f64>)> {
    let mut out = vec![
        ("beta", Some(x)),
        ("revenueGrowth", Some(x * 0.1)),
        ("returnOnEquity", Some(1.0 - x * 0.05)),
    ];
    if let Some(pe) = pe {
        out.push(("trailingPE", Some(pe)));
    }
    out
}

fn source_with(prefix: &str, n: usize, source: TableSource) -> TableSource {
    (0..n).fold(source, |acc, i| {
        acc.company(&format!("{prefix}{i}"), &fields(i as f64, Some(10.0 + i as f64)))
    })
}

fn tickers(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

fn column_str(df: &DataFrame, name: &str) -> Vec<String> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect()
}

fn pipeline(
    config: PipelineConfig,
    source: TableSource,
    resolver: Arc<TableResolver>,
) -> SectorPipeline {
    SectorPipeline::new(config, Arc::new(source), resolver).unwrap()
}

#[tokio::test]
async fn test_empty_sector_is_skipped_not_fatal() {
    let energy = tickers("E", 4);
    let resolver = Arc::new(
        TableResolver::default()
            .sector("utilities", &[])
            .sector("energy", &energy.iter().map(String::as_str).collect::<Vec<_>>()),
    );
    let source = source_with("E", 4, TableSource::default());

    let output = pipeline(config(&["utilities", "energy"]), source, resolver)
        .run()
        .await
        .unwrap();

    assert_eq!(output.dataset.height(), 4);
    assert!(column_str(&output.dataset, "Sector").iter().all(|s| s == "energy"));
    assert_eq!(output.report.sectors.len(), 2);
    assert_eq!(
        output.report.sectors[0].status,
        SectorStatus::SkippedEmpty {
            reason: SkipReason::NoCompanies.to_string()
        }
    );
    assert_eq!(output.report.sectors[1].status, SectorStatus::Done { rows: 4 });
}

#[tokio::test]
async fn test_all_sectors_empty_is_an_error() {
    let resolver = Arc::new(TableResolver::default().sector("energy", &[]).sector("utilities", &[]));
    let result = pipeline(config(&["energy", "utilities"]), TableSource::default(), resolver)
        .run()
        .await;

    match result {
        Err(PipelineError::EmptyCombinedResult { sectors, report }) => {
            assert_eq!(sectors, 2);
            assert_eq!(report.sectors_with_data(), 0);
            assert_eq!(report.sectors.len(), 2);
        }
        other => panic!("expected EmptyCombinedResult, got {other:?}"),
    }
}

#[tokio::test]
async fn test_resolver_failure_counts_as_empty() {
    let resolver = Arc::new(TableResolver::default().sector("energy", &["E0", "E1", "E2"]));
    let source = source_with("E", 3, TableSource::default());
    let pipeline = pipeline(config(&["technology", "energy"]), source, resolver);

    let result = pipeline.run_sector("technology", None).await;
    assert_eq!(result.state(), SectorState::SkippedEmpty);
    assert!(matches!(
        result.outcome,
        SectorOutcome::SkippedEmpty(SkipReason::NoCompanies)
    ));

    let output = pipeline.run().await.unwrap();
    assert_eq!(output.dataset.height(), 3);
}

#[tokio::test]
async fn test_sectors_processed_in_configured_order() {
    let resolver = Arc::new(
        TableResolver::default()
            .sector("technology", &["T0", "T1", "T2"])
            .sector("energy", &["E0", "E1", "E2"])
            .sector("healthcare", &["H0", "H1", "H2"]),
    );
    let source = source_with("T", 3, source_with("E", 3, source_with("H", 3, TableSource::default())));

    let output = pipeline(
        config(&["technology", "energy", "healthcare"]),
        source,
        Arc::clone(&resolver),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(resolver.calls(), vec!["technology", "energy", "healthcare"]);
    let sectors = column_str(&output.dataset, "Sector");
    let mut order: Vec<String> = Vec::new();
    for s in sectors {
        if order.last() != Some(&s) {
            order.push(s);
        }
    }
    assert_eq!(order, vec!["technology", "energy", "healthcare"]);
}

#[tokio::test]
async fn test_metric_failure_keeps_company() {
    let symbols = tickers("F", 5);
    let resolver = Arc::new(
        TableResolver::default()
            .sector("financial-services", &symbols.iter().map(String::as_str).collect::<Vec<_>>()),
    );
    let mut broken = fields(2.0, Some(12.0));
    broken[0] = ("beta", None);
    let source = source_with("F", 5, TableSource::default()).company("F2", &broken);

    let output = pipeline(config(&["financial-services"]), source, resolver)
        .run()
        .await
        .unwrap();

    let mut kept = column_str(&output.dataset, "Ticker");
    kept.sort();
    assert_eq!(kept, symbols);
    assert_eq!(output.dataset.column("Risk_Score").unwrap().null_count(), 0);
}

#[tokio::test]
async fn test_sector_without_valuation_is_skipped() {
    let resolver = Arc::new(TableResolver::default().sector("real-estate", &["R0", "R1"]));
    let source = TableSource::default()
        .company("R0", &fields(1.0, None))
        .company("R1", &fields(2.0, None));
    let pipeline = pipeline(config(&["real-estate"]), source, resolver);

    let result = pipeline.run_sector("real-estate", None).await;
    assert_eq!(result.companies, 2);
    assert_eq!(result.rows(), 0);
    assert!(matches!(
        result.outcome,
        SectorOutcome::SkippedEmpty(SkipReason::NoValuation)
    ));
}

#[tokio::test]
async fn test_single_company_sector_filtered_out() {
    let resolver = Arc::new(TableResolver::default().sector("utilities", &["U0"]));
    let source = source_with("U", 1, TableSource::default());
    let pipeline = pipeline(config(&["utilities"]), source, resolver);

    let result = pipeline.run_sector("utilities", None).await;
    assert!(matches!(
        result.outcome,
        SectorOutcome::SkippedEmpty(SkipReason::AllFiltered)
    ));
}

#[tokio::test]
async fn test_output_columns_and_scores() {
    let resolver = Arc::new(TableResolver::default().sector("energy", &["E0", "E1"]));
    let source = source_with("E", 2, TableSource::default());

    let output = pipeline(config(&["energy"]), source, resolver).run().await.unwrap();
    let names: Vec<String> = output
        .dataset
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(
        names,
        vec!["Sector", "Ticker", "Risk_Score", "Growth_Score", "Quality_Score", "PE", "PE_ZScore"]
    );

    // Two companies standardize to -1 and +1.
    let pe_z: Vec<f64> = output
        .dataset
        .column("PE_ZScore")
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    let mut sorted = pe_z.clone();
    sorted.sort_by(f64::total_cmp);
    assert_abs_diff_eq!(sorted[0], -1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(sorted[1], 1.0, epsilon = 1e-12);
}

#[tokio::test(start_paused = true)]
async fn test_delay_before_each_sector() {
    let resolver = Arc::new(
        TableResolver::default()
            .sector("technology", &["T0", "T1"])
            .sector("energy", &["E0", "E1"])
            .sector("healthcare", &["H0", "H1"]),
    );
    let source = source_with("T", 2, source_with("E", 2, source_with("H", 2, TableSource::default())));
    let delay = Duration::from_secs(2);
    let mut cfg = config(&["technology", "energy", "healthcare"]);
    cfg.sector_delay_secs = delay.as_secs_f64();

    let start = Instant::now();
    let output = pipeline(cfg, source, Arc::clone(&resolver)).run().await.unwrap();
    assert_eq!(output.report.sectors_with_data(), 3);
    assert!(start.elapsed() >= delay * 3);

    let stamps = resolver.stamps();
    assert_eq!(stamps.len(), 3);
    assert!(stamps[0].1 - start >= delay);
    for pair in stamps.windows(2) {
        assert!(pair[1].1 - pair[0].1 >= delay, "{} resolved too soon", pair[1].0);
    }
}

#[tokio::test]
async fn test_configured_threshold_reaches_scoring() {
    let resolver = Arc::new(TableResolver::default().sector("energy", &["E0", "E1"]));
    let source = source_with("E", 2, TableSource::default());
    let mut cfg = config(&["energy"]);
    // Two companies score exactly -1 and +1.
    cfg.outlier_threshold = 0.5;
    let pipeline = pipeline(cfg, source, resolver);

    let result = pipeline.run_sector("energy", None).await;
    assert!(matches!(
        result.outcome,
        SectorOutcome::SkippedEmpty(SkipReason::AllFiltered)
    ));
}

#[rstest]
#[case(0, 0.0)]
#[case(2, -1.0)]
#[case(2, f64::NAN)]
fn test_invalid_config_rejected(#[case] max_concurrent: usize, #[case] delay: f64) {
    let mut cfg = config(&["energy"]);
    cfg.max_concurrent = max_concurrent;
    cfg.request_delay_secs = delay;
    let resolver = Arc::new(TableResolver::default());
    let result = SectorPipeline::new(cfg, Arc::new(TableSource::default()), resolver);
    assert!(matches!(result, Err(PipelineError::Config(_))));
}
