//! Sector scores CLI binary.
//!
//! Runs the sector pipeline and writes the combined dataset.

use clap::{Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use sector_scores::{PipelineConfig, PipelineError, SectorPipeline};
use sector_scores_data::{
    MetricCategory, MetricSource, Sector, SectorResolver, StaticUniverse, YahooMetricSource,
    YahooSectorResolver,
};
use sector_scores_output::{ExportFormat, write_dataset};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sector-scores")]
#[command(about = "Sector-relative risk, growth and quality scores", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every configured sector and write the combined dataset
    Run {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Only run these sectors (repeatable)
        #[arg(long = "sector")]
        sectors: Vec<String>,

        /// Output file
        #[arg(long, default_value = "sector_analysis.csv")]
        output: PathBuf,

        /// Output format (csv or json)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        /// Resolve sectors from the built-in constituent table
        #[arg(long)]
        offline_universe: bool,

        /// Override the concurrency cap
        #[arg(long)]
        max_concurrent: Option<usize>,

        /// Emit logs as JSON
        #[arg(long)]
        log_json: bool,
    },

    /// List sector keys
    Sectors,

    /// Show the metric catalog
    Metrics {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let result = match runtime() {
        Ok(rt) => rt.block_on(run()),
        Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Single-threaded runtime: fetch units interleave, they never run in parallel.
fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            sectors,
            output,
            format,
            offline_universe,
            max_concurrent,
            log_json,
        } => {
            init_logging(log_json);
            let mut config = load_config(config.as_deref())?;
            if !sectors.is_empty() {
                config.sectors = sectors;
            }
            if let Some(n) = max_concurrent {
                config.max_concurrent = n;
            }
            run_pipeline(config, &output, format, offline_universe).await?;
        }
        Commands::Sectors => list_sectors(),
        Commands::Metrics { config } => {
            let config = load_config(config.as_deref())?;
            show_metrics(&config);
        }
    }

    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    })
}

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .expect("valid template")
        .progress_chars("█▓░")
}

async fn run_pipeline(
    config: PipelineConfig,
    output: &Path,
    format: ExportFormat,
    offline_universe: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let source: Arc<dyn MetricSource> = Arc::new(YahooMetricSource::new()?);
    let resolver: Arc<dyn SectorResolver> = if offline_universe {
        Arc::new(StaticUniverse::new())
    } else {
        Arc::new(YahooSectorResolver::new()?)
    };

    let pipeline = SectorPipeline::new(config, source, resolver)?;
    tracing::info!(
        sectors = pipeline.config().sectors.len(),
        metrics = pipeline.config().metrics.len(),
        max_concurrent = pipeline.config().max_concurrent,
        "starting run"
    );

    let bars = MultiProgress::new();
    let sector_bar = bars.add(ProgressBar::new(0));
    sector_bar.set_style(bar_style(
        "{spinner:.green} sectors   [{bar:30.cyan/blue}] {pos}/{len} {msg}",
    ));
    sector_bar.enable_steady_tick(Duration::from_millis(100));
    let company_bar = bars.add(ProgressBar::new(0));
    company_bar.set_style(bar_style(
        "{spinner:.green} companies [{bar:30.cyan/blue}] {pos}/{len} {msg}",
    ));

    let result = pipeline
        .run_with_progress(Some(&sector_bar), Some(&company_bar))
        .await;
    company_bar.finish_and_clear();
    sector_bar.finish_and_clear();

    let output_data = match result {
        Ok(output_data) => output_data,
        Err(PipelineError::EmptyCombinedResult { sectors, report }) => {
            println!("{}", report.render());
            return Err(format!("no data collected from any of {sectors} sectors").into());
        }
        Err(e) => return Err(e.into()),
    };

    write_dataset(&output_data.dataset, output, format)?;
    println!("{}", output_data.report.render());
    println!(
        "Wrote {} rows to {}",
        output_data.dataset.height(),
        output.display()
    );

    Ok(())
}

fn list_sectors() {
    let universe = StaticUniverse::new();
    let counts = universe.sector_counts();

    println!("Sectors:");
    println!("========\n");
    for sector in Sector::all() {
        println!(
            "{:<24} {:<24} {:>4} built-in constituents",
            sector.key(),
            sector.name(),
            counts.get(&sector).copied().unwrap_or(0)
        );
    }
}

fn show_metrics(config: &PipelineConfig) {
    let catalog = &config.metrics;
    let categories = MetricCategory::SCORED
        .into_iter()
        .chain([MetricCategory::Valuation]);
    for category in categories {
        match category.score_column() {
            Some(column) => println!("{category} -> {column}"),
            None => println!("{category}"),
        }
        for key in catalog.keys(category) {
            println!("  {:<20} {}", key.name, key.field);
        }
    }
    println!("\nOutlier threshold: {}", config.outlier_threshold);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tokio::runtime::RuntimeFlavor;

    #[test]
    fn test_runtime_is_single_threaded() {
        let rt = runtime().unwrap();
        assert_eq!(rt.handle().runtime_flavor(), RuntimeFlavor::CurrentThread);
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
