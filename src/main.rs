//! Readmission Charts - hospital readmission bar charts
//!
//! Draws the frequency of primary diagnoses per age bracket and the
//! readmission rate per medical specialty, either in an interactive window
//! or as static SVG/PNG files.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Invalid configuration, or a chart failed to export

mod charts;
mod cli;
mod config;
mod data;
mod gui;
mod stats;

use anyhow::{Context, Result};
use charts::{ExportFormat, StaticChartRenderer};
use cli::{Args, Command};
use config::ChartConfig;
use data::{prepare_charts, DataSources, PipelineError};
use eframe::egui;
use gui::ReadmissionApp;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let args = Args::parse_args();
    init_logging(&args);
    debug!("Arguments: {:?}", args);

    let config = ChartConfig::load(args.config.as_deref())?;
    let sources = args.sources();

    match args.command() {
        Command::View => run_viewer(config, sources),
        Command::Export { out_dir, format } => run_export(&config, &sources, &out_dir, format),
        Command::Summary { pretty } => run_summary(&config, &sources, pretty),
    }
}

/// Initialize logging; `RUST_LOG` overrides the `-v`/`-q` level.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn run_viewer(config: ChartConfig, sources: DataSources) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 1000.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Readmission Charts"),
        ..Default::default()
    };

    eframe::run_native(
        "Readmission Charts",
        options,
        Box::new(|cc| Ok(Box::new(ReadmissionApp::new(cc, config, sources)))),
    )
    .map_err(|e| anyhow::anyhow!("Chart window failed: {}", e))
}

fn run_export(
    config: &ChartConfig,
    sources: &DataSources,
    out_dir: &Path,
    format: ExportFormat,
) -> Result<()> {
    let charts = prepare_charts(sources, &config.diagnosis.options());
    let outcomes = StaticChartRenderer::export_all(&charts, out_dir, format, config);

    let mut failed = charts.failure_count();
    for outcome in &outcomes {
        match &outcome.result {
            Ok(path) => println!("{}: {}", outcome.chart, path.display()),
            Err(e) => {
                error!("Could not export {}: {}", outcome.chart, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} chart(s) could not be produced", failed);
    }
    info!("Exported both charts to {}", out_dir.display());
    Ok(())
}

/// JSON form of one chart: its series, or why it is missing.
#[derive(Serialize)]
#[serde(untagged)]
enum ChartSummary<'a, T: Serialize> {
    Ready(&'a T),
    Failed { error: String },
}

impl<'a, T: Serialize> ChartSummary<'a, T> {
    fn from_result(result: &'a Result<T, PipelineError>) -> Self {
        match result {
            Ok(series) => ChartSummary::Ready(series),
            Err(e) => ChartSummary::Failed {
                error: e.to_string(),
            },
        }
    }
}

#[derive(Serialize)]
struct Summary<'a, D: Serialize, S: Serialize> {
    v6: ChartSummary<'a, D>,
    v7: ChartSummary<'a, S>,
}

fn run_summary(config: &ChartConfig, sources: &DataSources, pretty: bool) -> Result<()> {
    let charts = prepare_charts(sources, &config.diagnosis.options());
    let summary = Summary {
        v6: ChartSummary::from_result(&charts.diagnosis),
        v7: ChartSummary::from_result(&charts.specialty),
    };

    let json = if pretty {
        serde_json::to_string_pretty(&summary)
    } else {
        serde_json::to_string(&summary)
    }
    .context("Failed to serialize chart summary")?;
    println!("{}", json);
    Ok(())
}
