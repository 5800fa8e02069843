use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use txn_dashboard::config::AppConfig;
use txn_dashboard::export::{write_json, ExportFormat};
use txn_dashboard::logging::init_logging;
use txn_dashboard::metrics::MetricsCollector;
use txn_dashboard::{DashboardService, FilterSpec};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Transactions CSV, overriding data.path from configuration
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Extra configuration file layered over config/default and config/local
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the KPI cards for the full dataset
    Summary,
    /// Print the category and location values the filters accept
    Options,
    /// Print every dashboard aggregate for a filter
    Aggregate {
        /// Product category to keep (repeatable)
        #[arg(short, long)]
        category: Vec<String>,

        /// Location to keep (repeatable)
        #[arg(short, long)]
        location: Vec<String>,

        /// Print only this zero-based page of the preview table
        #[arg(short, long)]
        page: Option<usize>,
    },
    /// Write the dashboard for a filter to a timestamped directory
    Export {
        /// Product category to keep (repeatable)
        #[arg(short, long)]
        category: Vec<String>,

        /// Location to keep (repeatable)
        #[arg(short, long)]
        location: Vec<String>,

        /// Output format (json or csv)
        #[arg(short, long)]
        format: Option<String>,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<String>,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load_from(cli.config.as_deref())?;
    if let Some(data) = &cli.data {
        config.data.path = data.display().to_string();
    }

    // Initialize logging
    let _log_guard = init_logging(
        Some(&config.logging.level),
        &config.logging.format,
        config.logging.file_path.as_deref().map(Path::new),
    )?;
    MetricsCollector::init()?;

    info!(data = %config.data.path, "Starting txn-dashboard");

    let mut service = DashboardService::load(&config)
        .with_context(|| format!("Failed to load dataset from {}", config.data.path))?;

    let stdout = std::io::stdout().lock();
    match cli.command {
        Commands::Summary => write_json(stdout, service.kpis())?,
        Commands::Options => write_json(stdout, service.filter_options())?,
        Commands::Aggregate {
            category,
            location,
            page,
        } => {
            let filter = FilterSpec::new(category, location);
            if let Some(page) = page {
                write_json(stdout, &service.preview_page(&filter, page)?)?;
            } else {
                write_json(stdout, &service.refresh(&filter)?)?;
            }
        }
        Commands::Export {
            category,
            location,
            format,
            output_dir,
        } => {
            let format: ExportFormat = format
                .as_deref()
                .unwrap_or(&config.export.default_format)
                .parse()?;
            let output_dir = output_dir.unwrap_or_else(|| config.export.output_directory.clone());
            let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();

            let filter = FilterSpec::new(category, location);
            let files = service.export(&filter, format, Path::new(&output_dir), &timestamp)?;
            info!("Exported {} {} files to {}", files.len(), format.as_str(), output_dir);
        }
    }

    info!(
        aggregations = service.metrics().aggregations_total,
        errors = service.metrics().errors_total,
        "Done"
    );
    Ok(())
}
