//! B3 Crawler CLI
//!
//! Local execution entry point. For AWS Lambda, use `b3-crawler-lambda`.

use std::path::PathBuf;

use b3_crawler::{
    error::Result,
    models::{Config, FullTable},
    pipeline::{self, RunReport},
    services::inspect_parquet,
    storage::LocalStorage,
};
use clap::{Parser, Subcommand};

/// B3 index composition crawler
#[derive(Parser, Debug)]
#[command(
    name = "b3-crawler",
    version,
    about = "Scrapes the B3 index composition table into Parquet"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape, encode and upload the table
    Run {
        /// Saved HTML pages to replay instead of opening a browser
        #[arg(long, num_args = 1..)]
        snapshots: Vec<PathBuf>,

        /// Write into this directory instead of the S3 bucket
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Object key (default: storage.key)
        #[arg(long)]
        key: Option<String>,
    },

    /// Scrape and write the Parquet file locally, without uploading
    Export {
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,

        /// Saved HTML pages to replay instead of opening a browser
        #[arg(long, num_args = 1..)]
        snapshots: Vec<PathBuf>,
    },

    /// Show the columns and row count of a Parquet file
    Inspect {
        file: PathBuf,
    },

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Blocking scrape job: snapshots when given, otherwise the live page.
fn scrape_job(
    config: Config,
    snapshots: Vec<PathBuf>,
) -> impl FnOnce() -> Result<FullTable> + Send + 'static {
    move || {
        if snapshots.is_empty() {
            scrape_live(&config)
        } else {
            pipeline::scrape_snapshots(&config, &snapshots)
        }
    }
}

#[cfg(feature = "chrome")]
fn scrape_live(config: &Config) -> Result<FullTable> {
    pipeline::scrape_live(config)
}

#[cfg(not(feature = "chrome"))]
fn scrape_live(_config: &Config) -> Result<FullTable> {
    Err(b3_crawler::error::AppError::config(
        "Built without the `chrome` feature; pass --snapshots",
    ))
}

#[cfg(feature = "s3")]
async fn run_to_bucket(config: &Config, snapshots: Vec<PathBuf>, key: &str) -> Result<RunReport> {
    pipeline::run_to_s3(scrape_job(config.clone(), snapshots), &config.storage, key).await
}

#[cfg(not(feature = "s3"))]
async fn run_to_bucket(_config: &Config, _snapshots: Vec<PathBuf>, _key: &str) -> Result<RunReport> {
    Err(b3_crawler::error::AppError::config(
        "Built without the `s3` feature; pass --output-dir",
    ))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("B3 Crawler starting...");

    let mut config = Config::load_or_default(&cli.config);
    config.apply_env_overrides();

    match cli.command {
        Command::Run {
            snapshots,
            output_dir,
            key,
        } => {
            config.validate()?;
            let key = key.unwrap_or_else(|| config.storage.key.clone());

            let report = match output_dir {
                Some(dir) => {
                    let storage = LocalStorage::new(dir);
                    pipeline::run_pipeline(scrape_job(config.clone(), snapshots), &storage, &key)
                        .await?
                }
                None => run_to_bucket(&config, snapshots, &key).await?,
            };

            let location = report.upload.into_result()?;
            log::info!("Stored {} records at {}", report.rows, location);
        }

        Command::Export { output, snapshots } => {
            config.validate()?;

            let table = tokio::task::spawn_blocking(scrape_job(config, snapshots)).await??;
            let size = pipeline::export_to_file(&table, &output)?;
            log::info!(
                "Exported {} records from {} page(s), {} bytes",
                table.len(),
                table.page_count,
                size
            );
        }

        Command::Inspect { file } => {
            let summary = inspect_parquet(&file)?;
            log::info!("File: {}", file.display());
            log::info!("Rows: {}", summary.rows);
            log::info!("Columns ({}):", summary.columns.len());
            for column in &summary.columns {
                log::info!("  - {}", column);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({})", config.scraper.source_url);
            if config.storage.bucket.trim().is_empty() {
                log::warn!("No bucket configured; `run` needs --output-dir");
            }

            log::info!("All validations passed!");
        }
    }

    log::info!("Done!");

    Ok(())
}
