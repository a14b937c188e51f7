use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use voucher_link::config::{LoggingSettings, Settings};
use voucher_link::core::{EngineError, LinkEngine};
use voucher_link::services::{self, DatasetError, ReportError};

/// Link discounted hotel stays to restaurants that accept the meal voucher
#[derive(Debug, Parser)]
#[command(name = "voucher-link", version, about)]
struct Args {
    /// Hotel listings (.json or scraper .csv)
    #[arg(long, required_unless_present = "print_config")]
    hotels: Option<PathBuf>,

    /// Voucher restaurant directory (.json or scraper .csv)
    #[arg(long, required_unless_present = "print_config")]
    restaurants: Option<PathBuf>,

    /// Where to write the JSON match report
    #[arg(long, required_unless_present = "print_config")]
    output: Option<PathBuf>,

    /// Configuration file; defaults to config/default.toml and config/local.toml
    #[arg(long, env = "VLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Keep hotels without a match in the report
    #[arg(long)]
    include_unmatched: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

/// Errors that end a run without writing a report
#[derive(Debug, Error)]
enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let args = Args::parse();

    let settings = match load_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            init_logging(&LoggingSettings::default());
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&settings.logging);

    match run(&args, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run failed, no report written: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_settings(args: &Args) -> Result<Settings, AppError> {
    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    if args.include_unmatched {
        settings.aggregation.include_unmatched = true;
    }

    settings.validate()?;
    Ok(settings)
}

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

fn run(args: &Args, settings: Settings) -> Result<(), AppError> {
    if args.print_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    // clap enforces these unless --print-config was given
    let (Some(hotels_path), Some(restaurants_path), Some(output_path)) =
        (&args.hotels, &args.restaurants, &args.output)
    else {
        return Err(EngineError::Configuration(
            "--hotels, --restaurants and --output are required".to_string(),
        )
        .into());
    };

    info!("Starting voucher-link matching run...");

    let engine = LinkEngine::new(settings.engine_config())?;

    let hotels = services::load_hotels(hotels_path)?;
    let hotels = services::filter_country(hotels, settings.ingest.country_filter.as_deref());
    let restaurants = services::load_restaurants(restaurants_path)?;

    let report = engine.report(hotels, restaurants)?;

    services::write_report(&report, output_path)?;

    info!(
        "Linked {} of {} hotels ({} flagged for review)",
        report.summary.confident + report.summary.ambiguous,
        report.summary.total_hotels,
        report.summary.ambiguous
    );

    Ok(())
}
