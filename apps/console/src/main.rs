//! # TagCheck Console
//!
//! Runs one scripted verification through the scan engine and prints the
//! resulting report.
//!
//! ## Flow
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌────────────────┐   ┌──────────────┐
//! │  args    │──▶│ ScanConfig │──▶│ ScanEngine     │──▶│ report JSON  │
//! │          │   │ file + env │   │ order, place,  │   │ stdout +     │
//! │          │   │            │   │ sweep, settle  │   │ --export DIR │
//! └──────────┘   └────────────┘   └────────────────┘   └──────────────┘
//! ```
//!
//! ## Logging
//! - `RUST_LOG=debug` shows every detection
//! - Default: `info,tagcheck=debug`

mod error;
mod script;

use std::path::PathBuf;

use clap::Parser;
use tagcheck_core::VerificationReport;
use tagcheck_scan::{ScanConfig, ScanEngine};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::script::Scenario;

// =============================================================================
// Command Line
// =============================================================================

/// Command-line arguments for tagcheck-console
#[derive(Parser, Debug)]
#[command(name = "tagcheck-console")]
#[command(about = "Runs one scripted RFID package verification and prints the report")]
#[command(version)]
struct CliArgs {
    /// Scan config file (default: scan.toml in the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to write verification_report_<orderId>.json into
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Outcome the scripted package layout produces
    #[arg(short, long, value_enum, default_value_t = Scenario::Success)]
    scenario: Scenario,

    /// Order id for the report (default: AUTO_<timestamp>)
    #[arg(long)]
    order_id: Option<String>,
}

// =============================================================================
// Entry Point
// =============================================================================

/// Exit codes: clap usage errors 2, config errors 3, anything else 1.
#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_tracing();

    if let Err(e) = run(args).await {
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: CliArgs) -> Result<(), AppError> {
    let config = match args.config {
        Some(path) => ScanConfig::load(Some(path))?,
        None => ScanConfig::load_or_default(None),
    };
    info!(
        range = config.scanner.range,
        tick_ms = config.sweep.tick_ms,
        "Scan config loaded"
    );

    let engine = ScanEngine::new(&config);
    let report = script::run(&engine, args.scenario, args.order_id.as_deref()).await?;

    println!("{}", report.to_json_pretty()?);

    if let Some(dir) = args.export {
        let path = export_report(&report, dir)?;
        info!(path = %path.display(), "Report exported");
    }

    Ok(())
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tagcheck=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Writes `verification_report_<orderId>.json` into `dir`.
fn export_report(report: &VerificationReport, dir: PathBuf) -> Result<PathBuf, AppError> {
    let path = dir.join(report.export_file_name());
    let json = report.to_json_pretty()?;

    std::fs::create_dir_all(&dir)
        .and_then(|_| std::fs::write(&path, json))
        .map_err(|source| AppError::Export {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}
