//! # settlement-cli
//!
//! Batch settlement runner: sales JSON in, aggregate report JSON out.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Settlement Run                                 │
//! │                                                                         │
//! │  args ──► config (toml + env) ──► load sales / schedules                │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                      settlement-core BatchRun (rayon or sequential)     │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                      report JSON ──► --output file or stdout            │
//! │                                                                         │
//! │  Logs go to stderr so stdout stays clean JSON.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod args;
mod config;
mod error;
mod io;

use std::process;

use tracing::{error, info, info_span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use settlement_core::BatchRun;

use crate::args::{CliArgs, USAGE};
use crate::config::SettlementConfig;
use crate::error::CliResult;

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - ERROR: run failed
/// - WARN: rejected sales, ignored overrides
/// - INFO: files loaded, batch summary
/// - DEBUG: fallbacks taken per sale
///
/// ## Environment Variable
/// Set `RUST_LOG` to control log levels:
/// ```bash
/// RUST_LOG=debug settlement-cli --sales sales.json
/// RUST_LOG=settlement_core=debug,settlement_cli=info settlement-cli --sales sales.json
/// ```
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,settlement_core=info,settlement_cli=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: CliArgs) -> CliResult<()> {
    let mut config = SettlementConfig::load(args.config.clone())?;
    if args.sequential {
        config.batch.parallel = false;
    }
    if args.include_settlements {
        config.batch.include_settlements = true;
    }

    let sales = io::load_sales(&args.sales)?;
    let schedules = io::load_schedules(args.schedules.as_deref(), config.default_commission)?;

    info!(
        sales = sales.len(),
        schedules = schedules.len(),
        parallel = config.batch.parallel,
        "Starting settlement batch"
    );

    let batch = BatchRun::new(&schedules, &config.settlement)
        .keep_settlements(config.batch.include_settlements);
    let report = if config.batch.parallel {
        batch.run_parallel(&sales)
    } else {
        batch.run(&sales)
    };

    info!(
        revenue = report.totals.revenue,
        profit = report.totals.profit,
        margin_percent = report.totals.margin_percent,
        rejected = report.rejected.len(),
        "Batch totals"
    );

    io::write_json(&report, args.output.as_deref())
}

fn main() -> anyhow::Result<()> {
    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) if args.help => {
            println!("{}", USAGE);
            return Ok(());
        }
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    init_tracing();

    let run_id = Uuid::new_v4();
    let span = info_span!("settlement_run", %run_id);
    let _guard = span.enter();

    if let Err(e) = run(args) {
        error!(error = %e, "Settlement run failed");
        return Err(e.into());
    }

    Ok(())
}
