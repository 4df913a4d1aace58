//! SME Allotment - allotment-probability estimator for SME IPO applications.
//!
//! Reads the live HNI subscription report, estimates per-lot allotment odds
//! and prints the capital-constrained decision table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sme_common::config::{Config, EstimationMode};
use sme_common::logging::init_logging;
use sme_allotment::report::{render_history, render_live, render_report};
use sme_allotment::{AllotmentRequest, AllotmentService};

/// Estimate SME IPO allotment odds from HNI subscription data.
#[derive(Parser, Debug)]
#[command(name = "sme-allotment")]
#[command(version)]
#[command(about = "SME IPO HNI allotment predictor", long_about = None)]
struct Cli {
    /// Config file (default: ~/.sme-allotment/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the decision table for a capital budget
    Predict {
        /// Investment capital in rupees
        #[arg(short, long, default_value_t = 500_000)]
        capital: u64,

        /// HNI subscription multiple (overrides live data)
        #[arg(short, long)]
        subs: Option<f64>,

        /// IPO to estimate for (default: first live IPO)
        #[arg(short, long, default_value = "")]
        ipo: String,

        /// Estimation mode (heuristic, empirical)
        #[arg(short, long)]
        mode: Option<EstimationMode>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List IPOs in the live subscription report
    Live {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// List IPOs with historical allotment data
    History,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            let mut config = Config::load_from(path)?;
            config.apply_env_overrides();
            Ok(config)
        }
        None => Config::load_with_env(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_ref())?;

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    // Overrides are idempotent; the second pass reports rejected SME_* values
    // now that a subscriber is installed.
    config.apply_env_overrides();

    tracing::debug!("SME Allotment v{}", env!("CARGO_PKG_VERSION"));

    let service = AllotmentService::new(config).context("Failed to start allotment service")?;

    match cli.command {
        Commands::Predict {
            capital,
            subs,
            ipo,
            mode,
            json,
        } => {
            let request = AllotmentRequest {
                capital_budget: capital,
                subscription_override: subs,
                selected_ipo: ipo,
                mode,
            };
            let report = service.predict(&request);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(&report));
            }
        }
        Commands::Live { json } => {
            let records = service.live_subscriptions();
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print!("{}", render_live(&records));
            }
        }
        Commands::History => {
            print!("{}", render_history(service.ledger()));
        }
    }

    Ok(())
}
