//! Spendlens CLI - Spending analytics over a personal finance API
//!
//! Usage:
//!   spendlens report                         Dashboard for this month to date
//!   spendlens report --period last-month     Dashboard for a quick period
//!   spendlens trend --from 2024-01-01 --to 2024-01-31
//!   spendlens averages --period this-year    Average spend per category
//!   spendlens categories                     List categories
//!   spendlens periods                        Show what each quick period covers

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // stdout is reserved for report output (and --json)
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let overrides = commands::ConfigOverrides {
        api_url: cli.api_url.as_deref(),
        token: cli.token.as_deref(),
        page_size: cli.page_size,
    };
    let connect = || -> Result<(spendlens_core::Config, spendlens_core::HttpFinanceApi)> {
        let config = commands::load_config(cli.config.as_deref(), &overrides)?;
        let api = commands::connect(&config)?;
        Ok((config, api))
    };

    match &cli.command {
        Commands::Report { range } => {
            let range = resolve(range)?;
            let (config, api) = connect()?;
            commands::cmd_report(api, &config, range, cli.json).await
        }
        Commands::Trend { range } => {
            let range = resolve(range)?;
            let (config, api) = connect()?;
            commands::cmd_trend(api, &config, range, cli.json).await
        }
        Commands::Averages { range } => {
            let range = resolve(range)?;
            let (config, api) = connect()?;
            commands::cmd_averages(api, &config, range, cli.json).await
        }
        Commands::Categories => {
            let (_, api) = connect()?;
            commands::cmd_categories(api, cli.json).await
        }
        Commands::Periods => commands::cmd_periods(commands::today(), cli.json),
    }
}

fn resolve(range: &RangeArgs) -> Result<spendlens_core::DateRange> {
    commands::resolve_range(
        range.period.as_deref(),
        range.from.as_deref(),
        range.to.as_deref(),
        commands::today(),
    )
}
