//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Spendlens - See where the money went
#[derive(Parser)]
#[command(name = "spendlens")]
#[command(about = "Spending analytics over a personal finance API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to <config dir>/spendlens/config.toml if present)
    #[arg(long, global = true, env = "SPENDLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Finance API base URL (overrides config and SPENDLENS_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token for the finance API
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Transactions requested per page
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Full dashboard: summary, categories, types, trend and average spend
    Report {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Daily spending trend
    Trend {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Server-computed average spend per category
    Averages {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// List categories
    Categories,

    /// List quick periods and the dates they cover today
    Periods,
}

/// Date range selection shared by the reporting commands
///
/// With neither a period nor dates, the range is the current month to date.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct RangeArgs {
    /// Quick period: yesterday, this-week, last-week, this-month, last-month,
    /// last-6-months, this-year, last-year (underscores accepted, last-day = yesterday)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub period: Option<String>,

    /// Start date (YYYY-MM-DD), requires --to
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD), requires --from
    #[arg(long)]
    pub to: Option<String>,
}
