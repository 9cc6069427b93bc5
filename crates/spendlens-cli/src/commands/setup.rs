//! Shared command setup

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use spendlens_core::{default_range, Config, DateRange, HttpFinanceApi, Period};
use tracing::debug;

/// Flag values that override the file and environment config
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides<'a> {
    pub api_url: Option<&'a str>,
    pub token: Option<&'a str>,
    pub page_size: Option<usize>,
}

/// Load config (defaults → file → environment) and apply CLI flags on top
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides<'_>) -> Result<Config> {
    let mut config = Config::load(path).context("Failed to load configuration")?;

    if let Some(url) = overrides.api_url {
        config.api_url = url.to_string();
    }
    if let Some(token) = overrides.token {
        config.api_token = Some(token.to_string());
    }
    if let Some(page_size) = overrides.page_size {
        config.page_size = page_size;
    }
    config.validate().context("Invalid configuration")?;

    debug!(
        "Using API {} (page size {}, timeout {}s)",
        config.api_url, config.page_size, config.timeout_secs
    );
    Ok(config)
}

/// HTTP client for the configured finance API
pub fn connect(config: &Config) -> Result<HttpFinanceApi> {
    HttpFinanceApi::from_config(config).context("Failed to create finance API client")
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Resolve `--period` / `--from --to` into a validated range
///
/// Neither given means the current month to date.
pub fn resolve_range(
    period: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange> {
    if let Some(key) = period {
        let period: Period = key.parse()?;
        return Ok(period.resolve(today));
    }
    if from.is_none() && to.is_none() {
        return Ok(default_range(today));
    }
    DateRange::parse(from, to).context("Invalid date range (use --from YYYY-MM-DD --to YYYY-MM-DD)")
}
