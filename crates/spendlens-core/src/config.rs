//! Configuration
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! `SPENDLENS_*` environment variables. The CLI applies its own flags last.
//!
//! Default file location is `~/.config/spendlens/config.toml` (platform config dir):
//!
//! ```toml
//! api_url = "https://finance.example.com/api"
//! api_token = "..."
//! page_size = 500
//! timeout_secs = 30
//! currency_symbol = "₹"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Page size used by the transaction loader unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 500;

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub page_size: usize,
    pub timeout_secs: u64,
    pub currency_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

/// Raw file contents; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    api_url: Option<String>,
    api_token: Option<String>,
    page_size: Option<usize>,
    timeout_secs: Option<u64>,
    currency_symbol: Option<String>,
}

/// Default config file path (may not exist)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spendlens").join("config.toml"))
}

impl Config {
    /// Load defaults, the config file and the environment
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => Self::from_file(&default_path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file on top of the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(url) = raw.api_url {
            config.api_url = url;
        }
        if raw.api_token.is_some() {
            config.api_token = raw.api_token;
        }
        if let Some(size) = raw.page_size {
            config.page_size = size;
        }
        if let Some(timeout) = raw.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(symbol) = raw.currency_symbol {
            config.currency_symbol = symbol;
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply `SPENDLENS_API_URL`, `SPENDLENS_API_TOKEN` and `SPENDLENS_PAGE_SIZE`
    ///
    /// Takes a lookup function so tests don't have to touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SPENDLENS_API_URL").filter(|v| !v.is_empty()) {
            self.api_url = url;
        }
        if let Some(token) = lookup("SPENDLENS_API_TOKEN").filter(|v| !v.is_empty()) {
            self.api_token = Some(token);
        }
        if let Some(size) = lookup("SPENDLENS_PAGE_SIZE") {
            self.page_size = size.trim().parse().map_err(|_| {
                Error::Config(format!("SPENDLENS_PAGE_SIZE must be a number, got '{}'", size))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Validation("page_size must be at least 1".into()));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "api_url must start with http:// or https://, got '{}'",
                self.api_url
            )));
        }
        Ok(())
    }
}
