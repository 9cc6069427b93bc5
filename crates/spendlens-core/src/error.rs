//! Error types for Spendlens

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Rejected before any I/O (missing, malformed or inverted dates, bad settings)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A response matched neither a bare list nor an `{ "items": [...] }` wrapper
    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether the error happened before any network call was attempted
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
