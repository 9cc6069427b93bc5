//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `format` - Currency formatting and text bars
//! - `report` - Dashboard report and daily trend
//! - `averages` - Server-computed average spend per category
//! - `categories` - Category listing
//! - `periods` - Quick period listing
//! - `setup` - Shared setup (config layering, API client, date range resolution)
//!
//! Text output is built by `write_*` functions into any `fmt::Write` sink, so
//! tests can check what would be printed without capturing stdout.

pub mod averages;
pub mod categories;
pub mod format;
pub mod periods;
pub mod report;
pub mod setup;

// Re-export command functions for main.rs
pub use averages::*;
pub use categories::*;
pub use format::*;
pub use periods::*;
pub use report::*;
pub use setup::*;

/// Collect a section writer's output into a string
pub fn render<F>(section: F) -> Result<String, std::fmt::Error>
where
    F: FnOnce(&mut String) -> std::fmt::Result,
{
    let mut out = String::new();
    section(&mut out)?;
    Ok(out)
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
