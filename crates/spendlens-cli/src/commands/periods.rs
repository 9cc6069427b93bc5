//! Quick period listing

use std::fmt::{self, Write};

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use spendlens_core::{default_range, Period};

use super::{print_json, render};

#[derive(Debug, Serialize)]
pub struct PeriodEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Every quick period resolved against `today`
pub fn period_entries(today: NaiveDate) -> Vec<PeriodEntry> {
    Period::ALL
        .iter()
        .map(|period| {
            let range = period.resolve(today);
            PeriodEntry {
                key: period.key(),
                label: period.label(),
                start_date: range.start(),
                end_date: range.end(),
            }
        })
        .collect()
}

pub fn cmd_periods(today: NaiveDate, json: bool) -> Result<()> {
    let entries = period_entries(today);
    if json {
        print_json(&entries)?;
    } else {
        print!("{}", render(|out| write_periods(out, &entries, today))?);
    }
    Ok(())
}

pub fn write_periods(out: &mut impl Write, entries: &[PeriodEntry], today: NaiveDate) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "📅 Quick Periods (today is {})", today)?;
    writeln!(
        out,
        "   ─────────────────────────────────────────────────────────────"
    )?;
    writeln!(out, "   {:15} {:15} {} to {}", "Key", "Label", "Start", "End")?;
    for entry in entries {
        writeln!(
            out,
            "   {:15} {:15} {} to {}",
            entry.key, entry.label, entry.start_date, entry.end_date
        )?;
    }
    writeln!(out)?;
    writeln!(out, "   Default (no --period): {}", default_range(today))
}
