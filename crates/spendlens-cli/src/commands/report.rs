//! Dashboard report and daily trend

use std::fmt::{self, Write};

use anyhow::{bail, Result};
use serde::Serialize;
use spendlens_core::{
    CategoryBreakdown, Config, Dashboard, DashboardSnapshot, DateRange, FinanceApi, LoadStatus,
    SpendingTrend, SummaryCards, TransactionLoader, TypeSlice, MIN_TREND_DAYS,
};

use super::{
    bar, format_currency, print_json, render, truncate, write_average_spend, BAR_WIDTH,
};

pub const MSG_NO_SPENDING: &str = "No spending recorded for the selected period.";
pub const MSG_TREND_NEEDS_DAYS: &str =
    "Requires spending on at least two different days in the selected period.";

const RULE: &str = "   ─────────────────────────────────────────────────────────────";

/// Load the full dashboard for `range` and print it
pub async fn cmd_report<A: FinanceApi + Clone>(
    api: A,
    config: &Config,
    range: DateRange,
    json: bool,
) -> Result<()> {
    let mut dashboard = Dashboard::new(api, config.page_size, super::today());
    dashboard.set_range(range);

    dashboard.load().await;
    let snapshot = dashboard.snapshot();

    for notice in &snapshot.notices {
        notice.log();
    }

    if json {
        print_json(&snapshot)?;
    } else {
        let symbol = &config.currency_symbol;
        print!("{}", render(|out| write_report(out, &snapshot, symbol))?);
    }

    if snapshot.status == LoadStatus::Failed {
        bail!("Transactions for {} could not be loaded", snapshot.range);
    }
    Ok(())
}

#[derive(Serialize)]
struct TrendOutput<'a> {
    range: DateRange,
    transaction_count: usize,
    trend: &'a SpendingTrend,
}

/// Load transactions for `range` and print the daily spending trend
pub async fn cmd_trend<A: FinanceApi>(
    api: A,
    config: &Config,
    range: DateRange,
    json: bool,
) -> Result<()> {
    let mut loader = TransactionLoader::with_page_size(api, config.page_size);
    let report = loader.load(&range).await;

    let notices = match &report {
        Ok(report) => report.notices.clone(),
        Err(e) => vec![spendlens_core::loader::load_error_notice(e)],
    };
    for notice in &notices {
        notice.log();
    }
    if let Err(e) = report {
        bail!("Transactions for {} could not be loaded: {}", range, e);
    }

    let trend = spendlens_core::spending_trend(loader.transactions());
    if json {
        print_json(&TrendOutput {
            range,
            transaction_count: loader.transactions().len(),
            trend: &trend,
        })?;
    } else {
        let symbol = &config.currency_symbol;
        print!("{}", render(|out| write_trend(out, &range, &trend, symbol))?);
    }
    Ok(())
}

/// Every dashboard section, in display order
pub fn write_report(out: &mut impl Write, snapshot: &DashboardSnapshot, symbol: &str) -> fmt::Result {
    write_summary(out, &snapshot.range, &snapshot.views.summary, symbol)?;
    write_categories(out, &snapshot.views.categories, symbol)?;
    write_type_breakdown(out, &snapshot.views.by_type, symbol)?;
    write_trend(out, &snapshot.range, &snapshot.views.trend, symbol)?;
    write_average_spend(out, &snapshot.range, &snapshot.average_spend, symbol)
}

pub fn write_summary(
    out: &mut impl Write,
    range: &DateRange,
    summary: &SummaryCards,
    symbol: &str,
) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "💰 Summary")?;
    writeln!(out, "   Period: {}", range)?;
    writeln!(out, "{}", RULE)?;
    for (label, amount) in [
        ("Income", summary.income),
        ("Expenses", summary.expense),
        ("Investments", summary.investment),
        ("Balance", summary.balance),
    ] {
        writeln!(out, "   {:12} {:>20}", label, format_currency(amount, symbol))?;
    }
    Ok(())
}

/// Spending by category, largest first; small slices get no percentage label
pub fn write_categories(
    out: &mut impl Write,
    breakdown: &CategoryBreakdown,
    symbol: &str,
) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "📊 Spending by Category")?;
    writeln!(out, "{}", RULE)?;

    if breakdown.is_empty() {
        return writeln!(out, "   {}", MSG_NO_SPENDING);
    }

    writeln!(out, "   {:25} │ {:>16} │ {:>6}", "Category", "Amount", "%")?;
    writeln!(out, "   ──────────────────────────┼──────────────────┼────────")?;
    for slice in &breakdown.slices {
        let label = if slice.shows_label() {
            format!("{:.1}%", slice.percentage)
        } else {
            String::new()
        };
        writeln!(
            out,
            "   {:25} │ {:>16} │ {:>6}",
            truncate(&slice.name, 25),
            format_currency(slice.amount, symbol),
            label
        )?;
    }
    writeln!(out, "   {:25} │ {:>16} │", "Total", format_currency(breakdown.total, symbol))
}

/// Need / Want / Investment shares of outflow
pub fn write_type_breakdown(out: &mut impl Write, slices: &[TypeSlice], symbol: &str) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "🧾 Spending by Type")?;
    writeln!(out, "{}", RULE)?;

    if slices.iter().all(|s| s.amount <= 0.0) {
        return writeln!(out, "   {}", MSG_NO_SPENDING);
    }

    for slice in slices {
        let label = if slice.percentage >= spendlens_core::MIN_LABEL_PERCENT {
            format!("{:.1}%", slice.percentage)
        } else {
            String::new()
        };
        writeln!(
            out,
            "   {:12} {:>16} {:>6}  {}",
            slice.kind.as_str(),
            format_currency(slice.amount, symbol),
            label,
            bar(slice.percentage, 100.0, BAR_WIDTH)
        )?;
    }
    Ok(())
}

/// Per-day outflow, or why there is no trend to show
pub fn write_trend(
    out: &mut impl Write,
    range: &DateRange,
    trend: &SpendingTrend,
    symbol: &str,
) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "📈 Daily Spending Trend")?;
    writeln!(out, "   Period: {}", range)?;
    writeln!(out, "{}", RULE)?;

    let points = match trend {
        SpendingTrend::Series { points } => points,
        SpendingTrend::Insufficient { points } => {
            writeln!(out, "   {}", MSG_TREND_NEEDS_DAYS)?;
            if !points.is_empty() {
                writeln!(out, "   ({} of {} days so far)", points.len(), MIN_TREND_DAYS)?;
            }
            return Ok(());
        }
    };

    let max = points.iter().map(|p| p.amount).fold(0.0, f64::max);
    for point in points {
        writeln!(
            out,
            "   {} {:>16}  {}",
            point.date,
            format_currency(point.amount, symbol),
            bar(point.amount, max, BAR_WIDTH)
        )?;
    }
    Ok(())
}
