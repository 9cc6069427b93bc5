//! Average spend per category

use std::fmt::{self, Write};

use anyhow::Result;
use serde::Serialize;
use spendlens_core::{
    AverageSpendFeed, AverageSpendTables, AverageSpendView, CategorySpendSummary, Config,
    DateRange, FinanceApi, MSG_NO_AVERAGE_DATA,
};
use tracing::error;

use super::{bar, format_currency, print_json, render, truncate, BAR_WIDTH};

#[derive(Serialize)]
struct AveragesOutput<'a> {
    range: DateRange,
    average_spend: &'a AverageSpendView,
}

/// Fetch and print the average-spend summary for `range`
///
/// A failed fetch is still rendered (as an inline error) before the command fails.
pub async fn cmd_averages<A: FinanceApi>(
    api: A,
    config: &Config,
    range: DateRange,
    json: bool,
) -> Result<()> {
    let mut feed = AverageSpendFeed::new(api);
    let result = feed.load(&range).await;
    let view = feed.view();

    if json {
        print_json(&AveragesOutput {
            range,
            average_spend: &view,
        })?;
    } else {
        let symbol = &config.currency_symbol;
        print!("{}", render(|out| write_average_spend(out, &range, &view, symbol))?);
    }

    if let Err(e) = result {
        error!("Average spend request failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}

pub fn write_average_spend(
    out: &mut impl Write,
    range: &DateRange,
    view: &AverageSpendView,
    symbol: &str,
) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "📐 Average Spend by Category")?;
    writeln!(out, "   Period: {}", range)?;
    writeln!(
        out,
        "   ─────────────────────────────────────────────────────────────"
    )?;

    match view {
        AverageSpendView::Idle => Ok(()),
        AverageSpendView::Loading => writeln!(out, "   Loading..."),
        AverageSpendView::Failed { message } => writeln!(out, "   Error: {}", message),
        AverageSpendView::Empty => writeln!(out, "   {}", MSG_NO_AVERAGE_DATA),
        AverageSpendView::Ready { tables } => write_tables(out, tables, symbol),
    }
}

fn write_tables(out: &mut impl Write, tables: &AverageSpendTables, symbol: &str) -> fmt::Result {
    if !tables.expense.is_empty() {
        writeln!(out, "   Expense categories")?;
        write_table(out, &tables.expense, symbol)?;

        let bars = tables.expense_bars();
        let max = bars.first().map(|r| r.total_amount).unwrap_or(0.0);
        writeln!(out)?;
        writeln!(out, "   Total spend")?;
        for row in bars {
            writeln!(
                out,
                "   {:20} {:>16}  {}",
                truncate(&row.category_name, 20),
                format_currency(row.total_amount, symbol),
                bar(row.total_amount, max, BAR_WIDTH)
            )?;
        }
    }

    if !tables.income.is_empty() {
        if !tables.expense.is_empty() {
            writeln!(out)?;
        }
        writeln!(out, "   Income categories")?;
        write_table(out, &tables.income, symbol)?;
    }
    Ok(())
}

fn write_table(out: &mut impl Write, rows: &[CategorySpendSummary], symbol: &str) -> fmt::Result {
    writeln!(
        out,
        "   {:20} │ {:>16} │ {:>5} │ {:>16}",
        "Category", "Total", "Count", "Average"
    )?;
    writeln!(
        out,
        "   ─────────────────────┼──────────────────┼───────┼─────────────────"
    )?;
    for row in rows {
        writeln!(
            out,
            "   {:20} │ {:>16} │ {:>5} │ {:>16}",
            truncate(&row.category_name, 20),
            format_currency(row.total_amount, symbol),
            row.expense_count,
            format_currency(row.average_amount, symbol)
        )?;
    }
    Ok(())
}
