//! Category listing

use std::fmt::{self, Write};

use anyhow::{Context, Result};
use spendlens_core::{load_categories, Category, FinanceApi};

use super::{print_json, render, truncate};

pub async fn cmd_categories<A: FinanceApi>(api: A, json: bool) -> Result<()> {
    let categories = load_categories(&api)
        .await
        .context("Failed to load categories")?;

    if json {
        print_json(&categories)?;
    } else {
        print!("{}", render(|out| write_categories_list(out, &categories))?);
    }
    Ok(())
}

pub fn write_categories_list(out: &mut impl Write, categories: &[Category]) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "🏷️  Categories ({})", categories.len())?;
    writeln!(
        out,
        "   ─────────────────────────────────────────────────────────────"
    )?;

    if categories.is_empty() {
        return writeln!(out, "   No categories found.");
    }

    for category in categories {
        writeln!(out, "   {:30} {}", truncate(&category.name, 30), category.id)?;
    }
    Ok(())
}
