//! Server-computed per-category average spend
//!
//! Independent of the transaction loader: keyed only on the date range and
//! used verbatim, apart from splitting rows into expense and income tables.

use serde::Serialize;
use tracing::{info, warn};

use crate::api::{FinanceApi, Listing};
use crate::error::Result;
use crate::loader::{InFlight, LoadStatus};
use crate::models::{CategorySpendSummary, DateRange};

pub const MSG_NO_AVERAGE_DATA: &str = "No category spend data found for the selected period.";

/// Rows split by the `is_expense` flag, server order preserved
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AverageSpendTables {
    pub expense: Vec<CategorySpendSummary>,
    pub income: Vec<CategorySpendSummary>,
}

impl AverageSpendTables {
    pub fn split(rows: &[CategorySpendSummary]) -> Self {
        let (expense, income): (Vec<_>, Vec<_>) =
            rows.iter().cloned().partition(|row| row.is_expense);
        Self { expense, income }
    }

    pub fn is_empty(&self) -> bool {
        self.expense.is_empty() && self.income.is_empty()
    }

    /// Expense rows for the bar chart, largest total first
    pub fn expense_bars(&self) -> Vec<&CategorySpendSummary> {
        let mut bars: Vec<&CategorySpendSummary> = self.expense.iter().collect();
        bars.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
        bars
    }
}

/// What the average-spend section should show right now
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AverageSpendView {
    Idle,
    Loading,
    Failed { message: String },
    Empty,
    Ready { tables: AverageSpendTables },
}

/// Loader for the average-spend summary
pub struct AverageSpendFeed<A> {
    api: A,
    rows: Vec<CategorySpendSummary>,
    error: Option<String>,
    status: LoadStatus,
}

impl<A: FinanceApi> AverageSpendFeed<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            rows: Vec::new(),
            error: None,
            status: LoadStatus::Idle,
        }
    }

    pub fn rows(&self) -> &[CategorySpendSummary] {
        &self.rows
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// Fetch the summary for `range`, replacing the held rows
    ///
    /// A response that isn't a list counts as no data. On error the rows are
    /// cleared and the message is kept for display.
    pub async fn load(&mut self, range: &DateRange) -> Result<usize> {
        self.error = None;
        let in_flight = InFlight::begin(&mut self.status);

        match self.api.average_category_spend(range).await {
            Ok(listing) => {
                self.rows = match listing {
                    Listing::Items(rows) | Listing::Lossy { items: rows, .. } => rows,
                    Listing::Unrecognized(shape) => {
                        warn!("Average spend returned {}, treating as empty", shape);
                        Vec::new()
                    }
                };
                info!("Loaded average spend for {} categories ({})", self.rows.len(), range);
                in_flight.settle(LoadStatus::Loaded);
                Ok(self.rows.len())
            }
            Err(e) => {
                warn!("Average spend for {} failed: {}", range, e);
                self.rows.clear();
                self.error = Some(e.to_string());
                in_flight.settle(LoadStatus::Failed);
                Err(e)
            }
        }
    }

    pub fn view(&self) -> AverageSpendView {
        match self.status {
            LoadStatus::Idle => AverageSpendView::Idle,
            LoadStatus::Loading => AverageSpendView::Loading,
            LoadStatus::Failed => AverageSpendView::Failed {
                message: self
                    .error
                    .clone()
                    .unwrap_or_else(|| "Failed to fetch average spend data".to_string()),
            },
            LoadStatus::Loaded | LoadStatus::Partial if self.rows.is_empty() => {
                AverageSpendView::Empty
            }
            LoadStatus::Loaded | LoadStatus::Partial => AverageSpendView::Ready {
                tables: AverageSpendTables::split(&self.rows),
            },
        }
    }
}
