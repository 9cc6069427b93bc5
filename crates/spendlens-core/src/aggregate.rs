//! Client-side aggregation over a loaded transaction set
//!
//! Three independent derivations:
//! - totals by transaction type (summary cards and the type breakdown)
//! - spending per category (Need/Want only, known categories only)
//! - spending per calendar day (Need/Want/Investment)

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::models::{Category, Transaction, TransactionType};

/// Slices below this share don't get a percentage label
pub const MIN_LABEL_PERCENT: f64 = 5.0;

/// A trend line needs at least this many distinct days
pub const MIN_TREND_DAYS: usize = 2;

/// Sums per transaction type
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TypeTotals {
    pub income: f64,
    pub need: f64,
    pub want: f64,
    pub investment: f64,
}

impl TypeTotals {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut totals = Self::default();
        for tx in transactions {
            if let Some(amount) = tx.finite_amount() {
                *totals.bucket_mut(tx.kind) += amount;
            }
        }
        totals
    }

    fn bucket_mut(&mut self, kind: TransactionType) -> &mut f64 {
        match kind {
            TransactionType::Income => &mut self.income,
            TransactionType::Need => &mut self.need,
            TransactionType::Want => &mut self.want,
            TransactionType::Investment => &mut self.investment,
        }
    }

    pub fn amount(&self, kind: TransactionType) -> f64 {
        match kind {
            TransactionType::Income => self.income,
            TransactionType::Need => self.need,
            TransactionType::Want => self.want,
            TransactionType::Investment => self.investment,
        }
    }

    /// Need + Want
    pub fn expense(&self) -> f64 {
        self.need + self.want
    }

    /// income − expense − investment
    pub fn balance(&self) -> f64 {
        self.income - self.expense() - self.investment
    }

    /// Need, Want and Investment buckets in fixed order (Income excluded)
    pub fn by_type(&self) -> Vec<TypeSlice> {
        let total: f64 = TransactionType::OUTFLOWS.iter().map(|k| self.amount(*k)).sum();
        TransactionType::OUTFLOWS
            .iter()
            .map(|kind| {
                let amount = self.amount(*kind);
                TypeSlice {
                    kind: *kind,
                    amount,
                    percentage: share(amount, total),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSlice {
    pub kind: TransactionType,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    pub category_id: String,
    pub name: String,
    pub amount: f64,
    pub percentage: f64,
}

impl CategorySlice {
    pub fn shows_label(&self) -> bool {
        self.percentage >= MIN_LABEL_PERCENT
    }
}

/// Spending by category, largest first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub slices: Vec<CategorySlice>,
    pub total: f64,
}

impl CategoryBreakdown {
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// Sum Need/Want spending into the known categories
///
/// Records with a non-positive amount, no category, or a category id that
/// isn't in `categories` are skipped. Only categories with a positive total
/// are returned; ties keep the category list order.
pub fn category_spend(transactions: &[Transaction], categories: &[Category]) -> CategoryBreakdown {
    let mut buckets: Vec<(&Category, f64)> = categories.iter().map(|c| (c, 0.0)).collect();
    let index: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect();

    for tx in transactions {
        if !tx.kind.is_expense() {
            continue;
        }
        let Some(amount) = tx.positive_amount() else {
            continue;
        };
        let Some(category_id) = tx.category_id.as_deref().filter(|id| !id.is_empty()) else {
            continue;
        };
        match index.get(category_id) {
            Some(&i) => buckets[i].1 += amount,
            None => debug!(
                "Transaction {} references unknown category {}",
                tx.id, category_id
            ),
        }
    }

    let mut spent: Vec<(&Category, f64)> = buckets.into_iter().filter(|(_, v)| *v > 0.0).collect();
    spent.sort_by(|a, b| b.1.total_cmp(&a.1));

    let total: f64 = spent.iter().map(|(_, v)| v).sum();
    let slices = spent
        .into_iter()
        .map(|(category, amount)| CategorySlice {
            category_id: category.id.clone(),
            name: category.name.clone(),
            amount,
            percentage: share(amount, total),
        })
        .collect();

    CategoryBreakdown { slices, total }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySpend {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Per-day outflow sums, ascending by date
///
/// Counts Need, Want and Investment records with a positive amount and a
/// timestamp that starts with a valid `YYYY-MM-DD` date.
pub fn daily_trend(transactions: &[Transaction]) -> Vec<DailySpend> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for tx in transactions {
        if !tx.kind.is_outflow() {
            continue;
        }
        let Some(amount) = tx.positive_amount() else {
            continue;
        };
        match tx.day() {
            Some(day) => *by_day.entry(day).or_insert(0.0) += amount,
            None => debug!("Transaction {} has no usable date: {:?}", tx.id, tx.timestamp),
        }
    }

    by_day
        .into_iter()
        .map(|(date, amount)| DailySpend { date, amount })
        .collect()
}

/// Trend line data, or the reason there isn't one
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SpendingTrend {
    Series { points: Vec<DailySpend> },
    /// Fewer than `MIN_TREND_DAYS` distinct days of spending
    Insufficient { points: Vec<DailySpend> },
}

impl SpendingTrend {
    pub fn from_points(points: Vec<DailySpend>) -> Self {
        if points.len() >= MIN_TREND_DAYS {
            Self::Series { points }
        } else {
            Self::Insufficient { points }
        }
    }

    pub fn points(&self) -> &[DailySpend] {
        match self {
            Self::Series { points } | Self::Insufficient { points } => points,
        }
    }

    pub fn is_plottable(&self) -> bool {
        matches!(self, Self::Series { .. })
    }
}

pub fn spending_trend(transactions: &[Transaction]) -> SpendingTrend {
    SpendingTrend::from_points(daily_trend(transactions))
}

fn share(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        amount / total * 100.0
    } else {
        0.0
    }
}
