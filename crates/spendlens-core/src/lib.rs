//! Spendlens Core Library
//!
//! Shared functionality for the Spendlens spending analytics tool:
//! - Finance API abstraction with an HTTP client and shape-tolerant decoding
//! - Paginated transaction loader with explicit load status
//! - Type totals, category spend and daily trend aggregations
//! - Server-computed average spend per category
//! - Quick period presets and date range validation
//! - Configuration from file and environment

pub mod aggregate;
pub mod api;
pub mod average;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod loader;
pub mod models;
pub mod notice;
pub mod period;

/// Test utilities including the mock finance API server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{
    category_spend, daily_trend, spending_trend, CategoryBreakdown, CategorySlice, DailySpend,
    SpendingTrend, TypeSlice, TypeTotals, MIN_LABEL_PERCENT, MIN_TREND_DAYS,
};
pub use api::{FinanceApi, Listing, PageRequest};
pub use average::{AverageSpendFeed, AverageSpendTables, AverageSpendView, MSG_NO_AVERAGE_DATA};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardSnapshot, DerivedViews, SummaryCards};
pub use error::{Error, Result};
pub use http::HttpFinanceApi;
pub use loader::{
    fetch_all_pages, load_categories, FetchedPages, LoadReport, LoadStatus, TransactionLoader,
};
pub use models::{Category, CategorySpendSummary, DateRange, Transaction, TransactionType};
pub use notice::{Notice, NoticeLevel};
pub use period::{default_range, Period};
