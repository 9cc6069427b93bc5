//! Dashboard state for one date range
//!
//! Ties the loaders together: categories first, then transactions and the
//! average-spend feed concurrently. When the category list fails to load the
//! transaction load is skipped and the held transactions are dropped; the
//! average-spend feed does not depend on categories and still loads.
//! Derived views are cached and only recomputed after the transactions or
//! categories are replaced.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregate::{
    category_spend, spending_trend, CategoryBreakdown, SpendingTrend, TypeSlice, TypeTotals,
};
use crate::api::FinanceApi;
use crate::average::{AverageSpendFeed, AverageSpendView};
use crate::loader::{load_categories, load_error_notice, LoadStatus, TransactionLoader, MSG_CATEGORIES_FAILED};
use crate::models::{Category, DateRange, Transaction};
use crate::notice::Notice;
use crate::period::{default_range, Period};

/// Headline numbers for the selected period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryCards {
    pub income: f64,
    pub expense: f64,
    pub investment: f64,
    pub balance: f64,
}

impl From<&TypeTotals> for SummaryCards {
    fn from(totals: &TypeTotals) -> Self {
        Self {
            income: totals.income,
            expense: totals.expense(),
            investment: totals.investment,
            balance: totals.balance(),
        }
    }
}

/// Everything computed locally from the held transactions and categories
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedViews {
    pub summary: SummaryCards,
    pub by_type: Vec<TypeSlice>,
    pub categories: CategoryBreakdown,
    pub trend: SpendingTrend,
}

impl DerivedViews {
    pub fn compute(transactions: &[Transaction], categories: &[Category]) -> Self {
        let totals = TypeTotals::from_transactions(transactions);
        Self {
            summary: SummaryCards::from(&totals),
            by_type: totals.by_type(),
            categories: category_spend(transactions, categories),
            trend: spending_trend(transactions),
        }
    }
}

/// Serializable picture of the whole dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub range: DateRange,
    pub status: LoadStatus,
    pub transaction_count: usize,
    #[serde(flatten)]
    pub views: DerivedViews,
    pub average_spend: AverageSpendView,
    pub notices: Vec<Notice>,
}

pub struct Dashboard<A> {
    range: DateRange,
    categories: Vec<Category>,
    categories_status: LoadStatus,
    transactions: TransactionLoader<A>,
    average: AverageSpendFeed<A>,
    views: Option<DerivedViews>,
    notices: Vec<Notice>,
}

impl<A: FinanceApi + Clone> Dashboard<A> {
    /// New dashboard over the default range (month to date)
    pub fn new(api: A, page_size: usize, today: NaiveDate) -> Self {
        Self {
            range: default_range(today),
            categories: Vec::new(),
            categories_status: LoadStatus::Idle,
            transactions: TransactionLoader::with_page_size(api.clone(), page_size),
            average: AverageSpendFeed::new(api),
            views: None,
            notices: Vec::new(),
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn set_range(&mut self, range: DateRange) {
        self.range = range;
    }

    /// Select a quick period and make it the current range
    pub fn select_period(&mut self, period: Period, today: NaiveDate) -> DateRange {
        self.range = period.resolve(today);
        debug!("Selected {} ({})", period.label(), self.range);
        self.range
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.transactions.transactions()
    }

    pub fn status(&self) -> LoadStatus {
        self.transactions.status()
    }

    pub fn is_loading(&self) -> bool {
        self.transactions.is_loading() || self.average.status() == LoadStatus::Loading
    }

    pub fn average_spend(&self) -> AverageSpendView {
        self.average.view()
    }

    /// Replace the category list; failure leaves it empty and adds a notice
    ///
    /// Until categories load again, `refresh` skips the transaction load.
    pub async fn load_categories(&mut self) {
        let api = self.transactions.api().clone();
        match load_categories(&api).await {
            Ok(categories) => {
                self.categories = categories;
                self.categories_status = LoadStatus::Loaded;
            }
            Err(e) => {
                warn!("Category load failed: {}", e);
                self.notices.push(Notice::error(MSG_CATEGORIES_FAILED));
                self.categories.clear();
                self.categories_status = LoadStatus::Failed;
            }
        }
        self.views = None;
    }

    /// Categories, then transactions and average spend for the current range
    pub async fn load(&mut self) {
        self.load_categories().await;
        self.refresh().await;
    }

    /// Validate raw date inputs, make them the current range and refresh
    ///
    /// Invalid input adds a notice and leaves the range and data untouched.
    pub async fn refresh_inputs(&mut self, start: Option<&str>, end: Option<&str>) {
        match DateRange::parse(start, end) {
            Ok(range) => {
                self.range = range;
                self.refresh().await;
            }
            Err(e) => {
                warn!("Rejected date range: {}", e);
                self.notices.push(load_error_notice(&e));
            }
        }
    }

    /// Load transactions and average spend for the current range, concurrently
    pub async fn refresh(&mut self) {
        let range = self.range;
        let average = if self.categories_status == LoadStatus::Failed {
            debug!("No categories, skipping transaction load for {}", range);
            self.transactions.discard(&range);
            self.average.load(&range).await
        } else {
            let (transactions, average) =
                tokio::join!(self.transactions.load(&range), self.average.load(&range));
            match transactions {
                Ok(report) => self.notices.extend(report.notices),
                Err(e) => self.notices.push(load_error_notice(&e)),
            }
            average
        };

        // The average-spend section shows its own inline error
        if let Err(e) = average {
            debug!("Average spend unavailable: {}", e);
        }
        self.views = None;
    }

    /// Derived views, recomputed only if the inputs changed since last call
    pub fn views(&mut self) -> &DerivedViews {
        let transactions = self.transactions.transactions();
        let categories = &self.categories;
        self.views
            .get_or_insert_with(|| DerivedViews::compute(transactions, categories))
    }

    /// Notices raised since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Snapshot for display; drains pending notices
    pub fn snapshot(&mut self) -> DashboardSnapshot {
        let views = self.views().clone();
        DashboardSnapshot {
            range: self.range,
            status: self.status(),
            transaction_count: self.transactions().len(),
            views,
            average_spend: self.average.view(),
            notices: self.take_notices(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Listing;
    use crate::loader::{MSG_BAD_FIRST_PAGE, MSG_INVALID_RANGE};
    use crate::models::TransactionType::*;
    use crate::notice::NoticeLevel;
    use crate::test_utils::{sample_average_spend, sample_categories, sample_transactions, txn, ScriptedApi};
    use std::sync::Arc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
    }

    fn scripted() -> ScriptedApi {
        ScriptedApi::new()
            .categories(Listing::Items(sample_categories()))
            .page(Listing::Items(sample_transactions()))
            .average_spend(Listing::Items(sample_average_spend()))
    }

    #[tokio::test]
    async fn test_full_refresh() {
        let api = Arc::new(scripted());
        let mut dashboard = Dashboard::new(api.clone(), 500, today());

        assert_eq!(dashboard.range().to_string(), "2024-01-01 to 2024-01-20");

        dashboard.load_categories().await;
        dashboard.refresh().await;

        assert_eq!(dashboard.status(), LoadStatus::Loaded);
        assert!(!dashboard.is_loading());

        let snapshot = dashboard.snapshot();
        assert_eq!(snapshot.transaction_count, sample_transactions().len());
        assert!(!snapshot.views.categories.is_empty());
        assert!(matches!(snapshot.average_spend, AverageSpendView::Ready { .. }));
        assert_eq!(snapshot.notices.len(), 1);
        assert_eq!(snapshot.notices[0].level, NoticeLevel::Success);

        // both loaders used the same range
        assert_eq!(api.page_requests()[0].range, dashboard.range());
        assert_eq!(api.average_requests(), vec![dashboard.range()]);

        // notices are drained
        assert!(dashboard.take_notices().is_empty());
    }

    #[tokio::test]
    async fn test_views_cached_until_reload() {
        let api = Arc::new(
            ScriptedApi::new()
                .categories(Listing::Items(sample_categories()))
                .page(Listing::Items(vec![txn("1", Need, 10.0, Some("food"), "2024-01-02")]))
                .page(Listing::Items(vec![txn("2", Need, 40.0, Some("food"), "2024-01-03")])),
        );
        let mut dashboard = Dashboard::new(api, 500, today());
        dashboard.load_categories().await;
        dashboard.refresh().await;

        assert_eq!(dashboard.views().summary.expense, 10.0);
        assert_eq!(dashboard.views().summary.expense, 10.0);

        dashboard.refresh().await;
        assert_eq!(dashboard.views().summary.expense, 40.0);
    }

    #[tokio::test]
    async fn test_category_failure_skips_transactions() {
        let api = Arc::new(
            ScriptedApi::new()
                .categories(Listing::Items(sample_categories()))
                .page(Listing::Items(sample_transactions()))
                .fail_categories()
                .page(Listing::Items(sample_transactions()))
                .average_spend(Listing::Items(sample_average_spend()))
                .average_spend(Listing::Items(sample_average_spend())),
        );
        let mut dashboard = Dashboard::new(api.clone(), 500, today());
        dashboard.load().await;
        assert!(!dashboard.transactions().is_empty());
        dashboard.take_notices();

        dashboard.load().await;

        assert!(dashboard.categories().is_empty());
        assert!(dashboard.transactions().is_empty());
        assert_eq!(dashboard.status(), LoadStatus::Failed);
        assert_eq!(api.page_requests().len(), 1);
        assert_eq!(api.average_requests().len(), 2);

        let snapshot = dashboard.snapshot();
        assert_eq!(snapshot.transaction_count, 0);
        assert_eq!(snapshot.views.summary.income, 0.0);
        assert!(matches!(snapshot.average_spend, AverageSpendView::Ready { .. }));
        assert_eq!(snapshot.notices, vec![Notice::error(MSG_CATEGORIES_FAILED)]);
    }

    #[tokio::test]
    async fn test_categories_recover_on_next_load() {
        let api = Arc::new(
            ScriptedApi::new()
                .fail_categories()
                .categories(Listing::Items(sample_categories()))
                .page(Listing::Items(sample_transactions())),
        );
        let mut dashboard = Dashboard::new(api.clone(), 500, today());

        dashboard.load().await;
        assert!(api.page_requests().is_empty());

        dashboard.load().await;
        assert_eq!(dashboard.status(), LoadStatus::Loaded);
        assert_eq!(dashboard.transactions().len(), sample_transactions().len());
    }

    #[tokio::test]
    async fn test_invalid_inputs_do_not_fetch() {
        let api = Arc::new(scripted());
        let mut dashboard = Dashboard::new(api.clone(), 500, today());
        let before = dashboard.range();

        dashboard
            .refresh_inputs(Some("2024-03-01"), Some("2024-02-01"))
            .await;

        assert_eq!(dashboard.range(), before);
        assert!(api.page_requests().is_empty());
        assert!(api.average_requests().is_empty());
        assert_eq!(dashboard.take_notices(), vec![Notice::error(MSG_INVALID_RANGE)]);
    }

    #[tokio::test]
    async fn test_transaction_failure_independent_of_average() {
        let api = Arc::new(
            ScriptedApi::new()
                .page(Listing::Unrecognized("string".into()))
                .average_spend(Listing::Items(sample_average_spend())),
        );
        let mut dashboard = Dashboard::new(api, 500, today());
        dashboard.refresh().await;

        assert_eq!(dashboard.status(), LoadStatus::Failed);
        assert!(matches!(dashboard.average_spend(), AverageSpendView::Ready { .. }));
        assert_eq!(dashboard.take_notices(), vec![Notice::error(MSG_BAD_FIRST_PAGE)]);
    }

    #[tokio::test]
    async fn test_select_period() {
        let api = Arc::new(scripted());
        let mut dashboard = Dashboard::new(api.clone(), 500, today());

        let range = dashboard.select_period(Period::LastMonth, today());
        dashboard.refresh().await;

        assert_eq!(range.to_string(), "2023-12-01 to 2023-12-31");
        assert_eq!(api.page_requests()[0].range, range);
    }
}
