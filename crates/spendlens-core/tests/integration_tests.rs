//! Integration tests for spendlens-core
//!
//! These tests drive the loaders over real HTTP against the mock finance
//! server: pagination → aggregation → dashboard snapshot.

use chrono::NaiveDate;
use serde_json::json;
use spendlens_core::{
    fetch_all_pages,
    test_utils::{sample_average_spend, sample_categories, sample_transactions, txn, MockFinanceServer},
    AverageSpendView, Category, Config, Dashboard, DateRange, Error, HttpFinanceApi, LoadStatus,
    NoticeLevel, SpendingTrend, Transaction, TransactionLoader,
    TransactionType::{self, *},
};

fn january() -> DateRange {
    DateRange::parse(Some("2024-01-01"), Some("2024-01-31")).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
}

/// `n` Need records spread over January
fn ledger(n: usize) -> Vec<Transaction> {
    (0..n)
        .map(|i| {
            txn(
                &format!("t{}", i),
                TransactionType::Need,
                10.0,
                Some("food"),
                &format!("2024-01-{:02}", i % 28 + 1),
            )
        })
        .collect()
}

// =============================================================================
// Pagination over HTTP
// =============================================================================

#[tokio::test]
async fn test_pagination_stops_on_short_page() {
    let server = MockFinanceServer::builder().transactions(ledger(7)).start().await;
    let api = HttpFinanceApi::new(&server.url());

    let fetched = fetch_all_pages(&api, &january(), 3).await.unwrap();

    assert_eq!(fetched.transactions.len(), 7);
    assert_eq!(fetched.pages, 3);
    assert!(fetched.truncated.is_none());

    let requests = server.requests();
    let skips: Vec<usize> = requests.iter().map(|r| r.skip).collect();
    assert_eq!(skips, vec![0, 3, 6]);
    assert!(requests.iter().all(|r| r.limit == 3));
    assert!(requests
        .iter()
        .all(|r| r.start_date == "2024-01-01" && r.end_date == "2024-01-31"));
}

#[tokio::test]
async fn test_pagination_exact_multiple_needs_empty_page() {
    let server = MockFinanceServer::builder().transactions(ledger(6)).start().await;
    let api = HttpFinanceApi::new(&server.url());

    let fetched = fetch_all_pages(&api, &january(), 3).await.unwrap();

    assert_eq!(fetched.transactions.len(), 6);
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn test_pagination_with_wrapped_pages() {
    let server = MockFinanceServer::builder()
        .transactions(ledger(5))
        .wrap_items(true)
        .start()
        .await;
    let api = HttpFinanceApi::new(&server.url());

    let fetched = fetch_all_pages(&api, &january(), 2).await.unwrap();

    let ids: Vec<String> = fetched.transactions.iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids, vec!["t0", "t1", "t2", "t3", "t4"]);
}

#[tokio::test]
async fn test_range_filters_server_side() {
    let server = MockFinanceServer::builder().transactions(ledger(28)).start().await;
    let api = HttpFinanceApi::new(&server.url());
    let first_week = DateRange::parse(Some("2024-01-01"), Some("2024-01-07")).unwrap();

    let fetched = fetch_all_pages(&api, &first_week, 500).await.unwrap();

    assert_eq!(fetched.transactions.len(), 7);
    assert!(fetched
        .transactions
        .iter()
        .all(|t| t.day().is_some_and(|d| first_week.contains(d))));
}

#[tokio::test]
async fn test_bad_later_page_is_partial() {
    let server = MockFinanceServer::builder()
        .transactions(ledger(10))
        .bad_page_at(4)
        .start()
        .await;
    let mut loader = TransactionLoader::with_page_size(HttpFinanceApi::new(&server.url()), 4);

    let report = loader.load(&january()).await.unwrap();

    assert_eq!(report.status, LoadStatus::Partial);
    assert_eq!(loader.transactions().len(), 4);
    assert_eq!(report.notices[0].level, NoticeLevel::Warning);
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn test_bad_first_page_fails() {
    let server = MockFinanceServer::builder()
        .transactions(ledger(10))
        .bad_page_at(0)
        .start()
        .await;
    let mut loader = TransactionLoader::new(HttpFinanceApi::new(&server.url()));

    let err = loader.load(&january()).await.unwrap_err();

    assert!(matches!(err, Error::Shape(_)));
    assert_eq!(loader.status(), LoadStatus::Failed);
    assert!(loader.transactions().is_empty());
}

#[tokio::test]
async fn test_loose_records_kept_across_pages() {
    let server = MockFinanceServer::builder()
        .raw_transactions(vec![
            json!({"id": "a", "amount": 10.0, "type": "Need", "timestamp": "2024-01-02"}),
            json!({"id": "b", "amount": 5.0, "type": "Mystery", "timestamp": "2024-01-02"}),
            json!({"id": 3, "amount": null, "type": "Want", "timestamp": null}),
            json!({"id": "d", "amount": 7.5, "type": "Need", "category_id": 12, "timestamp": "2024-01-04"}),
        ])
        .start()
        .await;
    let mut loader = TransactionLoader::with_page_size(HttpFinanceApi::new(&server.url()), 2);

    let report = loader.load(&january()).await.unwrap();

    assert_eq!(report.status, LoadStatus::Loaded);
    let ids: Vec<&str> = loader.transactions().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "3", "d"]);
    // the first page was full before the bad record was dropped
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn test_token_from_config() {
    let server = MockFinanceServer::builder()
        .transactions(sample_transactions())
        .require_token("s3cret")
        .start()
        .await;

    let config = Config {
        api_url: server.url(),
        api_token: Some("s3cret".to_string()),
        ..Config::default()
    };
    let api = HttpFinanceApi::from_config(&config).unwrap();
    let mut loader = TransactionLoader::with_page_size(api, config.page_size);

    let report = loader.load(&january()).await.unwrap();
    assert_eq!(report.fetched, sample_transactions().len());

    let anonymous = HttpFinanceApi::new(&server.url());
    let err = fetch_all_pages(&anonymous, &january(), 10).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}

// =============================================================================
// Dashboard end to end
// =============================================================================

#[tokio::test]
async fn test_worked_example() {
    let server = MockFinanceServer::builder()
        .categories(vec![Category {
            id: "catA".to_string(),
            name: "Food".to_string(),
        }])
        .transactions(vec![
            txn("1", Need, 100.0, Some("catA"), "2024-01-01"),
            txn("2", Want, 50.0, Some("catA"), "2024-01-01"),
            txn("3", Income, 500.0, None, "2024-01-02"),
        ])
        .start()
        .await;
    let mut dashboard = Dashboard::new(HttpFinanceApi::new(&server.url()), 500, today());

    dashboard.load_categories().await;
    dashboard
        .refresh_inputs(Some("2024-01-01"), Some("2024-01-31"))
        .await;
    let snapshot = dashboard.snapshot();

    let slices: Vec<(&str, f64)> = snapshot
        .views
        .categories
        .slices
        .iter()
        .map(|s| (s.name.as_str(), s.amount))
        .collect();
    assert_eq!(slices, vec![("Food", 150.0)]);

    assert_eq!(snapshot.views.summary.income, 500.0);
    assert_eq!(snapshot.views.summary.expense, 150.0);
    assert_eq!(snapshot.views.summary.balance, 350.0);

    match &snapshot.views.trend {
        SpendingTrend::Insufficient { points } => {
            assert_eq!(points.len(), 1);
            assert_eq!(points[0].amount, 150.0);
        }
        other => panic!("expected insufficient trend, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dashboard_over_http() {
    let server = MockFinanceServer::builder()
        .categories(sample_categories())
        .transactions(sample_transactions())
        .average_spend(sample_average_spend())
        .start()
        .await;
    let mut dashboard = Dashboard::new(HttpFinanceApi::new(&server.url()), 3, today());

    dashboard.load_categories().await;
    dashboard.refresh().await;
    let snapshot = dashboard.snapshot();

    assert_eq!(snapshot.status, LoadStatus::Loaded);
    assert_eq!(snapshot.transaction_count, sample_transactions().len());
    assert!(snapshot.views.trend.is_plottable());

    // balance = income - (need + want) - investment
    let s = snapshot.views.summary;
    assert!((s.balance - (s.income - s.expense - s.investment)).abs() < 1e-9);

    match snapshot.average_spend {
        AverageSpendView::Ready { tables } => {
            assert_eq!(tables.expense.len(), 3);
            assert_eq!(tables.income.len(), 2);
        }
        other => panic!("expected ready average spend, got {:?}", other),
    }

    // 8 records at 3 per page
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn test_dashboard_unreachable_backend() {
    let mut dashboard = Dashboard::new(HttpFinanceApi::new("http://127.0.0.1:9"), 500, today());

    dashboard.load_categories().await;
    dashboard.refresh().await;
    let snapshot = dashboard.snapshot();

    assert_eq!(snapshot.status, LoadStatus::Failed);
    assert_eq!(snapshot.transaction_count, 0);
    assert!(matches!(snapshot.average_spend, AverageSpendView::Failed { .. }));
    // categories failed first, so no transaction request was made
    assert_eq!(snapshot.notices.len(), 1);
    assert_eq!(snapshot.notices[0].level, NoticeLevel::Error);
    assert!(snapshot.notices[0].message.contains("categories"));
}

#[tokio::test]
async fn test_dashboard_category_failure_skips_expenses() {
    let server = MockFinanceServer::builder()
        .transactions(sample_transactions())
        .average_spend(sample_average_spend())
        .fail_categories()
        .start()
        .await;
    let mut dashboard = Dashboard::new(HttpFinanceApi::new(&server.url()), 500, today());

    dashboard.load().await;
    let snapshot = dashboard.snapshot();

    assert_eq!(snapshot.status, LoadStatus::Failed);
    assert_eq!(snapshot.transaction_count, 0);
    assert!(server.requests().is_empty());
    assert!(matches!(snapshot.average_spend, AverageSpendView::Ready { .. }));
}
