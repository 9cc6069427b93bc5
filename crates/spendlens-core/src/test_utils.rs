//! Test utilities for spendlens-core
//!
//! Two fakes for the finance backend: `ScriptedApi`, an in-memory
//! `FinanceApi` that replays queued responses, and `MockFinanceServer`, a
//! real HTTP server for exercising `HttpFinanceApi` end to end.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::api::{FinanceApi, Listing, PageRequest};
use crate::error::{Error, Result};
use crate::models::{
    Category, CategorySpendSummary, DateRange, Transaction, TransactionType, DATE_FORMAT,
};

/// Build a transaction with the fields the aggregations care about
pub fn txn(
    id: &str,
    kind: TransactionType,
    amount: f64,
    category_id: Option<&str>,
    timestamp: &str,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        amount: Some(amount),
        category_id: category_id.map(str::to_string),
        kind,
        timestamp: timestamp.to_string(),
        description: None,
    }
}

pub fn summary(
    id: &str,
    name: &str,
    total: f64,
    count: i64,
    is_expense: bool,
) -> CategorySpendSummary {
    CategorySpendSummary {
        category_id: id.to_string(),
        category_name: name.to_string(),
        total_amount: total,
        expense_count: count,
        average_amount: if count > 0 { total / count as f64 } else { 0.0 },
        is_expense,
    }
}

/// A small January 2024 ledger touching every transaction type
pub fn sample_transactions() -> Vec<Transaction> {
    use crate::models::TransactionType::*;
    vec![
        txn("t1", Income, 50000.0, Some("salary"), "2024-01-01T09:00:00Z"),
        txn("t2", Need, 15000.0, Some("rent"), "2024-01-02T10:00:00Z"),
        txn("t3", Need, 1200.5, Some("food"), "2024-01-03T13:30:00Z"),
        txn("t4", Want, 2500.0, Some("fun"), "2024-01-03T20:15:00Z"),
        txn("t5", Investment, 10000.0, Some("sip"), "2024-01-05T08:00:00Z"),
        txn("t6", Want, 799.0, Some("food"), "2024-01-07T19:45:00Z"),
        txn("t7", Need, 340.0, Some("transport"), "2024-01-08"),
        txn("t8", Income, 2000.0, Some("interest"), "2024-01-10"),
    ]
}

pub fn sample_categories() -> Vec<Category> {
    [
        ("salary", "Salary"),
        ("rent", "Rent"),
        ("food", "Food"),
        ("fun", "Entertainment"),
        ("sip", "Mutual Funds"),
        ("transport", "Transport"),
        ("interest", "Interest"),
    ]
    .into_iter()
    .map(|(id, name)| Category {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

pub fn sample_average_spend() -> Vec<CategorySpendSummary> {
    vec![
        summary("food", "Food", 1999.5, 2, true),
        summary("rent", "Rent", 15000.0, 1, true),
        summary("fun", "Entertainment", 2500.0, 1, true),
        summary("salary", "Salary", 50000.0, 1, false),
        summary("interest", "Interest", 2000.0, 1, false),
    ]
}

enum Scripted<T> {
    Respond(Listing<T>),
    Fail,
}

/// In-memory `FinanceApi` replaying queued responses per endpoint
///
/// Each call pops the next entry for its endpoint; an exhausted queue
/// answers with an empty list. Requests are recorded for assertions.
#[derive(Default)]
pub struct ScriptedApi {
    pages: Mutex<VecDeque<Scripted<Transaction>>>,
    categories: Mutex<VecDeque<Scripted<Category>>>,
    average_spend: Mutex<VecDeque<Scripted<CategorySpendSummary>>>,
    page_requests: Mutex<Vec<PageRequest>>,
    average_requests: Mutex<Vec<DateRange>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, listing: Listing<Transaction>) -> Self {
        self.pages.lock().unwrap().push_back(Scripted::Respond(listing));
        self
    }

    pub fn fail_page(self) -> Self {
        self.pages.lock().unwrap().push_back(Scripted::Fail);
        self
    }

    pub fn categories(self, listing: Listing<Category>) -> Self {
        self.categories
            .lock()
            .unwrap()
            .push_back(Scripted::Respond(listing));
        self
    }

    pub fn fail_categories(self) -> Self {
        self.categories.lock().unwrap().push_back(Scripted::Fail);
        self
    }

    pub fn average_spend(self, listing: Listing<CategorySpendSummary>) -> Self {
        self.average_spend
            .lock()
            .unwrap()
            .push_back(Scripted::Respond(listing));
        self
    }

    pub fn fail_average_spend(self) -> Self {
        self.average_spend.lock().unwrap().push_back(Scripted::Fail);
        self
    }

    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.page_requests.lock().unwrap().clone()
    }

    pub fn average_requests(&self) -> Vec<DateRange> {
        self.average_requests.lock().unwrap().clone()
    }
}

fn next<T>(queue: &Mutex<VecDeque<Scripted<T>>>, endpoint: &str) -> Result<Listing<T>> {
    match queue.lock().unwrap().pop_front() {
        Some(Scripted::Respond(listing)) => Ok(listing),
        Some(Scripted::Fail) => Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            format!("scripted failure: {}", endpoint),
        ))),
        None => Ok(Listing::Items(Vec::new())),
    }
}

#[async_trait]
impl FinanceApi for ScriptedApi {
    async fn list_transactions(&self, page: &PageRequest) -> Result<Listing<Transaction>> {
        self.page_requests.lock().unwrap().push(*page);
        next(&self.pages, "expenses")
    }

    async fn list_categories(&self) -> Result<Listing<Category>> {
        next(&self.categories, "categories")
    }

    async fn average_category_spend(
        &self,
        range: &DateRange,
    ) -> Result<Listing<CategorySpendSummary>> {
        self.average_requests.lock().unwrap().push(*range);
        next(&self.average_spend, "average-category-spend")
    }
}

/// Query parameters received by the mock `/expenses` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedPage {
    pub start_date: String,
    pub end_date: String,
    pub skip: usize,
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    start_date: String,
    end_date: String,
}

#[derive(Default)]
struct MockData {
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
    average_spend: Vec<CategorySpendSummary>,
    raw_transactions: Option<Vec<Value>>,
    categories_down: bool,
    wrap_items: bool,
    token: Option<String>,
    bad_page_at: Option<usize>,
    requests: Mutex<Vec<RecordedPage>>,
}

type SharedData = Arc<MockData>;

/// Builder for `MockFinanceServer`
#[derive(Default)]
pub struct MockFinanceServerBuilder {
    data: MockData,
}

impl MockFinanceServerBuilder {
    pub fn transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.data.transactions = transactions;
        self
    }

    pub fn categories(mut self, categories: Vec<Category>) -> Self {
        self.data.categories = categories;
        self
    }

    pub fn average_spend(mut self, rows: Vec<CategorySpendSummary>) -> Self {
        self.data.average_spend = rows;
        self
    }

    /// Serve these JSON records from `/expenses` as-is, ignoring the date range
    pub fn raw_transactions(mut self, records: Vec<Value>) -> Self {
        self.data.raw_transactions = Some(records);
        self
    }

    /// Answer `/categories` with a 500
    pub fn fail_categories(mut self) -> Self {
        self.data.categories_down = true;
        self
    }

    /// Answer every listing with `{"items": [...]}` instead of a bare array
    pub fn wrap_items(mut self, wrap: bool) -> Self {
        self.data.wrap_items = wrap;
        self
    }

    /// Reject requests without `Authorization: Bearer <token>`
    pub fn require_token(mut self, token: &str) -> Self {
        self.data.token = Some(token.to_string());
        self
    }

    /// Answer the `/expenses` request at this offset with a non-list body
    pub fn bad_page_at(mut self, skip: usize) -> Self {
        self.data.bad_page_at = Some(skip);
        self
    }

    /// Start the mock server on an available port
    pub async fn start(self) -> MockFinanceServer {
        let data: SharedData = Arc::new(self.data);
        let app = Router::new()
            .route("/expenses", get(handle_expenses))
            .route("/categories", get(handle_categories))
            .route(
                "/analytics/average-category-spend",
                get(handle_average_spend),
            )
            .with_state(data.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        MockFinanceServer {
            addr,
            data,
            shutdown_tx: Some(shutdown_tx),
        }
    }
}

/// Mock finance API server for integration tests
pub struct MockFinanceServer {
    addr: SocketAddr,
    data: SharedData,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockFinanceServer {
    pub fn builder() -> MockFinanceServerBuilder {
        MockFinanceServerBuilder::default()
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// `/expenses` requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedPage> {
        self.data.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockFinanceServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn authorized(data: &MockData, headers: &HeaderMap) -> bool {
    let Some(token) = &data.token else {
        return true;
    };
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == format!("Bearer {}", token))
        .unwrap_or(false)
}

fn listing_body<T: Serialize>(data: &MockData, items: &[T]) -> Value {
    if data.wrap_items {
        json!({ "items": items })
    } else {
        json!(items)
    }
}

fn parse_day(value: &str) -> std::result::Result<NaiveDate, StatusCode> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)
}

/// Transactions in the range, sliced by skip/limit
async fn handle_expenses(
    State(data): State<SharedData>,
    headers: HeaderMap,
    Query(page): Query<RecordedPage>,
) -> std::result::Result<Json<Value>, StatusCode> {
    if !authorized(&data, &headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    data.requests.lock().unwrap().push(page.clone());

    if data.bad_page_at == Some(page.skip) {
        return Ok(Json(json!({ "detail": "upstream timeout" })));
    }

    let start = parse_day(&page.start_date)?;
    let end = parse_day(&page.end_date)?;

    if let Some(records) = &data.raw_transactions {
        let items: Vec<&Value> = records.iter().skip(page.skip).take(page.limit).collect();
        return Ok(Json(listing_body(&data, &items)));
    }

    let items: Vec<&Transaction> = data
        .transactions
        .iter()
        .filter(|t| t.day().is_some_and(|day| day >= start && day <= end))
        .skip(page.skip)
        .take(page.limit)
        .collect();

    Ok(Json(listing_body(&data, &items)))
}

async fn handle_categories(
    State(data): State<SharedData>,
    headers: HeaderMap,
) -> std::result::Result<Json<Value>, StatusCode> {
    if !authorized(&data, &headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if data.categories_down {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(listing_body(&data, &data.categories)))
}

/// A bare array unless `wrap_items` is set, which the real endpoint never does
async fn handle_average_spend(
    State(data): State<SharedData>,
    headers: HeaderMap,
    Query(range): Query<RangeQuery>,
) -> std::result::Result<Json<Value>, StatusCode> {
    if !authorized(&data, &headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    parse_day(&range.start_date)?;
    parse_day(&range.end_date)?;
    Ok(Json(listing_body(&data, &data.average_spend)))
}
