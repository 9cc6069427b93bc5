//! Range-bounded transaction loader
//!
//! Pulls every transaction in a date range from the paged listing endpoint.
//! Pages are requested strictly one after another; a page shorter than the
//! page size ends the walk. The backend never reports a total, so a final page
//! that is exactly full costs one extra (empty) request.
//!
//! Outcomes:
//! - first page has an unrecognized shape: failure, held set cleared
//! - later page has an unrecognized shape: partial success, pages so far kept
//! - records that fail to decode: dropped, but still counted for the page length
//! - transport error on any page: failure, held set cleared
//! - otherwise: success, held set replaced wholesale

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{FinanceApi, Listing, PageRequest};
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::{Error, Result};
use crate::models::{Category, DateRange, Transaction};
use crate::notice::Notice;

pub const MSG_INVALID_RANGE: &str = "Invalid date range selected.";
pub const MSG_BAD_FIRST_PAGE: &str =
    "Failed to fetch transactions. Unexpected data format from server.";
pub const MSG_BAD_LATER_PAGE: &str =
    "Received unexpected data format on a later page. Data might be incomplete.";
pub const MSG_FETCH_FAILED: &str = "Failed to fetch transactions for the report.";
pub const MSG_NO_TRANSACTIONS: &str = "No transactions found for the selected period.";
pub const MSG_CATEGORIES_FAILED: &str = "Failed to load initial data: categories";

/// Loader lifecycle: idle → loading → {loaded | partial | failed}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Partial,
    Failed,
}

/// Marks a loader as in flight and guarantees it leaves `Loading`
///
/// If the owning future is dropped before `settle` the status falls back to `Idle`.
pub(crate) struct InFlight<'a> {
    status: &'a mut LoadStatus,
}

impl<'a> InFlight<'a> {
    pub(crate) fn begin(status: &'a mut LoadStatus) -> Self {
        *status = LoadStatus::Loading;
        Self { status }
    }

    pub(crate) fn settle(self, outcome: LoadStatus) {
        *self.status = outcome;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if *self.status == LoadStatus::Loading {
            *self.status = LoadStatus::Idle;
        }
    }
}

/// Everything accumulated by one pagination walk
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPages {
    pub transactions: Vec<Transaction>,
    pub pages: usize,
    /// Set when a later page came back malformed and the walk stopped early
    pub truncated: Option<String>,
}

/// Walk the paged listing for `range` and concatenate accepted pages in request order
pub async fn fetch_all_pages<A: FinanceApi + ?Sized>(
    api: &A,
    range: &DateRange,
    page_size: usize,
) -> Result<FetchedPages> {
    let limit = page_size.max(1);
    let mut transactions = Vec::new();
    let mut skip = 0;
    let mut pages = 0;

    loop {
        let request = PageRequest {
            range: *range,
            skip,
            limit,
        };
        let listing = api.list_transactions(&request).await?;

        let (items, dropped) = match listing {
            Listing::Items(items) => (items, 0),
            Listing::Lossy { items, dropped } => (items, dropped),
            Listing::Unrecognized(shape) if skip == 0 => {
                warn!("Transaction listing returned {} on the first page", shape);
                return Err(Error::Shape(shape));
            }
            Listing::Unrecognized(shape) => {
                warn!(
                    "Transaction listing returned {} at skip={}, keeping {} transaction(s)",
                    shape,
                    skip,
                    transactions.len()
                );
                return Ok(FetchedPages {
                    transactions,
                    pages,
                    truncated: Some(shape),
                });
            }
        };

        pages += 1;
        // dropped records still count towards the page being full
        let received = items.len() + dropped;
        debug!("Page {} at skip={} returned {} transaction(s)", pages, skip, received);
        if dropped > 0 {
            debug!("Dropped {} undecodable record(s) at skip={}", dropped, skip);
        }
        transactions.extend(items);

        if received < limit {
            break;
        }
        skip += limit;
    }

    Ok(FetchedPages {
        transactions,
        pages,
        truncated: None,
    })
}

/// Result of a successful (possibly partial) load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub range: DateRange,
    pub status: LoadStatus,
    pub fetched: usize,
    pub pages: usize,
    pub notices: Vec<Notice>,
}

/// Map a load failure to the notice shown to the user
pub fn load_error_notice(err: &Error) -> Notice {
    match err {
        Error::Validation(_) => Notice::error(MSG_INVALID_RANGE),
        Error::Shape(_) => Notice::error(MSG_BAD_FIRST_PAGE),
        _ => Notice::error(MSG_FETCH_FAILED),
    }
}

/// Holds the transactions for the most recently loaded range
pub struct TransactionLoader<A> {
    api: A,
    page_size: usize,
    transactions: Vec<Transaction>,
    range: Option<DateRange>,
    status: LoadStatus,
}

impl<A: FinanceApi> TransactionLoader<A> {
    pub fn new(api: A) -> Self {
        Self::with_page_size(api, DEFAULT_PAGE_SIZE)
    }

    /// Page sizes below 1 are raised to 1
    pub fn with_page_size(api: A, page_size: usize) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            transactions: Vec::new(),
            range: None,
            status: LoadStatus::Idle,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Range of the last load attempt that passed validation
    pub fn range(&self) -> Option<DateRange> {
        self.range
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    /// Drop the held transactions for `range` without fetching and mark the load failed
    pub fn discard(&mut self, range: &DateRange) {
        self.range = Some(*range);
        self.transactions.clear();
        self.status = LoadStatus::Failed;
    }

    /// Validate raw `YYYY-MM-DD` inputs, then load
    ///
    /// Invalid input is rejected before any request and leaves held data untouched.
    pub async fn load_inputs(&mut self, start: Option<&str>, end: Option<&str>) -> Result<LoadReport> {
        let range = DateRange::parse(start, end).map_err(|e| {
            warn!("Rejected date range: {}", e);
            e
        })?;
        self.load(&range).await
    }

    /// Fetch every page for `range` and replace the held transactions
    ///
    /// On error the held set is cleared and the loader is left `Failed`.
    pub async fn load(&mut self, range: &DateRange) -> Result<LoadReport> {
        self.range = Some(*range);
        let in_flight = InFlight::begin(&mut self.status);

        match fetch_all_pages(&self.api, range, self.page_size).await {
            Ok(fetched) => {
                let mut notices = Vec::new();
                let status = if fetched.truncated.is_some() {
                    notices.push(Notice::warning(MSG_BAD_LATER_PAGE));
                    LoadStatus::Partial
                } else {
                    LoadStatus::Loaded
                };

                let count = fetched.transactions.len();
                if count > 0 {
                    notices.push(Notice::success(format!("Fetched {} transactions.", count)));
                } else if status == LoadStatus::Loaded {
                    notices.push(Notice::info(MSG_NO_TRANSACTIONS));
                }

                info!(
                    "Loaded {} transaction(s) for {} in {} page(s)",
                    count, range, fetched.pages
                );
                self.transactions = fetched.transactions;
                in_flight.settle(status);

                Ok(LoadReport {
                    range: *range,
                    status,
                    fetched: count,
                    pages: fetched.pages,
                    notices,
                })
            }
            Err(e) => {
                warn!("Transaction load for {} failed: {}", range, e);
                self.transactions.clear();
                in_flight.settle(LoadStatus::Failed);
                Err(e)
            }
        }
    }
}

/// Fetch the category list
///
/// An unrecognized response shape yields an empty list. Entries without an id
/// or name are skipped and duplicate ids keep their first occurrence.
pub async fn load_categories<A: FinanceApi + ?Sized>(api: &A) -> Result<Vec<Category>> {
    let raw = match api.list_categories().await? {
        Listing::Items(items) | Listing::Lossy { items, .. } => items,
        Listing::Unrecognized(shape) => {
            warn!("Category listing returned {}, treating as empty", shape);
            return Ok(Vec::new());
        }
    };

    let mut categories: Vec<Category> = Vec::with_capacity(raw.len());
    for category in raw {
        if category.id.is_empty() || category.name.is_empty() {
            warn!("Category data missing id or name: {:?}", category);
            continue;
        }
        if categories.iter().any(|c| c.id == category.id) {
            warn!("Duplicate category id {} ignored", category.id);
            continue;
        }
        categories.push(category);
    }

    debug!("Loaded {} categories", categories.len());
    Ok(categories)
}
