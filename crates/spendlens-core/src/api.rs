//! Finance API abstraction
//!
//! The loaders only talk to the finance backend through the `FinanceApi` trait,
//! so tests can swap the HTTP client for a scripted in-memory implementation.
//!
//! Listing endpoints are loosely specified: a page may come back as a bare JSON
//! array or as an object wrapping the array under `items`. `Listing` captures
//! both, plus anything else as `Unrecognized` so callers decide how strict to be.
//! The shape is decided first; records are then decoded one by one and a
//! record that still fails is dropped without affecting the rest of the page.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::models::{Category, CategorySpendSummary, DateRange, Transaction};

/// One page request against the transaction listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub range: DateRange,
    pub skip: usize,
    pub limit: usize,
}

/// A decoded listing response
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    Items(Vec<T>),
    /// A list came back but `dropped` of its records could not be decoded
    Lossy { items: Vec<T>, dropped: usize },
    /// Response matched neither accepted shape; holds a short description of what came back
    Unrecognized(String),
}

impl<T: DeserializeOwned> Listing<T> {
    /// Decode a raw JSON body, accepting `[...]` or `{ "items": [...] }`
    pub fn from_value(value: Value) -> Self {
        let description = describe_shape(&value);
        match value {
            Value::Array(records) => Self::from_records(records),
            Value::Object(mut map) => match map.remove("items") {
                Some(Value::Array(records)) => Self::from_records(records),
                _ => Self::Unrecognized(description),
            },
            _ => Self::Unrecognized(description),
        }
    }

    /// Decode a body that must be a bare `[...]`; anything else is `Unrecognized`
    pub fn from_bare_value(value: Value) -> Self {
        match value {
            Value::Array(records) => Self::from_records(records),
            other => Self::Unrecognized(describe_shape(&other)),
        }
    }

    fn from_records(records: Vec<Value>) -> Self {
        let received = records.len();
        let items: Vec<T> = records
            .into_iter()
            .enumerate()
            .filter_map(|(i, record)| match serde_json::from_value(record) {
                Ok(item) => Some(item),
                Err(e) => {
                    debug!("Dropping record {} of {}: {}", i, received, e);
                    None
                }
            })
            .collect();

        match received - items.len() {
            0 => Self::Items(items),
            dropped => Self::Lossy { items, dropped },
        }
    }
}

impl<T> Listing<T> {
    /// Records in the body, decoded or not
    pub fn received(&self) -> Option<usize> {
        match self {
            Self::Items(items) => Some(items.len()),
            Self::Lossy { items, dropped } => Some(items.len() + dropped),
            Self::Unrecognized(_) => None,
        }
    }

    pub fn into_items(self) -> Option<Vec<T>> {
        match self {
            Self::Items(items) | Self::Lossy { items, .. } => Some(items),
            Self::Unrecognized(_) => None,
        }
    }
}

/// Short human-readable description of a JSON value's shape for log messages
pub fn describe_shape(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(items) => format!("array of {} element(s)", items.len()),
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).take(5).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
    }
}

/// Trait defining the finance backend operations the dashboard consumes
///
/// Implementations should be Send + Sync so both loaders can share one client.
#[async_trait]
pub trait FinanceApi: Send + Sync {
    /// Fetch one page of transactions in the range
    async fn list_transactions(&self, page: &PageRequest) -> Result<Listing<Transaction>>;

    /// Fetch all categories
    async fn list_categories(&self) -> Result<Listing<Category>>;

    /// Fetch the server-computed per-category spend summary for the range
    async fn average_category_spend(
        &self,
        range: &DateRange,
    ) -> Result<Listing<CategorySpendSummary>>;
}

#[async_trait]
impl<A: FinanceApi + ?Sized> FinanceApi for std::sync::Arc<A> {
    async fn list_transactions(&self, page: &PageRequest) -> Result<Listing<Transaction>> {
        (**self).list_transactions(page).await
    }

    async fn list_categories(&self) -> Result<Listing<Category>> {
        (**self).list_categories().await
    }

    async fn average_category_spend(
        &self,
        range: &DateRange,
    ) -> Result<Listing<CategorySpendSummary>> {
        (**self).average_category_spend(range).await
    }
}
