//! HTTP client for the finance API
//!
//! Endpoints (relative to the configured base URL):
//!
//! - `GET /expenses?start_date=&end_date=&skip=&limit=`
//! - `GET /categories`
//! - `GET /analytics/average-category-spend?start_date=&end_date=`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::api::{FinanceApi, Listing, PageRequest};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{Category, CategorySpendSummary, DateRange, Transaction};

/// reqwest-backed `FinanceApi`
#[derive(Clone)]
pub struct HttpFinanceApi {
    http_client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpFinanceApi {
    /// Create a client for the given base URL (trailing slashes are trimmed)
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: None,
        }
    }

    /// Create a client that sends `Authorization: Bearer <token>`
    pub fn with_token(base_url: &str, token: &str) -> Self {
        Self {
            api_token: Some(token.to_string()),
            ..Self::new(base_url)
        }
    }

    /// Build from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self.http_client.get(format!("{}{}", self.base_url, path));
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and return the JSON body; non-2xx statuses are errors
    async fn fetch_json(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(Error::Http(response.error_for_status().unwrap_err()));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl FinanceApi for HttpFinanceApi {
    async fn list_transactions(&self, page: &PageRequest) -> Result<Listing<Transaction>> {
        debug!(
            "GET /expenses {} skip={} limit={}",
            page.range, page.skip, page.limit
        );
        let request = self.get("/expenses").query(&[
            ("start_date", page.range.start_param()),
            ("end_date", page.range.end_param()),
            ("skip", page.skip.to_string()),
            ("limit", page.limit.to_string()),
        ]);
        let body = self.fetch_json(request).await?;
        Ok(Listing::from_value(body))
    }

    async fn list_categories(&self) -> Result<Listing<Category>> {
        debug!("GET /categories");
        let body = self.fetch_json(self.get("/categories")).await?;
        Ok(Listing::from_value(body))
    }

    async fn average_category_spend(
        &self,
        range: &DateRange,
    ) -> Result<Listing<CategorySpendSummary>> {
        debug!("GET /analytics/average-category-spend {}", range);
        let request = self.get("/analytics/average-category-spend").query(&[
            ("start_date", range.start_param()),
            ("end_date", range.end_param()),
        ]);
        let body = self.fetch_json(request).await?;
        // this endpoint only ever answers with a bare array
        Ok(Listing::from_bare_value(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        sample_average_spend, sample_categories, sample_transactions, MockFinanceServer,
    };
    use serde_json::json;

    fn jan_2024() -> DateRange {
        DateRange::parse(Some("2024-01-01"), Some("2024-01-31")).unwrap()
    }

    #[test]
    fn test_client_new_trims_trailing_slash() {
        let api = HttpFinanceApi::new("http://localhost:8000/api/");
        assert_eq!(api.base_url(), "http://localhost:8000/api");
    }

    #[test]
    fn test_client_with_token() {
        let api = HttpFinanceApi::with_token("http://localhost:8000", "secret");
        assert_eq!(api.api_token.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn test_list_transactions_page() {
        let server = MockFinanceServer::builder()
            .transactions(sample_transactions())
            .start()
            .await;
        let api = HttpFinanceApi::new(&server.url());

        let page = PageRequest {
            range: jan_2024(),
            skip: 0,
            limit: 2,
        };
        let items = api.list_transactions(&page).await.unwrap().into_items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(server.requests().len(), 1);
        assert_eq!(server.requests()[0].skip, 0);
        assert_eq!(server.requests()[0].limit, 2);
    }

    #[tokio::test]
    async fn test_list_categories_wrapped() {
        let server = MockFinanceServer::builder()
            .categories(sample_categories())
            .wrap_items(true)
            .start()
            .await;
        let api = HttpFinanceApi::new(&server.url());

        let categories = api.list_categories().await.unwrap().into_items().unwrap();
        assert_eq!(categories, sample_categories());
    }

    #[tokio::test]
    async fn test_average_spend_must_be_bare_array() {
        let server = MockFinanceServer::builder()
            .average_spend(sample_average_spend())
            .wrap_items(true)
            .start()
            .await;
        let api = HttpFinanceApi::new(&server.url());

        let listing = api.average_category_spend(&jan_2024()).await.unwrap();
        assert!(matches!(listing, Listing::Unrecognized(_)));
    }

    #[tokio::test]
    async fn test_loose_records_survive_decoding() {
        let server = MockFinanceServer::builder()
            .raw_transactions(vec![
                json!({"id": "a", "amount": 10.0, "type": "Need", "timestamp": "2024-01-02"}),
                json!({"id": "b", "amount": 4.0, "type": "Want", "timestamp": null}),
                json!({"id": 9, "amount": 3.0, "category_id": 2, "type": "Need"}),
            ])
            .start()
            .await;
        let api = HttpFinanceApi::new(&server.url());
        let page = PageRequest {
            range: jan_2024(),
            skip: 0,
            limit: 10,
        };

        let items = api.list_transactions(&page).await.unwrap().into_items().unwrap();
        let ids: Vec<&str> = items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "9"]);
        assert_eq!(items[2].category_id.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_bearer_token_required() {
        let server = MockFinanceServer::builder()
            .require_token("s3cret")
            .start()
            .await;

        let anonymous = HttpFinanceApi::new(&server.url());
        assert!(matches!(
            anonymous.list_categories().await,
            Err(Error::Http(_))
        ));

        let authorized = HttpFinanceApi::with_token(&server.url(), "s3cret");
        assert!(authorized.list_categories().await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let api = HttpFinanceApi::new("http://127.0.0.1:9");
        let result = api.list_categories().await;
        assert!(matches!(result, Err(Error::Http(_))));
    }
}
