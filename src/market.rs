//! Catalog fetcher for the Rolimons item details API
//!
//! One GET returns every limited as `{success, items: {id: [fields...]}}`.
//! The run aborts on any failure; there is no partial catalog.

use crate::config::{EndpointConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::http::{read_json, send_checked};
use crate::retry::with_retry;
use crate::types::MarketItems;
use serde::Deserialize;
use tracing::{debug, info};

const API: &str = "market";
const OPERATION: &str = "market item fetch";

#[derive(Debug, Deserialize)]
struct ItemDetailsResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    items: MarketItems,
}

/// Client for the market item details endpoint
pub struct MarketClient {
    http: reqwest::Client,
    url: String,
    retry: RetryConfig,
}

impl MarketClient {
    /// Create a client for the configured market endpoint
    pub fn new(http: reqwest::Client, endpoints: &EndpointConfig, retry: RetryConfig) -> Self {
        Self {
            http,
            url: endpoints.market_url.clone(),
            retry,
        }
    }

    /// Fetch every market item, keyed by id in upstream order
    ///
    /// # Errors
    /// - [`Error::Transport`] if the request fails or returns a non-success status
    /// - [`Error::UpstreamProtocol`] if the body is not JSON, or `success` is
    ///   missing or false
    pub async fn fetch_items(&self) -> Result<MarketItems> {
        debug!(url = %self.url, "fetching market items");

        let payload: ItemDetailsResponse = with_retry(&self.retry, || async {
            let response = send_checked(self.http.get(&self.url), OPERATION).await?;
            read_json(response, API, OPERATION).await
        })
        .await?;

        match payload.success {
            Some(true) => {}
            Some(false) => {
                return Err(Error::UpstreamProtocol {
                    api: API,
                    message: "item details replied success=false".to_string(),
                });
            }
            None => {
                return Err(Error::UpstreamProtocol {
                    api: API,
                    message: "item details response has no success flag".to_string(),
                });
            }
        }

        info!(items = payload.items.len(), "fetched market items");
        Ok(payload.items)
    }
}
