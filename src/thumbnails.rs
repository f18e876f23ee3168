//! Thumbnail resolver for the Roblox asset thumbnails API
//!
//! Asset ids are sent in batches (at most 100 per request), in input order,
//! one batch at a time with a throttle pause in between. Ids the API does not
//! resolve are simply absent from the resulting map.

use crate::config::{EndpointConfig, RetryConfig};
use crate::error::Result;
use crate::http::{read_json, send_checked};
use crate::retry::with_retry;
use crate::throttle::Throttle;
use crate::types::ThumbnailMap;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

const API: &str = "thumbnails";
const IMAGE_FORMAT: &str = "Png";

#[derive(Debug, Deserialize)]
struct ThumbnailResponse {
    #[serde(default)]
    data: Vec<ThumbnailEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThumbnailEntry {
    #[serde(default)]
    target_id: Option<Value>,
    #[serde(default)]
    image_url: Option<String>,
}

impl ThumbnailEntry {
    /// `(id, url)` when both are present; numeric ids are stringified
    fn into_pair(self) -> Option<(String, String)> {
        let id = match self.target_id? {
            Value::Number(n) => n.to_string(),
            Value::String(s) if !s.is_empty() => s,
            _ => return None,
        };
        let url = self.image_url.filter(|u| !u.is_empty())?;
        Some((id, url))
    }
}

/// Resolves display URLs for asset ids
pub struct ThumbnailResolver {
    http: reqwest::Client,
    url: String,
    size: String,
    batch_size: usize,
    throttle: Arc<dyn Throttle>,
    retry: RetryConfig,
}

impl ThumbnailResolver {
    /// Create a resolver for the configured thumbnails endpoint
    pub fn new(
        http: reqwest::Client,
        endpoints: &EndpointConfig,
        throttle: Arc<dyn Throttle>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            http,
            url: endpoints.thumbnail_url.clone(),
            size: endpoints.thumbnail_size.clone(),
            batch_size: endpoints.batch_size.max(1),
            throttle,
            retry,
        }
    }

    /// Resolve thumbnails for every id, batch by batch
    ///
    /// # Errors
    /// Returns the first transport or protocol error; results from earlier
    /// batches are discarded.
    pub async fn resolve(&self, ids: &[String]) -> Result<ThumbnailMap> {
        let total_batches = ids.len().div_ceil(self.batch_size);
        let mut urls = ThumbnailMap::with_capacity(ids.len());

        for (index, batch) in ids.chunks(self.batch_size).enumerate() {
            if index > 0 {
                self.throttle.acquire().await;
            }

            let operation = format!("thumbnail batch {}/{}", index + 1, total_batches);
            let resolved = self.fetch_batch(batch, &operation).await?;
            debug!(
                batch = index + 1,
                requested = batch.len(),
                resolved = resolved.len(),
                "thumbnail batch resolved"
            );
            urls.extend(resolved);
        }

        info!(
            ids = ids.len(),
            batches = total_batches,
            resolved = urls.len(),
            "resolved thumbnails"
        );
        Ok(urls)
    }

    async fn fetch_batch(&self, batch: &[String], operation: &str) -> Result<Vec<(String, String)>> {
        let asset_ids = batch.join(",");

        let payload: ThumbnailResponse = with_retry(&self.retry, || async {
            let request = self.http.get(&self.url).query(&[
                ("assetIds", asset_ids.as_str()),
                ("size", self.size.as_str()),
                ("format", IMAGE_FORMAT),
                ("isCircular", "false"),
            ]);
            let response = send_checked(request, operation).await?;
            read_json(response, API, operation).await
        })
        .await?;

        Ok(payload
            .data
            .into_iter()
            .filter_map(ThumbnailEntry::into_pair)
            .collect())
    }
}
