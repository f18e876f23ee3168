//! The catalog build: fetch, resolve, build, write
//!
//! Steps run strictly in sequence and share nothing but the fetched items and
//! the thumbnail map. Any error aborts the run before the next step starts.

use crate::builder::build_records;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::build_client;
use crate::images::ImageStore;
use crate::market::MarketClient;
use crate::output::{write_catalog, write_products};
use crate::throttle::{self, Throttle};
use crate::thumbnails::ThumbnailResolver;
use crate::types::Catalog;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// What a successful run produced
#[derive(Clone, Debug)]
pub struct RunSummary {
    /// Items fetched from the market API (one catalog entry each)
    pub items: usize,
    /// Items for which the image API returned a URL
    pub thumbnails_resolved: usize,
    /// Thumbnails downloaded during this run
    pub images_downloaded: usize,
    /// Thumbnails already on disk and reused
    pub images_reused: usize,
    /// Where the catalog document was written
    pub catalog_path: PathBuf,
    /// Where the products document was written, if enabled
    pub products_path: Option<PathBuf>,
    /// Where thumbnails live, if downloads were enabled
    pub image_dir: Option<PathBuf>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// Runs a configured catalog build
pub struct Pipeline {
    config: Config,
    http: reqwest::Client,
    throttle: Arc<dyn Throttle>,
}

impl Pipeline {
    /// Validate the configuration and prepare the HTTP client and throttle
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let http = build_client(&config.endpoints)?;
        let throttle = throttle::from_config(&config.throttle);
        Ok(Self {
            config,
            http,
            throttle,
        })
    }

    /// Replace the configured throttle
    #[must_use]
    pub fn with_throttle(mut self, throttle: Arc<dyn Throttle>) -> Self {
        self.throttle = throttle;
        self
    }

    /// Execute all steps and write the output documents
    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let output = &self.config.output;

        let data_dir = output.data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| Error::io(&data_dir, e))?;

        let images = if output.download_images {
            let store = ImageStore::new(self.http.clone(), output, self.config.retry.clone());
            store.prepare().await?;
            Some(store)
        } else {
            None
        };

        info!("fetching market items");
        let market = MarketClient::new(
            self.http.clone(),
            &self.config.endpoints,
            self.config.retry.clone(),
        );
        let items = market.fetch_items().await?;

        info!(items = items.len(), "resolving thumbnails");
        let resolver = ThumbnailResolver::new(
            self.http.clone(),
            &self.config.endpoints,
            self.throttle.clone(),
            self.config.retry.clone(),
        );
        let ids: Vec<String> = items.keys().cloned().collect();
        let thumbnails = resolver.resolve(&ids).await?;

        info!(
            price_source = output.price_source.as_str(),
            download_images = output.download_images,
            emit_products = output.emit_products,
            "building records"
        );
        let built = build_records(&items, &thumbnails, output, images.as_ref()).await?;

        let catalog_path = output.catalog_path();
        write_catalog(&catalog_path, &Catalog::new(built.items)).await?;

        let products_path = if output.emit_products {
            let path = output.products_path();
            write_products(&path, &built.products).await?;
            Some(path)
        } else {
            None
        };

        let summary = RunSummary {
            items: items.len(),
            thumbnails_resolved: thumbnails.len(),
            images_downloaded: built.images_downloaded,
            images_reused: built.images_reused,
            catalog_path,
            products_path,
            image_dir: images.as_ref().map(|_| output.image_dir()),
            elapsed: started.elapsed(),
        };
        info!(
            items = summary.items,
            thumbnails = summary.thumbnails_resolved,
            downloaded = summary.images_downloaded,
            reused = summary.images_reused,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "catalog build complete"
        );
        Ok(summary)
    }
}

/// Validate `config` and run one catalog build
pub async fn run(config: Config) -> Result<RunSummary> {
    Pipeline::new(config)?.run().await
}
