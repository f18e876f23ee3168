//! # limiteds-catalog
//!
//! Builds the static catalog a storefront front end reads: every Roblox
//! limited listed by the Rolimons item API, its thumbnail from the Roblox
//! thumbnails API, and a display price.
//!
//! ## Pipeline
//!
//! 1. **Fetch** every item from the market API ([`market`])
//! 2. **Resolve** thumbnails in batches of up to 100 ids ([`thumbnails`])
//! 3. **Build** one record per item, optionally downloading images ([`builder`], [`images`])
//! 4. **Write** `data/items.json` and, if enabled, `data/products.json` ([`output`])
//!
//! Any network or filesystem failure aborts the run. Downloaded images are
//! reused on the next run, so re-running after a failure is cheap.
//!
//! ## Quick Start
//!
//! ```no_run
//! use limiteds_catalog::{Config, PriceSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::with_root("./public");
//!     config.output.price_source = PriceSource::Value;
//!     config.output.emit_products = true;
//!
//!     let summary = limiteds_catalog::run(config).await?;
//!     println!("{} items written to {}", summary.items, summary.catalog_path.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Record assembly
pub mod builder;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// HTTP client construction
pub mod http;
/// Local thumbnail storage
pub mod images;
/// Market item fetcher
pub mod market;
/// JSON document writers
pub mod output;
/// End-to-end catalog build
pub mod pipeline;
/// Price coercion and formatting
pub mod pricing;
/// Retry logic with exponential backoff
pub mod retry;
/// Request pacing strategies
pub mod throttle;
/// Thumbnail URL resolution
pub mod thumbnails;
/// Core data types
pub mod types;

// Re-export commonly used types
pub use config::{Config, EndpointConfig, OutputConfig, PriceSource, RetryConfig, ThrottleConfig};
pub use error::{Error, Result, TransportError};
pub use pipeline::{Pipeline, RunSummary, run};
pub use throttle::{FixedDelay, NoThrottle, Throttle, TokenBucket};
pub use types::{Catalog, Category, ItemFields, MarketItems, OutputItem, OutputProduct, ThumbnailMap};
