//! Configuration types for limiteds-catalog

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Upper bound the thumbnails API accepts for `assetIds` in one request
pub const MAX_THUMBNAIL_BATCH: usize = 100;

/// Upstream endpoints and request shaping
///
/// Injected into the fetcher and resolver so tests can point the pipeline at
/// mock servers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Rolimons item details endpoint
    #[serde(default = "default_market_url")]
    pub market_url: String,

    /// Roblox asset thumbnails endpoint
    #[serde(default = "default_thumbnail_url")]
    pub thumbnail_url: String,

    /// Thumbnail size requested from the image API (default: "420x420")
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: String,

    /// Number of asset ids per thumbnail request (default: 100)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-request timeout applied to every network call (default: 60 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            market_url: default_market_url(),
            thumbnail_url: default_thumbnail_url(),
            thumbnail_size: default_thumbnail_size(),
            batch_size: default_batch_size(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Which market metric becomes the display price
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Recent Average Price, falling back to value
    #[default]
    Rap,
    /// Community value, falling back to RAP
    Value,
}

impl PriceSource {
    /// Lower-case name used on the command line and in config files
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Rap => "rap",
            PriceSource::Value => "value",
        }
    }
}

impl FromStr for PriceSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rap" => Ok(PriceSource::Rap),
            "value" => Ok(PriceSource::Value),
            _ => Err(Error::config(
                "price_source",
                format!("unknown price source '{s}', expected 'rap' or 'value'"),
            )),
        }
    }
}

/// Output documents, image materialization and record defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Public root directory of the front end (required)
    #[serde(default)]
    pub root: PathBuf,

    /// Subdirectory of `<root>/images` holding downloaded thumbnails (default: "rolimons")
    #[serde(default = "default_image_namespace")]
    pub image_namespace: String,

    /// Value of the `by` field on every item (default: "ROBLOX")
    #[serde(default = "default_by")]
    pub by_default: String,

    /// Download thumbnails locally instead of linking the CDN URL (default: true)
    #[serde(default = "default_true")]
    pub download_images: bool,

    /// Which metric prices the item (default: rap)
    #[serde(default)]
    pub price_source: PriceSource,

    /// Currency label appended to display prices (default: "R$")
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Stock assigned to every product record (default: 1)
    #[serde(default = "default_stock")]
    pub default_stock: u32,

    /// Also write `<root>/data/products.json` (default: false)
    #[serde(default)]
    pub emit_products: bool,

    /// Number of image downloads in flight at once (default: 1)
    #[serde(default = "default_download_concurrency")]
    pub download_concurrency: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            image_namespace: default_image_namespace(),
            by_default: default_by(),
            download_images: true,
            price_source: PriceSource::default(),
            currency: default_currency(),
            default_stock: default_stock(),
            emit_products: false,
            download_concurrency: default_download_concurrency(),
        }
    }
}

impl OutputConfig {
    /// Directory receiving the JSON documents
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    /// Directory receiving downloaded thumbnails
    pub fn image_dir(&self) -> PathBuf {
        self.root.join("images").join(&self.image_namespace)
    }

    /// Path of the catalog document
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir().join("items.json")
    }

    /// Path of the products document
    pub fn products_path(&self) -> PathBuf {
        self.data_dir().join("products.json")
    }
}

/// Pause policy applied between thumbnail batches
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ThrottleConfig {
    /// No pause at all
    None,
    /// Sleep a fixed amount between requests
    FixedDelay {
        /// Pause length
        #[serde(rename = "delay_ms", with = "duration_ms_serde")]
        delay: Duration,
    },
    /// Token bucket refilling at `requests_per_second`, holding at most `burst` tokens
    TokenBucket {
        /// Sustained request rate
        requests_per_second: u32,
        /// Bucket capacity
        burst: u32,
    },
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        ThrottleConfig::FixedDelay {
            delay: Duration::from_millis(250),
        }
    }
}

/// Retry configuration for transient failures
///
/// Disabled by default: a single network failure aborts the run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 0)
    #[serde(default)]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Main configuration for a catalog build
///
/// Fields are organized into sub-configs:
/// - [`endpoints`](EndpointConfig): upstream URLs, batch size, timeout
/// - [`output`](OutputConfig): output root, record defaults, output modes
/// - [`throttle`](ThrottleConfig): pause policy between thumbnail batches
/// - [`retry`](RetryConfig): opt-in retry of transient failures
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream endpoints
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Pause policy between thumbnail batches
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Retry policy
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Create a default configuration writing under `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            output: OutputConfig {
                root: root.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("invalid config file {}: {}", path.display(), e),
            key: None,
        })
    }

    /// Check the configuration before any network call is made
    pub fn validate(&self) -> Result<()> {
        if self.output.root.as_os_str().is_empty() {
            return Err(Error::config("root", "output root directory is required"));
        }
        if self.endpoints.batch_size == 0 || self.endpoints.batch_size > MAX_THUMBNAIL_BATCH {
            return Err(Error::config(
                "batch_size",
                format!(
                    "batch size must be between 1 and {MAX_THUMBNAIL_BATCH}, got {}",
                    self.endpoints.batch_size
                ),
            ));
        }
        for (key, value) in [
            ("market_url", &self.endpoints.market_url),
            ("thumbnail_url", &self.endpoints.thumbnail_url),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| Error::config(key, format!("invalid URL '{value}': {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::config(
                    key,
                    format!("expected an http(s) URL, got '{value}'"),
                ));
            }
        }
        if self.endpoints.request_timeout.is_zero() {
            return Err(Error::config(
                "request_timeout",
                "request timeout must be greater than zero",
            ));
        }
        if self.output.download_concurrency == 0 {
            return Err(Error::config(
                "download_concurrency",
                "download concurrency must be at least 1",
            ));
        }
        if !is_single_segment(&self.output.image_namespace) {
            return Err(Error::config(
                "image_namespace",
                format!(
                    "image namespace must be a single path segment, got '{}'",
                    self.output.image_namespace
                ),
            ));
        }
        if let ThrottleConfig::TokenBucket {
            requests_per_second,
            burst,
        } = self.throttle
        {
            if requests_per_second == 0 || burst == 0 {
                return Err(Error::config(
                    "throttle",
                    "token bucket rate and burst must be at least 1",
                ));
            }
        }
        Ok(())
    }
}

fn default_market_url() -> String {
    "https://www.rolimons.com/itemapi/itemdetails".to_string()
}

fn default_thumbnail_url() -> String {
    "https://thumbnails.roblox.com/v1/assets".to_string()
}

fn default_thumbnail_size() -> String {
    "420x420".to_string()
}

fn default_batch_size() -> usize {
    MAX_THUMBNAIL_BATCH
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_user_agent() -> String {
    concat!("limiteds-catalog/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_image_namespace() -> String {
    "rolimons".to_string()
}

fn default_by() -> String {
    "ROBLOX".to_string()
}

fn default_currency() -> String {
    "R$".to_string()
}

fn default_stock() -> u32 {
    1
}

fn default_download_concurrency() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// True when `name` is exactly one normal path component
fn is_single_segment(name: &str) -> bool {
    if name.contains(&['/', '\\'][..]) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
