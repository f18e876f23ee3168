use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use limiteds_catalog::{Config, Error, PriceSource, RunSummary, ThrottleConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "limiteds_catalog=info";

#[derive(Parser, Debug)]
#[command(
    name = "limiteds-catalog",
    version,
    about = "Build storefront items.json (and thumbnails) from the Rolimons limiteds API"
)]
struct Cli {
    /// Public directory of the front end; outputs go to <ROOT>/data and <ROOT>/images
    #[arg(long, visible_alias = "next-public")]
    root: Option<PathBuf>,

    /// JSON config file; flags given on the command line override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Value of the `by` field on every item
    #[arg(long = "by-default")]
    by_default: Option<String>,

    /// Link thumbnails by their CDN URL instead of downloading them
    #[arg(long = "no-download", action = ArgAction::SetTrue)]
    no_download: bool,

    /// Which metric prices items: rap or value
    #[arg(long = "price-source")]
    price_source: Option<PriceSource>,

    /// Currency label appended to display prices
    #[arg(long)]
    currency: Option<String>,

    /// Stock assigned to every product record
    #[arg(long = "default-stock")]
    default_stock: Option<u32>,

    /// Also write <ROOT>/data/products.json
    #[arg(long = "emit-products", action = ArgAction::SetTrue)]
    emit_products: bool,

    /// Subdirectory of <ROOT>/images receiving thumbnails
    #[arg(long = "image-namespace")]
    image_namespace: Option<String>,

    /// Override the market item details endpoint
    #[arg(long = "market-url")]
    market_url: Option<String>,

    /// Override the thumbnails endpoint
    #[arg(long = "thumbnail-url")]
    thumbnail_url: Option<String>,

    /// Thumbnail size requested from the image API (e.g. 420x420)
    #[arg(long = "thumbnail-size")]
    thumbnail_size: Option<String>,

    /// Asset ids per thumbnail request (1-100)
    #[arg(long = "batch-size")]
    batch_size: Option<usize>,

    /// Pause between thumbnail batches in milliseconds (0 disables it)
    #[arg(long = "batch-delay-ms")]
    batch_delay_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout-secs")]
    timeout_secs: Option<u64>,

    /// Image downloads in flight at once
    #[arg(long = "download-concurrency")]
    download_concurrency: Option<usize>,

    /// Retry transient network failures this many times (default: no retry)
    #[arg(long)]
    retries: Option<u32>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(root) = self.root {
            config.output.root = root;
        }
        if let Some(by) = self.by_default {
            config.output.by_default = by;
        }
        if self.no_download {
            config.output.download_images = false;
        }
        if let Some(source) = self.price_source {
            config.output.price_source = source;
        }
        if let Some(currency) = self.currency {
            config.output.currency = currency;
        }
        if let Some(stock) = self.default_stock {
            config.output.default_stock = stock;
        }
        if self.emit_products {
            config.output.emit_products = true;
        }
        if let Some(namespace) = self.image_namespace {
            config.output.image_namespace = namespace;
        }
        if let Some(concurrency) = self.download_concurrency {
            config.output.download_concurrency = concurrency;
        }
        if let Some(url) = self.market_url {
            config.endpoints.market_url = url;
        }
        if let Some(url) = self.thumbnail_url {
            config.endpoints.thumbnail_url = url;
        }
        if let Some(size) = self.thumbnail_size {
            config.endpoints.thumbnail_size = size;
        }
        if let Some(batch_size) = self.batch_size {
            config.endpoints.batch_size = batch_size;
        }
        if let Some(secs) = self.timeout_secs {
            config.endpoints.request_timeout = Duration::from_secs(secs);
        }
        match self.batch_delay_ms {
            Some(0) => config.throttle = ThrottleConfig::None,
            Some(ms) => {
                config.throttle = ThrottleConfig::FixedDelay {
                    delay: Duration::from_millis(ms),
                }
            }
            None => {}
        }
        if let Some(retries) = self.retries {
            config.retry.max_attempts = retries;
        }

        if config.output.root.as_os_str().is_empty() {
            anyhow::bail!("--root is required (or set output.root in the config file)");
        }
        config.output.root = std::path::absolute(&config.output.root)
            .with_context(|| format!("resolving {}", config.output.root.display()))?;
        Ok(config)
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let fallback = if verbose {
        "limiteds_catalog=debug"
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Catalog build finished in {:.1}s", summary.elapsed.as_secs_f64());
    println!(" - items      : {}", summary.items);
    println!(" - thumbnails : {} resolved", summary.thumbnails_resolved);
    println!(" - JSON       : {}", summary.catalog_path.display());
    if let Some(products) = &summary.products_path {
        println!(" - products   : {}", products.display());
    }
    match &summary.image_dir {
        Some(dir) => println!(
            " - images     : {} ({} downloaded, {} already present)",
            dir.display(),
            summary.images_downloaded,
            summary.images_reused
        ),
        None => println!(" - images     : linked from the Roblox CDN (not downloaded)"),
    }
}

async fn run(cli: Cli) -> Result<RunSummary> {
    let config = cli.into_config()?;
    let summary = limiteds_catalog::run(config)
        .await
        .context("catalog build failed")?;
    Ok(summary)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let kind = e.downcast_ref::<Error>().map_or("cli", Error::code);
            error!(kind, error = %format!("{e:#}"), "run aborted");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
