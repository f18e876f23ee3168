//! Record builder: turns market items and thumbnails into output records
//!
//! Records come out in fetch order. When image downloads run concurrently
//! they go through an ordered buffered stream, so completion order never
//! changes record order, and the first failed download aborts the build.

use crate::config::OutputConfig;
use crate::error::Result;
use crate::images::{ImageStore, StoredImage};
use crate::pricing::{display_price, price_from_fields};
use crate::types::{
    ITEM_ID_PREFIX, ItemFields, LIMITED_TAG, MarketItems, OutputItem, OutputProduct,
    PRODUCT_DESCRIPTION_LABEL, ThumbnailMap,
};
use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info};

/// Log a progress line every this many items
const PROGRESS_EVERY: usize = 500;

/// Everything the builder produced for one run
#[derive(Clone, Debug, Default)]
pub struct BuiltRecords {
    /// Catalog entries, in fetch order
    pub items: Vec<OutputItem>,
    /// Product entries, empty unless product emission is enabled
    pub products: Vec<OutputProduct>,
    /// Thumbnails fetched over the network during this run
    pub images_downloaded: usize,
    /// Thumbnails already on disk and reused
    pub images_reused: usize,
}

/// Title and price resolved from an item's fields
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedFields {
    /// Display title
    pub title: String,
    /// Price, `None` when neither metric is readable
    pub price: Option<i64>,
}

/// Resolve title and price for one item
#[must_use]
pub fn resolve_fields(id: &str, fields: &ItemFields, output: &OutputConfig) -> ResolvedFields {
    let title = fields
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Item {id}"));

    ResolvedFields {
        title,
        price: price_from_fields(fields, output.price_source),
    }
}

enum ImageRef {
    Missing,
    Remote(String),
    Local(StoredImage),
}

impl ImageRef {
    fn reference(&self) -> Option<String> {
        match self {
            ImageRef::Missing => None,
            ImageRef::Remote(url) => Some(url.clone()),
            ImageRef::Local(stored) => Some(stored.reference.clone()),
        }
    }
}

async fn resolve_image(
    id: &str,
    url: Option<&String>,
    store: Option<&ImageStore>,
) -> Result<ImageRef> {
    match (url, store) {
        (None, _) => Ok(ImageRef::Missing),
        (Some(url), None) => Ok(ImageRef::Remote(url.clone())),
        (Some(url), Some(store)) => store.materialize(id, url).await.map(ImageRef::Local),
    }
}

/// Build catalog (and optionally product) records for every market item
///
/// `images` is `None` when downloads are disabled; thumbnails are then
/// linked by their remote URL.
///
/// # Errors
/// Returns the first image download failure; no partial result is produced.
pub async fn build_records(
    items: &MarketItems,
    thumbnails: &ThumbnailMap,
    output: &OutputConfig,
    images: Option<&ImageStore>,
) -> Result<BuiltRecords> {
    let total = items.len();
    let concurrency = output.download_concurrency.max(1);

    let image_refs: Vec<ImageRef> = stream::iter(items.keys().enumerate())
        .map(|(index, id)| async move {
            if index > 0 && index % PROGRESS_EVERY == 0 {
                info!(done = index, total, "building records");
            }
            resolve_image(id, thumbnails.get(id), images).await
        })
        .buffered(concurrency)
        .try_collect()
        .await?;

    let mut built = BuiltRecords {
        items: Vec::with_capacity(total),
        products: Vec::new(),
        ..Default::default()
    };

    for ((id, fields), image) in items.iter().zip(image_refs) {
        if let ImageRef::Local(stored) = &image {
            if stored.downloaded {
                built.images_downloaded += 1;
            } else {
                built.images_reused += 1;
            }
        }

        let resolved = resolve_fields(id, fields, output);
        let reference = image.reference();
        let item = assemble_item(id, &resolved, reference.clone(), output);

        if output.emit_products {
            built
                .products
                .push(assemble_product(&item, &resolved, reference, output));
        }
        built.items.push(item);
    }

    debug!(
        items = built.items.len(),
        products = built.products.len(),
        downloaded = built.images_downloaded,
        reused = built.images_reused,
        "records built"
    );
    Ok(built)
}

fn assemble_item(
    id: &str,
    resolved: &ResolvedFields,
    image: Option<String>,
    output: &OutputConfig,
) -> OutputItem {
    OutputItem {
        id: format!("{ITEM_ID_PREFIX}{id}"),
        title: resolved.title.clone(),
        by: output.by_default.clone(),
        tag: LIMITED_TAG.to_string(),
        price: resolved.price.unwrap_or(0),
        currency: output.currency.clone(),
        display_price: display_price(resolved.price, &output.currency),
        image,
    }
}

fn assemble_product(
    item: &OutputItem,
    resolved: &ResolvedFields,
    image: Option<String>,
    output: &OutputConfig,
) -> OutputProduct {
    OutputProduct {
        id: item.id.clone(),
        name: resolved.title.clone(),
        price: item.price,
        currency: output.currency.clone(),
        description: format!("{PRODUCT_DESCRIPTION_LABEL}: {}", resolved.title),
        image: image.unwrap_or_default(),
        stock: output.default_stock,
    }
}
