//! Assertions over written output documents

use limiteds_catalog::{Catalog, OutputProduct};
use std::path::Path;

/// Read and parse `<root>/data/items.json`
pub fn read_catalog(root: &Path) -> Catalog {
    let path = root.join("data").join("items.json");
    let raw = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    serde_json::from_str(&raw).unwrap_or_else(|e| panic!("invalid catalog JSON: {e}"))
}

/// Read and parse `<root>/data/products.json`
pub fn read_products(root: &Path) -> Vec<OutputProduct> {
    let path = root.join("data").join("products.json");
    let raw = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    serde_json::from_str(&raw).unwrap_or_else(|e| panic!("invalid products JSON: {e}"))
}

/// Assert the fixed envelope every catalog carries
pub fn assert_catalog_envelope(catalog: &Catalog) {
    let keys: Vec<&str> = catalog.categories.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["all", "limited", "ugc"], "categories must be fixed");
    assert!(catalog.ugc_limiteds.is_empty(), "ugcLimiteds must always be empty");
}
