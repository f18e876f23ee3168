//! JSON document writers
//!
//! Documents are pretty-printed UTF-8 with non-ASCII characters kept
//! literally, and each write replaces the previous file wholesale.

use crate::error::{Error, Result};
use crate::types::{Catalog, OutputProduct};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Render a value as indented JSON with a trailing newline
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut rendered = serde_json::to_string_pretty(value)?;
    rendered.push('\n');
    Ok(rendered)
}

async fn write_document<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let rendered = to_pretty_json(value)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(parent, e))?;
    }
    tokio::fs::write(path, rendered.as_bytes())
        .await
        .map_err(|e| Error::io(path, e))
}

/// Write the catalog document (`items.json`)
pub async fn write_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    write_document(path, catalog).await?;
    info!(
        path = %path.display(),
        items = catalog.roblox_limiteds.len(),
        "wrote catalog"
    );
    Ok(())
}

/// Write the products document (`products.json`)
pub async fn write_products(path: &Path, products: &[OutputProduct]) -> Result<()> {
    write_document(path, products).await?;
    info!(path = %path.display(), products = products.len(), "wrote products");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutputItem;
    use tempfile::TempDir;

    fn item(title: &str) -> OutputItem {
        OutputItem {
            id: "rblx-1".to_string(),
            title: title.to_string(),
            by: "ROBLOX".to_string(),
            tag: "LIMITED".to_string(),
            price: 0,
            currency: "R$".to_string(),
            display_price: "-".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_non_ascii_is_kept_literally() {
        let rendered = to_pretty_json(&Catalog::new(vec![item("หมวกเท่ ✨")])).unwrap();
        assert!(rendered.contains("หมวกเท่ ✨"), "got: {rendered}");
        assert!(!rendered.contains("\\u"), "got: {rendered}");
    }

    #[test]
    fn test_output_is_indented() {
        let rendered = to_pretty_json(&Catalog::new(Vec::new())).unwrap();
        assert!(rendered.starts_with("{\n  \"categories\": ["), "got: {rendered}");
        assert!(rendered.contains("\"ugcLimiteds\": []"));
        assert!(rendered.ends_with("}\n"));
    }

    #[tokio::test]
    async fn test_write_catalog_overwrites_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("items.json");

        write_catalog(&path, &Catalog::new(vec![item("Old"), item("Older")]))
            .await
            .unwrap();
        write_catalog(&path, &Catalog::new(vec![item("New")]))
            .await
            .unwrap();

        let written: Catalog =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.roblox_limiteds.len(), 1);
        assert_eq!(written.roblox_limiteds[0].title, "New");
    }

    #[tokio::test]
    async fn test_write_into_file_path_is_local_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("data");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = write_products(&blocker.join("products.json"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LocalIo { .. }), "got {err:?}");
    }
}
