//! Local thumbnail materialization
//!
//! Thumbnails are streamed to `<root>/images/<namespace>/<id>.png` and
//! referenced from the catalog by their root-relative path
//! (`/images/<namespace>/<id>.png`). A non-empty file already on disk is
//! reused without a network call, so re-running after a failure is cheap.

use crate::config::{OutputConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::http::send_checked;
use crate::retry::with_retry;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Extension of every stored thumbnail
pub const IMAGE_EXTENSION: &str = "png";

/// Outcome of materializing one thumbnail
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredImage {
    /// Root-relative reference written into the catalog
    pub reference: String,
    /// False when an existing file was reused
    pub downloaded: bool,
}

/// Downloads thumbnails into the public image directory
pub struct ImageStore {
    http: reqwest::Client,
    root: PathBuf,
    image_dir: PathBuf,
    retry: RetryConfig,
}

impl ImageStore {
    /// Create a store writing under the configured output root
    pub fn new(http: reqwest::Client, output: &OutputConfig, retry: RetryConfig) -> Self {
        Self {
            http,
            root: output.root.clone(),
            image_dir: output.image_dir(),
            retry,
        }
    }

    /// Create the image directory if needed
    pub async fn prepare(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.image_dir)
            .await
            .map_err(|e| Error::io(&self.image_dir, e))
    }

    /// Local path for an item's thumbnail
    pub fn local_path(&self, item_id: &str) -> PathBuf {
        self.image_dir.join(format!("{item_id}.{IMAGE_EXTENSION}"))
    }

    /// Root-relative reference for a path under the output root
    ///
    /// Components are joined with `/` on every platform.
    pub fn public_reference(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    /// Make the thumbnail for `item_id` available locally
    ///
    /// # Errors
    /// - [`Error::Transport`] if the download fails; the run must abort
    /// - [`Error::LocalIo`] if the file cannot be written
    /// - [`Error::UpstreamProtocol`] if the id cannot be used as a file name
    pub async fn materialize(&self, item_id: &str, url: &str) -> Result<StoredImage> {
        if !is_safe_file_stem(item_id) {
            return Err(Error::UpstreamProtocol {
                api: "market",
                message: format!("item id '{item_id}' is not usable as a file name"),
            });
        }

        let path = self.local_path(item_id);
        let reference = self.public_reference(&path);

        if is_non_empty_file(&path).await {
            debug!(item_id, path = %path.display(), "thumbnail already present");
            return Ok(StoredImage {
                reference,
                downloaded: false,
            });
        }

        let operation = format!("image download for item {item_id}");
        let bytes = with_retry(&self.retry, || self.download(url, &path, &operation)).await?;
        debug!(item_id, bytes, path = %path.display(), "thumbnail downloaded");

        Ok(StoredImage {
            reference,
            downloaded: true,
        })
    }

    /// Stream `url` into a sibling `.part` file, then move it into place
    ///
    /// The `.part` file is removed on every failure after it was created.
    async fn download(&self, url: &str, path: &Path, operation: &str) -> Result<u64> {
        let response = send_checked(self.http.get(url), operation).await?;

        let partial = path.with_extension(format!("{IMAGE_EXTENSION}.part"));
        let result = write_partial(response, &partial, operation).await;
        let result = match result {
            Ok(written) => tokio::fs::rename(&partial, path)
                .await
                .map(|()| written)
                .map_err(|e| Error::io(path, e)),
            Err(e) => Err(e),
        };

        if result.is_err() {
            let _ = tokio::fs::remove_file(&partial).await;
        }
        result
    }
}

async fn write_partial(
    mut response: reqwest::Response,
    partial: &Path,
    operation: &str,
) -> Result<u64> {
    let mut file = tokio::fs::File::create(partial)
        .await
        .map_err(|e| Error::io(partial, e))?;

    let mut written: u64 = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| Error::request(operation, e))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::io(partial, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| Error::io(partial, e))?;
    Ok(written)
}

async fn is_non_empty_file(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_file() && meta.len() > 0,
        Err(_) => false,
    }
}

fn is_safe_file_stem(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
