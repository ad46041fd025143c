//! Streamed archive downloads.

use crate::MarketClient;
use async_trait::async_trait;
use futures::StreamExt;
use llpm_core::traits::ArchiveSource;
use llpm_core::{Error, Result};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

impl MarketClient {
    /// Downloads `url` to `dest` with progress reporting.
    ///
    /// `on_progress` receives `(downloaded, total)`; `total` comes from
    /// `content-length` and is `None` when the server does not send one.
    /// A failed transfer removes `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DownloadFailed`] on a non-success status or an
    /// interrupted stream, or an I/O error if `dest` cannot be written.
    pub async fn download<F>(&self, url: &str, dest: &Path, on_progress: F) -> Result<u64>
    where
        F: FnMut(u64, Option<u64>) + Send,
    {
        let result = self.stream_to_file(url, dest, on_progress).await;
        if result.is_err()
            && dest.exists()
            && let Err(e) = tokio::fs::remove_file(dest).await
        {
            debug!(path = %dest.display(), error = %e, "failed to remove partial download");
        }
        result
    }

    async fn stream_to_file<F>(&self, url: &str, dest: &Path, mut on_progress: F) -> Result<u64>
    where
        F: FnMut(u64, Option<u64>) + Send,
    {
        let failed = |message: String| Error::DownloadFailed {
            url: url.to_string(),
            message,
        };

        let response = self
            .http()
            .get(url)
            .send()
            .await
            .map_err(|e| failed(self.describe_error(&e)))?;

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        let total = response.content_length();
        let mut downloaded: u64 = 0;

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| Error::from_io(dest, e))?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| failed(self.describe_error(&e)))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::from_io(dest, e))?;

            downloaded += chunk.len() as u64;
            on_progress(downloaded, total);
        }

        file.flush().await.map_err(|e| Error::from_io(dest, e))?;

        if let Some(expected) = total
            && downloaded != expected
        {
            return Err(failed(format!(
                "transfer ended after {downloaded} of {expected} bytes"
            )));
        }

        debug!(url, bytes = downloaded, "download complete");
        Ok(downloaded)
    }
}

#[async_trait]
impl ArchiveSource for MarketClient {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        self.download(url, dest, |_, _| {}).await
    }
}
