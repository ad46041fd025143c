//! Progress reporting on stderr.
//!
//! Bars are hidden entirely when output is machine-readable, so JSON on
//! stdout is never interleaved with terminal drawing.

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use llpm_core::Result;
use llpm_core::traits::ArchiveSource;
use llpm_market::MarketClient;
use std::path::Path;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Factory for progress indicators.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    enabled: bool,
}

impl Progress {
    /// Creates a factory; with `enabled == false` every bar is hidden.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Counter bar for `(completed, total)` style progress.
    #[must_use]
    pub fn counter(&self, message: impl Into<String>) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        ) {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.set_message(message.into());
        pb.enable_steady_tick(TICK);
        pb
    }

    /// Byte-count bar for archive downloads.
    #[must_use]
    pub fn download(&self, message: impl Into<String>) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}",
        ) {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.set_message(message.into());
        pb.enable_steady_tick(TICK);
        pb
    }
}

/// Updates a counter bar from a `(completed, total)` callback.
pub fn track_count(pb: &ProgressBar) -> impl FnMut(usize, usize) + '_ {
    move |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    }
}

/// Archive source that draws a download bar while streaming.
#[derive(Debug, Clone)]
pub struct ProgressDownloader {
    client: MarketClient,
    progress: Progress,
}

impl ProgressDownloader {
    /// Wraps a market client.
    #[must_use]
    pub const fn new(client: MarketClient, progress: Progress) -> Self {
        Self { client, progress }
    }
}

#[async_trait]
impl ArchiveSource for ProgressDownloader {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        let name = url.rsplit('/').next().unwrap_or(url).to_string();
        let pb = self.progress.download(name);
        let sink = pb.clone();

        let result = self
            .client
            .download(url, dest, move |done, total| {
                if let Some(total) = total {
                    sink.set_length(total);
                }
                sink.set_position(done);
            })
            .await;

        pb.finish_and_clear();
        result
    }
}
