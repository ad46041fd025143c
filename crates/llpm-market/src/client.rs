//! HTTP client for the plugin catalog and per-plugin manifests.

use crate::cache;
use llpm_core::{CatalogEntry, Error, Manifest, PluginSet, Result, Settings};
use reqwest::{Client, Response};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("llpm/", env!("CARGO_PKG_VERSION"));

/// Client for the remote plugin market.
///
/// Cheap to clone; clones share one connection pool.
///
/// # Examples
///
/// ```no_run
/// use llpm_core::Settings;
/// use llpm_market::MarketClient;
///
/// # async fn run() -> llpm_core::Result<()> {
/// let client = MarketClient::new(&Settings::default())?;
/// let catalog = client.fetch_catalog(&Settings::default().index_url).await?;
/// let plugins = client.resolve_manifests(catalog, |done, total| {
///     eprintln!("{done}/{total}");
/// }).await;
/// println!("{} plugins in the market", plugins.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MarketClient {
    http: Client,
    raw_base: String,
    concurrency: usize,
    timeout_secs: u64,
}

impl MarketClient {
    /// Builds a client with the configured timeout.
    ///
    /// The timeout bounds connecting and each read, not the whole transfer,
    /// so a large archive that keeps streaming is never cut off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the settings are out of range or the HTTP
    /// client cannot be constructed.
    pub fn new(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let http = Client::builder()
            .connect_timeout(settings.timeout())
            .read_timeout(settings.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            raw_base: settings.raw_base.trim_end_matches('/').to_string(),
            concurrency: settings.concurrency,
            timeout_secs: settings.timeout_secs,
        })
    }

    pub(crate) const fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn describe_error(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("timed out after {}s", self.timeout_secs)
        } else {
            err.to_string()
        }
    }

    /// URL of the raw `manifest.json` for a catalog entry.
    #[must_use]
    pub fn raw_manifest_url(&self, entry: &CatalogEntry) -> String {
        format!(
            "{}/{}/{}/manifest.json",
            self.raw_base, entry.repo, entry.branch
        )
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network {
                url: url.to_string(),
                message: self.describe_error(&e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network {
                url: url.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        Ok(response)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| Error::Network {
                url: url.to_string(),
                message: self.describe_error(&e),
            })
    }

    /// Fetches the plugin catalog.
    ///
    /// # Errors
    ///
    /// * [`Error::Network`] - request failed or returned a non-success status
    /// * [`Error::Parse`] - body is not a list of `{repo, branch}` entries
    pub async fn fetch_catalog(&self, url: &str) -> Result<Vec<CatalogEntry>> {
        let body = self.get_text(url).await?;
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(&body).map_err(|source| Error::Parse {
                what: "plugin catalog".to_string(),
                source,
            })?;
        debug!(url, entries = entries.len(), "fetched plugin catalog");
        Ok(entries)
    }

    /// Fetches and parses one plugin manifest.
    ///
    /// # Errors
    ///
    /// * [`Error::Network`] - request failed or returned a non-success status
    /// * [`Error::Parse`] - body is not a manifest (including a missing or invalid slug)
    pub async fn fetch_manifest(&self, entry: &CatalogEntry) -> Result<Manifest> {
        let url = self.raw_manifest_url(entry);
        let body = self.get_text(&url).await?;
        serde_json::from_str(&body).map_err(|source| Error::Parse {
            what: format!("manifest of {}", entry.repo),
            source,
        })
    }

    /// Resolves every catalog entry's manifest concurrently.
    ///
    /// At most `concurrency` requests are in flight. Entries that fail for
    /// any reason are logged and left out; they never abort the batch.
    /// Results are keyed by each manifest's own slug. `on_progress` is called
    /// with `(completed, total)` after every entry.
    pub async fn resolve_manifests<F>(
        &self,
        entries: Vec<CatalogEntry>,
        mut on_progress: F,
    ) -> PluginSet
    where
        F: FnMut(usize, usize),
    {
        let total = entries.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for entry in entries {
            let client = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = client.fetch_manifest(&entry).await;
                (entry, result)
            });
        }

        let mut plugins = PluginSet::new();
        let mut completed = 0;
        while let Some(joined) = tasks.join_next().await {
            completed += 1;
            match joined {
                Ok((_, Ok(manifest))) => {
                    plugins.insert(manifest.slug.clone(), manifest);
                }
                Ok((entry, Err(e))) => {
                    warn!("Dropping catalog entry {}@{}: {}", entry.repo, entry.branch, e);
                }
                Err(e) => {
                    warn!("Manifest lookup task failed: {}", e);
                }
            }
            on_progress(completed, total);
        }

        plugins
    }

    /// Rebuilds the market cache from the catalog at `index_url`.
    ///
    /// Fetches the catalog, resolves all manifests, and overwrites the cache
    /// file with the result. Nothing is written if the catalog fetch fails.
    ///
    /// # Errors
    ///
    /// * [`Error::Network`] / [`Error::Parse`] - the catalog could not be fetched
    /// * I/O errors while writing the cache
    pub async fn update<F>(
        &self,
        index_url: &str,
        cache_path: &Path,
        on_progress: F,
    ) -> Result<PluginSet>
    where
        F: FnMut(usize, usize),
    {
        let catalog = self.fetch_catalog(index_url).await?;
        let catalog_len = catalog.len();
        let plugins = self.resolve_manifests(catalog, on_progress).await;
        cache::persist(&plugins, cache_path)?;
        info!(
            resolved = plugins.len(),
            catalog = catalog_len,
            "market cache updated"
        );
        Ok(plugins)
    }
}
