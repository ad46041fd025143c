//! Per-invocation state shared by every command handler.

use llpm_core::traits::{ArchiveSource, Confirm};
use llpm_core::{DataRoot, PluginSet, Result, Settings};
use llpm_market::{MarketClient, cache};
use llpm_store::PluginStore;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a command needs, built once per invocation.
///
/// Holds the local and remote plugin sets explicitly; handlers receive the
/// context instead of reaching for process-wide state.
pub struct Context {
    /// Data root the invocation operates on
    pub root: DataRoot,
    /// Settings read from the marker file
    pub settings: Settings,
    /// Plugin directory operations
    pub store: PluginStore,
    /// Market HTTP client
    pub market: MarketClient,
    /// Installed plugins, keyed by slug
    pub local: PluginSet,
    /// Market plugins, keyed by slug
    pub remote: PluginSet,
    source: Arc<dyn ArchiveSource>,
    confirm: Box<dyn Confirm>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("root", &self.root)
            .field("settings", &self.settings)
            .field("store", &self.store)
            .field("local", &self.local.len())
            .field("remote", &self.remote.len())
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Opens the plugin store and scans installed plugins.
    ///
    /// The remote set starts empty; see [`Context::load_remote`].
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the plugins
    /// directory cannot be opened or listed.
    pub fn new(
        root: DataRoot,
        settings: Settings,
        source: Arc<dyn ArchiveSource>,
        confirm: Box<dyn Confirm>,
    ) -> Result<Self> {
        let market = MarketClient::new(&settings)?;
        let store = PluginStore::open(root.plugins_dir())?.with_github_base(&settings.github_base);
        let local = store.scan()?;

        Ok(Self {
            root,
            settings,
            store,
            market,
            local,
            remote: PluginSet::new(),
            source,
            confirm,
        })
    }

    /// Replaces the remote set.
    #[must_use]
    pub fn with_remote(mut self, remote: PluginSet) -> Self {
        self.remote = remote;
        self
    }

    /// Archive source used for installs.
    #[must_use]
    pub fn source(&self) -> &dyn ArchiveSource {
        self.source.as_ref()
    }

    /// Asks the injected confirmation capability.
    ///
    /// # Errors
    ///
    /// Propagates a failure to obtain an answer.
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        self.confirm.confirm(prompt)
    }

    /// Rescans the plugins directory after a mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the plugins directory cannot be listed.
    pub fn refresh_local(&mut self) -> Result<()> {
        self.local = self.store.scan()?;
        Ok(())
    }

    /// Loads the market cache, rebuilding it when missing or corrupt.
    ///
    /// # Errors
    ///
    /// Returns an error only if the cache is unusable and the rebuild
    /// fails as well.
    pub async fn load_remote<F>(&mut self, on_progress: F) -> Result<()>
    where
        F: FnMut(usize, usize),
    {
        let cache_path = self.root.market_path();
        match cache::load(&cache_path) {
            Ok(remote) => {
                self.remote = remote;
                Ok(())
            }
            Err(e) => {
                warn!("Market cache unusable ({}), refreshing", e);
                self.update(None, on_progress).await.map(|_| ())
            }
        }
    }

    /// Rebuilds the market cache from the catalog.
    ///
    /// Uses `index_url` when given, otherwise the configured index. Returns
    /// the number of plugins resolved.
    ///
    /// # Errors
    ///
    /// Returns [`llpm_core::Error::Network`] or [`llpm_core::Error::Parse`]
    /// if the catalog cannot be fetched; the previous cache is kept.
    pub async fn update<F>(&mut self, index_url: Option<&str>, on_progress: F) -> Result<usize>
    where
        F: FnMut(usize, usize),
    {
        let index_url = index_url.unwrap_or(&self.settings.index_url).to_string();
        let cache_path = self.root.market_path();
        self.remote = self
            .market
            .update(&index_url, &cache_path, on_progress)
            .await?;
        info!(plugins = self.remote.len(), index = %index_url, "market refreshed");
        Ok(self.remote.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llpm_core::traits::FixedAnswer;
    use tempfile::TempDir;

    fn context(temp: &TempDir) -> Context {
        let root = DataRoot::new(temp.path());
        root.init().unwrap();
        let settings = Settings::default();
        let source: Arc<dyn ArchiveSource> = Arc::new(MarketClient::new(&settings).unwrap());
        Context::new(root, settings, source, Box::new(FixedAnswer(true))).unwrap()
    }

    #[test]
    fn test_new_scans_empty_root() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        assert!(ctx.local.is_empty());
        assert!(ctx.remote.is_empty());
        assert!(ctx.confirm("ok?").unwrap());
    }

    #[tokio::test]
    async fn test_load_remote_uses_cache() {
        let temp = TempDir::new().unwrap();
        let mut ctx = context(&temp);
        std::fs::write(ctx.root.market_path(), "{}").unwrap();

        ctx.load_remote(|_, _| {}).await.unwrap();
        assert!(ctx.remote.is_empty());
    }
}
