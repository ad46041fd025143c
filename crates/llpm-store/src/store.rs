//! Plugin storage implementation.
//!
//! Provides the main [`PluginStore`] type for scanning, installing, and
//! removing plugins under the plugins root.

use crate::archive::extract_zip;
use crate::layout::{has_top_level_manifest, needs_promotion, promote_nested};
use llpm_core::traits::ArchiveSource;
use llpm_core::{Error, MANIFEST_FILE, Manifest, PluginSet, Result, Slug};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_GITHUB_BASE: &str = "https://github.com";

/// RAII guard for plugin directory cleanup on a failed extraction.
///
/// Removes the partially extracted directory unless
/// [`commit`](Self::commit) is called.
struct PluginDirGuard {
    path: PathBuf,
    cleanup: bool,
}

impl PluginDirGuard {
    const fn new(path: PathBuf) -> Self {
        Self {
            path,
            cleanup: true,
        }
    }

    fn commit(mut self) {
        self.cleanup = false;
    }
}

impl Drop for PluginDirGuard {
    fn drop(&mut self) {
        if self.cleanup && self.path.exists() {
            if let Err(e) = fs::remove_dir_all(&self.path) {
                tracing::warn!(
                    "Failed to clean up partial plugin directory {}: {}",
                    self.path.display(),
                    e
                );
            } else {
                tracing::debug!(
                    "Cleaned up partial plugin directory: {}",
                    self.path.display()
                );
            }
        }
    }
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallOutcome {
    /// Installed slug
    pub slug: Slug,
    /// Installed version (pinned tag without a leading `v`, or the manifest version)
    pub version: String,
    /// Plugin directory
    pub path: PathBuf,
    /// URL the archive was downloaded from
    pub url: String,
    /// Archive size in bytes
    pub bytes: u64,
    /// `false` when files were extracted but no top-level manifest exists.
    ///
    /// Such a plugin is invisible to [`PluginStore::scan`] until repaired.
    pub manifest_found: bool,
}

/// Plugin directory manager.
///
/// Each installed plugin lives in its own subdirectory named after its slug.
///
/// # Directory Structure
///
/// ```text
/// plugins/
/// ├── lite_tools/
/// │   ├── manifest.json
/// │   └── src/...
/// └── pluginStore/
///     └── manifest.json
/// ```
///
/// The plugins root is treated as exclusively owned by one process at a
/// time; concurrent invocations are not locked against.
///
/// # Examples
///
/// ```no_run
/// use llpm_store::PluginStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = PluginStore::open("./plugins")?;
///
/// for (slug, manifest) in store.scan()? {
///     println!("{slug}: {}", manifest.display_name());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PluginStore {
    root: PathBuf,
    github_base: String,
}

impl PluginStore {
    /// Opens the store at `root`, creating the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| Error::from_io(&root, e))?;
            tracing::debug!("Created plugins directory: {}", root.display());
        }

        Ok(Self {
            root,
            github_base: DEFAULT_GITHUB_BASE.to_string(),
        })
    }

    /// Sets the base URL used to build download URLs.
    #[must_use]
    pub fn with_github_base(mut self, base: impl Into<String>) -> Self {
        self.github_base = base.into();
        self
    }

    /// Plugins root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of the plugin with the given slug.
    #[must_use]
    pub fn plugin_path(&self, slug: &Slug) -> PathBuf {
        self.root.join(slug.as_str())
    }

    /// Returns `true` if a directory named `slug` exists, manifest or not.
    #[must_use]
    pub fn exists(&self, slug: &Slug) -> bool {
        self.plugin_path(slug).is_dir()
    }

    /// Builds the local plugin set.
    ///
    /// Reads `manifest.json` from every immediate subdirectory. Directories
    /// without a readable manifest are skipped, not reported as errors.
    /// Manifests are keyed by their own `slug` field; on collision the last
    /// one read wins.
    ///
    /// # Errors
    ///
    /// Returns an error only if the plugins root itself cannot be listed.
    pub fn scan(&self) -> Result<PluginSet> {
        let mut plugins = PluginSet::new();

        let entries = fs::read_dir(&self.root).map_err(|e| Error::from_io(&self.root, e))?;
        let mut dirs: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        for dir in dirs {
            let manifest_path = dir.join(MANIFEST_FILE);
            if !manifest_path.is_file() {
                tracing::debug!("Skipping directory without manifest: {}", dir.display());
                continue;
            }

            match read_manifest(&manifest_path) {
                Ok(manifest) => {
                    plugins.insert(manifest.slug.clone(), manifest);
                }
                Err(e) => {
                    tracing::warn!("Failed to read manifest from {}: {}", dir.display(), e);
                }
            }
        }

        Ok(plugins)
    }

    /// Downloads and installs a plugin.
    ///
    /// An existing directory for the slug is replaced, but only after the
    /// download has succeeded, so a failed download leaves the old install
    /// untouched. Source archives nested under `{repoName}-{branch}/` are
    /// promoted to the plugin directory.
    ///
    /// # Errors
    ///
    /// * [`Error::UnsupportedOperation`] - `version` given for a source-archive plugin
    /// * [`Error::DownloadFailed`] - the archive could not be downloaded
    /// * [`Error::Extraction`] - the archive is not a readable zip
    /// * [`Error::FilesystemInconsistency`] - layout repair failed part-way
    /// * [`Error::PermissionDenied`] - the old install could not be removed
    pub async fn install(
        &self,
        manifest: &Manifest,
        version: Option<&str>,
        source: &dyn ArchiveSource,
    ) -> Result<InstallOutcome> {
        let url = manifest.download_url(version, &self.github_base)?;
        let slug = manifest.slug.clone();

        let scratch = tempfile::Builder::new().prefix("llpm-").tempdir()?;
        let archive = scratch.path().join(format!("{slug}.zip"));
        tracing::debug!("Downloading {} to {}", url, archive.display());
        let bytes = source.fetch(&url, &archive).await?;

        let target = self.plugin_path(&slug);
        if target.exists() {
            fs::remove_dir_all(&target).map_err(|e| Error::from_io(&target, e))?;
            tracing::info!("Removed previous install of {}", slug);
        }

        let guard = PluginDirGuard::new(target.clone());
        let extract_to = target.clone();
        tokio::task::spawn_blocking(move || extract_zip(&archive, &extract_to))
            .await
            .map_err(|e| Error::Extraction {
                message: format!("extraction task failed: {e}"),
            })??;
        guard.commit();
        drop(scratch);

        if let Some(repository) = &manifest.repository {
            let nested = repository.source_archive_root();
            if needs_promotion(&target, &nested) {
                promote_nested(&target, &nested)?;
            }
        }

        let manifest_found = has_top_level_manifest(&target);
        if !manifest_found {
            tracing::warn!(
                "Installed {} but no {} found at {}",
                slug,
                MANIFEST_FILE,
                target.display()
            );
        }

        let version = version.map_or_else(
            || manifest.version.clone(),
            |v| v.trim_start_matches('v').to_string(),
        );
        tracing::info!("Installed plugin: {}@{}", slug, version);

        Ok(InstallOutcome {
            slug,
            version,
            path: target,
            url,
            bytes,
            manifest_found,
        })
    }

    /// Removes an installed plugin.
    ///
    /// # Errors
    ///
    /// * [`Error::NotInstalled`] - no directory for the manifest's slug
    /// * [`Error::PermissionDenied`] - the OS refused the deletion
    pub fn remove(&self, manifest: &Manifest) -> Result<PathBuf> {
        self.remove_slug(&manifest.slug)
    }

    /// Removes the directory named `slug` without needing a manifest.
    ///
    /// Used for forced removal of directories the scan does not recognize.
    ///
    /// # Errors
    ///
    /// * [`Error::NotInstalled`] - no such directory
    /// * [`Error::PermissionDenied`] - the OS refused the deletion
    pub fn remove_slug(&self, slug: &Slug) -> Result<PathBuf> {
        let plugin_dir = self.plugin_path(slug);
        if !plugin_dir.is_dir() {
            return Err(Error::NotInstalled {
                slug: slug.to_string(),
            });
        }

        fs::remove_dir_all(&plugin_dir).map_err(|e| Error::from_io(&plugin_dir, e))?;
        tracing::info!("Removed plugin: {}", slug);
        Ok(plugin_dir)
    }
}

/// Reads and parses one manifest file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or a JSON error if it
/// does not parse as a manifest.
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}
