//! Market cache persistence.
//!
//! The cache is one JSON object mapping slug to manifest. It is always
//! rewritten whole; [`persist`] writes a sibling file first and renames it
//! over the cache so readers never see a truncated document.

use llpm_core::{Error, PluginSet, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes the whole plugin set to `path`, replacing any previous cache.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be written or renamed.
pub fn persist(plugins: &PluginSet, path: &Path) -> Result<()> {
    let staging = staging_path(path);
    let json = serde_json::to_string_pretty(plugins)?;

    fs::write(&staging, json).map_err(|e| Error::from_io(&staging, e))?;
    fs::rename(&staging, path).map_err(|e| Error::from_io(path, e))?;

    debug!(path = %path.display(), plugins = plugins.len(), "persisted market cache");
    Ok(())
}

/// Reads the plugin set from `path`.
///
/// # Errors
///
/// Returns [`Error::CacheCorrupt`] if the file is missing, unreadable, or
/// not a valid slug-to-manifest mapping.
pub fn load(path: &Path) -> Result<PluginSet> {
    let content = fs::read_to_string(path).map_err(|e| Error::CacheCorrupt {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| Error::CacheCorrupt {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use llpm_core::{Manifest, Slug};
    use tempfile::TempDir;

    fn sample() -> PluginSet {
        let mut plugins = PluginSet::new();
        for slug in ["alpha", "beta"] {
            let mut manifest = Manifest::placeholder(Slug::new(slug).unwrap());
            manifest.version = "1.0.0".to_string();
            manifest
                .extra
                .insert("icon".to_string(), serde_json::json!("./icon.png"));
            plugins.insert(manifest.slug.clone(), manifest);
        }
        plugins
    }

    #[test]
    fn test_persist_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("llpm.market.json");
        let plugins = sample();

        persist(&plugins, &path).unwrap();
        assert_eq!(load(&path).unwrap(), plugins);
        assert!(!temp.path().join("llpm.market.json.tmp").exists());
    }

    #[test]
    fn test_persist_overwrites() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("llpm.market.json");

        persist(&sample(), &path).unwrap();
        persist(&PluginSet::new(), &path).unwrap();
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing() {
        let temp = TempDir::new().unwrap();
        let err = load(&temp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::CacheCorrupt { .. }));
    }

    #[test]
    fn test_load_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("llpm.market.json");
        fs::write(&path, "{\"alpha\": ").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::CacheCorrupt { .. }));
        assert!(err.remediation().unwrap().contains("llpm update"));
    }
}
