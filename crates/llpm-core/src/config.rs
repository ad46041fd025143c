//! Data root layout and settings.
//!
//! The data root is the LiteLoaderQQNT profile directory. It is considered
//! initialized when `llpm.config.json` exists; the file may be empty, and if
//! it holds a JSON object that object is read as [`Settings`].
//!
//! ```text
//! <root>/
//! ├── llpm.config.json     initialization marker + optional settings
//! ├── llpm.market.json     cached remote plugin set
//! └── plugins/
//!     └── <slug>/manifest.json
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable overriding the data root location.
pub const PROFILE_ENV: &str = "LITELOADERQQNT_PROFILE";

/// Initialization marker and settings file.
pub const CONFIG_FILE: &str = "llpm.config.json";

/// Cached remote plugin set.
pub const MARKET_FILE: &str = "llpm.market.json";

/// Directory holding one subdirectory per installed plugin.
pub const PLUGINS_DIR: &str = "plugins";

/// Default plugin catalog location.
pub const DEFAULT_INDEX_URL: &str =
    "https://raw.githubusercontent.com/LiteLoaderQQNT/LiteLoaderQQNT-Plugin-List/v3/plugins.json";

const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";
const DEFAULT_GITHUB_BASE: &str = "https://github.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_TIMEOUT_SECS: u64 = 600;
const MAX_CONCURRENCY: usize = 256;
const DEFAULT_DOCUMENTS_SUBDIR: &str = "LiteLoaderQQNT";

/// User-tunable settings read from `llpm.config.json`.
///
/// Every field has a default, so a partial object is accepted.
///
/// # Examples
///
/// ```
/// use llpm_core::Settings;
///
/// let settings: Settings = serde_json::from_str(r#"{ "timeout_secs": 10 }"#).unwrap();
/// assert_eq!(settings.timeout_secs, 10);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Catalog URL used by `update` when none is given
    pub index_url: String,

    /// Base URL for raw manifest lookups
    pub raw_base: String,

    /// Base URL for release-asset and source-archive downloads
    pub github_base: String,

    /// Connect and idle-read timeout in seconds
    pub timeout_secs: u64,

    /// Maximum number of manifest lookups in flight
    pub concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            github_base: DEFAULT_GITHUB_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            concurrency: std::thread::available_parallelism()
                .map_or(4, std::num::NonZeroUsize::get)
                .min(MAX_CONCURRENCY),
        }
    }
}

impl Settings {
    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a value is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::Config {
                message: "timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(Error::Config {
                message: format!("timeout_secs cannot exceed {MAX_TIMEOUT_SECS} seconds"),
            });
        }

        if self.concurrency == 0 {
            return Err(Error::Config {
                message: "concurrency must be at least 1".to_string(),
            });
        }

        if self.concurrency > MAX_CONCURRENCY {
            return Err(Error::Config {
                message: format!("concurrency cannot exceed {MAX_CONCURRENCY}"),
            });
        }

        for (key, value) in [
            ("index_url", &self.index_url),
            ("raw_base", &self.raw_base),
            ("github_base", &self.github_base),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config {
                    message: format!("{key} cannot be empty"),
                });
            }
        }

        Ok(())
    }

    /// Network timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Resolved LiteLoaderQQNT data root.
///
/// # Examples
///
/// ```
/// use llpm_core::DataRoot;
/// use std::path::PathBuf;
///
/// let root = DataRoot::new("/tmp/profile");
/// assert_eq!(root.plugins_dir(), PathBuf::from("/tmp/profile/plugins"));
/// assert_eq!(root.market_path(), PathBuf::from("/tmp/profile/llpm.market.json"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRoot {
    path: PathBuf,
}

impl DataRoot {
    /// Wraps an explicit data root path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolves the data root.
    ///
    /// An explicit path (from `--root` or [`PROFILE_ENV`]) wins; otherwise
    /// the platform documents directory joined with `LiteLoaderQQNT` is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no explicit path is given and the
    /// documents directory cannot be determined.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(root = %path.display(), "using explicit data root");
            return Ok(Self::new(path));
        }

        let documents = dirs::document_dir().ok_or_else(|| Error::Config {
            message: format!(
                "cannot determine the documents directory; pass --root or set {PROFILE_ENV}"
            ),
        })?;

        Ok(Self::new(documents.join(DEFAULT_DOCUMENTS_SUBDIR)))
    }

    /// Data root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the initialization marker.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.path.join(CONFIG_FILE)
    }

    /// Path of the market cache.
    #[must_use]
    pub fn market_path(&self) -> PathBuf {
        self.path.join(MARKET_FILE)
    }

    /// Plugins root.
    #[must_use]
    pub fn plugins_dir(&self) -> PathBuf {
        self.path.join(PLUGINS_DIR)
    }

    /// Returns `true` if the marker file exists.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.config_path().is_file()
    }

    /// Fails with [`Error::NotInitialized`] unless the marker exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] for an uninitialized root.
    pub fn require_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized {
                root: self.path.clone(),
            })
        }
    }

    /// Creates the marker and the plugins directory.
    ///
    /// An existing marker is left untouched. Returns `true` if the marker
    /// was newly created.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories or the marker cannot be created.
    pub fn init(&self) -> Result<bool> {
        let plugins = self.plugins_dir();
        fs::create_dir_all(&plugins).map_err(|e| Error::from_io(&plugins, e))?;

        let marker = self.config_path();
        if marker.exists() {
            debug!(path = %marker.display(), "marker already present");
            return Ok(false);
        }

        fs::write(&marker, "{}\n").map_err(|e| Error::from_io(&marker, e))?;
        Ok(true)
    }

    /// Reads settings from the marker file.
    ///
    /// A missing, empty or unparseable marker yields defaults; unparseable
    /// content is logged. Parsed settings are validated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if parsed settings are out of range, or an
    /// I/O error if the marker exists but cannot be read.
    pub fn load_settings(&self) -> Result<Settings> {
        let marker = self.config_path();
        if !marker.is_file() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&marker).map_err(|e| Error::from_io(&marker, e))?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }

        let settings = match serde_json::from_str::<Settings>(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %marker.display(), error = %e, "ignoring unreadable settings");
                return Ok(Settings::default());
            }
        };

        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.index_url, DEFAULT_INDEX_URL);
        assert!(settings.concurrency >= 1);
    }

    #[test]
    fn test_settings_out_of_range() {
        let settings = Settings {
            timeout_secs: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::Config { .. })));

        let settings = Settings {
            timeout_secs: 601,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            concurrency: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_concurrency_upper_bound() {
        let settings = Settings {
            concurrency: usize::MAX,
            ..Settings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("cannot exceed 256"));

        let settings = Settings {
            concurrency: 256,
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_oversized_concurrency_in_marker_is_rejected() {
        let temp = TempDir::new().unwrap();
        let root = DataRoot::new(temp.path());
        root.init().unwrap();
        fs::write(root.config_path(), r#"{ "concurrency": 1000000 }"#).unwrap();

        assert!(matches!(root.load_settings(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_init_creates_marker_and_plugins() {
        let temp = TempDir::new().unwrap();
        let root = DataRoot::new(temp.path());

        assert!(!root.is_initialized());
        assert!(root.require_initialized().is_err());

        assert!(root.init().unwrap());
        assert!(root.is_initialized());
        assert!(root.plugins_dir().is_dir());

        assert!(!root.init().unwrap());
    }

    #[test]
    fn test_empty_marker_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let root = DataRoot::new(temp.path());
        fs::write(root.config_path(), "").unwrap();

        assert!(root.is_initialized());
        assert_eq!(root.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_garbage_marker_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let root = DataRoot::new(temp.path());
        fs::write(root.config_path(), "not json at all").unwrap();

        assert_eq!(root.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_settings_override() {
        let temp = TempDir::new().unwrap();
        let root = DataRoot::new(temp.path());
        fs::write(
            root.config_path(),
            r#"{ "github_base": "http://127.0.0.1:9000", "concurrency": 2 }"#,
        )
        .unwrap();

        let settings = root.load_settings().unwrap();
        assert_eq!(settings.github_base, "http://127.0.0.1:9000");
        assert_eq!(settings.concurrency, 2);
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let temp = TempDir::new().unwrap();
        let root = DataRoot::new(temp.path());
        fs::write(root.config_path(), r#"{ "timeout_secs": 0 }"#).unwrap();

        assert!(matches!(root.load_settings(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_resolve_explicit() {
        let root = DataRoot::resolve(Some(PathBuf::from("/srv/qq"))).unwrap();
        assert_eq!(root.path(), Path::new("/srv/qq"));
    }
}
