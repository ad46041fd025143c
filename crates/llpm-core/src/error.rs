//! Error types for the plugin manager.
//!
//! Every library crate in the workspace reports failures through [`Error`],
//! so the command layer can render one consistent diagnostic (plus a
//! suggested follow-up command) regardless of where the failure happened.
//!
//! # Examples
//!
//! ```
//! use llpm_core::{Error, Result};
//!
//! fn require_installed(slug: &str, installed: bool) -> Result<()> {
//!     if !installed {
//!         return Err(Error::NotInstalled {
//!             slug: slug.to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = require_installed("qwqnt-demo", false).unwrap_err();
//! assert!(matches!(err, Error::NotInstalled { .. }));
//! assert!(err.remediation().unwrap().contains("llpm list"));
//! ```

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for plugin manager operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested slug is not present in the remote plugin set.
    #[error("plugin '{slug}' does not exist in the market")]
    PluginNotFound {
        /// Slug that was requested
        slug: String,
    },

    /// The slug is not installed locally.
    #[error("plugin '{slug}' is not installed")]
    NotInstalled {
        /// Slug that was requested
        slug: String,
    },

    /// The plugin is already at the requested version; nothing was changed.
    #[error("plugin '{slug}' is already up to date (v{version})")]
    AlreadyUpToDate {
        /// Slug of the plugin
        slug: String,
        /// Version currently installed
        version: String,
    },

    /// The requested combination of options cannot be carried out.
    ///
    /// Raised for version pins on source-archive repositories and for
    /// `--force` combined with a bulk upgrade.
    #[error("unsupported operation: {reason}")]
    UnsupportedOperation {
        /// Why the operation is not supported
        reason: String,
    },

    /// A network request failed, timed out, or returned a non-success status.
    #[error("network request to {url} failed: {message}")]
    Network {
        /// URL that was requested
        url: String,
        /// Description of the failure
        message: String,
    },

    /// An archive download did not complete successfully.
    #[error("download from {url} failed: {message}")]
    DownloadFailed {
        /// URL of the archive
        url: String,
        /// Description of the failure
        message: String,
    },

    /// A remote document could not be parsed.
    #[error("failed to parse {what}: {source}")]
    Parse {
        /// What was being parsed (e.g. "plugin catalog")
        what: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// The local market cache could not be read.
    #[error("market cache {} is unreadable: {message}", .path.display())]
    CacheCorrupt {
        /// Path of the cache file
        path: PathBuf,
        /// Description of the failure
        message: String,
    },

    /// A version string has a non-numeric component.
    #[error("malformed version string: '{version}'")]
    MalformedVersion {
        /// The offending version string
        version: String,
    },

    /// The operating system refused a delete or rename.
    #[error("permission denied: {}", .path.display())]
    PermissionDenied {
        /// Path that could not be modified
        path: PathBuf,
    },

    /// The plugin directory does not satisfy its layout invariant.
    #[error("filesystem inconsistency at {}: {reason}", .path.display())]
    FilesystemInconsistency {
        /// Path where the inconsistency was found
        path: PathBuf,
        /// Description of the inconsistency
        reason: String,
    },

    /// A manifest is missing fields required by the manifest format.
    #[error("invalid manifest for '{slug}': missing {}", .missing.join(", "))]
    InvalidManifest {
        /// Slug of the manifest (may be empty when the slug itself is missing)
        slug: String,
        /// Names of the missing fields
        missing: Vec<&'static str>,
    },

    /// A slug cannot be used as a directory name.
    #[error("invalid slug '{slug}': {reason}")]
    InvalidSlug {
        /// The rejected slug
        slug: String,
        /// Why the slug was rejected
        reason: String,
    },

    /// An archive could not be extracted.
    #[error("failed to extract archive: {message}")]
    Extraction {
        /// Description of the failure
        message: String,
    },

    /// Settings are out of range.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// A targeted upgrade removed the old install but the new one failed.
    ///
    /// The plugin is left uninstalled; there is no automatic rollback.
    #[error("plugin '{slug}' was removed but reinstalling failed: {source}")]
    ReinstallFailed {
        /// Slug of the plugin
        slug: String,
        /// The install error
        #[source]
        source: Box<Error>,
    },

    /// The data root has not been initialized with `llpm init`.
    #[error("LiteLoaderQQNT data directory is not initialized: {}", .root.display())]
    NotInitialized {
        /// Data root that was checked
        root: PathBuf,
    },

    /// I/O error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error for local documents.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Converts an I/O error on `path` into the error taxonomy.
    ///
    /// Permission failures become [`Error::PermissionDenied`] so the caller
    /// can print an actionable hint instead of a raw OS message.
    #[must_use]
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(err)
        }
    }

    /// Returns `true` if this is an [`Error::AlreadyUpToDate`] error.
    ///
    /// Callers treat this as an informational outcome, not a failure.
    #[must_use]
    pub const fn is_up_to_date(&self) -> bool {
        matches!(self, Self::AlreadyUpToDate { .. })
    }

    /// Suggested follow-up for the user, if there is one.
    ///
    /// # Examples
    ///
    /// ```
    /// use llpm_core::Error;
    ///
    /// let err = Error::PluginNotFound { slug: "demo".to_string() };
    /// assert!(err.remediation().unwrap().contains("llpm update"));
    /// ```
    #[must_use]
    pub fn remediation(&self) -> Option<String> {
        match self {
            Self::PluginNotFound { .. } => {
                Some("run `llpm update` to refresh the market cache".to_string())
            }
            Self::NotInstalled { .. } => {
                Some("run `llpm list` to see installed plugins".to_string())
            }
            Self::ReinstallFailed { slug, .. } => Some(format!(
                "run `llpm add {slug}` once the problem is resolved"
            )),
            Self::CacheCorrupt { .. } => Some("run `llpm update` to rebuild the cache".to_string()),
            Self::PermissionDenied { .. } => Some(
                "close LiteLoaderQQNT (QQ) and retry, or run from a terminal with administrator/root privileges"
                    .to_string(),
            ),
            Self::FilesystemInconsistency { .. } | Self::InvalidManifest { .. } => {
                Some("run `llpm audit --fix` to repair the plugin directory".to_string())
            }
            Self::Network { .. } | Self::DownloadFailed { .. } => {
                Some("check your network connection and retry".to_string())
            }
            Self::NotInitialized { .. } => Some(
                "run `llpm init` inside the LiteLoaderQQNT data directory, or set LITELOADERQQNT_PROFILE"
                    .to_string(),
            ),
            Self::MalformedVersion { .. } => {
                Some("use `llpm upgrade <slug> --force` to reinstall the plugin".to_string())
            }
            _ => None,
        }
    }
}

/// Result type alias for plugin manager operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_not_found_display() {
        let err = Error::PluginNotFound {
            slug: "demo".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("demo"));
        assert!(display.contains("market"));
    }

    #[test]
    fn test_from_io_permission_denied() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::from_io(Path::new("/plugins/demo"), io_err);
        assert!(matches!(err, Error::PermissionDenied { .. }));
        assert!(err.remediation().unwrap().contains("administrator"));
    }

    #[test]
    fn test_from_io_other_kind() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = Error::from_io(Path::new("/plugins/demo"), io_err);
        assert!(matches!(err, Error::Io(_)));
        assert!(err.remediation().is_none());
    }

    #[test]
    fn test_invalid_manifest_lists_fields() {
        let err = Error::InvalidManifest {
            slug: "demo".to_string(),
            missing: vec!["platform", "injects"],
        };
        assert_eq!(
            err.to_string(),
            "invalid manifest for 'demo': missing platform, injects"
        );
    }

    #[test]
    fn test_up_to_date_is_informational() {
        let err = Error::AlreadyUpToDate {
            slug: "demo".to_string(),
            version: "1.0.0".to_string(),
        };
        assert!(err.is_up_to_date());
        assert!(err.remediation().is_none());
    }

    #[test]
    fn test_download_failure_hint() {
        let err = Error::DownloadFailed {
            url: "https://example.com/a.zip".to_string(),
            message: "HTTP 404".to_string(),
        };
        assert!(err.to_string().contains("HTTP 404"));
        assert!(err.remediation().unwrap().contains("network"));
    }

    #[test]
    fn test_reinstall_failed_hint() {
        let err = Error::ReinstallFailed {
            slug: "demo".to_string(),
            source: Box::new(Error::DownloadFailed {
                url: "https://example.com/demo.zip".to_string(),
                message: "HTTP 502".to_string(),
            }),
        };
        assert!(err.to_string().contains("HTTP 502"));
        assert!(err.remediation().unwrap().contains("llpm add demo"));
    }

    #[test]
    fn test_error_source_chain() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = Error::Parse {
            what: "plugin catalog".to_string(),
            source: json_err,
        };

        use std::error::Error as _;
        assert!(err.source().is_some());
    }
}
