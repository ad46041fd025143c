//! Plugin manifest model.
//!
//! A [`Manifest`] is parsed leniently: only `slug` is required, because the
//! local scan must pick up every plugin that at least identifies itself.
//! Full schema checks live in [`Manifest::validate`], the one routine shared
//! by the auditor and by anything that needs a well-formed manifest.
//!
//! # Examples
//!
//! ```
//! use llpm_core::Manifest;
//!
//! let manifest: Manifest = serde_json::from_str(r#"{
//!     "manifest_version": 3,
//!     "name": "Lite Tools",
//!     "slug": "lite_tools",
//!     "description": "Tweaks",
//!     "version": "2.1.0",
//!     "author": [{ "name": "Alice" }, { "name": "Bob" }],
//!     "repository": { "repo": "alice/LiteTools", "branch": "main" },
//!     "platform": ["win32", "linux"],
//!     "injects": { "renderer": "./renderer.js" }
//! }"#).unwrap();
//!
//! assert!(manifest.is_valid());
//! assert_eq!(manifest.author_names(), "Alice, Bob");
//! ```

use crate::{Error, Result, Slug};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Manifest format version this tool understands.
pub const MANIFEST_FORMAT_VERSION: u64 = 3;

/// Name of the manifest file inside each plugin directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Version shown for plugins removed without a readable manifest.
pub const UNKNOWN_VERSION: &str = "<unknown>";

/// Mapping from slug to manifest, ordered by slug.
pub type PluginSet = BTreeMap<Slug, Manifest>;

/// One plugin author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Display name
    pub name: String,
    /// Optional homepage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Author field: either a single record or an ordered list of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Authors {
    /// A single author record
    One(Author),
    /// Several author records
    Many(Vec<Author>),
}

impl Authors {
    /// Iterates over the author records in order.
    pub fn iter(&self) -> impl Iterator<Item = &Author> {
        match self {
            Self::One(author) => std::slice::from_ref(author).iter(),
            Self::Many(authors) => authors.iter(),
        }
    }

    fn is_empty(&self) -> bool {
        self.iter().all(|a| a.name.trim().is_empty())
    }
}

/// Release-asset download settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseRelease {
    /// Release tag, normally `latest`
    #[serde(default = "default_tag")]
    pub tag: String,
    /// File name of the release asset
    pub name: String,
}

fn default_tag() -> String {
    "latest".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

/// Where a plugin's source and releases live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// `<owner>/<name>`
    pub repo: String,
    /// Branch used for source archives and raw manifest lookups
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Present when the plugin is distributed as a release asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_release: Option<UseRelease>,
}

impl Repository {
    /// Name of the top-level directory inside a source archive of this branch.
    ///
    /// GitHub names it `{repoName}-{branch}`, with `/` in the branch name
    /// replaced by `-`.
    ///
    /// # Examples
    ///
    /// ```
    /// use llpm_core::Repository;
    ///
    /// let repo = Repository {
    ///     repo: "alice/LiteTools".to_string(),
    ///     branch: "main".to_string(),
    ///     use_release: None,
    /// };
    /// assert_eq!(repo.source_archive_root(), "LiteTools-main");
    /// ```
    #[must_use]
    pub fn source_archive_root(&self) -> String {
        let name = self.repo.rsplit('/').next().unwrap_or(&self.repo);
        format!("{name}-{}", self.branch.replace('/', "-"))
    }
}

/// One entry of the remote plugin catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// `<owner>/<name>`
    pub repo: String,
    /// Branch holding the manifest
    #[serde(default = "default_branch")]
    pub branch: String,
}

/// Metadata record describing one plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Format marker; a valid manifest carries `3`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_version: Option<Value>,

    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Unique identifier and directory name
    pub slug: Slug,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// `major.minor.patch` version string
    #[serde(default)]
    pub version: String,

    /// Author or authors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Authors>,

    /// Source repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,

    /// Supported platforms (presence-checked only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Value>,

    /// Injected scripts (presence-checked only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injects: Option<Value>,

    /// Fields this tool does not interpret, kept for lossless round-trips
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Builds a stand-in manifest for a slug that has no readable manifest.
    ///
    /// Used by forced removal of directories the local scan does not know.
    #[must_use]
    pub fn placeholder(slug: Slug) -> Self {
        Self {
            manifest_version: None,
            name: slug.to_string(),
            slug,
            description: String::new(),
            version: UNKNOWN_VERSION.to_string(),
            author: None,
            repository: None,
            platform: None,
            injects: None,
            extra: Map::new(),
        }
    }

    /// Checks the full-validity invariant.
    ///
    /// A manifest is valid iff it carries the recognized format marker and
    /// all of `name`, `slug`, `version`, `author`, `repository`, `platform`
    /// and `injects` are present and non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] listing every missing field.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();

        if self.manifest_version.as_ref().and_then(Value::as_u64) != Some(MANIFEST_FORMAT_VERSION)
        {
            missing.push("manifest_version");
        }
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.version.trim().is_empty() {
            missing.push("version");
        }
        if self.author.as_ref().is_none_or(Authors::is_empty) {
            missing.push("author");
        }
        if self
            .repository
            .as_ref()
            .is_none_or(|r| r.repo.trim().is_empty())
        {
            missing.push("repository");
        }
        if !self.platform.as_ref().is_some_and(is_truthy) {
            missing.push("platform");
        }
        if !self.injects.as_ref().is_some_and(is_truthy) {
            missing.push("injects");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidManifest {
                slug: self.slug.to_string(),
                missing,
            })
        }
    }

    /// Boolean form of [`Manifest::validate`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Returns `true` if the plugin is distributed as a release asset.
    #[must_use]
    pub fn is_release_based(&self) -> bool {
        self.repository
            .as_ref()
            .is_some_and(|r| r.use_release.is_some())
    }

    /// Resolves the archive URL for installing this plugin.
    ///
    /// With `use_release`, the release tag is the manifest's own tag
    /// (normally `latest`) unless `version` pins one. Without it, the branch
    /// source archive is used and version pins are rejected.
    ///
    /// # Errors
    ///
    /// * [`Error::UnsupportedOperation`] - version pin on a source-archive plugin
    /// * [`Error::InvalidManifest`] - no repository to download from
    ///
    /// # Examples
    ///
    /// ```
    /// use llpm_core::{Manifest, Repository, Slug, UseRelease};
    ///
    /// let mut manifest = Manifest::placeholder(Slug::new("demo").unwrap());
    /// manifest.repository = Some(Repository {
    ///     repo: "alice/demo".to_string(),
    ///     branch: "main".to_string(),
    ///     use_release: Some(UseRelease {
    ///         tag: "latest".to_string(),
    ///         name: "demo.zip".to_string(),
    ///     }),
    /// });
    ///
    /// assert_eq!(
    ///     manifest.download_url(None, "https://github.com").unwrap(),
    ///     "https://github.com/alice/demo/releases/latest/download/demo.zip"
    /// );
    /// assert_eq!(
    ///     manifest.download_url(Some("v1.0.0"), "https://github.com").unwrap(),
    ///     "https://github.com/alice/demo/releases/download/v1.0.0/demo.zip"
    /// );
    /// ```
    pub fn download_url(&self, version: Option<&str>, github_base: &str) -> Result<String> {
        let repository = self.repository.as_ref().ok_or_else(|| Error::InvalidManifest {
            slug: self.slug.to_string(),
            missing: vec!["repository"],
        })?;
        let base = github_base.trim_end_matches('/');
        let repo = &repository.repo;

        match (&repository.use_release, version) {
            (Some(release), version) => {
                let tag = version.unwrap_or(&release.tag);
                if tag == "latest" {
                    Ok(format!("{base}/{repo}/releases/latest/download/{}", release.name))
                } else {
                    Ok(format!(
                        "{base}/{repo}/releases/download/{tag}/{}",
                        release.name
                    ))
                }
            }
            (None, Some(version)) => Err(Error::UnsupportedOperation {
                reason: format!(
                    "plugin '{}' is installed from source archives and cannot be pinned to version '{version}'",
                    self.slug
                ),
            }),
            (None, None) => Ok(format!(
                "{base}/{repo}/archive/refs/heads/{}.zip",
                repository.branch
            )),
        }
    }

    /// Author names joined for display.
    #[must_use]
    pub fn author_names(&self) -> String {
        self.author
            .as_ref()
            .map(|a| {
                a.iter()
                    .map(|author| author.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    }

    /// `name@version` label used in user-facing messages.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
