//! Strong domain types for the plugin manager.
//!
//! Slugs double as on-disk directory names, so they are validated once at
//! construction (and at deserialization) instead of being re-checked by
//! every filesystem operation.
//!
//! # Examples
//!
//! ```
//! use llpm_core::Slug;
//!
//! let slug = Slug::new("lite_tools").unwrap();
//! assert_eq!(slug.as_str(), "lite_tools");
//!
//! assert!(Slug::new("../escape").is_err());
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Plugin identifier (newtype over String).
///
/// A slug is unique within a plugin set and is used verbatim as the name of
/// the plugin's directory under the plugins root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Creates a new slug after checking it is a safe directory name.
    ///
    /// Rejects names that:
    /// - Are empty
    /// - Are parent directory references (. or ..)
    /// - Contain path separators (/ or \)
    /// - Contain control characters
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSlug`] if the name is not a valid slug.
    ///
    /// # Examples
    ///
    /// ```
    /// use llpm_core::Slug;
    ///
    /// assert!(Slug::new("pluginStore").is_ok());
    /// assert!(Slug::new("").is_err());
    /// assert!(Slug::new("a/b").is_err());
    /// ```
    pub fn new(slug: impl Into<String>) -> Result<Self> {
        let slug = slug.into();

        let reason = if slug.is_empty() {
            Some("slug cannot be empty")
        } else if slug == "." || slug == ".." {
            Some("slug cannot be '.' or '..'")
        } else if slug.contains('/') || slug.contains('\\') {
            Some("slug cannot contain path separators")
        } else if slug.chars().any(char::is_control) {
            Some("slug cannot contain control characters")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::InvalidSlug {
                slug,
                reason: reason.to_string(),
            }),
            None => Ok(Self(slug)),
        }
    }

    /// Returns the slug as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns the inner `String`.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl FromStr for Slug {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Slug {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A slug with an optional `@version` suffix, as accepted by `llpm add`.
///
/// # Examples
///
/// ```
/// use llpm_core::SlugSpec;
///
/// let spec: SlugSpec = "lite_tools@v2.1.0".parse().unwrap();
/// assert_eq!(spec.slug.as_str(), "lite_tools");
/// assert_eq!(spec.version.as_deref(), Some("v2.1.0"));
///
/// let bare: SlugSpec = "lite_tools".parse().unwrap();
/// assert!(bare.version.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugSpec {
    /// Plugin slug
    pub slug: Slug,
    /// Requested release tag, if any
    pub version: Option<String>,
}

impl FromStr for SlugSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('@') {
            Some((slug, version)) if !version.is_empty() => Ok(Self {
                slug: Slug::new(slug)?,
                version: Some(version.to_string()),
            }),
            Some((slug, _)) => Ok(Self {
                slug: Slug::new(slug)?,
                version: None,
            }),
            None => Ok(Self {
                slug: Slug::new(s)?,
                version: None,
            }),
        }
    }
}

impl fmt::Display for SlugSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{version}", self.slug),
            None => write!(f, "{}", self.slug),
        }
    }
}
