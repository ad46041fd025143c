//! Version comparator.
//!
//! Versions are dot-separated sequences of non-negative integers compared
//! position by position. No zero-padding is performed, so a shorter prefix
//! sorts before any longer sequence it prefixes (`1.2 < 1.2.1`).

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Parsed plugin version.
///
/// # Examples
///
/// ```
/// use llpm_core::Version;
///
/// let a: Version = "1.0.0".parse().unwrap();
/// let b: Version = "1.0.1".parse().unwrap();
/// assert!(a < b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(Vec<u64>);

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .split('.')
            .map(str::parse::<u64>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| Error::MalformedVersion {
                version: s.to_string(),
            })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{component}")?;
            first = false;
        }
        Ok(())
    }
}

/// Returns `true` if version `a` orders strictly before version `b`.
///
/// # Errors
///
/// Returns [`Error::MalformedVersion`] if either string has a non-numeric
/// component.
///
/// # Examples
///
/// ```
/// use llpm_core::version::is_less;
///
/// assert!(is_less("1.0.0", "1.0.1").unwrap());
/// assert!(!is_less("2.0.0", "1.9.9").unwrap());
/// assert!(is_less("1.2", "1.2.1").unwrap());
/// assert!(is_less("1.x", "1.0").is_err());
/// ```
pub fn is_less(a: &str, b: &str) -> Result<bool> {
    Ok(a.parse::<Version>()? < b.parse::<Version>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_properties() {
        assert!(is_less("1.0.0", "1.0.1").unwrap());
        assert!(!is_less("2.0.0", "1.9.9").unwrap());
        assert!(is_less("1.2", "1.2.1").unwrap());
        assert!(!is_less("1.2.0", "1.2.0").unwrap());
    }

    #[test]
    fn test_numeric_not_lexical() {
        assert!(is_less("1.9.0", "1.10.0").unwrap());
    }

    #[test]
    fn test_malformed() {
        for bad in ["", "1..0", "v1.0.0", "1.0.0-beta", "1.a"] {
            let err = bad.parse::<Version>().unwrap_err();
            assert!(
                matches!(err, Error::MalformedVersion { .. }),
                "expected MalformedVersion for {bad:?}"
            );
        }
    }

    #[test]
    fn test_display() {
        let version: Version = "01.2.3".parse().unwrap();
        assert_eq!(version.to_string(), "1.2.3");
        assert_eq!(version, "1.2.3".parse().unwrap());
    }
}
