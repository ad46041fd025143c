//! Plugin directory auditor.
//!
//! Detects two integrity violations under the plugins root:
//!
//! - a valid manifest (at any depth) whose directory is not `<root>/<slug>`
//! - an immediate child directory with no entries
//!
//! With `fix`, all renames are attempted first, then all removals. Each fix
//! succeeds or fails on its own; one failure never stops the rest.

use crate::store::read_manifest;
use llpm_core::{Error, MANIFEST_FILE, Result, Slug};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One integrity violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// Manifest directory does not match the manifest's slug.
    SlugMismatch {
        /// Plugin display name
        name: String,
        /// Slug declared by the manifest
        slug: Slug,
        /// Directory holding the manifest
        current: PathBuf,
        /// Directory the manifest should be in
        expected: PathBuf,
    },
    /// Immediate child of the plugins root with no entries.
    EmptyDirectory {
        /// The empty directory
        path: PathBuf,
    },
}

impl Violation {
    /// One-line description for reports.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::SlugMismatch {
                name,
                current,
                expected,
                ..
            } => format!(
                "{name}: {} should be {}",
                current.display(),
                expected.display()
            ),
            Self::EmptyDirectory { path } => format!("empty directory {}", path.display()),
        }
    }

    fn apply(&self) -> Result<()> {
        match self {
            Self::SlugMismatch {
                current, expected, ..
            } => {
                if expected.exists() {
                    return Err(Error::FilesystemInconsistency {
                        path: expected.clone(),
                        reason: "rename target already exists".to_string(),
                    });
                }
                fs::rename(current, expected).map_err(|e| Error::from_io(current, e))
            }
            Self::EmptyDirectory { path } => {
                fs::remove_dir(path).map_err(|e| Error::from_io(path, e))
            }
        }
    }
}

/// A fix that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixFailure {
    /// The violation left in place
    pub violation: Violation,
    /// Why the fix failed
    pub reason: String,
}

/// Outcome of one audit pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Every violation found
    pub violations: Vec<Violation>,
    /// Violations repaired (only with `fix`)
    pub fixed: Vec<Violation>,
    /// Violations whose repair failed (only with `fix`)
    pub failures: Vec<FixFailure>,
}

impl AuditReport {
    /// Returns `true` if no violations were found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of violations still present after this pass.
    #[must_use]
    pub fn unresolved(&self) -> usize {
        self.violations.len() - self.fixed.len()
    }
}

/// Audits the plugins root and optionally repairs what it finds.
///
/// Unreadable manifests are skipped; invalid manifests are not considered
/// for slug checks, only valid ones.
///
/// # Errors
///
/// Returns an error only if the plugins root itself cannot be listed.
/// Individual fix failures are recorded in [`AuditReport::failures`].
///
/// # Examples
///
/// ```no_run
/// use llpm_store::audit::audit;
/// use std::path::Path;
///
/// let report = audit(Path::new("./plugins"), false).unwrap();
/// println!("{} violation(s)", report.violations.len());
/// ```
pub fn audit(root: &Path, fix: bool) -> Result<AuditReport> {
    let mut renames = find_slug_mismatches(root);
    let removals = find_empty_directories(root)?;

    let mut report = AuditReport::default();
    report.violations.append(&mut renames);
    report.violations.extend(removals);

    if fix {
        // Violations are ordered renames first, removals second.
        for violation in &report.violations {
            match violation.apply() {
                Ok(()) => {
                    info!("Fixed: {}", violation.describe());
                    report.fixed.push(violation.clone());
                }
                Err(e) => {
                    warn!("Could not fix {}: {}", violation.describe(), e);
                    report.failures.push(FixFailure {
                        violation: violation.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    Ok(report)
}

fn find_slug_mismatches(root: &Path) -> Vec<Violation> {
    let mut violations = Vec::new();

    let manifests = WalkDir::new(root)
        .min_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == MANIFEST_FILE);

    for entry in manifests {
        let path = entry.path();
        let manifest = match read_manifest(path) {
            Ok(manifest) => manifest,
            Err(e) => {
                debug!("Skipping unreadable manifest {}: {}", path.display(), e);
                continue;
            }
        };

        if !manifest.is_valid() {
            continue;
        }

        let Some(current) = path.parent() else {
            continue;
        };
        let expected = root.join(manifest.slug.as_str());
        if current != expected {
            violations.push(Violation::SlugMismatch {
                name: manifest.name.clone(),
                slug: manifest.slug,
                current: current.to_path_buf(),
                expected,
            });
        }
    }

    violations
}

fn find_empty_directories(root: &Path) -> Result<Vec<Violation>> {
    let mut violations = Vec::new();

    let mut dirs: Vec<PathBuf> = fs::read_dir(root)
        .map_err(|e| Error::from_io(root, e))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    for path in dirs {
        let is_empty = fs::read_dir(&path).is_ok_and(|mut entries| entries.next().is_none());
        if is_empty {
            violations.push(Violation::EmptyDirectory { path });
        }
    }

    Ok(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_manifest(slug: &str) -> String {
        format!(
            r#"{{
                "manifest_version": 3,
                "name": "{slug} plugin",
                "slug": "{slug}",
                "description": "",
                "version": "1.0.0",
                "author": {{ "name": "Alice" }},
                "repository": {{ "repo": "alice/{slug}", "branch": "main" }},
                "platform": ["win32", "linux", "darwin"],
                "injects": {{ "renderer": "./renderer.js" }}
            }}"#
        )
    }

    #[test]
    fn test_clean_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("ok")).unwrap();
        fs::write(temp.path().join("ok/manifest.json"), valid_manifest("ok")).unwrap();

        let report = audit(temp.path(), false).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.unresolved(), 0);
    }

    #[test]
    fn test_invalid_manifest_not_flagged_as_mismatch() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("foo")).unwrap();
        fs::write(
            temp.path().join("foo/manifest.json"),
            r#"{ "slug": "bar", "name": "Bar" }"#,
        )
        .unwrap();

        assert!(audit(temp.path(), false).unwrap().is_clean());
    }

    #[test]
    fn test_nested_manifest_detected() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("demo/demo-main")).unwrap();
        fs::write(
            temp.path().join("demo/demo-main/manifest.json"),
            valid_manifest("demo"),
        )
        .unwrap();

        let report = audit(temp.path(), false).unwrap();
        assert_eq!(
            report.violations,
            vec![Violation::SlugMismatch {
                name: "demo plugin".to_string(),
                slug: Slug::new("demo").unwrap(),
                current: temp.path().join("demo/demo-main"),
                expected: temp.path().join("demo"),
            }]
        );

        let report = audit(temp.path(), true).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.unresolved(), 1);
    }

    #[test]
    fn test_rename_target_exists_is_reported() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("foo")).unwrap();
        fs::write(temp.path().join("foo/manifest.json"), valid_manifest("bar")).unwrap();
        fs::create_dir(temp.path().join("bar")).unwrap();
        fs::write(temp.path().join("bar/readme.md"), "").unwrap();

        let report = audit(temp.path(), true).unwrap();
        assert_eq!(report.violations.len(), 1);
        assert!(report.fixed.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(temp.path().join("foo/manifest.json").is_file());
    }
}
