//! Plugin directory layout repair.
//!
//! Source archives wrap their content in a `{repoName}-{branch}/` directory.
//! [`promote_nested`] lifts that directory's contents to the plugin directory
//! itself using three renames/removals, each a single filesystem call:
//!
//! ```text
//! <slug>/<nested>/...      step 1: <slug>            -> <slug>-temp
//!                          step 2: <slug>-temp/<nested> -> <slug>
//!                          step 3: remove empty <slug>-temp
//! ```
//!
//! The sequence is not atomic across a crash. A failure after step N is
//! returned with the step and the paths involved; nothing is retried.

use llpm_core::{Error, MANIFEST_FILE, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix of the sibling used while promoting a nested directory.
pub const TEMP_SUFFIX: &str = "-temp";

/// Returns `true` if `dir` holds a manifest at its top level.
#[must_use]
pub fn has_top_level_manifest(dir: &Path) -> bool {
    dir.join(MANIFEST_FILE).is_file()
}

/// Returns `true` if `dir` lacks a top-level manifest but `dir/nested` has one.
#[must_use]
pub fn needs_promotion(dir: &Path, nested: &str) -> bool {
    !has_top_level_manifest(dir) && has_top_level_manifest(&dir.join(nested))
}

/// Path of the temporary sibling used for `dir`.
fn temp_sibling(dir: &Path) -> Result<PathBuf> {
    let name = dir.file_name().ok_or_else(|| Error::FilesystemInconsistency {
        path: dir.to_path_buf(),
        reason: "plugin directory has no file name".to_string(),
    })?;
    let mut temp = name.to_os_string();
    temp.push(TEMP_SUFFIX);
    Ok(dir.with_file_name(temp))
}

/// Promotes `dir/nested` to `dir`.
///
/// # Errors
///
/// * [`Error::FilesystemInconsistency`] - the temporary sibling already
///   exists, or a step failed after the plugin directory was moved aside
/// * [`Error::PermissionDenied`] - the OS refused the first rename
pub fn promote_nested(dir: &Path, nested: &str) -> Result<()> {
    let temp = temp_sibling(dir)?;
    if temp.exists() {
        return Err(Error::FilesystemInconsistency {
            path: temp,
            reason: "leftover temporary directory from an earlier install; remove it and retry"
                .to_string(),
        });
    }

    fs::rename(dir, &temp).map_err(|e| Error::from_io(dir, e))?;
    debug!(from = %dir.display(), to = %temp.display(), "moved plugin directory aside");

    let nested_path = temp.join(nested);
    fs::rename(&nested_path, dir).map_err(|e| step_failed(&temp, "promote nested directory", &e))?;
    debug!(from = %nested_path.display(), to = %dir.display(), "promoted nested directory");

    fs::remove_dir(&temp).map_err(|e| step_failed(&temp, "remove temporary directory", &e))?;
    debug!(path = %temp.display(), "removed temporary directory");

    Ok(())
}

fn step_failed(temp: &Path, step: &str, err: &io::Error) -> Error {
    Error::FilesystemInconsistency {
        path: temp.to_path_buf(),
        reason: format!("{step} failed ({err}); plugin files remain under this path"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn nested_fixture(root: &Path) -> PathBuf {
        let dir = root.join("demo");
        fs::create_dir_all(dir.join("demo-main/src")).unwrap();
        fs::write(dir.join("demo-main/manifest.json"), "{}").unwrap();
        fs::write(dir.join("demo-main/src/main.js"), "").unwrap();
        dir
    }

    #[test]
    fn test_promote_nested() {
        let temp = TempDir::new().unwrap();
        let dir = nested_fixture(temp.path());

        assert!(needs_promotion(&dir, "demo-main"));
        promote_nested(&dir, "demo-main").unwrap();

        assert!(has_top_level_manifest(&dir));
        assert!(dir.join("src/main.js").is_file());
        assert!(!dir.join("demo-main").exists());
        assert!(!temp.path().join("demo-temp").exists());
    }

    #[test]
    fn test_refuses_existing_temp() {
        let temp = TempDir::new().unwrap();
        let dir = nested_fixture(temp.path());
        fs::create_dir(temp.path().join("demo-temp")).unwrap();

        let err = promote_nested(&dir, "demo-main").unwrap_err();
        assert!(matches!(err, Error::FilesystemInconsistency { .. }));
        assert!(dir.join("demo-main/manifest.json").is_file());
    }

    #[test]
    fn test_missing_nested_reports_temp_path() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("demo");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("readme.md"), "").unwrap();

        match promote_nested(&dir, "demo-main") {
            Err(Error::FilesystemInconsistency { path, .. }) => {
                assert_eq!(path, temp.path().join("demo-temp"));
                assert!(path.join("readme.md").is_file());
            }
            other => panic!("expected FilesystemInconsistency, got {other:?}"),
        }
    }

    #[test]
    fn test_no_promotion_when_manifest_on_top() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("demo");
        fs::create_dir_all(dir.join("demo-main")).unwrap();
        fs::write(dir.join("manifest.json"), "{}").unwrap();
        fs::write(dir.join("demo-main/manifest.json"), "{}").unwrap();

        assert!(!needs_promotion(&dir, "demo-main"));
    }
}
