//! Integration tests for install, remove, scan, and audit against a real
//! temporary plugins root.

use async_trait::async_trait;
use llpm_core::traits::ArchiveSource;
use llpm_core::{Error, Manifest, Result, Slug};
use llpm_store::{PluginStore, Violation, audit};
use serde_json::json;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Serves one fixed archive and records requested URLs.
struct FixtureSource {
    archive: Option<Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FixtureSource {
    fn serving(archive: Vec<u8>) -> Self {
        Self {
            archive: Some(archive),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            archive: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArchiveSource for FixtureSource {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        self.requests.lock().unwrap().push(url.to_string());
        match &self.archive {
            Some(bytes) => {
                fs::write(dest, bytes)?;
                Ok(bytes.len() as u64)
            }
            None => Err(Error::DownloadFailed {
                url: url.to_string(),
                message: "HTTP 404 Not Found".to_string(),
            }),
        }
    }
}

fn manifest_value(slug: &str, version: &str, release: bool) -> serde_json::Value {
    let mut repository = json!({ "repo": format!("alice/{slug}-plugin"), "branch": "main" });
    if release {
        repository["use_release"] = json!({ "tag": "latest", "name": format!("{slug}.zip") });
    }
    json!({
        "manifest_version": 3,
        "name": format!("{slug} plugin"),
        "slug": slug,
        "description": "fixture",
        "version": version,
        "author": [{ "name": "Alice" }],
        "repository": repository,
        "platform": ["win32", "linux", "darwin"],
        "injects": { "renderer": "./renderer.js" }
    })
}

fn manifest(slug: &str, version: &str, release: bool) -> Manifest {
    serde_json::from_value(manifest_value(slug, version, release)).unwrap()
}

fn build_zip(prefix: &str, manifest: &Manifest) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer
        .start_file(format!("{prefix}manifest.json"), options)
        .unwrap();
    writer
        .write_all(serde_json::to_string_pretty(manifest).unwrap().as_bytes())
        .unwrap();
    writer
        .start_file(format!("{prefix}renderer.js"), options)
        .unwrap();
    writer.write_all(b"export const onLoad = () => {};").unwrap();
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn test_install_remove_inverse() {
    let temp = TempDir::new().unwrap();
    let store = PluginStore::open(temp.path()).unwrap();
    let m = manifest("demo", "1.0.0", true);
    let archive = build_zip("", &m);
    let source = FixtureSource::serving(archive.clone());

    let outcome = store.install(&m, None, &source).await.unwrap();
    assert!(outcome.manifest_found);
    assert_eq!(outcome.version, "1.0.0");
    assert_eq!(outcome.bytes, archive.len() as u64);
    assert_eq!(
        outcome.url,
        "https://github.com/alice/demo-plugin/releases/latest/download/demo.zip"
    );
    assert_eq!(source.requests(), vec![outcome.url.clone()]);

    let scanned = store.scan().unwrap();
    assert_eq!(scanned.get("demo"), Some(&m));

    store.remove(&m).unwrap();
    assert!(!store.scan().unwrap().contains_key("demo"));
    assert!(!temp.path().join("demo").exists());
}

#[tokio::test]
async fn test_source_archive_is_normalized() {
    let temp = TempDir::new().unwrap();
    let store = PluginStore::open(temp.path()).unwrap();
    let m = manifest("demo", "1.0.0", false);
    let source = FixtureSource::serving(build_zip("demo-plugin-main/", &m));

    let outcome = store.install(&m, None, &source).await.unwrap();

    assert!(outcome.manifest_found);
    assert_eq!(
        source.requests(),
        vec!["https://github.com/alice/demo-plugin/archive/refs/heads/main.zip"]
    );
    assert!(temp.path().join("demo/manifest.json").is_file());
    assert!(temp.path().join("demo/renderer.js").is_file());
    assert!(!temp.path().join("demo/demo-plugin-main").exists());
    assert!(!temp.path().join("demo-temp").exists());
}

#[tokio::test]
async fn test_install_without_manifest_soft_succeeds() {
    let temp = TempDir::new().unwrap();
    let store = PluginStore::open(temp.path()).unwrap();
    let m = manifest("demo", "1.0.0", false);
    let source = FixtureSource::serving(build_zip("unexpected-root/", &m));

    let outcome = store.install(&m, None, &source).await.unwrap();

    assert!(!outcome.manifest_found);
    assert!(temp.path().join("demo/unexpected-root/manifest.json").is_file());
    assert!(store.scan().unwrap().is_empty());
}

#[tokio::test]
async fn test_reinstall_replaces_previous_version() {
    let temp = TempDir::new().unwrap();
    let store = PluginStore::open(temp.path()).unwrap();

    let old = manifest("demo", "1.0.0", true);
    store
        .install(&old, None, &FixtureSource::serving(build_zip("", &old)))
        .await
        .unwrap();
    fs::write(temp.path().join("demo/stale.js"), "").unwrap();

    let new = manifest("demo", "1.2.0", true);
    store
        .install(&new, None, &FixtureSource::serving(build_zip("", &new)))
        .await
        .unwrap();

    assert_eq!(store.scan().unwrap()["demo"].version, "1.2.0");
    assert!(!temp.path().join("demo/stale.js").exists());
}

#[tokio::test]
async fn test_failed_download_keeps_existing_install() {
    let temp = TempDir::new().unwrap();
    let store = PluginStore::open(temp.path()).unwrap();

    let old = manifest("demo", "1.0.0", true);
    store
        .install(&old, None, &FixtureSource::serving(build_zip("", &old)))
        .await
        .unwrap();

    let err = store
        .install(&manifest("demo", "1.2.0", true), None, &FixtureSource::failing())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DownloadFailed { .. }));
    assert_eq!(store.scan().unwrap()["demo"].version, "1.0.0");
}

#[tokio::test]
async fn test_corrupt_archive_leaves_no_partial_directory() {
    let temp = TempDir::new().unwrap();
    let store = PluginStore::open(temp.path()).unwrap();
    let m = manifest("demo", "1.0.0", true);
    let source = FixtureSource::serving(b"not a zip".to_vec());

    let err = store.install(&m, None, &source).await.unwrap_err();

    assert!(matches!(err, Error::Extraction { .. }));
    assert!(!temp.path().join("demo").exists());
}

#[tokio::test]
async fn test_version_pin_on_source_archive_rejected_before_download() {
    let temp = TempDir::new().unwrap();
    let store = PluginStore::open(temp.path()).unwrap();
    let m = manifest("demo", "1.0.0", false);
    let source = FixtureSource::serving(build_zip("", &m));

    let err = store.install(&m, Some("v1.0.0"), &source).await.unwrap_err();

    assert!(matches!(err, Error::UnsupportedOperation { .. }));
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn test_pinned_release_version() {
    let temp = TempDir::new().unwrap();
    let store = PluginStore::open(temp.path())
        .unwrap()
        .with_github_base("http://mirror.local/");
    let m = manifest("demo", "1.2.0", true);
    let source = FixtureSource::serving(build_zip("", &m));

    let outcome = store.install(&m, Some("v1.1.0"), &source).await.unwrap();

    assert_eq!(outcome.version, "1.1.0");
    assert_eq!(
        source.requests(),
        vec!["http://mirror.local/alice/demo-plugin/releases/download/v1.1.0/demo.zip"]
    );
}

#[test]
fn test_scan_is_idempotent() {
    let temp = TempDir::new().unwrap();
    for slug in ["a", "b", "c"] {
        let dir = temp.path().join(slug);
        fs::create_dir(&dir).unwrap();
        fs::write(
            dir.join("manifest.json"),
            manifest_value(slug, "1.0.0", true).to_string(),
        )
        .unwrap();
    }
    fs::create_dir(temp.path().join("junk")).unwrap();

    let store = PluginStore::open(temp.path()).unwrap();
    let first = store.scan().unwrap();
    let second = store.scan().unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_audit_detects_and_fixes() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir(root.join("foo")).unwrap();
    fs::write(
        root.join("foo/manifest.json"),
        manifest_value("bar", "1.0.0", true).to_string(),
    )
    .unwrap();
    fs::create_dir(root.join("baz")).unwrap();

    let report = audit(root, false).unwrap();
    assert_eq!(
        report.violations,
        vec![
            Violation::SlugMismatch {
                name: "bar plugin".to_string(),
                slug: Slug::new("bar").unwrap(),
                current: root.join("foo"),
                expected: root.join("bar"),
            },
            Violation::EmptyDirectory {
                path: root.join("baz"),
            },
        ]
    );
    assert!(report.fixed.is_empty());
    assert_eq!(report.unresolved(), 2);

    let report = audit(root, true).unwrap();
    assert_eq!(report.fixed.len(), 2);
    assert!(report.failures.is_empty());
    assert_eq!(report.unresolved(), 0);
    assert!(root.join("bar/manifest.json").is_file());
    assert!(!root.join("foo").exists());
    assert!(!root.join("baz").exists());

    assert!(audit(root, false).unwrap().is_clean());
}
