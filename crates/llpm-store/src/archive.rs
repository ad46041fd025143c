//! Zip extraction.

use llpm_core::{Error, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, warn};
use zip::ZipArchive;

/// Extracts every entry of `archive_path` into `dest_dir`.
///
/// Entry names are sanitized with [`zip::read::ZipFile::enclosed_name`];
/// entries that would escape `dest_dir` are skipped with a warning.
/// Returns the number of files written.
///
/// # Errors
///
/// Returns [`Error::Extraction`] if the archive is not a readable zip, or an
/// I/O error if a file cannot be written.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<usize> {
    let file = File::open(archive_path).map_err(|e| Error::from_io(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| Error::Extraction {
        message: format!("{}: {e}", archive_path.display()),
    })?;

    fs::create_dir_all(dest_dir).map_err(|e| Error::from_io(dest_dir, e))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| Error::Extraction {
            message: format!("entry {i}: {e}"),
        })?;

        let Some(relative) = entry.enclosed_name() else {
            warn!(entry = entry.name(), "skipping archive entry outside destination");
            continue;
        };
        let out = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(|e| Error::from_io(&out, e))?;
            continue;
        }

        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::from_io(parent, e))?;
        }
        let mut out_file = File::create(&out).map_err(|e| Error::from_io(&out, e))?;
        io::copy(&mut entry, &mut out_file).map_err(|e| Error::from_io(&out, e))?;
        written += 1;
    }

    debug!(files = written, dest = %dest_dir.display(), "extracted archive");
    Ok(written)
}
