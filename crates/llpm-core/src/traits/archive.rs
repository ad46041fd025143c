//! Archive download capability.

use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// Downloads one plugin archive to a local scratch file.
///
/// Implementations must fail with [`crate::Error::DownloadFailed`] when the
/// transfer does not complete with a success status, and must not leave a
/// partially written `dest` that could be mistaken for a full archive.
///
/// # Examples
///
/// ```
/// use llpm_core::traits::ArchiveSource;
/// use llpm_core::Result;
/// use async_trait::async_trait;
/// use std::path::Path;
///
/// struct Fixture(Vec<u8>);
///
/// #[async_trait]
/// impl ArchiveSource for Fixture {
///     async fn fetch(&self, _url: &str, dest: &Path) -> Result<u64> {
///         std::fs::write(dest, &self.0)?;
///         Ok(self.0.len() as u64)
///     }
/// }
/// ```
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// Downloads `url` into `dest`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DownloadFailed`] on a non-success response
    /// or interrupted transfer, or an I/O error if `dest` cannot be written.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}
