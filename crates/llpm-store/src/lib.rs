//! Plugin directory management for the LiteLoaderQQNT plugin manager.
//!
//! Everything that reads or mutates the plugins root lives here:
//!
//! - [`PluginStore::scan`] builds the local plugin set
//! - [`PluginStore::install`] downloads, extracts, and normalizes a plugin
//! - [`PluginStore::remove`] / [`PluginStore::remove_slug`] delete one
//! - [`audit::audit`] finds and repairs directory integrity violations
//!
//! # Architecture
//!
//! ```text
//! ./plugins/
//! ├── <slug>/
//! │   ├── manifest.json
//! │   └── ...
//! ```
//!
//! Network access is not done here; installs take an
//! [`ArchiveSource`](llpm_core::traits::ArchiveSource) that fetches the
//! archive into a scratch directory.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod archive;
pub mod audit;
pub mod layout;
pub mod store;

pub use audit::{AuditReport, FixFailure, Violation, audit};
pub use store::{InstallOutcome, PluginStore, read_manifest};
