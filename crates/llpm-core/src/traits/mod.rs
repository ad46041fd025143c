//! Seams between the reconciliation engine and its collaborators.
//!
//! - `confirm` - yes/no gate for destructive batch operations
//! - `archive` - archive download into a scratch path
//!
//! Both are injected into the CLI context, so tests can swap in fixed
//! answers and in-memory archives.

mod archive;
mod confirm;

pub use archive::ArchiveSource;
pub use confirm::{Confirm, FixedAnswer};
