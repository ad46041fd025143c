//! `llpm init`: marks a directory as the LiteLoaderQQNT data root.

use super::emit;
use crate::formatters::StatusMessage;
use anyhow::Result;
use llpm_core::DataRoot;
use llpm_core::cli::{ExitCode, OutputFormat};

/// Creates the marker file and the plugins directory.
///
/// Running it again on an initialized root changes nothing.
pub async fn run(root: &DataRoot, output_format: OutputFormat) -> Result<ExitCode> {
    let created = root.init()?;
    let message = if created {
        format!("Initialized LiteLoaderQQNT data directory: {}", root.path().display())
    } else {
        format!("Already initialized: {}", root.path().display())
    };
    emit(&StatusMessage::ok(message), output_format)?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let root = DataRoot::new(temp.path());

        assert_eq!(run(&root, OutputFormat::Json).await.unwrap(), ExitCode::SUCCESS);
        assert!(root.is_initialized());
        assert_eq!(run(&root, OutputFormat::Json).await.unwrap(), ExitCode::SUCCESS);
    }
}
