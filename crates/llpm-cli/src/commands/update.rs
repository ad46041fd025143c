//! `llpm update`: rebuilds the market cache.

use super::emit;
use crate::context::Context;
use crate::formatters::StatusMessage;
use crate::progress::{Progress, track_count};
use anyhow::Result;
use llpm_core::cli::{ExitCode, OutputFormat};

/// Fetches the catalog and resolves every manifest.
///
/// `index` overrides the configured catalog URL for this run only.
pub async fn run(
    ctx: &mut Context,
    index: Option<&str>,
    progress: Progress,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let pb = progress.counter("Resolving plugin manifests");
    let result = ctx.update(index, track_count(&pb)).await;
    pb.finish_and_clear();

    let count = result?;
    emit(
        &StatusMessage::ok(format!("Market cache updated: {count} plugin(s)")),
        output_format,
    )?;
    Ok(ExitCode::SUCCESS)
}
