//! `llpm market`: shows plugins available in the market.

use super::{emit, load_market};
use crate::context::Context;
use crate::formatters::PluginTable;
use crate::progress::Progress;
use anyhow::Result;
use llpm_core::cli::{ExitCode, OutputFormat};

/// Prints the cached market as a table, refreshing the cache if needed.
pub async fn run(
    ctx: &mut Context,
    progress: Progress,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    load_market(ctx, progress).await?;
    emit(&PluginTable::new(&ctx.remote), output_format)?;
    Ok(ExitCode::SUCCESS)
}
