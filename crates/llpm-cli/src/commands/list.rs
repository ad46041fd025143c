//! `llpm list`: shows installed plugins.

use super::emit;
use crate::context::Context;
use crate::formatters::PluginTable;
use anyhow::Result;
use llpm_core::cli::{ExitCode, OutputFormat};

/// Prints the installed plugins as a table.
pub async fn run(ctx: &Context, output_format: OutputFormat) -> Result<ExitCode> {
    emit(&PluginTable::new(&ctx.local), output_format)?;
    Ok(ExitCode::SUCCESS)
}
