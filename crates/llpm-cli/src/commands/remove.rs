//! `llpm remove`: uninstalls plugins.

use super::emit;
use crate::context::Context;
use crate::engine;
use crate::formatters::BatchView;
use anyhow::Result;
use llpm_core::Slug;
use llpm_core::cli::{ExitCode, OutputFormat};

/// Removes each named plugin after confirmation.
pub async fn run(
    ctx: &mut Context,
    slugs: &[Slug],
    force: bool,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let reports = engine::remove(ctx, slugs, force);
    emit(&BatchView::new(&reports), output_format)?;
    Ok(ExitCode::SUCCESS)
}
