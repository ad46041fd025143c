//! `llpm add`: installs plugins from the market.

use super::{emit, load_market};
use crate::context::Context;
use crate::engine;
use crate::formatters::BatchView;
use crate::progress::Progress;
use anyhow::Result;
use llpm_core::SlugSpec;
use llpm_core::cli::{ExitCode, OutputFormat};

/// Installs each requested plugin, optionally pinned to a release tag.
pub async fn run(
    ctx: &mut Context,
    specs: &[SlugSpec],
    progress: Progress,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    load_market(ctx, progress).await?;
    let reports = engine::add(ctx, specs).await;
    emit(&BatchView::new(&reports), output_format)?;
    Ok(ExitCode::SUCCESS)
}
