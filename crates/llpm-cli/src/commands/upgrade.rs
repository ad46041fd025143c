//! `llpm upgrade`: brings installed plugins up to the market version.

use super::{emit, load_market};
use crate::context::Context;
use crate::engine;
use crate::formatters::{BatchView, PlanView, StatusMessage, format_output};
use crate::progress::Progress;
use anyhow::Result;
use llpm_core::Slug;
use llpm_core::cli::{ExitCode, OutputFormat};
use tracing::warn;

/// Upgrades the named plugins, or every outdated plugin when none are named.
///
/// The bulk plan goes to stderr before confirming, keeping stdout to one
/// result document.
pub async fn run(
    ctx: &mut Context,
    slugs: &[Slug],
    force: bool,
    progress: Progress,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    load_market(ctx, progress).await?;
    let reports = engine::upgrade(ctx, slugs, force, |plan| {
        match format_output(&PlanView::new(plan), output_format) {
            Ok(text) => eprintln!("{text}"),
            Err(e) => warn!("Failed to render upgrade plan: {}", e),
        }
    })
    .await?;

    if reports.is_empty() {
        emit(&StatusMessage::ok("All plugins are up to date"), output_format)?;
    } else {
        emit(&BatchView::new(&reports), output_format)?;
    }
    Ok(ExitCode::SUCCESS)
}
