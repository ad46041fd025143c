//! `llpm audit`: checks and repairs the plugins directory.

use super::emit;
use crate::context::Context;
use anyhow::Result;
use llpm_core::cli::{ExitCode, OutputFormat};
use tracing::warn;

/// Reports misplaced and empty plugin directories, repairing them with `fix`.
pub async fn run(ctx: &mut Context, fix: bool, output_format: OutputFormat) -> Result<ExitCode> {
    let report = llpm_store::audit(ctx.store.root(), fix)?;
    if fix && !report.fixed.is_empty() {
        ctx.refresh_local()?;
    }
    if !report.failures.is_empty() {
        warn!("{} fix(es) failed", report.failures.len());
    }
    emit(&report, output_format)?;
    Ok(ExitCode::SUCCESS)
}
