//! Command implementations for the plugin manager CLI.
//!
//! Each module runs one subcommand against the invocation [`Context`] and
//! prints its result in the requested output format.
//!
//! [`Context`]: crate::context::Context

pub mod add;
pub mod audit;
pub mod completions;
pub mod init;
pub mod list;
pub mod market;
pub mod remove;
pub mod update;
pub mod upgrade;

use crate::context::Context;
use crate::formatters::{Render, format_output};
use crate::progress::{Progress, track_count};
use anyhow::Result;
use llpm_core::cli::OutputFormat;
use serde::Serialize;

/// Prints a command result to stdout.
pub(crate) fn emit<T: Serialize + Render>(data: &T, format: OutputFormat) -> Result<()> {
    println!("{}", format_output(data, format)?);
    Ok(())
}

/// Loads the market cache (refreshing it if needed) behind a progress bar.
pub(crate) async fn load_market(ctx: &mut Context, progress: Progress) -> Result<()> {
    let pb = progress.counter("Loading plugin market");
    let result = ctx.load_remote(track_count(&pb)).await;
    pb.finish_and_clear();
    Ok(result?)
}
