//! `llpm` - LiteLoaderQQNT plugin package manager.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use llpm_cli::cli::Cli;
use llpm_cli::runner::{Invocation, execute_command, init_logging};
use llpm_core::cli::{ExitCode, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let format = cli
        .format
        .parse::<OutputFormat>()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let invocation = Invocation {
        root: cli.root,
        format,
        assume_yes: cli.yes,
    };

    let exit_code = match execute_command(cli.command, invocation).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            if let Some(hint) = e
                .downcast_ref::<llpm_core::Error>()
                .and_then(llpm_core::Error::remediation)
            {
                eprintln!("  {} {hint}", "hint:".cyan());
            }
            ExitCode::ERROR
        }
    };

    std::process::exit(exit_code.as_i32());
}
