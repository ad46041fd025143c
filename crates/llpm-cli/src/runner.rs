//! Command execution and runtime logic.
//!
//! Contains logging initialization and the dispatch from parsed arguments
//! to command handlers.

use anyhow::Result;
use clap::CommandFactory;
use llpm_core::DataRoot;
use llpm_core::cli::{ExitCode, OutputFormat};
use llpm_core::traits::{ArchiveSource, Confirm, FixedAnswer};
use llpm_market::MarketClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::commands;
use crate::confirm::DialoguerConfirm;
use crate::context::Context;
use crate::formatters::{StatusMessage, format_output};
use crate::progress::{Progress, ProgressDownloader};

/// Options that apply to every subcommand.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Explicit data root (`--root` or the profile environment variable)
    pub root: Option<PathBuf>,
    /// Output format
    pub format: OutputFormat,
    /// Answer yes to every confirmation
    pub assume_yes: bool,
}

/// Initializes logging infrastructure.
///
/// Logs go to stderr. `verbose` forces the `debug` level; otherwise
/// `RUST_LOG` is honored and the default is `warn`, so command output on
/// stdout stays clean.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}

/// Executes the specified CLI command.
///
/// Every command except `init` and `completions` requires an initialized
/// data root; otherwise a diagnostic is printed and
/// [`ExitCode::NOT_INITIALIZED`] is returned.
///
/// # Errors
///
/// Returns an error if a command fails as a whole (for example the catalog
/// cannot be fetched). Per-plugin failures are reported, not returned.
pub async fn execute_command(command: Commands, invocation: Invocation) -> Result<ExitCode> {
    let format = invocation.format;

    if let Commands::Completions { shell } = command {
        let mut cmd = Cli::command();
        return commands::completions::run(shell, &mut cmd).await;
    }

    let root = DataRoot::resolve(invocation.root)?;
    debug!(root = %root.path().display(), "resolved data root");

    if matches!(command, Commands::Init) {
        return commands::init::run(&root, format).await;
    }

    if let Err(e) = root.require_initialized() {
        eprintln!("{}", format_output(&StatusMessage::failed(&e), format)?);
        return Ok(ExitCode::NOT_INITIALIZED);
    }

    let settings = root.load_settings()?;
    let progress = Progress::new(format.is_interactive());
    let source: Arc<dyn ArchiveSource> = Arc::new(ProgressDownloader::new(
        MarketClient::new(&settings)?,
        progress,
    ));
    let confirm: Box<dyn Confirm> = if invocation.assume_yes {
        Box::new(FixedAnswer(true))
    } else {
        Box::new(DialoguerConfirm)
    };
    let mut ctx = Context::new(root, settings, source, confirm)?;

    match command {
        Commands::Add { plugins } => commands::add::run(&mut ctx, &plugins, progress, format).await,
        Commands::Upgrade { slugs, force } => {
            commands::upgrade::run(&mut ctx, &slugs, force, progress, format).await
        }
        Commands::Update { index } => {
            commands::update::run(&mut ctx, index.as_deref(), progress, format).await
        }
        Commands::Remove { slugs, force } => {
            commands::remove::run(&mut ctx, &slugs, force, format).await
        }
        Commands::List => commands::list::run(&ctx, format).await,
        Commands::Market => commands::market::run(&mut ctx, progress, format).await,
        Commands::Audit { fix } => commands::audit::run(&mut ctx, fix, format).await,
        Commands::Init | Commands::Completions { .. } => Ok(ExitCode::SUCCESS),
    }
}
