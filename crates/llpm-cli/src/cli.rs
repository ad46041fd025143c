//! CLI argument definitions and parsing.
//!
//! Defines the command-line interface structure using clap:
//! - `Cli` - Main CLI entry point
//! - `Commands` - Available subcommands

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use llpm_core::{PROFILE_ENV, Slug, SlugSpec};
use std::path::PathBuf;

/// LiteLoaderQQNT plugin package manager.
///
/// Installs, upgrades, and removes LiteLoaderQQNT plugins from the
/// community plugin market.
#[derive(Parser, Debug)]
#[command(name = "llpm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// LiteLoaderQQNT data directory (default: <Documents>/LiteLoaderQQNT)
    #[arg(long, global = true, env = PROFILE_ENV)]
    pub root: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (json, text, pretty)
    #[arg(long = "format", global = true, default_value = "pretty")]
    pub format: String,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the data directory.
    ///
    /// Creates `llpm.config.json` and the `plugins/` directory.
    Init,

    /// Install plugins from the market.
    ///
    /// # Examples
    ///
    /// ```bash
    /// llpm add lite_tools
    /// llpm add lite_tools@v2.1.0 pluginStore
    /// ```
    Add {
        /// Plugin slugs, optionally pinned with `@<release tag>`
        #[arg(required = true)]
        plugins: Vec<SlugSpec>,
    },

    /// Upgrade installed plugins.
    ///
    /// Without slugs, every outdated plugin is listed and upgraded after one
    /// confirmation.
    Upgrade {
        /// Plugins to upgrade (default: all outdated plugins)
        slugs: Vec<Slug>,

        /// Reinstall even if the installed version is current
        #[arg(short, long, requires = "slugs")]
        force: bool,
    },

    /// Refresh the market cache from the plugin catalog.
    Update {
        /// Catalog URL (default: the configured index URL)
        index: Option<String>,
    },

    /// Remove installed plugins.
    Remove {
        /// Plugins to remove
        #[arg(required = true)]
        slugs: Vec<Slug>,

        /// Remove the directory even if no manifest with this slug is installed
        #[arg(short, long)]
        force: bool,
    },

    /// List installed plugins.
    List,

    /// List plugins available in the market.
    Market,

    /// Check the plugins directory for misplaced and empty directories.
    Audit {
        /// Rename misplaced plugins and delete empty directories
        #[arg(long)]
        fix: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell for completion generation
        #[arg(value_enum)]
        shell: Shell,
    },
}
