//! LiteLoaderQQNT plugin manager CLI library.
//!
//! Exposes the argument definitions, the reconciliation engine and the
//! command handlers so they can be tested without spawning the binary.
//!
//! # Architecture
//!
//! - [`cli`] - clap argument definitions
//! - [`runner`] - logging setup and command dispatch
//! - [`context`] - per-invocation state (data root, plugin sets, seams)
//! - [`engine`] - add / upgrade / remove reconciliation
//! - [`commands`] - one module per subcommand
//! - [`formatters`] - json, text and pretty output

#![allow(clippy::format_push_string)]
#![allow(clippy::unused_async)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod commands;
pub mod confirm;
pub mod context;
pub mod engine;
pub mod formatters;
pub mod progress;
pub mod runner;
