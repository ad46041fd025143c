//! Core types, traits, and errors for the LiteLoaderQQNT plugin manager.
//!
//! This crate provides the foundational types shared by the store, market
//! and CLI crates of the workspace.
//!
//! # Architecture
//!
//! The core consists of:
//! - Strong domain types (`Slug`, `Manifest`, `Version`)
//! - Error taxonomy with remediation hints
//! - Data root layout and settings
//! - Seams for confirmation prompts and archive downloads

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod error;
mod manifest;
mod types;

pub mod cli;
pub mod traits;
pub mod version;

pub use config::{
    CONFIG_FILE, DEFAULT_INDEX_URL, DataRoot, MARKET_FILE, PLUGINS_DIR, PROFILE_ENV, Settings,
};
pub use error::{Error, Result};
pub use manifest::{
    Author, Authors, CatalogEntry, MANIFEST_FILE, MANIFEST_FORMAT_VERSION, Manifest, PluginSet,
    Repository, UNKNOWN_VERSION, UseRelease,
};
pub use types::{Slug, SlugSpec};
pub use version::Version;
