//! Remote plugin market for the LiteLoaderQQNT plugin manager.
//!
//! - [`MarketClient::fetch_catalog`] reads the plugin catalog
//! - [`MarketClient::resolve_manifests`] fans out one manifest lookup per
//!   catalog entry, bounded by the configured concurrency
//! - [`cache::persist`] / [`cache::load`] store the resolved set on disk
//! - [`MarketClient::download`] streams plugin archives to disk and backs the
//!   [`ArchiveSource`](llpm_core::traits::ArchiveSource) implementation

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod cache;
mod client;
mod download;

pub use client::MarketClient;
