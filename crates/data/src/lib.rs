//! Collaborator implementations and configuration loading.
//!
//! This crate provides:
//! - A CoinGecko-backed USD quote source
//! - A static in-memory quote source for offline runs
//! - A JSON snapshot implementation of the chain data source
//! - Engine configuration loading from JSON files and the environment

/// Prelude module for convenient imports.
pub mod prelude;

/// USD quote providers.
pub mod providers;
/// Configuration loading.
pub mod settings;
/// Snapshot chain data.
pub mod snapshot;
