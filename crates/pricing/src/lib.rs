//! USD price routing, quote caching and position valuation.
//!
//! This crate provides:
//! - A TTL quote cache shared by concurrent callers
//! - A price router with direct, pegged and single-hop routed resolution
//! - Collaborator traits for chain data and external quotes
//! - A valuation engine combining position amounts with USD prices

/// Prelude module for convenient imports.
pub mod prelude;

/// Quote cache.
pub mod cache;
/// Engine configuration.
pub mod config;
/// Position and portfolio valuation.
pub mod engine;
/// Error types.
pub mod error;
/// Price router.
pub mod router;
/// Collaborator traits.
pub mod sources;

#[cfg(test)]
mod testing;
