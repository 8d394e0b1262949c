//! Domain model and fixed-point mathematics for concentrated liquidity positions.
//!
//! This crate provides:
//! - Q64.96 sqrt-price and tick conversions
//! - Liquidity to token amount formulas with conservative rounding
//! - Fee growth accounting for unclaimed fees
//! - Typed token metadata registry
//! - Position valuation against a pool snapshot

/// Prelude module for convenient imports.
pub mod prelude;

/// Domain entities (tokens, pools, positions).
pub mod entities;
/// Shared enumerations.
pub mod enums;
/// Error types.
pub mod error;
/// Fee growth accounting.
pub mod fees;
/// Fixed-point mathematics.
pub mod math;
/// Token metadata registry.
pub mod registry;
/// Position valuation.
pub mod valuation;
/// Value objects.
pub mod value_objects;
