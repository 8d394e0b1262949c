//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use lpv_domain::prelude::*;
//! ```

// Entities
pub use crate::entities::{PoolState, Position, Token, TokenId};

// Enums
pub use crate::enums::{Chain, PriceSource};

// Errors
pub use crate::error::{MathError, ValuationError};

// Fees
pub use crate::fees::{FeeGrowthInside, FeeGrowthTrackers, TickFeeGrowthOutside, UnclaimedFees};

// Math
pub use crate::math::{
    amounts_for_liquidity, price_to_tick, sqrt_price_to_inverse_price, sqrt_price_to_price,
    sqrt_price_to_tick, tick_to_price, tick_to_sqrt_price,
};

// Registry
pub use crate::registry::TokenRegistry;

// Valuation
pub use crate::valuation::{PositionValuation, PositionValuator};

// Value objects
pub use crate::value_objects::{PriceQuote, QuoteKey, TokenAmount};
