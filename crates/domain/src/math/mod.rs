//! Fixed-point mathematics for concentrated liquidity pools.
//!
//! All conversions are pure and deterministic. Intermediate products are
//! carried in 512-bit integers so that squaring a Q64.96 sqrt price or
//! scaling liquidity by `2^96` never overflows before the final narrowing.

/// Liquidity to token amount formulas.
pub mod concentrated_liquidity;
/// Wide multiplication and division helpers.
pub mod full_math;
/// Sqrt price, tick and decimal price conversions.
pub mod price_tick;
/// Tick to sqrt ratio conversion.
pub mod tick_math;

pub use concentrated_liquidity::{amount0_delta, amount1_delta, amounts_for_liquidity};
pub use full_math::raw_to_decimal;
pub use price_tick::{
    price_to_sqrt_price, price_to_tick, sqrt_price_to_inverse_price, sqrt_price_to_price,
    tick_to_price,
};
pub use tick_math::{
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, sqrt_price_to_tick, tick_to_sqrt_price,
};
