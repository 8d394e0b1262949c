use crate::error::MathError;
use crate::math::full_math::{narrow, q96};
use primitive_types::{U256, U512};

fn sorted(sqrt_price_a: U256, sqrt_price_b: U256) -> (U256, U256) {
    if sqrt_price_a <= sqrt_price_b {
        (sqrt_price_a, sqrt_price_b)
    } else {
        (sqrt_price_b, sqrt_price_a)
    }
}

/// Calculates the amount of token0 (x) given liquidity and price range.
/// delta_x = L * (sqrt(P_b) - sqrt(P_a)) / (sqrt(P_a) * sqrt(P_b))
///
/// Rounds down: `floor(floor(L * 2^96 * delta / sqrt(P_b)) / sqrt(P_a))`.
pub fn amount0_delta(
    sqrt_price_a: U256,
    sqrt_price_b: U256,
    liquidity: u128,
) -> Result<U256, MathError> {
    let (lower, upper) = sorted(sqrt_price_a, sqrt_price_b);
    if lower.is_zero() {
        return Err(MathError::InvalidSqrtPrice(lower));
    }

    let numerator1 = U256::from(liquidity) << 96;
    let numerator2 = upper - lower;

    let product = numerator1.full_mul(numerator2);
    narrow(product / U512::from(upper) / U512::from(lower))
}

/// Calculates the amount of token1 (y) given liquidity and price range.
/// delta_y = L * (sqrt(P_b) - sqrt(P_a))
///
/// Rounds down: `floor(L * delta / 2^96)`.
pub fn amount1_delta(
    sqrt_price_a: U256,
    sqrt_price_b: U256,
    liquidity: u128,
) -> Result<U256, MathError> {
    let (lower, upper) = sorted(sqrt_price_a, sqrt_price_b);
    let product = U256::from(liquidity).full_mul(upper - lower);
    narrow(product / U512::from(q96()))
}

/// Token amounts held by `liquidity` over `[sqrt_lower, sqrt_upper)` at `sqrt_current`.
///
/// Below the range the position is entirely token0, above it entirely token1.
pub fn amounts_for_liquidity(
    liquidity: u128,
    sqrt_current: U256,
    sqrt_lower: U256,
    sqrt_upper: U256,
) -> Result<(U256, U256), MathError> {
    let (sqrt_lower, sqrt_upper) = sorted(sqrt_lower, sqrt_upper);
    if liquidity == 0 {
        return Ok((U256::zero(), U256::zero()));
    }

    if sqrt_current <= sqrt_lower {
        Ok((amount0_delta(sqrt_lower, sqrt_upper, liquidity)?, U256::zero()))
    } else if sqrt_current >= sqrt_upper {
        Ok((U256::zero(), amount1_delta(sqrt_lower, sqrt_upper, liquidity)?))
    } else {
        Ok((
            amount0_delta(sqrt_current, sqrt_upper, liquidity)?,
            amount1_delta(sqrt_lower, sqrt_current, liquidity)?,
        ))
    }
}
