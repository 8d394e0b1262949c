use crate::error::MathError;
use crate::math::full_math::{fraction_to_decimal, narrow, pow10};
use crate::math::tick_math::{MAX_TICK, sqrt_price_to_tick, tick_to_sqrt_price};
use primitive_types::{U256, U512};
use rust_decimal::Decimal;

fn q192() -> U512 {
    U512::one() << 192
}

fn decimal_price(
    numerator: U512,
    denominator: U512,
    decimal_shift: i32,
) -> Result<Decimal, MathError> {
    match fraction_to_decimal(numerator, denominator, decimal_shift)? {
        Some(price) if !price.is_zero() => Ok(price),
        _ => Err(MathError::PriceOutOfRange),
    }
}

/// Returns the human-scale price of token0 in token1 units.
///
/// price = (sqrtPriceX96 / 2^96)^2 * 10^(decimals0 - decimals1)
///
/// The square is taken in 512-bit arithmetic; the result is truncated toward
/// zero at the finest decimal scale that fits.
pub fn sqrt_price_to_price(
    sqrt_price_x96: U256,
    decimals0: u8,
    decimals1: u8,
) -> Result<Decimal, MathError> {
    if sqrt_price_x96.is_zero() {
        return Err(MathError::InvalidSqrtPrice(sqrt_price_x96));
    }
    decimal_price(
        sqrt_price_x96.full_mul(sqrt_price_x96),
        q192(),
        i32::from(decimals0) - i32::from(decimals1),
    )
}

/// Returns the human-scale price of token1 in token0 units.
///
/// Computed as `2^192 / sqrtPriceX96^2` directly, not as the reciprocal of a
/// truncated decimal.
pub fn sqrt_price_to_inverse_price(
    sqrt_price_x96: U256,
    decimals0: u8,
    decimals1: u8,
) -> Result<Decimal, MathError> {
    if sqrt_price_x96.is_zero() {
        return Err(MathError::InvalidSqrtPrice(sqrt_price_x96));
    }
    decimal_price(
        q192(),
        sqrt_price_x96.full_mul(sqrt_price_x96),
        i32::from(decimals1) - i32::from(decimals0),
    )
}

/// Returns the Q64.96 sqrt price for a human-scale price of token0 in token1 units.
pub fn price_to_sqrt_price(price: Decimal, decimals0: u8, decimals1: u8) -> Result<U256, MathError> {
    if price <= Decimal::ZERO {
        return Err(MathError::PriceOutOfRange);
    }
    let mantissa = U512::from(price.mantissa().unsigned_abs());
    let exp = i32::from(decimals1) - i32::from(decimals0) - price.scale() as i32;

    let ratio_x192 = if exp >= 0 {
        mantissa
            .checked_mul(pow10(exp.unsigned_abs())?)
            .and_then(|v| v.checked_mul(q192()))
            .ok_or(MathError::Overflow)?
    } else {
        mantissa
            .checked_mul(q192())
            .ok_or(MathError::Overflow)?
            / pow10(exp.unsigned_abs())?
    };

    let sqrt = narrow(ratio_x192.integer_sqrt())?;
    if sqrt.is_zero() {
        return Err(MathError::PriceOutOfRange);
    }
    Ok(sqrt)
}

/// Returns the human-scale price at `tick`.
///
/// price = 1.0001^tick * 10^(decimals0 - decimals1)
pub fn tick_to_price(tick: i32, decimals0: u8, decimals1: u8) -> Result<Decimal, MathError> {
    sqrt_price_to_price(tick_to_sqrt_price(tick)?, decimals0, decimals1)
}

/// Returns the tick nearest to a human-scale price.
///
/// tick = round(log_1.0001(P))
pub fn price_to_tick(price: Decimal, decimals0: u8, decimals1: u8) -> Result<i32, MathError> {
    let sqrt = price_to_sqrt_price(price, decimals0, decimals1)?;
    let tick = sqrt_price_to_tick(sqrt)?;
    if tick < MAX_TICK {
        let floor = tick_to_sqrt_price(tick)?;
        let next = tick_to_sqrt_price(tick + 1)?;
        if next - sqrt < sqrt - floor {
            return Ok(tick + 1);
        }
    }
    Ok(tick)
}
