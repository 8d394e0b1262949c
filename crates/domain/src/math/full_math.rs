use crate::error::MathError;
use primitive_types::{U256, U512};
use rust_decimal::Decimal;

/// Largest mantissa a `Decimal` can hold (2^96 - 1).
const DECIMAL_MAX_MANTISSA_BITS: usize = 96;
/// Largest scale a `Decimal` supports.
const DECIMAL_MAX_SCALE: u32 = 28;

/// Q96 = 2^96.
#[must_use]
pub fn q96() -> U256 {
    U256::one() << 96
}

/// Q128 = 2^128.
#[must_use]
pub fn q128() -> U256 {
    U256::one() << 128
}

/// Narrows a 512-bit intermediate back to 256 bits.
pub fn narrow(value: U512) -> Result<U256, MathError> {
    U256::try_from(value).map_err(|_| MathError::Overflow)
}

/// `floor(a * b / denominator)` with a 512-bit intermediate product.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    narrow(a.full_mul(b) / U512::from(denominator))
}

/// `10^exp` as a 512-bit integer.
pub fn pow10(exp: u32) -> Result<U512, MathError> {
    U512::from(10u8)
        .checked_pow(U512::from(exp))
        .ok_or(MathError::Overflow)
}

/// Converts `numerator / denominator * 10^decimal_shift` to a `Decimal`.
///
/// Picks the largest scale whose mantissa still fits, truncating toward zero.
/// Returns `Ok(None)` when even the integer part does not fit.
pub fn fraction_to_decimal(
    numerator: U512,
    denominator: U512,
    decimal_shift: i32,
) -> Result<Option<Decimal>, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    for scale in (0..=DECIMAL_MAX_SCALE).rev() {
        let exp = decimal_shift + scale as i32;
        let (num, den) = if exp >= 0 {
            match pow10(exp.unsigned_abs())
                .ok()
                .and_then(|p| numerator.checked_mul(p))
            {
                Some(n) => (n, denominator),
                None => continue,
            }
        } else {
            match pow10(exp.unsigned_abs())
                .ok()
                .and_then(|p| denominator.checked_mul(p))
            {
                Some(d) => (numerator, d),
                // the quotient is zero at this scale; a smaller scale can only be smaller
                None => return Ok(Some(Decimal::ZERO)),
            }
        };
        let mantissa = num / den;
        if mantissa.bits() <= DECIMAL_MAX_MANTISSA_BITS {
            let value = Decimal::try_from_i128_with_scale(mantissa.low_u128() as i128, scale)
                .map_err(|_| MathError::Overflow)?;
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Scales a raw token amount by `10^-decimals`.
///
/// Exact whenever the result fits in a `Decimal`; otherwise `AmountOverflow`.
pub fn raw_to_decimal(raw: U256, decimals: u8) -> Result<Decimal, MathError> {
    fraction_to_decimal(U512::from(raw), U512::one(), -i32::from(decimals))?
        .ok_or(MathError::AmountOverflow(raw))
}
