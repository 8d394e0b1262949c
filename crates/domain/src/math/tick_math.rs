use crate::error::MathError;
use crate::math::full_math::narrow;
use primitive_types::U256;

/// Lowest tick whose sqrt ratio is representable.
pub const MIN_TICK: i32 = -887272;
/// Highest tick whose sqrt ratio is representable.
pub const MAX_TICK: i32 = -MIN_TICK;

/// Sqrt ratio at `MIN_TICK`.
pub const MIN_SQRT_RATIO: U256 = U256([4295128739, 0, 0, 0]);
/// Sqrt ratio at `MAX_TICK` (1461446703485210103287273052203988822378723970342).
pub const MAX_SQRT_RATIO: U256 = U256([0x5d951d5263988d26, 0xefd1fc6a50648849, 0xfffd8963, 0]);

/// Q128.128 value of `1 / sqrt(1.0001)`.
const ODD_TICK_RATIO: U256 = U256([0xaa2d162d1a594001, 0xfffcb933bd6fad37, 0, 0]);

/// Q128.128 values of `1 / sqrt(1.0001)^(2^i)` for bits 1..=19 of the absolute tick.
const RATIO_FACTORS: [U256; 19] = [
    U256([0x59a46990580e213a, 0xfff97272373d4132, 0, 0]),
    U256([0xef12357cf3c7fdcc, 0xfff2e50f5f656932, 0, 0]),
    U256([0x1c3624eaa0941cd0, 0xffe5caca7e10e4e6, 0, 0]),
    U256([0xc9db58835c926644, 0xffcb9843d60f6159, 0, 0]),
    U256([0x472e6896dfb254c0, 0xff973b41fa98c081, 0, 0]),
    U256([0x43ec78b326b52861, 0xff2ea16466c96a38, 0, 0]),
    U256([0x11c461f1969c3053, 0xfe5dee046a99a2a8, 0, 0]),
    U256([0xdcffc83b479aa3a4, 0xfcbe86c7900a88ae, 0, 0]),
    U256([0x6f2b074cf7815e54, 0xf987a7253ac41317, 0, 0]),
    U256([0x940c7a398e4b70f3, 0xf3392b0822b70005, 0, 0]),
    U256([0x43b29c7fa6e889d9, 0xe7159475a2c29b74, 0, 0]),
    U256([0x845ad8f792aa5825, 0xd097f3bdfd2022b8, 0, 0]),
    U256([0x8a65dc1f90e061e5, 0xa9f746462d870fdf, 0, 0]),
    U256([0x90bb3df62baf32f7, 0x70d869a156d2a1b8, 0, 0]),
    U256([0x81231505542fcfa6, 0x31be135f97d08fd9, 0, 0]),
    U256([0xc677de54f3e99bc9, 0x09aa508b5b7a84e1, 0, 0]),
    U256([0x6699c329225ee604, 0x005d6af8dedb8119, 0, 0]),
    U256([0x1ea926041bedfe98, 0x00002216e584f5fa, 0, 0]),
    U256([0x91f7dc42444e8fa2, 0x00000000048a1703, 0, 0]),
];

/// Returns the Q64.96 sqrt ratio `sqrt(1.0001^tick) * 2^96`.
///
/// Bit-exact with the on-chain tick math: the ratio is accumulated in
/// Q128.128, inverted for positive ticks and shifted down to Q64.96 rounding
/// up, so the result is the same value the pool itself uses.
///
/// # Errors
/// Returns `InvalidTick` if `tick` is outside `[MIN_TICK, MAX_TICK]`.
pub fn tick_to_sqrt_price(tick: i32) -> Result<U256, MathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::InvalidTick(tick));
    }
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 0x1 != 0 {
        ODD_TICK_RATIO
    } else {
        U256::one() << 128
    };
    for (bit, factor) in RATIO_FACTORS.iter().enumerate() {
        if abs_tick & (1 << (bit + 1)) != 0 {
            ratio = narrow(ratio.full_mul(*factor) >> 128)?;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    let round_up = if ratio.low_u32() == 0 { 0u8 } else { 1u8 };
    Ok((ratio >> 32) + U256::from(round_up))
}

/// Returns the greatest tick whose sqrt ratio is `<= sqrt_price_x96`.
///
/// # Errors
/// Returns `InvalidSqrtPrice` if the input is outside `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
pub fn sqrt_price_to_tick(sqrt_price_x96: U256) -> Result<i32, MathError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(MathError::InvalidSqrtPrice(sqrt_price_x96));
    }
    let mut lo = MIN_TICK;
    let mut hi = MAX_TICK;
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if tick_to_sqrt_price(mid)? <= sqrt_price_x96 {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(s: &str) -> U256 {
        U256::from_dec_str(s).unwrap()
    }

    #[test]
    fn test_tick_to_sqrt_price_reference_values() {
        assert_eq!(tick_to_sqrt_price(0).unwrap(), U256::one() << 96);
        assert_eq!(
            tick_to_sqrt_price(1).unwrap(),
            u("79232123823359799118286999568")
        );
        assert_eq!(
            tick_to_sqrt_price(-1).unwrap(),
            u("79224201403219477170569942574")
        );
        assert_eq!(
            tick_to_sqrt_price(1000).unwrap(),
            u("83290069058676223003182343270")
        );
        assert_eq!(
            tick_to_sqrt_price(-1000).unwrap(),
            u("75364347830767020784054125655")
        );
        assert_eq!(tick_to_sqrt_price(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(tick_to_sqrt_price(MAX_TICK).unwrap(), MAX_SQRT_RATIO);
        assert_eq!(
            MAX_SQRT_RATIO,
            u("1461446703485210103287273052203988822378723970342")
        );
    }

    #[test]
    fn test_tick_out_of_range() {
        assert_eq!(
            tick_to_sqrt_price(MAX_TICK + 1),
            Err(MathError::InvalidTick(MAX_TICK + 1))
        );
        assert_eq!(
            tick_to_sqrt_price(MIN_TICK - 1),
            Err(MathError::InvalidTick(MIN_TICK - 1))
        );
    }

    #[test]
    fn test_sqrt_price_is_monotonic() {
        let mut previous = tick_to_sqrt_price(-50).unwrap();
        for tick in -49..=50 {
            let current = tick_to_sqrt_price(tick).unwrap();
            assert!(current > previous, "tick {tick}");
            previous = current;
        }
    }

    #[test]
    fn test_round_trip_on_grid() {
        for tick in [MIN_TICK, -200312, -887, -1, 0, 1, 60, 200311, MAX_TICK - 1] {
            let sqrt = tick_to_sqrt_price(tick).unwrap();
            assert_eq!(sqrt_price_to_tick(sqrt).unwrap(), tick);
            assert_eq!(tick_to_sqrt_price(sqrt_price_to_tick(sqrt).unwrap()).unwrap(), sqrt);
        }
    }

    #[test]
    fn test_round_trip_off_grid_floors() {
        let below = tick_to_sqrt_price(101).unwrap() - U256::one();
        assert_eq!(sqrt_price_to_tick(below).unwrap(), 100);

        // Off-grid values map back to the sqrt ratio of the floor tick, within one tick
        // step (a relative error below 1e-4).
        let sqrt = tick_to_sqrt_price(sqrt_price_to_tick(below).unwrap()).unwrap();
        assert!(sqrt <= below);
        assert!((below - sqrt) * U256::from(10_000u32) < below);
    }

    #[test]
    fn test_sqrt_price_to_tick_bounds() {
        assert!(sqrt_price_to_tick(MIN_SQRT_RATIO - U256::one()).is_err());
        assert!(sqrt_price_to_tick(MAX_SQRT_RATIO).is_err());
        assert_eq!(sqrt_price_to_tick(MAX_SQRT_RATIO - U256::one()).unwrap(), MAX_TICK - 1);
    }
}
