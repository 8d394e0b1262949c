use crate::entities::position::Position;
use crate::error::MathError;
use crate::math::full_math::{mul_div, q128};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Current Q128.128 fee growth per unit of liquidity inside a position's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeGrowthInside {
    pub inside0: U256,
    pub inside1: U256,
}

impl FeeGrowthInside {
    pub fn new(inside0: U256, inside1: U256) -> Self {
        Self { inside0, inside1 }
    }
}

/// Fee growth recorded on the far side of an initialised tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickFeeGrowthOutside {
    pub outside0: U256,
    pub outside1: U256,
}

/// Pool-wide fee trackers from which the inside growth of a range is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeGrowthTrackers {
    pub global0: U256,
    pub global1: U256,
    pub lower: TickFeeGrowthOutside,
    pub upper: TickFeeGrowthOutside,
    pub current_tick: i32,
}

impl FeeGrowthTrackers {
    /// Fee growth inside `[tick_lower, tick_upper)`.
    ///
    /// All subtractions wrap modulo 2^256, matching the on-chain counters.
    #[must_use]
    pub fn inside(&self, tick_lower: i32, tick_upper: i32) -> FeeGrowthInside {
        let (below0, below1) = if self.current_tick >= tick_lower {
            (self.lower.outside0, self.lower.outside1)
        } else {
            (
                wrapping_sub(self.global0, self.lower.outside0),
                wrapping_sub(self.global1, self.lower.outside1),
            )
        };

        let (above0, above1) = if self.current_tick < tick_upper {
            (self.upper.outside0, self.upper.outside1)
        } else {
            (
                wrapping_sub(self.global0, self.upper.outside0),
                wrapping_sub(self.global1, self.upper.outside1),
            )
        };

        FeeGrowthInside {
            inside0: wrapping_sub(wrapping_sub(self.global0, below0), above0),
            inside1: wrapping_sub(wrapping_sub(self.global1, below1), above1),
        }
    }
}

fn wrapping_sub(a: U256, b: U256) -> U256 {
    a.overflowing_sub(b).0
}

/// Fees accrued by `liquidity` since the last checkpoint, in raw token units.
///
/// `floor(L * (inside_now - inside_last) / 2^128)` with wrapping subtraction.
pub fn accrued_fees(
    liquidity: u128,
    inside_now: U256,
    inside_last: U256,
) -> Result<U256, MathError> {
    if liquidity == 0 {
        return Ok(U256::zero());
    }
    mul_div(
        U256::from(liquidity),
        wrapping_sub(inside_now, inside_last),
        q128(),
    )
}

/// Unclaimed fees of a position in raw units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnclaimedFees {
    pub fee0: U256,
    pub fee1: U256,
    /// Set when accrual since the last checkpoint could not be included.
    pub lower_bound: bool,
}

/// Tokens owed plus fees accrued since the last checkpoint.
///
/// Without current fee growth only the tokens owed are counted and the
/// result is flagged as a lower bound.
pub fn unclaimed_fees(
    position: &Position,
    fee_growth: Option<&FeeGrowthInside>,
) -> Result<UnclaimedFees, MathError> {
    let Some(growth) = fee_growth else {
        return Ok(UnclaimedFees {
            fee0: position.tokens_owed0,
            fee1: position.tokens_owed1,
            lower_bound: true,
        });
    };

    let accrued0 = accrued_fees(
        position.liquidity,
        growth.inside0,
        position.fee_growth_inside0_last,
    )?;
    let accrued1 = accrued_fees(
        position.liquidity,
        growth.inside1,
        position.fee_growth_inside1_last,
    )?;

    Ok(UnclaimedFees {
        fee0: position
            .tokens_owed0
            .checked_add(accrued0)
            .ok_or(MathError::Overflow)?,
        fee1: position
            .tokens_owed1
            .checked_add(accrued1)
            .ok_or(MathError::Overflow)?,
        lower_bound: false,
    })
}
