//! Converts a position snapshot into token quantities and unclaimed fees.

use crate::entities::{PoolState, Position, TokenId};
use crate::error::ValuationError;
use crate::fees::{FeeGrowthInside, unclaimed_fees};
use crate::math::{amounts_for_liquidity, tick_to_sqrt_price};
use crate::registry::TokenRegistry;
use crate::value_objects::TokenAmount;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Token quantities held by a position at a pool snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionValuation {
    pub position_id: U256,
    pub token0: TokenId,
    pub token1: TokenId,
    pub amount0: TokenAmount,
    pub amount1: TokenAmount,
    pub unclaimed_fee0: TokenAmount,
    pub unclaimed_fee1: TokenAmount,
    /// Fees exclude accrual since the last checkpoint.
    pub fees_lower_bound: bool,
    pub in_range: bool,
}

/// Values positions using registered token metadata.
#[derive(Debug, Clone)]
pub struct PositionValuator {
    registry: Arc<TokenRegistry>,
}

impl PositionValuator {
    pub fn new(registry: Arc<TokenRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// Values `position` against `pool`.
    ///
    /// # Errors
    /// `InvalidPosition` for malformed bounds or a pool that is not the
    /// position's, `IncompletePoolState` when the snapshot lacks the sqrt
    /// price or tick, `UnknownToken` when metadata is missing.
    pub fn valuate(
        &self,
        position: &Position,
        pool: &PoolState,
        fee_growth_inside: Option<&FeeGrowthInside>,
    ) -> Result<PositionValuation, ValuationError> {
        position.validate()?;
        position.check_pool(pool)?;

        let token0 = self.registry.require(&position.token0_id())?;
        let token1 = self.registry.require(&position.token1_id())?;

        let sqrt_price = pool.require_sqrt_price()?;
        let tick = pool.require_tick()?;
        let in_range = position.contains_tick(tick);

        let sqrt_lower = tick_to_sqrt_price(position.tick_lower)?;
        let sqrt_upper = tick_to_sqrt_price(position.tick_upper)?;
        let (raw0, raw1) =
            amounts_for_liquidity(position.liquidity, sqrt_price, sqrt_lower, sqrt_upper)?;

        let fees = unclaimed_fees(position, fee_growth_inside)?;

        let valuation = PositionValuation {
            position_id: position.id,
            token0: token0.id(),
            token1: token1.id(),
            amount0: TokenAmount::new(raw0, token0.decimals)?,
            amount1: TokenAmount::new(raw1, token1.decimals)?,
            unclaimed_fee0: TokenAmount::new(fees.fee0, token0.decimals)?,
            unclaimed_fee1: TokenAmount::new(fees.fee1, token1.decimals)?,
            fees_lower_bound: fees.lower_bound,
            in_range,
        };

        debug!(
            position = %position.id,
            tick,
            tick_lower = position.tick_lower,
            tick_upper = position.tick_upper,
            region = region(position, tick),
            amount0 = %valuation.amount0,
            amount1 = %valuation.amount1,
            fee0 = %valuation.unclaimed_fee0,
            fee1 = %valuation.unclaimed_fee1,
            fees_lower_bound = valuation.fees_lower_bound,
            "Valued position"
        );

        Ok(valuation)
    }
}

fn region(position: &Position, tick: i32) -> &'static str {
    if tick < position.tick_lower {
        "below"
    } else if tick >= position.tick_upper {
        "above"
    } else {
        "in_range"
    }
}
