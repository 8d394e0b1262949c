use crate::entities::pool::PoolState;
use crate::entities::token::{TokenId, deserialize_address, normalize_address};
use crate::enums::Chain;
use crate::error::ValuationError;
use crate::math::tick_math::{MAX_TICK, MIN_TICK};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Snapshot of a liquidity position as read from the position manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: U256,
    #[serde(deserialize_with = "deserialize_address")]
    pub owner: String,
    pub chain: Chain,
    #[serde(deserialize_with = "deserialize_address")]
    pub token0: String,
    #[serde(deserialize_with = "deserialize_address")]
    pub token1: String,
    pub fee_tier: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    /// Q128.128 fee growth inside the range at the last touch.
    #[serde(default)]
    pub fee_growth_inside0_last: U256,
    #[serde(default)]
    pub fee_growth_inside1_last: U256,
    /// Fees already credited to the position but not yet collected (raw units).
    #[serde(default)]
    pub tokens_owed0: U256,
    #[serde(default)]
    pub tokens_owed1: U256,
}

impl Position {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<U256>,
        owner: impl AsRef<str>,
        chain: Chain,
        token0: impl AsRef<str>,
        token1: impl AsRef<str>,
        fee_tier: u32,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Self {
        Self {
            id: id.into(),
            owner: normalize_address(owner.as_ref()),
            chain,
            token0: normalize_address(token0.as_ref()),
            token1: normalize_address(token1.as_ref()),
            fee_tier,
            tick_lower,
            tick_upper,
            liquidity,
            fee_growth_inside0_last: U256::zero(),
            fee_growth_inside1_last: U256::zero(),
            tokens_owed0: U256::zero(),
            tokens_owed1: U256::zero(),
        }
    }

    #[must_use]
    pub fn with_fee_growth_last(mut self, inside0: U256, inside1: U256) -> Self {
        self.fee_growth_inside0_last = inside0;
        self.fee_growth_inside1_last = inside1;
        self
    }

    #[must_use]
    pub fn with_tokens_owed(mut self, owed0: U256, owed1: U256) -> Self {
        self.tokens_owed0 = owed0;
        self.tokens_owed1 = owed1;
        self
    }

    #[must_use]
    pub fn token0_id(&self) -> TokenId {
        TokenId::new(self.chain, &self.token0)
    }

    #[must_use]
    pub fn token1_id(&self) -> TokenId {
        TokenId::new(self.chain, &self.token1)
    }

    /// Whether `tick` lies in `[tick_lower, tick_upper)`.
    #[must_use]
    pub fn contains_tick(&self, tick: i32) -> bool {
        tick >= self.tick_lower && tick < self.tick_upper
    }

    /// Checks the tick bounds.
    pub fn validate(&self) -> Result<(), ValuationError> {
        if self.tick_lower >= self.tick_upper {
            return Err(ValuationError::invalid_position(
                self.id,
                format!(
                    "tick_lower {} must be below tick_upper {}",
                    self.tick_lower, self.tick_upper
                ),
            ));
        }
        if self.tick_lower < MIN_TICK || self.tick_upper > MAX_TICK {
            return Err(ValuationError::invalid_position(
                self.id,
                format!(
                    "ticks [{}, {}) outside [{MIN_TICK}, {MAX_TICK}]",
                    self.tick_lower, self.tick_upper
                ),
            ));
        }
        Ok(())
    }

    /// Checks that the pool snapshot is the pool this position lives in.
    pub fn check_pool(&self, pool: &PoolState) -> Result<(), ValuationError> {
        if pool.chain != self.chain
            || pool.token0 != self.token0
            || pool.token1 != self.token1
            || pool.fee_tier != self.fee_tier
        {
            return Err(ValuationError::invalid_position(
                self.id,
                format!(
                    "pool {}/{} fee {} on {} does not match position {}/{} fee {} on {}",
                    pool.token0,
                    pool.token1,
                    pool.fee_tier,
                    pool.chain,
                    self.token0,
                    self.token1,
                    self.fee_tier,
                    self.chain
                ),
            ));
        }
        Ok(())
    }
}
