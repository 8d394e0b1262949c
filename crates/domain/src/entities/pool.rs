use crate::entities::token::{TokenId, deserialize_address, normalize_address};
use crate::enums::Chain;
use crate::error::ValuationError;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Snapshot of a concentrated liquidity pool as supplied by the chain collaborator.
///
/// Fields the collaborator could not decode are left as `None`; valuation
/// rejects such snapshots instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub chain: Chain,
    #[serde(deserialize_with = "deserialize_address")]
    pub token0: String,
    #[serde(deserialize_with = "deserialize_address")]
    pub token1: String,
    pub fee_tier: u32, // in hundredths of a bip, e.g. 3000 for 0.3%
    pub sqrt_price_x96: Option<U256>,
    pub tick: Option<i32>,
    pub liquidity: Option<u128>,
}

impl PoolState {
    pub fn new(chain: Chain, token0: impl AsRef<str>, token1: impl AsRef<str>, fee_tier: u32) -> Self {
        Self {
            chain,
            token0: normalize_address(token0.as_ref()),
            token1: normalize_address(token1.as_ref()),
            fee_tier,
            sqrt_price_x96: None,
            tick: None,
            liquidity: None,
        }
    }

    #[must_use]
    pub fn with_sqrt_price(mut self, sqrt_price_x96: U256) -> Self {
        self.sqrt_price_x96 = Some(sqrt_price_x96);
        self
    }

    #[must_use]
    pub fn with_tick(mut self, tick: i32) -> Self {
        self.tick = Some(tick);
        self
    }

    #[must_use]
    pub fn with_liquidity(mut self, liquidity: u128) -> Self {
        self.liquidity = Some(liquidity);
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

    /// Returns `Some(true)` if `address` is token0, `Some(false)` if token1.
    #[must_use]
    pub fn is_token0(&self, address: &str) -> Option<bool> {
        let address = normalize_address(address);
        if address == self.token0 {
            Some(true)
        } else if address == self.token1 {
            Some(false)
        } else {
            None
        }
    }

    /// Current sqrt price, or `IncompletePoolState`.
    pub fn require_sqrt_price(&self) -> Result<U256, ValuationError> {
        match self.sqrt_price_x96 {
            Some(p) if !p.is_zero() => Ok(p),
            _ => Err(ValuationError::IncompletePoolState("sqrt_price_x96")),
        }
    }

    /// Current tick, or `IncompletePoolState`.
    pub fn require_tick(&self) -> Result<i32, ValuationError> {
        self.tick.ok_or(ValuationError::IncompletePoolState("tick"))
    }

    /// Whether the snapshot can be used to derive a price.
    #[must_use]
    pub fn is_priceable(&self) -> bool {
        self.require_sqrt_price().is_ok() && self.liquidity.is_none_or(|l| l > 0)
    }
}
