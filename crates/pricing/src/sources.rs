//! Collaborator interfaces for chain data and external quotes.

use anyhow::Result;
use async_trait::async_trait;
use lpv_domain::entities::{PoolState, Position, TokenId};
use lpv_domain::enums::Chain;
use lpv_domain::fees::FeeGrowthInside;
use rust_decimal::Decimal;

/// Read access to on-chain pool and position state.
#[async_trait]
pub trait ChainDataSource: Send + Sync {
    /// Snapshot of the pool for an unordered token pair and fee tier, if one exists.
    async fn pool_state(
        &self,
        chain: Chain,
        token_a: &str,
        token_b: &str,
        fee_tier: u32,
    ) -> Result<Option<PoolState>>;

    /// Positions owned by `owner`.
    async fn positions(&self, chain: Chain, owner: &str) -> Result<Vec<Position>>;

    /// Current fee growth inside the position's range, if the source tracks it.
    async fn fee_growth_inside(&self, position: &Position) -> Result<Option<FeeGrowthInside>>;
}

/// External USD quote provider.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// USD price of `token`, or `None` if the source does not quote it.
    async fn usd_price(&self, token: &TokenId) -> Result<Option<Decimal>>;
}
