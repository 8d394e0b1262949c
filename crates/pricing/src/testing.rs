//! In-memory collaborators for unit tests.

use crate::sources::{ChainDataSource, QuoteSource};
use anyhow::{Result, bail};
use async_trait::async_trait;
use lpv_domain::entities::token::normalize_address;
use lpv_domain::entities::{PoolState, Position, TokenId};
use lpv_domain::enums::Chain;
use lpv_domain::fees::FeeGrowthInside;
use primitive_types::U256;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

type PoolKey = (Chain, String, String, u32);

fn pool_key(chain: Chain, a: &str, b: &str, fee: u32) -> PoolKey {
    let (a, b) = (normalize_address(a), normalize_address(b));
    if a <= b {
        (chain, a, b, fee)
    } else {
        (chain, b, a, fee)
    }
}

#[derive(Default)]
pub(crate) struct MockChainData {
    pools: HashMap<PoolKey, PoolState>,
    positions: HashMap<(Chain, String), Vec<Position>>,
    fee_growth: HashMap<U256, FeeGrowthInside>,
    failing: bool,
    pool_calls: Mutex<Vec<(String, String, u32)>>,
}

impl MockChainData {
    pub(crate) fn with_pool(mut self, pool: PoolState) -> Self {
        let key = pool_key(pool.chain, &pool.token0, &pool.token1, pool.fee_tier);
        self.pools.insert(key, pool);
        self
    }

    pub(crate) fn with_position(mut self, position: Position) -> Self {
        self.positions
            .entry((position.chain, position.owner.clone()))
            .or_default()
            .push(position);
        self
    }

    pub(crate) fn with_fee_growth(mut self, id: U256, growth: FeeGrowthInside) -> Self {
        self.fee_growth.insert(id, growth);
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub(crate) fn pool_calls(&self) -> Vec<(String, String, u32)> {
        self.pool_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainDataSource for MockChainData {
    async fn pool_state(
        &self,
        chain: Chain,
        token_a: &str,
        token_b: &str,
        fee_tier: u32,
    ) -> Result<Option<PoolState>> {
        self.pool_calls
            .lock()
            .unwrap()
            .push((token_a.to_string(), token_b.to_string(), fee_tier));
        if self.failing {
            bail!("rpc unavailable");
        }
        Ok(self
            .pools
            .get(&pool_key(chain, token_a, token_b, fee_tier))
            .cloned())
    }

    async fn positions(&self, chain: Chain, owner: &str) -> Result<Vec<Position>> {
        if self.failing {
            bail!("rpc unavailable");
        }
        Ok(self
            .positions
            .get(&(chain, normalize_address(owner)))
            .cloned()
            .unwrap_or_default())
    }

    async fn fee_growth_inside(&self, position: &Position) -> Result<Option<FeeGrowthInside>> {
        Ok(self.fee_growth.get(&position.id).copied())
    }
}

#[derive(Default)]
pub(crate) struct MockQuotes {
    prices: HashMap<TokenId, Decimal>,
    failing: bool,
    failing_tokens: HashSet<TokenId>,
    calls: AtomicUsize,
}

impl MockQuotes {
    pub(crate) fn with_price(mut self, token: TokenId, price: Decimal) -> Self {
        self.prices.insert(token, price);
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Fails only lookups of `token`.
    pub(crate) fn failing_for(mut self, token: TokenId) -> Self {
        self.failing_tokens.insert(token);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for MockQuotes {
    async fn usd_price(&self, token: &TokenId) -> Result<Option<Decimal>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing || self.failing_tokens.contains(token) {
            bail!("quote api returned 429");
        }
        Ok(self.prices.get(token).copied())
    }
}
