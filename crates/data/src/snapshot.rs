//! Chain data served from a JSON snapshot file.
//!
//! A snapshot captures pools, positions and per-position fee growth at one
//! point in time so valuations can be reproduced offline. 256-bit values are
//! `0x`-prefixed hex strings:
//!
//! ```json
//! {
//!   "pools": [{ "chain": "ethereum", "token0": "0x..", "token1": "0x..",
//!               "fee_tier": 3000, "sqrt_price_x96": "0x..", "tick": -200312,
//!               "liquidity": 1000000 }],
//!   "positions": [{ "id": "0x1", "owner": "0x..", "chain": "ethereum", ... }],
//!   "fee_growth": [{ "chain": "ethereum", "position_id": "0x1",
//!                    "inside": { "inside0": "0x..", "inside1": "0x.." } }]
//! }
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use lpv_domain::entities::token::normalize_address;
use lpv_domain::entities::{PoolState, Position};
use lpv_domain::enums::Chain;
use lpv_domain::fees::{FeeGrowthInside, FeeGrowthTrackers};
use lpv_pricing::sources::ChainDataSource;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Fee growth known for one position, either precomputed or as raw trackers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeGrowthRecord {
    pub chain: Chain,
    pub position_id: U256,
    #[serde(default)]
    pub inside: Option<FeeGrowthInside>,
    /// Pool trackers for the position's ticks; used when `inside` is absent.
    #[serde(default)]
    pub trackers: Option<FeeGrowthTrackers>,
}

/// On-disk snapshot layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    #[serde(default)]
    pub pools: Vec<PoolState>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub fee_growth: Vec<FeeGrowthRecord>,
}

type PoolKey = (Chain, String, String, u32);

fn pool_key(chain: Chain, a: &str, b: &str, fee_tier: u32) -> PoolKey {
    let (a, b) = (normalize_address(a), normalize_address(b));
    if a <= b {
        (chain, a, b, fee_tier)
    } else {
        (chain, b, a, fee_tier)
    }
}

/// [`ChainDataSource`] backed by an in-memory [`ChainSnapshot`].
#[derive(Debug, Default)]
pub struct SnapshotChainData {
    pools: HashMap<PoolKey, PoolState>,
    positions: HashMap<(Chain, String), Vec<Position>>,
    fee_growth: HashMap<(Chain, U256), FeeGrowthRecord>,
}

impl SnapshotChainData {
    /// Indexes `snapshot`, normalising addresses.
    pub fn new(snapshot: ChainSnapshot) -> Self {
        let mut data = Self::default();

        for mut pool in snapshot.pools {
            pool.token0 = normalize_address(&pool.token0);
            pool.token1 = normalize_address(&pool.token1);
            let key = pool_key(pool.chain, &pool.token0, &pool.token1, pool.fee_tier);
            if data.pools.insert(key, pool).is_some() {
                warn!("Duplicate pool in snapshot, keeping the last one");
            }
        }

        for mut position in snapshot.positions {
            position.owner = normalize_address(&position.owner);
            position.token0 = normalize_address(&position.token0);
            position.token1 = normalize_address(&position.token1);
            data.positions
                .entry((position.chain, position.owner.clone()))
                .or_default()
                .push(position);
        }

        for record in snapshot.fee_growth {
            data.fee_growth
                .insert((record.chain, record.position_id), record);
        }

        debug!(
            pools = data.pools.len(),
            owners = data.positions.len(),
            fee_growth = data.fee_growth.len(),
            "Loaded chain snapshot"
        );
        data
    }

    /// Loads and indexes a snapshot file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: ChainSnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid snapshot {}", path.display()))?;
        Ok(Self::new(snapshot))
    }

    /// Number of indexed pools.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

#[async_trait]
impl ChainDataSource for SnapshotChainData {
    async fn pool_state(
        &self,
        chain: Chain,
        token_a: &str,
        token_b: &str,
        fee_tier: u32,
    ) -> Result<Option<PoolState>> {
        Ok(self
            .pools
            .get(&pool_key(chain, token_a, token_b, fee_tier))
            .cloned())
    }

    async fn positions(&self, chain: Chain, owner: &str) -> Result<Vec<Position>> {
        Ok(self
            .positions
            .get(&(chain, normalize_address(owner)))
            .cloned()
            .unwrap_or_default())
    }

    async fn fee_growth_inside(&self, position: &Position) -> Result<Option<FeeGrowthInside>> {
        let Some(record) = self.fee_growth.get(&(position.chain, position.id)) else {
            return Ok(None);
        };
        let inside = record.inside.or_else(|| {
            record
                .trackers
                .map(|t| t.inside(position.tick_lower, position.tick_upper))
        });
        Ok(inside)
    }
}
