//! Engine configuration: token metadata, bridge assets, fee tiers and cache TTLs.

use lpv_domain::entities::token::{Token, TokenId, deserialize_address, normalize_address};
use lpv_domain::enums::{Chain, PriceSource};
use lpv_domain::registry::TokenRegistry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Fee tiers scanned for a bridge pool, in order.
pub const DEFAULT_FEE_TIERS: [u32; 4] = [3000, 10000, 500, 100];

/// Kind of quote, used to pick a cache TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteClass {
    Direct,
    Routed,
    Pegged,
}

impl From<&PriceSource> for QuoteClass {
    fn from(source: &PriceSource) -> Self {
        match source {
            PriceSource::Direct => QuoteClass::Direct,
            PriceSource::Routed { .. } => QuoteClass::Routed,
            PriceSource::Pegged => QuoteClass::Pegged,
        }
    }
}

/// Time-to-live per quote class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL for direct quotes in seconds.
    pub direct_ttl_secs: u64,
    /// TTL for routed quotes in seconds.
    pub routed_ttl_secs: u64,
    /// TTL for pegged quotes in seconds.
    pub pegged_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            direct_ttl_secs: 300, // 5 minutes
            routed_ttl_secs: 60,
            pegged_ttl_secs: 3600,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl_for(&self, class: QuoteClass) -> Duration {
        let secs = match class {
            QuoteClass::Direct => self.direct_ttl_secs,
            QuoteClass::Routed => self.routed_ttl_secs,
            QuoteClass::Pegged => self.pegged_ttl_secs,
        };
        Duration::from_secs(secs)
    }
}

/// A token that other tokens can be priced against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeAsset {
    #[serde(deserialize_with = "deserialize_address")]
    pub address: String,
    pub symbol: String,
    /// Fixed USD value, for stablecoins.
    #[serde(default)]
    pub peg_usd: Option<Decimal>,
}

impl BridgeAsset {
    pub fn new(address: impl AsRef<str>, symbol: impl Into<String>) -> Self {
        Self {
            address: normalize_address(address.as_ref()),
            symbol: symbol.into(),
            peg_usd: None,
        }
    }

    #[must_use]
    pub fn pegged(mut self, usd: Decimal) -> Self {
        self.peg_usd = Some(usd);
        self
    }

    /// Whether this bridge is `token`.
    #[must_use]
    pub fn is(&self, token: &TokenId) -> bool {
        normalize_address(&self.address) == token.address
    }
}

/// Routing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Bridge assets per chain, tried in order.
    #[serde(default)]
    pub bridges: BTreeMap<Chain, Vec<BridgeAsset>>,
    /// Pool fee tiers tried for each bridge, in order.
    #[serde(default = "default_fee_tiers")]
    pub fee_tiers: Vec<u32>,
}

fn default_fee_tiers() -> Vec<u32> {
    DEFAULT_FEE_TIERS.to_vec()
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            bridges: BTreeMap::new(),
            fee_tiers: default_fee_tiers(),
        }
    }
}

impl RouterConfig {
    /// Bridges configured for `chain`, in routing order.
    #[must_use]
    pub fn bridges_for(&self, chain: Chain) -> &[BridgeAsset] {
        self.bridges.get(&chain).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The configured USD peg of `token`, if it is a pegged bridge asset.
    #[must_use]
    pub fn peg_for(&self, token: &TokenId) -> Option<Decimal> {
        self.bridges_for(token.chain)
            .iter()
            .find(|b| b.is(token))
            .and_then(|b| b.peg_usd)
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Token metadata, registered before any valuation.
    pub tokens: Vec<Token>,
    #[serde(flatten)]
    pub router: RouterConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl EngineConfig {
    /// Builds the token registry from the configured metadata.
    #[must_use]
    pub fn registry(&self) -> TokenRegistry {
        self.tokens.iter().cloned().collect()
    }
}

struct KnownToken {
    symbol: &'static str,
    address: &'static str,
    decimals: u8,
    coingecko_id: &'static str,
}

const ETHEREUM_TOKENS: [KnownToken; 5] = [
    KnownToken {
        symbol: "WETH",
        address: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
        decimals: 18,
        coingecko_id: "ethereum",
    },
    KnownToken {
        symbol: "USDC",
        address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
        decimals: 6,
        coingecko_id: "usd-coin",
    },
    KnownToken {
        symbol: "USDT",
        address: "0xdAC17F958D2ee523a2206206994597C13D831ec7",
        decimals: 6,
        coingecko_id: "tether",
    },
    KnownToken {
        symbol: "DAI",
        address: "0x6B175474E89094C44Da98b954EedeAC495271d0F",
        decimals: 18,
        coingecko_id: "dai",
    },
    KnownToken {
        symbol: "WBTC",
        address: "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599",
        decimals: 8,
        coingecko_id: "wrapped-bitcoin",
    },
];

const ARBITRUM_TOKENS: [KnownToken; 6] = [
    KnownToken {
        symbol: "WETH",
        address: "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1",
        decimals: 18,
        coingecko_id: "ethereum",
    },
    KnownToken {
        symbol: "USDC",
        address: "0xaf88d065e77c8cC2239327C5EDb3A432268e5831",
        decimals: 6,
        coingecko_id: "usd-coin",
    },
    KnownToken {
        symbol: "USDT",
        address: "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9",
        decimals: 6,
        coingecko_id: "tether",
    },
    KnownToken {
        symbol: "DAI",
        address: "0xDA10009cBd5D07dd0CeCc66161FC93D7c9000da1",
        decimals: 18,
        coingecko_id: "dai",
    },
    KnownToken {
        symbol: "WBTC",
        address: "0x2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f",
        decimals: 8,
        coingecko_id: "wrapped-bitcoin",
    },
    KnownToken {
        symbol: "ARB",
        address: "0x912CE59144191C1204E64559FE8253a0e49E6548",
        decimals: 18,
        coingecko_id: "arbitrum",
    },
];

const BRIDGE_SYMBOLS: [&str; 4] = ["WETH", "USDC", "USDT", "DAI"];
const STABLECOINS: [&str; 3] = ["USDC", "USDT", "DAI"];

impl Default for EngineConfig {
    fn default() -> Self {
        let mut tokens = Vec::new();
        let mut bridges = BTreeMap::new();

        for (chain, known) in [
            (Chain::Ethereum, &ETHEREUM_TOKENS[..]),
            (Chain::Arbitrum, &ARBITRUM_TOKENS[..]),
        ] {
            tokens.extend(known.iter().map(|t| {
                Token::new(chain, t.address, t.symbol, t.decimals).with_coingecko_id(t.coingecko_id)
            }));

            let chain_bridges = BRIDGE_SYMBOLS
                .iter()
                .filter_map(|symbol| known.iter().find(|t| t.symbol == *symbol))
                .map(|t| {
                    let bridge = BridgeAsset::new(t.address, t.symbol);
                    if STABLECOINS.contains(&t.symbol) {
                        bridge.pegged(Decimal::ONE)
                    } else {
                        bridge
                    }
                })
                .collect();
            bridges.insert(chain, chain_bridges);
        }

        Self {
            tokens,
            router: RouterConfig {
                bridges,
                fee_tiers: default_fee_tiers(),
            },
            cache: CacheConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.tokens.len(), 11);
        assert_eq!(config.router.fee_tiers, vec![3000, 10000, 500, 100]);

        let eth_bridges = config.router.bridges_for(Chain::Ethereum);
        let symbols: Vec<&str> = eth_bridges.iter().map(|b| b.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["WETH", "USDC", "USDT", "DAI"]);
        assert_eq!(eth_bridges[0].peg_usd, None);
        assert_eq!(eth_bridges[1].peg_usd, Some(Decimal::ONE));
        assert!(config.router.bridges_for(Chain::Base).is_empty());

        let registry = config.registry();
        let arb = registry.by_symbol(Chain::Arbitrum, "ARB").unwrap();
        assert_eq!(arb.coingecko_id.as_deref(), Some("arbitrum"));
    }

    #[test]
    fn test_peg_lookup() {
        let config = EngineConfig::default();
        let usdc = TokenId::new(Chain::Arbitrum, "0xaf88d065e77c8cC2239327C5EDb3A432268e5831");
        let weth = TokenId::new(Chain::Arbitrum, "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1");
        assert_eq!(config.router.peg_for(&usdc), Some(Decimal::ONE));
        assert_eq!(config.router.peg_for(&weth), None);
    }

    #[test]
    fn test_cache_ttls() {
        let cache = CacheConfig::default();
        assert_eq!(cache.ttl_for(QuoteClass::Direct), Duration::from_secs(300));
        assert_eq!(cache.ttl_for(QuoteClass::Routed), Duration::from_secs(60));
        assert_eq!(cache.ttl_for(QuoteClass::Pegged), Duration::from_secs(3600));
        assert_eq!(
            QuoteClass::from(&PriceSource::Routed {
                bridge: "0xabc".to_string()
            }),
            QuoteClass::Routed
        );
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "tokens": [],
            "bridges": { "base": [{ "address": "0xABC", "symbol": "WETH" }] }
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.router.fee_tiers, DEFAULT_FEE_TIERS.to_vec());
        assert_eq!(config.cache, CacheConfig::default());
        assert_eq!(config.router.bridges_for(Chain::Base)[0].symbol, "WETH");
        assert_eq!(config.router.bridges_for(Chain::Base)[0].address, "0xabc");
    }
}
