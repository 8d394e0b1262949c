//! USD price resolution: cache, direct quote, peg, then a single routed hop.

use crate::cache::QuoteCache;
use crate::config::{QuoteClass, RouterConfig};
use crate::error::{Lookup, PricingError, Result};
use crate::sources::{ChainDataSource, QuoteSource};
use futures::future::join_all;
use lpv_domain::entities::TokenId;
use lpv_domain::enums::Chain;
use lpv_domain::error::MathError;
use lpv_domain::math::{sqrt_price_to_inverse_price, sqrt_price_to_price};
use lpv_domain::registry::TokenRegistry;
use lpv_domain::value_objects::{PriceQuote, QuoteKey};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resolves token prices in USD.
///
/// Resolution order is cache, direct quote, configured peg, then one routed
/// hop through each bridge asset in configuration order. Bridge prices are
/// themselves resolved without routing, so a route is never longer than one
/// pool.
pub struct PriceRouter {
    cache: Arc<QuoteCache>,
    quotes: Arc<dyn QuoteSource>,
    chain_data: Arc<dyn ChainDataSource>,
    registry: Arc<TokenRegistry>,
    config: RouterConfig,
}

impl PriceRouter {
    /// Creates a router over an explicitly owned cache.
    pub fn new(
        cache: Arc<QuoteCache>,
        quotes: Arc<dyn QuoteSource>,
        chain_data: Arc<dyn ChainDataSource>,
        registry: Arc<TokenRegistry>,
        config: RouterConfig,
    ) -> Self {
        Self {
            cache,
            quotes,
            chain_data,
            registry,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<QuoteCache> {
        &self.cache
    }

    pub fn registry(&self) -> &Arc<TokenRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Resolves the USD price of `token` on `chain`.
    ///
    /// # Errors
    /// `PriceUnavailable` when nothing prices the token, `RoutingDepthExceeded`
    /// when a bridge pool existed but the bridge itself needed another hop,
    /// `Collaborator` when a pool lookup fails, when a bridge's quote failed
    /// and no other bridge priced the token, or when the direct quote failed
    /// and routing found nothing either.
    pub async fn resolve_usd_price(&self, chain: Chain, token: &str) -> Result<PriceQuote> {
        let id = TokenId::new(chain, token);

        if let Some(quote) = self.cache.get(&QuoteKey::from(&id)).await {
            debug!(token = %id, source = %quote.source, "Cache hit");
            return Ok(quote);
        }

        let direct_error = match self.direct_quote(&id).await {
            Ok(Some(quote)) => return Ok(quote),
            Ok(None) => None,
            Err(e) => {
                warn!(token = %id, error = %e, "Direct quote failed, trying routes");
                Some(e)
            }
        };

        if let Some(quote) = self.pegged_quote(&id).await {
            return Ok(quote);
        }

        match self.route(&id).await {
            Ok(quote) => Ok(quote),
            Err(e) => match direct_error {
                Some(source) if !matches!(e, PricingError::Collaborator { .. }) => {
                    Err(PricingError::collaborator(Lookup::DirectQuote, source))
                }
                _ => Err(e),
            },
        }
    }

    /// Prices `token` through a single bridge asset.
    pub async fn quote_via_bridge(
        &self,
        chain: Chain,
        token: &str,
        bridge: &str,
    ) -> Result<PriceQuote> {
        let id = TokenId::new(chain, token);
        let bridge_id = TokenId::new(chain, bridge);

        let route_key = QuoteKey::routed(chain, &id.address, &bridge_id.address);
        if let Some(quote) = self.cache.get(&route_key).await {
            return Ok(quote);
        }

        let quote = self.route_via(&id, &bridge_id).await?;
        quote.ok_or(PricingError::PriceUnavailable(id))
    }

    /// Resolves several tokens concurrently. Results are in input order.
    pub async fn resolve_many(&self, chain: Chain, tokens: &[&str]) -> Vec<Result<PriceQuote>> {
        join_all(
            tokens
                .iter()
                .map(|token| self.resolve_usd_price(chain, token)),
        )
        .await
    }

    /// Drops one cached quote, or every cached quote when `key` is `None`.
    pub async fn invalidate_cache(&self, key: Option<&QuoteKey>) {
        match key {
            Some(key) => {
                let removed = self.cache.invalidate(key).await;
                debug!(key = %key, removed, "Invalidated cached quote");
            }
            None => {
                self.cache.clear().await;
                info!("Cleared quote cache");
            }
        }
    }

    async fn direct_quote(&self, id: &TokenId) -> anyhow::Result<Option<PriceQuote>> {
        match self.quotes.usd_price(id).await? {
            Some(price) if price > Decimal::ZERO => {
                let quote = PriceQuote::direct(id.clone(), price);
                self.remember(QuoteKey::from(id), &quote).await;
                debug!(token = %id, price = %price, "Direct quote");
                Ok(Some(quote))
            }
            Some(price) => {
                warn!(token = %id, price = %price, "Ignoring non-positive direct quote");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn pegged_quote(&self, id: &TokenId) -> Option<PriceQuote> {
        let peg = self.config.peg_for(id)?;
        let quote = PriceQuote::pegged(id.clone(), peg);
        self.remember(QuoteKey::from(id), &quote).await;
        debug!(token = %id, price = %peg, "Pegged quote");
        Some(quote)
    }

    /// Caches `quote` under `key` for as long as its source allows.
    async fn remember(&self, key: QuoteKey, quote: &PriceQuote) {
        let ttl = self.cache.ttl_for(QuoteClass::from(&quote.source));
        self.cache.put(key, quote.clone(), ttl).await;
    }

    /// Tries each bridge in order. A bridge whose own quote failed is skipped
    /// like one that needs another hop; its error wins if no bridge prices.
    async fn route(&self, id: &TokenId) -> Result<PriceQuote> {
        let mut depth_exceeded = None;
        let mut bridge_error = None;

        for bridge in self.config.bridges_for(id.chain) {
            if bridge.is(id) {
                continue;
            }
            let bridge_id = TokenId::new(id.chain, &bridge.address);
            match self.route_via(id, &bridge_id).await {
                Ok(Some(quote)) => {
                    self.remember(QuoteKey::from(id), &quote).await;
                    return Ok(quote);
                }
                Ok(None) => {}
                Err(
                    e @ PricingError::Collaborator {
                        lookup: Lookup::DirectQuote,
                        ..
                    },
                ) => {
                    warn!(token = %id, bridge = %bridge.symbol, error = %e, "Bridge quote failed, trying next bridge");
                    if bridge_error.is_none() {
                        bridge_error = Some(e);
                    }
                }
                Err(e @ PricingError::RoutingDepthExceeded { .. }) => {
                    debug!(token = %id, bridge = %bridge.symbol, "Bridge needs another hop");
                    if depth_exceeded.is_none() {
                        depth_exceeded = Some(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(bridge_error
            .or(depth_exceeded)
            .unwrap_or_else(|| PricingError::PriceUnavailable(id.clone())))
    }

    /// One routed hop. `Ok(None)` when no usable pool pairs the token with the bridge.
    async fn route_via(&self, id: &TokenId, bridge: &TokenId) -> Result<Option<PriceQuote>> {
        let Some(pool_price) = self.pool_price(id, bridge).await? else {
            return Ok(None);
        };

        let bridge_quote = self.bridge_price(id, bridge).await?;
        let price = pool_price
            .checked_mul(bridge_quote.price_usd)
            .ok_or(MathError::Overflow)?;
        if price <= Decimal::ZERO {
            warn!(token = %id, bridge = %bridge, "Routed price rounds to zero");
            return Ok(None);
        }

        let quote = PriceQuote::routed(id.clone(), price, &bridge.address);
        self.remember(QuoteKey::routed(id.chain, &id.address, &bridge.address), &quote)
            .await;

        info!(
            token = %id,
            bridge = %bridge,
            pool_price = %pool_price,
            bridge_usd = %bridge_quote.price_usd,
            price = %price,
            "Routed quote"
        );
        Ok(Some(quote))
    }

    /// Price of `token` in `bridge` units from the first usable pool, by fee tier order.
    async fn pool_price(&self, token: &TokenId, bridge: &TokenId) -> Result<Option<Decimal>> {
        for &fee_tier in &self.config.fee_tiers {
            let pool = self
                .chain_data
                .pool_state(token.chain, &token.address, &bridge.address, fee_tier)
                .await
                .map_err(|e| PricingError::collaborator(Lookup::PoolState, e))?;

            let Some(pool) = pool else {
                continue;
            };
            if !pool.is_priceable() {
                debug!(token = %token, bridge = %bridge, fee_tier, "Skipping empty pool");
                continue;
            }

            let token_is_token0 = match (
                pool.is_token0(&token.address),
                pool.is_token0(&bridge.address),
            ) {
                (Some(a), Some(b)) if a != b => a,
                _ => {
                    warn!(
                        token = %token,
                        bridge = %bridge,
                        fee_tier,
                        "Pool does not pair the requested tokens"
                    );
                    continue;
                }
            };

            let token_decimals = self.decimals(token)?;
            let bridge_decimals = self.decimals(bridge)?;
            let sqrt_price = pool.require_sqrt_price()?;

            let price = if token_is_token0 {
                sqrt_price_to_price(sqrt_price, token_decimals, bridge_decimals)
            } else {
                sqrt_price_to_inverse_price(sqrt_price, bridge_decimals, token_decimals)
            };

            match price {
                Ok(price) => {
                    debug!(token = %token, bridge = %bridge, fee_tier, price = %price, "Pool price");
                    return Ok(Some(price));
                }
                Err(e) => {
                    warn!(token = %token, bridge = %bridge, fee_tier, error = %e, "Skipping unpriceable pool");
                }
            }
        }
        Ok(None)
    }

    /// Bridge price without further routing: cache, direct quote, peg.
    ///
    /// A failed direct quote with no peg to fall back on is reported as a
    /// `DirectQuote` collaborator error, not as a missing hop.
    async fn bridge_price(&self, token: &TokenId, bridge: &TokenId) -> Result<PriceQuote> {
        if let Some(quote) = self.cache.get(&QuoteKey::from(bridge)).await {
            return Ok(quote);
        }

        let direct_error = match self.direct_quote(bridge).await {
            Ok(Some(quote)) => return Ok(quote),
            Ok(None) => None,
            Err(e) => {
                warn!(bridge = %bridge, error = %e, "Direct quote for bridge failed");
                Some(e)
            }
        };

        if let Some(quote) = self.pegged_quote(bridge).await {
            return Ok(quote);
        }

        if let Some(source) = direct_error {
            return Err(PricingError::collaborator(Lookup::DirectQuote, source));
        }
        Err(PricingError::RoutingDepthExceeded {
            token: token.clone(),
            bridge: bridge.address.clone(),
        })
    }

    fn decimals(&self, id: &TokenId) -> Result<u8> {
        self.registry
            .get(id)
            .map(|t| t.decimals)
            .ok_or_else(|| PricingError::UnknownToken(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BridgeAsset, CacheConfig, EngineConfig};
    use crate::testing::{MockChainData, MockQuotes};
    use lpv_domain::entities::{PoolState, Token};
    use lpv_domain::enums::PriceSource;
    use lpv_domain::math::{price_to_sqrt_price, tick_to_sqrt_price};
    use primitive_types::U256;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    const WETH: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
    const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
    const DAI: &str = "0x6b175474e89094c44da98b954eedeac495271d0f";
    const TOKEN: &str = "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984";

    fn registry() -> TokenRegistry {
        let mut registry = EngineConfig::default().registry();
        registry.register(Token::new(Chain::Ethereum, TOKEN, "UNI", 18));
        registry
    }

    fn weth_usdc_config() -> RouterConfig {
        let mut config = RouterConfig::default();
        config.bridges.insert(
            Chain::Ethereum,
            vec![
                BridgeAsset::new(WETH, "WETH"),
                BridgeAsset::new(USDC, "USDC").pegged(Decimal::ONE),
            ],
        );
        config
    }

    fn router(
        config: RouterConfig,
        quotes: Arc<MockQuotes>,
        chain_data: Arc<MockChainData>,
    ) -> PriceRouter {
        PriceRouter::new(
            Arc::new(QuoteCache::new(CacheConfig::default())),
            quotes,
            chain_data,
            Arc::new(registry()),
            config,
        )
    }

    /// TOKEN/WETH pool at tick 0: one TOKEN per WETH.
    fn token_weth_pool(fee: u32) -> PoolState {
        PoolState::new(Chain::Ethereum, TOKEN, WETH, fee)
            .with_sqrt_price(tick_to_sqrt_price(0).unwrap())
            .with_tick(0)
            .with_liquidity(1_000_000)
    }

    /// USDC/TOKEN pool with USDC as token0.
    fn usdc_token_pool(fee: u32, usdc_per_token: Decimal) -> PoolState {
        let token_per_usdc = Decimal::ONE / usdc_per_token;
        PoolState::new(Chain::Ethereum, USDC, TOKEN, fee)
            .with_sqrt_price(price_to_sqrt_price(token_per_usdc, 6, 18).unwrap())
            .with_tick(0)
            .with_liquidity(1_000_000)
    }

    fn id(address: &str) -> TokenId {
        TokenId::new(Chain::Ethereum, address)
    }

    #[tokio::test]
    async fn test_direct_quote_is_cached() {
        let quotes = Arc::new(MockQuotes::default().with_price(id(WETH), dec!(2000)));
        let r = router(weth_usdc_config(), quotes.clone(), Arc::new(MockChainData::default()));

        let first = r.resolve_usd_price(Chain::Ethereum, WETH).await.unwrap();
        assert_eq!(first.price_usd, dec!(2000));
        assert_eq!(first.source, PriceSource::Direct);
        assert!(!first.cached);

        // checksummed form hits the same entry
        let second = r
            .resolve_usd_price(Chain::Ethereum, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2")
            .await
            .unwrap();
        assert_eq!(second.price_usd, dec!(2000));
        assert_eq!(second.source, PriceSource::Direct);
        assert!(second.cached);
        assert_eq!(quotes.calls(), 1);
    }

    #[tokio::test]
    async fn test_pegged_stablecoin() {
        let r = router(
            EngineConfig::default().router,
            Arc::new(MockQuotes::default()),
            Arc::new(MockChainData::default()),
        );

        let quote = r.resolve_usd_price(Chain::Ethereum, DAI).await.unwrap();
        assert_eq!(quote.price_usd, Decimal::ONE);
        assert_eq!(quote.source, PriceSource::Pegged);
    }

    #[tokio::test]
    async fn test_routes_through_first_bridge() {
        let quotes = Arc::new(MockQuotes::default().with_price(id(WETH), dec!(2000)));
        let chain_data = Arc::new(
            MockChainData::default()
                .with_pool(token_weth_pool(3000))
                .with_pool(usdc_token_pool(3000, dec!(1500))),
        );
        let r = router(weth_usdc_config(), quotes, chain_data.clone());

        let quote = r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap();
        assert_eq!(quote.price_usd, dec!(2000));
        assert_eq!(
            quote.source,
            PriceSource::Routed {
                bridge: WETH.to_string()
            }
        );

        // pool lookups stop at the first usable pool
        assert_eq!(
            chain_data.pool_calls(),
            vec![(TOKEN.to_string(), WETH.to_string(), 3000)]
        );

        // cached under the plain key and the route key
        let plain = r.cache().get(&QuoteKey::new(Chain::Ethereum, TOKEN)).await.unwrap();
        assert!(plain.cached);
        let routed = r
            .quote_via_bridge(Chain::Ethereum, TOKEN, WETH)
            .await
            .unwrap();
        assert!(routed.cached);
        assert_eq!(routed.price_usd, dec!(2000));
    }

    #[tokio::test]
    async fn test_explicit_bridge_keeps_configured_route() {
        let quotes = Arc::new(MockQuotes::default().with_price(id(WETH), dec!(2000)));
        let chain_data = Arc::new(
            MockChainData::default()
                .with_pool(token_weth_pool(3000))
                .with_pool(usdc_token_pool(3000, dec!(1500))),
        );
        let r = router(weth_usdc_config(), quotes, chain_data);

        let via_usdc = r
            .quote_via_bridge(Chain::Ethereum, TOKEN, USDC)
            .await
            .unwrap();
        assert!((via_usdc.price_usd - dec!(1500)).abs() < dec!(0.000001));
        assert!(r.cache().get(&QuoteKey::new(Chain::Ethereum, TOKEN)).await.is_none());

        let resolved = r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap();
        assert_eq!(resolved.price_usd, dec!(2000));
        assert_eq!(
            resolved.source,
            PriceSource::Routed {
                bridge: WETH.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_routing_is_deterministic() {
        let mut results = Vec::new();
        for _ in 0..3 {
            let quotes = Arc::new(MockQuotes::default().with_price(id(WETH), dec!(2000)));
            let chain_data = Arc::new(
                MockChainData::default()
                    .with_pool(token_weth_pool(3000))
                    .with_pool(usdc_token_pool(3000, dec!(1500))),
            );
            let r = router(weth_usdc_config(), quotes, chain_data);
            results.push(r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap());
        }
        assert!(results.iter().all(|q| q.price_usd == results[0].price_usd));
        assert!(results.iter().all(|q| q.source == results[0].source));
    }

    #[tokio::test]
    async fn test_unpriced_bridge_falls_through_to_next() {
        // WETH has no quote and is not pegged, so the WETH route needs a second hop
        let chain_data = Arc::new(
            MockChainData::default()
                .with_pool(token_weth_pool(3000))
                .with_pool(usdc_token_pool(500, dec!(1500))),
        );
        let r = router(weth_usdc_config(), Arc::new(MockQuotes::default()), chain_data);

        let quote = r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap();
        assert!((quote.price_usd - dec!(1500)).abs() < dec!(0.000001));
        assert_eq!(
            quote.source,
            PriceSource::Routed {
                bridge: USDC.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_routing_depth_exceeded() {
        let mut config = RouterConfig::default();
        config
            .bridges
            .insert(Chain::Ethereum, vec![BridgeAsset::new(WETH, "WETH")]);
        let chain_data = Arc::new(MockChainData::default().with_pool(token_weth_pool(3000)));
        let r = router(config, Arc::new(MockQuotes::default()), chain_data);

        let err = r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap_err();
        assert!(matches!(err, PricingError::RoutingDepthExceeded { .. }));
    }

    #[tokio::test]
    async fn test_price_unavailable() {
        let r = router(
            weth_usdc_config(),
            Arc::new(MockQuotes::default()),
            Arc::new(MockChainData::default()),
        );

        let err = r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap_err();
        assert!(matches!(err, PricingError::PriceUnavailable(t) if t == id(TOKEN)));
    }

    #[tokio::test]
    async fn test_fee_tiers_in_order_skipping_empty_pools() {
        let empty = usdc_token_pool(3000, dec!(100)).with_liquidity(0);
        let chain_data = Arc::new(
            MockChainData::default()
                .with_pool(empty)
                .with_pool(usdc_token_pool(10000, dec!(1500)))
                .with_pool(usdc_token_pool(500, dec!(900))),
        );
        let mut config = weth_usdc_config();
        config.bridges.insert(
            Chain::Ethereum,
            vec![BridgeAsset::new(USDC, "USDC").pegged(Decimal::ONE)],
        );
        let r = router(config, Arc::new(MockQuotes::default()), chain_data.clone());

        let quote = r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap();
        assert!((quote.price_usd - dec!(1500)).abs() < dec!(0.000001));
        assert_eq!(
            chain_data.pool_calls(),
            vec![
                (TOKEN.to_string(), USDC.to_string(), 3000),
                (TOKEN.to_string(), USDC.to_string(), 10000),
            ]
        );
    }

    #[tokio::test]
    async fn test_direct_error_falls_back_to_routing() {
        let quotes = Arc::new(MockQuotes::default().failing());
        let chain_data = Arc::new(MockChainData::default().with_pool(usdc_token_pool(3000, dec!(1500))));
        let r = router(weth_usdc_config(), quotes, chain_data);

        let quote = r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap();
        assert!((quote.price_usd - dec!(1500)).abs() < dec!(0.000001));
    }

    #[tokio::test]
    async fn test_direct_error_surfaces_when_routing_fails() {
        let r = router(
            weth_usdc_config(),
            Arc::new(MockQuotes::default().failing()),
            Arc::new(MockChainData::default()),
        );

        let err = r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap_err();
        assert!(matches!(
            err,
            PricingError::Collaborator {
                lookup: Lookup::DirectQuote,
                ..
            }
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_bridge_quote_error_is_retryable() {
        let mut config = RouterConfig::default();
        config
            .bridges
            .insert(Chain::Ethereum, vec![BridgeAsset::new(WETH, "WETH")]);
        let quotes = Arc::new(MockQuotes::default().failing_for(id(WETH)));
        let chain_data = Arc::new(MockChainData::default().with_pool(token_weth_pool(3000)));
        let r = router(config, quotes, chain_data);

        let err = r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap_err();
        assert!(matches!(
            err,
            PricingError::Collaborator {
                lookup: Lookup::DirectQuote,
                ..
            }
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_bridge_quote_error_tries_next_bridge() {
        let quotes = Arc::new(MockQuotes::default().failing_for(id(WETH)));
        let chain_data = Arc::new(
            MockChainData::default()
                .with_pool(token_weth_pool(3000))
                .with_pool(usdc_token_pool(3000, dec!(1500))),
        );
        let r = router(weth_usdc_config(), quotes, chain_data);

        let quote = r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap();
        assert!((quote.price_usd - dec!(1500)).abs() < dec!(0.000001));
        assert_eq!(
            quote.source,
            PriceSource::Routed {
                bridge: USDC.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_pool_errors_propagate() {
        let r = router(
            weth_usdc_config(),
            Arc::new(MockQuotes::default()),
            Arc::new(MockChainData::default().failing()),
        );

        let err = r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap_err();
        assert!(matches!(
            err,
            PricingError::Collaborator {
                lookup: Lookup::PoolState,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_non_positive_direct_quote_is_ignored() {
        let quotes = Arc::new(MockQuotes::default().with_price(id(TOKEN), dec!(-3)));
        let chain_data = Arc::new(MockChainData::default().with_pool(usdc_token_pool(3000, dec!(1500))));
        let r = router(weth_usdc_config(), quotes, chain_data);

        let quote = r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap();
        assert!(quote.price_usd > Decimal::ZERO);
        assert!(matches!(quote.source, PriceSource::Routed { .. }));
    }

    #[tokio::test]
    async fn test_unregistered_token_with_pool() {
        let stranger = "0x000000000000000000000000000000000000dead";
        let pool = PoolState::new(Chain::Ethereum, stranger, USDC, 3000)
            .with_sqrt_price(U256::one() << 96)
            .with_tick(0);
        let r = router(
            weth_usdc_config(),
            Arc::new(MockQuotes::default()),
            Arc::new(MockChainData::default().with_pool(pool)),
        );

        let err = r.resolve_usd_price(Chain::Ethereum, stranger).await.unwrap_err();
        assert!(matches!(err, PricingError::UnknownToken(t) if t == id(stranger)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_routed_quote_expires() {
        let quotes = Arc::new(MockQuotes::default().with_price(id(WETH), dec!(2000)));
        let chain_data = Arc::new(MockChainData::default().with_pool(token_weth_pool(3000)));
        let r = router(weth_usdc_config(), quotes, chain_data.clone());

        r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap();
        assert!(r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap().cached);
        assert_eq!(chain_data.pool_calls().len(), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        let refreshed = r.resolve_usd_price(Chain::Ethereum, TOKEN).await.unwrap();
        assert!(!refreshed.cached);
        assert_eq!(chain_data.pool_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_cache() {
        let quotes = Arc::new(MockQuotes::default().with_price(id(WETH), dec!(2000)));
        let r = router(weth_usdc_config(), quotes.clone(), Arc::new(MockChainData::default()));

        r.resolve_usd_price(Chain::Ethereum, WETH).await.unwrap();
        r.invalidate_cache(Some(&QuoteKey::new(Chain::Ethereum, WETH))).await;
        r.resolve_usd_price(Chain::Ethereum, WETH).await.unwrap();
        assert_eq!(quotes.calls(), 2);

        r.invalidate_cache(None).await;
        assert!(r.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_resolve_many_keeps_order() {
        let quotes = Arc::new(MockQuotes::default().with_price(id(WETH), dec!(2000)));
        let r = router(
            EngineConfig::default().router,
            quotes,
            Arc::new(MockChainData::default()),
        );

        let results = r.resolve_many(Chain::Ethereum, &[USDC, TOKEN, WETH]).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().source, PriceSource::Pegged);
        assert!(matches!(results[1], Err(PricingError::PriceUnavailable(_))));
        assert_eq!(results[2].as_ref().unwrap().price_usd, dec!(2000));
    }
}
