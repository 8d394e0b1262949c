//! Position and portfolio valuation in USD.

use crate::cache::QuoteCache;
use crate::config::EngineConfig;
use crate::error::{Lookup, PricingError, Result};
use crate::router::PriceRouter;
use crate::sources::{ChainDataSource, QuoteSource};
use futures::future::join_all;
use lpv_domain::entities::{Position, TokenId};
use lpv_domain::enums::Chain;
use lpv_domain::valuation::PositionValuator;
use lpv_domain::value_objects::{PriceQuote, TokenAmount};
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// One side of a position, with its USD value when a price was found.
#[derive(Debug, Clone, Serialize)]
pub struct TokenValue {
    pub token: TokenId,
    pub symbol: String,
    pub amount: TokenAmount,
    pub fees: TokenAmount,
    pub price: Option<PriceQuote>,
    pub value_usd: Option<Decimal>,
    pub fees_usd: Option<Decimal>,
}

impl TokenValue {
    fn new(token: TokenId, symbol: String, amount: TokenAmount, fees: TokenAmount) -> Self {
        Self {
            token,
            symbol,
            amount,
            fees,
            price: None,
            value_usd: None,
            fees_usd: None,
        }
    }

    fn priced(mut self, quote: PriceQuote) -> Self {
        self.value_usd = quote.value_of(self.amount.value);
        self.fees_usd = quote.value_of(self.fees.value);
        self.price = Some(quote);
        self
    }
}

/// USD valuation of a single position.
#[derive(Debug, Clone, Serialize)]
pub struct PositionReport {
    pub position_id: U256,
    pub chain: Chain,
    pub owner: String,
    pub fee_tier: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub in_range: bool,
    pub fees_lower_bound: bool,
    pub token0: TokenValue,
    pub token1: TokenValue,
    /// Liquidity plus unclaimed fees, when both tokens are priced.
    pub total_value_usd: Option<Decimal>,
    pub total_fees_usd: Option<Decimal>,
    pub price_errors: Vec<String>,
}

/// A position that could not be valued.
#[derive(Debug, Clone, Serialize)]
pub struct PositionFailure {
    pub position_id: U256,
    pub error: String,
}

/// USD valuation of every position held by one owner.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioReport {
    pub chain: Chain,
    pub owner: String,
    pub positions: Vec<PositionReport>,
    pub failures: Vec<PositionFailure>,
    /// Sum over fully priced positions.
    pub total_value_usd: Decimal,
    /// Positions missing from the total because a price was unavailable.
    pub unpriced_positions: usize,
}

/// Combines position valuation with price resolution.
pub struct ValuationEngine {
    router: Arc<PriceRouter>,
    chain_data: Arc<dyn ChainDataSource>,
    valuator: PositionValuator,
}

impl ValuationEngine {
    pub fn new(router: Arc<PriceRouter>, chain_data: Arc<dyn ChainDataSource>) -> Self {
        let valuator = PositionValuator::new(Arc::clone(router.registry()));
        Self {
            router,
            chain_data,
            valuator,
        }
    }

    /// Wires a router, cache and registry from `config`.
    pub fn from_config(
        config: &EngineConfig,
        quotes: Arc<dyn QuoteSource>,
        chain_data: Arc<dyn ChainDataSource>,
    ) -> Self {
        let router = PriceRouter::new(
            Arc::new(QuoteCache::new(config.cache)),
            quotes,
            Arc::clone(&chain_data),
            Arc::new(config.registry()),
            config.router.clone(),
        );
        Self::new(Arc::new(router), chain_data)
    }

    pub fn router(&self) -> &PriceRouter {
        &self.router
    }

    /// Values one position in USD.
    ///
    /// Pool and fee-growth lookups and valuation errors fail the call. A
    /// missing price only blanks the affected USD fields and is recorded in
    /// `price_errors`.
    pub async fn value_position(&self, position: &Position) -> Result<PositionReport> {
        let pool = self
            .chain_data
            .pool_state(
                position.chain,
                &position.token0,
                &position.token1,
                position.fee_tier,
            )
            .await
            .map_err(|e| PricingError::collaborator(Lookup::PoolState, e))?
            .ok_or_else(|| PricingError::PoolNotFound {
                chain: position.chain,
                token0: position.token0.clone(),
                token1: position.token1.clone(),
                fee_tier: position.fee_tier,
            })?;

        let fee_growth = self
            .chain_data
            .fee_growth_inside(position)
            .await
            .map_err(|e| PricingError::collaborator(Lookup::FeeGrowth, e))?;

        let valuation = self
            .valuator
            .valuate(position, &pool, fee_growth.as_ref())?;

        let registry = self.valuator.registry();
        let symbol = |id: &TokenId| {
            registry
                .get(id)
                .map(|t| t.symbol.clone())
                .unwrap_or_default()
        };
        let mut token0 = TokenValue::new(
            valuation.token0.clone(),
            symbol(&valuation.token0),
            valuation.amount0,
            valuation.unclaimed_fee0,
        );
        let mut token1 = TokenValue::new(
            valuation.token1.clone(),
            symbol(&valuation.token1),
            valuation.amount1,
            valuation.unclaimed_fee1,
        );

        let (price0, price1) = tokio::join!(
            self.router
                .resolve_usd_price(position.chain, &valuation.token0.address),
            self.router
                .resolve_usd_price(position.chain, &valuation.token1.address),
        );

        let mut price_errors = Vec::new();
        match price0 {
            Ok(quote) => token0 = token0.priced(quote),
            Err(e) => {
                warn!(position = %position.id, token = %valuation.token0, error = %e, "No price for token0");
                price_errors.push(format!("{}: {e}", token0.symbol));
            }
        }
        match price1 {
            Ok(quote) => token1 = token1.priced(quote),
            Err(e) => {
                warn!(position = %position.id, token = %valuation.token1, error = %e, "No price for token1");
                price_errors.push(format!("{}: {e}", token1.symbol));
            }
        }

        let total_fees_usd = sum(token0.fees_usd, token1.fees_usd);
        let total_value_usd = sum(sum(token0.value_usd, token1.value_usd), total_fees_usd);

        Ok(PositionReport {
            position_id: position.id,
            chain: position.chain,
            owner: position.owner.clone(),
            fee_tier: position.fee_tier,
            tick_lower: position.tick_lower,
            tick_upper: position.tick_upper,
            in_range: valuation.in_range,
            fees_lower_bound: valuation.fees_lower_bound,
            token0,
            token1,
            total_value_usd,
            total_fees_usd,
            price_errors,
        })
    }

    /// Values every position `owner` holds on `chain`, concurrently.
    ///
    /// Only the position listing is fatal; per-position failures are collected.
    pub async fn value_owner(&self, chain: Chain, owner: &str) -> Result<PortfolioReport> {
        let positions = self
            .chain_data
            .positions(chain, owner)
            .await
            .map_err(|e| PricingError::collaborator(Lookup::Positions, e))?;

        let results = join_all(positions.iter().map(|p| self.value_position(p))).await;

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for (position, result) in positions.iter().zip(results) {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(position = %position.id, error = %e, "Failed to value position");
                    failures.push(PositionFailure {
                        position_id: position.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        let total_value_usd = reports
            .iter()
            .filter_map(|r| r.total_value_usd)
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v));
        let unpriced_positions = reports
            .iter()
            .filter(|r| r.total_value_usd.is_none())
            .count();

        info!(
            chain = %chain,
            owner,
            positions = reports.len(),
            failures = failures.len(),
            total_value_usd = %total_value_usd,
            "Valued portfolio"
        );

        Ok(PortfolioReport {
            chain,
            owner: owner.to_string(),
            positions: reports,
            failures,
            total_value_usd,
            unpriced_positions,
        })
    }
}

fn sum(a: Option<Decimal>, b: Option<Decimal>) -> Option<Decimal> {
    a?.checked_add(b?)
}
