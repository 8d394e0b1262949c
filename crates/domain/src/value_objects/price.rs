use crate::entities::token::{TokenId, normalize_address};
use crate::enums::{Chain, PriceSource};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved USD price for a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub token: TokenId,
    pub price_usd: Decimal,
    pub source: PriceSource,
    pub timestamp: DateTime<Utc>,
    /// Set when the quote was served from the cache.
    #[serde(default)]
    pub cached: bool,
}

impl PriceQuote {
    pub fn new(token: TokenId, price_usd: Decimal, source: PriceSource) -> Self {
        Self {
            token,
            price_usd,
            source,
            timestamp: Utc::now(),
            cached: false,
        }
    }

    #[must_use]
    pub fn direct(token: TokenId, price_usd: Decimal) -> Self {
        Self::new(token, price_usd, PriceSource::Direct)
    }

    #[must_use]
    pub fn pegged(token: TokenId, price_usd: Decimal) -> Self {
        Self::new(token, price_usd, PriceSource::Pegged)
    }

    #[must_use]
    pub fn routed(token: TokenId, price_usd: Decimal, bridge: impl AsRef<str>) -> Self {
        Self::new(
            token,
            price_usd,
            PriceSource::Routed {
                bridge: normalize_address(bridge.as_ref()),
            },
        )
    }

    /// Marks the quote as served from the cache.
    #[must_use]
    pub fn into_cached(mut self) -> Self {
        self.cached = true;
        self
    }

    /// USD value of `amount` units of the token.
    #[must_use]
    pub fn value_of(&self, amount: Decimal) -> Option<Decimal> {
        amount.checked_mul(self.price_usd)
    }
}

impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = ${} ({})", self.token, self.price_usd.normalize(), self.source)?;
        if self.cached {
            f.write_str(" [cached]")?;
        }
        Ok(())
    }
}

/// Cache key for a price quote: the token and, for routed quotes, the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteKey {
    pub chain: Chain,
    pub token: String,
    pub route: Option<String>,
}

impl QuoteKey {
    pub fn new(chain: Chain, token: impl AsRef<str>) -> Self {
        Self {
            chain,
            token: normalize_address(token.as_ref()),
            route: None,
        }
    }

    pub fn routed(chain: Chain, token: impl AsRef<str>, bridge: impl AsRef<str>) -> Self {
        Self {
            chain,
            token: normalize_address(token.as_ref()),
            route: Some(normalize_address(bridge.as_ref())),
        }
    }

    #[must_use]
    pub fn token_id(&self) -> TokenId {
        TokenId::new(self.chain, &self.token)
    }
}

impl From<&TokenId> for QuoteKey {
    fn from(id: &TokenId) -> Self {
        Self::new(id.chain, &id.address)
    }
}

impl fmt::Display for QuoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.token)?;
        if let Some(route) = &self.route {
            write!(f, " via {route}")?;
        }
        Ok(())
    }
}
