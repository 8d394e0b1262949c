//! Error types for price resolution and portfolio valuation.

use lpv_domain::entities::TokenId;
use lpv_domain::enums::Chain;
use lpv_domain::error::{MathError, ValuationError};
use lpv_domain::value_objects::QuoteKey;
use std::fmt;

/// Collaborator call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Pool state fetch from the chain-data source.
    PoolState,
    /// Position listing from the chain-data source.
    Positions,
    /// Fee growth fetch from the chain-data source.
    FeeGrowth,
    /// USD quote from the quote source.
    DirectQuote,
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::PoolState => f.write_str("pool state"),
            Lookup::Positions => f.write_str("positions"),
            Lookup::FeeGrowth => f.write_str("fee growth"),
            Lookup::DirectQuote => f.write_str("direct quote"),
        }
    }
}

/// Errors raised by the pricing layer.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    /// No direct quote, peg or routed price exists.
    #[error("no USD price available for {0}")]
    PriceUnavailable(TokenId),
    /// A bridge pool exists but its bridge asset could only be priced by another hop.
    #[error("pricing {token} via {bridge} needs more than one routing hop")]
    RoutingDepthExceeded { token: TokenId, bridge: String },
    /// A cached quote failed validation and was discarded.
    #[error("corrupt cache entry for {key}: {reason}")]
    CacheCorruption { key: QuoteKey, reason: String },
    /// Token metadata needed for routing is not registered.
    #[error("unknown token {0}")]
    UnknownToken(TokenId),
    /// The chain has no pool for the position's token pair and fee tier.
    #[error("no {fee_tier} pool for {token0}/{token1} on {chain}")]
    PoolNotFound {
        chain: Chain,
        token0: String,
        token1: String,
        fee_tier: u32,
    },
    /// A collaborator call failed.
    #[error("{lookup} lookup failed: {source}")]
    Collaborator {
        lookup: Lookup,
        #[source]
        source: anyhow::Error,
    },
    /// Math failure.
    #[error(transparent)]
    Math(#[from] MathError),
    /// Valuation failure.
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}

impl PricingError {
    pub(crate) fn collaborator(lookup: Lookup, source: anyhow::Error) -> Self {
        Self::Collaborator { lookup, source }
    }

    /// Whether retrying the same call could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, PricingError::Collaborator { .. })
    }
}

/// Result alias for the pricing layer.
pub type Result<T> = std::result::Result<T, PricingError>;
