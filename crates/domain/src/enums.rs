use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// EVM chains the engine knows how to price on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Arbitrum,
    Optimism,
    Polygon,
    Base,
}

impl Chain {
    /// All supported chains.
    pub const ALL: [Chain; 5] = [
        Chain::Ethereum,
        Chain::Arbitrum,
        Chain::Optimism,
        Chain::Polygon,
        Chain::Base,
    ];

    /// EVM chain id.
    #[must_use]
    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::Arbitrum => 42161,
            Chain::Optimism => 10,
            Chain::Polygon => 137,
            Chain::Base => 8453,
        }
    }

    /// Lowercase canonical name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Arbitrum => "arbitrum",
            Chain::Optimism => "optimism",
            Chain::Polygon => "polygon",
            Chain::Base => "base",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Chain::ALL
            .into_iter()
            .find(|c| c.as_str() == lower || c.chain_id().to_string() == lower)
            .ok_or_else(|| format!("unknown chain: {s}"))
    }
}

/// Where a USD price came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PriceSource {
    /// Quoted directly by the external quote source.
    Direct,
    /// Derived through a pool against a bridge asset.
    Routed { bridge: String },
    /// Configured USD peg of a bridge asset.
    Pegged,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceSource::Direct => f.write_str("direct"),
            PriceSource::Routed { bridge } => write!(f, "routed via {bridge}"),
            PriceSource::Pegged => f.write_str("pegged"),
        }
    }
}
