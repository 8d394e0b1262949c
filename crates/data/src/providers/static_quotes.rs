use super::decimal_from_json;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use lpv_domain::entities::TokenId;
use lpv_domain::enums::Chain;
use lpv_pricing::sources::QuoteSource;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// Fixed USD quotes held in memory.
///
/// Useful for offline runs against snapshots. The price file maps chain name
/// to address to price:
///
/// ```json
/// { "ethereum": { "0xc02a...6cc2": "2000.50" } }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticQuoteSource {
    prices: HashMap<TokenId, Decimal>,
}

impl StaticQuoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_price(mut self, token: TokenId, price: Decimal) -> Self {
        self.prices.insert(token, price);
        self
    }

    /// Loads quotes from a JSON price file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, names an
    /// unknown chain or carries a price that is not a decimal.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read price file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid price file {}", path.display()))
    }

    /// Parses quotes from the JSON price file format.
    ///
    /// # Errors
    /// See [`StaticQuoteSource::from_file`].
    pub fn from_json(raw: &str) -> Result<Self> {
        let body: HashMap<String, HashMap<String, Value>> = serde_json::from_str(raw)?;
        let mut source = Self::new();
        for (chain, prices) in body {
            let chain = Chain::from_str(&chain).map_err(|e| anyhow!("{e}"))?;
            for (address, value) in prices {
                let price = decimal_from_json(&value)
                    .ok_or_else(|| anyhow!("price for {address} is not a decimal: {value}"))?;
                source.prices.insert(TokenId::new(chain, &address), price);
            }
        }
        Ok(source)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[async_trait]
impl QuoteSource for StaticQuoteSource {
    async fn usd_price(&self, token: &TokenId) -> Result<Option<Decimal>> {
        Ok(self.prices.get(token).copied())
    }
}
