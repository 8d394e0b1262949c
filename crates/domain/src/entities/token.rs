use crate::enums::Chain;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Normalises an EVM address for use as a lookup key.
#[must_use]
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

/// Deserialises an address through [`normalize_address`].
pub fn deserialize_address<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|address| normalize_address(&address))
}

/// Chain-scoped token identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId {
    pub chain: Chain,
    #[serde(deserialize_with = "deserialize_address")]
    pub address: String,
}

impl TokenId {
    pub fn new(chain: Chain, address: impl AsRef<str>) -> Self {
        Self {
            chain,
            address: normalize_address(address.as_ref()),
        }
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.address)
    }
}

/// Token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub chain: Chain,
    #[serde(deserialize_with = "deserialize_address")]
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub coingecko_id: Option<String>,
}

impl Token {
    pub fn new(chain: Chain, address: impl AsRef<str>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            chain,
            address: normalize_address(address.as_ref()),
            symbol: symbol.into(),
            decimals,
            coingecko_id: None,
        }
    }

    #[must_use]
    pub fn with_coingecko_id(mut self, id: impl Into<String>) -> Self {
        self.coingecko_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> TokenId {
        TokenId {
            chain: self.chain,
            address: self.address.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_id_is_case_insensitive() {
        let checksummed = TokenId::new(Chain::Ethereum, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
        let lower = TokenId::new(Chain::Ethereum, "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
        assert_eq!(checksummed, lower);
        assert_eq!(
            checksummed.to_string(),
            "ethereum:0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
        );
    }

    #[test]
    fn test_deserialized_token_matches_lookup_id() {
        let token: Token = serde_json::from_str(
            r#"{ "chain": "ethereum", "address": "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984",
                 "symbol": "UNI", "decimals": 18 }"#,
        )
        .unwrap();
        assert_eq!(token.address, "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984");
        assert_eq!(
            token.id(),
            TokenId::new(Chain::Ethereum, "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984")
        );
    }

    #[test]
    fn test_token_id_includes_chain() {
        let eth = TokenId::new(Chain::Ethereum, "0xabc");
        let arb = TokenId::new(Chain::Arbitrum, "0xabc");
        assert_ne!(eth, arb);
    }
}
