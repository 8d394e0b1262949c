use crate::entities::token::{Token, TokenId};
use crate::enums::Chain;
use crate::error::ValuationError;
use std::collections::HashMap;

/// Token metadata keyed by chain and address.
///
/// Populated before any valuation runs; decimals are never inferred.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<TokenId, Token>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token`, replacing any previous entry with the same id.
    pub fn register(&mut self, token: Token) {
        self.tokens.insert(token.id(), token);
    }

    #[must_use]
    pub fn get(&self, id: &TokenId) -> Option<&Token> {
        self.tokens.get(id)
    }

    /// Looks up a token or fails with `UnknownToken`.
    pub fn require(&self, id: &TokenId) -> Result<&Token, ValuationError> {
        self.get(id)
            .ok_or_else(|| ValuationError::UnknownToken(id.clone()))
    }

    /// Case-insensitive symbol lookup on one chain.
    #[must_use]
    pub fn by_symbol(&self, chain: Chain, symbol: &str) -> Option<&Token> {
        self.tokens
            .values()
            .find(|t| t.chain == chain && t.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Tokens registered on `chain`, sorted by symbol.
    #[must_use]
    pub fn tokens_on(&self, chain: Chain) -> Vec<&Token> {
        let mut tokens: Vec<&Token> = self.tokens.values().filter(|t| t.chain == chain).collect();
        tokens.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        tokens
    }

    /// All registered tokens, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromIterator<Token> for TokenRegistry {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut registry = Self::new();
        for token in iter {
            registry.register(token);
        }
        registry
    }
}
