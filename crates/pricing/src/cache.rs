//! Time-bounded store of resolved USD quotes.

use crate::config::{CacheConfig, QuoteClass};
use crate::error::PricingError;
use lpv_domain::value_objects::{PriceQuote, QuoteKey};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct CacheEntry {
    quote: PriceQuote,
    expires_at: Instant,
}

/// Quote cache with per-entry expiry.
///
/// Expired entries are treated as misses when read and replaced by the next
/// `put`; nothing sweeps them in the background.
#[derive(Debug, Default)]
pub struct QuoteCache {
    entries: RwLock<HashMap<QuoteKey, CacheEntry>>,
    config: CacheConfig,
}

impl QuoteCache {
    /// Creates an empty cache.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// TTL configured for `class`.
    #[must_use]
    pub fn ttl_for(&self, class: QuoteClass) -> Duration {
        self.config.ttl_for(class)
    }

    /// Returns the live quote for `key`.
    ///
    /// Entries that fail validation are removed and reported as
    /// `CacheCorruption`.
    pub async fn try_get(&self, key: &QuoteKey) -> Result<Option<PriceQuote>, PricingError> {
        let reason = {
            let entries = self.entries.read().await;
            let Some(entry) = entries.get(key) else {
                return Ok(None);
            };
            if Instant::now() >= entry.expires_at {
                return Ok(None);
            }
            match validate(key, &entry.quote) {
                None => return Ok(Some(entry.quote.clone().into_cached())),
                Some(reason) => reason,
            }
        };

        self.discard_if_invalid(key).await;
        Err(PricingError::CacheCorruption {
            key: key.clone(),
            reason,
        })
    }

    /// Removes the entry for `key` if it still fails validation.
    ///
    /// Re-checked under the write lock so a valid quote stored after the
    /// corrupt read is kept.
    async fn discard_if_invalid(&self, key: &QuoteKey) -> bool {
        let mut entries = self.entries.write().await;
        let invalid = entries
            .get(key)
            .is_some_and(|entry| validate(key, &entry.quote).is_some());
        if invalid {
            entries.remove(key);
        }
        invalid
    }

    /// Returns the live quote for `key`, discarding corrupt entries as misses.
    pub async fn get(&self, key: &QuoteKey) -> Option<PriceQuote> {
        match self.try_get(key).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!(key = %key, error = %e, "Discarded corrupt cache entry");
                None
            }
        }
    }

    /// Stores `quote` under `key` for `ttl`. Last writer wins.
    pub async fn put(&self, key: QuoteKey, quote: PriceQuote, ttl: Duration) {
        debug!(key = %key, price = %quote.price_usd, ttl_secs = ttl.as_secs(), "Caching quote");
        let entry = CacheEntry {
            quote,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Removes the entry for `key`. Returns whether one existed.
    pub async fn invalidate(&self, key: &QuoteKey) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Removes all entries.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, including expired ones not yet overwritten.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn validate(key: &QuoteKey, quote: &PriceQuote) -> Option<String> {
    if quote.price_usd <= Decimal::ZERO {
        return Some(format!("non-positive price {}", quote.price_usd));
    }
    if quote.token != key.token_id() {
        return Some(format!("quote is for {}", quote.token));
    }
    None
}
