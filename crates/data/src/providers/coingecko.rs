use super::decimal_from_json;
use crate::settings::CoinGeckoSettings;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use lpv_domain::entities::TokenId;
use lpv_domain::registry::TokenRegistry;
use lpv_pricing::sources::QuoteSource;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, trace};

const DEMO_KEY_HEADER: &str = "x-cg-demo-api-key";
const PRO_KEY_HEADER: &str = "x-cg-pro-api-key";

/// USD quotes from the CoinGecko `/simple/price` endpoint.
///
/// Tokens without a CoinGecko id in the registry are not quoted. The source
/// neither retries nor caches; the router's cache covers repeat lookups.
pub struct CoinGeckoQuoteSource {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
    ids: HashMap<TokenId, String>,
}

impl CoinGeckoQuoteSource {
    /// Creates a source quoting every registry token that carries a CoinGecko id.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(registry: &TokenRegistry, settings: CoinGeckoSettings) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let ids = registry
            .iter()
            .filter_map(|token| {
                token
                    .coingecko_id
                    .as_ref()
                    .map(|id| (token.id(), id.clone()))
            })
            .collect();

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key,
            ids,
        })
    }

    /// CoinGecko id used for `token`, if any.
    #[must_use]
    pub fn coin_id(&self, token: &TokenId) -> Option<&str> {
        self.ids.get(token).map(String::as_str)
    }

    fn price_url(&self, coin_id: &str) -> String {
        format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url, coin_id
        )
    }

    fn key_header(&self) -> &'static str {
        if self.base_url.contains("pro-api.") {
            PRO_KEY_HEADER
        } else {
            DEMO_KEY_HEADER
        }
    }
}

/// Extracts `body[coin_id].usd`.
fn parse_usd_price(body: &Value, coin_id: &str) -> Option<Decimal> {
    body.get(coin_id)
        .and_then(|entry| entry.get("usd"))
        .and_then(decimal_from_json)
}

#[async_trait]
impl QuoteSource for CoinGeckoQuoteSource {
    async fn usd_price(&self, token: &TokenId) -> Result<Option<Decimal>> {
        let Some(coin_id) = self.coin_id(token) else {
            trace!(token = %token, "No CoinGecko id");
            return Ok(None);
        };

        let mut request = self.http_client.get(self.price_url(coin_id));
        if let Some(key) = &self.api_key {
            request = request.header(self.key_header(), key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("CoinGecko request for {coin_id} failed"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("CoinGecko returned {status} for {coin_id}");
        }

        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Invalid CoinGecko response for {coin_id}"))?;
        let price = parse_usd_price(&body, coin_id);
        debug!(token = %token, coin_id, price = ?price, "CoinGecko quote");
        Ok(price)
    }
}
