//! USD quote providers implementing [`lpv_pricing::sources::QuoteSource`].

mod coingecko;
mod static_quotes;

pub use coingecko::CoinGeckoQuoteSource;
pub use static_quotes::StaticQuoteSource;

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Reads a decimal from a JSON number or string, accepting exponent notation.
pub(crate) fn decimal_from_json(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
