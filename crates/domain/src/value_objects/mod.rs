pub mod amount;
pub mod price;

pub use amount::TokenAmount;
pub use price::{PriceQuote, QuoteKey};
