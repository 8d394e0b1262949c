//! Table rendering for command output.

use lpv_domain::enums::Chain;
use lpv_domain::registry::TokenRegistry;
use lpv_domain::value_objects::PriceQuote;
use lpv_pricing::config::RouterConfig;
use lpv_pricing::engine::{PortfolioReport, PositionReport, TokenValue};
use lpv_pricing::error::PricingError;
use prettytable::{Table, row};
use rust_decimal::Decimal;

fn usd(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("${}", v.round_dp(2)),
        None => "-".to_string(),
    }
}

fn symbol_or_address(registry: &TokenRegistry, chain: Chain, address: &str) -> String {
    registry
        .tokens_on(chain)
        .into_iter()
        .find(|t| t.address == address)
        .map(|t| t.symbol.clone())
        .unwrap_or_else(|| address.to_string())
}

pub fn print_prices(
    registry: &TokenRegistry,
    chain: Chain,
    addresses: &[String],
    results: &[Result<PriceQuote, PricingError>],
) {
    let mut table = Table::new();
    table.set_titles(row!["Token", "USD", "Source", "Cached", "As of"]);

    for (address, result) in addresses.iter().zip(results) {
        let token = symbol_or_address(registry, chain, address);
        match result {
            Ok(quote) => {
                let price = quote.price_usd.normalize().to_string();
                let source = quote.source.to_string();
                let cached = if quote.cached { "yes" } else { "no" };
                let as_of = quote.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
                table.add_row(row![token, price, source, cached, as_of]);
            }
            Err(e) => {
                let error = e.to_string();
                table.add_row(row![token, "-", error, "", ""]);
            }
        }
    }

    table.printstd();
}

pub fn print_tokens(registry: &TokenRegistry, router: &RouterConfig, chain: Chain) {
    let mut table = Table::new();
    table.set_titles(row!["Symbol", "Address", "Decimals", "CoinGecko", "Bridge"]);

    for token in registry.tokens_on(chain) {
        let bridge = match router.bridges_for(chain).iter().find(|b| b.address == token.address) {
            Some(b) => match b.peg_usd {
                Some(peg) => format!("pegged ${peg}"),
                None => "yes".to_string(),
            },
            None => String::new(),
        };
        let coingecko = token.coingecko_id.clone().unwrap_or_default();
        table.add_row(row![token.symbol, token.address, token.decimals, coingecko, bridge]);
    }

    table.printstd();
}

fn amount_cell(side: &TokenValue) -> String {
    format!("{} {}", side.amount, side.symbol)
}

fn fees_cell(position: &PositionReport) -> String {
    let marker = if position.fees_lower_bound { " (min)" } else { "" };
    format!(
        "{} {} + {} {}{marker}",
        position.token0.fees, position.token0.symbol, position.token1.fees, position.token1.symbol
    )
}

pub fn print_portfolio(portfolio: &PortfolioReport) {
    println!("Owner {} on {}", portfolio.owner, portfolio.chain);

    let mut table = Table::new();
    table.set_titles(row![
        "Position", "Range", "In range", "Token0", "Token1", "Unclaimed fees", "Fees USD", "Value USD"
    ]);

    for position in &portfolio.positions {
        let id = position.position_id.to_string();
        let range = format!("[{}, {})", position.tick_lower, position.tick_upper);
        let in_range = if position.in_range { "yes" } else { "no" };
        let amount0 = amount_cell(&position.token0);
        let amount1 = amount_cell(&position.token1);
        let fees = fees_cell(position);
        let fees_usd = usd(position.total_fees_usd);
        let value_usd = usd(position.total_value_usd);
        table.add_row(row![id, range, in_range, amount0, amount1, fees, fees_usd, value_usd]);
    }
    table.printstd();

    println!("Total value: {}", usd(Some(portfolio.total_value_usd)));
    if portfolio.unpriced_positions > 0 {
        println!(
            "{} position(s) excluded from the total for missing prices",
            portfolio.unpriced_positions
        );
    }
    for position in &portfolio.positions {
        for error in &position.price_errors {
            println!("  position {}: {error}", position.position_id);
        }
    }
    for failure in &portfolio.failures {
        println!("Failed to value position {}: {}", failure.position_id, failure.error);
    }
}

pub fn print_conversion(rows: &[(&'static str, String)]) {
    let mut table = Table::new();
    for (name, value) in rows {
        table.add_row(row![name, value]);
    }
    table.printstd();
}
