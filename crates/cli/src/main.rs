//! Command Line Interface for LP position valuation.
mod report;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use lpv_data::prelude::*;
use lpv_domain::entities::token::normalize_address;
use lpv_domain::enums::Chain;
use lpv_domain::math::{
    price_to_sqrt_price, price_to_tick, sqrt_price_to_inverse_price, sqrt_price_to_price,
    sqrt_price_to_tick, tick_to_price, tick_to_sqrt_price,
};
use lpv_domain::registry::TokenRegistry;
use lpv_pricing::prelude::*;
use primitive_types::U256;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lpv")]
#[command(about = "Concentrated liquidity position valuation and USD pricing", long_about = None)]
struct Cli {
    /// Engine config file (JSON). Defaults to LPV_CONFIG, then built-in tokens
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve USD prices for tokens
    Price {
        #[arg(short, long, default_value = "ethereum")]
        chain: Chain,

        /// Token symbols (e.g., WETH) or addresses
        #[arg(short, long, required = true, num_args = 1..)]
        token: Vec<String>,

        /// Chain snapshot used to route prices through bridge pools
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Static price file used instead of CoinGecko
        #[arg(long)]
        prices: Option<PathBuf>,
    },
    /// Value every position held by an owner
    Positions {
        #[arg(short, long, default_value = "ethereum")]
        chain: Chain,

        /// Owner address
        #[arg(short, long)]
        owner: String,

        /// Chain snapshot with pools, positions and fee growth
        #[arg(long)]
        snapshot: PathBuf,

        /// Static price file used instead of CoinGecko
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List tokens known on a chain
    Tokens {
        #[arg(short, long, default_value = "ethereum")]
        chain: Chain,
    },
    /// Convert between ticks, prices and sqrt prices
    Convert {
        #[command(subcommand)]
        conversion: Conversion,
    },
}

#[derive(Subcommand)]
enum Conversion {
    /// Tick to sqrt price and price
    Tick {
        #[arg(long, allow_hyphen_values = true)]
        tick: i32,

        #[arg(long, default_value_t = 18)]
        decimals0: u8,

        #[arg(long, default_value_t = 18)]
        decimals1: u8,
    },
    /// Price of token0 in token1 to tick and sqrt price
    Price {
        #[arg(long)]
        price: Decimal,

        #[arg(long, default_value_t = 18)]
        decimals0: u8,

        #[arg(long, default_value_t = 18)]
        decimals1: u8,
    },
    /// Q64.96 sqrt price (decimal or 0x-hex) to tick and price
    Sqrt {
        #[arg(long)]
        sqrt_price_x96: String,

        #[arg(long, default_value_t = 18)]
        decimals0: u8,

        #[arg(long, default_value_t = 18)]
        decimals1: u8,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    // logs go to stderr so --json output stays parseable
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Price {
            chain,
            token,
            snapshot,
            prices,
        } => {
            let config = load_engine_config(cli.config.as_deref())?;
            let engine = build_engine(&config, snapshot.as_deref(), prices.as_deref())?;
            let registry = engine.router().registry();

            let addresses = token
                .iter()
                .map(|t| resolve_token(registry, *chain, t))
                .collect::<Result<Vec<_>>>()?;
            let refs: Vec<&str> = addresses.iter().map(String::as_str).collect();

            info!(chain = %chain, tokens = refs.len(), "Resolving prices");
            let results = engine.router().resolve_many(*chain, &refs).await;
            report::print_prices(registry, *chain, &addresses, &results);

            if results.iter().all(|r| r.is_err()) {
                bail!("No prices could be resolved");
            }
        }
        Commands::Positions {
            chain,
            owner,
            snapshot,
            prices,
            json,
        } => {
            let config = load_engine_config(cli.config.as_deref())?;
            let engine = build_engine(&config, Some(snapshot.as_path()), prices.as_deref())?;

            let portfolio = engine
                .value_owner(*chain, owner)
                .await
                .with_context(|| format!("Failed to value positions of {owner} on {chain}"))?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&portfolio)?);
            } else {
                report::print_portfolio(&portfolio);
            }
        }
        Commands::Tokens { chain } => {
            let config = load_engine_config(cli.config.as_deref())?;
            report::print_tokens(&config.registry(), &config.router, *chain);
        }
        Commands::Convert { conversion } => {
            report::print_conversion(&convert(conversion)?);
        }
    }

    Ok(())
}

fn build_engine(
    config: &EngineConfig,
    snapshot: Option<&Path>,
    prices: Option<&Path>,
) -> Result<ValuationEngine> {
    let chain_data: Arc<dyn ChainDataSource> = match snapshot {
        Some(path) => Arc::new(SnapshotChainData::from_file(path)?),
        None => Arc::new(SnapshotChainData::default()),
    };
    let quotes: Arc<dyn QuoteSource> = match prices {
        Some(path) => Arc::new(StaticQuoteSource::from_file(path)?),
        None => Arc::new(CoinGeckoQuoteSource::new(
            &config.registry(),
            CoinGeckoSettings::from_env(),
        )?),
    };
    Ok(ValuationEngine::from_config(config, quotes, chain_data))
}

/// Accepts a 20-byte hex address or a symbol registered on `chain`.
fn resolve_token(registry: &TokenRegistry, chain: Chain, input: &str) -> Result<String> {
    let input = input.trim();
    if input.len() == 42 && input.starts_with("0x") {
        return Ok(normalize_address(input));
    }
    registry
        .by_symbol(chain, input)
        .map(|t| t.address.clone())
        .with_context(|| format!("Unknown token {input} on {chain}"))
}

fn parse_u256(input: &str) -> Result<U256> {
    let input = input.trim();
    match input.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| anyhow!("Invalid hex number {input}: {e}")),
        None => U256::from_dec_str(input).map_err(|e| anyhow!("Invalid number {input}: {e}")),
    }
}

fn convert(conversion: &Conversion) -> Result<Vec<(&'static str, String)>> {
    let rows = match *conversion {
        Conversion::Tick {
            tick,
            decimals0,
            decimals1,
        } => {
            let sqrt_price = tick_to_sqrt_price(tick)?;
            vec![
                ("tick", tick.to_string()),
                ("sqrt_price_x96", sqrt_price.to_string()),
                ("price", tick_to_price(tick, decimals0, decimals1)?.normalize().to_string()),
                (
                    "inverse_price",
                    sqrt_price_to_inverse_price(sqrt_price, decimals0, decimals1)?
                        .normalize()
                        .to_string(),
                ),
            ]
        }
        Conversion::Price {
            price,
            decimals0,
            decimals1,
        } => vec![
            ("price", price.normalize().to_string()),
            ("tick", price_to_tick(price, decimals0, decimals1)?.to_string()),
            (
                "sqrt_price_x96",
                price_to_sqrt_price(price, decimals0, decimals1)?.to_string(),
            ),
        ],
        Conversion::Sqrt {
            ref sqrt_price_x96,
            decimals0,
            decimals1,
        } => {
            let sqrt_price = parse_u256(sqrt_price_x96)?;
            vec![
                ("sqrt_price_x96", sqrt_price.to_string()),
                ("tick", sqrt_price_to_tick(sqrt_price)?.to_string()),
                (
                    "price",
                    sqrt_price_to_price(sqrt_price, decimals0, decimals1)?
                        .normalize()
                        .to_string(),
                ),
                (
                    "inverse_price",
                    sqrt_price_to_inverse_price(sqrt_price, decimals0, decimals1)?
                        .normalize()
                        .to_string(),
                ),
            ]
        }
    };
    Ok(rows)
}
