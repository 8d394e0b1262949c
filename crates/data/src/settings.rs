//! Engine configuration loading.
//!
//! Configuration comes from a JSON file (explicit path or `LPV_CONFIG`), or
//! [`EngineConfig::default`] when none is given, with a few environment
//! overrides applied on top. `.env` files are honoured via `dotenv`.

use anyhow::{Context, Result};
use lpv_pricing::config::EngineConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "LPV_CONFIG";
pub const DIRECT_TTL_ENV: &str = "LPV_DIRECT_TTL_SECS";
pub const ROUTED_TTL_ENV: &str = "LPV_ROUTED_TTL_SECS";
pub const COINGECKO_API_KEY_ENV: &str = "COINGECKO_API_KEY";
pub const COINGECKO_BASE_URL_ENV: &str = "COINGECKO_BASE_URL";

const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
const API_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the CoinGecko quote source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinGeckoSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CoinGeckoSettings {
    fn default() -> Self {
        Self {
            base_url: COINGECKO_API_URL.to_string(),
            api_key: None,
            timeout_secs: API_TIMEOUT_SECS,
        }
    }
}

impl CoinGeckoSettings {
    /// Reads settings from the process environment, after loading `.env`.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            base_url: var(COINGECKO_BASE_URL_ENV).unwrap_or(defaults.base_url),
            api_key: var(COINGECKO_API_KEY_ENV),
            timeout_secs: defaults.timeout_secs,
        }
    }
}

/// Loads the engine configuration.
///
/// `path` wins over `LPV_CONFIG`; with neither, the built-in default is used.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or an override is
/// not a valid number.
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    dotenv::dotenv().ok();
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    let mut config = match path {
        Some(path) => read_config_file(&path)?,
        None => {
            debug!("No config file given, using defaults");
            EngineConfig::default()
        }
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<EngineConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: EngineConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    info!(path = %path.display(), tokens = config.tokens.len(), "Loaded engine config");
    Ok(config)
}

/// Applies cache TTL overrides read through `lookup`.
///
/// # Errors
/// Returns an error if an override is present but not a whole number of seconds.
pub fn apply_env_overrides(
    config: &mut EngineConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(secs) = parse_secs(&lookup, DIRECT_TTL_ENV)? {
        config.cache.direct_ttl_secs = secs;
    }
    if let Some(secs) = parse_secs(&lookup, ROUTED_TTL_ENV)? {
        config.cache.routed_ttl_secs = secs;
    }
    Ok(())
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    let secs = value
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a number of seconds, got {value:?}"))?;
    debug!(key, secs, "Applying TTL override");
    Ok(Some(secs))
}
