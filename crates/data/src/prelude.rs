//! Prelude module for convenient imports.
//!
//! ```rust
//! use lpv_data::prelude::*;
//! ```

// Providers
pub use crate::providers::{CoinGeckoQuoteSource, StaticQuoteSource};

// Settings
pub use crate::settings::{CoinGeckoSettings, apply_env_overrides, load_engine_config};

// Snapshot
pub use crate::snapshot::{ChainSnapshot, FeeGrowthRecord, SnapshotChainData};
