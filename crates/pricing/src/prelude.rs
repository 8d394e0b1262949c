//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use lpv_pricing::prelude::*;
//! ```

// Cache
pub use crate::cache::QuoteCache;

// Configuration
pub use crate::config::{BridgeAsset, CacheConfig, EngineConfig, QuoteClass, RouterConfig};

// Engine
pub use crate::engine::{
    PortfolioReport, PositionFailure, PositionReport, TokenValue, ValuationEngine,
};

// Errors
pub use crate::error::{Lookup, PricingError};

// Router
pub use crate::router::PriceRouter;

// Collaborators
pub use crate::sources::{ChainDataSource, QuoteSource};
