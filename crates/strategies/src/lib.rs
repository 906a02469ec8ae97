//! Swap Strategies
//!
//! Venue strategies behind the [`SwapStrategy`](swap_types::SwapStrategy) contract: the HTTP
//! aggregator, direct stable-swap pools, analytical near-parity pricing and guided manual
//! swaps, plus the factory that builds them from settings.

pub mod aggregator;
pub mod approval;
pub mod client_cache;
pub mod common;
pub mod direct_pool;
pub mod execution;
pub mod factory;
pub mod fallback_pricing;
pub mod guided;
pub mod pricing;

pub use aggregator::{
	AggregatorApi, AggregatorQuote, AggregatorStrategy, AggregatorSwap, HttpAggregatorApi,
	QuoteParams, SwapParams,
};
pub use client_cache::{AuthConfig, ClientCache, ClientConfig};
pub use direct_pool::DirectPoolStrategy;
pub use factory::{StrategyFactory, StrategyFactoryError};
pub use fallback_pricing::FallbackPricingStrategy;
pub use guided::GuidedManualStrategy;
