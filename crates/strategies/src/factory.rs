//! Strategy construction from settings

use std::sync::Arc;
use std::time::Duration;
use swap_config::{strategy_names, ConfigurableValueError, Settings};
use swap_providers::DEFAULT_POLL_INTERVAL;
use swap_types::{SignerProvider, SwapStrategy, TokenRegistry};
use thiserror::Error;
use tracing::{debug, warn};

use crate::aggregator::{AggregatorApi, AggregatorStrategy, HttpAggregatorApi};
use crate::client_cache::ClientCache;
use crate::direct_pool::DirectPoolStrategy;
use crate::fallback_pricing::FallbackPricingStrategy;
use crate::guided::GuidedManualStrategy;

#[derive(Error, Debug)]
pub enum StrategyFactoryError {
	#[error("Unknown strategy: {0}")]
	UnknownStrategy(String),

	#[error("Cannot resolve secret: {0}")]
	Secret(#[from] ConfigurableValueError),
}

/// Builds the ordered strategy list the router dispatches over
#[derive(Debug, Clone)]
pub struct StrategyFactory {
	tokens: Arc<TokenRegistry>,
	signers: Arc<dyn SignerProvider>,
	clients: ClientCache,
	aggregator_api: Option<Arc<dyn AggregatorApi>>,
	poll_interval: Duration,
}

impl StrategyFactory {
	pub fn new(tokens: Arc<TokenRegistry>, signers: Arc<dyn SignerProvider>) -> Self {
		Self {
			tokens,
			signers,
			clients: ClientCache::new(),
			aggregator_api: None,
			poll_interval: DEFAULT_POLL_INTERVAL,
		}
	}

	pub fn with_client_cache(mut self, clients: ClientCache) -> Self {
		self.clients = clients;
		self
	}

	/// Use this API instead of the configured HTTP aggregator
	pub fn with_aggregator_api(mut self, api: Arc<dyn AggregatorApi>) -> Self {
		self.aggregator_api = Some(api);
		self
	}

	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}

	/// Strategies in `router.strategy_order`, skipping disabled ones
	pub fn build(
		&self,
		settings: &Settings,
	) -> Result<Vec<Arc<dyn SwapStrategy>>, StrategyFactoryError> {
		let mut aggregator: Option<Arc<AggregatorStrategy>> = None;
		let mut strategies: Vec<Arc<dyn SwapStrategy>> = Vec::new();

		for name in &settings.router.strategy_order {
			match name.as_str() {
				strategy_names::DIRECT_POOL => {
					if !settings.direct_pool.enabled {
						debug!("strategy {} disabled", name);
						continue;
					}
					let strategy = DirectPoolStrategy::new(
						name.clone(),
						&settings.direct_pool,
						self.tokens.clone(),
						self.signers.clone(),
					)
					.with_poll_interval(self.poll_interval);
					strategies.push(Arc::new(strategy));
				},
				strategy_names::AGGREGATOR => {
					if !settings.aggregator.enabled {
						debug!("strategy {} disabled", name);
						continue;
					}
					let inner = self.aggregator(settings, &mut aggregator)?;
					strategies.push(inner);
				},
				strategy_names::FALLBACK_PRICING => {
					if !settings.fallback_pricing.enabled {
						debug!("strategy {} disabled", name);
						continue;
					}
					if !settings.aggregator.enabled {
						warn!("{} needs the aggregator, which is disabled; skipping", name);
						continue;
					}
					let inner = self.aggregator(settings, &mut aggregator)?;
					strategies.push(Arc::new(FallbackPricingStrategy::new(
						name.clone(),
						inner,
						settings.fallback_pricing.fee_bps,
					)));
				},
				strategy_names::GUIDED_MANUAL => {
					if !settings.guided.enabled {
						debug!("strategy {} disabled", name);
						continue;
					}
					strategies.push(Arc::new(GuidedManualStrategy::new(
						name.clone(),
						&settings.guided,
						self.tokens.clone(),
					)));
				},
				other => return Err(StrategyFactoryError::UnknownStrategy(other.to_string())),
			}
		}

		Ok(strategies)
	}

	/// Shared aggregator instance, built on first use
	fn aggregator(
		&self,
		settings: &Settings,
		slot: &mut Option<Arc<AggregatorStrategy>>,
	) -> Result<Arc<AggregatorStrategy>, StrategyFactoryError> {
		if let Some(existing) = slot {
			return Ok(existing.clone());
		}
		let api: Arc<dyn AggregatorApi> = match &self.aggregator_api {
			Some(api) => api.clone(),
			None => Arc::new(HttpAggregatorApi::from_settings(
				&settings.aggregator,
				settings.aggregator.resolve_api_key()?,
				self.clients.clone(),
			)),
		};
		let strategy = Arc::new(
			AggregatorStrategy::new(
				strategy_names::AGGREGATOR,
				self.tokens.clone(),
				self.signers.clone(),
				api,
				settings.aggregator.default_slippage_bps,
			)
			.with_poll_interval(self.poll_interval),
		);
		*slot = Some(strategy.clone());
		Ok(strategy)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::aggregator::MockAggregatorApi;
	use swap_providers::testing::signer_provider_with;

	async fn factory() -> StrategyFactory {
		let signers = signer_provider_with(vec![], None).await;
		StrategyFactory::new(Arc::new(TokenRegistry::with_defaults()), Arc::new(signers))
			.with_aggregator_api(Arc::new(MockAggregatorApi::new()))
	}

	fn names(strategies: &[Arc<dyn SwapStrategy>]) -> Vec<&str> {
		strategies.iter().map(|s| s.name()).collect()
	}

	#[tokio::test]
	async fn test_default_order() {
		let strategies = factory().await.build(&Settings::default()).unwrap();
		assert_eq!(
			names(&strategies),
			vec!["direct-pool", "fallback-pricing", "aggregator", "guided-manual"]
		);
	}

	#[tokio::test]
	async fn test_disabled_strategies_are_skipped() {
		let mut settings = Settings::default();
		settings.direct_pool.enabled = false;
		settings.aggregator.enabled = false;
		let strategies = factory().await.build(&settings).unwrap();
		assert_eq!(names(&strategies), vec!["guided-manual"]);
	}

	#[tokio::test]
	async fn test_custom_order_is_kept() {
		let mut settings = Settings::default();
		settings.router.strategy_order =
			vec!["guided-manual".to_string(), "aggregator".to_string()];
		let strategies = factory().await.build(&settings).unwrap();
		assert_eq!(names(&strategies), vec!["guided-manual", "aggregator"]);
	}

	#[tokio::test]
	async fn test_unknown_strategy_rejected() {
		let mut settings = Settings::default();
		settings.router.strategy_order = vec!["teleporter".to_string()];
		let err = factory().await.build(&settings).unwrap_err();
		assert!(matches!(err, StrategyFactoryError::UnknownStrategy(name) if name == "teleporter"));
	}

	#[tokio::test]
	async fn test_http_api_built_without_override() {
		let signers = signer_provider_with(vec![], None).await;
		let factory =
			StrategyFactory::new(Arc::new(TokenRegistry::with_defaults()), Arc::new(signers));
		let strategies = factory.build(&Settings::default()).unwrap();
		assert_eq!(strategies.len(), 4);
	}
}
