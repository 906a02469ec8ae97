//! Swap Router Library
//!
//! Multi-chain token swap routing: picks a venue strategy for each request by chain and
//! token pair, and runs quotes and executions through per-strategy circuit breakers.
//!
//! [`SwapRouterBuilder`] wires configuration into read providers, the wallet-backed signer
//! provider, the strategy set and the router.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

// Core domain types
pub use swap_types::{
	chain_name, chain_type, ChainType, ErrorKind, EstimateOutcome, ExecutionOutcome,
	GuidedInstructions, ReadProvider, SignerProvider, SwapCallbacks, SwapError, SwapEstimate,
	SwapReceipt, SwapRequest, SwapResult, SwapStrategy, TokenInfo, TokenRegistry, WalletBackend,
};

// Config
pub use swap_config::{
	load_config, log_service_info, log_service_shutdown, log_startup_complete, ConfigLoadError,
	LogFormat, LoggingSettings, Settings,
};

// Providers, strategies and the router
pub use swap_providers::{ReadProviderCache, RpcEndpoint, WalletSignerProvider};
pub use swap_service::{CircuitBreakerManager, SwapRouter};
pub use swap_strategies::{AggregatorApi, ClientCache, StrategyFactory, StrategyFactoryError};

pub mod models {
	pub use swap_types::*;
}

pub mod config {
	pub use swap_config::*;
}

pub mod providers {
	pub use swap_providers::*;
}

pub mod strategies {
	pub use swap_strategies::*;
}

pub mod service {
	pub use swap_service::*;
}

#[derive(Error, Debug)]
pub enum SwapRouterBuildError {
	#[error(transparent)]
	Config(#[from] ConfigLoadError),

	#[error(transparent)]
	Factory(#[from] StrategyFactoryError),
}

/// A built router together with the signer provider its strategies share.
///
/// Connect or switch the user's wallet through `signers`; the router picks the change up on
/// the next call.
#[derive(Debug)]
pub struct SwapRouterApp {
	pub router: SwapRouter,
	pub signers: Arc<WalletSignerProvider>,
	pub settings: Settings,
}

/// Builder for configuring the swap router
#[derive(Debug, Default)]
pub struct SwapRouterBuilder {
	settings: Option<Settings>,
	wallet: Option<Arc<dyn WalletBackend>>,
	read_providers: Vec<Arc<dyn ReadProvider>>,
	aggregator_api: Option<Arc<dyn AggregatorApi>>,
	poll_interval: Option<Duration>,
}

impl SwapRouterBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder with settings loaded from the config file and environment
	pub fn from_config() -> Result<Self, SwapRouterBuildError> {
		Ok(Self::new().with_settings(load_config()?))
	}

	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Wallet to connect once the router is built
	pub fn with_wallet(mut self, wallet: Arc<dyn WalletBackend>) -> Self {
		self.wallet = Some(wallet);
		self
	}

	/// Read provider used instead of the configured RPC endpoint for its chain
	pub fn with_read_provider(mut self, provider: Arc<dyn ReadProvider>) -> Self {
		self.read_providers.push(provider);
		self
	}

	/// Aggregator API used instead of the configured HTTP endpoint
	pub fn with_aggregator_api(mut self, api: Arc<dyn AggregatorApi>) -> Self {
		self.aggregator_api = Some(api);
		self
	}

	/// Receipt polling interval for on-chain strategies
	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = Some(poll_interval);
		self
	}

	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	pub async fn build(self) -> Result<SwapRouterApp, SwapRouterBuildError> {
		let settings = self.settings.unwrap_or_default();
		settings.validate().map_err(ConfigLoadError::Validation)?;

		let read_providers = Arc::new(ReadProviderCache::new(settings.networks.iter().map(
			|network| {
				RpcEndpoint::new(
					network.chain_id,
					network.rpc_url.clone(),
					Duration::from_millis(network.timeout_ms),
				)
			},
		)));
		for provider in self.read_providers {
			read_providers.insert(provider);
		}

		let signers = Arc::new(WalletSignerProvider::new(read_providers));
		if let Some(wallet) = self.wallet {
			signers.connect(wallet).await;
		}

		let clients = ClientCache::with_ttl(Duration::from_secs(
			settings.aggregator.client_ttl_seconds,
		));
		let mut factory = StrategyFactory::new(
			Arc::new(settings.token_registry()),
			signers.clone() as Arc<dyn SignerProvider>,
		)
		.with_client_cache(clients);
		if let Some(api) = self.aggregator_api {
			factory = factory.with_aggregator_api(api);
		}
		if let Some(poll_interval) = self.poll_interval {
			factory = factory.with_poll_interval(poll_interval);
		}
		let strategies = factory.build(&settings)?;

		let breakers = Arc::new(CircuitBreakerManager::new(settings.circuit_breaker.clone()));
		let router = SwapRouter::new(strategies, breakers)
			.with_fall_through(settings.router.fall_through_on_unavailable);
		info!("swap router built with {} strategies", router.strategy_names().len());

		Ok(SwapRouterApp {
			router,
			signers,
			settings,
		})
	}
}

/// Install the global tracing subscriber from logging settings.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(
	logging: &LoggingSettings,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

	match logging.format {
		LogFormat::Json => {
			let subscriber = tracing_subscriber::fmt()
				.json()
				.with_env_filter(env_filter)
				.with_writer(std::io::stderr);

			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()?;
			} else {
				subscriber.try_init()?;
			}
		},
		LogFormat::Pretty => {
			let subscriber = tracing_subscriber::fmt()
				.pretty()
				.with_env_filter(env_filter)
				.with_writer(std::io::stderr);

			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()?;
			} else {
				subscriber.try_init()?;
			}
		},
		LogFormat::Compact => {
			let subscriber = tracing_subscriber::fmt()
				.compact()
				.with_env_filter(env_filter)
				.with_writer(std::io::stderr);

			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()?;
			} else {
				subscriber.try_init()?;
			}
		},
	}

	info!(
		"logging configured: level={}, format={:?}, structured={}",
		logging.level, logging.format, logging.structured
	);
	Ok(())
}
