//! Direct stable-swap pool strategy for native-AMM chains
//!
//! The venue is found on-chain: candidate address providers are probed with `max_id()`,
//! the registry is resolved by index, and pools are enumerated up to a cap until one holds
//! both tokens. Registries and pool routes are cached per chain for the process lifetime.
//! Discovery failures surface as `VenueDiscovery` so the router can move on.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use swap_config::{DirectPoolChainSettings, DirectPoolSettings};
use swap_providers::abi::{read_call, IAddressProvider, IStableSwapPool, IStableSwapRegistry};
use swap_providers::DEFAULT_POLL_INTERVAL;
use swap_types::{
	is_near_parity, ChainType, EstimateOutcome, EstimateSource, ExecutionOutcome, ProviderError,
	ReadProvider, SignerProvider, StrategyResult, SwapCallbacks, SwapError, SwapEstimate,
	SwapRequest, SwapStrategy, TokenRegistry, TxRequest,
};
use tracing::{debug, info, warn};

use crate::approval::{ensure_allowance, ApprovalRequest};
use crate::common::{
	resolve_request, same_chain_pair_known, signer_for_request, unsupported_pair, ResolvedPair,
};
use crate::execution::{receipt, submit_swap};
use crate::pricing::{analytical_estimate, gas_cost, price_impact_pct};

/// Pool and coin indices for one swap direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolRoute {
	pub pool: Address,
	pub i: i128,
	pub j: i128,
}

#[derive(Debug)]
pub struct DirectPoolStrategy {
	name: String,
	venue_name: String,
	chains: HashMap<u64, DirectPoolChainSettings>,
	tokens: Arc<TokenRegistry>,
	signers: Arc<dyn SignerProvider>,
	max_pools_scanned: u64,
	fee_bps: u32,
	default_slippage_bps: u32,
	analytical_fallback: bool,
	swap_gas_limit: u64,
	poll_interval: Duration,
	registries: DashMap<u64, Address>,
	routes: DashMap<(u64, Address, Address), PoolRoute>,
}

impl DirectPoolStrategy {
	pub fn new(
		name: impl Into<String>,
		settings: &DirectPoolSettings,
		tokens: Arc<TokenRegistry>,
		signers: Arc<dyn SignerProvider>,
	) -> Self {
		Self {
			name: name.into(),
			venue_name: settings.venue_name.clone(),
			chains: settings
				.chains
				.iter()
				.map(|chain| (chain.chain_id, chain.clone()))
				.collect(),
			tokens,
			signers,
			max_pools_scanned: settings.max_pools_scanned,
			fee_bps: settings.fee_bps,
			default_slippage_bps: settings.default_slippage_bps,
			analytical_fallback: settings.analytical_fallback,
			swap_gas_limit: settings.swap_gas_limit,
			poll_interval: DEFAULT_POLL_INTERVAL,
			registries: DashMap::new(),
			routes: DashMap::new(),
		}
	}

	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}

	fn resolve(&self, request: &SwapRequest) -> StrategyResult<ResolvedPair> {
		request.validate_shape()?;
		if !request.is_same_chain() {
			return Err(unsupported_pair(request, "cross-chain swaps are not supported"));
		}
		if !self.chains.contains_key(&request.from_chain_id) {
			return Err(unsupported_pair(
				request,
				format!("no {} deployment on chain {}", self.venue_name, request.from_chain_id),
			));
		}
		resolve_request(&self.tokens, request)
	}

	fn discovery_error(&self, chain_id: u64, reason: impl Into<String>) -> SwapError {
		SwapError::VenueDiscovery {
			venue: self.venue_name.clone(),
			chain_id,
			reason: reason.into(),
		}
	}

	/// Registry address, probing entry-point candidates on first use
	async fn registry(
		&self,
		chain: &DirectPoolChainSettings,
		provider: &dyn ReadProvider,
	) -> StrategyResult<Address> {
		if let Some(registry) = self.registries.get(&chain.chain_id) {
			return Ok(*registry);
		}

		let index = U256::from(chain.registry_index);
		for candidate in &chain.address_provider_candidates {
			let probe = read_call(provider, *candidate, IAddressProvider::max_idCall {}).await;
			let max_id = match probe {
				Ok(max_id) => max_id,
				Err(e) => {
					debug!("entry point {} did not answer: {}", candidate, e);
					continue;
				},
			};
			if index > max_id {
				debug!(
					"entry point {} has no registry at index {} (max {})",
					candidate, index, max_id
				);
				continue;
			}
			let lookup = IAddressProvider::get_addressCall { id: index };
			match read_call(provider, *candidate, lookup).await {
				Ok(registry) if registry != Address::ZERO => {
					info!(
						"{} registry on chain {} is {} (via {})",
						self.venue_name, chain.chain_id, registry, candidate
					);
					return Ok(*self.registries.entry(chain.chain_id).or_insert(registry));
				},
				Ok(_) => debug!("entry point {} has an unset registry slot", candidate),
				Err(e) => debug!("registry lookup on {} failed: {}", candidate, e),
			}
		}

		warn!(
			"{} discovery failed on chain {}: no entry point responded",
			self.venue_name, chain.chain_id
		);
		Err(self.discovery_error(
			chain.chain_id,
			format!(
				"none of {} entry points responded",
				chain.address_provider_candidates.len()
			),
		))
	}

	/// Pool holding both tokens, scanning at most `max_pools_scanned` registry entries
	async fn route(
		&self,
		pair: &ResolvedPair,
		provider: &dyn ReadProvider,
	) -> StrategyResult<PoolRoute> {
		let chain_id = pair.chain_id();
		let key = (chain_id, pair.from.address, pair.to.address);
		if let Some(route) = self.routes.get(&key) {
			return Ok(*route);
		}

		let chain = self
			.chains
			.get(&chain_id)
			.ok_or_else(|| self.discovery_error(chain_id, "chain not configured"))?;
		let registry = self.registry(chain, provider).await?;
		let discovery = |e: ProviderError| self.discovery_error(chain_id, e.to_string());

		let pool_count = read_call(provider, registry, IStableSwapRegistry::pool_countCall {})
			.await
			.map_err(discovery)?;
		let scan = pool_count.saturating_to::<u64>().min(self.max_pools_scanned);

		for index in 0..scan {
			let pool = read_call(
				provider,
				registry,
				IStableSwapRegistry::pool_listCall {
					index: U256::from(index),
				},
			)
			.await
			.map_err(discovery)?;
			let coins = read_call(provider, registry, IStableSwapRegistry::get_coinsCall { pool })
				.await
				.map_err(discovery)?;

			let position = |token: Address| {
				coins
					.iter()
					.position(|coin| *coin == token && token != Address::ZERO)
			};
			if let (Some(i), Some(j)) = (position(pair.from.address), position(pair.to.address)) {
				let route = PoolRoute {
					pool,
					i: i as i128,
					j: j as i128,
				};
				debug!(
					"{} -> {} routed through pool {} ({}, {})",
					pair.from.symbol, pair.to.symbol, pool, i, j
				);
				return Ok(*self.routes.entry(key).or_insert(route));
			}
		}

		Err(SwapError::NoRouteFound {
			venue: self.venue_name.clone(),
			reason: format!(
				"no pool holds {} and {} among {} scanned",
				pair.from.symbol, pair.to.symbol, scan
			),
		})
	}

	async fn live_output(
		&self,
		route: &PoolRoute,
		amount_in: U256,
		provider: &dyn ReadProvider,
	) -> StrategyResult<U256> {
		let out = read_call(
			provider,
			route.pool,
			IStableSwapPool::get_dyCall {
				i: route.i,
				j: route.j,
				dx: amount_in,
			},
		)
		.await
		.map_err(|e| SwapError::QuoteProvider {
			venue: self.venue_name.clone(),
			status_code: None,
			reason: e.to_string(),
		})?;
		if out.is_zero() {
			return Err(SwapError::NoRouteFound {
				venue: self.venue_name.clone(),
				reason: format!("pool {} quoted zero output", route.pool),
			});
		}
		Ok(out)
	}

	/// Route and estimate, falling back to the analytical figure for near-parity pairs
	async fn quote(
		&self,
		pair: &ResolvedPair,
		request: &SwapRequest,
		provider: &dyn ReadProvider,
	) -> StrategyResult<(PoolRoute, SwapEstimate)> {
		let route = self.route(pair, provider).await?;
		let slippage_bps = request.slippage_or(self.default_slippage_bps);
		let gas_cost_estimate = gas_cost(provider, self.swap_gas_limit).await;

		let estimate = match self.live_output(&route, pair.amount_in, provider).await {
			Ok(out) => SwapEstimate::from_expected(
				out,
				pair.to.decimals,
				slippage_bps,
				price_impact_pct(pair, out),
				gas_cost_estimate,
				EstimateSource::Live,
				&self.name,
			),
			Err(e)
				if e.is_quote_outage()
					&& self.analytical_fallback
					&& is_near_parity(&pair.from, &pair.to) =>
			{
				warn!(
					"live quote from pool {} failed, pricing at {} bps fee: {}",
					route.pool, self.fee_bps, e
				);
				analytical_estimate(
					pair,
					self.fee_bps,
					slippage_bps,
					gas_cost_estimate,
					&self.name,
				)
			},
			Err(e) => return Err(e),
		};
		Ok((route, estimate))
	}
}

#[async_trait]
impl SwapStrategy for DirectPoolStrategy {
	fn name(&self) -> &str {
		&self.name
	}

	fn supports(&self, request: &SwapRequest) -> bool {
		self.chains.contains_key(&request.from_chain_id)
			&& same_chain_pair_known(&self.tokens, request, ChainType::NativeAmm)
	}

	fn validate(&self, request: &SwapRequest) -> StrategyResult<()> {
		self.resolve(request).map(|_| ())
	}

	async fn get_estimate(&self, request: &SwapRequest) -> StrategyResult<EstimateOutcome> {
		let pair = self.resolve(request)?;
		let provider = self.signers.get_read_provider(pair.chain_id())?;
		let (_, estimate) = self.quote(&pair, request, provider.as_ref()).await?;
		Ok(EstimateOutcome::Estimate(estimate))
	}

	async fn execute(
		&self,
		request: &SwapRequest,
		callbacks: &dyn SwapCallbacks,
	) -> StrategyResult<ExecutionOutcome> {
		let pair = self.resolve(request)?;
		let signer = signer_for_request(self.signers.as_ref(), request).await?;
		let provider = self.signers.get_read_provider(pair.chain_id())?;
		let (route, estimate) = self.quote(&pair, request, provider.as_ref()).await?;

		let approval = ensure_allowance(
			provider.as_ref(),
			signer.as_ref(),
			ApprovalRequest {
				token: pair.from.address,
				owner: request.user_address,
				spender: route.pool,
				amount: pair.amount_in,
			},
			callbacks,
			self.poll_interval,
		)
		.await?;

		let data = IStableSwapPool::exchangeCall {
			i: route.i,
			j: route.j,
			dx: pair.amount_in,
			min_dy: estimate.minimum_output_raw,
		}
		.abi_encode();
		let tx = TxRequest::new(
			pair.chain_id(),
			request.user_address,
			route.pool,
			Bytes::from(data),
		);
		let step = submit_swap(
			provider.as_ref(),
			signer.as_ref(),
			tx,
			self.swap_gas_limit,
			callbacks,
			self.poll_interval,
		)
		.await?;
		info!(
			"{} swapped {} {} -> {} through pool {}",
			self.name, request.amount, pair.from.symbol, pair.to.symbol, route.pool
		);
		Ok(ExecutionOutcome::Executed(receipt(&self.name, approval, step)))
	}
}
