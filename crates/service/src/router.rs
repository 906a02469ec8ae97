//! Swap router
//!
//! Picks the first registered strategy whose `supports` accepts the request and runs its
//! estimate or execution through that strategy's circuit breaker. When the selected venue
//! is unreachable (discovery failure, unavailable, circuit open) the next supporting
//! strategy is tried, unless fall-through is disabled.

use std::sync::Arc;
use swap_types::{
	CircuitBreakerSnapshot, EstimateOutcome, ExecutionOutcome, SwapCallbacks, SwapError,
	SwapRequest, SwapResult, SwapStrategy,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::circuit_breaker::CircuitBreakerManager;

#[derive(Debug)]
pub struct SwapRouter {
	strategies: Vec<Arc<dyn SwapStrategy>>,
	breakers: Arc<CircuitBreakerManager>,
	fall_through: bool,
}

impl SwapRouter {
	/// Strategies are probed in the given order
	pub fn new(
		strategies: Vec<Arc<dyn SwapStrategy>>,
		breakers: Arc<CircuitBreakerManager>,
	) -> Self {
		Self {
			strategies,
			breakers,
			fall_through: true,
		}
	}

	pub fn with_fall_through(mut self, fall_through: bool) -> Self {
		self.fall_through = fall_through;
		self
	}

	/// The strategy that would handle `request`
	pub fn route(&self, request: &SwapRequest) -> Result<Arc<dyn SwapStrategy>, SwapError> {
		self.candidates(request)
			.into_iter()
			.next()
			.ok_or_else(|| no_strategy(request))
	}

	/// Quote the request with the selected strategy
	pub async fn get_estimate(&self, request: &SwapRequest) -> Result<EstimateOutcome, SwapError> {
		let route_id = Uuid::new_v4();
		let candidates = self.candidates(request);
		if candidates.is_empty() {
			info!("route {}: no strategy supports {}", route_id, describe(request));
			return Err(no_strategy(request));
		}

		let mut last_error = None;
		for strategy in candidates {
			debug!("route {}: estimating with {}", route_id, strategy.name());
			if let Err(e) = strategy.validate(request) {
				if last_error.is_none() {
					return Err(e);
				}
				debug!("route {}: skipping {}: {}", route_id, strategy.name(), e);
				continue;
			}

			let breaker = self.breakers.breaker(strategy.name());
			match breaker.call(|| strategy.get_estimate(request)).await {
				Ok(outcome) => {
					info!("route {}: estimate from {}", route_id, strategy.name());
					return Ok(outcome);
				},
				Err(e) => {
					let err: SwapError = e.into();
					if !self.should_fall_through(&err) {
						return Err(err);
					}
					warn!(
						"route {}: {} unavailable, trying next strategy: {}",
						route_id,
						strategy.name(),
						err
					);
					last_error = Some(err);
				},
			}
		}

		Err(last_error.unwrap_or_else(|| no_strategy(request)))
	}

	/// Execute the request with the selected strategy.
	///
	/// Never fails: errors come back as [`SwapResult::Failure`], manual flows as
	/// [`SwapResult::Guided`].
	pub async fn execute(
		&self,
		request: &SwapRequest,
		callbacks: &dyn SwapCallbacks,
	) -> SwapResult {
		let route_id = Uuid::new_v4();
		let result = self.execute_inner(route_id, request, callbacks).await;
		match &result {
			Ok(ExecutionOutcome::Executed(receipt)) => info!(
				"route {}: {} swapped {} via tx {}",
				route_id,
				receipt.strategy,
				describe(request),
				receipt.tx_hash
			),
			Ok(ExecutionOutcome::Guided(instructions)) => info!(
				"route {}: manual instructions for {} on {}",
				route_id, instructions.venue_name, instructions.network_name
			),
			Err(e) => warn!("route {}: swap {} failed: {}", route_id, describe(request), e),
		}
		result.into()
	}

	async fn execute_inner(
		&self,
		route_id: Uuid,
		request: &SwapRequest,
		callbacks: &dyn SwapCallbacks,
	) -> Result<ExecutionOutcome, SwapError> {
		let candidates = self.candidates(request);
		if candidates.is_empty() {
			return Err(no_strategy(request));
		}

		let mut last_error = None;
		for strategy in candidates {
			debug!("route {}: executing with {}", route_id, strategy.name());
			if let Err(e) = strategy.validate(request) {
				if last_error.is_none() {
					return Err(e);
				}
				debug!("route {}: skipping {}: {}", route_id, strategy.name(), e);
				continue;
			}

			let breaker = self.breakers.breaker(strategy.name());
			match breaker.call(|| strategy.execute(request, callbacks)).await {
				Ok(outcome) => return Ok(outcome),
				Err(e) => {
					let err: SwapError = e.into();
					if !self.should_fall_through(&err) {
						return Err(err);
					}
					warn!(
						"route {}: {} unavailable, trying next strategy: {}",
						route_id,
						strategy.name(),
						err
					);
					last_error = Some(err);
				},
			}
		}

		Err(last_error.unwrap_or_else(|| no_strategy(request)))
	}

	/// Registered strategy names in priority order
	pub fn strategy_names(&self) -> Vec<String> {
		self.strategies.iter().map(|s| s.name().to_string()).collect()
	}

	pub fn breaker_snapshots(&self) -> Vec<CircuitBreakerSnapshot> {
		self.breakers.snapshots()
	}

	pub fn breakers(&self) -> &CircuitBreakerManager {
		&self.breakers
	}

	fn candidates(&self, request: &SwapRequest) -> Vec<Arc<dyn SwapStrategy>> {
		let mut supporting = self.strategies.iter().filter(|s| s.supports(request));
		if !self.fall_through {
			return supporting.next().cloned().into_iter().collect();
		}
		supporting.cloned().collect()
	}

	fn should_fall_through(&self, err: &SwapError) -> bool {
		self.fall_through && err.allows_fall_through()
	}
}

fn no_strategy(request: &SwapRequest) -> SwapError {
	SwapError::NoStrategyAvailable {
		from_token: request.from_token.clone(),
		to_token: request.to_token.clone(),
		from_chain_id: request.from_chain_id,
		to_chain_id: request.to_chain_id,
	}
}

fn describe(request: &SwapRequest) -> String {
	format!(
		"{} {} -> {} ({} -> {})",
		request.amount,
		request.from_token,
		request.to_token,
		request.from_chain_id,
		request.to_chain_id
	)
}
