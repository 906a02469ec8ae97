//! Near-parity pricing in front of the aggregator
//!
//! Claims same-chain swaps between two fiat-pegged stables on aggregator chains. Estimates
//! come from the aggregator whenever it answers; only when the venue cannot be reached is
//! the analytical "input minus published fee" figure returned. An answer with no route
//! (zero output, 404, other 4xx) is passed through unchanged. Execution always goes
//! through the aggregator.

use async_trait::async_trait;
use std::sync::Arc;
use swap_types::{
	is_near_parity, EstimateOutcome, ExecutionOutcome, StrategyResult, SwapCallbacks,
	SwapRequest, SwapStrategy,
};
use tracing::warn;

use crate::aggregator::AggregatorStrategy;
use crate::common::{unsupported_pair, ResolvedPair};
use crate::pricing::analytical_estimate;

#[derive(Debug)]
pub struct FallbackPricingStrategy {
	name: String,
	inner: Arc<AggregatorStrategy>,
	fee_bps: u32,
}

impl FallbackPricingStrategy {
	pub fn new(name: impl Into<String>, inner: Arc<AggregatorStrategy>, fee_bps: u32) -> Self {
		Self {
			name: name.into(),
			inner,
			fee_bps,
		}
	}

	fn resolve(&self, request: &SwapRequest) -> StrategyResult<ResolvedPair> {
		let pair = self.inner.resolve(request)?;
		if !is_near_parity(&pair.from, &pair.to) {
			return Err(unsupported_pair(request, "not a stable pair"));
		}
		Ok(pair)
	}
}

#[async_trait]
impl SwapStrategy for FallbackPricingStrategy {
	fn name(&self) -> &str {
		&self.name
	}

	fn supports(&self, request: &SwapRequest) -> bool {
		if !self.inner.supports(request) {
			return false;
		}
		let tokens = self.inner.tokens();
		match (
			tokens.get(request.from_chain_id, &request.from_token),
			tokens.get(request.to_chain_id, &request.to_token),
		) {
			(Some(from), Some(to)) => is_near_parity(from, to),
			_ => false,
		}
	}

	fn validate(&self, request: &SwapRequest) -> StrategyResult<()> {
		self.resolve(request).map(|_| ())
	}

	async fn get_estimate(&self, request: &SwapRequest) -> StrategyResult<EstimateOutcome> {
		let pair = self.resolve(request)?;
		let slippage_bps = self.inner.slippage_for(request);
		let mut estimate = match self.inner.live_estimate(&pair, slippage_bps).await {
			Ok(estimate) => estimate,
			Err(e) if e.is_quote_outage() => {
				warn!(
					"live quote for {} -> {} failed, pricing at {} bps fee: {}",
					pair.from.symbol, pair.to.symbol, self.fee_bps, e
				);
				analytical_estimate(&pair, self.fee_bps, slippage_bps, 0, &self.name)
			},
			Err(e) => return Err(e),
		};
		estimate.strategy = self.name.clone();
		Ok(EstimateOutcome::Estimate(estimate))
	}

	async fn execute(
		&self,
		request: &SwapRequest,
		callbacks: &dyn SwapCallbacks,
	) -> StrategyResult<ExecutionOutcome> {
		self.resolve(request)?;
		match self.inner.execute(request, callbacks).await? {
			ExecutionOutcome::Executed(mut receipt) => {
				receipt.strategy = self.name.clone();
				Ok(ExecutionOutcome::Executed(receipt))
			},
			guided => Ok(guided),
		}
	}
}
