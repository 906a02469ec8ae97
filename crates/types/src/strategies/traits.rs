//! Core strategy traits

use alloy_primitives::B256;
use async_trait::async_trait;
use std::fmt::Debug;

use super::StrategyResult;
use crate::models::{EstimateOutcome, ExecutionOutcome, SwapRequest};

/// Progress notifications for UI collaborators.
///
/// Fire-and-forget: implementations must return immediately and never fail.
pub trait SwapCallbacks: Send + Sync {
	/// Approval transaction accepted by the wallet, not yet mined
	fn on_approval_submitted(&self, _tx_hash: B256) {}

	/// Approval transaction mined
	fn on_approval_confirmed(&self) {}

	/// Swap transaction accepted by the wallet
	fn on_swap_submitted(&self, _tx_hash: B256) {}
}

/// Callbacks that ignore every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallbacks;

impl SwapCallbacks for NoopCallbacks {}

/// One implementation of the swap lifecycle for a venue or venue class.
///
/// Operations are called in order `supports` -> `validate` -> `get_estimate` ->
/// `execute`. Implementations hold no per-request state.
#[async_trait]
pub trait SwapStrategy: Send + Sync + Debug {
	/// Stable name, also the circuit breaker key
	fn name(&self) -> &str;

	/// Whether this strategy is eligible for the request.
	/// Pure and deterministic; must not perform I/O.
	fn supports(&self, request: &SwapRequest) -> bool;

	/// Check the request against token metadata and the strategy's pair rules
	fn validate(&self, request: &SwapRequest) -> StrategyResult<()>;

	/// Quote the swap without touching the wallet
	async fn get_estimate(&self, request: &SwapRequest) -> StrategyResult<EstimateOutcome>;

	/// Run the swap. Always re-validates before doing anything else.
	async fn execute(
		&self,
		request: &SwapRequest,
		callbacks: &dyn SwapCallbacks,
	) -> StrategyResult<ExecutionOutcome>;
}
