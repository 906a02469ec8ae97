//! Strategy outcomes and the public swap result

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use super::estimate::SwapEstimate;
use crate::errors::{ErrorKind, SwapError};

/// Which transaction an execution step submitted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
	Approval,
	Swap,
}

/// One mined transaction of an execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
	pub kind: StepKind,
	pub tx_hash: B256,
	pub block_number: Option<u64>,
}

/// Record of a swap a strategy executed on-chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SwapReceipt {
	pub strategy: String,
	pub tx_hash: B256,
	pub approval_tx_hash: Option<B256>,
	pub steps: Vec<ExecutionStep>,
}

/// Step-by-step manual swap instructions for venues without programmatic integration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GuidedInstructions {
	pub venue_name: String,
	pub venue_url: String,
	/// Network the user must connect their wallet to
	pub network_name: String,
	pub chain_id: u64,
	pub recommended_slippage_bps: u32,
	pub steps: Vec<String>,
}

impl GuidedInstructions {
	/// Steps prefixed with their 1-based position
	pub fn numbered_steps(&self) -> Vec<String> {
		self.steps
			.iter()
			.enumerate()
			.map(|(i, step)| format!("{}. {}", i + 1, step))
			.collect()
	}

	/// Slippage as a percentage string, e.g. "1.00"
	pub fn recommended_slippage_pct(&self) -> String {
		format!(
			"{}.{:02}",
			self.recommended_slippage_bps / 100,
			self.recommended_slippage_bps % 100
		)
	}
}

/// What `get_estimate` produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EstimateOutcome {
	Estimate(SwapEstimate),
	Guided(GuidedInstructions),
}

impl EstimateOutcome {
	pub fn estimate(&self) -> Option<&SwapEstimate> {
		match self {
			EstimateOutcome::Estimate(estimate) => Some(estimate),
			EstimateOutcome::Guided(_) => None,
		}
	}
}

/// What `execute` produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionOutcome {
	Executed(SwapReceipt),
	Guided(GuidedInstructions),
}

/// Public result of routing and executing a swap. Exactly one variant is populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SwapResult {
	Success {
		strategy: String,
		tx_hash: B256,
		approval_tx_hash: Option<B256>,
		steps: Vec<ExecutionStep>,
	},
	Failure {
		kind: ErrorKind,
		message: String,
		hint: String,
		retryable: bool,
		/// Set when a transaction was sent before the failure
		#[serde(default, skip_serializing_if = "Option::is_none")]
		tx_hash: Option<B256>,
	},
	/// Manual instructions; not an error and never retried automatically
	Guided { instructions: GuidedInstructions },
}

impl SwapResult {
	pub fn from_error(err: &SwapError) -> Self {
		SwapResult::Failure {
			kind: err.kind(),
			message: err.to_string(),
			hint: err.user_hint(),
			retryable: err.is_retryable(),
			tx_hash: err.submitted_tx_hash(),
		}
	}

	pub fn is_success(&self) -> bool {
		matches!(self, SwapResult::Success { .. })
	}

	pub fn is_guided(&self) -> bool {
		matches!(self, SwapResult::Guided { .. })
	}

	pub fn error_kind(&self) -> Option<ErrorKind> {
		match self {
			SwapResult::Failure { kind, .. } => Some(*kind),
			_ => None,
		}
	}
}

impl From<ExecutionOutcome> for SwapResult {
	fn from(outcome: ExecutionOutcome) -> Self {
		match outcome {
			ExecutionOutcome::Executed(receipt) => SwapResult::Success {
				strategy: receipt.strategy,
				tx_hash: receipt.tx_hash,
				approval_tx_hash: receipt.approval_tx_hash,
				steps: receipt.steps,
			},
			ExecutionOutcome::Guided(instructions) => SwapResult::Guided { instructions },
		}
	}
}

impl From<Result<ExecutionOutcome, SwapError>> for SwapResult {
	fn from(result: Result<ExecutionOutcome, SwapError>) -> Self {
		match result {
			Ok(outcome) => outcome.into(),
			Err(err) => SwapResult::from_error(&err),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn instructions() -> GuidedInstructions {
		GuidedInstructions {
			venue_name: "Uniswap".into(),
			venue_url: "https://app.uniswap.org".into(),
			network_name: "Sepolia".into(),
			chain_id: 11155111,
			recommended_slippage_bps: 100,
			steps: vec!["Open the venue".into(), "Connect your wallet".into()],
		}
	}

	#[test]
	fn test_guided_outcome_is_its_own_variant() {
		let result: SwapResult = ExecutionOutcome::Guided(instructions()).into();
		assert!(result.is_guided());
		assert!(!result.is_success());
		assert_eq!(result.error_kind(), None);
	}

	#[test]
	fn test_failure_carries_hint_and_retryability() {
		let err = SwapError::CircuitOpen {
			strategy: "aggregator".into(),
			retry_after_ms: 1_000,
		};
		let result: SwapResult = Err::<ExecutionOutcome, _>(err).into();
		match result {
			SwapResult::Failure {
				kind,
				retryable,
				hint,
				..
			} => {
				assert_eq!(kind, ErrorKind::CircuitOpen);
				assert!(retryable);
				assert_eq!(hint, "Try again shortly.");
			},
			other => panic!("expected failure, got {:?}", other),
		}
	}

	#[test]
	fn test_unconfirmed_swap_failure_keeps_hash() {
		let tx_hash = B256::repeat_byte(0x42);
		let err = SwapError::ConfirmationUnknown {
			step: StepKind::Swap,
			tx_hash,
			reason: "RPC error -32005: limit exceeded".into(),
		};
		match SwapResult::from_error(&err) {
			SwapResult::Failure {
				kind,
				retryable,
				tx_hash: reported,
				..
			} => {
				assert_eq!(kind, ErrorKind::ConfirmationUnknown);
				assert!(!retryable);
				assert_eq!(reported, Some(tx_hash));
			},
			other => panic!("expected failure, got {:?}", other),
		}

		let json = serde_json::to_value(SwapResult::from_error(&SwapError::NoRouteFound {
			venue: "Curve".into(),
			reason: "no pool".into(),
		}))
		.unwrap();
		assert!(json.get("tx_hash").is_none());
	}

	#[test]
	fn test_numbered_steps_and_slippage_pct() {
		let guide = instructions();
		assert_eq!(
			guide.numbered_steps(),
			vec!["1. Open the venue", "2. Connect your wallet"]
		);
		assert_eq!(guide.recommended_slippage_pct(), "1.00");
	}

	#[test]
	fn test_result_serializes_with_status_tag() {
		let result: SwapResult = ExecutionOutcome::Guided(instructions()).into();
		let json = serde_json::to_value(&result).unwrap();
		assert_eq!(json["status"], "guided");
		assert_eq!(json["instructions"]["chainId"], 11155111);
	}
}
