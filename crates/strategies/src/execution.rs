//! Submitting state-changing transactions
//!
//! Every write carries an explicit gas limit and fee fields. The wallet is never left to
//! fill them in.

use alloy_primitives::B256;
use std::time::Duration;
use swap_providers::{resolve_fees, wait_for_receipt, with_gas_buffer};
use swap_types::{
	ExecutionStep, ProviderError, ProviderResult, ReadProvider, StepKind, StrategyResult,
	SwapCallbacks, SwapError, SwapReceipt, TransactionSigner, TxRequest,
};
use tracing::{debug, info, warn};

/// Fill in gas limit and fees where the transaction does not carry them yet.
///
/// Gas comes from `eth_estimateGas` plus headroom, or `fallback_gas_limit` when the
/// estimate fails.
pub async fn prepare_transaction(
	provider: &dyn ReadProvider,
	mut tx: TxRequest,
	fallback_gas_limit: u64,
) -> ProviderResult<TxRequest> {
	if tx.gas_limit.is_none() {
		let gas_limit = match provider.estimate_gas(&tx).await {
			Ok(estimate) => with_gas_buffer(estimate),
			Err(e) => {
				debug!(
					"gas estimate for call to {} failed, using {}: {}",
					tx.to, fallback_gas_limit, e
				);
				fallback_gas_limit
			},
		};
		tx.gas_limit = Some(gas_limit);
	}
	if tx.fees.is_none() {
		tx.fees = Some(resolve_fees(provider).await?);
	}
	Ok(tx)
}

fn execution_failed(err: ProviderError) -> SwapError {
	SwapError::SwapExecutionFailed {
		user_rejected: err == ProviderError::UserRejected,
		reason: err.to_string(),
	}
}

/// Map a failed wait on a transaction that was already sent.
///
/// Only a reverted receipt means the transaction failed. Any other error leaves it in
/// flight, and the hash goes back to the caller so nothing is resent blindly.
pub(crate) fn wait_failed(step: StepKind, tx_hash: B256, err: ProviderError) -> SwapError {
	match err {
		ProviderError::Reverted { .. } => match step {
			StepKind::Approval => SwapError::ApprovalFailed {
				reason: err.to_string(),
				user_rejected: false,
			},
			StepKind::Swap => SwapError::SwapExecutionFailed {
				reason: err.to_string(),
				user_rejected: false,
			},
		},
		other => {
			warn!("lost track of {:?} transaction {}: {}", step, tx_hash, other);
			SwapError::ConfirmationUnknown {
				step,
				tx_hash,
				reason: other.to_string(),
			}
		},
	}
}

/// Send the swap, notify `on_swap_submitted` and wait until it is mined
pub async fn submit_swap(
	provider: &dyn ReadProvider,
	signer: &dyn TransactionSigner,
	tx: TxRequest,
	fallback_gas_limit: u64,
	callbacks: &dyn SwapCallbacks,
	poll_interval: Duration,
) -> StrategyResult<ExecutionStep> {
	let tx = prepare_transaction(provider, tx, fallback_gas_limit)
		.await
		.map_err(execution_failed)?;
	let tx_hash = signer.send_transaction(tx).await.map_err(execution_failed)?;
	info!("swap submitted on chain {}: {}", signer.chain_id(), tx_hash);
	callbacks.on_swap_submitted(tx_hash);

	let receipt = wait_for_receipt(provider, tx_hash, poll_interval)
		.await
		.map_err(|e| wait_failed(StepKind::Swap, tx_hash, e))?;
	Ok(ExecutionStep {
		kind: StepKind::Swap,
		tx_hash,
		block_number: receipt.block_number,
	})
}

/// Receipt for an execution with an optional approval step before the swap
pub fn receipt(strategy: &str, approval: Option<ExecutionStep>, swap: ExecutionStep) -> SwapReceipt {
	let approval_tx_hash = approval.as_ref().map(|step| step.tx_hash);
	let tx_hash = swap.tx_hash;
	let steps = approval.into_iter().chain(std::iter::once(swap)).collect();
	SwapReceipt {
		strategy: strategy.to_string(),
		tx_hash,
		approval_tx_hash,
		steps,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, Bytes};
	use swap_providers::testing::{MockReadProvider, MockSigner};
	use swap_types::test_utils::{CallbackEvent, RecordingCallbacks};
	use swap_types::GasFees;

	fn swap_tx() -> TxRequest {
		TxRequest::new(1, Address::repeat_byte(0x01), Address::repeat_byte(0x02), Bytes::new())
	}

	#[tokio::test]
	async fn test_prepare_buffers_gas_estimate() {
		let provider = MockReadProvider::new(1);
		let tx = prepare_transaction(&provider, swap_tx(), 90_000).await.unwrap();
		assert_eq!(tx.gas_limit, Some(180_000));
		assert!(matches!(tx.fees, Some(GasFees::Eip1559 { .. })));
	}

	#[tokio::test]
	async fn test_prepare_falls_back_when_estimate_fails() {
		let provider = MockReadProvider::new(42220)
			.without_gas_estimates()
			.with_base_fee(None);
		let tx = prepare_transaction(&provider, swap_tx(), 90_000).await.unwrap();
		assert_eq!(tx.gas_limit, Some(90_000));
		assert_eq!(
			tx.fees,
			Some(GasFees::Legacy {
				gas_price: 1_000_000_000
			})
		);
	}

	#[tokio::test]
	async fn test_prepare_keeps_venue_gas_limit() {
		let provider = MockReadProvider::new(1);
		let tx = prepare_transaction(&provider, swap_tx().with_gas_limit(321_000), 90_000)
			.await
			.unwrap();
		assert_eq!(tx.gas_limit, Some(321_000));
	}

	#[tokio::test]
	async fn test_submit_reports_reverted_swap() {
		let provider = MockReadProvider::new(1).with_reverting_receipts();
		let signer = MockSigner::new(Address::repeat_byte(0x01), 1);
		let callbacks = RecordingCallbacks::new();

		let err = submit_swap(&provider, &signer, swap_tx(), 90_000, &callbacks, Duration::ZERO)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			SwapError::SwapExecutionFailed {
				user_rejected: false,
				..
			}
		));
		assert!(matches!(
			callbacks.events().as_slice(),
			[CallbackEvent::SwapSubmitted(_)]
		));
	}

	#[tokio::test]
	async fn test_rejected_swap_never_notifies() {
		let provider = MockReadProvider::new(1);
		let signer = MockSigner::new(Address::repeat_byte(0x01), 1);
		signer.reject_all();
		let callbacks = RecordingCallbacks::new();

		let err = submit_swap(&provider, &signer, swap_tx(), 90_000, &callbacks, Duration::ZERO)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			SwapError::SwapExecutionFailed {
				user_rejected: true,
				..
			}
		));
		assert!(callbacks.events().is_empty());
	}

	#[tokio::test]
	async fn test_lost_receipt_keeps_swap_hash_and_is_not_retryable() {
		let provider = MockReadProvider::new(1).with_receipt_error(ProviderError::Rpc {
			code: -32005,
			message: "limit exceeded".to_string(),
		});
		let signer = MockSigner::new(Address::repeat_byte(0x01), 1);
		let callbacks = RecordingCallbacks::new();

		let err = submit_swap(&provider, &signer, swap_tx(), 90_000, &callbacks, Duration::ZERO)
			.await
			.unwrap_err();
		let sent = match callbacks.events().as_slice() {
			[CallbackEvent::SwapSubmitted(hash)] => *hash,
			other => panic!("expected one swap submission, got {:?}", other),
		};
		assert_eq!(signer.send_count(), 1);
		assert_eq!(err.submitted_tx_hash(), Some(sent));
		assert!(matches!(
			err,
			SwapError::ConfirmationUnknown {
				step: StepKind::Swap,
				..
			}
		));
		assert!(!err.is_retryable());
		assert!(!err.allows_fall_through());
		assert!(err.user_hint().contains(&sent.to_string()));
	}
}
