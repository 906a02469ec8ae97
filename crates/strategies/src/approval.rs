//! ERC-20 approval sub-protocol
//!
//! Reads the allowance through the read provider and only prompts the wallet when it is
//! short. The approval is mined before this returns, so the swap that follows can rely on it.

use alloy_primitives::{Address, U256};
use std::time::Duration;
use swap_providers::erc20::{allowance, approve_calldata};
use swap_providers::wait_for_receipt;
use swap_types::{
	ExecutionStep, ProviderError, ReadProvider, StepKind, StrategyResult, SwapCallbacks,
	SwapError, TransactionSigner, TxRequest,
};
use tracing::{debug, info};

use crate::execution::{prepare_transaction, wait_failed};

/// Gas assumed for `approve` when estimation fails
pub const APPROVAL_GAS_FALLBACK: u64 = 60_000;

fn approval_failed(err: ProviderError) -> SwapError {
	SwapError::ApprovalFailed {
		user_rejected: err == ProviderError::UserRejected,
		reason: err.to_string(),
	}
}

/// What to approve and for whom
#[derive(Debug, Clone, Copy)]
pub struct ApprovalRequest {
	pub token: Address,
	pub owner: Address,
	pub spender: Address,
	pub amount: U256,
}

/// Make sure `spender` may move `amount` of `token`.
///
/// Returns the mined approval step, or `None` when the existing allowance already covers the
/// amount. Approves exactly `amount`, never an unlimited allowance.
pub async fn ensure_allowance(
	provider: &dyn ReadProvider,
	signer: &dyn TransactionSigner,
	approval: ApprovalRequest,
	callbacks: &dyn SwapCallbacks,
	poll_interval: Duration,
) -> StrategyResult<Option<ExecutionStep>> {
	let current = allowance(provider, approval.token, approval.owner, approval.spender).await?;
	if current >= approval.amount {
		debug!(
			"allowance {} of {} for {} covers {}",
			current, approval.token, approval.spender, approval.amount
		);
		return Ok(None);
	}

	let tx = TxRequest::new(
		provider.chain_id(),
		approval.owner,
		approval.token,
		approve_calldata(approval.spender, approval.amount),
	);
	let tx = prepare_transaction(provider, tx, APPROVAL_GAS_FALLBACK)
		.await
		.map_err(approval_failed)?;
	let tx_hash = signer.send_transaction(tx).await.map_err(approval_failed)?;
	info!(
		"approval of {} for {} submitted: {}",
		approval.token, approval.spender, tx_hash
	);
	callbacks.on_approval_submitted(tx_hash);

	let receipt = wait_for_receipt(provider, tx_hash, poll_interval)
		.await
		.map_err(|e| wait_failed(StepKind::Approval, tx_hash, e))?;
	callbacks.on_approval_confirmed();

	Ok(Some(ExecutionStep {
		kind: StepKind::Approval,
		tx_hash,
		block_number: receipt.block_number,
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_sol_types::{SolCall, SolValue};
	use swap_providers::abi::IERC20;
	use swap_providers::testing::{MockReadProvider, MockSigner};
	use swap_types::test_utils::{CallbackEvent, RecordingCallbacks, TEST_USER};

	const TOKEN: Address = Address::repeat_byte(0xaa);
	const SPENDER: Address = Address::repeat_byte(0xbb);

	fn provider_with_allowance(value: u64) -> MockReadProvider {
		let provider = MockReadProvider::new(1);
		provider.on_call_return(
			TOKEN,
			IERC20::allowanceCall::SELECTOR,
			U256::from(value).abi_encode(),
		);
		provider
	}

	fn request(amount: u64) -> ApprovalRequest {
		ApprovalRequest {
			token: TOKEN,
			owner: TEST_USER,
			spender: SPENDER,
			amount: U256::from(amount),
		}
	}

	#[tokio::test]
	async fn test_sufficient_allowance_skips_approval() {
		let provider = provider_with_allowance(1_000);
		let signer = MockSigner::new(TEST_USER, 1);
		let callbacks = RecordingCallbacks::new();

		let step = ensure_allowance(&provider, &signer, request(1_000), &callbacks, Duration::ZERO)
			.await
			.unwrap();
		assert!(step.is_none());
		assert_eq!(signer.send_count(), 0);
		assert!(callbacks.events().is_empty());
	}

	#[tokio::test]
	async fn test_short_allowance_approves_exact_amount() {
		let provider = provider_with_allowance(10);
		let signer = MockSigner::new(TEST_USER, 1);
		let callbacks = RecordingCallbacks::new();

		let step = ensure_allowance(&provider, &signer, request(500), &callbacks, Duration::ZERO)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(step.kind, StepKind::Approval);

		let sent = signer.sent_transactions();
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].to, TOKEN);
		assert!(sent[0].gas_limit.is_some());
		let decoded = IERC20::approveCall::abi_decode(&sent[0].data).unwrap();
		assert_eq!(decoded.spender, SPENDER);
		assert_eq!(decoded.value, U256::from(500u64));

		assert_eq!(
			callbacks.events(),
			vec![
				CallbackEvent::ApprovalSubmitted(step.tx_hash),
				CallbackEvent::ApprovalConfirmed
			]
		);
	}

	#[tokio::test]
	async fn test_rejected_approval_is_user_side() {
		let provider = provider_with_allowance(0);
		let signer = MockSigner::new(TEST_USER, 1);
		signer.reject_all();
		let callbacks = RecordingCallbacks::new();

		let err = ensure_allowance(&provider, &signer, request(500), &callbacks, Duration::ZERO)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			SwapError::ApprovalFailed {
				user_rejected: true,
				..
			}
		));
		assert!(!err.counts_against_venue());
		assert_eq!(callbacks.approval_submitted_count(), 0);
	}

	#[tokio::test]
	async fn test_reverted_approval_is_not_confirmed() {
		let provider = provider_with_allowance(0).with_reverting_receipts();
		let signer = MockSigner::new(TEST_USER, 1);
		let callbacks = RecordingCallbacks::new();

		let err = ensure_allowance(&provider, &signer, request(500), &callbacks, Duration::ZERO)
			.await
			.unwrap_err();
		assert!(matches!(err, SwapError::ApprovalFailed { .. }));
		assert!(matches!(
			callbacks.events().as_slice(),
			[CallbackEvent::ApprovalSubmitted(_)]
		));
	}

	#[tokio::test]
	async fn test_lost_approval_receipt_keeps_hash() {
		let provider = provider_with_allowance(0).with_receipt_error(ProviderError::Rpc {
			code: -32005,
			message: "limit exceeded".to_string(),
		});
		let signer = MockSigner::new(TEST_USER, 1);
		let callbacks = RecordingCallbacks::new();

		let err = ensure_allowance(&provider, &signer, request(500), &callbacks, Duration::ZERO)
			.await
			.unwrap_err();
		let sent = match callbacks.events().as_slice() {
			[CallbackEvent::ApprovalSubmitted(hash)] => *hash,
			other => panic!("expected one approval submission, got {:?}", other),
		};
		assert!(matches!(
			err,
			SwapError::ConfirmationUnknown {
				step: StepKind::Approval,
				tx_hash,
				..
			} if tx_hash == sent
		));
		assert!(!err.is_retryable());
		assert!(!err.counts_against_venue());
	}
}
