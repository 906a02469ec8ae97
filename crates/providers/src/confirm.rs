//! Waiting for transactions to be mined

use alloy_primitives::B256;
use std::time::Duration;
use swap_types::{ProviderError, ProviderResult, ReadProvider, TxReceipt};
use tracing::debug;

/// Default interval between receipt polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Poll until the transaction is mined.
///
/// There is no deadline: the caller abandons the wait by dropping the future, which says
/// nothing about whether the transaction will still be mined. Transport errors while
/// polling are retried; a reverted receipt is returned as `ProviderError::Reverted`.
pub async fn wait_for_receipt(
	provider: &dyn ReadProvider,
	tx_hash: B256,
	poll_interval: Duration,
) -> ProviderResult<TxReceipt> {
	loop {
		match provider.transaction_receipt(tx_hash).await {
			Ok(Some(receipt)) if receipt.status => {
				debug!(
					"transaction {} mined in block {:?} on chain {}",
					tx_hash,
					receipt.block_number,
					provider.chain_id()
				);
				return Ok(receipt);
			},
			Ok(Some(_)) => return Err(ProviderError::Reverted { tx_hash }),
			Ok(None) => {},
			Err(ProviderError::Transport(e)) => {
				debug!("receipt poll for {} failed, retrying: {}", tx_hash, e);
			},
			Err(e) => return Err(e),
		}
		tokio::time::sleep(poll_interval).await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::MockReadProvider;

	#[tokio::test(start_paused = true)]
	async fn test_waits_through_pending_polls() {
		let provider = MockReadProvider::new(1).with_pending_polls(3);
		let hash = B256::repeat_byte(0x42);

		let receipt = wait_for_receipt(&provider, hash, Duration::from_secs(1))
			.await
			.unwrap();
		assert_eq!(receipt.transaction_hash, hash);
		assert_eq!(provider.receipt_polls(), 4);
	}

	#[tokio::test]
	async fn test_reverted_receipt_is_error() {
		let provider = MockReadProvider::new(1).with_reverting_receipts();
		let hash = B256::repeat_byte(0x07);

		let err = wait_for_receipt(&provider, hash, Duration::from_millis(1))
			.await
			.unwrap_err();
		assert_eq!(err, ProviderError::Reverted { tx_hash: hash });
	}
}
