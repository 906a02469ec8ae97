//! Gas fee policy for state-changing transactions
//!
//! EIP-1559 fields when the chain reports a base fee, a legacy gas price otherwise.

use swap_types::{GasFees, ProviderResult, ReadProvider};
use tracing::debug;

/// Floor for the priority fee: 1.5 gwei
pub const MIN_PRIORITY_FEE_WEI: u128 = 1_500_000_000;

/// Headroom added on top of `eth_estimateGas`, in percent
pub const GAS_LIMIT_BUFFER_PCT: u64 = 20;

/// `priority = max(1.5 gwei, gas_price / 10)`, `max_fee = 2 * base_fee + priority`
pub fn compute_eip1559_fees(base_fee: u128, gas_price: u128) -> GasFees {
	let priority = MIN_PRIORITY_FEE_WEI.max(gas_price / 10);
	let max_fee = base_fee
		.saturating_mul(2)
		.saturating_add(priority)
		.max(base_fee.saturating_add(priority));
	GasFees::Eip1559 {
		max_fee_per_gas: max_fee,
		max_priority_fee_per_gas: priority,
	}
}

/// Pick fee fields for the provider's chain
pub async fn resolve_fees(provider: &dyn ReadProvider) -> ProviderResult<GasFees> {
	let gas_price = provider.gas_price().await?;
	match provider.base_fee_per_gas().await {
		Ok(Some(base_fee)) => Ok(compute_eip1559_fees(base_fee, gas_price)),
		Ok(None) => Ok(GasFees::Legacy { gas_price }),
		Err(e) => {
			debug!(
				"fee market data unavailable on chain {}, using legacy gas price: {}",
				provider.chain_id(),
				e
			);
			Ok(GasFees::Legacy { gas_price })
		},
	}
}

/// Estimated gas plus headroom
pub fn with_gas_buffer(estimate: u64) -> u64 {
	estimate.saturating_add(estimate.saturating_mul(GAS_LIMIT_BUFFER_PCT) / 100)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::MockReadProvider;

	#[test]
	fn test_priority_fee_floor() {
		let fees = compute_eip1559_fees(10_000_000_000, 1_000_000_000);
		assert_eq!(
			fees,
			GasFees::Eip1559 {
				max_fee_per_gas: 21_500_000_000,
				max_priority_fee_per_gas: 1_500_000_000,
			}
		);
	}

	#[test]
	fn test_priority_fee_tracks_gas_price() {
		let fees = compute_eip1559_fees(20_000_000_000, 30_000_000_000);
		assert_eq!(
			fees,
			GasFees::Eip1559 {
				max_fee_per_gas: 43_000_000_000,
				max_priority_fee_per_gas: 3_000_000_000,
			}
		);
	}

	#[tokio::test]
	async fn test_legacy_pricing_without_base_fee() {
		let provider = MockReadProvider::new(42220).with_gas_price(5_000_000_000).with_base_fee(None);
		let fees = resolve_fees(&provider).await.unwrap();
		assert_eq!(
			fees,
			GasFees::Legacy {
				gas_price: 5_000_000_000
			}
		);
	}

	#[tokio::test]
	async fn test_eip1559_when_base_fee_reported() {
		let provider = MockReadProvider::new(1)
			.with_gas_price(2_000_000_000)
			.with_base_fee(Some(1_000_000_000));
		let fees = resolve_fees(&provider).await.unwrap();
		assert!(matches!(fees, GasFees::Eip1559 { .. }));
		assert_eq!(fees.max_price_per_gas(), 3_500_000_000);
	}

	#[test]
	fn test_gas_buffer() {
		assert_eq!(with_gas_buffer(100_000), 120_000);
		assert_eq!(with_gas_buffer(u64::MAX), u64::MAX);
	}
}
