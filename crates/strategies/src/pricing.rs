//! Estimate helpers
//!
//! The analytical estimate is input minus the venue's published fee, rescaled to the
//! destination token's precision. It only makes sense for near-parity pairs and is only
//! used after a live quote failed.

use alloy_primitives::U256;
use swap_types::models::amount::{apply_fee_bps, rescale, to_f64};
use swap_types::{is_near_parity, EstimateSource, ReadProvider, SwapEstimate};
use tracing::{debug, warn};

use crate::common::ResolvedPair;

/// Live quotes on near-parity pairs further than this from 1:1 are logged
const PARITY_WARN_PCT: f64 = 5.0;

/// `amount_in × (10000 − fee_bps) / 10000`, rescaled to the destination decimals
pub fn analytical_output(pair: &ResolvedPair, fee_bps: u32) -> U256 {
	rescale(
		apply_fee_bps(pair.amount_in, fee_bps),
		pair.from.decimals,
		pair.to.decimals,
	)
}

pub fn analytical_estimate(
	pair: &ResolvedPair,
	fee_bps: u32,
	slippage_bps: u32,
	gas_cost_estimate: u128,
	strategy: &str,
) -> SwapEstimate {
	SwapEstimate::from_expected(
		analytical_output(pair, fee_bps),
		pair.to.decimals,
		slippage_bps,
		fee_bps as f64 / 100.0,
		gas_cost_estimate,
		EstimateSource::Analytical,
		strategy,
	)
}

/// Deviation from 1:1 in percent for near-parity pairs, zero otherwise.
///
/// Cross-currency stables (USD vs EUR) are not 1:1, so this is an upper bound there.
pub fn price_impact_pct(pair: &ResolvedPair, expected_out: U256) -> f64 {
	if !is_near_parity(&pair.from, &pair.to) {
		return 0.0;
	}
	let amount_in = to_f64(pair.amount_in, pair.from.decimals);
	if amount_in <= 0.0 {
		return 0.0;
	}
	let out = to_f64(expected_out, pair.to.decimals);
	let impact = ((amount_in - out) / amount_in * 100.0).max(0.0);
	if impact > PARITY_WARN_PCT && pair.from.peg == pair.to.peg {
		warn!(
			"live quote {} {} -> {} {} is {:.2}% off parity",
			amount_in, pair.from.symbol, out, pair.to.symbol, impact
		);
	}
	impact
}

/// `gas_units × gas_price`, zero when the gas price cannot be read
pub async fn gas_cost(provider: &dyn ReadProvider, gas_units: u64) -> u128 {
	match provider.gas_price().await {
		Ok(price) => price.saturating_mul(gas_units as u128),
		Err(e) => {
			debug!(
				"gas price unavailable on chain {}, reporting zero gas cost: {}",
				provider.chain_id(),
				e
			);
			0
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::common::resolve_request;
	use swap_providers::testing::MockReadProvider;
	use swap_types::test_utils::SwapRequestBuilder;
	use swap_types::TokenRegistry;

	fn pair(chain: u64, from: &str, to: &str, amount: &str) -> ResolvedPair {
		let request = SwapRequestBuilder::new()
			.chain(chain)
			.pair(from, to)
			.amount(amount)
			.build();
		resolve_request(&TokenRegistry::with_defaults(), &request).unwrap()
	}

	#[test]
	fn test_usdc_to_eurc_with_four_bps_fee() {
		let estimate = analytical_estimate(&pair(1, "USDC", "EURC", "100"), 4, 50, 0, "test");
		assert_eq!(estimate.expected_output, "99.96");
		assert!(estimate.is_analytical());
		assert!(estimate.minimum_output_raw <= estimate.expected_output_raw);
	}

	#[test]
	fn test_decimal_mismatch_is_rescaled() {
		// cUSD has 18 decimals, USDC on Celo has 6
		let out = analytical_output(&pair(42220, "cUSD", "USDC", "10"), 0);
		assert_eq!(out, U256::from(10_000_000u64));

		let back = analytical_output(&pair(42220, "USDC", "cUSD", "10"), 0);
		assert_eq!(back, U256::from(10_000_000_000_000_000_000u128));
	}

	#[test]
	fn test_price_impact_only_for_near_parity() {
		let stable = pair(1, "USDC", "USDT", "100");
		assert!((price_impact_pct(&stable, U256::from(99_000_000u64)) - 1.0).abs() < 1e-9);
		assert_eq!(price_impact_pct(&stable, U256::from(101_000_000u64)), 0.0);

		let volatile = pair(1, "USDC", "WETH", "100");
		assert_eq!(price_impact_pct(&volatile, U256::from(1u64)), 0.0);
	}

	#[tokio::test]
	async fn test_gas_cost_uses_gas_price() {
		let provider = MockReadProvider::new(1).with_gas_price(2_000_000_000);
		assert_eq!(gas_cost(&provider, 100_000).await, 200_000_000_000_000);
	}
}
