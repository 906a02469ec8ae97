//! Swap estimate model

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use super::amount::{apply_slippage, format_units};

/// Where an estimate's output figure came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
	/// Quoted by the venue
	Live,
	/// Computed from the venue's published fee after the live quote failed
	Analytical,
}

/// Expected outcome of a swap before execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwapEstimate {
	/// Decimal amount of the destination token before slippage
	pub expected_output: String,
	/// Decimal amount guaranteed after slippage
	pub minimum_output: String,
	/// Base-unit form of `expected_output`
	pub expected_output_raw: U256,
	/// Base-unit form of `minimum_output`
	pub minimum_output_raw: U256,
	pub price_impact_pct: f64,
	/// Gas cost in wei of the chain's native asset
	pub gas_cost_estimate: u128,
	pub source: EstimateSource,
	/// Name of the strategy that produced the estimate
	pub strategy: String,
}

impl SwapEstimate {
	/// Build an estimate, deriving the minimum output from the slippage tolerance
	pub fn from_expected(
		expected_raw: U256,
		to_decimals: u8,
		slippage_bps: u32,
		price_impact_pct: f64,
		gas_cost_estimate: u128,
		source: EstimateSource,
		strategy: impl Into<String>,
	) -> Self {
		let minimum_raw = apply_slippage(expected_raw, slippage_bps);
		Self {
			expected_output: format_units(expected_raw, to_decimals),
			minimum_output: format_units(minimum_raw, to_decimals),
			expected_output_raw: expected_raw,
			minimum_output_raw: minimum_raw,
			price_impact_pct,
			gas_cost_estimate,
			source,
			strategy: strategy.into(),
		}
	}

	pub fn is_analytical(&self) -> bool {
		self.source == EstimateSource::Analytical
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_minimum_output_derived_from_slippage() {
		let estimate = SwapEstimate::from_expected(
			U256::from(99_960_000u64),
			6,
			50,
			0.0,
			0,
			EstimateSource::Analytical,
			"direct-pool",
		);
		assert_eq!(estimate.expected_output, "99.96");
		assert_eq!(estimate.minimum_output, "99.4602");
		assert!(estimate.minimum_output_raw <= estimate.expected_output_raw);
		assert!(estimate.is_analytical());
	}
}
