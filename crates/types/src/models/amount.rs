//! Fixed-point amount helpers
//!
//! Amounts travel as decimal strings at the edges and as base-unit `U256` values
//! everywhere else. All basis-point math rounds down, so a derived minimum never exceeds
//! the amount it was derived from.

use alloy_primitives::U256;

use crate::errors::SwapError;

/// Denominator for basis-point math
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Parse a positive decimal string into base units at `decimals` precision
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, SwapError> {
	let amount = amount.trim();
	let invalid = |reason: &str| SwapError::InvalidRequest {
		reason: format!("amount '{}' {}", amount, reason),
	};

	if amount.is_empty() {
		return Err(invalid("is empty"));
	}

	let (whole, fraction) = match amount.split_once('.') {
		Some((whole, fraction)) => (whole, fraction),
		None => (amount, ""),
	};

	if whole.is_empty() && fraction.is_empty() {
		return Err(invalid("is not a number"));
	}
	if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
		return Err(invalid("is not a plain decimal number"));
	}
	if fraction.len() > decimals as usize {
		return Err(invalid(&format!(
			"has more than {} decimal places",
			decimals
		)));
	}

	let mut digits = String::with_capacity(whole.len() + decimals as usize);
	digits.push_str(whole);
	digits.push_str(fraction);
	digits.extend(std::iter::repeat('0').take(decimals as usize - fraction.len()));
	let digits = digits.trim_start_matches('0');

	if digits.is_empty() {
		return Err(invalid("must be greater than zero"));
	}

	U256::from_str_radix(digits, 10).map_err(|_| invalid("is too large"))
}

/// Render base units as a decimal string without trailing zeros
pub fn format_units(value: U256, decimals: u8) -> String {
	let raw = value.to_string();
	let decimals = decimals as usize;
	if decimals == 0 {
		return raw;
	}

	let padded = if raw.len() <= decimals {
		format!("{}{}", "0".repeat(decimals + 1 - raw.len()), raw)
	} else {
		raw
	};
	let (whole, fraction) = padded.split_at(padded.len() - decimals);
	let fraction = fraction.trim_end_matches('0');

	if fraction.is_empty() {
		whole.to_string()
	} else {
		format!("{}.{}", whole, fraction)
	}
}

/// Keep `keep_bps / 10000` of `value`, rounding down
fn scale_bps(value: U256, keep_bps: u32) -> U256 {
	let keep = U256::from(keep_bps);
	let denominator = U256::from(BPS_DENOMINATOR);
	match value.checked_mul(keep) {
		Some(product) => product / denominator,
		None => (value / denominator) * keep,
	}
}

/// `expected × (10000 − slippage_bps) / 10000`
pub fn apply_slippage(expected: U256, slippage_bps: u32) -> U256 {
	scale_bps(expected, BPS_DENOMINATOR.saturating_sub(slippage_bps))
}

/// Deduct a venue fee expressed in basis points
pub fn apply_fee_bps(amount: U256, fee_bps: u32) -> U256 {
	scale_bps(amount, BPS_DENOMINATOR.saturating_sub(fee_bps))
}

/// Move a base-unit value between token precisions
pub fn rescale(value: U256, from_decimals: u8, to_decimals: u8) -> U256 {
	if from_decimals == to_decimals {
		return value;
	}
	let diff = from_decimals.abs_diff(to_decimals) as usize;
	let factor = U256::from(10u64).pow(U256::from(diff));
	if to_decimals > from_decimals {
		value.saturating_mul(factor)
	} else {
		value / factor
	}
}

/// Lossy conversion for ratios such as price impact
pub fn to_f64(value: U256, decimals: u8) -> f64 {
	format_units(value, decimals).parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_units_accepts_plain_decimals() {
		assert_eq!(parse_units("100", 6).unwrap(), U256::from(100_000_000u64));
		assert_eq!(parse_units("0.5", 6).unwrap(), U256::from(500_000u64));
		assert_eq!(parse_units(" .25 ", 2).unwrap(), U256::from(25u64));
		assert_eq!(
			parse_units("1.000000000000000001", 18).unwrap(),
			U256::from(1_000_000_000_000_000_001u128)
		);
	}

	#[test]
	fn test_parse_units_rejects_bad_amounts() {
		for bad in ["", "0", "0.000", "-1", "1e6", "abc", "1.2.3", ".", "1.1234567"] {
			let err = parse_units(bad, 6).unwrap_err();
			assert!(
				matches!(err, SwapError::InvalidRequest { .. }),
				"expected invalid request for {:?}",
				bad
			);
		}
	}

	#[test]
	fn test_format_units_trims_trailing_zeros() {
		assert_eq!(format_units(U256::from(99_960_000u64), 6), "99.96");
		assert_eq!(format_units(U256::from(100_000_000u64), 6), "100");
		assert_eq!(format_units(U256::from(5u64), 6), "0.000005");
		assert_eq!(format_units(U256::ZERO, 6), "0");
		assert_eq!(format_units(U256::from(42u64), 0), "42");
	}

	#[test]
	fn test_fee_deduction_matches_published_rate() {
		let input = parse_units("100", 6).unwrap();
		let out = apply_fee_bps(input, 4);
		assert_eq!(format_units(out, 6), "99.96");
	}

	#[test]
	fn test_slippage_gap_is_within_one_unit() {
		for (expected, bps) in [(99_960_000u64, 50u32), (1u64, 9_999), (123_456_789, 37), (7, 0)] {
			let expected = U256::from(expected);
			let minimum = apply_slippage(expected, bps);
			assert!(minimum <= expected);
			let gap = expected - minimum;
			let exact = expected * U256::from(bps) / U256::from(BPS_DENOMINATOR);
			assert!(gap >= exact && gap - exact <= U256::from(1u64));
		}
	}

	#[test]
	fn test_rescale_between_precisions() {
		let six = U256::from(99_960_000u64);
		let eighteen = rescale(six, 6, 18);
		assert_eq!(format_units(eighteen, 18), "99.96");
		assert_eq!(rescale(eighteen, 18, 6), six);
		assert_eq!(rescale(six, 6, 6), six);
	}

	#[test]
	fn test_to_f64() {
		assert!((to_f64(U256::from(1_500_000u64), 6) - 1.5).abs() < f64::EPSILON);
	}
}
