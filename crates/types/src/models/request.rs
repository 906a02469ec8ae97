//! Swap request model

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use super::amount::BPS_DENOMINATOR;
use crate::errors::SwapError;

/// One user-initiated swap, built per action and discarded after the result returns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
	/// Source token symbol
	pub from_token: String,
	/// Destination token symbol
	pub to_token: String,
	/// Decimal amount of the source token, e.g. "100.5"
	pub amount: String,
	pub from_chain_id: u64,
	pub to_chain_id: u64,
	pub user_address: Address,
	/// Slippage tolerance in basis points; strategies apply their own default when absent
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub slippage_bps: Option<u32>,
}

impl SwapRequest {
	pub fn new(
		from_token: impl Into<String>,
		to_token: impl Into<String>,
		amount: impl Into<String>,
		chain_id: u64,
		user_address: Address,
	) -> Self {
		Self {
			from_token: from_token.into(),
			to_token: to_token.into(),
			amount: amount.into(),
			from_chain_id: chain_id,
			to_chain_id: chain_id,
			user_address,
			slippage_bps: None,
		}
	}

	pub fn with_slippage_bps(mut self, slippage_bps: u32) -> Self {
		self.slippage_bps = Some(slippage_bps);
		self
	}

	pub fn with_to_chain(mut self, to_chain_id: u64) -> Self {
		self.to_chain_id = to_chain_id;
		self
	}

	pub fn is_same_chain(&self) -> bool {
		self.from_chain_id == self.to_chain_id
	}

	/// Requested slippage or the strategy default
	pub fn slippage_or(&self, default_bps: u32) -> u32 {
		self.slippage_bps.unwrap_or(default_bps)
	}

	/// Shape checks that need no token metadata
	pub fn validate_shape(&self) -> Result<(), SwapError> {
		if self.from_token.trim().is_empty() || self.to_token.trim().is_empty() {
			return Err(SwapError::InvalidRequest {
				reason: "token symbols must not be empty".to_string(),
			});
		}
		if self.from_token.eq_ignore_ascii_case(&self.to_token)
			&& self.from_chain_id == self.to_chain_id
		{
			return Err(SwapError::InvalidRequest {
				reason: format!("cannot swap {} into itself", self.from_token),
			});
		}
		if let Some(bps) = self.slippage_bps {
			if bps >= BPS_DENOMINATOR {
				return Err(SwapError::InvalidRequest {
					reason: format!("slippage {} bps must be below {}", bps, BPS_DENOMINATOR),
				});
			}
		}
		if self.user_address.is_zero() {
			return Err(SwapError::InvalidRequest {
				reason: "user address must not be the zero address".to_string(),
			});
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	fn request() -> SwapRequest {
		SwapRequest::new(
			"USDC",
			"EURC",
			"100",
			1,
			address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
		)
	}

	#[test]
	fn test_deserializes_camel_case_payload() {
		let json = r#"{
			"fromToken": "cUSD",
			"toToken": "cEUR",
			"amount": "12.5",
			"fromChainId": 42220,
			"toChainId": 42220,
			"userAddress": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
			"slippageBps": 30
		}"#;
		let req: SwapRequest = serde_json::from_str(json).unwrap();
		assert_eq!(req.from_chain_id, 42220);
		assert_eq!(req.slippage_bps, Some(30));
		assert!(req.validate_shape().is_ok());
	}

	#[test]
	fn test_rejects_out_of_range_slippage() {
		let err = request().with_slippage_bps(10_000).validate_shape().unwrap_err();
		assert!(matches!(err, SwapError::InvalidRequest { .. }));
		assert!(request().with_slippage_bps(9_999).validate_shape().is_ok());
	}

	#[test]
	fn test_rejects_self_swap_and_zero_user() {
		let mut same = request();
		same.to_token = "usdc".into();
		assert!(same.validate_shape().is_err());

		let mut zero = request();
		zero.user_address = Address::ZERO;
		assert!(zero.validate_shape().is_err());
	}

	#[test]
	fn test_slippage_default() {
		assert_eq!(request().slippage_or(50), 50);
		assert_eq!(request().with_slippage_bps(10).slippage_or(50), 10);
	}
}
