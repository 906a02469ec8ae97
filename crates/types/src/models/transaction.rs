//! Transaction request and receipt models exchanged with signers and RPC providers

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Fee fields attached to a state-changing transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GasFees {
	Eip1559 {
		max_fee_per_gas: u128,
		max_priority_fee_per_gas: u128,
	},
	Legacy {
		gas_price: u128,
	},
}

impl GasFees {
	/// Highest price per gas unit the transaction may pay
	pub fn max_price_per_gas(&self) -> u128 {
		match self {
			GasFees::Eip1559 {
				max_fee_per_gas, ..
			} => *max_fee_per_gas,
			GasFees::Legacy { gas_price } => *gas_price,
		}
	}
}

/// Unsigned transaction handed to a signer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TxRequest {
	pub chain_id: u64,
	pub from: Address,
	pub to: Address,
	pub data: Bytes,
	pub value: U256,
	pub gas_limit: Option<u64>,
	pub fees: Option<GasFees>,
}

impl TxRequest {
	pub fn new(chain_id: u64, from: Address, to: Address, data: Bytes) -> Self {
		Self {
			chain_id,
			from,
			to,
			data,
			value: U256::ZERO,
			gas_limit: None,
			fees: None,
		}
	}

	pub fn with_value(mut self, value: U256) -> Self {
		self.value = value;
		self
	}

	pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
		self.gas_limit = Some(gas_limit);
		self
	}

	pub fn with_fees(mut self, fees: GasFees) -> Self {
		self.fees = Some(fees);
		self
	}
}

/// Mined transaction receipt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
	pub transaction_hash: B256,
	pub block_number: Option<u64>,
	/// `true` when the transaction executed without reverting
	pub status: bool,
	pub gas_used: u64,
}
