//! Blockchain network models

use serde::{Deserialize, Serialize};

/// Supported blockchain network
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Network {
	/// Chain ID (e.g., 1 for Ethereum mainnet, 42220 for Celo)
	pub chain_id: u64,
	/// Human-readable name (e.g., "Ethereum", "Celo", "Base")
	pub name: Option<String>,
	/// Whether the network is a testnet
	pub is_testnet: Option<bool>,
}

impl Network {
	pub fn new(chain_id: u64, name: Option<String>, is_testnet: Option<bool>) -> Self {
		Self {
			chain_id,
			name,
			is_testnet,
		}
	}

	/// Name to show a user when asking them to switch their wallet
	pub fn display_name(&self) -> String {
		self.name
			.clone()
			.unwrap_or_else(|| format!("chain {}", self.chain_id))
	}
}
