//! Chain and venue classification
//!
//! Pure lookups deciding which venue family can serve a given chain. Callers must treat
//! [`ChainType::Unknown`] as "do not route here".

use crate::models::Network;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Venue family available on a chain
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ChainType {
	/// Chain with a native stable-swap AMM reachable directly
	NativeAmm,
	/// Chain served by HTTP aggregators
	Aggregator,
	/// Chain without reliable programmatic integration
	GuidedOnly,
	/// Unrecognised chain
	Unknown,
}

impl ChainType {
	/// Whether any strategy may route on this chain
	pub fn is_routable(&self) -> bool {
		!matches!(self, ChainType::Unknown)
	}
}

/// Protocol tag of the preferred venue on a chain
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum VenueProtocol {
	/// Stable-swap pools discovered through an address provider
	StableSwap,
	/// HTTP quote/swap aggregator
	Aggregator,
	/// Human-driven swap on an external venue
	ManualGuide,
	/// No venue
	None,
}

/// Static description of a known chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainInfo {
	pub chain_id: u64,
	pub name: &'static str,
	pub chain_type: ChainType,
	pub is_testnet: bool,
	pub protocol: VenueProtocol,
}

const CHAINS: &[ChainInfo] = &[
	ChainInfo {
		chain_id: 1,
		name: "Ethereum",
		chain_type: ChainType::Aggregator,
		is_testnet: false,
		protocol: VenueProtocol::Aggregator,
	},
	ChainInfo {
		chain_id: 10,
		name: "Optimism",
		chain_type: ChainType::Aggregator,
		is_testnet: false,
		protocol: VenueProtocol::Aggregator,
	},
	ChainInfo {
		chain_id: 137,
		name: "Polygon",
		chain_type: ChainType::Aggregator,
		is_testnet: false,
		protocol: VenueProtocol::Aggregator,
	},
	ChainInfo {
		chain_id: 8453,
		name: "Base",
		chain_type: ChainType::Aggregator,
		is_testnet: false,
		protocol: VenueProtocol::Aggregator,
	},
	ChainInfo {
		chain_id: 42161,
		name: "Arbitrum One",
		chain_type: ChainType::Aggregator,
		is_testnet: false,
		protocol: VenueProtocol::Aggregator,
	},
	ChainInfo {
		chain_id: 42220,
		name: "Celo",
		chain_type: ChainType::NativeAmm,
		is_testnet: false,
		protocol: VenueProtocol::StableSwap,
	},
	ChainInfo {
		chain_id: 44787,
		name: "Celo Alfajores",
		chain_type: ChainType::NativeAmm,
		is_testnet: true,
		protocol: VenueProtocol::StableSwap,
	},
	ChainInfo {
		chain_id: 11155111,
		name: "Sepolia",
		chain_type: ChainType::GuidedOnly,
		is_testnet: true,
		protocol: VenueProtocol::ManualGuide,
	},
	ChainInfo {
		chain_id: 421614,
		name: "Arbitrum Sepolia",
		chain_type: ChainType::GuidedOnly,
		is_testnet: true,
		protocol: VenueProtocol::ManualGuide,
	},
];

/// Look up the static description of a chain
pub fn chain_info(chain_id: u64) -> Option<&'static ChainInfo> {
	CHAINS.iter().find(|info| info.chain_id == chain_id)
}

/// Venue family for a chain, `Unknown` for unrecognised ids
pub fn chain_type(chain_id: u64) -> ChainType {
	chain_info(chain_id)
		.map(|info| info.chain_type)
		.unwrap_or(ChainType::Unknown)
}

/// Whether the chain is a test network. Unknown chains are reported as mainnet.
pub fn is_testnet(chain_id: u64) -> bool {
	chain_info(chain_id).is_some_and(|info| info.is_testnet)
}

/// Protocol tag of the preferred venue on a chain
pub fn venue_protocol(chain_id: u64) -> VenueProtocol {
	chain_info(chain_id)
		.map(|info| info.protocol)
		.unwrap_or(VenueProtocol::None)
}

/// Human-readable chain name
pub fn chain_name(chain_id: u64) -> String {
	chain_info(chain_id)
		.map(|info| info.name.to_string())
		.unwrap_or_else(|| format!("chain {}", chain_id))
}

/// All chain ids the classifier recognises
pub fn supported_chain_ids() -> BTreeSet<u64> {
	CHAINS.iter().map(|info| info.chain_id).collect()
}

/// Recognised chains as network models
pub fn supported_networks() -> Vec<Network> {
	CHAINS
		.iter()
		.map(|info| {
			Network::new(
				info.chain_id,
				Some(info.name.to_string()),
				Some(info.is_testnet),
			)
		})
		.collect()
}
