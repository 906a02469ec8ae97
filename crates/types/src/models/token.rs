//! Token metadata and the per-chain token registry

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::SwapError;

/// Fiat currency a stable asset tracks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum FiatPeg {
	Usd,
	Eur,
	Brl,
	Kes,
}

/// ERC-20 token known to the router
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenInfo {
	pub symbol: String,
	pub address: Address,
	pub decimals: u8,
	pub chain_id: u64,
	/// Set for fiat-pegged stable assets
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub peg: Option<FiatPeg>,
}

impl TokenInfo {
	pub fn new(
		symbol: impl Into<String>,
		address: Address,
		decimals: u8,
		chain_id: u64,
		peg: Option<FiatPeg>,
	) -> Self {
		Self {
			symbol: symbol.into(),
			address,
			decimals,
			chain_id,
			peg,
		}
	}

	pub fn is_stable(&self) -> bool {
		self.peg.is_some()
	}
}

/// Whether two tokens trade close enough to parity that a fee-only estimate is meaningful
pub fn is_near_parity(a: &TokenInfo, b: &TokenInfo) -> bool {
	a.is_stable() && b.is_stable()
}

/// Token lookup keyed by chain id and upper-cased symbol
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
	tokens: HashMap<(u64, String), TokenInfo>,
}

impl TokenRegistry {
	/// Empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry preloaded with the stables and wrapped native assets the app trades
	pub fn with_defaults() -> Self {
		let mut registry = Self::new();
		for token in default_tokens() {
			registry.insert(token);
		}
		registry
	}

	/// Add or replace a token
	pub fn insert(&mut self, token: TokenInfo) {
		let key = (token.chain_id, token.symbol.to_uppercase());
		self.tokens.insert(key, token);
	}

	/// Case-insensitive lookup
	pub fn get(&self, chain_id: u64, symbol: &str) -> Option<&TokenInfo> {
		self.tokens.get(&(chain_id, symbol.trim().to_uppercase()))
	}

	/// Lookup failing with `TokenNotFound`
	pub fn require(&self, chain_id: u64, symbol: &str) -> Result<&TokenInfo, SwapError> {
		self.get(chain_id, symbol)
			.ok_or_else(|| SwapError::TokenNotFound {
				symbol: symbol.to_string(),
				chain_id,
			})
	}

	pub fn contains(&self, chain_id: u64, symbol: &str) -> bool {
		self.get(chain_id, symbol).is_some()
	}

	/// All tokens on one chain, sorted by symbol
	pub fn tokens_on(&self, chain_id: u64) -> Vec<&TokenInfo> {
		let mut tokens: Vec<&TokenInfo> = self
			.tokens
			.values()
			.filter(|t| t.chain_id == chain_id)
			.collect();
		tokens.sort_by(|a, b| a.symbol.cmp(&b.symbol));
		tokens
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}

fn default_tokens() -> Vec<TokenInfo> {
	use FiatPeg::*;
	vec![
		// Ethereum
		TokenInfo::new("USDC", address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"), 6, 1, Some(Usd)),
		TokenInfo::new("USDT", address!("dac17f958d2ee523a2206206994597c13d831ec7"), 6, 1, Some(Usd)),
		TokenInfo::new("EURC", address!("1abaea1f7c830bd89acc67ec4af516284b1bc33c"), 6, 1, Some(Eur)),
		TokenInfo::new("WETH", address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"), 18, 1, None),
		// Optimism
		TokenInfo::new("USDC", address!("0b2c639c533813f4aa9d7837caf62653d097ff85"), 6, 10, Some(Usd)),
		TokenInfo::new("WETH", address!("4200000000000000000000000000000000000006"), 18, 10, None),
		// Polygon
		TokenInfo::new("USDC", address!("3c499c542cef5e3811e1192ce70d8cc03d5c3359"), 6, 137, Some(Usd)),
		TokenInfo::new("USDT", address!("c2132d05d31c914a87c6611c10748aeb04b58e8f"), 6, 137, Some(Usd)),
		// Base
		TokenInfo::new("USDC", address!("833589fcd6edb6e08f4c7c32d4f71b54bda02913"), 6, 8453, Some(Usd)),
		TokenInfo::new("EURC", address!("60a3e35cc302bfa44cb288bc5a4f316fdb1adb42"), 6, 8453, Some(Eur)),
		TokenInfo::new("WETH", address!("4200000000000000000000000000000000000006"), 18, 8453, None),
		// Arbitrum One
		TokenInfo::new("USDC", address!("af88d065e77c8cc2239327c5edb3a432268e5831"), 6, 42161, Some(Usd)),
		TokenInfo::new("USDT", address!("fd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9"), 6, 42161, Some(Usd)),
		TokenInfo::new("WETH", address!("82af49447d8a07e3bd95bd0d56f35241523fbab1"), 18, 42161, None),
		// Celo
		TokenInfo::new("cUSD", address!("765de816845861e75a25fca122bb6898b8b1282a"), 18, 42220, Some(Usd)),
		TokenInfo::new("cEUR", address!("d8763cba276a3738e6de85b4b3bf5fded6d6ca73"), 18, 42220, Some(Eur)),
		TokenInfo::new("cREAL", address!("e8537a3d056da446677b9e9d6c5db704eaab4787"), 18, 42220, Some(Brl)),
		TokenInfo::new("cKES", address!("456a3d042c0dbd3db53d5489e98dfb038553b0d0"), 18, 42220, Some(Kes)),
		TokenInfo::new("USDC", address!("ceba9300f2b948710d2653dd7b07f33a8b32118c"), 6, 42220, Some(Usd)),
		TokenInfo::new("USDT", address!("48065fbbe25f71c9282ddf5e1cd6d6a887483d5e"), 6, 42220, Some(Usd)),
		// Celo Alfajores
		TokenInfo::new("cUSD", address!("874069fa1eb16d44d622f2e0ca25eea172369bc1"), 18, 44787, Some(Usd)),
		TokenInfo::new("cEUR", address!("10c892a6ec43a53e45d0b916b4b7d383b1b78c0f"), 18, 44787, Some(Eur)),
		// Sepolia
		TokenInfo::new("USDC", address!("1c7d4b196cb0c7b01d743fbc6116a902379c7238"), 6, 11155111, Some(Usd)),
		TokenInfo::new("EURC", address!("08210f9170f89ab7658f0b5e3ff39b0e03c594d4"), 6, 11155111, Some(Eur)),
		// Arbitrum Sepolia
		TokenInfo::new("USDC", address!("75faf114eafb1bdbe2f0316df893fd58ce46aa4d"), 6, 421614, Some(Usd)),
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_lookup_is_case_insensitive() {
		let registry = TokenRegistry::with_defaults();
		let cusd = registry.get(42220, "cusd").expect("cUSD is registered");
		assert_eq!(cusd.symbol, "cUSD");
		assert_eq!(cusd.decimals, 18);
		assert!(registry.contains(42220, " CUSD "));
	}

	#[test]
	fn test_require_reports_token_not_found() {
		let registry = TokenRegistry::with_defaults();
		let err = registry.require(42161, "EURC").unwrap_err();
		assert!(matches!(
			err,
			SwapError::TokenNotFound { ref symbol, chain_id: 42161 } if symbol == "EURC"
		));
	}

	#[test]
	fn test_near_parity_requires_two_stables() {
		let registry = TokenRegistry::with_defaults();
		let usdc = registry.get(1, "USDC").unwrap();
		let eurc = registry.get(1, "EURC").unwrap();
		let weth = registry.get(1, "WETH").unwrap();
		assert!(is_near_parity(usdc, eurc));
		assert!(!is_near_parity(usdc, weth));
	}

	#[test]
	fn test_insert_overrides_existing_entry() {
		let mut registry = TokenRegistry::with_defaults();
		let before = registry.len();
		registry.insert(TokenInfo::new("usdc", Address::ZERO, 6, 1, Some(FiatPeg::Usd)));
		assert_eq!(registry.len(), before);
		assert_eq!(registry.get(1, "USDC").unwrap().address, Address::ZERO);
		assert_eq!(registry.tokens_on(1).len(), 4);
	}
}
