//! Error taxonomy for swap routing
//!
//! Strategies return these as typed results; the router turns them into a
//! [`SwapResult::Failure`](crate::models::SwapResult) with a user hint attached.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chains::chain_name;
use crate::models::StepKind;

/// Machine-readable failure category carried in public results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	InvalidRequest,
	TokenNotFound,
	UnsupportedPair,
	WrongNetwork,
	NoRouteFound,
	QuoteProvider,
	VenueDiscovery,
	VenueUnavailable,
	CircuitOpen,
	ApprovalFailed,
	SwapExecutionFailed,
	ConfirmationUnknown,
	NoStrategyAvailable,
	Provider,
}

/// Errors raised by RPC clients and wallet backends
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
	#[error("Transport error: {0}")]
	Transport(String),

	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },

	#[error("Invalid RPC response: {0}")]
	InvalidResponse(String),

	#[error("No wallet connected")]
	WalletNotConnected,

	#[error("Request rejected by user")]
	UserRejected,

	#[error("Transaction {tx_hash} reverted")]
	Reverted { tx_hash: B256 },

	#[error("Wallet is on chain {actual}, expected chain {expected}")]
	WrongNetwork { expected: u64, actual: u64 },

	#[error("No RPC endpoint configured for chain {chain_id}")]
	NoRpcConfigured { chain_id: u64 },
}

impl ProviderError {
	/// Failures caused by the user or their wallet rather than the network
	pub fn is_user_side(&self) -> bool {
		matches!(
			self,
			ProviderError::WalletNotConnected
				| ProviderError::UserRejected
				| ProviderError::WrongNetwork { .. }
		)
	}
}

/// Swap lifecycle errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwapError {
	#[error("Invalid swap request: {reason}")]
	InvalidRequest { reason: String },

	#[error("Token {symbol} not found on chain {chain_id}")]
	TokenNotFound { symbol: String, chain_id: u64 },

	#[error("Unsupported pair {from_token} -> {to_token}: {reason}")]
	UnsupportedPair {
		from_token: String,
		to_token: String,
		reason: String,
	},

	#[error("Wallet is on chain {actual}, swap requires chain {expected}")]
	WrongNetwork { expected: u64, actual: u64 },

	#[error("No route found on {venue}: {reason}")]
	NoRouteFound { venue: String, reason: String },

	#[error("Quote provider {venue} failed: {reason}")]
	QuoteProvider {
		venue: String,
		status_code: Option<u16>,
		reason: String,
	},

	#[error("Venue discovery failed for {venue} on chain {chain_id}: {reason}")]
	VenueDiscovery {
		venue: String,
		chain_id: u64,
		reason: String,
	},

	#[error("Venue {venue} unavailable: {reason}")]
	VenueUnavailable { venue: String, reason: String },

	#[error("Circuit open for strategy {strategy}, retry in {retry_after_ms}ms")]
	CircuitOpen { strategy: String, retry_after_ms: u64 },

	#[error("Approval failed: {reason}")]
	ApprovalFailed { reason: String, user_rejected: bool },

	#[error("Swap execution failed: {reason}")]
	SwapExecutionFailed { reason: String, user_rejected: bool },

	/// Sent to the network, but whether it was mined could not be determined
	#[error("{step:?} transaction {tx_hash} was sent but its confirmation is unknown: {reason}")]
	ConfirmationUnknown {
		step: StepKind,
		tx_hash: B256,
		reason: String,
	},

	#[error("No strategy available for {from_token} -> {to_token} on chains {from_chain_id} -> {to_chain_id}")]
	NoStrategyAvailable {
		from_token: String,
		to_token: String,
		from_chain_id: u64,
		to_chain_id: u64,
	},

	#[error("Provider error: {0}")]
	Provider(ProviderError),
}

impl From<ProviderError> for SwapError {
	fn from(err: ProviderError) -> Self {
		match err {
			ProviderError::WrongNetwork { expected, actual } => {
				SwapError::WrongNetwork { expected, actual }
			},
			other => SwapError::Provider(other),
		}
	}
}

impl SwapError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			SwapError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
			SwapError::TokenNotFound { .. } => ErrorKind::TokenNotFound,
			SwapError::UnsupportedPair { .. } => ErrorKind::UnsupportedPair,
			SwapError::WrongNetwork { .. } => ErrorKind::WrongNetwork,
			SwapError::NoRouteFound { .. } => ErrorKind::NoRouteFound,
			SwapError::QuoteProvider { .. } => ErrorKind::QuoteProvider,
			SwapError::VenueDiscovery { .. } => ErrorKind::VenueDiscovery,
			SwapError::VenueUnavailable { .. } => ErrorKind::VenueUnavailable,
			SwapError::CircuitOpen { .. } => ErrorKind::CircuitOpen,
			SwapError::ApprovalFailed { .. } => ErrorKind::ApprovalFailed,
			SwapError::SwapExecutionFailed { .. } => ErrorKind::SwapExecutionFailed,
			SwapError::ConfirmationUnknown { .. } => ErrorKind::ConfirmationUnknown,
			SwapError::NoStrategyAvailable { .. } => ErrorKind::NoStrategyAvailable,
			SwapError::Provider(_) => ErrorKind::Provider,
		}
	}

	/// Whether the same request may succeed if attempted again later.
	///
	/// Failed approvals and swaps are retryable as fresh attempts since no funds moved.
	pub fn is_retryable(&self) -> bool {
		match self {
			SwapError::VenueUnavailable { .. }
			| SwapError::CircuitOpen { .. }
			| SwapError::VenueDiscovery { .. }
			| SwapError::ApprovalFailed { .. }
			| SwapError::SwapExecutionFailed { .. } => true,
			SwapError::QuoteProvider { status_code, .. } => match status_code {
				Some(code) => *code == 429 || *code >= 500,
				None => true,
			},
			SwapError::Provider(err) => !err.is_user_side(),
			_ => false,
		}
	}

	/// Whether this failure says something about the venue's health
	pub fn counts_against_venue(&self) -> bool {
		match self {
			SwapError::InvalidRequest { .. }
			| SwapError::TokenNotFound { .. }
			| SwapError::UnsupportedPair { .. }
			| SwapError::WrongNetwork { .. }
			| SwapError::NoRouteFound { .. }
			| SwapError::CircuitOpen { .. }
			| SwapError::ConfirmationUnknown { .. }
			| SwapError::NoStrategyAvailable { .. } => false,
			SwapError::ApprovalFailed { user_rejected, .. }
			| SwapError::SwapExecutionFailed { user_rejected, .. } => !user_rejected,
			SwapError::QuoteProvider { status_code, .. } => match status_code {
				Some(code) if (400..500).contains(code) => *code == 429,
				_ => true,
			},
			SwapError::VenueDiscovery { .. } | SwapError::VenueUnavailable { .. } => true,
			SwapError::Provider(err) => !err.is_user_side(),
		}
	}

	/// Whether the router may try the next supporting strategy
	pub fn allows_fall_through(&self) -> bool {
		matches!(
			self,
			SwapError::VenueDiscovery { .. }
				| SwapError::VenueUnavailable { .. }
				| SwapError::CircuitOpen { .. }
		)
	}

	/// Hash of a transaction that reached the network without a known outcome
	pub fn submitted_tx_hash(&self) -> Option<B256> {
		match self {
			SwapError::ConfirmationUnknown { tx_hash, .. } => Some(*tx_hash),
			_ => None,
		}
	}

	/// Whether a quote failed because the venue could not answer at all.
	///
	/// A venue that answered with no usable route, or rejected the request, is not an outage.
	pub fn is_quote_outage(&self) -> bool {
		match self {
			SwapError::QuoteProvider { status_code, .. } => match status_code {
				Some(code) => *code == 429 || *code >= 500,
				None => true,
			},
			SwapError::Provider(err) => !err.is_user_side(),
			_ => self.allows_fall_through(),
		}
	}

	/// Short actionable message for the user
	pub fn user_hint(&self) -> String {
		match self {
			SwapError::WrongNetwork { expected, .. } => {
				format!("Switch your wallet to {} and try again.", chain_name(*expected))
			},
			SwapError::UnsupportedPair { .. }
			| SwapError::TokenNotFound { .. }
			| SwapError::NoStrategyAvailable { .. } => {
				"This pair is not supported here. Pick a different pair.".to_string()
			},
			SwapError::NoRouteFound { .. } => {
				"No liquidity for this swap. Try a different amount or pair.".to_string()
			},
			SwapError::InvalidRequest { .. } => "Check the amount and slippage.".to_string(),
			SwapError::ApprovalFailed {
				user_rejected: true,
				..
			}
			| SwapError::SwapExecutionFailed {
				user_rejected: true,
				..
			} => "The transaction was rejected in your wallet.".to_string(),
			SwapError::ConfirmationUnknown { tx_hash, .. } => format!(
				"Transaction {} was sent. Check its status in a block explorer before trying again.",
				tx_hash
			),
			SwapError::Provider(ProviderError::WalletNotConnected) => {
				"Connect your wallet to continue.".to_string()
			},
			_ if self.is_retryable() => "Try again shortly.".to_string(),
			_ => "The swap could not be completed.".to_string(),
		}
	}
}
