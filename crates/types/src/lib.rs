//! Swap Types
//!
//! Shared models and traits for the swap routing engine.
//! This crate contains the chain classifier, token registry, amount math, the error
//! taxonomy and the strategy/provider contracts every other crate builds on.

pub mod chains;
pub mod circuit_breaker;
pub mod errors;
pub mod models;
pub mod providers;
pub mod strategies;
pub mod test_utils;

// Re-export chrono and alloy primitives for convenience
pub use alloy_primitives;
pub use chrono;

pub use chains::{
	chain_info, chain_name, chain_type, is_testnet, supported_chain_ids, supported_networks,
	venue_protocol, ChainInfo, ChainType, VenueProtocol,
};

pub use circuit_breaker::{CircuitBreakerPolicy, CircuitBreakerSnapshot, CircuitState};

pub use errors::{ErrorKind, ProviderError, SwapError};

pub use models::{
	is_near_parity, EstimateOutcome, EstimateSource, ExecutionOutcome, ExecutionStep, FiatPeg,
	GasFees, GuidedInstructions, Network, SecretString, StepKind, SwapEstimate, SwapReceipt,
	SwapRequest, SwapResult, TokenInfo, TokenRegistry, TxReceipt, TxRequest,
};

pub use providers::{ProviderResult, ReadProvider, SignerProvider, TransactionSigner, WalletBackend};

pub use strategies::{NoopCallbacks, StrategyResult, SwapCallbacks, SwapStrategy};
