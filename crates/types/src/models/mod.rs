//! Shared domain models used by strategies, providers and the router

pub mod amount;
pub mod estimate;
pub mod network;
pub mod outcome;
pub mod request;
pub mod secret_string;
pub mod token;
pub mod transaction;

pub use estimate::{EstimateSource, SwapEstimate};
pub use network::Network;
pub use outcome::{
	EstimateOutcome, ExecutionOutcome, ExecutionStep, GuidedInstructions, StepKind, SwapReceipt,
	SwapResult,
};
pub use request::SwapRequest;
pub use secret_string::SecretString;
pub use token::{is_near_parity, FiatPeg, TokenInfo, TokenRegistry};
pub use transaction::{GasFees, TxReceipt, TxRequest};
