//! Signer and RPC provider contracts
//!
//! The core only needs two things from a wallet: a read-only client per chain for quote
//! paths, and a signer bound to the chain the swap runs on. Any wallet backend able to
//! provide both is interchangeable.

pub mod traits;

pub use traits::{ReadProvider, SignerProvider, TransactionSigner, WalletBackend};

use crate::errors::ProviderError;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;
