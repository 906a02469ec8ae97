//! Provider traits implemented by RPC clients and wallet backends

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use super::ProviderResult;
use crate::models::{TxReceipt, TxRequest};

/// Read-only JSON-RPC client bound to one chain. Never prompts a wallet.
#[async_trait]
pub trait ReadProvider: Send + Sync + Debug {
	fn chain_id(&self) -> u64;

	/// `eth_call` against the latest block
	async fn call(&self, to: Address, data: Bytes) -> ProviderResult<Bytes>;

	/// Current legacy gas price in wei
	async fn gas_price(&self) -> ProviderResult<u128>;

	/// Base fee of the latest block, `None` on chains without a fee market
	async fn base_fee_per_gas(&self) -> ProviderResult<Option<u128>>;

	async fn estimate_gas(&self, tx: &TxRequest) -> ProviderResult<u64>;

	/// Receipt of a mined transaction, `None` while pending
	async fn transaction_receipt(&self, tx_hash: B256) -> ProviderResult<Option<TxReceipt>>;
}

/// Wallet-backed signer bound to a single chain
#[async_trait]
pub trait TransactionSigner: Send + Sync + Debug {
	fn address(&self) -> Address;

	fn chain_id(&self) -> u64;

	/// Sign and broadcast, returning the hash as soon as the wallet accepts it.
	/// Nonce management is the signer's concern.
	async fn send_transaction(&self, tx: TxRequest) -> ProviderResult<B256>;
}

/// A connected wallet: browser extension, embedded mobile wallet or social-login signer
#[async_trait]
pub trait WalletBackend: Send + Sync + Debug {
	/// Short label used in logs, e.g. "injected"
	fn kind(&self) -> &str;

	/// Chain the wallet is currently connected to
	async fn active_chain_id(&self) -> ProviderResult<u64>;

	/// Signer for the active chain
	async fn signer(&self) -> ProviderResult<Arc<dyn TransactionSigner>>;
}

/// Source of read providers and chain-bound signers consumed by strategies
#[async_trait]
pub trait SignerProvider: Send + Sync + Debug {
	/// Cached read-only client for a chain
	fn get_read_provider(&self, chain_id: u64) -> ProviderResult<Arc<dyn ReadProvider>>;

	/// Signer for `expected_chain_id`.
	///
	/// Fails with `ProviderError::WrongNetwork` when the wallet is on another chain. The
	/// wallet is never switched silently.
	async fn get_signer_for_chain(
		&self,
		expected_chain_id: u64,
	) -> ProviderResult<Arc<dyn TransactionSigner>>;

	async fn get_current_chain_id(&self) -> ProviderResult<u64>;
}
