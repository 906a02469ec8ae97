//! Wallet-backed signer provider
//!
//! Hands out signers only for the chain the wallet is already on. Switching networks is a
//! user decision, so a mismatch is reported as `WrongNetwork` instead of being fixed here.

use async_trait::async_trait;
use std::sync::Arc;
use swap_types::{
	ProviderError, ProviderResult, ReadProvider, SignerProvider, TransactionSigner, WalletBackend,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::read_cache::ReadProviderCache;

#[derive(Debug)]
pub struct WalletSignerProvider {
	read_providers: Arc<ReadProviderCache>,
	wallet: RwLock<Option<Arc<dyn WalletBackend>>>,
}

impl WalletSignerProvider {
	pub fn new(read_providers: Arc<ReadProviderCache>) -> Self {
		Self {
			read_providers,
			wallet: RwLock::new(None),
		}
	}

	/// Attach a wallet, replacing any previous one
	pub async fn connect(&self, wallet: Arc<dyn WalletBackend>) {
		info!("wallet connected ({})", wallet.kind());
		*self.wallet.write().await = Some(wallet);
	}

	pub async fn disconnect(&self) {
		if self.wallet.write().await.take().is_some() {
			info!("wallet disconnected");
		}
	}

	pub async fn is_connected(&self) -> bool {
		self.wallet.read().await.is_some()
	}

	pub fn read_providers(&self) -> &Arc<ReadProviderCache> {
		&self.read_providers
	}

	async fn current_wallet(&self) -> ProviderResult<Arc<dyn WalletBackend>> {
		self.wallet
			.read()
			.await
			.clone()
			.ok_or(ProviderError::WalletNotConnected)
	}
}

#[async_trait]
impl SignerProvider for WalletSignerProvider {
	fn get_read_provider(&self, chain_id: u64) -> ProviderResult<Arc<dyn ReadProvider>> {
		self.read_providers.get(chain_id)
	}

	async fn get_signer_for_chain(
		&self,
		expected_chain_id: u64,
	) -> ProviderResult<Arc<dyn TransactionSigner>> {
		let wallet = self.current_wallet().await?;
		let actual = wallet.active_chain_id().await?;
		if actual != expected_chain_id {
			warn!(
				"wallet ({}) is on chain {}, swap requires chain {}",
				wallet.kind(),
				actual,
				expected_chain_id
			);
			return Err(ProviderError::WrongNetwork {
				expected: expected_chain_id,
				actual,
			});
		}

		let signer = wallet.signer().await?;
		if signer.chain_id() != expected_chain_id {
			return Err(ProviderError::WrongNetwork {
				expected: expected_chain_id,
				actual: signer.chain_id(),
			});
		}
		debug!(
			"signer {} ready on chain {}",
			signer.address(),
			expected_chain_id
		);
		Ok(signer)
	}

	async fn get_current_chain_id(&self) -> ProviderResult<u64> {
		self.current_wallet().await?.active_chain_id().await
	}
}
