//! In-memory providers, signers and wallets for tests
//!
//! Hand-written doubles that record every call so tests can assert on what reached the
//! chain (or, more often, what did not).

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use swap_types::{
	ProviderError, ProviderResult, ReadProvider, TransactionSigner, TxReceipt, TxRequest,
	WalletBackend,
};

use crate::read_cache::ReadProviderCache;
use crate::wallet::WalletSignerProvider;

type CallHandler = Arc<dyn Fn(&Bytes) -> ProviderResult<Bytes> + Send + Sync>;

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
	m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Scriptable read provider keyed by `(contract, selector)`
pub struct MockReadProvider {
	chain_id: u64,
	handlers: Mutex<HashMap<(Address, [u8; 4]), CallHandler>>,
	calls: Mutex<Vec<(Address, Bytes)>>,
	gas_price: u128,
	base_fee: Option<u128>,
	estimate_gas: Option<u64>,
	pending_polls: AtomicUsize,
	receipt_polls: AtomicUsize,
	reverting: bool,
	receipt_error: Option<ProviderError>,
}

impl std::fmt::Debug for MockReadProvider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MockReadProvider")
			.field("chain_id", &self.chain_id)
			.field("calls", &lock(&self.calls).len())
			.finish()
	}
}

impl MockReadProvider {
	pub fn new(chain_id: u64) -> Self {
		Self {
			chain_id,
			handlers: Mutex::new(HashMap::new()),
			calls: Mutex::new(Vec::new()),
			gas_price: 1_000_000_000,
			base_fee: Some(1_000_000_000),
			estimate_gas: Some(150_000),
			pending_polls: AtomicUsize::new(0),
			receipt_polls: AtomicUsize::new(0),
			reverting: false,
			receipt_error: None,
		}
	}

	pub fn with_gas_price(mut self, gas_price: u128) -> Self {
		self.gas_price = gas_price;
		self
	}

	pub fn with_base_fee(mut self, base_fee: Option<u128>) -> Self {
		self.base_fee = base_fee;
		self
	}

	/// Make `eth_estimateGas` fail
	pub fn without_gas_estimates(mut self) -> Self {
		self.estimate_gas = None;
		self
	}

	/// Report the next `n` receipt lookups as pending
	pub fn with_pending_polls(self, n: usize) -> Self {
		self.pending_polls.store(n, Ordering::SeqCst);
		self
	}

	/// Every mined transaction reverts
	pub fn with_reverting_receipts(mut self) -> Self {
		self.reverting = true;
		self
	}

	/// Every receipt lookup fails with `err`
	pub fn with_receipt_error(mut self, err: ProviderError) -> Self {
		self.receipt_error = Some(err);
		self
	}

	/// Answer calls to `to` with `selector` using `handler`
	pub fn on_call<F>(&self, to: Address, selector: [u8; 4], handler: F)
	where
		F: Fn(&Bytes) -> ProviderResult<Bytes> + Send + Sync + 'static,
	{
		lock(&self.handlers).insert((to, selector), Arc::new(handler));
	}

	/// Answer calls to `to` with `selector` with fixed return data
	pub fn on_call_return(&self, to: Address, selector: [u8; 4], data: Vec<u8>) {
		let data = Bytes::from(data);
		self.on_call(to, selector, move |_| Ok(data.clone()));
	}

	/// Make calls to `to` with `selector` fail with a transport error
	pub fn on_call_fail(&self, to: Address, selector: [u8; 4]) {
		self.on_call(to, selector, |_| {
			Err(ProviderError::Transport("connection refused".to_string()))
		});
	}

	pub fn calls(&self) -> Vec<(Address, Bytes)> {
		lock(&self.calls).clone()
	}

	pub fn call_count(&self, to: Address, selector: [u8; 4]) -> usize {
		lock(&self.calls)
			.iter()
			.filter(|(addr, data)| *addr == to && data.len() >= 4 && data[..4] == selector)
			.count()
	}

	pub fn total_calls(&self) -> usize {
		lock(&self.calls).len()
	}

	pub fn receipt_polls(&self) -> usize {
		self.receipt_polls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ReadProvider for MockReadProvider {
	fn chain_id(&self) -> u64 {
		self.chain_id
	}

	async fn call(&self, to: Address, data: Bytes) -> ProviderResult<Bytes> {
		lock(&self.calls).push((to, data.clone()));
		let selector: [u8; 4] = match data.get(..4).and_then(|s| s.try_into().ok()) {
			Some(selector) => selector,
			None => return Err(ProviderError::Rpc {
				code: -32000,
				message: "calldata too short".to_string(),
			}),
		};
		let handler = lock(&self.handlers).get(&(to, selector)).cloned();
		match handler {
			Some(handler) => handler(&data),
			None => Err(ProviderError::Rpc {
				code: 3,
				message: "execution reverted".to_string(),
			}),
		}
	}

	async fn gas_price(&self) -> ProviderResult<u128> {
		Ok(self.gas_price)
	}

	async fn base_fee_per_gas(&self) -> ProviderResult<Option<u128>> {
		Ok(self.base_fee)
	}

	async fn estimate_gas(&self, _tx: &TxRequest) -> ProviderResult<u64> {
		self.estimate_gas.ok_or(ProviderError::Rpc {
			code: -32000,
			message: "gas required exceeds allowance".to_string(),
		})
	}

	async fn transaction_receipt(&self, tx_hash: B256) -> ProviderResult<Option<TxReceipt>> {
		self.receipt_polls.fetch_add(1, Ordering::SeqCst);
		if let Some(err) = &self.receipt_error {
			return Err(err.clone());
		}
		let pending = self
			.pending_polls
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
			.is_ok();
		if pending {
			return Ok(None);
		}
		Ok(Some(TxReceipt {
			transaction_hash: tx_hash,
			block_number: Some(1),
			status: !self.reverting,
			gas_used: 100_000,
		}))
	}
}

/// Signer recording every transaction it is asked to send
#[derive(Debug)]
pub struct MockSigner {
	address: Address,
	chain_id: Arc<AtomicU64>,
	sent: Mutex<Vec<TxRequest>>,
	reject: AtomicBool,
	nonce: AtomicU64,
}

impl MockSigner {
	pub fn new(address: Address, chain_id: u64) -> Self {
		Self::sharing_chain(address, Arc::new(AtomicU64::new(chain_id)))
	}

	fn sharing_chain(address: Address, chain_id: Arc<AtomicU64>) -> Self {
		Self {
			address,
			chain_id,
			sent: Mutex::new(Vec::new()),
			reject: AtomicBool::new(false),
			nonce: AtomicU64::new(0),
		}
	}

	/// Simulate the user rejecting every signature prompt
	pub fn reject_all(&self) {
		self.reject.store(true, Ordering::SeqCst);
	}

	pub fn sent_transactions(&self) -> Vec<TxRequest> {
		lock(&self.sent).clone()
	}

	pub fn send_count(&self) -> usize {
		lock(&self.sent).len()
	}
}

#[async_trait]
impl TransactionSigner for MockSigner {
	fn address(&self) -> Address {
		self.address
	}

	fn chain_id(&self) -> u64 {
		self.chain_id.load(Ordering::SeqCst)
	}

	async fn send_transaction(&self, tx: TxRequest) -> ProviderResult<B256> {
		if self.reject.load(Ordering::SeqCst) {
			return Err(ProviderError::UserRejected);
		}
		lock(&self.sent).push(tx);
		let nonce = self.nonce.fetch_add(1, Ordering::SeqCst) + 1;
		Ok(B256::left_padding_from(&nonce.to_be_bytes()))
	}
}

/// Wallet connected to a switchable chain
#[derive(Debug)]
pub struct MockWallet {
	chain_id: Arc<AtomicU64>,
	signer: Arc<MockSigner>,
	signer_requests: AtomicUsize,
}

impl MockWallet {
	pub fn new(address: Address, chain_id: u64) -> Self {
		let chain = Arc::new(AtomicU64::new(chain_id));
		Self {
			signer: Arc::new(MockSigner::sharing_chain(address, chain.clone())),
			chain_id: chain,
			signer_requests: AtomicUsize::new(0),
		}
	}

	/// Simulate the user switching networks in their wallet
	pub fn switch_chain(&self, chain_id: u64) {
		self.chain_id.store(chain_id, Ordering::SeqCst);
	}

	pub fn signer_handle(&self) -> Arc<MockSigner> {
		self.signer.clone()
	}

	/// How many times a signer was handed out
	pub fn signer_requests(&self) -> usize {
		self.signer_requests.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl WalletBackend for MockWallet {
	fn kind(&self) -> &str {
		"mock"
	}

	async fn active_chain_id(&self) -> ProviderResult<u64> {
		Ok(self.chain_id.load(Ordering::SeqCst))
	}

	async fn signer(&self) -> ProviderResult<Arc<dyn TransactionSigner>> {
		self.signer_requests.fetch_add(1, Ordering::SeqCst);
		Ok(self.signer.clone())
	}
}

/// Signer provider over the given read providers, optionally with a connected wallet
pub async fn signer_provider_with(
	read_providers: Vec<Arc<MockReadProvider>>,
	wallet: Option<Arc<MockWallet>>,
) -> WalletSignerProvider {
	let cache = ReadProviderCache::default();
	for provider in read_providers {
		cache.insert(provider);
	}
	let signer_provider = WalletSignerProvider::new(Arc::new(cache));
	if let Some(wallet) = wallet {
		signer_provider.connect(wallet).await;
	}
	signer_provider
}
