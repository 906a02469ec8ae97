//! Read-only provider cache keyed by chain id
//!
//! Built once at startup and shared by every strategy. Entries are created lazily with an
//! atomic insert-if-absent and never replaced afterwards.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use swap_types::{ProviderError, ProviderResult, ReadProvider};
use tracing::debug;

use crate::json_rpc::JsonRpcReadProvider;

/// Where to reach a chain's JSON-RPC node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcEndpoint {
	pub chain_id: u64,
	pub url: String,
	pub timeout: Duration,
}

impl RpcEndpoint {
	pub fn new(chain_id: u64, url: impl Into<String>, timeout: Duration) -> Self {
		Self {
			chain_id,
			url: url.into(),
			timeout,
		}
	}
}

#[derive(Debug, Default)]
pub struct ReadProviderCache {
	endpoints: HashMap<u64, RpcEndpoint>,
	providers: DashMap<u64, Arc<dyn ReadProvider>>,
}

impl ReadProviderCache {
	pub fn new(endpoints: impl IntoIterator<Item = RpcEndpoint>) -> Self {
		Self {
			endpoints: endpoints
				.into_iter()
				.map(|endpoint| (endpoint.chain_id, endpoint))
				.collect(),
			providers: DashMap::new(),
		}
	}

	/// Register a ready-made provider, keeping any existing entry for the chain
	pub fn insert(&self, provider: Arc<dyn ReadProvider>) -> Arc<dyn ReadProvider> {
		self.providers
			.entry(provider.chain_id())
			.or_insert(provider)
			.value()
			.clone()
	}

	/// Cached provider for a chain, created from its endpoint on first use
	pub fn get(&self, chain_id: u64) -> ProviderResult<Arc<dyn ReadProvider>> {
		if let Some(existing) = self.providers.get(&chain_id) {
			return Ok(existing.value().clone());
		}

		let entry = self.providers.entry(chain_id).or_try_insert_with(|| {
			let endpoint = self
				.endpoints
				.get(&chain_id)
				.ok_or(ProviderError::NoRpcConfigured { chain_id })?;
			debug!("creating read provider for chain {} at {}", chain_id, endpoint.url);
			let provider = JsonRpcReadProvider::http(chain_id, &endpoint.url, endpoint.timeout)?;
			Ok::<Arc<dyn ReadProvider>, ProviderError>(Arc::new(provider))
		})?;
		Ok(entry.value().clone())
	}

	pub fn has_endpoint(&self, chain_id: u64) -> bool {
		self.endpoints.contains_key(&chain_id) || self.providers.contains_key(&chain_id)
	}

	/// Number of providers created so far
	pub fn len(&self) -> usize {
		self.providers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::MockReadProvider;

	#[test]
	fn test_unknown_chain_reports_missing_rpc() {
		let cache = ReadProviderCache::new(vec![]);
		let err = cache.get(42220).unwrap_err();
		assert_eq!(err, ProviderError::NoRpcConfigured { chain_id: 42220 });
		assert!(cache.is_empty());
	}

	#[tokio::test]
	async fn test_provider_created_once_per_chain() {
		let cache = ReadProviderCache::new(vec![RpcEndpoint::new(
			42220,
			"https://forno.celo.org",
			Duration::from_secs(5),
		)]);

		let first = cache.get(42220).unwrap();
		let second = cache.get(42220).unwrap();
		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(first.chain_id(), 42220);
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn test_insert_keeps_first_provider() {
		let cache = ReadProviderCache::default();
		let first: Arc<dyn ReadProvider> = Arc::new(MockReadProvider::new(1));
		let second: Arc<dyn ReadProvider> = Arc::new(MockReadProvider::new(1));

		let kept = cache.insert(first.clone());
		let kept_again = cache.insert(second);
		assert!(Arc::ptr_eq(&kept, &first));
		assert!(Arc::ptr_eq(&kept_again, &first));
		assert!(cache.has_endpoint(1));
	}
}
