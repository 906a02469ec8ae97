//! HTTP client cache for venue APIs
//!
//! One pooled client per venue endpoint and credential set, recreated after a TTL so
//! rotated keys and DNS changes are picked up.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use swap_types::{SecretString, StrategyResult, SwapError};
use tracing::debug;

/// Configuration for creating venue HTTP clients
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientConfig {
	/// Venue name, also used in errors
	pub venue: String,
	pub base_url: String,
	pub timeout_ms: u64,
	/// Maximum number of idle connections per host
	pub max_idle_per_host: usize,
	pub keep_alive_timeout_ms: u64,
	pub headers: Vec<(String, String)>,
}

impl ClientConfig {
	pub fn new(venue: impl Into<String>, base_url: impl Into<String>, timeout_ms: u64) -> Self {
		Self {
			venue: venue.into(),
			base_url: base_url.into(),
			timeout_ms,
			max_idle_per_host: 10,
			keep_alive_timeout_ms: 90_000,
			headers: vec![
				("User-Agent".to_string(), "swap-router/0.1".to_string()),
				("Accept".to_string(), "application/json".to_string()),
			],
		}
	}

	pub fn with_auth(mut self, auth: &AuthConfig) -> Self {
		match auth {
			AuthConfig::None => {},
			AuthConfig::Bearer { token } => {
				self.headers.push((
					"Authorization".to_string(),
					format!("Bearer {}", token.expose_secret()),
				));
			},
			AuthConfig::ApiKey { header, key } => {
				self.headers
					.push((header.clone(), key.expose_secret().to_string()));
			},
		}
		self
	}
}

/// Authentication for a venue API
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
	#[default]
	None,
	Bearer {
		token: SecretString,
	},
	ApiKey {
		header: String,
		key: SecretString,
	},
}

impl AuthConfig {
	pub fn bearer(token: Option<SecretString>) -> Self {
		match token {
			Some(token) => Self::Bearer { token },
			None => Self::None,
		}
	}
}

#[derive(Debug, Clone)]
struct CachedClient {
	client: Arc<Client>,
	created_at: Instant,
}

impl CachedClient {
	fn is_expired(&self, ttl: Duration) -> bool {
		self.created_at.elapsed() > ttl
	}
}

/// Thread-safe cache of HTTP clients keyed by [`ClientConfig`]
#[derive(Clone, Debug)]
pub struct ClientCache {
	clients: Arc<DashMap<ClientConfig, CachedClient>>,
	ttl: Duration,
}

impl ClientCache {
	/// Cache with a 5 minute TTL
	pub fn new() -> Self {
		Self::with_ttl(Duration::from_secs(300))
	}

	pub fn with_ttl(ttl: Duration) -> Self {
		Self {
			clients: Arc::new(DashMap::new()),
			ttl,
		}
	}

	/// Get or create the client for `config`
	pub fn get_client(&self, config: &ClientConfig) -> StrategyResult<Arc<Client>> {
		self.clients.remove_if(config, |_, cached| {
			let expired = cached.is_expired(self.ttl);
			if expired {
				debug!(
					"client for {} expired after {:?}",
					config.base_url,
					cached.created_at.elapsed()
				);
			}
			expired
		});

		if let Some(cached) = self.clients.get(config) {
			return Ok(cached.client.clone());
		}

		let client = Arc::new(Self::build_client(config)?);
		match self.clients.entry(config.clone()) {
			Entry::Occupied(entry) => Ok(entry.get().client.clone()),
			Entry::Vacant(entry) => {
				debug!("created http client for {}", config.base_url);
				entry.insert(CachedClient {
					client: client.clone(),
					created_at: Instant::now(),
				});
				Ok(client)
			},
		}
	}

	fn build_client(config: &ClientConfig) -> StrategyResult<Client> {
		let mut headers = HeaderMap::new();
		for (key, value) in &config.headers {
			if let (Ok(name), Ok(value)) = (
				HeaderName::from_bytes(key.as_bytes()),
				HeaderValue::from_str(value),
			) {
				headers.insert(name, value);
			}
		}

		Client::builder()
			.timeout(Duration::from_millis(config.timeout_ms))
			.pool_max_idle_per_host(config.max_idle_per_host)
			.pool_idle_timeout(Duration::from_millis(config.keep_alive_timeout_ms))
			.tcp_keepalive(Duration::from_secs(60))
			.default_headers(headers)
			.build()
			.map_err(|e| SwapError::VenueUnavailable {
				venue: config.venue.clone(),
				reason: format!("cannot build http client: {}", e),
			})
	}

	/// Drop expired clients, returning how many were removed
	pub fn cleanup_expired(&self) -> usize {
		let before = self.clients.len();
		self.clients.retain(|_, cached| !cached.is_expired(self.ttl));
		before.saturating_sub(self.clients.len())
	}

	pub fn len(&self) -> usize {
		self.clients.len()
	}

	pub fn is_empty(&self) -> bool {
		self.clients.is_empty()
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}
}

impl Default for ClientCache {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config() -> ClientConfig {
		ClientConfig::new("aggregator", "https://api.example.com", 5_000)
	}

	#[test]
	fn test_client_reused_per_config() {
		let cache = ClientCache::new();
		let first = cache.get_client(&config()).unwrap();
		let second = cache.get_client(&config()).unwrap();
		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn test_credentials_split_cache_entries() {
		let cache = ClientCache::new();
		let anonymous = cache.get_client(&config()).unwrap();
		let auth = AuthConfig::bearer(Some(SecretString::new("key-1")));
		let authed = cache.get_client(&config().with_auth(&auth)).unwrap();
		assert!(!Arc::ptr_eq(&anonymous, &authed));

		let api_key = AuthConfig::ApiKey {
			header: "X-Api-Key".to_string(),
			key: SecretString::new("key-2"),
		};
		let keyed = config().with_auth(&api_key);
		assert!(keyed
			.headers
			.iter()
			.any(|(k, v)| k == "X-Api-Key" && v == "key-2"));
	}

	#[test]
	fn test_expired_clients_are_recreated() {
		let cache = ClientCache::with_ttl(Duration::from_millis(20));
		let first = cache.get_client(&config()).unwrap();
		std::thread::sleep(Duration::from_millis(40));
		assert_eq!(cache.cleanup_expired(), 1);
		let second = cache.get_client(&config()).unwrap();
		assert!(!Arc::ptr_eq(&first, &second));
	}

	#[test]
	fn test_clones_share_entries() {
		let cache = ClientCache::new();
		let clone = cache.clone();
		let first = cache.get_client(&config()).unwrap();
		let second = clone.get_client(&config()).unwrap();
		assert!(Arc::ptr_eq(&first, &second));
	}
}
