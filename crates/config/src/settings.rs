//! Configuration settings structures

use crate::configurable_value::{ConfigurableValue, ConfigurableValueError};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use swap_types::{CircuitBreakerPolicy, FiatPeg, SecretString, TokenInfo};
use thiserror::Error;

/// Strategy names recognised in `router.strategy_order`
pub mod strategy_names {
	pub const DIRECT_POOL: &str = "direct-pool";
	pub const AGGREGATOR: &str = "aggregator";
	pub const FALLBACK_PRICING: &str = "fallback-pricing";
	pub const GUIDED_MANUAL: &str = "guided-manual";

	pub const ALL: &[&str] = &[DIRECT_POOL, AGGREGATOR, FALLBACK_PRICING, GUIDED_MANUAL];
}

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
	#[serde(default)]
	pub logging: LoggingSettings,
	#[serde(default)]
	pub circuit_breaker: CircuitBreakerSettings,
	#[serde(default)]
	pub router: RouterSettings,
	/// Read-only RPC endpoints per chain
	#[serde(default)]
	pub networks: Vec<NetworkSettings>,
	#[serde(default)]
	pub aggregator: AggregatorSettings,
	#[serde(default)]
	pub direct_pool: DirectPoolSettings,
	#[serde(default)]
	pub guided: GuidedSettings,
	#[serde(default)]
	pub fallback_pricing: FallbackPricingSettings,
	/// Tokens added to (or overriding) the built-in registry
	#[serde(default)]
	pub tokens: Vec<TokenSettings>,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
			structured: false,
		}
	}
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// Circuit breaker defaults plus per-strategy overrides
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CircuitBreakerSettings {
	pub enabled: bool,
	/// Consecutive failures that open the circuit
	pub failure_threshold: u32,
	/// Consecutive half-open successes that close it again
	pub success_threshold: u32,
	/// Base open period before the first recovery trial
	pub timeout_seconds: u64,
	/// Cap for the exponentially growing open period
	pub max_timeout_seconds: u64,
	pub half_open_max_calls: u32,
	pub overrides: Vec<CircuitBreakerOverride>,
}

impl Default for CircuitBreakerSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			failure_threshold: 5,
			success_threshold: 2,
			timeout_seconds: 30,
			max_timeout_seconds: 600,
			half_open_max_calls: 1,
			overrides: Vec::new(),
		}
	}
}

/// Settings for one strategy's breaker; unset fields inherit the defaults
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CircuitBreakerOverride {
	pub strategy: String,
	pub enabled: Option<bool>,
	pub failure_threshold: Option<u32>,
	pub success_threshold: Option<u32>,
	pub timeout_seconds: Option<u64>,
	pub max_timeout_seconds: Option<u64>,
	pub half_open_max_calls: Option<u32>,
}

impl CircuitBreakerSettings {
	/// Default policy, ignoring overrides
	pub fn default_policy(&self) -> CircuitBreakerPolicy {
		CircuitBreakerPolicy {
			enabled: self.enabled,
			failure_threshold: self.failure_threshold,
			success_threshold: self.success_threshold,
			timeout: Duration::from_secs(self.timeout_seconds),
			max_timeout: Duration::from_secs(self.max_timeout_seconds),
			half_open_max_calls: self.half_open_max_calls,
		}
	}

	/// Effective policy for a strategy name
	pub fn policy_for(&self, strategy: &str) -> CircuitBreakerPolicy {
		let mut policy = self.default_policy();
		if let Some(o) = self.overrides.iter().find(|o| o.strategy == strategy) {
			if let Some(enabled) = o.enabled {
				policy.enabled = enabled;
			}
			if let Some(v) = o.failure_threshold {
				policy.failure_threshold = v;
			}
			if let Some(v) = o.success_threshold {
				policy.success_threshold = v;
			}
			if let Some(v) = o.timeout_seconds {
				policy.timeout = Duration::from_secs(v);
			}
			if let Some(v) = o.max_timeout_seconds {
				policy.max_timeout = Duration::from_secs(v);
			}
			if let Some(v) = o.half_open_max_calls {
				policy.half_open_max_calls = v;
			}
		}
		policy
	}
}

/// Router configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RouterSettings {
	/// Strategy registration order; earlier entries win ties
	pub strategy_order: Vec<String>,
	/// Try the next supporting strategy when the selected venue is unreachable
	pub fall_through_on_unavailable: bool,
}

impl Default for RouterSettings {
	fn default() -> Self {
		Self {
			strategy_order: vec![
				strategy_names::DIRECT_POOL.to_string(),
				strategy_names::FALLBACK_PRICING.to_string(),
				strategy_names::AGGREGATOR.to_string(),
				strategy_names::GUIDED_MANUAL.to_string(),
			],
			fall_through_on_unavailable: true,
		}
	}
}

/// RPC endpoint for one chain
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NetworkSettings {
	pub chain_id: u64,
	pub rpc_url: String,
	#[serde(default = "default_rpc_timeout_ms")]
	pub timeout_ms: u64,
}

fn default_rpc_timeout_ms() -> u64 {
	10_000
}

/// HTTP aggregator configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AggregatorSettings {
	pub enabled: bool,
	pub base_url: String,
	/// Sent as a bearer token when present
	pub api_key: Option<ConfigurableValue>,
	pub timeout_ms: u64,
	pub default_slippage_bps: u32,
	/// Optional integrator tag appended to quote requests
	pub integrator: Option<String>,
	/// Client cache lifetime
	pub client_ttl_seconds: u64,
}

impl Default for AggregatorSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			base_url: "https://api.1inch.dev/swap/v6.0".to_string(),
			api_key: None,
			timeout_ms: 5_000,
			default_slippage_bps: 50,
			integrator: None,
			client_ttl_seconds: 300,
		}
	}
}

impl AggregatorSettings {
	/// Resolve the API key, `None` when unset or blank
	pub fn resolve_api_key(&self) -> Result<Option<SecretString>, ConfigurableValueError> {
		match &self.api_key {
			Some(value) => {
				let secret = value.resolve_for_secret()?;
				Ok((!secret.is_empty()).then_some(secret))
			},
			None => Ok(None),
		}
	}
}

/// Stable-swap venue deployment on one chain
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DirectPoolChainSettings {
	pub chain_id: u64,
	/// Candidate entry-point (address provider) contracts, probed in order
	pub address_provider_candidates: Vec<Address>,
	/// Index of the stable-swap registry inside the address provider
	#[serde(default)]
	pub registry_index: u64,
}

/// Direct pool strategy configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DirectPoolSettings {
	pub enabled: bool,
	pub venue_name: String,
	pub chains: Vec<DirectPoolChainSettings>,
	/// Upper bound on pools enumerated per registry
	pub max_pools_scanned: u64,
	/// Published venue fee in basis points, used by the analytical estimate
	pub fee_bps: u32,
	pub default_slippage_bps: u32,
	/// Quote near-parity pairs analytically when the live quote call fails
	pub analytical_fallback: bool,
	/// Gas units assumed for an `exchange` call when estimation fails
	pub swap_gas_limit: u64,
}

impl Default for DirectPoolSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			venue_name: "Curve".to_string(),
			chains: vec![DirectPoolChainSettings {
				chain_id: 42220,
				address_provider_candidates: vec![
					alloy_primitives::address!("5ffe7fb82894076ecb99a30d6a32e969e6e35e98"),
					alloy_primitives::address!("0000000022d53366457f9d5e68ec105046fc4383"),
				],
				registry_index: 0,
			}],
			max_pools_scanned: 64,
			fee_bps: 4,
			default_slippage_bps: 50,
			analytical_fallback: true,
			swap_gas_limit: 180_000,
		}
	}
}

/// Manual venue for one chain
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GuidedVenueSettings {
	pub chain_id: u64,
	pub venue_name: String,
	pub venue_url: String,
	pub recommended_slippage_bps: Option<u32>,
}

/// Guided-manual strategy configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GuidedSettings {
	pub enabled: bool,
	pub default_slippage_bps: u32,
	pub venues: Vec<GuidedVenueSettings>,
}

impl Default for GuidedSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			default_slippage_bps: 100,
			venues: vec![
				GuidedVenueSettings {
					chain_id: 11155111,
					venue_name: "Uniswap".to_string(),
					venue_url: "https://app.uniswap.org/swap?chain=sepolia".to_string(),
					recommended_slippage_bps: None,
				},
				GuidedVenueSettings {
					chain_id: 421614,
					venue_name: "Uniswap".to_string(),
					venue_url: "https://app.uniswap.org/swap?chain=arbitrum_sepolia".to_string(),
					recommended_slippage_bps: None,
				},
			],
		}
	}
}

/// Analytical pricing wrapper around the aggregator
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FallbackPricingSettings {
	pub enabled: bool,
	/// Published fee applied to near-parity pairs when the live quote fails
	pub fee_bps: u32,
}

impl Default for FallbackPricingSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			fee_bps: 4,
		}
	}
}

/// Extra token registry entry
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenSettings {
	pub symbol: String,
	pub address: Address,
	pub decimals: u8,
	pub chain_id: u64,
	#[serde(default)]
	pub peg: Option<FiatPeg>,
}

impl From<&TokenSettings> for TokenInfo {
	fn from(t: &TokenSettings) -> Self {
		TokenInfo::new(t.symbol.clone(), t.address, t.decimals, t.chain_id, t.peg)
	}
}

/// Problems found by [`Settings::validate`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
	#[error("Unknown strategy '{name}' in router.strategy_order")]
	UnknownStrategy { name: String },

	#[error("Strategy '{name}' listed more than once in router.strategy_order")]
	DuplicateStrategy { name: String },

	#[error("Invalid value for {field}: {reason}")]
	InvalidValue { field: String, reason: String },

	#[error("Invalid URL for {field}: {url}")]
	InvalidUrl { field: String, url: String },
}

fn check_bps(field: &str, bps: u32, errors: &mut Vec<ConfigValidationError>) {
	if bps >= 10_000 {
		errors.push(ConfigValidationError::InvalidValue {
			field: field.to_string(),
			reason: format!("{} bps must be below 10000", bps),
		});
	}
}

fn check_url(field: &str, url: &str, errors: &mut Vec<ConfigValidationError>) {
	let ok = url.starts_with("https://")
		|| url.starts_with("http://localhost")
		|| url.starts_with("http://127.0.0.1");
	if !ok {
		errors.push(ConfigValidationError::InvalidUrl {
			field: field.to_string(),
			url: url.to_string(),
		});
	}
}

impl Settings {
	/// Collect every configuration problem instead of stopping at the first
	pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
		let mut errors = Vec::new();

		let mut seen = Vec::new();
		for name in &self.router.strategy_order {
			if !strategy_names::ALL.contains(&name.as_str()) {
				errors.push(ConfigValidationError::UnknownStrategy { name: name.clone() });
			} else if seen.contains(&name) {
				errors.push(ConfigValidationError::DuplicateStrategy { name: name.clone() });
			}
			seen.push(name);
		}

		let cb = &self.circuit_breaker;
		if cb.failure_threshold == 0 {
			errors.push(ConfigValidationError::InvalidValue {
				field: "circuit_breaker.failure_threshold".to_string(),
				reason: "must be at least 1".to_string(),
			});
		}
		if cb.success_threshold == 0 {
			errors.push(ConfigValidationError::InvalidValue {
				field: "circuit_breaker.success_threshold".to_string(),
				reason: "must be at least 1".to_string(),
			});
		}
		if cb.half_open_max_calls == 0 {
			errors.push(ConfigValidationError::InvalidValue {
				field: "circuit_breaker.half_open_max_calls".to_string(),
				reason: "must be at least 1".to_string(),
			});
		}
		if cb.max_timeout_seconds < cb.timeout_seconds {
			errors.push(ConfigValidationError::InvalidValue {
				field: "circuit_breaker.max_timeout_seconds".to_string(),
				reason: "must not be below timeout_seconds".to_string(),
			});
		}

		for network in &self.networks {
			check_url(
				&format!("networks[{}].rpc_url", network.chain_id),
				&network.rpc_url,
				&mut errors,
			);
		}

		if self.aggregator.enabled {
			check_url("aggregator.base_url", &self.aggregator.base_url, &mut errors);
		}
		check_bps(
			"aggregator.default_slippage_bps",
			self.aggregator.default_slippage_bps,
			&mut errors,
		);
		check_bps(
			"direct_pool.default_slippage_bps",
			self.direct_pool.default_slippage_bps,
			&mut errors,
		);
		check_bps("direct_pool.fee_bps", self.direct_pool.fee_bps, &mut errors);
		check_bps(
			"guided.default_slippage_bps",
			self.guided.default_slippage_bps,
			&mut errors,
		);
		check_bps(
			"fallback_pricing.fee_bps",
			self.fallback_pricing.fee_bps,
			&mut errors,
		);

		if self.direct_pool.max_pools_scanned == 0 {
			errors.push(ConfigValidationError::InvalidValue {
				field: "direct_pool.max_pools_scanned".to_string(),
				reason: "must be at least 1".to_string(),
			});
		}
		for venue in &self.guided.venues {
			check_url(
				&format!("guided.venues[{}].venue_url", venue.chain_id),
				&venue.venue_url,
				&mut errors,
			);
		}

		if errors.is_empty() {
			Ok(())
		} else {
			Err(errors)
		}
	}

	/// RPC endpoint for a chain
	pub fn rpc_url(&self, chain_id: u64) -> Option<&str> {
		self.networks
			.iter()
			.find(|n| n.chain_id == chain_id)
			.map(|n| n.rpc_url.as_str())
	}

	/// Built-in tokens plus configured extras
	pub fn token_registry(&self) -> swap_types::TokenRegistry {
		let mut registry = swap_types::TokenRegistry::with_defaults();
		for token in &self.tokens {
			registry.insert(token.into());
		}
		registry
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_settings_are_valid() {
		let settings = Settings::default();
		assert!(settings.validate().is_ok());
		assert_eq!(settings.router.strategy_order.len(), 4);
		assert_eq!(settings.router.strategy_order[0], strategy_names::DIRECT_POOL);
	}

	#[test]
	fn test_validation_collects_all_errors() {
		let mut settings = Settings::default();
		settings.router.strategy_order = vec![
			"aggregator".to_string(),
			"aggregator".to_string(),
			"teleporter".to_string(),
		];
		settings.circuit_breaker.failure_threshold = 0;
		settings.aggregator.base_url = "ftp://example.com".to_string();
		settings.fallback_pricing.fee_bps = 10_000;

		let errors = settings.validate().unwrap_err();
		assert_eq!(errors.len(), 5);
		assert!(errors.contains(&ConfigValidationError::DuplicateStrategy {
			name: "aggregator".to_string()
		}));
		assert!(errors.contains(&ConfigValidationError::UnknownStrategy {
			name: "teleporter".to_string()
		}));
	}

	#[test]
	fn test_override_applies_to_named_strategy_only() {
		let mut cb = CircuitBreakerSettings::default();
		cb.overrides.push(CircuitBreakerOverride {
			strategy: "aggregator".to_string(),
			failure_threshold: Some(2),
			timeout_seconds: Some(5),
			..Default::default()
		});

		let aggregator = cb.policy_for("aggregator");
		assert_eq!(aggregator.failure_threshold, 2);
		assert_eq!(aggregator.timeout, Duration::from_secs(5));
		assert_eq!(aggregator.success_threshold, 2);

		let direct = cb.policy_for("direct-pool");
		assert_eq!(direct.failure_threshold, 5);
		assert_eq!(direct.timeout, Duration::from_secs(30));
	}

	#[test]
	fn test_configured_tokens_extend_registry() {
		let mut settings = Settings::default();
		settings.tokens.push(TokenSettings {
			symbol: "cCOP".to_string(),
			address: Address::repeat_byte(0x11),
			decimals: 18,
			chain_id: 42220,
			peg: None,
		});
		let registry = settings.token_registry();
		assert!(registry.contains(42220, "ccop"));
		assert!(registry.contains(42220, "cUSD"));
	}

	#[test]
	fn test_blank_api_key_resolves_to_none() {
		let mut aggregator = AggregatorSettings::default();
		assert!(aggregator.resolve_api_key().unwrap().is_none());

		aggregator.api_key = Some(ConfigurableValue::from_plain("  "));
		assert!(aggregator.resolve_api_key().unwrap().is_none());

		aggregator.api_key = Some(ConfigurableValue::from_plain("k-123"));
		assert_eq!(
			aggregator.resolve_api_key().unwrap().unwrap().expose_secret(),
			"k-123"
		);
	}
}
