//! Settings presets for integration tests

use swap_router::config::{CircuitBreakerSettings, LogFormat, LoggingSettings, Settings};

#[allow(dead_code)]
pub struct TestConfigs;

#[allow(dead_code)]
impl TestConfigs {
	/// Defaults without any RPC endpoints
	pub fn default_settings() -> Settings {
		Settings {
			logging: LoggingSettings {
				level: "debug".to_string(),
				format: LogFormat::Compact,
				structured: false,
			},
			..Default::default()
		}
	}

	/// Only the given strategies, in order
	pub fn with_strategies(names: &[&str]) -> Settings {
		let mut settings = Self::default_settings();
		settings.router.strategy_order = names.iter().map(|n| n.to_string()).collect();
		settings
	}

	/// Breaker that opens after `failures` and closes after one good trial
	pub fn strict_breaker(failures: u32, timeout_seconds: u64) -> CircuitBreakerSettings {
		CircuitBreakerSettings {
			enabled: true,
			failure_threshold: failures,
			success_threshold: 1,
			timeout_seconds,
			max_timeout_seconds: timeout_seconds * 8,
			half_open_max_calls: 1,
			overrides: Vec::new(),
		}
	}
}
