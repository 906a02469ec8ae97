//! Startup logging for the swap router
//!
//! Prints service, platform and configuration details once at startup so a log capture
//! shows which venues were wired and where the configuration came from.

use crate::Settings;
use std::env;
use tracing::{info, warn};

/// Logs service information at startup
pub fn log_service_info(settings: &Settings, config_path: &str) {
	// Use the root package name, not the current crate
	let service_name = "swap-router";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== Swap Router Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);
	info!("💻 Platform: {} ({})", env::consts::OS, env::consts::ARCH);

	if let Ok(cwd) = env::current_dir() {
		info!("📁 Working Directory: {}", cwd.display());
	}

	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {} (RUST_LOG)", rust_log);
	} else {
		info!("🔧 Log Level: {}", settings.logging.level);
	}

	info!("📋 Config Path: {}", config_path);
	info!(
		"🔌 Networks with RPC: {}",
		if settings.networks.is_empty() {
			"none".to_string()
		} else {
			settings
				.networks
				.iter()
				.map(|n| n.chain_id.to_string())
				.collect::<Vec<_>>()
				.join(", ")
		}
	);

	if settings.circuit_breaker.enabled {
		info!(
			"🛡️ Circuit breaker: {} failures to open, {}s base timeout (max {}s)",
			settings.circuit_breaker.failure_threshold,
			settings.circuit_breaker.timeout_seconds,
			settings.circuit_breaker.max_timeout_seconds
		);
	} else {
		warn!("🛡️ Circuit breaker disabled");
	}

	if let Some(key) = &settings.aggregator.api_key {
		info!("🔑 Aggregator API key from {}", key.source());
	}

	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs the strategies the router was built with, in priority order
pub fn log_startup_complete(strategy_names: &[String]) {
	info!("✅ Swap Router Ready");
	for (position, name) in strategy_names.iter().enumerate() {
		info!("🧭 Strategy #{}: {}", position + 1, name);
	}
}

/// Logs service shutdown information
pub fn log_service_shutdown() {
	info!("🛑 Swap Router Shutting Down");
	info!(
		"🕒 Shutdown at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}
