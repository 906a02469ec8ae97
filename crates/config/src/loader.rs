//! Configuration loading utilities

use crate::settings::{ConfigValidationError, Settings};
use config::{Config, Environment, File};
use thiserror::Error;
use tracing::debug;

/// Default config file stem, resolved as `config/config.{toml,json,yaml}`
pub const DEFAULT_CONFIG_PATH: &str = "config/config";

/// Prefix for environment overrides, e.g. `SWAP_ROUTER__AGGREGATOR__TIMEOUT_MS=3000`
pub const ENV_PREFIX: &str = "SWAP_ROUTER";

#[derive(Error, Debug)]
pub enum ConfigLoadError {
	#[error("Failed to read configuration: {0}")]
	Source(#[from] config::ConfigError),

	#[error("Invalid configuration: {}", format_validation_errors(.0))]
	Validation(Vec<ConfigValidationError>),
}

fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
	errors
		.iter()
		.map(|e| e.to_string())
		.collect::<Vec<_>>()
		.join("; ")
}

/// Path of the config file, honouring `CONFIG_PATH`
pub fn config_path() -> String {
	std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Load configuration from the config file and environment, then validate it
pub fn load_config() -> Result<Settings, ConfigLoadError> {
	load_config_from(&config_path())
}

/// Load configuration from an explicit file path (extension optional)
pub fn load_config_from(path: &str) -> Result<Settings, ConfigLoadError> {
	debug!("loading configuration from {}", path);

	let s = Config::builder()
		.add_source(File::with_name(path).required(false))
		.add_source(
			Environment::with_prefix(ENV_PREFIX)
				.prefix_separator("__")
				.separator("__")
				.try_parsing(true),
		)
		.build()?;

	let settings: Settings = s.try_deserialize()?;
	settings.validate().map_err(ConfigLoadError::Validation)?;
	Ok(settings)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::settings::LogFormat;
	use std::io::Write;

	fn write_temp_config(name: &str, contents: &str) -> std::path::PathBuf {
		let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
		let mut file = std::fs::File::create(&path).unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		path
	}

	#[test]
	fn test_missing_file_yields_defaults() {
		let settings = load_config_from("does/not/exist/config").unwrap();
		assert_eq!(settings.circuit_breaker.failure_threshold, 5);
		assert_eq!(settings.logging.format, LogFormat::Pretty);
	}

	#[test]
	fn test_file_values_override_defaults() {
		let path = write_temp_config(
			"swap-router-loader-ok",
			r#"
[logging]
level = "debug"
format = "json"
structured = true

[circuit_breaker]
failure_threshold = 2
timeout_seconds = 10

[router]
strategy_order = ["aggregator", "guided-manual"]

[[networks]]
chain_id = 42220
rpc_url = "https://forno.celo.org"
"#,
		);

		let settings = load_config_from(path.to_str().unwrap()).unwrap();
		assert_eq!(settings.logging.format, LogFormat::Json);
		assert_eq!(settings.circuit_breaker.failure_threshold, 2);
		assert_eq!(settings.circuit_breaker.success_threshold, 2);
		assert_eq!(settings.router.strategy_order, vec!["aggregator", "guided-manual"]);
		assert_eq!(settings.rpc_url(42220), Some("https://forno.celo.org"));

		std::fs::remove_file(path).ok();
	}

	#[test]
	fn test_invalid_file_reports_validation_errors() {
		let path = write_temp_config(
			"swap-router-loader-bad",
			r#"
[router]
strategy_order = ["carrier-pigeon"]
"#,
		);

		let err = load_config_from(path.to_str().unwrap()).unwrap_err();
		assert!(matches!(err, ConfigLoadError::Validation(ref errors) if errors.len() == 1));
		assert!(err.to_string().contains("carrier-pigeon"));

		std::fs::remove_file(path).ok();
	}
}
