//! Venue credentials read from the environment or the config file
//!
//! The aggregator API key normally names an environment variable so the key never sits
//! in a checked-in file. The resolved key goes straight into a zeroizing [`SecretString`].

use serde::{Deserialize, Serialize};
use swap_types::SecretString;

/// Where a credential comes from
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConfigurableValue {
	#[serde(rename = "type")]
	pub value_type: ValueType,
	/// Variable name for `env`, the credential itself for `plain`
	pub value: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
	Env,
	Plain,
}

impl ConfigurableValue {
	pub fn from_env(var: &str) -> Self {
		Self {
			value_type: ValueType::Env,
			value: var.to_string(),
		}
	}

	pub fn from_plain(value: &str) -> Self {
		Self {
			value_type: ValueType::Plain,
			value: value.to_string(),
		}
	}

	pub fn resolve_for_secret(&self) -> Result<SecretString, ConfigurableValueError> {
		match self.value_type {
			ValueType::Env => std::env::var(&self.value)
				.map(SecretString::new)
				.map_err(|_| ConfigurableValueError::EnvironmentVariableNotFound(self.value.clone())),
			ValueType::Plain => Ok(SecretString::new(self.value.clone())),
		}
	}

	/// Where the value is read from, safe to log
	pub fn source(&self) -> String {
		match self.value_type {
			ValueType::Env => format!("environment variable '{}'", self.value),
			ValueType::Plain => "config file".to_string(),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurableValueError {
	#[error("Environment variable '{0}' not found")]
	EnvironmentVariableNotFound(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_api_key_from_env() {
		std::env::set_var("SWAP_TEST_AGGREGATOR_KEY", "key-from-env");
		let key = ConfigurableValue::from_env("SWAP_TEST_AGGREGATOR_KEY");
		let secret = key.resolve_for_secret().unwrap();
		assert_eq!(secret.expose_secret(), "key-from-env");
		assert_eq!(secret.to_string(), "[REDACTED]");
		assert_eq!(key.source(), "environment variable 'SWAP_TEST_AGGREGATOR_KEY'");
		std::env::remove_var("SWAP_TEST_AGGREGATOR_KEY");
	}

	#[test]
	fn test_missing_env_key_names_the_variable() {
		let err = ConfigurableValue::from_env("SWAP_TEST_UNSET_AGGREGATOR_KEY")
			.resolve_for_secret()
			.unwrap_err();
		assert_eq!(
			err.to_string(),
			"Environment variable 'SWAP_TEST_UNSET_AGGREGATOR_KEY' not found"
		);
	}

	#[test]
	fn test_plain_key_source_hides_value() {
		let key = ConfigurableValue::from_plain("k-123");
		assert_eq!(key.resolve_for_secret().unwrap().expose_secret(), "k-123");
		assert!(!key.source().contains("k-123"));
	}

	#[test]
	fn test_api_key_table_shape() {
		let key: ConfigurableValue =
			serde_json::from_str(r#"{"type":"env","value":"AGGREGATOR_API_KEY"}"#).unwrap();
		assert_eq!(key, ConfigurableValue::from_env("AGGREGATOR_API_KEY"));
		assert!(serde_json::from_str::<ConfigurableValue>(r#"{"type":"vault","value":"x"}"#).is_err());
	}
}
