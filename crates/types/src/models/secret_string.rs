//! Venue credentials that never reach logs
//!
//! Aggregator API keys are loaded from configuration and attached to outgoing quote
//! requests. The wrapper zeroizes its buffer on drop and redacts itself everywhere
//! it could be printed or serialized.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secret value such as a venue API key
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
	inner: String,
}

impl SecretString {
	pub fn new(secret: impl Into<String>) -> Self {
		Self {
			inner: secret.into(),
		}
	}

	/// Borrow the raw secret, e.g. to build an `Authorization` header
	pub fn expose_secret(&self) -> &str {
		&self.inner
	}

	pub fn is_empty(&self) -> bool {
		self.inner.trim().is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SecretString([REDACTED])")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[REDACTED]")
	}
}

impl From<String> for SecretString {
	fn from(secret: String) -> Self {
		Self::new(secret)
	}
}

impl From<&str> for SecretString {
	fn from(secret: &str) -> Self {
		Self::new(secret)
	}
}

impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str("[REDACTED]")
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(SecretString::new)
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl Eq for SecretString {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_secret_is_redacted_when_printed() {
		let key = SecretString::new("aggregator-key-123");
		assert_eq!(format!("{}", key), "[REDACTED]");
		assert!(!format!("{:?}", key).contains("aggregator-key-123"));
		assert_eq!(key.expose_secret(), "aggregator-key-123");
	}

	#[test]
	fn test_secret_round_trips_through_config_but_not_out() {
		let key: SecretString = serde_json::from_str("\"abc\"").unwrap();
		assert_eq!(key.expose_secret(), "abc");
		assert_eq!(serde_json::to_string(&key).unwrap(), "\"[REDACTED]\"");
	}

	#[test]
	fn test_blank_secret_is_empty() {
		assert!(SecretString::new("   ").is_empty());
		assert!(!SecretString::new("k").is_empty());
	}
}
