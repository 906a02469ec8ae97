//! Circuit breaker types and core data structures
//!
//! One breaker exists per strategy name. These types describe its policy and expose a
//! point-in-time view of its state; the state machine itself lives in the service crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Circuit breaker state machine states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
	/// Normal operation - allow all calls
	Closed,
	/// Reject calls without attempting them
	Open,
	/// Testing recovery - a limited number of trial calls allowed
	HalfOpen,
}

/// Tuning for one breaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerPolicy {
	/// When false the breaker passes every call through and records nothing
	pub enabled: bool,
	/// Consecutive failures that open a closed circuit
	pub failure_threshold: u32,
	/// Consecutive half-open successes that close the circuit
	pub success_threshold: u32,
	/// Open period before the first trial
	pub timeout: Duration,
	/// Cap for the open period after repeated failed recoveries
	pub max_timeout: Duration,
	/// Concurrent trial calls admitted while half-open
	pub half_open_max_calls: u32,
}

impl Default for CircuitBreakerPolicy {
	fn default() -> Self {
		Self {
			enabled: true,
			failure_threshold: 5,
			success_threshold: 2,
			timeout: Duration::from_secs(30),
			max_timeout: Duration::from_secs(600),
			half_open_max_calls: 1,
		}
	}
}

impl CircuitBreakerPolicy {
	/// Open period for the given number of failed recovery attempts.
	///
	/// Doubles per attempt and never exceeds `max_timeout`.
	pub fn timeout_for_attempt(&self, recovery_attempts: u32) -> Duration {
		let multiplier = 2u32.saturating_pow(recovery_attempts.min(16));
		self.timeout
			.checked_mul(multiplier)
			.unwrap_or(self.max_timeout)
			.min(self.max_timeout.max(self.timeout))
	}
}

/// Point-in-time view of a breaker for diagnostics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CircuitBreakerSnapshot {
	/// Strategy name this circuit protects
	pub name: String,
	pub state: CircuitState,
	pub consecutive_failures: u32,
	pub consecutive_successes: u32,
	pub last_failure_at: Option<DateTime<Utc>>,
	pub opened_at: Option<DateTime<Utc>>,
	/// Failed recovery attempts since the circuit last closed
	pub recovery_attempts: u32,
	/// Current open period in milliseconds
	pub current_timeout_ms: u64,
	pub total_calls: u64,
	pub total_successes: u64,
	pub total_failures: u64,
	/// Calls rejected without being attempted
	pub total_rejections: u64,
}

impl CircuitBreakerSnapshot {
	pub fn is_open(&self) -> bool {
		self.state == CircuitState::Open
	}
}
