//! Circuit breaker for strategy calls
//!
//! One breaker per strategy name. A closed circuit passes calls through and counts
//! consecutive venue failures; at `failure_threshold` it opens and rejects calls outright.
//! After the open period the next call is let through as a trial (half-open). Enough
//! successful trials close the circuit, a failed or stalled trial opens it again with a
//! doubled open period.
//!
//! State lives behind a plain mutex that is never held across an await.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use swap_config::CircuitBreakerSettings;
use swap_types::{CircuitBreakerPolicy, CircuitBreakerSnapshot, CircuitState, SwapError};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Errors the breaker can classify
pub trait BreakerFailure {
	/// Whether this error says the protected venue is unhealthy
	fn counts_as_failure(&self) -> bool;
}

impl BreakerFailure for SwapError {
	fn counts_as_failure(&self) -> bool {
		self.counts_against_venue()
	}
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CircuitBreakerError<E> {
	#[error("Circuit open for {name}, retry in {retry_after:?}")]
	Open { name: String, retry_after: Duration },

	#[error(transparent)]
	Inner(E),
}

impl From<CircuitBreakerError<SwapError>> for SwapError {
	fn from(err: CircuitBreakerError<SwapError>) -> Self {
		match err {
			CircuitBreakerError::Open { name, retry_after } => SwapError::CircuitOpen {
				strategy: name,
				retry_after_ms: retry_after.as_millis() as u64,
			},
			CircuitBreakerError::Inner(inner) => inner,
		}
	}
}

#[derive(Debug)]
struct BreakerState {
	state: CircuitState,
	consecutive_failures: u32,
	consecutive_successes: u32,
	recovery_attempts: u32,
	last_failure_at: Option<DateTime<Utc>>,
	opened_at: Option<DateTime<Utc>>,
	open_until: Option<Instant>,
	/// Trials admitted and not yet finished
	half_open_in_flight: u32,
	/// Stall timer for the current half-open trials
	trial_deadline: Option<Instant>,
	/// Bumped on every transition to open; results of calls admitted earlier are ignored
	generation: u64,
	total_calls: u64,
	total_successes: u64,
	total_failures: u64,
	total_rejections: u64,
}

impl BreakerState {
	fn new() -> Self {
		Self {
			state: CircuitState::Closed,
			consecutive_failures: 0,
			consecutive_successes: 0,
			recovery_attempts: 0,
			last_failure_at: None,
			opened_at: None,
			open_until: None,
			half_open_in_flight: 0,
			trial_deadline: None,
			generation: 0,
			total_calls: 0,
			total_successes: 0,
			total_failures: 0,
			total_rejections: 0,
		}
	}
}

#[derive(Debug, Clone, Copy)]
struct Ticket {
	generation: u64,
	trial: bool,
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
	Success,
	Failure,
	Neutral,
}

/// Breaker protecting one strategy
#[derive(Debug)]
pub struct CircuitBreaker {
	name: String,
	policy: CircuitBreakerPolicy,
	state: Mutex<BreakerState>,
}

impl CircuitBreaker {
	pub fn new(name: impl Into<String>, policy: CircuitBreakerPolicy) -> Self {
		Self {
			name: name.into(),
			policy,
			state: Mutex::new(BreakerState::new()),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn policy(&self) -> &CircuitBreakerPolicy {
		&self.policy
	}

	/// Run `op` if the circuit admits it and record the outcome
	pub async fn call<T, E, F, Fut>(&self, op: F) -> Result<T, CircuitBreakerError<E>>
	where
		E: BreakerFailure,
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, E>>,
	{
		if !self.policy.enabled {
			return op().await.map_err(CircuitBreakerError::Inner);
		}

		let ticket = self.admit()?;
		let result = op().await;
		let outcome = match &result {
			Ok(_) => Outcome::Success,
			Err(e) if e.counts_as_failure() => Outcome::Failure,
			Err(_) => Outcome::Neutral,
		};
		self.record(ticket, outcome);
		result.map_err(CircuitBreakerError::Inner)
	}

	/// Current state, after applying any elapsed timers
	pub fn state(&self) -> CircuitState {
		let mut state = self.lock();
		self.refresh(&mut state, Instant::now());
		state.state
	}

	pub fn snapshot(&self) -> CircuitBreakerSnapshot {
		let mut state = self.lock();
		self.refresh(&mut state, Instant::now());
		CircuitBreakerSnapshot {
			name: self.name.clone(),
			state: state.state,
			consecutive_failures: state.consecutive_failures,
			consecutive_successes: state.consecutive_successes,
			last_failure_at: state.last_failure_at,
			opened_at: state.opened_at,
			recovery_attempts: state.recovery_attempts,
			current_timeout_ms: self
				.policy
				.timeout_for_attempt(state.recovery_attempts)
				.as_millis() as u64,
			total_calls: state.total_calls,
			total_successes: state.total_successes,
			total_failures: state.total_failures,
			total_rejections: state.total_rejections,
		}
	}

	/// Force the circuit closed and clear its history
	pub fn reset(&self) {
		let mut state = self.lock();
		let generation = state.generation + 1;
		*state = BreakerState::new();
		state.generation = generation;
		info!("circuit breaker for {} reset", self.name);
	}

	fn lock(&self) -> MutexGuard<'_, BreakerState> {
		self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	fn admit<E>(&self) -> Result<Ticket, CircuitBreakerError<E>> {
		let now = Instant::now();
		let mut state = self.lock();
		self.refresh(&mut state, now);

		match state.state {
			CircuitState::Closed => {
				state.total_calls += 1;
				Ok(Ticket {
					generation: state.generation,
					trial: false,
				})
			},
			CircuitState::Open => {
				state.total_rejections += 1;
				let retry_after = state
					.open_until
					.map(|until| until.saturating_duration_since(now))
					.unwrap_or_default();
				debug!("circuit for {} open, rejecting call", self.name);
				Err(CircuitBreakerError::Open {
					name: self.name.clone(),
					retry_after,
				})
			},
			CircuitState::HalfOpen => {
				if state.half_open_in_flight >= self.policy.half_open_max_calls {
					state.total_rejections += 1;
					let retry_after = state
						.trial_deadline
						.map(|deadline| deadline.saturating_duration_since(now))
						.unwrap_or_default();
					return Err(CircuitBreakerError::Open {
						name: self.name.clone(),
						retry_after,
					});
				}
				state.half_open_in_flight += 1;
				state.total_calls += 1;
				if state.trial_deadline.is_none() {
					state.trial_deadline =
						Some(now + self.policy.timeout_for_attempt(state.recovery_attempts));
				}
				debug!(
					"circuit for {} admitting trial call ({} in flight)",
					self.name, state.half_open_in_flight
				);
				Ok(Ticket {
					generation: state.generation,
					trial: true,
				})
			},
		}
	}

	fn record(&self, ticket: Ticket, outcome: Outcome) {
		let now = Instant::now();
		let mut state = self.lock();

		match outcome {
			Outcome::Success => state.total_successes += 1,
			Outcome::Failure => {
				state.total_failures += 1;
				state.last_failure_at = Some(Utc::now());
			},
			Outcome::Neutral => {},
		}

		if ticket.generation != state.generation {
			debug!("ignoring result of a call admitted before {} reopened", self.name);
			return;
		}

		if ticket.trial {
			state.half_open_in_flight = state.half_open_in_flight.saturating_sub(1);
			if state.half_open_in_flight == 0 {
				state.trial_deadline = None;
			}
		}

		match (state.state, outcome) {
			(CircuitState::Closed, Outcome::Success) => {
				state.consecutive_failures = 0;
			},
			(CircuitState::Closed, Outcome::Failure) => {
				state.consecutive_failures += 1;
				if state.consecutive_failures >= self.policy.failure_threshold {
					self.open(&mut state, now);
				}
			},
			(CircuitState::HalfOpen, Outcome::Success) => {
				state.consecutive_successes += 1;
				if state.consecutive_successes >= self.policy.success_threshold {
					self.close(&mut state);
				}
			},
			(CircuitState::HalfOpen, Outcome::Failure) => {
				state.consecutive_failures += 1;
				state.recovery_attempts += 1;
				self.open(&mut state, now);
			},
			_ => {},
		}
	}

	/// Apply timers: open period elapsed, or half-open trial stalled
	fn refresh(&self, state: &mut BreakerState, now: Instant) {
		match state.state {
			CircuitState::Open => {
				if state.open_until.is_some_and(|until| now >= until) {
					state.state = CircuitState::HalfOpen;
					state.consecutive_successes = 0;
					state.half_open_in_flight = 0;
					state.trial_deadline = None;
					info!(
						"circuit for {} half-open (recovery attempt {})",
						self.name,
						state.recovery_attempts + 1
					);
				}
			},
			CircuitState::HalfOpen => {
				if state.trial_deadline.is_some_and(|deadline| now >= deadline) {
					warn!("trial call for {} stalled, reopening circuit", self.name);
					state.recovery_attempts += 1;
					self.open(state, now);
				}
			},
			CircuitState::Closed => {},
		}
	}

	fn open(&self, state: &mut BreakerState, now: Instant) {
		let timeout = self.policy.timeout_for_attempt(state.recovery_attempts);
		state.state = CircuitState::Open;
		state.generation += 1;
		state.opened_at = Some(Utc::now());
		state.open_until = Some(now + timeout);
		state.consecutive_successes = 0;
		state.half_open_in_flight = 0;
		state.trial_deadline = None;
		info!(
			"circuit for {} opened after {} consecutive failures (timeout {:?}, attempt {})",
			self.name, state.consecutive_failures, timeout, state.recovery_attempts
		);
	}

	fn close(&self, state: &mut BreakerState) {
		state.state = CircuitState::Closed;
		state.consecutive_failures = 0;
		state.consecutive_successes = 0;
		state.recovery_attempts = 0;
		state.opened_at = None;
		state.open_until = None;
		state.trial_deadline = None;
		info!("circuit for {} closed, recovery complete", self.name);
	}
}

/// Registry of breakers keyed by strategy name
#[derive(Debug)]
pub struct CircuitBreakerManager {
	settings: CircuitBreakerSettings,
	breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl CircuitBreakerManager {
	pub fn new(settings: CircuitBreakerSettings) -> Self {
		Self {
			settings,
			breakers: DashMap::new(),
		}
	}

	/// Breaker for `name`, created on first use
	pub fn breaker(&self, name: &str) -> Arc<CircuitBreaker> {
		if let Some(existing) = self.breakers.get(name) {
			return existing.clone();
		}
		self.breakers
			.entry(name.to_string())
			.or_insert_with(|| Arc::new(CircuitBreaker::new(name, self.settings.policy_for(name))))
			.clone()
	}

	pub fn policy_for(&self, name: &str) -> CircuitBreakerPolicy {
		self.settings.policy_for(name)
	}

	/// Reset one breaker; false when it was never used
	pub fn reset(&self, name: &str) -> bool {
		match self.breakers.get(name) {
			Some(breaker) => {
				breaker.reset();
				true
			},
			None => false,
		}
	}

	pub fn reset_all(&self) {
		for breaker in self.breakers.iter() {
			breaker.reset();
		}
	}

	/// Snapshots of every breaker, sorted by name
	pub fn snapshots(&self) -> Vec<CircuitBreakerSnapshot> {
		let mut snapshots: Vec<_> = self.breakers.iter().map(|b| b.snapshot()).collect();
		snapshots.sort_by(|a, b| a.name.cmp(&b.name));
		snapshots
	}
}
