//! Swap Service
//!
//! Per-strategy circuit breakers and the router that dispatches swap requests to the
//! first supporting strategy.

pub mod circuit_breaker;
pub mod router;

pub use circuit_breaker::{
	BreakerFailure, CircuitBreaker, CircuitBreakerError, CircuitBreakerManager,
};
pub use router::SwapRouter;
