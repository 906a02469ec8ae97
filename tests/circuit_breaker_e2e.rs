//! End-to-end tests for the per-strategy circuit breakers
//!
//! An aggregator outage is driven through the built router with the tokio clock paused, so
//! open periods elapse deterministically.

use std::sync::Arc;
use std::time::Duration;
use swap_router::{ErrorKind, SwapRouterApp, SwapRouterBuilder};
use swap_types::test_utils::SwapRequestBuilder;
use swap_types::{CircuitState, EstimateSource};

mod mocks;
use mocks::{configs::TestConfigs, StubAggregatorApi};

async fn build(names: &[&str], api: Arc<StubAggregatorApi>, fall_through: bool) -> SwapRouterApp {
	let mut settings = TestConfigs::with_strategies(names);
	settings.circuit_breaker = TestConfigs::strict_breaker(2, 5);
	settings.router.fall_through_on_unavailable = fall_through;
	SwapRouterBuilder::new()
		.with_settings(settings)
		.with_aggregator_api(api)
		.build()
		.await
		.expect("router builds")
}

#[tokio::test(start_paused = true)]
async fn test_outage_opens_then_recovers() {
	let api = Arc::new(StubAggregatorApi::down());
	let app = build(&["aggregator"], api.clone(), false).await;
	let request = SwapRequestBuilder::new().pair("USDC", "WETH").build();

	for _ in 0..2 {
		let err = app.router.get_estimate(&request).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::VenueUnavailable);
	}

	// open: rejected without reaching the venue
	let err = app.router.get_estimate(&request).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::CircuitOpen);
	assert!(err.is_retryable());
	assert_eq!(api.quote_calls(), 2);

	let snapshot = &app.router.breaker_snapshots()[0];
	assert_eq!(snapshot.name, "aggregator");
	assert_eq!(snapshot.state, CircuitState::Open);
	assert_eq!(snapshot.total_rejections, 1);

	api.set_live(42_000_000_000_000_000);
	tokio::time::advance(Duration::from_secs(4)).await;
	assert_eq!(
		app.router.get_estimate(&request).await.unwrap_err().kind(),
		ErrorKind::CircuitOpen
	);

	tokio::time::advance(Duration::from_secs(1)).await;
	let estimate = app.router.get_estimate(&request).await.unwrap();
	assert_eq!(estimate.estimate().unwrap().expected_output, "0.042");
	assert_eq!(app.router.breaker_snapshots()[0].state, CircuitState::Closed);
	assert_eq!(api.quote_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_failed_recovery_doubles_open_period() {
	let api = Arc::new(StubAggregatorApi::down());
	let app = build(&["aggregator"], api.clone(), false).await;
	let request = SwapRequestBuilder::new().pair("USDC", "WETH").build();

	for _ in 0..2 {
		let _ = app.router.get_estimate(&request).await;
	}
	tokio::time::advance(Duration::from_secs(5)).await;

	// half-open trial fails and the circuit reopens for twice as long
	let err = app.router.get_estimate(&request).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::VenueUnavailable);
	let snapshot = &app.router.breaker_snapshots()[0];
	assert_eq!(snapshot.state, CircuitState::Open);
	assert_eq!(snapshot.recovery_attempts, 1);
	assert_eq!(snapshot.current_timeout_ms, 10_000);

	api.set_live(1_000_000);
	tokio::time::advance(Duration::from_secs(5)).await;
	assert_eq!(
		app.router.get_estimate(&request).await.unwrap_err().kind(),
		ErrorKind::CircuitOpen
	);
	tokio::time::advance(Duration::from_secs(5)).await;
	assert!(app.router.get_estimate(&request).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_open_aggregator_falls_through_to_fallback_pricing() {
	let api = Arc::new(StubAggregatorApi::down());
	let app = build(&["aggregator", "fallback-pricing"], api.clone(), true).await;
	let request = SwapRequestBuilder::new().pair("USDC", "EURC").build();

	for _ in 0..3 {
		let outcome = app.router.get_estimate(&request).await.unwrap();
		let estimate = outcome.estimate().unwrap();
		assert_eq!(estimate.strategy, "fallback-pricing");
		assert_eq!(estimate.source, EstimateSource::Analytical);
		assert_eq!(estimate.expected_output, "99.96");
	}

	let snapshots = app.router.breaker_snapshots();
	assert_eq!(snapshots.len(), 2);
	assert_eq!(snapshots[0].name, "aggregator");
	assert_eq!(snapshots[0].state, CircuitState::Open);
	assert_eq!(snapshots[1].name, "fallback-pricing");
	assert_eq!(snapshots[1].state, CircuitState::Closed);
	assert_eq!(snapshots[1].total_failures, 0);
}

#[tokio::test(start_paused = true)]
async fn test_operator_reset_closes_circuit() {
	let api = Arc::new(StubAggregatorApi::down());
	let app = build(&["aggregator"], api.clone(), false).await;
	let request = SwapRequestBuilder::new().pair("USDC", "WETH").build();

	for _ in 0..2 {
		let _ = app.router.get_estimate(&request).await;
	}
	assert!(app.router.breaker_snapshots()[0].is_open());

	api.set_live(1_000_000);
	assert!(app.router.breakers().reset("aggregator"));
	assert!(app.router.get_estimate(&request).await.is_ok());
	assert_eq!(app.router.breaker_snapshots()[0].state, CircuitState::Closed);
}
