//! Shared mocks and fixtures for the integration tests

pub mod aggregator;
pub mod configs;

#[allow(unused_imports)]
pub use aggregator::StubAggregatorApi;
