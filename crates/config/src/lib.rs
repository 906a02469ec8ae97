//! Swap Router Configuration
//!
//! Configuration management and startup utilities for the swap routing engine.

pub mod configurable_value;
pub mod loader;
pub mod settings;
pub mod startup_logger;

pub use configurable_value::{ConfigurableValue, ConfigurableValueError, ValueType};
pub use loader::{config_path, load_config, load_config_from, ConfigLoadError};
pub use settings::{
	strategy_names, AggregatorSettings, CircuitBreakerOverride, CircuitBreakerSettings,
	ConfigValidationError, DirectPoolChainSettings, DirectPoolSettings, FallbackPricingSettings,
	GuidedSettings, GuidedVenueSettings, LogFormat, LoggingSettings, NetworkSettings,
	RouterSettings, Settings, TokenSettings,
};
pub use startup_logger::{log_service_info, log_service_shutdown, log_startup_complete};
