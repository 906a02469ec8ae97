//! Swap strategy contract and progress callbacks

pub mod traits;

pub use traits::{NoopCallbacks, SwapCallbacks, SwapStrategy};

use crate::errors::SwapError;

/// Result type for strategy operations
pub type StrategyResult<T> = Result<T, SwapError>;
