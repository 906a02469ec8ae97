//! Guided manual swaps
//!
//! Where no programmatic venue can take the swap the router hands back instructions for
//! doing it by hand. This is an outcome, not an error: nothing is sent and nothing is
//! retried. Any routable chain with a configured venue qualifies, so a native AMM chain
//! can still fall through here when its pool discovery is down.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use swap_config::{GuidedSettings, GuidedVenueSettings};
use swap_types::{
	chain_name, chain_type, EstimateOutcome, ExecutionOutcome, GuidedInstructions,
	StrategyResult, SwapCallbacks, SwapRequest, SwapStrategy, TokenRegistry,
};
use tracing::debug;

use crate::common::{resolve_request, unsupported_pair};

#[derive(Debug)]
pub struct GuidedManualStrategy {
	name: String,
	venues: HashMap<u64, GuidedVenueSettings>,
	default_slippage_bps: u32,
	tokens: Arc<TokenRegistry>,
}

impl GuidedManualStrategy {
	pub fn new(name: impl Into<String>, settings: &GuidedSettings, tokens: Arc<TokenRegistry>) -> Self {
		Self {
			name: name.into(),
			venues: settings
				.venues
				.iter()
				.map(|venue| (venue.chain_id, venue.clone()))
				.collect(),
			default_slippage_bps: settings.default_slippage_bps,
			tokens,
		}
	}

	fn instructions(&self, request: &SwapRequest) -> StrategyResult<GuidedInstructions> {
		let pair = resolve_request(&self.tokens, request)?;
		let venue = self
			.venues
			.get(&request.from_chain_id)
			.ok_or_else(|| unsupported_pair(request, "no guided venue for this chain"))?;
		let slippage_bps = request.slippage_bps.unwrap_or(
			venue
				.recommended_slippage_bps
				.unwrap_or(self.default_slippage_bps),
		);
		let network_name = chain_name(request.from_chain_id);

		let mut instructions = GuidedInstructions {
			venue_name: venue.venue_name.clone(),
			venue_url: venue.venue_url.clone(),
			network_name: network_name.clone(),
			chain_id: request.from_chain_id,
			recommended_slippage_bps: slippage_bps,
			steps: Vec::new(),
		};
		instructions.steps = vec![
			format!("Open {} at {}", venue.venue_name, venue.venue_url),
			format!("Connect your wallet and switch it to {}", network_name),
			format!(
				"Choose {} as the token to sell and {} as the token to receive",
				pair.from.symbol, pair.to.symbol
			),
			format!("Enter {} {} as the amount", request.amount.trim(), pair.from.symbol),
			format!(
				"Set the slippage tolerance to {}%",
				instructions.recommended_slippage_pct()
			),
			"Review the quote and confirm the swap in your wallet".to_string(),
		];
		Ok(instructions)
	}
}

#[async_trait]
impl SwapStrategy for GuidedManualStrategy {
	fn name(&self) -> &str {
		&self.name
	}

	fn supports(&self, request: &SwapRequest) -> bool {
		request.is_same_chain()
			&& chain_type(request.from_chain_id).is_routable()
			&& self.venues.contains_key(&request.from_chain_id)
	}

	fn validate(&self, request: &SwapRequest) -> StrategyResult<()> {
		if !self.supports(request) {
			return Err(unsupported_pair(request, "no guided venue for this route"));
		}
		self.instructions(request).map(|_| ())
	}

	async fn get_estimate(&self, request: &SwapRequest) -> StrategyResult<EstimateOutcome> {
		self.validate(request)?;
		Ok(EstimateOutcome::Guided(self.instructions(request)?))
	}

	async fn execute(
		&self,
		request: &SwapRequest,
		_callbacks: &dyn SwapCallbacks,
	) -> StrategyResult<ExecutionOutcome> {
		self.validate(request)?;
		let instructions = self.instructions(request)?;
		debug!(
			"returning manual instructions for {} on chain {}",
			instructions.venue_name, instructions.chain_id
		);
		Ok(ExecutionOutcome::Guided(instructions))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use swap_types::test_utils::{RecordingCallbacks, SwapRequestBuilder};
	use swap_types::SwapError;

	fn strategy() -> GuidedManualStrategy {
		GuidedManualStrategy::new(
			"guided-manual",
			&GuidedSettings::default(),
			Arc::new(TokenRegistry::with_defaults()),
		)
	}

	#[tokio::test]
	async fn test_instructions_for_testnet_swap() {
		let request = SwapRequestBuilder::new().chain(11155111).amount("25").build();
		let strategy = strategy();
		assert!(strategy.supports(&request));

		let outcome = strategy
			.execute(&request, &RecordingCallbacks::new())
			.await
			.unwrap();
		let ExecutionOutcome::Guided(instructions) = outcome else {
			panic!("expected guided instructions");
		};
		assert_eq!(instructions.venue_name, "Uniswap");
		assert_eq!(instructions.network_name, "Sepolia");
		assert_eq!(instructions.recommended_slippage_bps, 100);
		let steps = instructions.numbered_steps();
		assert_eq!(steps.len(), 6);
		assert!(steps[0].starts_with("1. Open Uniswap"));
		assert!(steps[3].contains("25 USDC"));
		assert!(steps[4].contains("1.00%"));
	}

	#[tokio::test]
	async fn test_estimate_is_guided_not_error() {
		let request = SwapRequestBuilder::new()
			.chain(11155111)
			.slippage_bps(30)
			.build();
		let outcome = strategy().get_estimate(&request).await.unwrap();
		match outcome {
			EstimateOutcome::Guided(instructions) => {
				assert_eq!(instructions.recommended_slippage_bps, 30)
			},
			other => panic!("unexpected {:?}", other),
		}
	}

	#[test]
	fn test_configured_amm_chain_is_guided() {
		let mut settings = GuidedSettings::default();
		settings.venues.push(GuidedVenueSettings {
			chain_id: 42220,
			venue_name: "Mento".to_string(),
			venue_url: "https://app.mento.org".to_string(),
			recommended_slippage_bps: Some(50),
		});
		let strategy = GuidedManualStrategy::new(
			"guided-manual",
			&settings,
			Arc::new(TokenRegistry::with_defaults()),
		);
		let request = SwapRequestBuilder::new()
			.chain(42220)
			.pair("cUSD", "cEUR")
			.build();
		assert!(strategy.supports(&request));
		assert!(strategy.validate(&request).is_ok());
		assert!(!strategy.supports(&SwapRequestBuilder::new().chain(999_999).build()));
	}

	#[test]
	fn test_mainnets_are_not_guided() {
		let strategy = strategy();
		assert!(!strategy.supports(&SwapRequestBuilder::new().build()));
		assert!(!strategy.supports(&SwapRequestBuilder::new().chain(421614).to_chain(11155111).build()));
		assert!(matches!(
			strategy.validate(&SwapRequestBuilder::new().chain(421614).pair("USDC", "EURC").build()),
			Err(SwapError::TokenNotFound { chain_id: 421614, .. })
		));
	}
}
