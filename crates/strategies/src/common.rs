//! Request resolution shared by every strategy

use alloy_primitives::U256;
use std::sync::Arc;
use swap_types::models::amount::parse_units;
use swap_types::{
	chain_type, ChainType, SignerProvider, StrategyResult, SwapError, SwapRequest, TokenInfo,
	TokenRegistry, TransactionSigner,
};

/// A request with both tokens looked up and the amount in base units
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPair {
	pub from: TokenInfo,
	pub to: TokenInfo,
	pub amount_in: U256,
}

impl ResolvedPair {
	pub fn chain_id(&self) -> u64 {
		self.from.chain_id
	}
}

/// Look up both tokens and parse the amount at the source token's precision
pub fn resolve_request(
	tokens: &TokenRegistry,
	request: &SwapRequest,
) -> StrategyResult<ResolvedPair> {
	request.validate_shape()?;
	let from = tokens.require(request.from_chain_id, &request.from_token)?.clone();
	let to = tokens.require(request.to_chain_id, &request.to_token)?.clone();
	let amount_in = parse_units(&request.amount, from.decimals)?;
	Ok(ResolvedPair {
		from,
		to,
		amount_in,
	})
}

/// Same-chain request on a chain of the given type with both tokens registered.
/// Pure lookup, usable from `supports`.
pub fn same_chain_pair_known(
	tokens: &TokenRegistry,
	request: &SwapRequest,
	expected: ChainType,
) -> bool {
	request.is_same_chain()
		&& chain_type(request.from_chain_id) == expected
		&& tokens.contains(request.from_chain_id, &request.from_token)
		&& tokens.contains(request.to_chain_id, &request.to_token)
}

pub fn unsupported_pair(request: &SwapRequest, reason: impl Into<String>) -> SwapError {
	SwapError::UnsupportedPair {
		from_token: request.from_token.clone(),
		to_token: request.to_token.clone(),
		reason: reason.into(),
	}
}

/// Signer bound to the request's chain, owned by the requesting user
pub async fn signer_for_request(
	signers: &dyn SignerProvider,
	request: &SwapRequest,
) -> StrategyResult<Arc<dyn TransactionSigner>> {
	let signer = signers.get_signer_for_chain(request.from_chain_id).await?;
	if signer.address() != request.user_address {
		return Err(SwapError::InvalidRequest {
			reason: format!(
				"connected account {} does not match request user {}",
				signer.address(),
				request.user_address
			),
		});
	}
	Ok(signer)
}
