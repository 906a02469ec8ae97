//! HTTP swap aggregator strategy
//!
//! Quotes and swap payloads come from a 1inch-style REST API:
//! `GET {base}/{chain}/quote`, `GET {base}/{chain}/approve/spender` and
//! `GET {base}/{chain}/swap`. The API sits behind [`AggregatorApi`] so the strategy can be
//! exercised without a network.

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use swap_config::AggregatorSettings;
use swap_providers::{with_gas_buffer, DEFAULT_POLL_INTERVAL};
use swap_types::{
	chain_name, chain_type, ChainType, EstimateOutcome, EstimateSource, ExecutionOutcome,
	SecretString, SignerProvider, StrategyResult, SwapCallbacks, SwapError, SwapEstimate,
	SwapRequest, SwapStrategy, TokenRegistry, TxRequest,
};
use tracing::{debug, info, warn};

use crate::approval::{ensure_allowance, ApprovalRequest};
use crate::client_cache::{AuthConfig, ClientCache, ClientConfig};
use crate::common::{
	resolve_request, same_chain_pair_known, signer_for_request, unsupported_pair, ResolvedPair,
};
use crate::execution::{receipt, submit_swap};
use crate::pricing::{gas_cost, price_impact_pct};

/// Gas assumed for an aggregated swap when the venue does not report one
pub const DEFAULT_SWAP_GAS: u64 = 250_000;

/// Quote query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteParams {
	pub src: Address,
	pub dst: Address,
	/// Source amount in base units
	pub amount: U256,
}

/// Swap payload query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
	pub src: Address,
	pub dst: Address,
	pub amount: U256,
	/// Account that will send the transaction
	pub from: Address,
	pub slippage_bps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorQuote {
	pub dst_amount: U256,
	pub gas: Option<u64>,
}

/// Ready-to-sign swap returned by the venue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorSwap {
	pub dst_amount: U256,
	pub tx: TxRequest,
}

/// Venue REST API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AggregatorApi: Send + Sync + Debug {
	async fn quote(&self, chain_id: u64, params: &QuoteParams) -> StrategyResult<AggregatorQuote>;

	/// Contract that must be approved to pull the source token
	async fn spender(&self, chain_id: u64) -> StrategyResult<Address>;

	async fn swap(&self, chain_id: u64, params: &SwapParams) -> StrategyResult<AggregatorSwap>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
	dst_amount: String,
	#[serde(default)]
	gas: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SpenderResponse {
	address: Address,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
	dst_amount: String,
	tx: SwapTxResponse,
}

#[derive(Debug, Deserialize)]
struct SwapTxResponse {
	from: Address,
	to: Address,
	data: Bytes,
	#[serde(default)]
	value: Option<String>,
	#[serde(default)]
	gas: Option<u64>,
}

/// Slippage in percent with two decimals, e.g. 50 bps -> "0.50"
pub fn bps_to_percent(bps: u32) -> String {
	format!("{}.{:02}", bps / 100, bps % 100)
}

fn parse_amount(venue: &str, field: &str, value: &str) -> StrategyResult<U256> {
	value.trim().parse::<U256>().map_err(|e| SwapError::QuoteProvider {
		venue: venue.to_string(),
		status_code: None,
		reason: format!("invalid {} '{}': {}", field, value, e),
	})
}

/// Map a non-2xx response, keeping the body verbatim
fn status_error(venue: &str, status: u16, body: String) -> SwapError {
	match status {
		404 => SwapError::NoRouteFound {
			venue: venue.to_string(),
			reason: body,
		},
		502..=504 => SwapError::VenueUnavailable {
			venue: venue.to_string(),
			reason: format!("HTTP {}: {}", status, body),
		},
		_ => SwapError::QuoteProvider {
			venue: venue.to_string(),
			status_code: Some(status),
			reason: body,
		},
	}
}

impl SwapResponse {
	fn into_swap(self, venue: &str, chain_id: u64) -> StrategyResult<AggregatorSwap> {
		let dst_amount = parse_amount(venue, "dstAmount", &self.dst_amount)?;
		let value = match self.tx.value.as_deref() {
			Some(v) if !v.trim().is_empty() => parse_amount(venue, "tx.value", v)?,
			_ => U256::ZERO,
		};
		let mut tx =
			TxRequest::new(chain_id, self.tx.from, self.tx.to, self.tx.data).with_value(value);
		if let Some(gas) = self.tx.gas.filter(|g| *g > 0) {
			tx = tx.with_gas_limit(with_gas_buffer(gas));
		}
		Ok(AggregatorSwap { dst_amount, tx })
	}
}

/// [`AggregatorApi`] over HTTP with cached clients
#[derive(Debug, Clone)]
pub struct HttpAggregatorApi {
	venue: String,
	client_config: ClientConfig,
	cache: ClientCache,
	integrator: Option<String>,
}

impl HttpAggregatorApi {
	pub fn new(
		venue: impl Into<String>,
		base_url: impl Into<String>,
		timeout_ms: u64,
		auth: &AuthConfig,
		cache: ClientCache,
	) -> Self {
		let venue = venue.into();
		let client_config = ClientConfig::new(venue.clone(), base_url, timeout_ms).with_auth(auth);
		Self {
			venue,
			client_config,
			cache,
			integrator: None,
		}
	}

	pub fn from_settings(
		settings: &AggregatorSettings,
		api_key: Option<SecretString>,
		cache: ClientCache,
	) -> Self {
		let mut api = Self::new(
			"aggregator",
			settings.base_url.clone(),
			settings.timeout_ms,
			&AuthConfig::bearer(api_key),
			cache,
		);
		api.integrator = settings.integrator.clone();
		api
	}

	fn url(&self, chain_id: u64, path: &str) -> String {
		format!(
			"{}/{}/{}",
			self.client_config.base_url.trim_end_matches('/'),
			chain_id,
			path
		)
	}

	async fn get_json<T: DeserializeOwned>(
		&self,
		chain_id: u64,
		path: &str,
		query: &[(&str, String)],
	) -> StrategyResult<T> {
		let client = self.cache.get_client(&self.client_config)?;
		let url = self.url(chain_id, path);
		debug!("aggregator request {} {:?}", url, query);

		let response = client.get(&url).query(query).send().await.map_err(|e| {
			if e.is_timeout() || e.is_connect() {
				SwapError::VenueUnavailable {
					venue: self.venue.clone(),
					reason: e.to_string(),
				}
			} else {
				SwapError::QuoteProvider {
					venue: self.venue.clone(),
					status_code: None,
					reason: e.to_string(),
				}
			}
		})?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			warn!("aggregator {} returned {}: {}", path, status, body);
			return Err(status_error(&self.venue, status.as_u16(), body));
		}

		response.json::<T>().await.map_err(|e| SwapError::QuoteProvider {
			venue: self.venue.clone(),
			status_code: Some(status.as_u16()),
			reason: format!("malformed {} response: {}", path, e),
		})
	}

	fn with_integrator(
		&self,
		mut query: Vec<(&'static str, String)>,
	) -> Vec<(&'static str, String)> {
		if let Some(integrator) = &self.integrator {
			query.push(("referrer", integrator.clone()));
		}
		query
	}
}

#[async_trait]
impl AggregatorApi for HttpAggregatorApi {
	async fn quote(&self, chain_id: u64, params: &QuoteParams) -> StrategyResult<AggregatorQuote> {
		let query = self.with_integrator(vec![
			("src", params.src.to_string()),
			("dst", params.dst.to_string()),
			("amount", params.amount.to_string()),
			("includeGas", "true".to_string()),
		]);
		let response: QuoteResponse = self.get_json(chain_id, "quote", &query).await?;
		Ok(AggregatorQuote {
			dst_amount: parse_amount(&self.venue, "dstAmount", &response.dst_amount)?,
			gas: response.gas,
		})
	}

	async fn spender(&self, chain_id: u64) -> StrategyResult<Address> {
		let response: SpenderResponse = self.get_json(chain_id, "approve/spender", &[]).await?;
		Ok(response.address)
	}

	async fn swap(&self, chain_id: u64, params: &SwapParams) -> StrategyResult<AggregatorSwap> {
		let query = self.with_integrator(vec![
			("src", params.src.to_string()),
			("dst", params.dst.to_string()),
			("amount", params.amount.to_string()),
			("from", params.from.to_string()),
			("slippage", bps_to_percent(params.slippage_bps)),
			("disableEstimate", "true".to_string()),
		]);
		let response: SwapResponse = self.get_json(chain_id, "swap", &query).await?;
		response.into_swap(&self.venue, chain_id)
	}
}

/// Same-chain swaps on aggregator chains
#[derive(Debug)]
pub struct AggregatorStrategy {
	name: String,
	tokens: Arc<TokenRegistry>,
	signers: Arc<dyn SignerProvider>,
	api: Arc<dyn AggregatorApi>,
	default_slippage_bps: u32,
	poll_interval: Duration,
}

impl AggregatorStrategy {
	pub fn new(
		name: impl Into<String>,
		tokens: Arc<TokenRegistry>,
		signers: Arc<dyn SignerProvider>,
		api: Arc<dyn AggregatorApi>,
		default_slippage_bps: u32,
	) -> Self {
		Self {
			name: name.into(),
			tokens,
			signers,
			api,
			default_slippage_bps,
			poll_interval: DEFAULT_POLL_INTERVAL,
		}
	}

	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}

	pub fn tokens(&self) -> &TokenRegistry {
		&self.tokens
	}

	/// Validate and look up the request's tokens
	pub fn resolve(&self, request: &SwapRequest) -> StrategyResult<ResolvedPair> {
		request.validate_shape()?;
		if !request.is_same_chain() {
			return Err(unsupported_pair(request, "cross-chain swaps are not supported"));
		}
		if chain_type(request.from_chain_id) != ChainType::Aggregator {
			return Err(unsupported_pair(
				request,
				format!(
					"{} is not served by the aggregator",
					chain_name(request.from_chain_id)
				),
			));
		}
		resolve_request(&self.tokens, request)
	}

	/// Live venue quote for an already resolved pair
	pub async fn live_estimate(
		&self,
		pair: &ResolvedPair,
		slippage_bps: u32,
	) -> StrategyResult<SwapEstimate> {
		let chain_id = pair.chain_id();
		let quote = self
			.api
			.quote(
				chain_id,
				&QuoteParams {
					src: pair.from.address,
					dst: pair.to.address,
					amount: pair.amount_in,
				},
			)
			.await?;
		if quote.dst_amount.is_zero() {
			return Err(SwapError::NoRouteFound {
				venue: self.name.clone(),
				reason: "venue quoted zero output".to_string(),
			});
		}

		let gas_units = quote.gas.unwrap_or(DEFAULT_SWAP_GAS);
		let gas_cost_estimate = match self.signers.get_read_provider(chain_id) {
			Ok(provider) => gas_cost(provider.as_ref(), gas_units).await,
			Err(e) => {
				debug!("no read provider for gas cost on chain {}: {}", chain_id, e);
				0
			},
		};

		Ok(SwapEstimate::from_expected(
			quote.dst_amount,
			pair.to.decimals,
			slippage_bps,
			price_impact_pct(pair, quote.dst_amount),
			gas_cost_estimate,
			EstimateSource::Live,
			&self.name,
		))
	}

	/// Slippage for a request, falling back to this strategy's default
	pub fn slippage_for(&self, request: &SwapRequest) -> u32 {
		request.slippage_or(self.default_slippage_bps)
	}
}

#[async_trait]
impl SwapStrategy for AggregatorStrategy {
	fn name(&self) -> &str {
		&self.name
	}

	fn supports(&self, request: &SwapRequest) -> bool {
		same_chain_pair_known(&self.tokens, request, ChainType::Aggregator)
	}

	fn validate(&self, request: &SwapRequest) -> StrategyResult<()> {
		self.resolve(request).map(|_| ())
	}

	async fn get_estimate(&self, request: &SwapRequest) -> StrategyResult<EstimateOutcome> {
		let pair = self.resolve(request)?;
		let estimate = self.live_estimate(&pair, self.slippage_for(request)).await?;
		Ok(EstimateOutcome::Estimate(estimate))
	}

	async fn execute(
		&self,
		request: &SwapRequest,
		callbacks: &dyn SwapCallbacks,
	) -> StrategyResult<ExecutionOutcome> {
		let pair = self.resolve(request)?;
		let chain_id = pair.chain_id();
		let signer = signer_for_request(self.signers.as_ref(), request).await?;
		let provider = self.signers.get_read_provider(chain_id)?;

		let spender = self.api.spender(chain_id).await?;
		let approval = ensure_allowance(
			provider.as_ref(),
			signer.as_ref(),
			ApprovalRequest {
				token: pair.from.address,
				owner: request.user_address,
				spender,
				amount: pair.amount_in,
			},
			callbacks,
			self.poll_interval,
		)
		.await?;

		let swap = self
			.api
			.swap(
				chain_id,
				&SwapParams {
					src: pair.from.address,
					dst: pair.to.address,
					amount: pair.amount_in,
					from: request.user_address,
					slippage_bps: self.slippage_for(request),
				},
			)
			.await?;
		if swap.tx.to != spender {
			return Err(SwapError::SwapExecutionFailed {
				reason: format!(
					"swap target {} does not match approved spender {}",
					swap.tx.to, spender
				),
				user_rejected: false,
			});
		}
		if swap.tx.from != request.user_address {
			return Err(SwapError::SwapExecutionFailed {
				reason: format!(
					"swap sender {} is not the requesting wallet {}",
					swap.tx.from, request.user_address
				),
				user_rejected: false,
			});
		}

		let step = submit_swap(
			provider.as_ref(),
			signer.as_ref(),
			swap.tx,
			DEFAULT_SWAP_GAS,
			callbacks,
			self.poll_interval,
		)
		.await?;
		info!(
			"{} swapped {} {} -> {} on chain {}",
			self.name, request.amount, pair.from.symbol, pair.to.symbol, chain_id
		);
		Ok(ExecutionOutcome::Executed(receipt(&self.name, approval, step)))
	}
}
