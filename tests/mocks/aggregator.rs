//! Call-counting aggregator API

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use swap_router::strategies::{
	AggregatorApi, AggregatorQuote, AggregatorSwap, QuoteParams, SwapParams,
};
use swap_router::SwapError;
use swap_types::{StrategyResult, TxRequest};

pub const SPENDER: Address = Address::repeat_byte(0x1d);

#[derive(Debug)]
pub struct StubAggregatorApi {
	quote: Mutex<StrategyResult<AggregatorQuote>>,
	quote_calls: AtomicUsize,
	spender_calls: AtomicUsize,
	swap_calls: AtomicUsize,
}

#[allow(dead_code)]
impl StubAggregatorApi {
	/// Quotes `dst_amount` base units for every request
	pub fn live(dst_amount: u64) -> Self {
		Self {
			quote: Mutex::new(Ok(AggregatorQuote {
				dst_amount: U256::from(dst_amount),
				gas: Some(200_000),
			})),
			quote_calls: AtomicUsize::new(0),
			spender_calls: AtomicUsize::new(0),
			swap_calls: AtomicUsize::new(0),
		}
	}

	/// Every call fails as if the venue returned 503
	pub fn down() -> Self {
		let api = Self::live(0);
		api.set_down();
		api
	}

	pub fn set_down(&self) {
		*self.quote.lock().unwrap() = Err(unavailable());
	}

	pub fn set_live(&self, dst_amount: u64) {
		*self.quote.lock().unwrap() = Ok(AggregatorQuote {
			dst_amount: U256::from(dst_amount),
			gas: Some(200_000),
		});
	}

	pub fn quote_calls(&self) -> usize {
		self.quote_calls.load(Ordering::SeqCst)
	}

	pub fn swap_calls(&self) -> usize {
		self.swap_calls.load(Ordering::SeqCst)
	}

	pub fn total_calls(&self) -> usize {
		self.quote_calls() + self.spender_calls.load(Ordering::SeqCst) + self.swap_calls()
	}
}

fn unavailable() -> SwapError {
	SwapError::VenueUnavailable {
		venue: "aggregator".to_string(),
		reason: "HTTP 503: service unavailable".to_string(),
	}
}

#[async_trait]
impl AggregatorApi for StubAggregatorApi {
	async fn quote(&self, _chain_id: u64, _params: &QuoteParams) -> StrategyResult<AggregatorQuote> {
		self.quote_calls.fetch_add(1, Ordering::SeqCst);
		self.quote.lock().unwrap().clone()
	}

	async fn spender(&self, _chain_id: u64) -> StrategyResult<Address> {
		self.spender_calls.fetch_add(1, Ordering::SeqCst);
		self.quote.lock().unwrap().as_ref().map_err(|e| e.clone())?;
		Ok(SPENDER)
	}

	async fn swap(&self, chain_id: u64, params: &SwapParams) -> StrategyResult<AggregatorSwap> {
		self.swap_calls.fetch_add(1, Ordering::SeqCst);
		let quote = self.quote.lock().unwrap().clone()?;
		Ok(AggregatorSwap {
			dst_amount: quote.dst_amount,
			tx: TxRequest::new(
				chain_id,
				params.from,
				SPENDER,
				Bytes::from(vec![0x12, 0x34, 0x56, 0x78]),
			),
		})
	}
}
