//! Test utilities for creating common test objects
//!
//! Builders with sensible defaults so tests only spell out the fields they care about.

use alloy_primitives::{address, Address, B256, U256};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::errors::SwapError;
use crate::models::{
	EstimateOutcome, EstimateSource, ExecutionOutcome, ExecutionStep, StepKind, SwapEstimate,
	SwapReceipt, SwapRequest,
};
use crate::strategies::{StrategyResult, SwapCallbacks, SwapStrategy};

/// Well-known development account used as the default swapper
pub const TEST_USER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

/// Builder for `SwapRequest` defaulting to 100 USDC -> EURC on Ethereum
#[derive(Debug, Clone)]
pub struct SwapRequestBuilder {
	request: SwapRequest,
}

impl Default for SwapRequestBuilder {
	fn default() -> Self {
		Self {
			request: SwapRequest::new("USDC", "EURC", "100", 1, TEST_USER),
		}
	}
}

impl SwapRequestBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_token(mut self, symbol: &str) -> Self {
		self.request.from_token = symbol.to_string();
		self
	}

	pub fn to_token(mut self, symbol: &str) -> Self {
		self.request.to_token = symbol.to_string();
		self
	}

	pub fn pair(self, from: &str, to: &str) -> Self {
		self.from_token(from).to_token(to)
	}

	pub fn amount(mut self, amount: &str) -> Self {
		self.request.amount = amount.to_string();
		self
	}

	/// Same source and destination chain
	pub fn chain(mut self, chain_id: u64) -> Self {
		self.request.from_chain_id = chain_id;
		self.request.to_chain_id = chain_id;
		self
	}

	pub fn to_chain(mut self, chain_id: u64) -> Self {
		self.request.to_chain_id = chain_id;
		self
	}

	pub fn user(mut self, user: Address) -> Self {
		self.request.user_address = user;
		self
	}

	pub fn slippage_bps(mut self, bps: u32) -> Self {
		self.request.slippage_bps = Some(bps);
		self
	}

	pub fn build(self) -> SwapRequest {
		self.request
	}
}

/// Progress notification captured by [`RecordingCallbacks`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackEvent {
	ApprovalSubmitted(B256),
	ApprovalConfirmed,
	SwapSubmitted(B256),
}

/// Callbacks that remember every notification in order
#[derive(Debug, Default)]
pub struct RecordingCallbacks {
	events: Mutex<Vec<CallbackEvent>>,
}

impl RecordingCallbacks {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<CallbackEvent> {
		self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
	}

	pub fn approval_submitted_count(&self) -> usize {
		self.events()
			.iter()
			.filter(|e| matches!(e, CallbackEvent::ApprovalSubmitted(_)))
			.count()
	}

	fn record(&self, event: CallbackEvent) {
		self.events
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.push(event);
	}
}

impl SwapCallbacks for RecordingCallbacks {
	fn on_approval_submitted(&self, tx_hash: B256) {
		self.record(CallbackEvent::ApprovalSubmitted(tx_hash));
	}

	fn on_approval_confirmed(&self) {
		self.record(CallbackEvent::ApprovalConfirmed);
	}

	fn on_swap_submitted(&self, tx_hash: B256) {
		self.record(CallbackEvent::SwapSubmitted(tx_hash));
	}
}

/// Scripted strategy that counts every lifecycle call
#[derive(Debug)]
pub struct StubStrategy {
	name: String,
	supports: bool,
	validation: Option<SwapError>,
	estimate: Mutex<StrategyResult<EstimateOutcome>>,
	execution: Mutex<StrategyResult<ExecutionOutcome>>,
	supports_calls: AtomicUsize,
	validate_calls: AtomicUsize,
	estimate_calls: AtomicUsize,
	execute_calls: AtomicUsize,
}

impl StubStrategy {
	/// Supports every request; quotes 100 with 6 decimals and executes one swap
	pub fn new(name: &str) -> Self {
		let estimate = SwapEstimate::from_expected(
			U256::from(100_000_000u64),
			6,
			50,
			0.0,
			0,
			EstimateSource::Live,
			name,
		);
		let tx_hash = B256::repeat_byte(0xab);
		let receipt = SwapReceipt {
			strategy: name.to_string(),
			tx_hash,
			approval_tx_hash: None,
			steps: vec![ExecutionStep {
				kind: StepKind::Swap,
				tx_hash,
				block_number: Some(1),
			}],
		};
		Self {
			name: name.to_string(),
			supports: true,
			validation: None,
			estimate: Mutex::new(Ok(EstimateOutcome::Estimate(estimate))),
			execution: Mutex::new(Ok(ExecutionOutcome::Executed(receipt))),
			supports_calls: AtomicUsize::new(0),
			validate_calls: AtomicUsize::new(0),
			estimate_calls: AtomicUsize::new(0),
			execute_calls: AtomicUsize::new(0),
		}
	}

	/// Claims nothing
	pub fn unsupported(name: &str) -> Self {
		Self {
			supports: false,
			..Self::new(name)
		}
	}

	/// Supports the request but fails `validate` with `err`
	pub fn rejecting(mut self, err: SwapError) -> Self {
		self.validation = Some(err);
		self
	}

	/// Make both `get_estimate` and `execute` fail with `err`
	pub fn failing(self, err: SwapError) -> Self {
		self.set_error(err);
		self
	}

	pub fn set_error(&self, err: SwapError) {
		*self.estimate.lock().unwrap_or_else(|e| e.into_inner()) = Err(err.clone());
		*self.execution.lock().unwrap_or_else(|e| e.into_inner()) = Err(err);
	}

	pub fn set_execution(&self, outcome: ExecutionOutcome) {
		*self.execution.lock().unwrap_or_else(|e| e.into_inner()) = Ok(outcome.clone());
		if let ExecutionOutcome::Guided(instructions) = outcome {
			*self.estimate.lock().unwrap_or_else(|e| e.into_inner()) =
				Ok(EstimateOutcome::Guided(instructions));
		}
	}

	pub fn supports_calls(&self) -> usize {
		self.supports_calls.load(Ordering::SeqCst)
	}

	pub fn estimate_calls(&self) -> usize {
		self.estimate_calls.load(Ordering::SeqCst)
	}

	pub fn execute_calls(&self) -> usize {
		self.execute_calls.load(Ordering::SeqCst)
	}

	/// Calls to anything past `supports`
	pub fn operation_calls(&self) -> usize {
		self.validate_calls.load(Ordering::SeqCst) + self.estimate_calls() + self.execute_calls()
	}
}

#[async_trait]
impl SwapStrategy for StubStrategy {
	fn name(&self) -> &str {
		&self.name
	}

	fn supports(&self, _request: &SwapRequest) -> bool {
		self.supports_calls.fetch_add(1, Ordering::SeqCst);
		self.supports
	}

	fn validate(&self, _request: &SwapRequest) -> StrategyResult<()> {
		self.validate_calls.fetch_add(1, Ordering::SeqCst);
		match &self.validation {
			Some(err) => Err(err.clone()),
			None => Ok(()),
		}
	}

	async fn get_estimate(&self, _request: &SwapRequest) -> StrategyResult<EstimateOutcome> {
		self.estimate_calls.fetch_add(1, Ordering::SeqCst);
		self.estimate.lock().unwrap_or_else(|e| e.into_inner()).clone()
	}

	async fn execute(
		&self,
		_request: &SwapRequest,
		_callbacks: &dyn SwapCallbacks,
	) -> StrategyResult<ExecutionOutcome> {
		self.execute_calls.fetch_add(1, Ordering::SeqCst);
		self.execution.lock().unwrap_or_else(|e| e.into_inner()).clone()
	}
}
