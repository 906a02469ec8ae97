//! JSON-RPC read provider
//!
//! Quote paths read chain state through this client so they never need a connected
//! wallet. The HTTP transport sits behind [`RpcTransport`] so tests can script responses.

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use swap_types::{ProviderError, ProviderResult, ReadProvider, TxReceipt, TxRequest};
use tracing::debug;

/// Raw JSON-RPC request/response exchange
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RpcTransport: Send + Sync + Debug {
	/// Send one request and return its `result` member
	async fn request(&self, method: &str, params: Value) -> ProviderResult<Value>;
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
	code: i64,
	message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
	#[serde(default)]
	result: Option<Value>,
	#[serde(default)]
	error: Option<RpcErrorBody>,
}

/// JSON-RPC over HTTP POST
#[derive(Debug)]
pub struct HttpTransport {
	client: reqwest::Client,
	url: String,
	next_id: AtomicU64,
}

impl HttpTransport {
	pub fn new(url: impl Into<String>, timeout: Duration) -> ProviderResult<Self> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ProviderError::Transport(e.to_string()))?;
		Ok(Self {
			client,
			url: url.into(),
			next_id: AtomicU64::new(1),
		})
	}
}

#[async_trait]
impl RpcTransport for HttpTransport {
	async fn request(&self, method: &str, params: Value) -> ProviderResult<Value> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let body = json!({
			"jsonrpc": "2.0",
			"id": id,
			"method": method,
			"params": params,
		});

		let response = self
			.client
			.post(&self.url)
			.json(&body)
			.send()
			.await
			.map_err(|e| ProviderError::Transport(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let text = response.text().await.unwrap_or_default();
			return Err(ProviderError::Transport(format!("HTTP {}: {}", status, text)));
		}

		let parsed: RpcResponse = response
			.json()
			.await
			.map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

		match (parsed.result, parsed.error) {
			(_, Some(err)) => Err(ProviderError::Rpc {
				code: err.code,
				message: err.message,
			}),
			(Some(result), None) => Ok(result),
			(None, None) => Ok(Value::Null),
		}
	}
}

/// Parse a hex quantity such as `"0x1a"`
fn parse_quantity(value: &Value, field: &str) -> ProviderResult<u128> {
	let s = value
		.as_str()
		.ok_or_else(|| ProviderError::InvalidResponse(format!("{} is not a string", field)))?;
	let digits = s.strip_prefix("0x").unwrap_or(s);
	if digits.is_empty() {
		return Ok(0);
	}
	u128::from_str_radix(digits, 16)
		.map_err(|e| ProviderError::InvalidResponse(format!("{} '{}': {}", field, s, e)))
}

fn parse_u64_quantity(value: &Value, field: &str) -> ProviderResult<u64> {
	let v = parse_quantity(value, field)?;
	u64::try_from(v).map_err(|_| ProviderError::InvalidResponse(format!("{} overflows u64", field)))
}

fn tx_object(tx: &TxRequest) -> Value {
	let mut obj = json!({
		"from": tx.from,
		"to": tx.to,
		"data": tx.data,
		"value": format!("{:#x}", tx.value),
	});
	if let Some(gas) = tx.gas_limit {
		obj["gas"] = json!(format!("{:#x}", gas));
	}
	obj
}

/// Read-only provider for one chain
#[derive(Debug, Clone)]
pub struct JsonRpcReadProvider {
	chain_id: u64,
	transport: Arc<dyn RpcTransport>,
}

impl JsonRpcReadProvider {
	pub fn new(chain_id: u64, transport: Arc<dyn RpcTransport>) -> Self {
		Self {
			chain_id,
			transport,
		}
	}

	/// Provider backed by the HTTP transport
	pub fn http(chain_id: u64, url: &str, timeout: Duration) -> ProviderResult<Self> {
		let transport = HttpTransport::new(url, timeout)?;
		Ok(Self::new(chain_id, Arc::new(transport)))
	}
}

#[async_trait]
impl ReadProvider for JsonRpcReadProvider {
	fn chain_id(&self) -> u64 {
		self.chain_id
	}

	async fn call(&self, to: Address, data: Bytes) -> ProviderResult<Bytes> {
		let result = self
			.transport
			.request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
			.await?;
		serde_json::from_value(result)
			.map_err(|e| ProviderError::InvalidResponse(format!("eth_call result: {}", e)))
	}

	async fn gas_price(&self) -> ProviderResult<u128> {
		let result = self.transport.request("eth_gasPrice", json!([])).await?;
		parse_quantity(&result, "gasPrice")
	}

	async fn base_fee_per_gas(&self) -> ProviderResult<Option<u128>> {
		let block = self
			.transport
			.request("eth_getBlockByNumber", json!(["latest", false]))
			.await?;
		match block.get("baseFeePerGas") {
			Some(value) if !value.is_null() => parse_quantity(value, "baseFeePerGas").map(Some),
			_ => Ok(None),
		}
	}

	async fn estimate_gas(&self, tx: &TxRequest) -> ProviderResult<u64> {
		let result = self
			.transport
			.request("eth_estimateGas", json!([tx_object(tx)]))
			.await?;
		parse_u64_quantity(&result, "gas")
	}

	async fn transaction_receipt(&self, tx_hash: B256) -> ProviderResult<Option<TxReceipt>> {
		let result = self
			.transport
			.request("eth_getTransactionReceipt", json!([tx_hash]))
			.await?;
		if result.is_null() {
			debug!("receipt for {} not yet available on chain {}", tx_hash, self.chain_id);
			return Ok(None);
		}

		let block_number = match result.get("blockNumber") {
			Some(v) if !v.is_null() => Some(parse_u64_quantity(v, "blockNumber")?),
			_ => None,
		};
		let status = match result.get("status") {
			Some(v) => parse_quantity(v, "status")? == 1,
			None => true,
		};
		let gas_used = match result.get("gasUsed") {
			Some(v) => parse_u64_quantity(v, "gasUsed")?,
			None => 0,
		};

		Ok(Some(TxReceipt {
			transaction_hash: tx_hash,
			block_number,
			status,
			gas_used,
		}))
	}
}
