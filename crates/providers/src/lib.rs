//! Swap Providers
//!
//! Read-only JSON-RPC clients, the wallet-backed signer provider and the shared chain
//! helpers (ERC-20 reads, gas fee policy, receipt polling) used by on-chain strategies.

pub mod abi;
pub mod confirm;
pub mod erc20;
pub mod gas;
pub mod json_rpc;
pub mod read_cache;
pub mod testing;
pub mod wallet;

pub use confirm::{wait_for_receipt, DEFAULT_POLL_INTERVAL};
pub use gas::{compute_eip1559_fees, resolve_fees, with_gas_buffer};
pub use json_rpc::{HttpTransport, JsonRpcReadProvider, RpcTransport};
pub use read_cache::{ReadProviderCache, RpcEndpoint};
pub use wallet::WalletSignerProvider;
