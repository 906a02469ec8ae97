//! Solidity bindings for the contracts the router reads and writes

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall};
use swap_types::{ProviderError, ProviderResult, ReadProvider};

sol! {
	/// Minimal ERC-20 surface used by the approval flow
	interface IERC20 {
		function allowance(address owner, address spender) external view returns (uint256);
		function approve(address spender, uint256 value) external returns (bool);
		function decimals() external view returns (uint8);
	}

	/// Stable-swap venue entry point. `max_id` doubles as the discovery sentinel.
	interface IAddressProvider {
		function max_id() external view returns (uint256);
		function get_address(uint256 id) external view returns (address);
	}

	/// Registry of stable-swap pools
	interface IStableSwapRegistry {
		function pool_count() external view returns (uint256);
		function pool_list(uint256 index) external view returns (address);
		function get_coins(address pool) external view returns (address[8]);
	}

	/// Stable-swap pool
	interface IStableSwapPool {
		function coins(uint256 index) external view returns (address);
		function get_dy(int128 i, int128 j, uint256 dx) external view returns (uint256);
		function exchange(int128 i, int128 j, uint256 dx, uint256 min_dy) external returns (uint256);
	}
}

/// `eth_call` a binding and decode its return value
pub async fn read_call<C>(
	provider: &dyn ReadProvider,
	to: Address,
	call: C,
) -> ProviderResult<C::Return>
where
	C: SolCall + Send,
{
	let raw = provider.call(to, Bytes::from(call.abi_encode())).await?;
	C::abi_decode_returns(&raw)
		.map_err(|e| ProviderError::InvalidResponse(format!("{} on {}: {}", C::SIGNATURE, to, e)))
}
