//! ERC-20 reads and calldata builders

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use swap_types::{ProviderResult, ReadProvider};

use crate::abi::{read_call, IERC20};

/// Current allowance of `spender` over `owner`'s tokens, read without the wallet
pub async fn allowance(
	provider: &dyn ReadProvider,
	token: Address,
	owner: Address,
	spender: Address,
) -> ProviderResult<U256> {
	read_call(provider, token, IERC20::allowanceCall { owner, spender }).await
}

/// Calldata for `approve(spender, value)`
pub fn approve_calldata(spender: Address, value: U256) -> Bytes {
	Bytes::from(IERC20::approveCall { spender, value }.abi_encode())
}
