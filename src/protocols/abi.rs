//! 外部协议的已知函数签名。具体 calldata 编码由外部编码器完成，这里只
//! 固定签名字符串，供计划形状断言与编码器共同引用。

use alloy_primitives::Address;

use crate::plan::{CallArg, CallDescriptor};

// ERC-20
pub const ERC20_APPROVE: &str = "approve(address,uint256)";
pub const ERC20_BALANCE_OF: &str = "balanceOf(address)";

// Vault runtime cells
pub const VAULT_AVAILABLE_ASSETS: &str = "availableAssets()";
pub const VAULT_PENDING_WITHDRAWAL: &str = "pendingWithdrawal()";

// Pricing helpers
pub const ORACLE_EXPECTED_OUTPUT: &str = "expectedOutput(address,address,uint256)";
pub const GUARD_APPLY_TOLERANCE: &str = "applyTolerance(uint256,uint256)";

// ERC-4626 lending market
pub const MARKET_DEPOSIT: &str = "deposit(uint256,address)";
pub const MARKET_REDEEM: &str = "redeem(uint256,address,address)";
pub const MARKET_CONVERT_TO_ASSETS: &str = "convertToAssets(uint256)";
pub const MARKET_CONVERT_TO_SHARES: &str = "convertToShares(uint256)";

// Stable-swap pool
pub const POOL_ADD_LIQUIDITY: &str = "add_liquidity(uint256[],uint256)";
pub const POOL_REMOVE_LIQUIDITY_ONE_COIN: &str = "remove_liquidity_one_coin(uint256,int128,uint256)";
pub const POOL_CALC_TOKEN_AMOUNT: &str = "calc_token_amount(uint256[],bool)";
pub const POOL_CALC_WITHDRAW_ONE_COIN: &str = "calc_withdraw_one_coin(uint256,int128)";

// Reward gauge
pub const GAUGE_DEPOSIT: &str = "deposit(uint256)";
pub const GAUGE_WITHDRAW: &str = "withdraw(uint256)";
pub const GAUGE_CLAIM_REWARDS: &str = "claim_rewards()";

// Booster + reward pool
pub const BOOSTER_DEPOSIT: &str = "deposit(uint256,uint256,bool)";
pub const REWARD_POOL_WITHDRAW_AND_UNWRAP: &str = "withdrawAndUnwrap(uint256,bool)";
pub const REWARD_POOL_GET_REWARD: &str = "getReward(address,bool)";

// Swap router
pub const ROUTER_SWAP_EXACT_TOKENS: &str =
    "swapExactTokensForTokens(uint256,uint256,address[],address)";

pub fn erc20_balance_of(token: Address, holder: Address) -> CallDescriptor {
    CallDescriptor::new(token, ERC20_BALANCE_OF).with_arg(holder)
}

pub fn erc20_approve(token: Address, spender: Address, amount: CallArg) -> CallDescriptor {
    CallDescriptor::new(token, ERC20_APPROVE)
        .with_arg(spender)
        .with_arg(amount)
}
