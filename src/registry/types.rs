use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Protocol family a pool belongs to. One adapter implementation exists per
/// family; the mapping is fixed configuration, never discovered at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolFamily {
    /// ERC-4626 style single-sided lending market.
    Lending,
    /// Multi-coin stable-swap pool with indexed coins.
    StableSwap,
    /// LP reward gauge (stake / unstake / claim).
    Gauge,
    /// Pid-keyed booster staking behind a dedicated reward pool.
    Booster,
}

impl ProtocolFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolFamily::Lending => "lending",
            ProtocolFamily::StableSwap => "stable_swap",
            ProtocolFamily::Gauge => "gauge",
            ProtocolFamily::Booster => "booster",
        }
    }
}

/// 池子静态元数据。编译期间只读；多币池的币种顺序即链上索引顺序。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMeta {
    pub family: ProtocolFamily,
    /// Coin list for index resolution in multi-coin pools. The position of
    /// a token in this list is its on-chain index.
    pub tokens: Vec<Address>,
    /// Booster staking pool id.
    pub staking_id: Option<u64>,
    /// Contract holding staked balances and reward accounting, where that
    /// is not the pool itself.
    pub reward_contract: Option<Address>,
    /// Reward tokens this position accrues, in claim order.
    pub reward_tokens: Vec<Address>,
    /// Slippage allowance for this pool's own entry/exit guard.
    pub tolerance_bp: u16,
}

impl PoolMeta {
    /// Index of `token` within the pool's coin list.
    pub fn token_index(&self, token: Address) -> Option<usize> {
        self.tokens.iter().position(|candidate| *candidate == token)
    }
}
