use alloy_primitives::Address;
use serde::Deserialize;

use crate::compiler::{Strategy, StrategyManager, StrategyStep};
use crate::protocols::HelperContracts;
use crate::registry::{PoolMeta, PoolRegistry, ProtocolFamily, RegistryResult};

use super::{default_logging_level, default_tolerance_bp};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CassiniConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub contracts: HelperContracts,
    #[serde(default)]
    pub pools: Vec<PoolEntry>,
    #[serde(default)]
    pub strategy: StrategyConfig,
}

impl CassiniConfig {
    pub fn registry(&self) -> RegistryResult<PoolRegistry> {
        PoolRegistry::new(
            self.pools
                .iter()
                .map(|entry| (entry.address, entry.meta()))
                .collect(),
        )
    }

    pub fn strategy(&self) -> Strategy {
        Strategy::new(self.vault.underlying, self.strategy.steps.clone())
    }

    pub fn manager(&self) -> RegistryResult<StrategyManager> {
        Ok(StrategyManager::new(
            self.vault.address,
            self.registry()?,
            self.contracts,
        ))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_logging_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct VaultConfig {
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub underlying: Address,
}

/// 单个池子的注册表条目，启动时一次性转换为 [`PoolMeta`]。
#[derive(Debug, Clone, Deserialize)]
pub struct PoolEntry {
    pub address: Address,
    pub protocol: ProtocolFamily,
    #[serde(default)]
    pub tokens: Vec<Address>,
    #[serde(default)]
    pub staking_id: Option<u64>,
    #[serde(default)]
    pub reward_contract: Option<Address>,
    #[serde(default)]
    pub reward_tokens: Vec<Address>,
    #[serde(default = "default_tolerance_bp")]
    pub tolerance_bp: u16,
}

impl PoolEntry {
    pub fn meta(&self) -> PoolMeta {
        PoolMeta {
            family: self.protocol,
            tokens: self.tokens.clone(),
            staking_id: self.staking_id,
            reward_contract: self.reward_contract,
            reward_tokens: self.reward_tokens.clone(),
            tolerance_bp: self.tolerance_bp,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrategyConfig {
    #[serde(default)]
    pub steps: Vec<StrategyStep>,
}
