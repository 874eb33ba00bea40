use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde::Deserialize;

use crate::protocols::{abi, routes};

use super::error::{ValuationError, ValuationResult};

/// A concrete argument of an off-plan read. Mirrors the literal variants of
/// the plan-side call arguments; symbolic values never reach this path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadArg {
    Address(Address),
    Uint(U256),
    Int(i128),
    Bool(bool),
}

/// Read-only access to external contract state, used by the off-plan
/// valuation path. Implementations may be RPC-backed or replay a recorded
/// snapshot; the compiler itself never performs calls.
#[async_trait]
pub trait StateReader: Send + Sync {
    async fn read(
        &self,
        target: Address,
        signature: &str,
        args: &[ReadArg],
    ) -> ValuationResult<U256>;
}

/// 快照文件格式：余额、比例换算与单值单元三类条目。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub balances: Vec<BalanceEntry>,
    #[serde(default)]
    pub rates: Vec<RateEntry>,
    #[serde(default)]
    pub cells: Vec<CellEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceEntry {
    pub token: Address,
    pub holder: Address,
    pub amount: U256,
}

/// A proportional conversion: `out = amount * numerator / denominator`,
/// keyed by the contract and function it stands in for.
#[derive(Debug, Clone, Deserialize)]
pub struct RateEntry {
    pub target: Address,
    pub signature: String,
    pub numerator: U256,
    pub denominator: U256,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CellEntry {
    pub target: Address,
    pub signature: String,
    pub value: U256,
}

/// Deterministic [`StateReader`] over a recorded snapshot. Used by the
/// `value` CLI command and by tests that check the off-plan path agrees
/// with the plan-side queries.
#[derive(Debug, Default)]
pub struct SnapshotStateReader {
    balances: HashMap<(Address, Address), U256>,
    rates: HashMap<(Address, String), (U256, U256)>,
    cells: HashMap<(Address, String), U256>,
}

impl SnapshotStateReader {
    pub fn new(snapshot: StateSnapshot) -> Self {
        let mut reader = Self::default();
        for entry in snapshot.balances {
            reader
                .balances
                .insert((entry.token, entry.holder), entry.amount);
        }
        for entry in snapshot.rates {
            reader.rates.insert(
                (entry.target, entry.signature),
                (entry.numerator, entry.denominator),
            );
        }
        for entry in snapshot.cells {
            reader.cells.insert((entry.target, entry.signature), entry.value);
        }
        reader
    }

    fn missing(target: Address, signature: &str) -> ValuationError {
        ValuationError::MissingState {
            target,
            signature: signature.to_string(),
        }
    }
}

#[async_trait]
impl StateReader for SnapshotStateReader {
    async fn read(
        &self,
        target: Address,
        signature: &str,
        args: &[ReadArg],
    ) -> ValuationResult<U256> {
        if let Some(value) = self.cells.get(&(target, signature.to_string())) {
            return Ok(*value);
        }

        if signature == abi::GUARD_APPLY_TOLERANCE {
            let mut uints = args.iter().filter_map(|arg| match arg {
                ReadArg::Uint(value) => Some(*value),
                _ => None,
            });
            let expected = uints.next().ok_or_else(|| Self::missing(target, signature))?;
            let tolerance = uints.next().ok_or_else(|| Self::missing(target, signature))?;
            let tolerance = u16::try_from(tolerance).map_err(|_| {
                ValuationError::Provider(format!("tolerance {tolerance} does not fit in bp range"))
            })?;
            return Ok(routes::min_output_after_tolerance(expected, tolerance));
        }

        if signature == abi::ERC20_BALANCE_OF {
            let holder = args
                .iter()
                .find_map(|arg| match arg {
                    ReadArg::Address(holder) => Some(*holder),
                    _ => None,
                })
                .ok_or_else(|| Self::missing(target, signature))?;
            return self
                .balances
                .get(&(target, holder))
                .copied()
                .ok_or_else(|| Self::missing(target, signature));
        }

        if let Some((numerator, denominator)) = self.rates.get(&(target, signature.to_string())) {
            let amount = args
                .iter()
                .find_map(|arg| match arg {
                    ReadArg::Uint(amount) => Some(*amount),
                    _ => None,
                })
                .ok_or_else(|| Self::missing(target, signature))?;
            if denominator.is_zero() {
                return Err(ValuationError::Provider(format!(
                    "zero denominator in rate for `{signature}` on {target}"
                )));
            }
            return Ok(amount.saturating_mul(*numerator) / *denominator);
        }

        Err(Self::missing(target, signature))
    }
}
