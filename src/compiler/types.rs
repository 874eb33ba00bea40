use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// One hop of a strategy: route the current asset through `pool`, receiving
/// `output_token`. `is_borrow` marks collateralization hops whose output
/// balance is not vault value; the compiler threads it through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyStep {
    pub pool: Address,
    pub output_token: Address,
    #[serde(default)]
    pub is_borrow: bool,
}

/// 有序的策略步骤序列。顺序即存入顺序，取出时反向解绕。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub underlying: Address,
    #[serde(default)]
    pub steps: Vec<StrategyStep>,
}

impl Strategy {
    pub fn new(underlying: Address, steps: Vec<StrategyStep>) -> Self {
        Self { underlying, steps }
    }

    /// The input token of step `index`: the underlying for the first hop,
    /// the previous hop's output for every later one.
    pub fn input_token(&self, index: usize) -> Address {
        if index == 0 {
            self.underlying
        } else {
            self.steps[index - 1].output_token
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Deposit,
    Withdraw,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Deposit => "deposit",
            Direction::Withdraw => "withdraw",
        }
    }
}
