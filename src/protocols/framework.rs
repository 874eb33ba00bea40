use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde::Deserialize;

use crate::plan::{CallArg, CallDescriptor, PlanBuilder, PlanResult, SymbolicValue, ValueTag};
use crate::registry::{PoolMeta, ProtocolFamily};
use crate::valuation::{StateReader, ValuationResult};

use super::abi;
use super::error::AdapterResult;

/// 协议无关的辅助合约地址，适配器构造时固定。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct HelperContracts {
    pub price_oracle: Address,
    pub slippage_guard: Address,
    pub swap_router: Address,
}

/// 单个策略步骤在编译期持有的上下文。
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub vault: Address,
    pub pool: Address,
    pub input_token: Address,
    pub output_token: Address,
    pub is_borrow: bool,
    pub meta: &'a PoolMeta,
}

/// An adapter input amount: either a compile-time literal or the handle to
/// a value produced earlier in the plan. Real flows pass symbolic values;
/// literals exist for the off-plan valuation entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountArg {
    Literal(U256),
    Value(SymbolicValue),
}

impl AmountArg {
    pub fn to_arg(self) -> CallArg {
        match self {
            AmountArg::Literal(amount) => CallArg::Uint(amount),
            AmountArg::Value(value) => CallArg::value(value, ValueTag::Amount),
        }
    }
}

/// Capability set implemented once per protocol family.
///
/// Adapters are pure translators: stateless with respect to any single
/// plan, they only append calls to the builder they are handed. The async
/// methods are the off-plan valuation path: direct reads against a state
/// provider that must agree with the plan-side queries for the same
/// on-chain state.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    fn family(&self) -> ProtocolFamily;

    /// Convert `amount` of the step's input token into its output token,
    /// crediting the vault.
    fn append_deposit(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<()>;

    /// Redeem `amount` of the step's output token back into its input token.
    fn append_withdraw(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<()>;

    /// Translate an output-token amount into input-token terms. Identity
    /// conversions return the amount untouched without appending a call.
    fn append_value_in_input_token(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<AmountArg>;

    /// Translate an input-token amount into output-token terms.
    fn append_value_in_output_token(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<AmountArg>;

    /// Query the vault's position balance for this step (protocol-specific:
    /// staked balances live on gauges and reward pools, not the token).
    fn append_output_token_balance(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
    ) -> AdapterResult<SymbolicValue>;

    /// Claim outstanding protocol rewards. Families without a reward
    /// surface append nothing.
    fn append_claim_rewards(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
    ) -> AdapterResult<()>;

    /// Claim rewards and convert the claimed balances into the vault's
    /// underlying asset through the curated route table.
    fn append_harvest_rewards(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        underlying: Address,
    ) -> AdapterResult<()>;

    async fn value_in_input_token(
        &self,
        reader: &dyn StateReader,
        ctx: &StepContext<'_>,
        amount: U256,
    ) -> ValuationResult<U256>;

    async fn value_in_output_token(
        &self,
        reader: &dyn StateReader,
        ctx: &StepContext<'_>,
        amount: U256,
    ) -> ValuationResult<U256>;

    async fn output_token_balance(
        &self,
        reader: &dyn StateReader,
        ctx: &StepContext<'_>,
    ) -> ValuationResult<U256>;
}

/// Append an ERC-20 approval of `amount` for `spender`.
pub(crate) fn append_approve(
    plan: &mut PlanBuilder,
    token: Address,
    spender: Address,
    amount: AmountArg,
) -> PlanResult<()> {
    plan.append_void(abi::erc20_approve(token, spender, amount.to_arg()))
}

/// Append the oracle-expected output for a conversion followed by the
/// tolerance guard, yielding the minimum acceptable output. The guard
/// computes `expected * (10_000 - tolerance_bp) / 10_000` on-chain.
pub(crate) fn append_min_output_guard(
    plan: &mut PlanBuilder,
    helpers: &HelperContracts,
    token_in: Address,
    token_out: Address,
    amount: AmountArg,
    tolerance_bp: u16,
) -> PlanResult<SymbolicValue> {
    let expected = plan.append(
        CallDescriptor::new(helpers.price_oracle, abi::ORACLE_EXPECTED_OUTPUT)
            .with_arg(token_in)
            .with_arg(token_out)
            .with_arg(amount.to_arg()),
        ValueTag::Amount,
    )?;
    plan.append(
        CallDescriptor::new(helpers.slippage_guard, abi::GUARD_APPLY_TOLERANCE)
            .with_arg(CallArg::amount(expected))
            .with_arg(U256::from(tolerance_bp)),
        ValueTag::Amount,
    )
}
