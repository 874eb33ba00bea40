use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::plan::{CallDescriptor, PlanBuilder, SymbolicValue, ValueTag};
use crate::registry::ProtocolFamily;
use crate::valuation::{ReadArg, StateReader, ValuationResult};

use super::abi;
use super::error::AdapterResult;
use super::framework::{AmountArg, HelperContracts, ProtocolAdapter, StepContext, append_approve};
use super::routes::append_reward_swaps;

/// LP 质押挂钩（gauge）：1:1 包装质押代币，质押余额记在 gauge 本身。
#[derive(Debug)]
pub struct GaugeAdapter {
    helpers: HelperContracts,
}

impl GaugeAdapter {
    pub fn new(helpers: HelperContracts) -> Self {
        Self { helpers }
    }
}

#[async_trait]
impl ProtocolAdapter for GaugeAdapter {
    fn family(&self) -> ProtocolFamily {
        ProtocolFamily::Gauge
    }

    fn append_deposit(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<()> {
        append_approve(plan, ctx.input_token, ctx.pool, amount)?;
        plan.append_void(
            CallDescriptor::new(ctx.pool, abi::GAUGE_DEPOSIT).with_arg(amount.to_arg()),
        )?;
        Ok(())
    }

    fn append_withdraw(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<()> {
        plan.append_void(
            CallDescriptor::new(ctx.pool, abi::GAUGE_WITHDRAW).with_arg(amount.to_arg()),
        )?;
        Ok(())
    }

    fn append_value_in_input_token(
        &self,
        _plan: &mut PlanBuilder,
        _ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<AmountArg> {
        // Gauge tokens wrap the staked LP 1:1.
        Ok(amount)
    }

    fn append_value_in_output_token(
        &self,
        _plan: &mut PlanBuilder,
        _ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<AmountArg> {
        Ok(amount)
    }

    fn append_output_token_balance(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
    ) -> AdapterResult<SymbolicValue> {
        // Staked balance is tracked by the gauge itself.
        Ok(plan.append(
            abi::erc20_balance_of(ctx.pool, ctx.vault),
            ValueTag::Amount,
        )?)
    }

    fn append_claim_rewards(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
    ) -> AdapterResult<()> {
        plan.append_void(CallDescriptor::new(ctx.pool, abi::GAUGE_CLAIM_REWARDS))?;
        Ok(())
    }

    fn append_harvest_rewards(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        underlying: Address,
    ) -> AdapterResult<()> {
        self.append_claim_rewards(plan, ctx)?;
        append_reward_swaps(
            plan,
            &self.helpers,
            ctx.vault,
            &ctx.meta.reward_tokens,
            underlying,
        )
    }

    async fn value_in_input_token(
        &self,
        _reader: &dyn StateReader,
        _ctx: &StepContext<'_>,
        amount: U256,
    ) -> ValuationResult<U256> {
        Ok(amount)
    }

    async fn value_in_output_token(
        &self,
        _reader: &dyn StateReader,
        _ctx: &StepContext<'_>,
        amount: U256,
    ) -> ValuationResult<U256> {
        Ok(amount)
    }

    async fn output_token_balance(
        &self,
        reader: &dyn StateReader,
        ctx: &StepContext<'_>,
    ) -> ValuationResult<U256> {
        reader
            .read(ctx.pool, abi::ERC20_BALANCE_OF, &[ReadArg::Address(ctx.vault)])
            .await
    }
}
