use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::plan::{CallDescriptor, PlanBuilder, SymbolicValue, ValueTag};
use crate::registry::ProtocolFamily;
use crate::valuation::{ReadArg, StateReader, ValuationResult};

use super::abi;
use super::error::AdapterResult;
use super::framework::{AmountArg, ProtocolAdapter, StepContext, append_approve};

/// ERC-4626 single-sided lending market: assets in, shares out. Value
/// conversion is the market's own `convertTo*` pair, so no external oracle
/// or slippage guard is involved.
#[derive(Debug, Default)]
pub struct LendingAdapter;

#[async_trait]
impl ProtocolAdapter for LendingAdapter {
    fn family(&self) -> ProtocolFamily {
        ProtocolFamily::Lending
    }

    fn append_deposit(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<()> {
        append_approve(plan, ctx.input_token, ctx.pool, amount)?;
        plan.append_void(
            CallDescriptor::new(ctx.pool, abi::MARKET_DEPOSIT)
                .with_arg(amount.to_arg())
                .with_arg(ctx.vault),
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
            CallDescriptor::new(ctx.pool, abi::MARKET_REDEEM)
                .with_arg(amount.to_arg())
                .with_arg(ctx.vault)
                .with_arg(ctx.vault),
        )?;
        Ok(())
    }

    fn append_value_in_input_token(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<AmountArg> {
        let value = plan.append(
            CallDescriptor::new(ctx.pool, abi::MARKET_CONVERT_TO_ASSETS)
                .with_arg(amount.to_arg()),
            ValueTag::Amount,
        )?;
        Ok(AmountArg::Value(value))
    }

    fn append_value_in_output_token(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<AmountArg> {
        let value = plan.append(
            CallDescriptor::new(ctx.pool, abi::MARKET_CONVERT_TO_SHARES)
                .with_arg(amount.to_arg()),
            ValueTag::Amount,
        )?;
        Ok(AmountArg::Value(value))
    }

    fn append_output_token_balance(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
    ) -> AdapterResult<SymbolicValue> {
        Ok(plan.append(
            abi::erc20_balance_of(ctx.output_token, ctx.vault),
            ValueTag::Amount,
        )?)
    }

    fn append_claim_rewards(
        &self,
        _plan: &mut PlanBuilder,
        _ctx: &StepContext<'_>,
    ) -> AdapterResult<()> {
        // No reward surface on a plain lending market.
        Ok(())
    }

    fn append_harvest_rewards(
        &self,
        _plan: &mut PlanBuilder,
        _ctx: &StepContext<'_>,
        _underlying: Address,
    ) -> AdapterResult<()> {
        Ok(())
    }

    async fn value_in_input_token(
        &self,
        reader: &dyn StateReader,
        ctx: &StepContext<'_>,
        amount: U256,
    ) -> ValuationResult<U256> {
        reader
            .read(ctx.pool, abi::MARKET_CONVERT_TO_ASSETS, &[ReadArg::Uint(amount)])
            .await
    }

    async fn value_in_output_token(
        &self,
        reader: &dyn StateReader,
        ctx: &StepContext<'_>,
        amount: U256,
    ) -> ValuationResult<U256> {
        reader
            .read(ctx.pool, abi::MARKET_CONVERT_TO_SHARES, &[ReadArg::Uint(amount)])
            .await
    }

    async fn output_token_balance(
        &self,
        reader: &dyn StateReader,
        ctx: &StepContext<'_>,
    ) -> ValuationResult<U256> {
        reader
            .read(
                ctx.output_token,
                abi::ERC20_BALANCE_OF,
                &[ReadArg::Address(ctx.vault)],
            )
            .await
    }
}
