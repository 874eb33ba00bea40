use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::plan::{CallArg, CallDescriptor, PlanBuilder, SymbolicValue, ValueTag};
use crate::registry::ProtocolFamily;
use crate::valuation::{ReadArg, StateReader, ValuationResult};

use super::abi;
use super::error::{AdapterError, AdapterResult};
use super::framework::{
    AmountArg, HelperContracts, ProtocolAdapter, StepContext, append_approve,
    append_min_output_guard,
};

/// Multi-coin stable-swap pool. Deposits are single-sided `add_liquidity`
/// with the input amount at its resolved coin index; withdrawals are
/// `remove_liquidity_one_coin`. Both directions carry an oracle-derived
/// minimum-output guard since LP pricing moves with pool balance.
#[derive(Debug)]
pub struct StableSwapAdapter {
    helpers: HelperContracts,
}

impl StableSwapAdapter {
    pub fn new(helpers: HelperContracts) -> Self {
        Self { helpers }
    }

    fn coin_index(ctx: &StepContext<'_>, token: Address) -> AdapterResult<usize> {
        ctx.meta
            .token_index(token)
            .ok_or(AdapterError::UnknownTokenIndex {
                pool: ctx.pool,
                token,
            })
    }

    /// Fixed-length amounts array with `amount` at the resolved index and
    /// zero everywhere else.
    fn amounts_array(coin_count: usize, index: usize, amount: AmountArg) -> CallArg {
        CallArg::Array(
            (0..coin_count)
                .map(|position| {
                    if position == index {
                        amount.to_arg()
                    } else {
                        CallArg::Uint(U256::ZERO)
                    }
                })
                .collect(),
        )
    }
}

#[async_trait]
impl ProtocolAdapter for StableSwapAdapter {
    fn family(&self) -> ProtocolFamily {
        ProtocolFamily::StableSwap
    }

    fn append_deposit(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<()> {
        let index = Self::coin_index(ctx, ctx.input_token)?;
        append_approve(plan, ctx.input_token, ctx.pool, amount)?;
        let min_mint = append_min_output_guard(
            plan,
            &self.helpers,
            ctx.input_token,
            ctx.output_token,
            amount,
            ctx.meta.tolerance_bp,
        )?;
        plan.append_void(
            CallDescriptor::new(ctx.pool, abi::POOL_ADD_LIQUIDITY)
                .with_arg(Self::amounts_array(ctx.meta.tokens.len(), index, amount))
                .with_arg(CallArg::amount(min_mint)),
        )?;
        Ok(())
    }

    fn append_withdraw(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<()> {
        let index = Self::coin_index(ctx, ctx.input_token)?;
        let min_out = append_min_output_guard(
            plan,
            &self.helpers,
            ctx.output_token,
            ctx.input_token,
            amount,
            ctx.meta.tolerance_bp,
        )?;
        plan.append_void(
            CallDescriptor::new(ctx.pool, abi::POOL_REMOVE_LIQUIDITY_ONE_COIN)
                .with_arg(amount.to_arg())
                .with_arg(CallArg::Int(index as i128))
                .with_arg(CallArg::amount(min_out)),
        )?;
        Ok(())
    }

    fn append_value_in_input_token(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<AmountArg> {
        let index = Self::coin_index(ctx, ctx.input_token)?;
        let value = plan.append(
            CallDescriptor::new(ctx.pool, abi::POOL_CALC_WITHDRAW_ONE_COIN)
                .with_arg(amount.to_arg())
                .with_arg(CallArg::Int(index as i128)),
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
        let index = Self::coin_index(ctx, ctx.input_token)?;
        let value = plan.append(
            CallDescriptor::new(ctx.pool, abi::POOL_CALC_TOKEN_AMOUNT)
                .with_arg(Self::amounts_array(ctx.meta.tokens.len(), index, amount))
                .with_arg(true),
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
        // Bare pools accrue no claimable rewards; gauges and boosters do.
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
        let index = Self::coin_index(ctx, ctx.input_token)?;
        reader
            .read(
                ctx.pool,
                abi::POOL_CALC_WITHDRAW_ONE_COIN,
                &[ReadArg::Uint(amount), ReadArg::Int(index as i128)],
            )
            .await
    }

    async fn value_in_output_token(
        &self,
        reader: &dyn StateReader,
        ctx: &StepContext<'_>,
        amount: U256,
    ) -> ValuationResult<U256> {
        let index = Self::coin_index(ctx, ctx.input_token)?;
        reader
            .read(
                ctx.pool,
                abi::POOL_CALC_TOKEN_AMOUNT,
                &[
                    ReadArg::Uint(amount),
                    ReadArg::Int(index as i128),
                    ReadArg::Bool(true),
                ],
            )
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

#[cfg(test)]
mod tests {
    use crate::registry::PoolMeta;

    use super::*;

    fn helpers() -> HelperContracts {
        HelperContracts {
            price_oracle: Address::repeat_byte(0xE0),
            slippage_guard: Address::repeat_byte(0xE1),
            swap_router: Address::repeat_byte(0xE2),
        }
    }

    fn pool_meta(tokens: Vec<Address>) -> PoolMeta {
        PoolMeta {
            family: ProtocolFamily::StableSwap,
            tokens,
            staking_id: None,
            reward_contract: None,
            reward_tokens: Vec::new(),
            tolerance_bp: 10,
        }
    }

    #[test]
    fn deposit_places_the_amount_at_the_resolved_index() {
        let coin_a = Address::repeat_byte(0x01);
        let coin_b = Address::repeat_byte(0x02);
        let meta = pool_meta(vec![coin_a, coin_b]);
        let ctx = StepContext {
            vault: Address::repeat_byte(0x0A),
            pool: Address::repeat_byte(0x0B),
            input_token: coin_b,
            output_token: Address::repeat_byte(0x0C),
            is_borrow: false,
            meta: &meta,
        };
        let mut plan = PlanBuilder::new();
        let amount = plan
            .append(abi::erc20_balance_of(coin_b, ctx.vault), ValueTag::Amount)
            .expect("balance query");

        StableSwapAdapter::new(helpers())
            .append_deposit(&mut plan, &ctx, AmountArg::Value(amount))
            .expect("deposit appends");

        let plan = plan.finish();
        // balance, approve, expectedOutput, applyTolerance, add_liquidity
        assert_eq!(plan.call_count(), 5);
        let add = &plan.calls()[4];
        assert_eq!(add.signature, abi::POOL_ADD_LIQUIDITY);
        let CallArg::Array(amounts) = &add.args[0] else {
            panic!("amounts argument must be an array");
        };
        assert_eq!(amounts.len(), 2);
        assert_eq!(amounts[0], CallArg::Uint(U256::ZERO));
        assert_eq!(amounts[1], CallArg::amount(amount));
    }

    #[test]
    fn withdraw_guards_with_the_pool_tolerance() {
        let coin_a = Address::repeat_byte(0x01);
        let coin_b = Address::repeat_byte(0x02);
        let meta = pool_meta(vec![coin_a, coin_b]);
        let lp = Address::repeat_byte(0x0C);
        let ctx = StepContext {
            vault: Address::repeat_byte(0x0A),
            pool: Address::repeat_byte(0x0B),
            input_token: coin_a,
            output_token: lp,
            is_borrow: false,
            meta: &meta,
        };
        let mut plan = PlanBuilder::new();
        StableSwapAdapter::new(helpers())
            .append_withdraw(&mut plan, &ctx, AmountArg::Literal(U256::from(100u64)))
            .expect("withdraw appends");

        let plan = plan.finish();
        assert_eq!(plan.call_count(), 3);
        let guard = &plan.calls()[1];
        assert_eq!(guard.signature, abi::GUARD_APPLY_TOLERANCE);
        assert_eq!(guard.args[1], CallArg::Uint(U256::from(10u64)));
        let remove = &plan.calls()[2];
        assert_eq!(remove.signature, abi::POOL_REMOVE_LIQUIDITY_ONE_COIN);
        assert_eq!(remove.args[1], CallArg::Int(0));
    }

    #[test]
    fn unknown_coin_fails_index_resolution() {
        let meta = pool_meta(vec![Address::repeat_byte(0x01), Address::repeat_byte(0x02)]);
        let stranger = Address::repeat_byte(0x99);
        let ctx = StepContext {
            vault: Address::repeat_byte(0x0A),
            pool: Address::repeat_byte(0x0B),
            input_token: stranger,
            output_token: Address::repeat_byte(0x0C),
            is_borrow: false,
            meta: &meta,
        };
        let mut plan = PlanBuilder::new();
        let err = StableSwapAdapter::new(helpers())
            .append_deposit(&mut plan, &ctx, AmountArg::Literal(U256::ONE))
            .expect_err("unknown coin must fail");
        assert_eq!(
            err,
            AdapterError::UnknownTokenIndex {
                pool: ctx.pool,
                token: stranger
            }
        );
        // Nothing may be appended for the failed step.
        assert_eq!(plan.call_count(), 0);
    }
}
