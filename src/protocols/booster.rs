use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::plan::{CallDescriptor, PlanBuilder, SymbolicValue, ValueTag};
use crate::registry::ProtocolFamily;
use crate::valuation::{ReadArg, StateReader, ValuationResult};

use super::abi;
use super::error::{AdapterError, AdapterResult};
use super::framework::{AmountArg, HelperContracts, ProtocolAdapter, StepContext, append_approve};
use super::routes::append_reward_swaps;

/// Booster staking: deposits are keyed by a staking pool id and immediately
/// staked; balances and reward accounting live on a dedicated reward pool
/// contract, which is also where withdrawals unwrap from.
#[derive(Debug)]
pub struct BoosterAdapter {
    helpers: HelperContracts,
}

impl BoosterAdapter {
    pub fn new(helpers: HelperContracts) -> Self {
        Self { helpers }
    }

    fn staking_id(ctx: &StepContext<'_>) -> AdapterResult<u64> {
        ctx.meta
            .staking_id
            .ok_or(AdapterError::MissingPoolField {
                pool: ctx.pool,
                field: "staking_id",
            })
    }

    fn reward_pool(ctx: &StepContext<'_>) -> AdapterResult<Address> {
        ctx.meta
            .reward_contract
            .ok_or(AdapterError::MissingPoolField {
                pool: ctx.pool,
                field: "reward_contract",
            })
    }
}

#[async_trait]
impl ProtocolAdapter for BoosterAdapter {
    fn family(&self) -> ProtocolFamily {
        ProtocolFamily::Booster
    }

    fn append_deposit(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<()> {
        let pid = Self::staking_id(ctx)?;
        append_approve(plan, ctx.input_token, ctx.pool, amount)?;
        plan.append_void(
            CallDescriptor::new(ctx.pool, abi::BOOSTER_DEPOSIT)
                .with_arg(U256::from(pid))
                .with_arg(amount.to_arg())
                .with_arg(true),
        )?;
        Ok(())
    }

    fn append_withdraw(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<()> {
        let reward_pool = Self::reward_pool(ctx)?;
        plan.append_void(
            CallDescriptor::new(reward_pool, abi::REWARD_POOL_WITHDRAW_AND_UNWRAP)
                .with_arg(amount.to_arg())
                .with_arg(false),
        )?;
        Ok(())
    }

    fn append_value_in_input_token(
        &self,
        _plan: &mut PlanBuilder,
        _ctx: &StepContext<'_>,
        amount: AmountArg,
    ) -> AdapterResult<AmountArg> {
        // Staked positions unwrap 1:1 into the deposited token.
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
        let reward_pool = Self::reward_pool(ctx)?;
        Ok(plan.append(
            abi::erc20_balance_of(reward_pool, ctx.vault),
            ValueTag::Amount,
        )?)
    }

    fn append_claim_rewards(
        &self,
        plan: &mut PlanBuilder,
        ctx: &StepContext<'_>,
    ) -> AdapterResult<()> {
        let reward_pool = Self::reward_pool(ctx)?;
        plan.append_void(
            CallDescriptor::new(reward_pool, abi::REWARD_POOL_GET_REWARD)
                .with_arg(ctx.vault)
                .with_arg(true),
        )?;
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
        let reward_pool = Self::reward_pool(ctx)?;
        reader
            .read(
                reward_pool,
                abi::ERC20_BALANCE_OF,
                &[ReadArg::Address(ctx.vault)],
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::plan::CallArg;
    use crate::registry::PoolMeta;

    use super::super::routes;
    use super::*;

    fn helpers() -> HelperContracts {
        HelperContracts {
            price_oracle: Address::repeat_byte(0xE0),
            slippage_guard: Address::repeat_byte(0xE1),
            swap_router: Address::repeat_byte(0xE2),
        }
    }

    fn meta() -> PoolMeta {
        PoolMeta {
            family: ProtocolFamily::Booster,
            tokens: Vec::new(),
            staking_id: Some(42),
            reward_contract: Some(Address::repeat_byte(0xD0)),
            reward_tokens: vec![routes::CRV, routes::CVX],
            tolerance_bp: 10,
        }
    }

    fn ctx<'a>(meta: &'a PoolMeta) -> StepContext<'a> {
        StepContext {
            vault: Address::repeat_byte(0x0A),
            pool: Address::repeat_byte(0x0B),
            input_token: Address::repeat_byte(0x0C),
            output_token: Address::repeat_byte(0x0D),
            is_borrow: false,
            meta,
        }
    }

    #[test]
    fn deposit_stakes_behind_the_configured_pid() {
        let meta = meta();
        let ctx = ctx(&meta);
        let mut plan = PlanBuilder::new();
        BoosterAdapter::new(helpers())
            .append_deposit(&mut plan, &ctx, AmountArg::Literal(U256::from(9u64)))
            .expect("deposit appends");
        let plan = plan.finish();
        assert_eq!(plan.call_count(), 2);
        let deposit = &plan.calls()[1];
        assert_eq!(deposit.signature, abi::BOOSTER_DEPOSIT);
        assert_eq!(deposit.args[0], CallArg::Uint(U256::from(42u64)));
        assert_eq!(deposit.args[2], CallArg::Bool(true));
    }

    #[test]
    fn withdraw_unwraps_from_the_reward_pool() {
        let meta = meta();
        let ctx = ctx(&meta);
        let mut plan = PlanBuilder::new();
        BoosterAdapter::new(helpers())
            .append_withdraw(&mut plan, &ctx, AmountArg::Literal(U256::from(3u64)))
            .expect("withdraw appends");
        let plan = plan.finish();
        assert_eq!(plan.call_count(), 1);
        let withdraw = &plan.calls()[0];
        assert_eq!(withdraw.target, Address::repeat_byte(0xD0));
        assert_eq!(withdraw.signature, abi::REWARD_POOL_WITHDRAW_AND_UNWRAP);
        assert_eq!(withdraw.args[1], CallArg::Bool(false));
    }

    #[test]
    fn missing_reward_pool_is_a_configuration_error() {
        let meta = PoolMeta {
            reward_contract: None,
            ..meta()
        };
        let ctx = ctx(&meta);
        let mut plan = PlanBuilder::new();
        let err = BoosterAdapter::new(helpers())
            .append_withdraw(&mut plan, &ctx, AmountArg::Literal(U256::ONE))
            .expect_err("missing reward pool must fail");
        assert_eq!(
            err,
            AdapterError::MissingPoolField {
                pool: ctx.pool,
                field: "reward_contract"
            }
        );
        assert_eq!(plan.call_count(), 0);
    }

    #[test]
    fn harvest_swaps_every_configured_reward_token() {
        let meta = meta();
        let ctx = ctx(&meta);
        let mut plan = PlanBuilder::new();
        BoosterAdapter::new(helpers())
            .append_harvest_rewards(&mut plan, &ctx, routes::USDC)
            .expect("harvest appends");
        let plan = plan.finish();
        // claim + 2 rewards x (balance, approve, expected, tolerance, swap)
        assert_eq!(plan.call_count(), 11);
        let swaps: Vec<_> = plan
            .calls()
            .iter()
            .filter(|call| call.signature == abi::ROUTER_SWAP_EXACT_TOKENS)
            .collect();
        assert_eq!(swaps.len(), 2);
    }
}
