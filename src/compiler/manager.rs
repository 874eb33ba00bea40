use alloy_primitives::{Address, U256};
use tracing::{debug, info};

use crate::plan::{CallDescriptor, Plan, PlanBuilder, SymbolicValue, ValueTag};
use crate::protocols::{AdapterSet, AmountArg, HelperContracts, ProtocolAdapter, StepContext, abi};
use crate::registry::{PoolMeta, PoolRegistry};

use super::error::{CompileError, CompileResult};
use super::types::{Direction, Strategy, StrategyStep};

/// 策略编译器。持有静态注册表与适配器集合，自身无每次编译状态，可被多个
/// 调用方并发使用；每次编译只写入该次调用私有的计划。
pub struct StrategyManager {
    vault: Address,
    registry: PoolRegistry,
    adapters: AdapterSet,
}

/// One step with its adapter and metadata resolved, plus the derived input
/// token. Resolution happens for the whole strategy before any call is
/// appended, so a configuration hole never yields a partial plan.
pub(crate) struct ResolvedStep<'a> {
    pub(crate) step: &'a StrategyStep,
    pub(crate) input_token: Address,
    pub(crate) meta: &'a PoolMeta,
    pub(crate) adapter: &'a dyn ProtocolAdapter,
}

impl<'a> ResolvedStep<'a> {
    pub(crate) fn context(&self, vault: Address) -> StepContext<'a> {
        StepContext {
            vault,
            pool: self.step.pool,
            input_token: self.input_token,
            output_token: self.step.output_token,
            is_borrow: self.step.is_borrow,
            meta: self.meta,
        }
    }
}

impl StrategyManager {
    pub fn new(vault: Address, registry: PoolRegistry, helpers: HelperContracts) -> Self {
        Self {
            vault,
            registry,
            adapters: AdapterSet::new(helpers),
        }
    }

    pub fn vault(&self) -> Address {
        self.vault
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    /// Adapter and metadata for every step, in deposit order. Fails with
    /// the first unmapped pool.
    pub(crate) fn resolve<'a>(
        &'a self,
        strategy: &'a Strategy,
    ) -> CompileResult<Vec<ResolvedStep<'a>>> {
        strategy
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let meta = self
                    .registry
                    .meta(step.pool)
                    .ok_or(CompileError::AdapterNotFound(step.pool))?;
                Ok(ResolvedStep {
                    step,
                    input_token: strategy.input_token(index),
                    meta,
                    adapter: self.adapters.for_family(meta.family),
                })
            })
            .collect()
    }

    /// Check a strategy against the registry without building a plan:
    /// adapter mapping totality plus the per-family metadata the adapters
    /// will rely on.
    pub fn validate(&self, strategy: &Strategy) -> CompileResult<()> {
        let resolved = self.resolve(strategy)?;
        for entry in &resolved {
            // A throwaway builder: validation must not observe partial plans.
            let mut scratch = PlanBuilder::new();
            let ctx = entry.context(self.vault);
            entry
                .adapter
                .append_deposit(&mut scratch, &ctx, AmountArg::Literal(U256::ONE))?;
            entry
                .adapter
                .append_withdraw(&mut scratch, &ctx, AmountArg::Literal(U256::ONE))?;
        }
        Ok(())
    }

    pub fn compile(&self, strategy: &Strategy, direction: Direction) -> CompileResult<Plan> {
        match direction {
            Direction::Deposit => self.compile_deposit(strategy),
            Direction::Withdraw => self.compile_withdraw(strategy),
        }
    }

    /// Forward traversal: every step consumes a freshly queried balance,
    /// the vault's cached underlying amount for the first hop, the previous
    /// hop's output-token balance after that. Amounts are never literals;
    /// the true figures exist only at execution time.
    pub fn compile_deposit(&self, strategy: &Strategy) -> CompileResult<Plan> {
        let resolved = self.resolve(strategy)?;
        let mut plan = PlanBuilder::new();

        for (index, entry) in resolved.iter().enumerate() {
            let amount = if index == 0 {
                self.append_available_assets(&mut plan)?
            } else {
                self.append_wallet_balance(&mut plan, resolved[index - 1].step.output_token)?
            };
            entry
                .adapter
                .append_deposit(&mut plan, &entry.context(self.vault), AmountArg::Value(amount))?;
            debug!(
                target: "compiler",
                step = index,
                pool = %entry.step.pool,
                family = entry.adapter.family().as_str(),
                "deposit step appended"
            );
        }

        self.finish(plan, Direction::Deposit, resolved.len())
    }

    /// Reverse traversal: a multi-hop position unwinds from the outermost
    /// wrapper inward, so the last deposit-order step is processed first.
    pub fn compile_withdraw(&self, strategy: &Strategy) -> CompileResult<Plan> {
        let resolved = self.resolve(strategy)?;
        let mut plan = PlanBuilder::new();
        let last = resolved.len().saturating_sub(1);

        for (index, entry) in resolved.iter().enumerate().rev() {
            let amount = if index == last {
                // The outermost step redeems the requested amount cached by
                // the vault runtime, not the whole staked balance, so that
                // partial withdrawals stay possible.
                // TODO: confirm with product whether this asymmetry against
                // the inner steps' balance reads is intended long-term.
                plan.append(
                    CallDescriptor::new(self.vault, abi::VAULT_PENDING_WITHDRAWAL),
                    ValueTag::Amount,
                )?
            } else {
                self.append_wallet_balance(&mut plan, entry.step.output_token)?
            };
            entry.adapter.append_withdraw(
                &mut plan,
                &entry.context(self.vault),
                AmountArg::Value(amount),
            )?;
            debug!(
                target: "compiler",
                step = index,
                pool = %entry.step.pool,
                family = entry.adapter.family().as_str(),
                "withdraw step appended"
            );
        }

        self.finish(plan, Direction::Withdraw, resolved.len())
    }

    /// Claim and liquidate every step's outstanding rewards into the
    /// strategy's underlying asset. Steps without a reward surface append
    /// nothing.
    pub fn compile_harvest(&self, strategy: &Strategy) -> CompileResult<Plan> {
        let resolved = self.resolve(strategy)?;
        let mut plan = PlanBuilder::new();
        for entry in &resolved {
            entry.adapter.append_harvest_rewards(
                &mut plan,
                &entry.context(self.vault),
                strategy.underlying,
            )?;
        }
        info!(
            target: "compiler",
            steps = resolved.len(),
            calls = plan.call_count(),
            underlying = %strategy.underlying,
            "harvest plan compiled"
        );
        Ok(plan.finish())
    }

    fn append_available_assets(&self, plan: &mut PlanBuilder) -> CompileResult<SymbolicValue> {
        Ok(plan.append(
            CallDescriptor::new(self.vault, abi::VAULT_AVAILABLE_ASSETS),
            ValueTag::Amount,
        )?)
    }

    fn append_wallet_balance(
        &self,
        plan: &mut PlanBuilder,
        token: Address,
    ) -> CompileResult<SymbolicValue> {
        Ok(plan.append(abi::erc20_balance_of(token, self.vault), ValueTag::Amount)?)
    }

    fn finish(
        &self,
        plan: PlanBuilder,
        direction: Direction,
        steps: usize,
    ) -> CompileResult<Plan> {
        info!(
            target: "compiler",
            direction = direction.as_str(),
            steps,
            calls = plan.call_count(),
            "plan compiled"
        );
        Ok(plan.finish())
    }
}
