pub mod error;
pub mod state;

pub use error::{ValuationError, ValuationResult};
pub use state::{
    BalanceEntry, CellEntry, RateEntry, ReadArg, SnapshotStateReader, StateReader, StateSnapshot,
};

use alloy_primitives::U256;
use tracing::debug;

use crate::compiler::{Strategy, StrategyManager};
use crate::protocols::abi;

/// Off-plan strategy valuation: walks the position from the outermost step
/// inward, converting through each hop with the same per-adapter semantics
/// the plan-side queries encode. Used by reporting tooling only; nothing
/// here appends to a plan.
pub struct StrategyValuer<'a> {
    manager: &'a StrategyManager,
}

impl<'a> StrategyValuer<'a> {
    pub fn new(manager: &'a StrategyManager) -> Self {
        Self { manager }
    }

    /// Total vault value denominated in the strategy's underlying asset:
    /// the cached idle amount plus the unwound position. Borrow-style hops
    /// contribute no balance of their own but still convert value carried
    /// from deeper hops.
    pub async fn total_value(
        &self,
        strategy: &Strategy,
        reader: &dyn StateReader,
    ) -> ValuationResult<U256> {
        let resolved = self.manager.resolve(strategy)?;
        let vault = self.manager.vault();

        let idle = reader
            .read(vault, abi::VAULT_AVAILABLE_ASSETS, &[])
            .await?;

        let mut position = U256::ZERO;
        for entry in resolved.iter().rev() {
            let ctx = entry.context(vault);
            if !ctx.is_borrow {
                let balance = entry.adapter.output_token_balance(reader, &ctx).await?;
                position = position.saturating_add(balance);
            }
            position = entry
                .adapter
                .value_in_input_token(reader, &ctx, position)
                .await?;
            debug!(
                target: "valuation",
                pool = %entry.step.pool,
                carried = %position,
                "hop valued"
            );
        }

        Ok(idle.saturating_add(position))
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use crate::compiler::{Strategy, StrategyStep};
    use crate::plan::{CallArg, PlanBuilder};
    use crate::protocols::{
        AmountArg, HelperContracts, LendingAdapter, ProtocolAdapter, StepContext,
    };
    use crate::registry::{PoolMeta, PoolRegistry, ProtocolFamily};

    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn helpers() -> HelperContracts {
        HelperContracts {
            price_oracle: addr(0xE0),
            slippage_guard: addr(0xE1),
            swap_router: addr(0xE2),
        }
    }

    fn manager_with_two_hops() -> (StrategyManager, Strategy) {
        let p1 = addr(0x10);
        let p2 = addr(0x20);
        let lending = PoolMeta {
            family: ProtocolFamily::Lending,
            tokens: Vec::new(),
            staking_id: None,
            reward_contract: None,
            reward_tokens: Vec::new(),
            tolerance_bp: 10,
        };
        let gauge = PoolMeta {
            family: ProtocolFamily::Gauge,
            ..lending.clone()
        };
        let registry =
            PoolRegistry::new(vec![(p1, lending), (p2, gauge)]).expect("valid registry");
        let manager = StrategyManager::new(addr(0x0A), registry, helpers());
        let strategy = Strategy::new(
            addr(0x01),
            vec![
                StrategyStep {
                    pool: p1,
                    output_token: addr(0x11),
                    is_borrow: false,
                },
                StrategyStep {
                    pool: p2,
                    output_token: addr(0x21),
                    is_borrow: false,
                },
            ],
        );
        (manager, strategy)
    }

    fn snapshot(vault: Address, strategy: &Strategy) -> SnapshotStateReader {
        SnapshotStateReader::new(StateSnapshot {
            balances: vec![
                // 100 gauge tokens staked (the gauge tracks its own balances).
                BalanceEntry {
                    token: strategy.steps[1].pool,
                    holder: vault,
                    amount: U256::from(100u64),
                },
                // 5 loose market shares left in the wallet.
                BalanceEntry {
                    token: strategy.steps[0].output_token,
                    holder: vault,
                    amount: U256::from(5u64),
                },
            ],
            rates: vec![RateEntry {
                target: strategy.steps[0].pool,
                signature: abi::MARKET_CONVERT_TO_ASSETS.to_string(),
                numerator: U256::from(21u64),
                denominator: U256::from(20u64),
            }],
            cells: vec![CellEntry {
                target: vault,
                signature: abi::VAULT_AVAILABLE_ASSETS.to_string(),
                value: U256::from(40u64),
            }],
        })
    }

    #[tokio::test]
    async fn total_value_unwinds_the_position_into_the_underlying() {
        let (manager, strategy) = manager_with_two_hops();
        let reader = snapshot(manager.vault(), &strategy);
        let valuer = StrategyValuer::new(&manager);
        let total = valuer
            .total_value(&strategy, &reader)
            .await
            .expect("valuation succeeds");
        // idle 40 + (100 staked + 5 loose shares) * 21/20 = 40 + 110 = 150.
        assert_eq!(total, U256::from(150u64));
    }

    #[tokio::test]
    async fn borrow_hops_contribute_no_balance_of_their_own() {
        let (manager, mut strategy) = manager_with_two_hops();
        strategy.steps[1].is_borrow = true;
        let reader = snapshot(manager.vault(), &strategy);
        let valuer = StrategyValuer::new(&manager);
        let total = valuer
            .total_value(&strategy, &reader)
            .await
            .expect("valuation succeeds");
        // The 100 staked gauge tokens are collateral, not value:
        // idle 40 + 5 loose shares * 21/20 = 40 + 5 = 45.
        assert_eq!(total, U256::from(45u64));
    }

    /// The plan-side conversion query and the direct read must agree for
    /// the same state.
    #[tokio::test]
    async fn plan_side_and_off_plan_valuation_agree() {
        let (manager, strategy) = manager_with_two_hops();
        let reader = snapshot(manager.vault(), &strategy);
        let meta = PoolMeta {
            family: ProtocolFamily::Lending,
            tokens: Vec::new(),
            staking_id: None,
            reward_contract: None,
            reward_tokens: Vec::new(),
            tolerance_bp: 10,
        };
        let ctx = StepContext {
            vault: manager.vault(),
            pool: strategy.steps[0].pool,
            input_token: strategy.underlying,
            output_token: strategy.steps[0].output_token,
            is_borrow: false,
            meta: &meta,
        };
        let shares = U256::from(200u64);

        // Off-plan path.
        let direct = LendingAdapter
            .value_in_input_token(&reader, &ctx, shares)
            .await
            .expect("direct read");

        // Plan path: append the query, then replay it against the same state.
        let mut plan = PlanBuilder::new();
        LendingAdapter
            .append_value_in_input_token(&mut plan, &ctx, AmountArg::Literal(shares))
            .expect("append conversion query");
        let plan = plan.finish();
        assert_eq!(plan.call_count(), 1);
        let call = &plan.calls()[0];
        let args: Vec<ReadArg> = call
            .args
            .iter()
            .map(|arg| match arg {
                CallArg::Uint(amount) => ReadArg::Uint(*amount),
                CallArg::Address(address) => ReadArg::Address(*address),
                other => panic!("unexpected arg in conversion query: {other:?}"),
            })
            .collect();
        let replayed = reader
            .read(call.target, call.signature, &args)
            .await
            .expect("replayed read");

        assert_eq!(direct, replayed);
        assert_eq!(direct, U256::from(210u64));
    }
}
