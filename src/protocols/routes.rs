//! Curated harvest swap routes.
//!
//! Routes are an explicit finite `(reward token, underlying asset)` table,
//! not a path-finder: each entry encodes a liquidity assumption reviewed
//! when the route was added, together with the slippage allowance that
//! assumption supports. An underlying asset absent from the table cannot be
//! harvested into and fails compilation.

use std::collections::HashMap;

use alloy_primitives::{Address, U256, address};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::plan::{CallArg, CallDescriptor, PlanBuilder, ValueTag};

use super::abi;
use super::error::{AdapterError, AdapterResult};
use super::framework::{AmountArg, HelperContracts, append_approve, append_min_output_guard};

pub const CRV: Address = address!("D533a949740bb3306d119CC777fa900bA034cd52");
pub const CVX: Address = address!("4e3FBD56CD56c3e72c1403e103b45Db9da5B9D2B");
pub const LDO: Address = address!("5A98FcBEA516Cf06857215779Fd812CA3beF1B32");
pub const WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
pub const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
pub const USDT: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");
pub const DAI: Address = address!("6B175474E89094C44Da98b954EedeAC495271d0F");
pub const WBTC: Address = address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestRoute {
    /// Swap hop path, reward token first, underlying asset last.
    pub path: Vec<Address>,
    /// Slippage allowance for this route's assumed liquidity depth.
    pub tolerance_bp: u16,
}

static ROUTES: Lazy<HashMap<(Address, Address), HarvestRoute>> = Lazy::new(|| {
    let mut routes = HashMap::new();
    let mut add = |reward: Address, underlying: Address, path: Vec<Address>, tolerance_bp: u16| {
        routes.insert((reward, underlying), HarvestRoute { path, tolerance_bp });
    };

    add(CRV, WETH, vec![CRV, WETH], 30);
    add(CRV, USDC, vec![CRV, WETH, USDC], 50);
    add(CRV, USDT, vec![CRV, WETH, USDT], 50);
    add(CRV, DAI, vec![CRV, WETH, DAI], 50);
    add(CRV, WBTC, vec![CRV, WETH, WBTC], 100);

    add(CVX, WETH, vec![CVX, WETH], 50);
    add(CVX, USDC, vec![CVX, WETH, USDC], 100);
    add(CVX, USDT, vec![CVX, WETH, USDT], 100);
    add(CVX, DAI, vec![CVX, WETH, DAI], 100);

    add(LDO, WETH, vec![LDO, WETH], 50);
    add(LDO, USDC, vec![LDO, WETH, USDC], 100);

    add(WETH, USDC, vec![WETH, USDC], 5);
    add(WETH, USDT, vec![WETH, USDT], 5);
    add(WETH, DAI, vec![WETH, DAI], 10);

    routes
});

/// Route for converting `reward` into `underlying`, if one is curated.
pub fn harvest_route(reward: Address, underlying: Address) -> Option<&'static HarvestRoute> {
    ROUTES.get(&(reward, underlying))
}

/// Minimum acceptable output after applying a basis-point tolerance,
/// rounding down. This is the reference for what the on-chain guard
/// computes from the oracle-expected output.
pub fn min_output_after_tolerance(expected: U256, tolerance_bp: u16) -> U256 {
    let denominator = U256::from(10_000u64);
    expected.saturating_mul(denominator - U256::from(tolerance_bp)) / denominator
}

/// Append, for each reward token, the balance query, router approval,
/// min-output guard and swap that liquidate the claimed balance into the
/// vault's underlying asset.
pub(crate) fn append_reward_swaps(
    plan: &mut PlanBuilder,
    helpers: &HelperContracts,
    vault: Address,
    reward_tokens: &[Address],
    underlying: Address,
) -> AdapterResult<()> {
    for &reward in reward_tokens {
        if reward == underlying {
            continue;
        }
        let route = harvest_route(reward, underlying)
            .ok_or(AdapterError::UnsupportedHarvestTarget { underlying })?;
        debug!(
            target: "protocols::routes",
            reward = %reward,
            underlying = %underlying,
            hops = route.path.len(),
            tolerance_bp = route.tolerance_bp,
            "harvest route selected"
        );

        let claimed = plan.append(abi::erc20_balance_of(reward, vault), ValueTag::Amount)?;
        append_approve(
            plan,
            reward,
            helpers.swap_router,
            AmountArg::Value(claimed),
        )?;
        let min_out = append_min_output_guard(
            plan,
            helpers,
            reward,
            underlying,
            AmountArg::Value(claimed),
            route.tolerance_bp,
        )?;
        let path = CallArg::Array(route.path.iter().copied().map(CallArg::Address).collect());
        plan.append_void(
            CallDescriptor::new(helpers.swap_router, abi::ROUTER_SWAP_EXACT_TOKENS)
                .with_arg(CallArg::amount(claimed))
                .with_arg(CallArg::amount(min_out))
                .with_arg(path)
                .with_arg(vault),
        )?;
    }
    Ok(())
}
