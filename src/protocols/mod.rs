pub mod abi;
pub mod booster;
pub mod error;
pub mod framework;
pub mod gauge;
pub mod lending;
pub mod routes;
pub mod stable_swap;

pub use booster::BoosterAdapter;
pub use error::{AdapterError, AdapterResult};
pub use framework::{AmountArg, HelperContracts, ProtocolAdapter, StepContext};
pub use gauge::GaugeAdapter;
pub use lending::LendingAdapter;
pub use stable_swap::StableSwapAdapter;

use crate::registry::ProtocolFamily;

/// One adapter instance per protocol family, constructed once with the
/// helper contract addresses and shared by every compilation.
#[derive(Debug)]
pub struct AdapterSet {
    lending: LendingAdapter,
    stable_swap: StableSwapAdapter,
    gauge: GaugeAdapter,
    booster: BoosterAdapter,
}

impl AdapterSet {
    pub fn new(helpers: HelperContracts) -> Self {
        Self {
            lending: LendingAdapter,
            stable_swap: StableSwapAdapter::new(helpers),
            gauge: GaugeAdapter::new(helpers),
            booster: BoosterAdapter::new(helpers),
        }
    }

    pub fn for_family(&self, family: ProtocolFamily) -> &dyn ProtocolAdapter {
        match family {
            ProtocolFamily::Lending => &self.lending,
            ProtocolFamily::StableSwap => &self.stable_swap,
            ProtocolFamily::Gauge => &self.gauge,
            ProtocolFamily::Booster => &self.booster,
        }
    }
}
