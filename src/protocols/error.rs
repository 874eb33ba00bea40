use alloy_primitives::Address;
use thiserror::Error;

use crate::plan::PlanError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("pool {pool} has no index for token {token}")]
    UnknownTokenIndex { pool: Address, token: Address },
    #[error("no harvest route into underlying asset {underlying}")]
    UnsupportedHarvestTarget { underlying: Address },
    #[error("pool {pool} is missing required metadata field `{field}`")]
    MissingPoolField { pool: Address, field: &'static str },
    #[error("plan construction failed: {0}")]
    Plan(#[from] PlanError),
}

pub type AdapterResult<T> = Result<T, AdapterError>;
