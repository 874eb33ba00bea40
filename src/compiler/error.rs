use alloy_primitives::Address;
use thiserror::Error;

use crate::plan::PlanError;
use crate::protocols::AdapterError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("no adapter registered for pool {0}")]
    AdapterNotFound(Address),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error("plan construction failed: {0}")]
    Plan(#[from] PlanError),
}

pub type CompileResult<T> = Result<T, CompileError>;
