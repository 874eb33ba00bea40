use alloy_primitives::Address;
use thiserror::Error;

use crate::compiler::CompileError;
use crate::protocols::error::AdapterError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValuationError {
    #[error("no state available for `{signature}` on {target}")]
    MissingState { target: Address, signature: String },
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("state provider failed: {0}")]
    Provider(String),
}

pub type ValuationResult<T> = Result<T, ValuationError>;
