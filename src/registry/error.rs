use alloy_primitives::Address;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("pool {0} is registered more than once")]
    DuplicatePool(Address),
    #[error("pool {pool} is missing required metadata field `{field}`")]
    MissingField { pool: Address, field: &'static str },
    #[error("pool {pool} tolerance {tolerance_bp} bp is outside the allowed 5..=100 range")]
    ToleranceOutOfRange { pool: Address, tolerance_bp: u16 },
}

pub type RegistryResult<T> = Result<T, RegistryError>;
