use thiserror::Error;

use super::types::ValueTag;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("call #{call} references value #{value} which has not been produced yet")]
    ForwardReference { call: usize, value: u32 },
    #[error("call #{call} expects a {expected:?} value but #{value} carries {actual:?}")]
    TagMismatch {
        call: usize,
        value: u32,
        expected: ValueTag,
        actual: ValueTag,
    },
}

pub type PlanResult<T> = Result<T, PlanError>;
