use cosmwasm_std::StdError;
use thiserror::Error;

use crate::wasm::ExecutionError;

#[derive(Error, Debug, PartialEq)]
pub enum KeeperError {
    #[error("{0}")]
    Std(#[from] StdError),
    #[error("Invalid {field}: {reason}")]
    InvalidAddress { field: &'static str, reason: String },
    #[error("Empty max gas begin-blocker setting")]
    InvalidGasLimit,
    #[error("Invalid authority; expected {expected}, got {sender}")]
    Unauthorized { expected: String, sender: String },
    #[error("Begin block already dispatched for height {0}")]
    AlreadyDispatched(i64),
    #[error(transparent)]
    DispatchFailed(#[from] ExecutionError),
}
