use cosmwasm_std::StdError;
use cw_controllers::AdminError;
use cw_utils::PaymentError;
use hex::FromHexError;
use thiserror::Error;

use babylon_apis::error::StakingApiError;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    StdError(#[from] StdError),
    #[error("{0}")]
    Payment(#[from] PaymentError),
    #[error("{0}")]
    Admin(#[from] AdminError),
    #[error("{0}")]
    HexError(#[from] FromHexError),
    #[error("{0}")]
    StakingApi(#[from] StakingApiError),
    #[error("{0}")]
    Staking(#[from] babylon_btcstaking::error::Error),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("The hash length is invalid: {0}")]
    WrongHashLength(usize),
    #[error("Staking tx hash already exists: {0}")]
    DelegationAlreadyExists(String),
    #[error("Delegation not found: {0}")]
    DelegationNotFound(String),
    #[error("BTC staking params version {0} not found")]
    ParamsVersionNotFound(u32),
    #[error("Covenant quorum {quorum} is invalid for a committee of {committee} members")]
    InvalidQuorum { quorum: u32, committee: usize },
    #[error("Covenant {0} is not a member of the covenant committee")]
    UnknownCovenantMember(String),
}
