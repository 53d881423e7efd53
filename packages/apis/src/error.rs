use hex::FromHexError;
use thiserror::Error;

use cosmwasm_std::StdError;

#[derive(Error, Debug, PartialEq)]
pub enum StakingApiError {
    #[error("{0}")]
    Std(#[from] StdError),
    #[error("{0}")]
    HexError(#[from] FromHexError),
    #[error("Staking tx hash hex string is not {0} chars long")]
    InvalidStakingTxHash(usize),
    #[error("Invalid Btc public key {0}: expected {1} bytes in lowercase hex")]
    InvalidBtcPk(String, usize),
    #[error("Empty Btc public key")]
    EmptyBtcPk,
    #[error("Empty Btc private key")]
    EmptyBtcSk,
    #[error("Empty consumer id")]
    EmptyConsumerId,
    #[error("No Finality Providers Btc public keys")]
    EmptyBtcPkList,
    #[error("Duplicate Finality Provider Btc public key: {0}")]
    DuplicatedBtcPk(String),
    #[error("Empty Staking tx")]
    EmptyStakingTx,
    #[error("Empty Slashing tx")]
    EmptySlashingTx,
    #[error("Empty Unbonding tx")]
    EmptyUnbondingTx,
    #[error("Missing undelegation info")]
    MissingUnbondingInfo,
    #[error("Invalid unbonding time blocks: {0}, max: {1}")]
    ErrInvalidUnbondingTime(u32, u32),
    #[error("Invalid time-lock range: start height {0} is not lower than end height {1}")]
    InvalidTimeLock(u64, u64),
    #[error("Empty staking amount")]
    EmptyStake,
    #[error("Covenant {0} has {1} adaptor signatures, expected {2}")]
    AdaptorSigCountMismatch(String, usize, usize),
    #[error("Empty signature from the delegator")]
    EmptySignature,
    #[error("Invalid address: {0}")]
    InvalidAddressString(String),
}
