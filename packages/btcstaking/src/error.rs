use babylon_apis::error::StakingApiError;
use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Std(#[from] StdError),
    #[error("{0}")]
    Validation(#[from] StakingApiError),
    #[error("Invalid commission rate: {0}, expected a decimal in [0, 1]")]
    InvalidCommission(String),
    #[error("Finality provider {btc_pk_hex} is already registered on consumer {consumer_id}")]
    DuplicateProvider {
        consumer_id: String,
        btc_pk_hex: String,
    },
    #[error("Malformed BTC delegation: {0}")]
    MalformedDelegation(String),
    #[error("Covenant quorum not met: {signers} distinct signers, quorum is {quorum}")]
    QuorumNotMet { signers: usize, quorum: u32 },
    #[error("Illegal transition {transition} for a {status} BTC delegation")]
    IllegalTransition {
        status: &'static str,
        transition: &'static str,
    },
    #[error("Encoding error: {0}")]
    EncodingError(String),
}

impl Error {
    pub fn malformed(err: impl ToString) -> Self {
        Error::MalformedDelegation(err.to_string())
    }
}

