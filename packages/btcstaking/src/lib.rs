//! BTC staking lifecycle model.
//!
//! `finality_provider` and `delegation` hold the entities and their legal transitions, `codec`
//! maps them to and from the JSON packets relayed from the provider chain.
pub mod codec;
pub mod delegation;
pub mod error;
pub mod finality_provider;

pub use delegation::{
    admit_delegation, begin_unbonding, count_distinct_signers, mark_slashed, mark_unbonded,
    BtcDelegation, Delegation, DelegationId, UnbondingDelegation, UndelegationInfo,
};
pub use finality_provider::FinalityProvider;

pub type Result<T> = std::result::Result<T, error::Error>;
