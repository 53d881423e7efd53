//! Host-side module of the Babylon consumer integration.
//!
//! The [`Keeper`] holds the module parameters and, once per block, notifies the Babylon contract
//! with a gas-bounded `begin_block` sudo call. Contract execution is an external capability,
//! reached through [`ContractExecutor`].
pub mod error;
pub mod genesis;
pub mod keeper;
pub mod params;
pub mod wasm;

pub use error::KeeperError;
pub use genesis::GenesisState;
pub use keeper::{HeaderInfo, Keeper};
pub use params::Params;
pub use wasm::{ContractExecutor, ExecutionError, GasMeter};
