use cosmwasm_schema::cw_serde;
use cosmwasm_std::{StdResult, Storage};

use crate::error::KeeperError;
use crate::keeper::Keeper;
use crate::params::Params;
use crate::wasm::ContractExecutor;

/// GenesisState is the genesis state of the Babylon module
#[cw_serde]
pub struct GenesisState {
    pub params: Params,
}

impl GenesisState {
    pub fn validate(&self, prefix: &str) -> Result<(), KeeperError> {
        self.params.validate(prefix)
    }
}

impl<E: ContractExecutor> Keeper<E> {
    pub fn default_genesis(&self) -> GenesisState {
        GenesisState {
            params: self.default_params(),
        }
    }

    /// init_genesis validates and stores the genesis params
    pub fn init_genesis(
        &self,
        storage: &mut dyn Storage,
        genesis: &GenesisState,
    ) -> Result<(), KeeperError> {
        genesis.validate(self.bech32_prefix())?;
        self.set_params(storage, &genesis.params)
    }

    pub fn export_genesis(&self, storage: &dyn Storage) -> StdResult<GenesisState> {
        Ok(GenesisState {
            params: self.get_params(storage)?,
        })
    }
}
