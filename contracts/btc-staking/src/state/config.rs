use std::collections::HashSet;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Order, Storage};
use cw_controllers::Admin;
use cw_storage_plus::{Item, Map};

use babylon_apis::error::StakingApiError;
use babylon_apis::validate_btc_pk_hex;

use crate::error::ContractError;

pub(crate) const CONFIG: Item<Config> = Item::new("config");
/// BTC staking params by version
pub(crate) const PARAMS: Map<u32, StakingParams> = Map::new("params");
/// Storage for admin
pub(crate) const ADMIN: Admin = Admin::new("admin");

/// Config are Babylon-selectable BTC staking configuration
#[cw_serde]
pub struct Config {
    /// `babylon` is the address allowed to relay BTC staking packets, besides the admin
    pub babylon: Addr,
}

/// StakingParams define Consumer-selectable BTC staking parameters.
/// Delegations pin the version they were validated with through their `params_version`.
#[cw_serde]
#[derive(Default)]
pub struct StakingParams {
    /// `covenant_pks` is the list of public keys held by the covenant committee each PK
    /// follows encoding in BIP-340 spec on Bitcoin
    pub covenant_pks: Vec<String>,
    /// `covenant_quorum` is the minimum number of signatures needed for the covenant multi-signature
    pub covenant_quorum: u32,
}

impl StakingParams {
    pub fn validate(&self) -> Result<(), ContractError> {
        let mut seen = HashSet::new();
        for pk in &self.covenant_pks {
            validate_btc_pk_hex(pk)?;
            if !seen.insert(pk) {
                return Err(StakingApiError::DuplicatedBtcPk(pk.clone()).into());
            }
        }
        if self.covenant_quorum as usize > self.covenant_pks.len() {
            return Err(ContractError::InvalidQuorum {
                quorum: self.covenant_quorum,
                committee: self.covenant_pks.len(),
            });
        }
        Ok(())
    }

    pub fn is_covenant_member(&self, pk: &str) -> bool {
        self.covenant_pks.iter().any(|cov_pk| cov_pk == pk)
    }
}

/// next_params_version returns the version the next added params will be stored under
pub(crate) fn next_params_version(storage: &dyn Storage) -> Result<u32, ContractError> {
    let last = PARAMS
        .keys(storage, None, None, Order::Descending)
        .next()
        .transpose()?;
    Ok(last.map_or(0, |version| version + 1))
}

pub(crate) fn load_params(
    storage: &dyn Storage,
    version: u32,
) -> Result<StakingParams, ContractError> {
    PARAMS
        .may_load(storage, version)?
        .ok_or(ContractError::ParamsVersionNotFound(version))
}
