use cosmwasm_schema::cw_serde;
use cosmwasm_std::{StdResult, Storage};
use cw_storage_plus::Item;

use babylon_apis::{encode_bech32_addr, new_canonical_addr};

use crate::error::KeeperError;

/// Default gas ceiling of the begin block sudo call
pub const DEFAULT_MAX_GAS_BEGIN_BLOCKER: u32 = 500_000;

/// Length of account addresses
const ADDRESS_LEN: usize = 20;

const PARAMS: Item<Params> = Item::new("params");

/// Params are the parameters of the Babylon module
#[cw_serde]
pub struct Params {
    /// babylon_contract_address is the address of the Babylon contract, notified on every block.
    /// The empty address means the contract is not deployed yet
    pub babylon_contract_address: String,
    /// btc_staking_contract_address is the address of the BTC staking contract
    pub btc_staking_contract_address: String,
    /// max_gas_begin_blocker is the gas limit of the begin block sudo call
    pub max_gas_begin_blocker: u32,
}

impl Params {
    /// validate checks both addresses are valid bech32 addresses with the given prefix, and the
    /// gas limit is positive
    pub fn validate(&self, prefix: &str) -> Result<(), KeeperError> {
        validate_addr(
            "babylon_contract_address",
            &self.babylon_contract_address,
            prefix,
        )?;
        validate_addr(
            "btc_staking_contract_address",
            &self.btc_staking_contract_address,
            prefix,
        )?;
        if self.max_gas_begin_blocker == 0 {
            return Err(KeeperError::InvalidGasLimit);
        }
        Ok(())
    }
}

fn validate_addr(field: &'static str, addr: &str, prefix: &str) -> Result<(), KeeperError> {
    new_canonical_addr(addr, prefix).map_err(|e| KeeperError::InvalidAddress {
        field,
        reason: e.to_string(),
    })?;
    Ok(())
}

/// empty_addr returns the canonical empty address: the all-zeros account address
pub fn empty_addr(prefix: &str) -> Result<String, KeeperError> {
    encode_bech32_addr(&[0u8; ADDRESS_LEN], prefix).map_err(|e| KeeperError::InvalidAddress {
        field: "bech32 prefix",
        reason: e.to_string(),
    })
}

/// is_empty_addr checks whether `addr` is the canonical empty address, whatever its case
pub fn is_empty_addr(addr: &str, prefix: &str) -> bool {
    new_canonical_addr(addr, prefix).is_ok_and(|addr| addr.as_slice() == [0u8; ADDRESS_LEN])
}

/// set_params validates and stores the params, overwriting the previous ones
pub fn set_params(
    storage: &mut dyn Storage,
    params: &Params,
    prefix: &str,
) -> Result<(), KeeperError> {
    params.validate(prefix)?;
    PARAMS.save(storage, params)?;
    Ok(())
}

/// get_params returns the stored params, if any
pub fn get_params(storage: &dyn Storage) -> StdResult<Option<Params>> {
    PARAMS.may_load(storage)
}
