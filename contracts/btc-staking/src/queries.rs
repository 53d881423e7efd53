use cosmwasm_std::{Deps, Order, StdResult};
use cw_storage_plus::Bound;

use babylon_btcstaking::{BtcDelegation, FinalityProvider};

use crate::error::ContractError;
use crate::msg::{BtcDelegationsResponse, FinalityProvidersResponse};
use crate::staking::parse_staking_tx_hash;
use crate::state::config::{load_params, Config, StakingParams, CONFIG, PARAMS};
use crate::state::staking::{DELEGATIONS, FPS};
use crate::state::{BlockInfo, LAST_BLOCK};

pub fn config(deps: Deps) -> StdResult<Config> {
    CONFIG.load(deps.storage)
}

/// Get the BTC staking params of the given version, or the latest ones
pub fn params(deps: Deps, version: Option<u32>) -> Result<StakingParams, ContractError> {
    match version {
        Some(version) => load_params(deps.storage, version),
        None => PARAMS
            .range(deps.storage, None, None, Order::Descending)
            .next()
            .transpose()?
            .map(|(_, params)| params)
            .ok_or(ContractError::ParamsVersionNotFound(0)),
    }
}

pub fn finality_provider(
    deps: Deps,
    consumer_id: String,
    btc_pk_hex: String,
) -> StdResult<FinalityProvider> {
    FPS.load(deps.storage, (consumer_id.as_str(), btc_pk_hex.as_str()))
}

// Settings for pagination
const MAX_LIMIT: u32 = 30;
const DEFAULT_LIMIT: u32 = 10;

pub fn finality_providers(
    deps: Deps,
    consumer_id: String,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<FinalityProvidersResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start_after = start_after.as_deref().map(Bound::exclusive);
    let fps = FPS
        .prefix(consumer_id.as_str())
        .range(deps.storage, start_after, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, v)| v))
        .collect::<StdResult<Vec<FinalityProvider>>>()?;
    Ok(FinalityProvidersResponse { fps })
}

/// Get the delegation by staking tx hash.
/// `staking_tx_hash_hex`: The (reversed) staking tx hash, in hex
pub fn delegation(
    deps: Deps,
    staking_tx_hash_hex: String,
) -> Result<BtcDelegation, ContractError> {
    let staking_tx_hash = parse_staking_tx_hash(&staking_tx_hash_hex)?;
    DELEGATIONS
        .may_load(deps.storage, &staking_tx_hash)?
        .ok_or(ContractError::DelegationNotFound(staking_tx_hash_hex))
}

/// Get list of delegations.
/// `start_after`: The (reversed) associated staking tx hash of the delegation in hex, if provided.
/// `active`: List only active delegations if true, otherwise list all delegations.
pub fn delegations(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
    active: Option<bool>,
) -> Result<BtcDelegationsResponse, ContractError> {
    let active = active.unwrap_or_default();
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start_after = start_after
        .as_deref()
        .map(parse_staking_tx_hash)
        .transpose()?;
    let start_after = start_after.as_ref().map(|hash| Bound::exclusive(hash.as_slice()));
    let delegations = DELEGATIONS
        .range_raw(deps.storage, start_after, None, Order::Ascending)
        .filter(|item| {
            if let Ok((_, del)) = item {
                !active || del.is_active()
            } else {
                true // don't filter errors
            }
        })
        .take(limit)
        .map(|item| item.map(|(_, v)| v))
        .collect::<StdResult<Vec<BtcDelegation>>>()?;
    Ok(BtcDelegationsResponse { delegations })
}

pub fn last_block(deps: Deps) -> StdResult<Option<BlockInfo>> {
    LAST_BLOCK.may_load(deps.storage)
}
