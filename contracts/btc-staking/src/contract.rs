#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_json_binary, Deps, DepsMut, Empty, Env, MessageInfo, QueryResponse, Response, StdResult,
};
use cw2::set_contract_version;
use cw_utils::{maybe_addr, nonpayable};

use babylon_apis::btc_staking_api::{BtcStakingPacket, SudoMsg};

use crate::error::ContractError;
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::queries;
use crate::staking::handle_btc_staking;
use crate::state::config::{next_params_version, Config, StakingParams, ADMIN, CONFIG, PARAMS};
use crate::state::{BlockInfo, LAST_BLOCK};

pub const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    mut deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    let config = Config {
        babylon: info.sender,
    };
    CONFIG.save(deps.storage, &config)?;

    let api = deps.api;
    ADMIN.set(deps.branch(), maybe_addr(api, msg.admin.clone())?)?;

    let params = msg.params.unwrap_or_default();
    params.validate()?;
    PARAMS.save(deps.storage, 0, &params)?;

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new().add_attribute("action", "instantiate"))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> Result<QueryResponse, ContractError> {
    match msg {
        QueryMsg::Config {} => Ok(to_json_binary(&queries::config(deps)?)?),
        QueryMsg::Params { version } => Ok(to_json_binary(&queries::params(deps, version)?)?),
        QueryMsg::Admin {} => to_json_binary(&ADMIN.query_admin(deps)?).map_err(Into::into),
        QueryMsg::FinalityProvider {
            consumer_id,
            btc_pk_hex,
        } => Ok(to_json_binary(&queries::finality_provider(
            deps,
            consumer_id,
            btc_pk_hex,
        )?)?),
        QueryMsg::FinalityProviders {
            consumer_id,
            start_after,
            limit,
        } => Ok(to_json_binary(&queries::finality_providers(
            deps,
            consumer_id,
            start_after,
            limit,
        )?)?),
        QueryMsg::Delegation {
            staking_tx_hash_hex,
        } => Ok(to_json_binary(&queries::delegation(
            deps,
            staking_tx_hash_hex,
        )?)?),
        QueryMsg::Delegations {
            start_after,
            limit,
            active,
        } => Ok(to_json_binary(&queries::delegations(
            deps,
            start_after,
            limit,
            active,
        )?)?),
        QueryMsg::LastBlock {} => Ok(to_json_binary(&queries::last_block(deps)?)?),
    }
}

/// This is a no-op just to test how this integrates with wasmd
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(_deps: DepsMut, _env: Env, _msg: Empty) -> StdResult<Response> {
    Ok(Response::default())
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    let api = deps.api;
    match msg {
        ExecuteMsg::UpdateAdmin { admin } => ADMIN
            .execute_update_admin(deps, info, maybe_addr(api, admin)?)
            .map_err(Into::into),
        ExecuteMsg::BtcStaking {
            new_fp,
            active_del,
            slashed_del,
            unbonded_del,
        } => {
            let packet = BtcStakingPacket {
                new_fp,
                active_del,
                slashed_del,
                unbonded_del,
            };
            handle_btc_staking(deps, &info, &packet)
        }
        ExecuteMsg::AddStakingParams { params } => handle_add_staking_params(deps, &info, params),
    }
}

fn handle_add_staking_params(
    deps: DepsMut,
    info: &MessageInfo,
    params: StakingParams,
) -> Result<Response, ContractError> {
    ADMIN.assert_admin(deps.as_ref(), &info.sender)?;
    params.validate()?;

    let version = next_params_version(deps.storage)?;
    PARAMS.save(deps.storage, version, &params)?;

    Ok(Response::new()
        .add_attribute("action", "add_staking_params")
        .add_attribute("version", version.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn sudo(deps: DepsMut, _env: Env, msg: SudoMsg) -> Result<Response, ContractError> {
    match msg {
        SudoMsg::BeginBlock {
            height,
            hash_hex,
            time,
            chain_id,
            app_hash_hex,
        } => {
            let block = BlockInfo {
                height,
                hash_hex,
                time,
                chain_id,
                app_hash_hex,
            };
            handle_begin_block(deps, block)
        }
    }
}

fn handle_begin_block(deps: DepsMut, block: BlockInfo) -> Result<Response, ContractError> {
    deps.api
        .debug(&format!("begin block {} ({})", block.height, block.hash_hex));
    LAST_BLOCK.save(deps.storage, &block)?;
    Ok(Response::new()
        .add_attribute("action", "begin_block")
        .add_attribute("height", block.height.to_string()))
}
