use cosmwasm_schema::{cw_serde, QueryResponses};
use cw_controllers::AdminResponse;

use babylon_apis::btc_staking_api::{
    ActiveBtcDelegation, NewFinalityProvider, SlashedBtcDelegation, UnbondedBtcDelegation,
};
use babylon_btcstaking::{BtcDelegation, FinalityProvider};

use crate::state::config::{Config, StakingParams};
use crate::state::BlockInfo;

#[cw_serde]
pub struct InstantiateMsg {
    /// Initial BTC staking params, stored as version 0
    pub params: Option<StakingParams>,
    pub admin: Option<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Change the admin
    UpdateAdmin { admin: Option<String> },
    /// BTC Staking operations, as relayed from the provider chain.
    /// The whole packet is applied, or none of it
    BtcStaking {
        #[serde(default)]
        new_fp: Vec<NewFinalityProvider>,
        #[serde(default)]
        active_del: Vec<ActiveBtcDelegation>,
        #[serde(default)]
        slashed_del: Vec<SlashedBtcDelegation>,
        #[serde(default)]
        unbonded_del: Vec<UnbondedBtcDelegation>,
    },
    /// Append a new version of the BTC staking params. Only the admin can do this
    AddStakingParams { params: StakingParams },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Config returns the current configuration of the btc-staking contract
    #[returns(Config)]
    Config {},
    /// Params returns the BTC staking params with the given version, or the latest ones
    #[returns(StakingParams)]
    Params { version: Option<u32> },
    /// Returns the current admin of the contract
    #[returns(AdminResponse)]
    Admin {},
    /// FinalityProvider returns the finality provider registered under the given consumer id and
    /// BTC PK
    #[returns(FinalityProvider)]
    FinalityProvider {
        consumer_id: String,
        btc_pk_hex: String,
    },
    /// FinalityProviders returns the finality providers of a consumer, by BTC PK.
    ///
    /// `start_after` is the BTC PK of the FP to start after, or `None` to start from the beginning
    #[returns(FinalityProvidersResponse)]
    FinalityProviders {
        consumer_id: String,
        start_after: Option<String>,
        limit: Option<u32>,
    },
    /// Delegation returns a BTC delegation in its current lifecycle state.
    ///
    /// `staking_tx_hash_hex`: The (reversed) staking tx hash, in hex
    #[returns(BtcDelegation)]
    Delegation { staking_tx_hash_hex: String },
    /// Delegations returns the BTC delegations, by staking tx hash.
    ///
    /// `start_after` is the (reversed) staking tx hash of the delegation to start after, in hex.
    /// `active` lists only active delegations if true
    #[returns(BtcDelegationsResponse)]
    Delegations {
        start_after: Option<String>,
        limit: Option<u32>,
        active: Option<bool>,
    },
    /// LastBlock returns the last block notified through the `begin_block` sudo call, if any
    #[returns(Option<BlockInfo>)]
    LastBlock {},
}

#[cw_serde]
pub struct FinalityProvidersResponse {
    pub fps: Vec<FinalityProvider>,
}

#[cw_serde]
pub struct BtcDelegationsResponse {
    pub delegations: Vec<BtcDelegation>,
}
