pub mod config;
pub mod staking;

use cosmwasm_schema::cw_serde;
use cw_storage_plus::Item;

/// BlockInfo is the projection of the last block header notified through the `begin_block` sudo
/// call
#[cw_serde]
pub struct BlockInfo {
    pub height: i64,
    pub hash_hex: String,
    pub time: String,
    pub chain_id: String,
    pub app_hash_hex: String,
}

pub(crate) const LAST_BLOCK: Item<BlockInfo> = Item::new("last_block");
