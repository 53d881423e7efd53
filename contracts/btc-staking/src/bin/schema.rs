use cosmwasm_schema::write_api;
use cosmwasm_std::Empty;

use babylon_apis::btc_staking_api::SudoMsg;
use btc_staking::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};

fn main() {
    // Clear & write standard API
    write_api! {
        instantiate: InstantiateMsg,
        query: QueryMsg,
        migrate: Empty,
        execute: ExecuteMsg,
        sudo: SudoMsg,
    }
}
