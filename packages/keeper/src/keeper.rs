use chrono::{DateTime, SecondsFormat, Utc};
use cosmwasm_std::{to_json_vec, StdResult, Storage};
use cw_storage_plus::Item;
use tracing::{debug, debug_span, error, info};

use babylon_apis::btc_staking_api::SudoMsg;

use crate::error::KeeperError;
use crate::params::{self, empty_addr, is_empty_addr, Params};
use crate::wasm::{ContractExecutor, GasMeter};

/// Height of the last block notified to the Babylon contract
const LAST_DISPATCHED_HEIGHT: Item<i64> = Item::new("last_dispatched_height");

/// HeaderInfo is the header of the block being processed
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderInfo {
    pub height: i64,
    pub hash: Vec<u8>,
    pub time: DateTime<Utc>,
    pub chain_id: String,
    pub app_hash: Vec<u8>,
}

impl HeaderInfo {
    /// begin_block_msg projects the header to the `begin_block` sudo message
    pub fn begin_block_msg(&self) -> SudoMsg {
        SudoMsg::BeginBlock {
            height: self.height,
            hash_hex: hex::encode(&self.hash),
            time: self.time.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            chain_id: self.chain_id.clone(),
            app_hash_hex: hex::encode(&self.app_hash),
        }
    }
}

pub struct Keeper<E> {
    executor: E,
    /// authority is the address allowed to update the params (the governance module)
    authority: String,
    bech32_prefix: String,
    empty_addr: String,
}

impl<E: ContractExecutor> Keeper<E> {
    pub fn new(
        executor: E,
        authority: impl Into<String>,
        bech32_prefix: impl Into<String>,
    ) -> Result<Self, KeeperError> {
        let bech32_prefix = bech32_prefix.into();
        let empty_addr = empty_addr(&bech32_prefix)?;
        Ok(Keeper {
            executor,
            authority: authority.into(),
            bech32_prefix,
            empty_addr,
        })
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn bech32_prefix(&self) -> &str {
        &self.bech32_prefix
    }

    /// default_params returns the params in effect when none were set
    pub fn default_params(&self) -> Params {
        Params {
            babylon_contract_address: self.empty_addr.clone(),
            btc_staking_contract_address: self.empty_addr.clone(),
            max_gas_begin_blocker: params::DEFAULT_MAX_GAS_BEGIN_BLOCKER,
        }
    }

    /// get_params returns the last committed params
    pub fn get_params(&self, storage: &dyn Storage) -> StdResult<Params> {
        Ok(params::get_params(storage)?.unwrap_or_else(|| self.default_params()))
    }

    pub fn set_params(
        &self,
        storage: &mut dyn Storage,
        params: &Params,
    ) -> Result<(), KeeperError> {
        params::set_params(storage, params, &self.bech32_prefix)
    }

    /// update_params replaces the params. Only the authority can do this
    pub fn update_params(
        &self,
        storage: &mut dyn Storage,
        sender: &str,
        params: Params,
    ) -> Result<(), KeeperError> {
        if sender != self.authority {
            return Err(KeeperError::Unauthorized {
                expected: self.authority.clone(),
                sender: sender.to_string(),
            });
        }
        self.set_params(storage, &params)?;
        info!(
            babylon_contract = %params.babylon_contract_address,
            btc_staking_contract = %params.btc_staking_contract_address,
            max_gas_begin_blocker = params.max_gas_begin_blocker,
            "Params updated"
        );
        Ok(())
    }

    /// begin_blocker notifies the Babylon contract of the new block, unless the contract isn't set.
    ///
    /// Each height is notified at most once. Execution errors, including running out of gas, are
    /// returned to the caller as is, and leave the height undispatched.
    pub fn begin_blocker(
        &mut self,
        storage: &mut dyn Storage,
        header: &HeaderInfo,
    ) -> Result<(), KeeperError> {
        let span = debug_span!("begin_blocker", height = header.height);
        let _enter = span.enter();

        let params = self.get_params(storage)?;
        if is_empty_addr(&params.babylon_contract_address, &self.bech32_prefix) {
            debug!("Babylon contract address not set, skipping begin block message");
            return Ok(());
        }

        if let Some(last) = LAST_DISPATCHED_HEIGHT.may_load(storage)? {
            if header.height <= last {
                return Err(KeeperError::AlreadyDispatched(header.height));
            }
        }

        match self.send_begin_block_msg(
            header,
            &params.babylon_contract_address,
            params.max_gas_begin_blocker,
        ) {
            Ok(gas_used) => {
                LAST_DISPATCHED_HEIGHT.save(storage, &header.height)?;
                debug!(gas_used, "Begin block message sent");
                Ok(())
            }
            Err(err) => {
                error!(%err, "Failed to send begin block message");
                Err(err)
            }
        }
    }

    /// end_blocker is called after every block. There's nothing to do
    pub fn end_blocker(&self, header: &HeaderInfo) {
        let _span = debug_span!("end_blocker", height = header.height).entered();
    }

    /// send_begin_block_msg sends the begin block sudo message of `header` to `contract`, under
    /// `gas_limit`. It returns the gas used
    pub fn send_begin_block_msg(
        &mut self,
        header: &HeaderInfo,
        contract: &str,
        gas_limit: u32,
    ) -> Result<u64, KeeperError> {
        let msg = to_json_vec(&header.begin_block_msg())?;

        let mut gas = GasMeter::new(gas_limit.into());
        self.executor.sudo(contract, &msg, &mut gas)?;
        // The executor may have ignored the meter
        gas.check()?;
        Ok(gas.consumed())
    }
}

/// last_dispatched_height returns the height of the last block notified to the Babylon contract
pub fn last_dispatched_height(storage: &dyn Storage) -> StdResult<Option<i64>> {
    LAST_DISPATCHED_HEIGHT.may_load(storage)
}
