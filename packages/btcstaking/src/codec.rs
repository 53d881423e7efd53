//! Mapping between the lifecycle model and the BTC staking packet wire schema.
//!
//! Decoding is all-or-nothing: the first entry failing its checks aborts the whole packet.
use std::collections::HashSet;

use cosmwasm_std::{from_json, to_json_binary, Binary};

use babylon_apis::btc_staking_api::{
    ActiveBtcDelegation, BtcStakingPacket, BtcUndelegationInfo, NewFinalityProvider,
    SlashedBtcDelegation, StakingPacketData, UnbondedBtcDelegation,
};
use babylon_apis::error::StakingApiError;
use babylon_apis::Validate;

use crate::delegation::{Delegation, UndelegationInfo};
use crate::error::Error;
use crate::finality_provider::{parse_commission, FinalityProvider};
use crate::Result;

/// StakingPacket is a decoded BTC staking packet
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StakingPacket {
    pub new_fps: Vec<FinalityProvider>,
    pub active_dels: Vec<Delegation>,
    pub slashed_dels: Vec<SlashedBtcDelegation>,
    pub unbonded_dels: Vec<UnbondedBtcDelegation>,
}

impl TryFrom<&NewFinalityProvider> for FinalityProvider {
    type Error = Error;

    fn try_from(fp: &NewFinalityProvider) -> Result<Self> {
        fp.validate()?;
        let commission = parse_commission(&fp.commission)?;
        Ok(FinalityProvider {
            description: fp.description.clone(),
            commission,
            consensus_pk: fp.babylon_pk.clone(),
            btc_pk_hex: fp.btc_pk_hex.clone(),
            pop: fp.pop.clone(),
            consumer_id: fp.consumer_id.clone(),
        })
    }
}

impl From<&FinalityProvider> for NewFinalityProvider {
    fn from(fp: &FinalityProvider) -> Self {
        NewFinalityProvider {
            description: fp.description.clone(),
            commission: fp.commission.to_string(),
            babylon_pk: fp.consensus_pk.clone(),
            btc_pk_hex: fp.btc_pk_hex.clone(),
            pop: fp.pop.clone(),
            consumer_id: fp.consumer_id.clone(),
        }
    }
}

impl TryFrom<&ActiveBtcDelegation> for Delegation {
    type Error = Error;

    fn try_from(del: &ActiveBtcDelegation) -> Result<Self> {
        let info = del
            .undelegation_info
            .as_ref()
            .ok_or_else(|| Error::malformed(StakingApiError::MissingUnbondingInfo))?;
        // An active delegation has not requested unbonding yet, not even with an empty signature
        if info.delegator_unbonding_sig.is_some() {
            return Err(Error::malformed(
                "unexpected delegator unbonding signature in active delegation",
            ));
        }

        let delegation = Delegation {
            btc_pk_hex: del.btc_pk_hex.clone(),
            fp_btc_pk_list: del.fp_btc_pk_list.clone(),
            start_height: del.start_height,
            end_height: del.end_height,
            total_sat: del.total_sat,
            staking_tx: del.staking_tx.clone(),
            slashing_tx: del.slashing_tx.clone(),
            delegator_slashing_sig: del.delegator_slashing_sig.clone(),
            covenant_sigs: del.covenant_sigs.clone(),
            staking_output_idx: del.staking_output_idx,
            unbonding_time: del.unbonding_time,
            undelegation_info: UndelegationInfo {
                unbonding_tx: info.unbonding_tx.clone(),
                covenant_unbonding_sig_list: info.covenant_unbonding_sig_list.clone(),
                slashing_tx: info.slashing_tx.clone(),
                delegator_slashing_sig: info.delegator_slashing_sig.clone(),
                covenant_slashing_sigs: info.covenant_slashing_sigs.clone(),
            },
            params_version: del.params_version,
        };
        delegation.validate()?;
        Ok(delegation)
    }
}

fn require_bytes(field: &str, bytes: &Binary) -> Result<Binary> {
    if bytes.is_empty() {
        return Err(Error::EncodingError(format!("empty {field}")));
    }
    Ok(bytes.clone())
}

impl TryFrom<&Delegation> for ActiveBtcDelegation {
    type Error = Error;

    fn try_from(del: &Delegation) -> Result<Self> {
        let info = &del.undelegation_info;
        Ok(ActiveBtcDelegation {
            btc_pk_hex: del.btc_pk_hex.clone(),
            fp_btc_pk_list: del.fp_btc_pk_list.clone(),
            start_height: del.start_height,
            end_height: del.end_height,
            total_sat: del.total_sat,
            staking_tx: require_bytes("staking_tx", &del.staking_tx)?,
            slashing_tx: require_bytes("slashing_tx", &del.slashing_tx)?,
            delegator_slashing_sig: require_bytes(
                "delegator_slashing_sig",
                &del.delegator_slashing_sig,
            )?,
            covenant_sigs: del.covenant_sigs.clone(),
            staking_output_idx: del.staking_output_idx,
            unbonding_time: del.unbonding_time,
            undelegation_info: Some(BtcUndelegationInfo {
                unbonding_tx: require_bytes("unbonding_tx", &info.unbonding_tx)?,
                delegator_unbonding_sig: None,
                covenant_unbonding_sig_list: info.covenant_unbonding_sig_list.clone(),
                slashing_tx: require_bytes("unbonding slashing_tx", &info.slashing_tx)?,
                delegator_slashing_sig: require_bytes(
                    "unbonding delegator_slashing_sig",
                    &info.delegator_slashing_sig,
                )?,
                covenant_slashing_sigs: info.covenant_slashing_sigs.clone(),
            }),
            params_version: del.params_version,
        })
    }
}

/// decode_packet maps a wire packet to the lifecycle model, checking every entry
pub fn decode_packet(packet: &BtcStakingPacket) -> Result<StakingPacket> {
    let mut seen_fps = HashSet::new();
    let new_fps = packet
        .new_fp
        .iter()
        .map(|new_fp| {
            let fp = FinalityProvider::try_from(new_fp)?;
            if !seen_fps.insert((fp.consumer_id.clone(), fp.btc_pk_hex.clone())) {
                return Err(Error::DuplicateProvider {
                    consumer_id: fp.consumer_id,
                    btc_pk_hex: fp.btc_pk_hex,
                });
            }
            Ok(fp)
        })
        .collect::<Result<Vec<_>>>()?;

    let active_dels = packet
        .active_del
        .iter()
        .map(Delegation::try_from)
        .collect::<Result<Vec<_>>>()?;

    for slashed in &packet.slashed_del {
        slashed.validate().map_err(Error::malformed)?;
    }
    for unbonded in &packet.unbonded_del {
        unbonded.validate().map_err(Error::malformed)?;
    }

    Ok(StakingPacket {
        new_fps,
        active_dels,
        slashed_dels: packet.slashed_del.clone(),
        unbonded_dels: packet.unbonded_del.clone(),
    })
}

/// encode_packet maps a decoded packet back to its wire form
pub fn encode_packet(packet: &StakingPacket) -> Result<BtcStakingPacket> {
    Ok(BtcStakingPacket {
        new_fp: packet.new_fps.iter().map(NewFinalityProvider::from).collect(),
        active_del: packet
            .active_dels
            .iter()
            .map(ActiveBtcDelegation::try_from)
            .collect::<Result<Vec<_>>>()?,
        slashed_del: packet.slashed_dels.clone(),
        unbonded_del: packet.unbonded_dels.clone(),
    })
}

/// from_json_packet decodes the JSON form of a BTC staking packet
pub fn from_json_packet(data: &[u8]) -> Result<StakingPacket> {
    let data: StakingPacketData =
        from_json(data).map_err(|e| Error::EncodingError(e.to_string()))?;
    let StakingPacketData::BtcStaking(packet) = data;
    decode_packet(&packet)
}

/// to_json_packet encodes a BTC staking packet in its JSON form
pub fn to_json_packet(packet: &StakingPacket) -> Result<Binary> {
    let data = StakingPacketData::BtcStaking(encode_packet(packet)?);
    to_json_binary(&data).map_err(|e| Error::EncodingError(e.to_string()))
}
