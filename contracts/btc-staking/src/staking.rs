use std::collections::BTreeMap;

use cosmwasm_std::{DepsMut, MessageInfo, Response, Storage};

use babylon_apis::btc_staking_api::{
    BtcStakingPacket, SlashedBtcDelegation, UnbondedBtcDelegation, HASH_SIZE,
};
use babylon_btcstaking::codec::decode_packet;
use babylon_btcstaking::error::Error as StakingError;
use babylon_btcstaking::{
    admit_delegation, begin_unbonding, mark_slashed, mark_unbonded, BtcDelegation, Delegation,
    FinalityProvider,
};

use crate::error::ContractError;
use crate::state::config::{load_params, ADMIN, CONFIG};
use crate::state::staking::{DELEGATIONS, FPS};

/// handle_btc_staking handles the BTC staking operations of a packet.
///
/// The packet is decoded and applied on top of the stored registries in memory; nothing is
/// written unless every entry succeeds.
pub fn handle_btc_staking(
    deps: DepsMut,
    info: &MessageInfo,
    packet: &BtcStakingPacket,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.babylon && !ADMIN.is_admin(deps.as_ref(), &info.sender)? {
        return Err(ContractError::Unauthorized);
    }

    let packet = decode_packet(packet)?;

    let mut staged = StagedRegistry::default();
    let new_fps = packet.new_fps.len();
    for fp in packet.new_fps {
        staged.register_finality_provider(deps.storage, fp)?;
    }

    let mut admitted = 0;
    for del in packet.active_dels {
        if let Admission::New(_) = staged.admit_delegation(deps.storage, del)? {
            admitted += 1;
        }
    }

    for slashed in &packet.slashed_dels {
        staged.slash_delegation(deps.storage, slashed)?;
    }

    for unbonded in &packet.unbonded_dels {
        staged.unbond_delegation(deps.storage, unbonded)?;
    }

    staged.commit(deps.storage)?;

    deps.api.debug(&format!(
        "btc staking packet applied: {new_fps} new fps, {admitted} new delegations"
    ));
    Ok(Response::new()
        .add_attribute("action", "btc_staking")
        .add_attribute("new_fps", new_fps.to_string())
        .add_attribute("active_dels", admitted.to_string())
        .add_attribute("slashed_dels", packet.slashed_dels.len().to_string())
        .add_attribute("unbonded_dels", packet.unbonded_dels.len().to_string()))
}

/// Admission is the outcome of admitting a delegation to the registry
#[derive(Debug, PartialEq)]
pub enum Admission {
    New(BtcDelegation),
    /// The delegation was already admitted. The registry is unchanged
    Existing(BtcDelegation),
}

/// StagedRegistry holds the registry writes of a packet on top of the stored registries, until
/// they're committed
#[derive(Debug, Default)]
pub struct StagedRegistry {
    fps: BTreeMap<(String, String), FinalityProvider>,
    delegations: BTreeMap<[u8; HASH_SIZE], BtcDelegation>,
}

impl StagedRegistry {
    fn has_fp(&self, storage: &dyn Storage, consumer_id: &str, btc_pk_hex: &str) -> bool {
        self.fps
            .contains_key(&(consumer_id.to_string(), btc_pk_hex.to_string()))
            || FPS.has(storage, (consumer_id, btc_pk_hex))
    }

    fn delegation(
        &self,
        storage: &dyn Storage,
        staking_tx_hash: &[u8; HASH_SIZE],
    ) -> Result<Option<BtcDelegation>, ContractError> {
        match self.delegations.get(staking_tx_hash) {
            Some(del) => Ok(Some(del.clone())),
            None => Ok(DELEGATIONS.may_load(storage, staking_tx_hash)?),
        }
    }

    /// register_finality_provider registers a new finality provider.
    /// Finality providers are immutable: registering the same BTC PK twice for a consumer fails.
    pub fn register_finality_provider(
        &mut self,
        storage: &dyn Storage,
        fp: FinalityProvider,
    ) -> Result<(), ContractError> {
        fp.validate()?;
        if self.has_fp(storage, &fp.consumer_id, &fp.btc_pk_hex) {
            return Err(StakingError::DuplicateProvider {
                consumer_id: fp.consumer_id,
                btc_pk_hex: fp.btc_pk_hex,
            }
            .into());
        }
        self.fps
            .insert((fp.consumer_id.clone(), fp.btc_pk_hex.clone()), fp);
        Ok(())
    }

    /// admit_delegation admits a delegation against the covenant committee of the params version
    /// it was validated with.
    /// Re-admitting a delegation (same delegator and staking tx) returns the stored one.
    pub fn admit_delegation(
        &mut self,
        storage: &dyn Storage,
        candidate: Delegation,
    ) -> Result<Admission, ContractError> {
        let staking_tx_hash = candidate.staking_tx_hash();
        if let Some(existing) = self.delegation(storage, &staking_tx_hash)? {
            if existing.id().btc_pk_hex == candidate.btc_pk_hex {
                return Ok(Admission::Existing(existing));
            }
            return Err(ContractError::DelegationAlreadyExists(hex::encode(
                staking_tx_hash,
            )));
        }

        let params = load_params(storage, candidate.params_version)?;
        if let Some(sig) = candidate
            .covenant_sigs
            .iter()
            .find(|sig| !params.is_covenant_member(&sig.cov_pk))
        {
            return Err(ContractError::UnknownCovenantMember(sig.cov_pk.clone()));
        }

        let del = admit_delegation(candidate, params.covenant_quorum)?;
        self.delegations.insert(staking_tx_hash, del.clone());
        Ok(Admission::New(del))
    }

    /// slash_delegation records the slashing of a delegation
    pub fn slash_delegation(
        &mut self,
        storage: &dyn Storage,
        slashed: &SlashedBtcDelegation,
    ) -> Result<(), ContractError> {
        let staking_tx_hash = parse_staking_tx_hash(&slashed.staking_tx_hash)?;
        let del = self
            .delegation(storage, &staking_tx_hash)?
            .ok_or_else(|| ContractError::DelegationNotFound(slashed.staking_tx_hash.clone()))?;
        self.delegations.insert(staking_tx_hash, mark_slashed(del));
        Ok(())
    }

    /// unbond_delegation records the unbonding of a delegation.
    /// An active delegation goes through unbonding with the delegator's signature first
    pub fn unbond_delegation(
        &mut self,
        storage: &dyn Storage,
        unbonded: &UnbondedBtcDelegation,
    ) -> Result<(), ContractError> {
        let staking_tx_hash = parse_staking_tx_hash(&unbonded.staking_tx_hash)?;
        let del = self
            .delegation(storage, &staking_tx_hash)?
            .ok_or_else(|| ContractError::DelegationNotFound(unbonded.staking_tx_hash.clone()))?;
        let del = match del {
            BtcDelegation::Active(_) => begin_unbonding(del, unbonded.unbonding_tx_sig.clone())?,
            other => other,
        };
        self.delegations.insert(staking_tx_hash, mark_unbonded(del));
        Ok(())
    }

    pub fn commit(self, storage: &mut dyn Storage) -> Result<(), ContractError> {
        for ((consumer_id, btc_pk_hex), fp) in &self.fps {
            FPS.save(storage, (consumer_id.as_str(), btc_pk_hex.as_str()), fp)?;
        }
        for (staking_tx_hash, del) in &self.delegations {
            DELEGATIONS.save(storage, staking_tx_hash, del)?;
        }
        Ok(())
    }
}

/// parse_staking_tx_hash parses a (reversed) staking tx hash in hex
pub(crate) fn parse_staking_tx_hash(
    staking_tx_hash_hex: &str,
) -> Result<[u8; HASH_SIZE], ContractError> {
    hex::decode(staking_tx_hash_hex)?
        .try_into()
        .map_err(|hash: Vec<u8>| ContractError::WrongHashLength(hash.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env};
    use cosmwasm_std::Binary;

    use babylon_apis::btc_staking_api::ActiveBtcDelegation;
    use test_utils::{
        active_delegation, covenant_pks, new_finality_provider, staking_tx_hash_hex, CONSUMER_ID,
        COVENANT_COMMITTEE_SIZE, COVENANT_QUORUM,
    };

    use crate::contract::tests::{instantiate_with_params, CREATOR, INIT_ADMIN};
    use crate::contract::{execute, query};
    use crate::msg::{BtcDelegationsResponse, ExecuteMsg, QueryMsg};
    use crate::queries;

    fn packet_msg(
        new_fp: Vec<babylon_apis::btc_staking_api::NewFinalityProvider>,
        active_del: Vec<ActiveBtcDelegation>,
    ) -> ExecuteMsg {
        ExecuteMsg::BtcStaking {
            new_fp,
            active_del,
            slashed_del: vec![],
            unbonded_del: vec![],
        }
    }

    fn delegation_with_signers(signers: usize) -> ActiveBtcDelegation {
        let fp = new_finality_provider(1, CONSUMER_ID);
        let cov_pks = covenant_pks(COVENANT_COMMITTEE_SIZE);
        active_delegation(10, &[fp.btc_pk_hex], &cov_pks[..signers])
    }

    #[test]
    fn test_btc_staking_add_fp_unauthorized() {
        let mut deps = mock_dependencies();
        instantiate_with_params(&mut deps);

        let msg = packet_msg(vec![new_finality_provider(1, CONSUMER_ID)], vec![]);

        // Only the Creator or Admin can call this
        let other_info = message_info(&deps.api.addr_make("other"), &[]);
        let err = execute(deps.as_mut(), mock_env(), other_info, msg).unwrap_err();
        assert_eq!(err, ContractError::Unauthorized);
    }

    #[test]
    fn test_btc_staking_add_fp_admin() {
        let mut deps = mock_dependencies();
        instantiate_with_params(&mut deps);

        let admin_info = message_info(&deps.api.addr_make(INIT_ADMIN), &[]);
        let new_fp = new_finality_provider(1, CONSUMER_ID);
        let msg = packet_msg(vec![new_fp.clone()], vec![]);

        let res = execute(deps.as_mut(), mock_env(), admin_info.clone(), msg.clone()).unwrap();
        assert_eq!(0, res.messages.len());

        // Check the finality provider has been stored
        let query_res = queries::finality_provider(
            deps.as_ref(),
            CONSUMER_ID.to_string(),
            new_fp.btc_pk_hex.clone(),
        )
        .unwrap();
        assert_eq!(query_res, FinalityProvider::try_from(&new_fp).unwrap());

        // Trying to add the same fp again fails
        let err = execute(deps.as_mut(), mock_env(), admin_info.clone(), msg).unwrap_err();
        assert_eq!(
            err,
            ContractError::Staking(StakingError::DuplicateProvider {
                consumer_id: CONSUMER_ID.to_string(),
                btc_pk_hex: new_fp.btc_pk_hex.clone(),
            })
        );

        // The same key can be registered for another consumer
        let other_consumer_fp = new_finality_provider(1, "juno-1");
        execute(
            deps.as_mut(),
            mock_env(),
            admin_info,
            packet_msg(vec![other_consumer_fp], vec![]),
        )
        .unwrap();
        let fps = queries::finality_providers(deps.as_ref(), "juno-1".to_string(), None, None)
            .unwrap()
            .fps;
        assert_eq!(fps.len(), 1);
    }

    #[test]
    fn btc_staking_active_delegation_happy_path() {
        let mut deps = mock_dependencies();
        instantiate_with_params(&mut deps);
        let info = message_info(&deps.api.addr_make(CREATOR), &[]);

        let new_fp = new_finality_provider(1, CONSUMER_ID);
        let active_del = delegation_with_signers(COVENANT_QUORUM as usize);
        let msg = packet_msg(vec![new_fp], vec![active_del.clone()]);

        let res = execute(deps.as_mut(), mock_env(), info, msg).unwrap();
        assert!(res
            .attributes
            .iter()
            .any(|attr| attr.key == "active_dels" && attr.value == "1"));

        let del = queries::delegation(deps.as_ref(), staking_tx_hash_hex(&active_del)).unwrap();
        assert_matches!(&del, BtcDelegation::Active(d) if d.btc_pk_hex == active_del.btc_pk_hex);
    }

    #[test]
    fn quorum_is_pinned_to_params_version() {
        let mut deps = mock_dependencies();
        instantiate_with_params(&mut deps);
        let info = message_info(&deps.api.addr_make(CREATOR), &[]);

        // 2 of 5 doesn't meet the 3 of 5 quorum of version 0
        let del = delegation_with_signers(2);
        let err = execute(
            deps.as_mut(),
            mock_env(),
            info.clone(),
            packet_msg(vec![], vec![del.clone()]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ContractError::Staking(StakingError::QuorumNotMet {
                signers: 2,
                quorum: COVENANT_QUORUM
            })
        );

        // Version 1 lowers the quorum to 2
        let admin_info = message_info(&deps.api.addr_make(INIT_ADMIN), &[]);
        execute(
            deps.as_mut(),
            mock_env(),
            admin_info,
            ExecuteMsg::AddStakingParams {
                params: crate::state::config::StakingParams {
                    covenant_pks: covenant_pks(COVENANT_COMMITTEE_SIZE),
                    covenant_quorum: 2,
                },
            },
        )
        .unwrap();
        let mut del = del;
        del.params_version = 1;
        execute(
            deps.as_mut(),
            mock_env(),
            info.clone(),
            packet_msg(vec![], vec![del]),
        )
        .unwrap();

        // Unknown version
        let fp_pks = [new_finality_provider(1, CONSUMER_ID).btc_pk_hex];
        let mut del = active_delegation(12, &fp_pks, &covenant_pks(COVENANT_COMMITTEE_SIZE)[..3]);
        del.params_version = 7;
        let err = execute(deps.as_mut(), mock_env(), info, packet_msg(vec![], vec![del]))
            .unwrap_err();
        assert_eq!(err, ContractError::ParamsVersionNotFound(7));
    }

    #[test]
    fn covenant_signers_must_be_committee_members() {
        let mut deps = mock_dependencies();
        instantiate_with_params(&mut deps);
        let info = message_info(&deps.api.addr_make(CREATOR), &[]);

        let mut del = delegation_with_signers(3);
        let outsider = test_utils::btc_pk_hex(200);
        del.covenant_sigs[0].cov_pk = outsider.clone();
        let err = execute(deps.as_mut(), mock_env(), info, packet_msg(vec![], vec![del]))
            .unwrap_err();
        assert_eq!(err, ContractError::UnknownCovenantMember(outsider));
    }

    #[test]
    fn readmission_is_idempotent() {
        let mut deps = mock_dependencies();
        instantiate_with_params(&mut deps);
        let info = message_info(&deps.api.addr_make(CREATOR), &[]);

        let del = delegation_with_signers(3);
        let msg = packet_msg(vec![], vec![del.clone()]);
        execute(deps.as_mut(), mock_env(), info.clone(), msg.clone()).unwrap();
        let stored = queries::delegation(deps.as_ref(), staking_tx_hash_hex(&del)).unwrap();

        // Relayed twice, and twice within the same packet
        let res = execute(deps.as_mut(), mock_env(), info.clone(), msg).unwrap();
        assert!(res
            .attributes
            .iter()
            .any(|attr| attr.key == "active_dels" && attr.value == "0"));
        execute(
            deps.as_mut(),
            mock_env(),
            info,
            packet_msg(vec![], vec![del.clone(), del.clone()]),
        )
        .unwrap();

        let BtcDelegationsResponse { delegations } =
            queries::delegations(deps.as_ref(), None, None, None).unwrap();
        assert_eq!(delegations, vec![stored.clone()]);

        let mut registry = StagedRegistry::default();
        let candidate = Delegation::try_from(&del).unwrap();
        assert_eq!(
            registry.admit_delegation(&deps.storage, candidate).unwrap(),
            Admission::Existing(stored)
        );
    }

    #[test]
    fn conflicting_delegation_is_rejected() {
        let mut deps = mock_dependencies();
        instantiate_with_params(&mut deps);
        let info = message_info(&deps.api.addr_make(CREATOR), &[]);

        let del = delegation_with_signers(3);
        execute(
            deps.as_mut(),
            mock_env(),
            info.clone(),
            packet_msg(vec![], vec![del.clone()]),
        )
        .unwrap();

        // Same staking tx, claimed by another delegator
        let mut other = del.clone();
        other.btc_pk_hex = test_utils::btc_pk_hex(11);
        let err = execute(deps.as_mut(), mock_env(), info, packet_msg(vec![], vec![other]))
            .unwrap_err();
        assert_eq!(
            err,
            ContractError::DelegationAlreadyExists(staking_tx_hash_hex(&del))
        );
    }

    #[test]
    fn failing_packet_writes_nothing() {
        let mut deps = mock_dependencies();
        instantiate_with_params(&mut deps);
        let info = message_info(&deps.api.addr_make(CREATOR), &[]);

        // The fp and the first delegation are fine, the second one fails admission
        let new_fp = new_finality_provider(1, CONSUMER_ID);
        let good = delegation_with_signers(3);
        let fp_pks = vec![new_fp.btc_pk_hex.clone()];
        let bad = active_delegation(11, &fp_pks, &covenant_pks(COVENANT_COMMITTEE_SIZE)[..1]);
        let err = execute(
            deps.as_mut(),
            mock_env(),
            info,
            packet_msg(vec![new_fp.clone()], vec![good, bad]),
        )
        .unwrap_err();
        assert_matches!(
            err,
            ContractError::Staking(StakingError::QuorumNotMet { .. })
        );

        let fps = queries::finality_providers(deps.as_ref(), CONSUMER_ID.to_string(), None, None)
            .unwrap()
            .fps;
        assert!(fps.is_empty());
        let delegations = queries::delegations(deps.as_ref(), None, None, None)
            .unwrap()
            .delegations;
        assert!(delegations.is_empty());
    }

    #[test]
    fn unbonded_delegation() {
        let mut deps = mock_dependencies();
        instantiate_with_params(&mut deps);
        let info = message_info(&deps.api.addr_make(CREATOR), &[]);

        let del = delegation_with_signers(3);
        let staking_tx_hash = staking_tx_hash_hex(&del);
        execute(
            deps.as_mut(),
            mock_env(),
            info.clone(),
            packet_msg(vec![], vec![del.clone()]),
        )
        .unwrap();

        let unbond = ExecuteMsg::BtcStaking {
            new_fp: vec![],
            active_del: vec![],
            slashed_del: vec![],
            unbonded_del: vec![UnbondedBtcDelegation {
                staking_tx_hash: staking_tx_hash.clone(),
                unbonding_tx_sig: Binary::new(vec![0x08; 64]),
            }],
        };
        execute(deps.as_mut(), mock_env(), info.clone(), unbond.clone()).unwrap();

        let stored = queries::delegation(deps.as_ref(), staking_tx_hash.clone()).unwrap();
        assert_matches!(&stored, BtcDelegation::Unbonded(id) if id.btc_pk_hex == del.btc_pk_hex);

        // Redelivery is a no-op
        execute(deps.as_mut(), mock_env(), info.clone(), unbond).unwrap();
        assert_eq!(
            queries::delegation(deps.as_ref(), staking_tx_hash).unwrap(),
            stored
        );

        // Only active delegations are listed when filtering
        let active = queries::delegations(deps.as_ref(), None, None, Some(true))
            .unwrap()
            .delegations;
        assert!(active.is_empty());
    }

    #[test]
    fn slashed_delegation() {
        let mut deps = mock_dependencies();
        instantiate_with_params(&mut deps);
        let info = message_info(&deps.api.addr_make(CREATOR), &[]);

        let del = delegation_with_signers(3);
        let staking_tx_hash = staking_tx_hash_hex(&del);
        let slash = |staking_tx_hash: &str| ExecuteMsg::BtcStaking {
            new_fp: vec![],
            active_del: vec![],
            slashed_del: vec![SlashedBtcDelegation {
                staking_tx_hash: staking_tx_hash.to_string(),
                recovered_fp_btc_sk: "01".repeat(32),
            }],
            unbonded_del: vec![],
        };

        // Slashing an unknown delegation fails
        let err = execute(
            deps.as_mut(),
            mock_env(),
            info.clone(),
            slash(&staking_tx_hash),
        )
        .unwrap_err();
        assert_eq!(err, ContractError::DelegationNotFound(staking_tx_hash.clone()));

        execute(
            deps.as_mut(),
            mock_env(),
            info.clone(),
            packet_msg(vec![], vec![del]),
        )
        .unwrap();
        execute(
            deps.as_mut(),
            mock_env(),
            info.clone(),
            slash(&staking_tx_hash),
        )
        .unwrap();
        let slashed = query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::Delegation {
                staking_tx_hash_hex: staking_tx_hash.clone(),
            },
        )
        .unwrap();
        let slashed: BtcDelegation = cosmwasm_std::from_json(slashed).unwrap();
        assert_eq!(slashed.status(), "slashed");

        // Slashed is terminal
        execute(deps.as_mut(), mock_env(), info, slash(&staking_tx_hash)).unwrap();
        assert_eq!(
            queries::delegation(deps.as_ref(), staking_tx_hash).unwrap(),
            slashed
        );
    }

    #[test]
    fn staking_tx_hash_parsing() {
        let hash = parse_staking_tx_hash(&"ab".repeat(HASH_SIZE)).unwrap();
        assert_eq!(hash, [0xab; HASH_SIZE]);
        assert_eq!(
            parse_staking_tx_hash("abab").unwrap_err(),
            ContractError::WrongHashLength(2)
        );
        assert_matches!(
            parse_staking_tx_hash("zz"),
            Err(ContractError::HexError(_))
        );
    }
}
