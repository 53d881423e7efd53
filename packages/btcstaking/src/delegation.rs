use std::collections::{BTreeSet, HashSet};

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Binary;
use sha2::{Digest, Sha256};

use babylon_apis::btc_staking_api::{CovenantAdaptorSignatures, SignatureInfo, HASH_SIZE};
use babylon_apis::error::StakingApiError;
use babylon_apis::{validate_btc_pk_hex, Validate};

use crate::error::Error;
use crate::Result;

/// DelegationId uniquely identifies a BTC delegation
#[cw_serde]
pub struct DelegationId {
    /// btc_pk_hex is the BIP-340 PK of the BTC delegator, in hex
    pub btc_pk_hex: String,
    /// staking_tx_hash is the hash of the staking tx, in hex (Bitcoin txid byte order)
    pub staking_tx_hash: String,
}

/// staking_tx_hash computes the hash identifying a staking tx: the double SHA-256 of its raw
/// bytes, in the reversed byte order Bitcoin uses to display txids.
pub fn staking_tx_hash(staking_tx: &[u8]) -> [u8; HASH_SIZE] {
    let mut hash: [u8; HASH_SIZE] = Sha256::digest(Sha256::digest(staking_tx)).into();
    hash.reverse();
    hash
}

/// Delegation is the body of a BTC delegation that has been (or is being) admitted with a
/// covenant quorum.
#[cw_serde]
pub struct Delegation {
    /// btc_pk_hex is the Bitcoin secp256k1 PK of the BTC delegator.
    /// The PK follows encoding in BIP-340 spec in hex format
    pub btc_pk_hex: String,
    /// fp_btc_pk_list is the list of BIP-340 PKs of the finality providers that
    /// this BTC delegation delegates to
    pub fp_btc_pk_list: Vec<String>,
    /// start_height is the start BTC height of the time-lock
    pub start_height: u64,
    /// end_height is the end BTC height of the time-lock
    pub end_height: u64,
    /// total_sat is the total BTC stakes in this delegation, quantified in satoshi
    pub total_sat: u64,
    /// staking_tx is the staking tx
    pub staking_tx: Binary,
    /// slashing_tx is the slashing tx
    pub slashing_tx: Binary,
    /// delegator_slashing_sig is the signature on the slashing tx by the delegator
    pub delegator_slashing_sig: Binary,
    /// covenant_sigs is a list of adaptor signatures on the slashing tx by each covenant member
    pub covenant_sigs: Vec<CovenantAdaptorSignatures>,
    /// staking_output_idx is the index of the staking output in the staking tx
    pub staking_output_idx: u32,
    /// unbonding_time is used in unbonding output time-lock path and in slashing transactions
    /// change outputs
    pub unbonding_time: u32,
    /// undelegation_info is the undelegation info of this delegation
    pub undelegation_info: UndelegationInfo,
    /// params_version is the version of the staking params the delegation was validated with
    pub params_version: u32,
}

/// UndelegationInfo is the undelegation info of a delegation that has not requested unbonding.
/// The delegator's unbonding signature lives in `UnbondingDelegation`.
#[cw_serde]
pub struct UndelegationInfo {
    /// unbonding_tx is the transaction which will transfer the funds from staking
    /// output to unbonding output
    pub unbonding_tx: Binary,
    /// covenant_unbonding_sig_list is the list of signatures on the unbonding tx
    /// by covenant members
    pub covenant_unbonding_sig_list: Vec<SignatureInfo>,
    /// slashing_tx is the unbonding slashing tx
    pub slashing_tx: Binary,
    /// delegator_slashing_sig is the signature on the unbonding slashing tx by the delegator
    pub delegator_slashing_sig: Binary,
    /// covenant_slashing_sigs is a list of adaptor signatures on the unbonding slashing tx by
    /// each covenant member
    pub covenant_slashing_sigs: Vec<CovenantAdaptorSignatures>,
}

/// UnbondingDelegation is a delegation whose delegator signed the unbonding tx.
/// It awaits the provider chain's decision (fed back through the packet boundary).
#[cw_serde]
pub struct UnbondingDelegation {
    pub delegation: Delegation,
    /// delegator_unbonding_sig is the signature on the unbonding tx by the delegator
    pub delegator_unbonding_sig: Binary,
}

/// BtcDelegation is a BTC delegation at a given stage of its lifecycle.
///
/// The legal path is Active -> Unbonding -> {Slashed, Unbonded}, with Active able to go directly
/// to either terminal state.
#[cw_serde]
pub enum BtcDelegation {
    Active(Delegation),
    Unbonding(UnbondingDelegation),
    Slashed(DelegationId),
    Unbonded(DelegationId),
}

impl Delegation {
    pub fn staking_tx_hash(&self) -> [u8; HASH_SIZE] {
        staking_tx_hash(&self.staking_tx)
    }

    pub fn id(&self) -> DelegationId {
        DelegationId {
            btc_pk_hex: self.btc_pk_hex.clone(),
            staking_tx_hash: hex::encode(self.staking_tx_hash()),
        }
    }

    /// validate checks the structural invariants of the delegation.
    /// It does not check the covenant quorum, see `admit_delegation`.
    pub fn validate(&self) -> Result<()> {
        validate_btc_pk_hex(&self.btc_pk_hex).map_err(Error::malformed)?;

        // Ensure the list of finality provider BTC PKs is not empty
        if self.fp_btc_pk_list.is_empty() {
            return Err(Error::malformed(StakingApiError::EmptyBtcPkList));
        }
        // Ensure the list of finality provider BTC PKs is not duplicated
        let mut fp_btc_pk_set = HashSet::new();
        for fp_btc_pk in &self.fp_btc_pk_list {
            validate_btc_pk_hex(fp_btc_pk).map_err(Error::malformed)?;
            if !fp_btc_pk_set.insert(fp_btc_pk) {
                return Err(Error::malformed(StakingApiError::DuplicatedBtcPk(
                    fp_btc_pk.clone(),
                )));
            }
        }

        if self.start_height >= self.end_height {
            return Err(Error::malformed(StakingApiError::InvalidTimeLock(
                self.start_height,
                self.end_height,
            )));
        }
        if self.total_sat == 0 {
            return Err(Error::malformed(StakingApiError::EmptyStake));
        }
        if self.staking_tx.is_empty() {
            return Err(Error::malformed(StakingApiError::EmptyStakingTx));
        }
        if self.slashing_tx.is_empty() {
            return Err(Error::malformed(StakingApiError::EmptySlashingTx));
        }
        if self.delegator_slashing_sig.is_empty() {
            return Err(Error::malformed(StakingApiError::EmptySignature));
        }
        // Unbonding time must fit a BTC relative time-lock
        if self.unbonding_time > u16::MAX as u32 {
            return Err(Error::malformed(StakingApiError::ErrInvalidUnbondingTime(
                self.unbonding_time,
                u16::MAX as u32,
            )));
        }

        let fps = self.fp_btc_pk_list.len();
        validate_covenant_sigs(&self.covenant_sigs, fps)?;
        self.undelegation_info.validate(fps)
    }
}

impl UndelegationInfo {
    fn validate(&self, fps: usize) -> Result<()> {
        if self.unbonding_tx.is_empty() {
            return Err(Error::malformed(StakingApiError::EmptyUnbondingTx));
        }
        if self.slashing_tx.is_empty() {
            return Err(Error::malformed(StakingApiError::EmptySlashingTx));
        }
        if self.delegator_slashing_sig.is_empty() {
            return Err(Error::malformed(StakingApiError::EmptySignature));
        }
        for sig in &self.covenant_unbonding_sig_list {
            sig.validate().map_err(Error::malformed)?;
        }
        validate_covenant_sigs(&self.covenant_slashing_sigs, fps)
    }
}

/// Every covenant member signs one adaptor signature per restaked finality provider
fn validate_covenant_sigs(sigs: &[CovenantAdaptorSignatures], fps: usize) -> Result<()> {
    for sig in sigs {
        sig.validate().map_err(Error::malformed)?;
        if sig.adaptor_sigs.len() != fps {
            return Err(Error::malformed(StakingApiError::AdaptorSigCountMismatch(
                sig.cov_pk.clone(),
                sig.adaptor_sigs.len(),
                fps,
            )));
        }
    }
    Ok(())
}

impl BtcDelegation {
    pub fn id(&self) -> DelegationId {
        match self {
            BtcDelegation::Active(del) => del.id(),
            BtcDelegation::Unbonding(undel) => undel.delegation.id(),
            BtcDelegation::Slashed(id) | BtcDelegation::Unbonded(id) => id.clone(),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            BtcDelegation::Active(_) => "active",
            BtcDelegation::Unbonding(_) => "unbonding",
            BtcDelegation::Slashed(_) => "slashed",
            BtcDelegation::Unbonded(_) => "unbonded",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, BtcDelegation::Active(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BtcDelegation::Slashed(_) | BtcDelegation::Unbonded(_))
    }
}

/// count_distinct_signers counts the covenant members that signed, whatever the number of
/// entries each of them provided
pub fn count_distinct_signers(sigs: &[CovenantAdaptorSignatures]) -> usize {
    sigs.iter()
        .map(|sig| sig.cov_pk.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// admit_delegation checks the candidate's structural invariants and covenant quorum, and
/// yields it as an active delegation.
pub fn admit_delegation(candidate: Delegation, quorum: u32) -> Result<BtcDelegation> {
    candidate.validate()?;

    let signers = count_distinct_signers(&candidate.covenant_sigs);
    if signers < quorum as usize {
        return Err(Error::QuorumNotMet { signers, quorum });
    }

    Ok(BtcDelegation::Active(candidate))
}

/// begin_unbonding attaches the delegator's unbonding signature to an active delegation
pub fn begin_unbonding(delegation: BtcDelegation, delegator_sig: Binary) -> Result<BtcDelegation> {
    match delegation {
        BtcDelegation::Active(delegation) => {
            if delegator_sig.is_empty() {
                return Err(Error::malformed(StakingApiError::EmptySignature));
            }
            Ok(BtcDelegation::Unbonding(UnbondingDelegation {
                delegation,
                delegator_unbonding_sig: delegator_sig,
            }))
        }
        other => Err(Error::IllegalTransition {
            status: other.status(),
            transition: "begin_unbonding",
        }),
    }
}

/// mark_slashed moves a delegation to the slashed state.
/// Already terminal delegations are returned unchanged.
pub fn mark_slashed(delegation: BtcDelegation) -> BtcDelegation {
    match delegation {
        BtcDelegation::Active(_) | BtcDelegation::Unbonding(_) => {
            BtcDelegation::Slashed(delegation.id())
        }
        terminal => terminal,
    }
}

/// mark_unbonded moves a delegation to the unbonded state.
/// Already terminal delegations are returned unchanged.
pub fn mark_unbonded(delegation: BtcDelegation) -> BtcDelegation {
    match delegation {
        BtcDelegation::Active(_) | BtcDelegation::Unbonding(_) => {
            BtcDelegation::Unbonded(delegation.id())
        }
        terminal => terminal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn pk(i: u8) -> String {
        hex::encode([i; 32])
    }

    fn covenant_sigs(signers: &[u8], fps: usize) -> Vec<CovenantAdaptorSignatures> {
        signers
            .iter()
            .map(|i| CovenantAdaptorSignatures {
                cov_pk: pk(100 + i),
                adaptor_sigs: vec![Binary::new(vec![*i; 65]); fps],
            })
            .collect()
    }

    fn delegation(signers: &[u8]) -> Delegation {
        Delegation {
            btc_pk_hex: pk(1),
            fp_btc_pk_list: vec![pk(2)],
            start_height: 1,
            end_height: 1000,
            total_sat: 10_000,
            staking_tx: Binary::new(vec![0x02; 94]),
            slashing_tx: Binary::new(vec![0x03; 120]),
            delegator_slashing_sig: Binary::new(vec![0x04; 64]),
            covenant_sigs: covenant_sigs(signers, 1),
            staking_output_idx: 0,
            unbonding_time: 101,
            undelegation_info: UndelegationInfo {
                unbonding_tx: Binary::new(vec![0x05; 94]),
                covenant_unbonding_sig_list: vec![],
                slashing_tx: Binary::new(vec![0x06; 120]),
                delegator_slashing_sig: Binary::new(vec![0x07; 64]),
                covenant_slashing_sigs: vec![],
            },
            params_version: 0,
        }
    }

    #[test]
    fn quorum_three_of_five() {
        let del = delegation(&[0, 1, 2]);
        let admitted = admit_delegation(del.clone(), 3).unwrap();
        assert_eq!(admitted, BtcDelegation::Active(del));

        // Three entries, but only two distinct signers
        let del = delegation(&[0, 1, 1]);
        assert_eq!(
            admit_delegation(del, 3).unwrap_err(),
            Error::QuorumNotMet {
                signers: 2,
                quorum: 3
            }
        );
    }

    #[test]
    fn structural_checks() {
        let mut del = delegation(&[0, 1, 2]);
        del.fp_btc_pk_list = vec![];
        assert_matches!(
            admit_delegation(del, 0),
            Err(Error::MalformedDelegation(msg)) if msg.contains("No Finality Providers")
        );

        let mut del = delegation(&[0, 1, 2]);
        del.fp_btc_pk_list = vec![pk(2), pk(2)];
        assert_matches!(admit_delegation(del, 0), Err(Error::MalformedDelegation(_)));

        let mut del = delegation(&[0, 1, 2]);
        del.end_height = del.start_height;
        assert_matches!(admit_delegation(del, 0), Err(Error::MalformedDelegation(_)));

        let mut del = delegation(&[0, 1, 2]);
        del.total_sat = 0;
        assert_matches!(admit_delegation(del, 0), Err(Error::MalformedDelegation(_)));

        let mut del = delegation(&[0, 1, 2]);
        del.staking_tx = Binary::default();
        assert_matches!(admit_delegation(del, 0), Err(Error::MalformedDelegation(_)));

        let mut del = delegation(&[0, 1, 2]);
        del.unbonding_time = u16::MAX as u32 + 1;
        assert_matches!(admit_delegation(del, 0), Err(Error::MalformedDelegation(_)));
    }

    #[test]
    fn adaptor_sigs_match_fp_count() {
        let mut del = delegation(&[0, 1, 2]);
        del.fp_btc_pk_list.push(pk(3));
        // Covenant signatures were built for a single finality provider
        assert_matches!(
            admit_delegation(del.clone(), 3),
            Err(Error::MalformedDelegation(msg)) if msg.contains("adaptor signatures")
        );

        del.covenant_sigs = covenant_sigs(&[0, 1, 2], 2);
        admit_delegation(del, 3).unwrap();
    }

    #[test]
    fn staking_tx_hash_is_reversed_double_sha256() {
        let del = delegation(&[]);
        let mut expected: [u8; HASH_SIZE] =
            Sha256::digest(Sha256::digest(del.staking_tx.as_slice())).into();
        expected.reverse();
        assert_eq!(del.staking_tx_hash(), expected);
        assert_eq!(del.id().staking_tx_hash, hex::encode(expected));
        assert_eq!(del.id().btc_pk_hex, pk(1));
    }

    #[test]
    fn unbonding_lifecycle() {
        let active = admit_delegation(delegation(&[0]), 1).unwrap();
        let id = active.id();

        assert_matches!(
            begin_unbonding(active.clone(), Binary::default()),
            Err(Error::MalformedDelegation(_))
        );

        let unbonding = begin_unbonding(active, Binary::new(vec![9; 64])).unwrap();
        assert_eq!(unbonding.status(), "unbonding");
        assert_eq!(unbonding.id(), id);

        // Unbonding can only begin once
        assert_eq!(
            begin_unbonding(unbonding.clone(), Binary::new(vec![9; 64])).unwrap_err(),
            Error::IllegalTransition {
                status: "unbonding",
                transition: "begin_unbonding"
            }
        );

        let unbonded = mark_unbonded(unbonding);
        assert_eq!(unbonded, BtcDelegation::Unbonded(id.clone()));
        assert!(unbonded.is_terminal());
        assert_eq!(
            begin_unbonding(unbonded, Binary::new(vec![9; 64])).unwrap_err(),
            Error::IllegalTransition {
                status: "unbonded",
                transition: "begin_unbonding"
            }
        );
    }

    #[test]
    fn terminal_transitions_are_idempotent() {
        let active = admit_delegation(delegation(&[0]), 1).unwrap();
        let id = active.id();

        let slashed = mark_slashed(active);
        assert_eq!(slashed, BtcDelegation::Slashed(id.clone()));
        assert_eq!(mark_slashed(slashed.clone()), slashed);
        // A terminal delegation stays in its terminal state
        assert_eq!(mark_unbonded(slashed.clone()), slashed);

        let unbonded = BtcDelegation::Unbonded(id);
        assert_eq!(mark_unbonded(unbonded.clone()), unbonded);
        assert_eq!(mark_slashed(unbonded.clone()), unbonded);
    }

    proptest! {
        #[test]
        fn admission_iff_distinct_signers_meet_quorum(
            signers in proptest::collection::vec(0u8..5, 0..8),
            quorum in 0u32..6,
        ) {
            let distinct = signers.iter().collect::<BTreeSet<_>>().len();
            let del = delegation(&signers);
            let res = admit_delegation(del.clone(), quorum);
            prop_assert_eq!(res.is_ok(), distinct >= quorum as usize);
            // Pure: same input, same outcome
            prop_assert_eq!(admit_delegation(del, quorum), res);
        }
    }
}
