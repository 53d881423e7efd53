//! Deterministic fixtures for BTC staking tests.
//!
//! Keys and transactions are derived from small integer seeds, so fixtures are reproducible
//! and distinct seeds yield distinct entities. They are structurally valid, not valid on Bitcoin.
use cosmwasm_std::Binary;
use sha2::{Digest, Sha256};

use babylon_apis::btc_staking_api::{
    ActiveBtcDelegation, BtcUndelegationInfo, CovenantAdaptorSignatures,
    FinalityProviderDescription, NewFinalityProvider, ProofOfPossession, PubKey, SignatureInfo,
};

pub const CONSUMER_ID: &str = "osmosis-1";

/// (3, 5) covenant committee
pub const COVENANT_COMMITTEE_SIZE: usize = 5;
pub const COVENANT_QUORUM: u32 = 3;

fn derive(domain: &str, seed: u8, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut counter = 0u32;
    while out.len() < len {
        let chunk = Sha256::new()
            .chain_update(domain.as_bytes())
            .chain_update([seed])
            .chain_update(counter.to_be_bytes())
            .finalize();
        out.extend_from_slice(&chunk);
        counter += 1;
    }
    out.truncate(len);
    out
}

/// btc_pk_hex returns a BIP-340 public key (32 bytes, lowercase hex) for the given seed
pub fn btc_pk_hex(seed: u8) -> String {
    hex::encode(derive("btc_pk", seed, 32))
}

/// covenant_pks returns the keys of an `n` members covenant committee
pub fn covenant_pks(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| hex::encode(derive("covenant_pk", i as u8, 32)))
        .collect()
}

pub fn new_finality_provider(seed: u8, consumer_id: &str) -> NewFinalityProvider {
    NewFinalityProvider {
        description: Some(FinalityProviderDescription {
            moniker: format!("fp{seed}"),
            identity: format!("Finality Provider {seed}"),
            website: format!("https://fp{seed}.com"),
            security_contact: "security_contact".to_string(),
            details: "details".to_string(),
        }),
        commission: "0.05".to_string(),
        babylon_pk: Some(PubKey {
            key: Binary::new(derive("babylon_pk", seed, 33)),
        }),
        btc_pk_hex: btc_pk_hex(seed),
        pop: Some(ProofOfPossession {
            btc_sig_type: 0,
            babylon_sig: Binary::new(derive("babylon_sig", seed, 64)),
            btc_sig: Binary::new(derive("btc_sig", seed, 64)),
        }),
        consumer_id: consumer_id.to_string(),
    }
}

fn covenant_adaptor_sigs(
    domain: &str,
    covenant_signers: &[String],
    fps: usize,
) -> Vec<CovenantAdaptorSignatures> {
    covenant_signers
        .iter()
        .enumerate()
        .map(|(i, cov_pk)| CovenantAdaptorSignatures {
            cov_pk: cov_pk.clone(),
            adaptor_sigs: (0..fps)
                .map(|j| Binary::new(derive(domain, (i * 16 + j) as u8, 65)))
                .collect(),
        })
        .collect()
}

/// active_delegation returns an active delegation from the delegator with the given seed,
/// restaked to `fp_pks` and co-signed by `covenant_signers`
pub fn active_delegation(
    seed: u8,
    fp_pks: &[String],
    covenant_signers: &[String],
) -> ActiveBtcDelegation {
    let fps = fp_pks.len();
    ActiveBtcDelegation {
        btc_pk_hex: btc_pk_hex(seed),
        fp_btc_pk_list: fp_pks.to_vec(),
        start_height: 1,
        end_height: 1000,
        total_sat: 10_000,
        staking_tx: Binary::new(derive("staking_tx", seed, 94)),
        slashing_tx: Binary::new(derive("slashing_tx", seed, 120)),
        delegator_slashing_sig: Binary::new(derive("delegator_slashing_sig", seed, 64)),
        covenant_sigs: covenant_adaptor_sigs("covenant_sig", covenant_signers, fps),
        staking_output_idx: 0,
        unbonding_time: 101,
        undelegation_info: Some(BtcUndelegationInfo {
            unbonding_tx: Binary::new(derive("unbonding_tx", seed, 94)),
            delegator_unbonding_sig: None,
            covenant_unbonding_sig_list: covenant_signers
                .iter()
                .enumerate()
                .map(|(i, pk)| SignatureInfo {
                    pk: pk.clone(),
                    sig: Binary::new(derive("covenant_unbonding_sig", i as u8, 64)),
                })
                .collect(),
            slashing_tx: Binary::new(derive("unbonding_slashing_tx", seed, 120)),
            delegator_slashing_sig: Binary::new(derive(
                "delegator_unbonding_slashing_sig",
                seed,
                64,
            )),
            covenant_slashing_sigs: covenant_adaptor_sigs(
                "covenant_slashing_sig",
                covenant_signers,
                fps,
            ),
        }),
        params_version: 0,
    }
}

/// staking_tx_hash_hex returns the hash identifying the staking tx of a delegation
pub fn staking_tx_hash_hex(del: &ActiveBtcDelegation) -> String {
    let mut hash: [u8; 32] = Sha256::digest(Sha256::digest(del.staking_tx.as_slice())).into();
    hash.reverse();
    hex::encode(hash)
}
