/// BTC staking messages / API
/// The definitions here follow the JSON schema of the BTC staking packets relayed from Babylon to
/// the Consumer chain, and of the sudo notifications the Babylon SDK module sends to the
/// Consumer contracts.
///
/// Binary fields are `Binary` (base64 on the wire), public keys are BIP-340 hex strings.
/// Optional fields are omitted from the wire form when absent, never emitted as `null`.
use cosmwasm_schema::cw_serde;
use cosmwasm_std::Binary;

/// Hash size in bytes
pub const HASH_SIZE: usize = 32;

/// BIP-340 (x-only) public key size in bytes
pub const BIP340_PUB_KEY_LEN: usize = 32;

/// StakingPacketData is the envelope of a BTC staking packet, as relayed from the provider chain
#[cw_serde]
pub enum StakingPacketData {
    BtcStaking(BtcStakingPacket),
}

/// BtcStakingPacket carries the BTC staking facts the provider chain pushes to the Consumer
/// chain.
/// Empty lists may be omitted by the sender.
#[cw_serde]
#[derive(Default)]
pub struct BtcStakingPacket {
    #[serde(default)]
    pub new_fp: Vec<NewFinalityProvider>,
    #[serde(default)]
    pub active_del: Vec<ActiveBtcDelegation>,
    #[serde(default)]
    pub slashed_del: Vec<SlashedBtcDelegation>,
    #[serde(default)]
    pub unbonded_del: Vec<UnbondedBtcDelegation>,
}

impl BtcStakingPacket {
    pub fn is_empty(&self) -> bool {
        self.new_fp.is_empty()
            && self.active_del.is_empty()
            && self.slashed_del.is_empty()
            && self.unbonded_del.is_empty()
    }
}

#[cw_serde]
pub enum SudoMsg {
    /// The SDK calls SudoMsg::BeginBlock{} once per block (in BeginBlock), with a projection of
    /// the block header.
    BeginBlock {
        /// height is the height of the block
        height: i64,
        /// hash_hex is the hash of the block, in hex
        hash_hex: String,
        /// time is the block time, in RFC3339 format
        time: String,
        /// chain_id is the id of the chain producing the block
        chain_id: String,
        /// app_hash_hex is the app hash of the block, in hex
        app_hash_hex: String,
    },
}

/// NewFinalityProvider is a finality provider registration, as sent in a BTC staking packet
#[cw_serde]
pub struct NewFinalityProvider {
    /// description defines the description terms for the finality provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<FinalityProviderDescription>,
    /// commission defines the commission rate of the finality provider, as a decimal string
    pub commission: String,
    /// babylon_pk is the Babylon secp256k1 PK of this finality provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub babylon_pk: Option<PubKey>,
    /// btc_pk_hex is the Bitcoin secp256k1 PK of this finality provider
    /// the PK follows encoding in BIP-340 spec in hex format
    pub btc_pk_hex: String,
    /// pop is the proof of possession of the babylon_pk and btc_pk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pop: Option<ProofOfPossession>,
    /// consumer_id is the ID of the consumer the finality provider is operating on
    pub consumer_id: String,
}

#[cw_serde]
pub struct FinalityProviderDescription {
    /// moniker is the name of the finality provider
    pub moniker: String,
    /// identity is the identity of the finality provider
    pub identity: String,
    /// website is the website of the finality provider
    pub website: String,
    /// security_contact is the security contact of the finality provider
    pub security_contact: String,
    /// details is the details of the finality provider
    pub details: String,
}

/// PubKey defines a secp256k1 public key.
/// Key is the compressed form of the pubkey. The first byte is a 0x02 byte
/// if the y-coordinate is the lexicographically largest of the two associated with
/// the x-coordinate. Otherwise, the first byte is a 0x03.
/// This prefix is followed with the x-coordinate.
#[cw_serde]
pub struct PubKey {
    /// key is the compressed public key of the finality provider
    pub key: Binary,
}

/// ProofOfPossession is the proof of possession that a Babylon secp256k1
/// secret key and a Bitcoin secp256k1 secret key are held by the same
/// person
#[cw_serde]
pub struct ProofOfPossession {
    /// btc_sig_type indicates the type of btc_sig in the pop
    pub btc_sig_type: i32,
    /// babylon_sig is the signature generated via sign(sk_babylon, pk_btc)
    pub babylon_sig: Binary,
    /// btc_sig is the signature generated via sign(sk_btc, babylon_sig)
    /// the signature follows encoding in either BIP-340 spec or BIP-322 spec
    pub btc_sig: Binary,
}

/// ActiveBTCDelegation is a message sent when a BTC delegation newly receives covenant signatures
/// and thus becomes active
#[cw_serde]
pub struct ActiveBtcDelegation {
    /// btc_pk_hex is the Bitcoin secp256k1 PK of the BTC delegator.
    /// The PK follows encoding in BIP-340 spec in hex format
    pub btc_pk_hex: String,
    /// fp_btc_pk_list is the list of BIP-340 PKs of the finality providers that
    /// this BTC delegation delegates to
    pub fp_btc_pk_list: Vec<String>,
    /// start_height is the start BTC height of the BTC delegation.
    /// It is the start BTC height of the time-lock
    pub start_height: u64,
    /// end_height is the end height of the BTC delegation
    /// it is the end BTC height of the time-lock - w
    pub end_height: u64,
    /// total_sat is the total BTC stakes in this delegation, quantified in satoshi
    pub total_sat: u64,
    /// staking_tx is the staking tx
    pub staking_tx: Binary,
    /// slashing_tx is the slashing tx
    pub slashing_tx: Binary,
    /// delegator_slashing_sig is the signature on the slashing tx
    /// by the delegator (i.e. SK corresponding to btc_pk).
    /// It will be a part of the witness for the staking tx output.
    pub delegator_slashing_sig: Binary,
    /// covenant_sigs is a list of adaptor signatures on the slashing tx
    /// by each covenant member.
    /// It will be a part of the witness for the staking tx output.
    pub covenant_sigs: Vec<CovenantAdaptorSignatures>,
    /// staking_output_idx is the index of the staking output in the staking tx
    pub staking_output_idx: u32,
    /// unbonding_time is used in unbonding output time-lock path and in slashing transactions
    /// change outputs
    pub unbonding_time: u32,
    /// undelegation_info is the undelegation info of this delegation.
    /// Every delegation carries it; a missing one is rejected on decoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undelegation_info: Option<BtcUndelegationInfo>,
    /// params version used to validate the delegation
    pub params_version: u32,
}

/// CovenantAdaptorSignatures is a list adaptor signatures signed by the
/// covenant with different finality provider's public keys as encryption keys
#[cw_serde]
pub struct CovenantAdaptorSignatures {
    /// cov_pk is the public key of the covenant emulator, used as the public key of the adaptor
    /// signature. BIP-340 hex
    pub cov_pk: String,
    /// adaptor_sigs is a list of adaptor signatures, each encrypted by a restaked BTC finality
    /// provider's public key
    pub adaptor_sigs: Vec<Binary>,
}

/// BTCUndelegationInfo provides all necessary info about the undeleagation
#[cw_serde]
pub struct BtcUndelegationInfo {
    /// unbonding_tx is the transaction which will transfer the funds from staking
    /// output to unbonding output. Unbonding output will usually have lower timelock
    /// than staking output.
    pub unbonding_tx: Binary,
    /// delegator_unbonding_sig is the signature on the unbonding tx
    /// by the delegator (i.e. SK corresponding to btc_pk).
    /// It effectively proves that the delegator wants to unbond, so it is absent while the
    /// delegation is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegator_unbonding_sig: Option<Binary>,
    /// covenant_unbonding_sig_list is the list of signatures on the unbonding tx
    /// by covenant members
    pub covenant_unbonding_sig_list: Vec<SignatureInfo>,
    /// slashing_tx is the unbonding slashing tx
    pub slashing_tx: Binary,
    /// delegator_slashing_sig is the signature on the slashing tx
    /// by the delegator (i.e. SK corresponding to btc_pk).
    /// It will be a part of the witness for the unbonding tx output.
    pub delegator_slashing_sig: Binary,
    /// covenant_slashing_sigs is a list of adaptor signatures on the
    /// unbonding slashing tx by each covenant member
    /// It will be a part of the witness for the staking tx output.
    pub covenant_slashing_sigs: Vec<CovenantAdaptorSignatures>,
}

/// SignatureInfo is a BIP-340 signature together with its signer's BIP-340 PK
#[cw_serde]
pub struct SignatureInfo {
    /// pk is the signer's BIP-340 PK, in hex
    pub pk: String,
    pub sig: Binary,
}

/// SlashedBTCDelegation is a packet sent from Babylon to the Consumer chain about a slashed BTC
/// delegation re-staked to >=1 of the Consumer chain's finality providers
#[cw_serde]
pub struct SlashedBtcDelegation {
    /// staking tx hash of the BTC delegation. It uniquely identifies a BTC delegation
    pub staking_tx_hash: String,
    /// recovered_fp_btc_sk is the extracted BTC SK of the finality provider on this Consumer chain
    pub recovered_fp_btc_sk: String,
}

/// UnbondedBTCDelegation is sent from Babylon to the Consumer chain upon an early unbonded BTC
/// delegation
#[cw_serde]
pub struct UnbondedBtcDelegation {
    /// staking tx hash of the BTC delegation. It uniquely identifies a BTC delegation
    pub staking_tx_hash: String,
    /// unbonding_tx_sig is the signature on the unbonding tx signed by the BTC delegator
    /// It proves that the BTC delegator wants to unbond
    pub unbonding_tx_sig: Binary,
}
