pub mod btc_staking_api;
pub mod error;
mod validate;

use bech32::{FromBase32, ToBase32, Variant};
use cosmwasm_std::CanonicalAddr;

use crate::btc_staking_api::BIP340_PUB_KEY_LEN;

/// new_canonical_addr converts a bech32 address to a canonical address
/// ported from cosmwasm-std/testing/mock.rs
pub fn new_canonical_addr(addr: &str, prefix: &str) -> Result<CanonicalAddr, StakingApiError> {
    // decode bech32 address
    let (decoded_prefix, decoded_data, variant) = bech32::decode(addr)
        .map_err(|e| StakingApiError::InvalidAddressString(e.to_string()))?;
    // check bech32 prefix
    if decoded_prefix != prefix {
        return Err(StakingApiError::InvalidAddressString(
            "wrong bech32 prefix".to_string(),
        ));
    }
    // check bech32 variant
    if variant == Variant::Bech32m {
        return Err(StakingApiError::InvalidAddressString(
            "wrong bech32 variant".to_string(),
        ));
    }
    // check bech32 data
    let bytes = Vec::<u8>::from_base32(&decoded_data)
        .map_err(|_| StakingApiError::InvalidAddressString("invalid bech32 data".to_string()))?;
    if bytes.is_empty() || bytes.len() > 255 {
        return Err(StakingApiError::InvalidAddressString(
            "Invalid canonical address length".to_string(),
        ));
    }
    // return canonical address
    Ok(bytes.into())
}

/// encode_bech32_addr encodes raw address bytes as a bech32 string with the given prefix
pub fn encode_bech32_addr(bytes: &[u8], prefix: &str) -> Result<String, StakingApiError> {
    bech32::encode(prefix, bytes.to_base32(), Variant::Bech32)
        .map_err(|e| StakingApiError::InvalidAddressString(e.to_string()))
}

/// validate_btc_pk_hex checks that the given string is a BIP-340 public key in canonical
/// (lowercase) hex encoding
pub fn validate_btc_pk_hex(pk_hex: &str) -> Result<(), StakingApiError> {
    if pk_hex.is_empty() {
        return Err(StakingApiError::EmptyBtcPk);
    }
    let pk = hex::decode(pk_hex)?;
    if pk.len() != BIP340_PUB_KEY_LEN || hex::encode(&pk) != pk_hex {
        return Err(StakingApiError::InvalidBtcPk(
            pk_hex.to_string(),
            BIP340_PUB_KEY_LEN,
        ));
    }
    Ok(())
}

use error::StakingApiError;
pub use validate::Validate;
