use std::str::FromStr;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Decimal;

use babylon_apis::btc_staking_api::{FinalityProviderDescription, ProofOfPossession, PubKey};
use babylon_apis::error::StakingApiError;
use babylon_apis::validate_btc_pk_hex;

use crate::error::Error;
use crate::Result;

/// FinalityProvider is a finality provider registered on a Consumer chain.
///
/// It's created on first sighting in a BTC staking packet, and it's immutable afterwards.
#[cw_serde]
pub struct FinalityProvider {
    /// description defines the description terms for the finality provider
    pub description: Option<FinalityProviderDescription>,
    /// commission defines the commission rate of the finality provider, in [0, 1]
    pub commission: Decimal,
    /// consensus_pk is the native chain (Babylon) secp256k1 PK of this finality provider.
    /// It may be absent before verification
    pub consensus_pk: Option<PubKey>,
    /// btc_pk_hex is the BIP-340 PK of this finality provider, in hex.
    /// Unique within a consumer id
    pub btc_pk_hex: String,
    /// pop is the proof of possession of the consensus_pk and btc_pk
    pub pop: Option<ProofOfPossession>,
    /// consumer_id is the ID of the consumer the finality provider is allowed to operate on
    pub consumer_id: String,
}

impl FinalityProvider {
    pub fn validate(&self) -> Result<()> {
        validate_commission(self.commission)?;
        validate_btc_pk_hex(&self.btc_pk_hex)?;
        if self.consumer_id.is_empty() {
            return Err(StakingApiError::EmptyConsumerId.into());
        }
        Ok(())
    }
}

/// parse_commission parses a decimal string commission rate, and checks it's in [0, 1]
pub fn parse_commission(commission: &str) -> Result<Decimal> {
    let rate = Decimal::from_str(commission)
        .map_err(|_| Error::InvalidCommission(commission.to_string()))?;
    validate_commission(rate)?;
    Ok(rate)
}

fn validate_commission(rate: Decimal) -> Result<()> {
    if rate > Decimal::one() {
        return Err(Error::InvalidCommission(rate.to_string()));
    }
    Ok(())
}
