use crate::btc_staking_api::{
    CovenantAdaptorSignatures, NewFinalityProvider, SignatureInfo, SlashedBtcDelegation,
    UnbondedBtcDelegation, HASH_SIZE,
};
use crate::error::StakingApiError;
use crate::validate_btc_pk_hex;

/// A trait for validating the API structs / input.
pub trait Validate {
    fn validate(&self) -> Result<(), StakingApiError>;
}

impl Validate for NewFinalityProvider {
    fn validate(&self) -> Result<(), StakingApiError> {
        validate_btc_pk_hex(&self.btc_pk_hex)?;

        // The commission rate is parsed and range checked when building the finality provider.
        // The description and the PoP are opaque at this level.

        if self.consumer_id.is_empty() {
            return Err(StakingApiError::EmptyConsumerId);
        }

        Ok(())
    }
}

impl Validate for CovenantAdaptorSignatures {
    fn validate(&self) -> Result<(), StakingApiError> {
        validate_btc_pk_hex(&self.cov_pk)?;
        if self.adaptor_sigs.iter().any(|sig| sig.is_empty()) {
            return Err(StakingApiError::EmptySignature);
        }
        Ok(())
    }
}

impl Validate for SignatureInfo {
    fn validate(&self) -> Result<(), StakingApiError> {
        validate_btc_pk_hex(&self.pk)?;
        if self.sig.is_empty() {
            return Err(StakingApiError::EmptySignature);
        }
        Ok(())
    }
}

fn validate_staking_tx_hash(staking_tx_hash: &str) -> Result<(), StakingApiError> {
    if staking_tx_hash.len() != HASH_SIZE * 2 {
        return Err(StakingApiError::InvalidStakingTxHash(HASH_SIZE * 2));
    }
    hex::decode(staking_tx_hash)?;
    Ok(())
}

impl Validate for UnbondedBtcDelegation {
    fn validate(&self) -> Result<(), StakingApiError> {
        validate_staking_tx_hash(&self.staking_tx_hash)?;

        if self.unbonding_tx_sig.is_empty() {
            return Err(StakingApiError::EmptySignature);
        }

        Ok(())
    }
}

impl Validate for SlashedBtcDelegation {
    fn validate(&self) -> Result<(), StakingApiError> {
        validate_staking_tx_hash(&self.staking_tx_hash)?;

        if self.recovered_fp_btc_sk.is_empty() {
            return Err(StakingApiError::EmptyBtcSk);
        }

        Ok(())
    }
}
