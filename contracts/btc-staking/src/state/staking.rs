use cw_storage_plus::Map;

use babylon_btcstaking::{BtcDelegation, FinalityProvider};

/// Finality providers by consumer id and BTC PK (hex)
pub(crate) const FPS: Map<(&str, &str), FinalityProvider> = Map::new("fps");
/// BTC delegations by staking tx hash
pub(crate) const DELEGATIONS: Map<&[u8], BtcDelegation> = Map::new("delegations");
