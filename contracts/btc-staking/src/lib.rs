mod staking;

pub mod contract;
pub mod error;
pub mod msg;
pub mod queries;
pub mod state;
