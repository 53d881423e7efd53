use thiserror::Error;

/// ExecutionError is the failure of an external contract execution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Out of gas; limit: {limit}, consumed: {consumed}")]
    OutOfGas { limit: u64, consumed: u64 },
    #[error("Contract execution failed: {0}")]
    Contract(String),
}

/// GasMeter tracks the gas consumed by a contract execution against a fixed limit.
/// Consumption is deterministic: the same execution always consumes the same amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasMeter {
    limit: u64,
    consumed: u64,
}

impl GasMeter {
    pub fn new(limit: u64) -> Self {
        GasMeter { limit, consumed: 0 }
    }

    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.consumed)
    }

    /// consume charges `amount` gas. Going over the limit fails with `OutOfGas`, and the attempted
    /// consumption is recorded anyway.
    pub fn consume(&mut self, amount: u64) -> Result<(), ExecutionError> {
        self.consumed = self.consumed.saturating_add(amount);
        self.check()
    }

    /// check fails if the consumed gas exceeds the limit
    pub fn check(&self) -> Result<(), ExecutionError> {
        if self.consumed > self.limit {
            return Err(ExecutionError::OutOfGas {
                limit: self.limit,
                consumed: self.consumed,
            });
        }
        Ok(())
    }
}

/// ContractExecutor is the contract execution capability of the host chain
pub trait ContractExecutor {
    /// sudo calls the sudo entry point of `contract` with the given JSON message, charging the
    /// execution to `gas`
    fn sudo(
        &mut self,
        contract: &str,
        msg: &[u8],
        gas: &mut GasMeter,
    ) -> Result<(), ExecutionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_meter_limits() {
        let mut gas = GasMeter::new(100);
        gas.consume(60).unwrap();
        assert_eq!(gas.remaining(), 40);
        gas.consume(40).unwrap();
        assert_eq!(gas.remaining(), 0);

        assert_eq!(
            gas.consume(1).unwrap_err(),
            ExecutionError::OutOfGas {
                limit: 100,
                consumed: 101
            }
        );
        // The overrun stays on the meter
        assert!(gas.check().is_err());
        assert_eq!(gas.consumed(), 101);
    }

    #[test]
    fn gas_meter_saturates() {
        let mut gas = GasMeter::new(u64::MAX);
        gas.consume(u64::MAX).unwrap();
        gas.consume(1).unwrap();
        assert_eq!(gas.consumed(), u64::MAX);
    }
}
