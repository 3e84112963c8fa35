//! Balance ledger and money units.
//!
//! All amounts are integer base units of the wagering asset; one whole token
//! is [`UNIT`] base units. Rates are expressed in basis points out of
//! [`BPS`]. The ledger itself is a thread-safe debit/credit map; transfer
//! mechanics beyond that are out of scope.

use crate::errors::{EngineResult, ValidationError};
use dashmap::DashMap;

/// Account identifier (wallet address or session id).
pub type Address = String;

/// Integer amount in base units.
pub type Amount = u64;

/// Base units per whole token.
pub const UNIT: Amount = 1_000_000_000;

/// Basis-point denominator for all rates.
pub const BPS: u128 = 10_000;

/// Thread-safe per-address balance map.
pub struct BalanceLedger {
    balances: DashMap<Address, Amount>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
        }
    }

    /// Current balance, zero for unknown addresses.
    pub fn balance(&self, address: &str) -> Amount {
        self.balances.get(address).map(|v| *v).unwrap_or(0)
    }

    /// Credit an address unconditionally.
    pub fn credit(&self, address: &str, amount: Amount) {
        if amount == 0 {
            return;
        }
        *self.balances.entry(address.to_string()).or_insert(0) += amount;
    }

    /// Debit an address, rejecting when the balance does not cover it.
    pub fn debit(&self, address: &str, amount: Amount) -> EngineResult<()> {
        let mut entry = self.balances.entry(address.to_string()).or_insert(0);
        if *entry < amount {
            let available = *entry;
            drop(entry);
            return Err(ValidationError::InsufficientBalance {
                address: address.to_string(),
                needed: amount,
                available,
            }
            .into());
        }
        *entry -= amount;
        Ok(())
    }

    /// Seed an account with funds. Used by the simulator and tests.
    pub fn mint(&self, address: &str, amount: Amount) {
        self.credit(address, amount);
    }
}

impl Default for BalanceLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_and_debit() {
        let ledger = BalanceLedger::new();
        ledger.credit("alice", 100);
        assert_eq!(ledger.balance("alice"), 100);

        ledger.debit("alice", 40).expect("debit should succeed");
        assert_eq!(ledger.balance("alice"), 60);
    }

    #[test]
    fn test_overdraft_rejected() {
        let ledger = BalanceLedger::new();
        ledger.credit("bob", 10);
        let err = ledger.debit("bob", 11).unwrap_err();
        assert!(err.to_string().contains("insufficient balance"));
        // Balance unchanged on failure.
        assert_eq!(ledger.balance("bob"), 10);
    }

    #[test]
    fn test_unknown_address_is_zero() {
        let ledger = BalanceLedger::new();
        assert_eq!(ledger.balance("nobody"), 0);
        assert!(ledger.debit("nobody", 1).is_err());
    }
}
