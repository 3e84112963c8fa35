//! Error types for the betforge settlement engine.
//!
//! Errors are split into four classes: validation errors (caller mistakes,
//! rejected before any state change), state errors (operation does not apply
//! to the current lifecycle state), invariant violations (bankroll/accounting
//! misconfiguration, fatal in correct operation) and oracle errors
//! (randomness delivery that cannot be correlated to a pending bet).

use crate::ledger::{Address, Amount};
use thiserror::Error;

/// Root error type for all engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantError),

    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Caller mistakes, rejected synchronously with no state change.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid value: sent {sent}, declared bet amount {declared}")]
    InvalidValue { sent: Amount, declared: Amount },

    #[error("invalid bet amount {amount}: must be within [{min}, {max}]")]
    InvalidBetAmount {
        amount: Amount,
        min: Amount,
        max: Amount,
    },

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("range end {end} must be between bet number {start} and 100")]
    RangeInvalid { start: u32, end: u32 },

    #[error("note too long: {len} bytes (max {max})")]
    NoteTooLong { len: usize, max: usize },

    #[error("insufficient balance for {address}: needed {needed}, available {available}")]
    InsufficientBalance {
        address: Address,
        needed: Amount,
        available: Amount,
    },

    #[error("stake amount must be greater than zero")]
    ZeroStake,

    #[error("stake cap exceeded: total would be {total}, cap is {cap}")]
    StakeCapExceeded { total: Amount, cap: Amount },
}

/// Operation does not apply to the current lifecycle state. No state change.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("bet {0} is already settled")]
    AlreadySettled(u64),

    #[error("unknown bet id {0}")]
    UnknownBet(u64),

    #[error("nothing staked for {0}")]
    NothingStaked(Address),
}

/// Accounting states that are unreachable when the bankroll is funded and
/// fee rates are configured correctly. These are not user errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantError {
    #[error("bankroll shortfall: payout {needed} exceeds game pool {available}")]
    BankrollShortfall { needed: Amount, available: Amount },

    #[error("reward accounting underflow: {0}")]
    RewardAccounting(String),
}

/// Randomness delivery that cannot be matched to a pending request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("unknown or already-consumed request id {0}")]
    UnknownRequest(u64),

    #[error("wrong word count: expected {expected}, got {got}")]
    WordCount { expected: u32, got: usize },
}

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Convenience alias used throughout the crate.
pub type EngineResult<T> = Result<T, EngineError>;
