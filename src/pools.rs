//! Pool accounting for a single game instance.
//!
//! Every wager is split at placement: the protocol fee goes to the fee
//! vault, the jackpot and streak rates feed their pools, and the remainder
//! backs the bankroll. Settlement pays winners from the bankroll and bonus
//! pools. The accountant is plain data; the engine serializes access.

use crate::config::GameConfig;
use crate::errors::{EngineResult, InvariantError};
use crate::ledger::{Amount, BPS};
use serde::{Deserialize, Serialize};

/// Split of one wager across the pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub fee: Amount,
    pub jackpot: Amount,
    pub streak: Amount,
    pub bankroll: Amount,
}

impl FeeBreakdown {
    /// Split `amount` according to the configured rates. The bankroll share
    /// is the exact remainder, so the parts always sum to `amount`.
    pub fn split(amount: Amount, config: &GameConfig) -> Self {
        let fee = (amount as u128 * config.fee_bps as u128 / BPS) as Amount;
        let jackpot = (amount as u128 * config.jackpot_rate_bps as u128 / BPS) as Amount;
        let streak = (amount as u128 * config.streak_rate_bps as u128 / BPS) as Amount;
        Self {
            fee,
            jackpot,
            streak,
            bankroll: amount - fee - jackpot - streak,
        }
    }
}

/// Balances held by one game instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolAccountant {
    /// Bankroll backing regular payouts.
    pub game_pool: Amount,
    /// Funds reserved for lucky-draw and top-tier jackpot payouts.
    pub jackpot_pool: Amount,
    /// Funds reserved for win-streak bonuses.
    pub streak_pool: Amount,
    /// Protocol fees collected and not yet distributed.
    pub fee_vault: Amount,
    /// Lifetime fees collected, for reporting.
    pub fees_collected: Amount,
    /// Lifetime referral commissions paid out of the vault.
    pub referral_paid: Amount,
}

impl PoolAccountant {
    /// Apply a wager's split to the pools.
    pub fn absorb(&mut self, breakdown: &FeeBreakdown) {
        self.fee_vault += breakdown.fee;
        self.fees_collected += breakdown.fee;
        self.jackpot_pool += breakdown.jackpot;
        self.streak_pool += breakdown.streak;
        self.game_pool += breakdown.bankroll;
    }

    /// Pay a winner from the bankroll. A shortfall here means the bankroll
    /// was never funded for the configured limits.
    pub fn pay_from_bankroll(&mut self, amount: Amount) -> EngineResult<()> {
        if amount > self.game_pool {
            return Err(InvariantError::BankrollShortfall {
                needed: amount,
                available: self.game_pool,
            }
            .into());
        }
        self.game_pool -= amount;
        Ok(())
    }

    /// Pay a share of the jackpot pool, capped at what the pool holds.
    pub fn pay_jackpot_share(&mut self, share_bps: u128) -> Amount {
        let amount = (self.jackpot_pool as u128 * share_bps / BPS) as Amount;
        self.jackpot_pool -= amount;
        amount
    }

    /// Pay a streak bonus, capped at what the pool holds.
    pub fn pay_streak_bonus(&mut self, amount: Amount) -> Amount {
        let paid = amount.min(self.streak_pool);
        self.streak_pool -= paid;
        paid
    }

    /// Pay referral commission from the vault, capped at what the vault
    /// holds. Returns what was actually paid.
    pub fn pay_referral(&mut self, amount: Amount) -> Amount {
        let paid = amount.min(self.fee_vault);
        self.fee_vault -= paid;
        self.referral_paid += paid;
        paid
    }

    /// Drain the vault for distribution. The caller splits the returned
    /// amount across the configured recipients.
    pub fn drain_vault(&mut self) -> Amount {
        std::mem::take(&mut self.fee_vault)
    }

    /// Seed the bankroll.
    pub fn fund_bankroll(&mut self, amount: Amount) {
        self.game_pool += amount;
    }

    /// Total funds held across all pools.
    pub fn total_held(&self) -> Amount {
        self.game_pool + self.jackpot_pool + self.streak_pool + self.fee_vault
    }
}
