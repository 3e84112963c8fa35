//! Two-level referral relationships and commission math.
//!
//! A player binds to at most one upline, forever, at their first settled
//! bet that carries a proposer. Commissions are a share of the protocol-fee
//! portion of each wager and are paid out of the collected fee at
//! settlement, win or lose.

use crate::ledger::{Address, Amount, BPS};
use dashmap::DashMap;

/// Tier-1 (direct upline) share of the protocol fee, in basis points.
pub const TIER1_COMMISSION_BPS: u128 = 2_400;
/// Tier-2 (upline's upline) share of the protocol fee, in basis points.
pub const TIER2_COMMISSION_BPS: u128 = 100;

/// A player's bound uplines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uplines {
    pub tier1: Address,
    pub tier2: Option<Address>,
}

/// Commission amounts owed for one settled wager.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commission {
    pub tier1: Option<(Address, Amount)>,
    pub tier2: Option<(Address, Amount)>,
}

impl Commission {
    pub fn total(&self) -> Amount {
        self.tier1.as_ref().map(|(_, a)| *a).unwrap_or(0)
            + self.tier2.as_ref().map(|(_, a)| *a).unwrap_or(0)
    }
}

/// Referral graph: who recruited whom, and who is barred from being an
/// upline.
pub struct ReferralLedger {
    uplines: DashMap<Address, Uplines>,
    downline_counts: DashMap<Address, u64>,
    contract_accounts: DashMap<Address, ()>,
}

impl ReferralLedger {
    pub fn new() -> Self {
        Self {
            uplines: DashMap::new(),
            downline_counts: DashMap::new(),
            contract_accounts: DashMap::new(),
        }
    }

    /// Mark an address as a contract account, ineligible as an upline.
    pub fn mark_contract(&self, address: &str) {
        self.contract_accounts.insert(address.to_string(), ());
    }

    /// Try to bind `player` under `proposer`. Returns true when a new bind
    /// was recorded.
    ///
    /// No bind happens when the player is already bound, proposes
    /// themselves, the proposer is a contract account, or the player
    /// already has downlines of their own.
    pub fn bind_if_unbound(&self, player: &str, proposer: &str) -> bool {
        if proposer.is_empty() || player == proposer {
            return false;
        }
        if self.uplines.contains_key(player) {
            return false;
        }
        if self.contract_accounts.contains_key(proposer) {
            return false;
        }
        if self.downline_counts.get(player).map(|c| *c).unwrap_or(0) > 0 {
            return false;
        }

        let tier2 = self.uplines.get(proposer).map(|u| u.tier1.clone());
        self.uplines.insert(
            player.to_string(),
            Uplines {
                tier1: proposer.to_string(),
                tier2,
            },
        );
        *self
            .downline_counts
            .entry(proposer.to_string())
            .or_insert(0) += 1;
        true
    }

    /// The player's bound uplines, if any.
    pub fn uplines_of(&self, player: &str) -> Option<Uplines> {
        self.uplines.get(player).map(|u| u.clone())
    }

    pub fn downline_count(&self, address: &str) -> u64 {
        self.downline_counts.get(address).map(|c| *c).unwrap_or(0)
    }

    /// Commission owed on a wager's protocol-fee portion.
    ///
    /// `fee_amount` is the fee collected from this bet; the tier shares are
    /// fractions of it. Unbound players owe nothing.
    pub fn commission_for(&self, player: &str, fee_amount: Amount) -> Commission {
        let Some(uplines) = self.uplines_of(player) else {
            return Commission::default();
        };

        let tier1_amount = (fee_amount as u128 * TIER1_COMMISSION_BPS / BPS) as Amount;
        let tier2_amount = (fee_amount as u128 * TIER2_COMMISSION_BPS / BPS) as Amount;

        Commission {
            tier1: (tier1_amount > 0).then(|| (uplines.tier1.clone(), tier1_amount)),
            tier2: uplines
                .tier2
                .filter(|_| tier2_amount > 0)
                .map(|addr| (addr, tier2_amount)),
        }
    }
}

impl Default for ReferralLedger {
    fn default() -> Self {
        Self::new()
    }
}
