//! Scratch-card rules: three independent symbols from 1 to 69.
//!
//! The three symbols are pattern-matched against ordered tier rules, most
//! valuable first. 69 is the lucky symbol; a symbol's decade digit (6) and
//! last digit (9) feed the lower tiers. Payout is `amount * odds / 10` per
//! tier, with the odds table adjustable at runtime. The top three tiers
//! also pay a share of the jackpot pool.

use crate::errors::{EngineResult, ValidationError};
use crate::games::rules::{draw_from_word, GameRules};
use crate::games::types::{BetSelection, GameKind, Outcome, PrizeTier};
use std::collections::BTreeMap;
use std::sync::RwLock;

const SYMBOL_MODULUS: u64 = 69;
const LUCKY_SYMBOL: u32 = 69;

fn default_odds() -> BTreeMap<PrizeTier, u64> {
    BTreeMap::from([
        (PrizeTier::Grand, 100_000),
        (PrizeTier::First, 1_000),
        (PrizeTier::Second, 500),
        (PrizeTier::Third, 200),
        (PrizeTier::Fourth, 50),
        (PrizeTier::Fifth, 20),
        (PrizeTier::Sixth, 10),
    ])
}

/// Tier for three drawn symbols, or None.
pub fn prize_for(symbols: &[u32]) -> Option<PrizeTier> {
    let [a, b, c] = *symbols else {
        return None;
    };
    let luckies = symbols.iter().filter(|s| **s == LUCKY_SYMBOL).count();
    let leading_six = symbols.iter().filter(|s| starts_with_six(**s)).count();
    let ending_nine = symbols.iter().filter(|s| **s % 10 == 9).count();

    if luckies == 3 {
        Some(PrizeTier::Grand)
    } else if luckies == 2 {
        Some(PrizeTier::First)
    } else if luckies == 1 && has_pair(a, b, c) {
        Some(PrizeTier::Second)
    } else if leading_six == 3 {
        Some(PrizeTier::Third)
    } else if ending_nine == 2 {
        Some(PrizeTier::Fourth)
    } else if leading_six == 2 {
        Some(PrizeTier::Fifth)
    } else if ending_nine == 1 {
        Some(PrizeTier::Sixth)
    } else {
        None
    }
}

fn starts_with_six(symbol: u32) -> bool {
    symbol == 6 || (60..=69).contains(&symbol)
}

fn has_pair(a: u32, b: u32, c: u32) -> bool {
    a == b || b == c || a == c
}

pub struct ScratchRules {
    odds: RwLock<BTreeMap<PrizeTier, u64>>,
}

impl ScratchRules {
    pub fn new() -> Self {
        Self {
            odds: RwLock::new(default_odds()),
        }
    }

    /// Replace the odds for one tier. House operation.
    pub fn set_prize_odds(&self, tier: PrizeTier, odds: u64) -> EngineResult<()> {
        if odds == 0 {
            return Err(
                ValidationError::InvalidParameters("odds must be positive".to_string()).into(),
            );
        }
        if let Ok(mut table) = self.odds.write() {
            table.insert(tier, odds);
        }
        Ok(())
    }

    pub fn prize_odds(&self, tier: PrizeTier) -> u64 {
        self.odds
            .read()
            .ok()
            .and_then(|table| table.get(&tier).copied())
            .unwrap_or(0)
    }
}

impl Default for ScratchRules {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRules for ScratchRules {
    fn kind(&self) -> GameKind {
        GameKind::Scratch
    }

    fn num_words(&self) -> u32 {
        3
    }

    fn validate(&self, selection: &BetSelection) -> EngineResult<()> {
        match selection {
            BetSelection::Scratch => Ok(()),
            other => Err(ValidationError::InvalidParameters(format!(
                "selection {:?} is not a scratch bet",
                other
            ))
            .into()),
        }
    }

    fn derive_draws(&self, words: &[u64]) -> Vec<u32> {
        words
            .iter()
            .map(|w| draw_from_word(*w, SYMBOL_MODULUS))
            .collect()
    }

    fn outcome(&self, selection: &BetSelection, draws: &[u32], _fee_multiplier_bps: u128) -> Outcome {
        if !matches!(selection, BetSelection::Scratch) || draws.len() != 3 {
            return Outcome::lost();
        }
        match prize_for(draws) {
            Some(tier) => Outcome {
                won: true,
                // payout = amount * odds / 10
                multiplier_bps: self.prize_odds(tier) as u128 * 1_000,
                prize: Some(tier),
            },
            None => Outcome::lost(),
        }
    }

    fn jackpot_share_bps(&self, _draws: &[u32], outcome: &Outcome) -> u128 {
        match outcome.prize {
            Some(PrizeTier::Grand) => 3_000,
            Some(PrizeTier::First) => 1_500,
            Some(PrizeTier::Second) => 750,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_matching() {
        assert_eq!(prize_for(&[69, 69, 69]), Some(PrizeTier::Grand));
        assert_eq!(prize_for(&[69, 9, 69]), Some(PrizeTier::First));
        assert_eq!(prize_for(&[50, 50, 69]), Some(PrizeTier::Second));
        assert_eq!(prize_for(&[6, 61, 65]), Some(PrizeTier::Third));
        assert_eq!(prize_for(&[9, 1, 39]), Some(PrizeTier::Fourth));
        assert_eq!(prize_for(&[9, 60, 29]), Some(PrizeTier::Fourth));
        assert_eq!(prize_for(&[6, 5, 65]), Some(PrizeTier::Fifth));
        assert_eq!(prize_for(&[9, 1, 2]), Some(PrizeTier::Sixth));
        assert_eq!(prize_for(&[44, 44, 44]), None);
        assert_eq!(prize_for(&[8, 2, 2]), None);
    }

    #[test]
    fn test_lone_lucky_without_pair_falls_through() {
        // One 69 with no matching pair: 69 itself still counts toward the
        // digit tiers.
        assert_eq!(prize_for(&[69, 19, 5]), Some(PrizeTier::Fourth));
        assert_eq!(prize_for(&[69, 1, 2]), Some(PrizeTier::Sixth));
    }

    #[test]
    fn test_outcome_multiplier_uses_odds_table() {
        let rules = ScratchRules::new();
        let outcome = rules.outcome(&BetSelection::Scratch, &[69, 69, 69], 9_600);
        assert!(outcome.won);
        assert_eq!(outcome.prize, Some(PrizeTier::Grand));
        // amount * 100000 / 10 = 10000x
        assert_eq!(outcome.multiplier_bps, 100_000_000);

        let outcome = rules.outcome(&BetSelection::Scratch, &[9, 1, 2], 9_600);
        assert_eq!(outcome.multiplier_bps, 10_000);
    }

    #[test]
    fn test_set_prize_odds() {
        let rules = ScratchRules::new();
        rules.set_prize_odds(PrizeTier::Sixth, 15).unwrap();
        assert_eq!(rules.prize_odds(PrizeTier::Sixth), 15);
        assert!(rules.set_prize_odds(PrizeTier::Sixth, 0).is_err());

        let outcome = rules.outcome(&BetSelection::Scratch, &[9, 1, 2], 9_600);
        assert_eq!(outcome.multiplier_bps, 15_000);
    }

    #[test]
    fn test_jackpot_shares_top_three_tiers() {
        let rules = ScratchRules::new();
        let grand = rules.outcome(&BetSelection::Scratch, &[69, 69, 69], 9_600);
        assert_eq!(rules.jackpot_share_bps(&[69, 69, 69], &grand), 3_000);
        let first = rules.outcome(&BetSelection::Scratch, &[69, 9, 69], 9_600);
        assert_eq!(rules.jackpot_share_bps(&[69, 9, 69], &first), 1_500);
        let second = rules.outcome(&BetSelection::Scratch, &[50, 50, 69], 9_600);
        assert_eq!(rules.jackpot_share_bps(&[50, 50, 69], &second), 750);
        let fourth = rules.outcome(&BetSelection::Scratch, &[9, 1, 39], 9_600);
        assert_eq!(rules.jackpot_share_bps(&[9, 1, 39], &fourth), 0);
    }
}
