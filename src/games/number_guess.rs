//! Number-guess rules: one draw from 1 to 100.
//!
//! Four selections share the draw: over, under, inclusive range and
//! parity. Multipliers are quoted in basis points and already carry the
//! fee multiplier. Draws of 42 or 69 on a winning bet additionally pay a
//! share of the jackpot pool.

use crate::errors::{EngineResult, ValidationError};
use crate::games::rules::{draw_from_word, GameRules};
use crate::games::types::{BetSelection, GameKind, Outcome};

const DRAW_MODULUS: u64 = 100;
const MULTIPLIER_BASE: u128 = 1_000_000;
const LUCKY_DRAWS: [u32; 2] = [42, 69];
const JACKPOT_SHARE_BPS: u128 = 3_000;

pub struct NumberGuessRules;

impl NumberGuessRules {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NumberGuessRules {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRules for NumberGuessRules {
    fn kind(&self) -> GameKind {
        GameKind::NumberGuess
    }

    fn num_words(&self) -> u32 {
        1
    }

    fn validate(&self, selection: &BetSelection) -> EngineResult<()> {
        match selection {
            // Over n wins on n+1..=100, so 100 leaves no winning draw.
            BetSelection::NumberOver { number } => {
                if *number < 1 || *number > 99 {
                    return Err(ValidationError::InvalidParameters(format!(
                        "over number {} must be between 1 and 99",
                        number
                    ))
                    .into());
                }
            }
            // Under n wins on 1..=n-1, so 1 leaves no winning draw.
            BetSelection::NumberUnder { number } => {
                if *number < 2 || *number > 100 {
                    return Err(ValidationError::InvalidParameters(format!(
                        "under number {} must be between 2 and 100",
                        number
                    ))
                    .into());
                }
            }
            BetSelection::NumberRange { start, end } => {
                if *start < 1 || *end > 100 || start > end {
                    return Err(ValidationError::RangeInvalid {
                        start: *start,
                        end: *end,
                    }
                    .into());
                }
            }
            BetSelection::Parity { .. } => {}
            other => {
                return Err(ValidationError::InvalidParameters(format!(
                    "selection {:?} is not a number-guess bet",
                    other
                ))
                .into());
            }
        }
        Ok(())
    }

    fn derive_draws(&self, words: &[u64]) -> Vec<u32> {
        words
            .iter()
            .map(|w| draw_from_word(*w, DRAW_MODULUS))
            .collect()
    }

    fn outcome(
        &self,
        selection: &BetSelection,
        draws: &[u32],
        fee_multiplier_bps: u128,
    ) -> Outcome {
        let Some(&draw) = draws.first() else {
            return Outcome::lost();
        };

        let (won, multiplier_bps) = match selection {
            BetSelection::NumberOver { number } => (
                draw > *number,
                MULTIPLIER_BASE / *number as u128 * fee_multiplier_bps / 10_000,
            ),
            BetSelection::NumberUnder { number } => (
                draw < *number,
                MULTIPLIER_BASE / (101 - *number) as u128 * fee_multiplier_bps / 10_000,
            ),
            BetSelection::NumberRange { start, end } => (
                draw >= *start && draw <= *end,
                MULTIPLIER_BASE / (*end - *start + 1) as u128 * fee_multiplier_bps / 10_000,
            ),
            BetSelection::Parity { odd } => (draw % 2 == u32::from(*odd), 2 * fee_multiplier_bps),
            _ => return Outcome::lost(),
        };

        if won {
            Outcome {
                won: true,
                multiplier_bps,
                prize: None,
            }
        } else {
            Outcome::lost()
        }
    }

    fn jackpot_share_bps(&self, draws: &[u32], outcome: &Outcome) -> u128 {
        let lucky = draws.first().is_some_and(|d| LUCKY_DRAWS.contains(d));
        if outcome.won && lucky {
            JACKPOT_SHARE_BPS
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEE_MULT: u128 = 9_600;

    fn outcome_for(selection: BetSelection, draw: u32) -> Outcome {
        NumberGuessRules::new().outcome(&selection, &[draw], FEE_MULT)
    }

    #[test]
    fn test_over_wins_strictly_above() {
        assert!(outcome_for(BetSelection::NumberOver { number: 50 }, 51).won);
        assert!(!outcome_for(BetSelection::NumberOver { number: 50 }, 50).won);
        assert!(outcome_for(BetSelection::NumberOver { number: 10 }, 100).won);
    }

    #[test]
    fn test_under_wins_strictly_below() {
        assert!(outcome_for(BetSelection::NumberUnder { number: 10 }, 9).won);
        assert!(outcome_for(BetSelection::NumberUnder { number: 99 }, 98).won);
        assert!(!outcome_for(BetSelection::NumberUnder { number: 99 }, 99).won);
    }

    #[test]
    fn test_range_is_inclusive() {
        let range = BetSelection::NumberRange { start: 30, end: 60 };
        assert!(outcome_for(range.clone(), 30).won);
        assert!(outcome_for(range.clone(), 50).won);
        assert!(outcome_for(range.clone(), 60).won);
        assert!(!outcome_for(range.clone(), 61).won);
        assert!(!outcome_for(range, 29).won);
    }

    #[test]
    fn test_parity() {
        assert!(outcome_for(BetSelection::Parity { odd: false }, 8).won);
        assert!(!outcome_for(BetSelection::Parity { odd: false }, 3).won);
        assert!(outcome_for(BetSelection::Parity { odd: true }, 11).won);
    }

    #[test]
    fn test_multipliers_carry_fee() {
        // over 50: 1_000_000/50 = 20000, scaled by 9600/10000
        let outcome = outcome_for(BetSelection::NumberOver { number: 50 }, 51);
        assert_eq!(outcome.multiplier_bps, 19_200);

        // range 30..=60: 1_000_000/31 = 32258
        let outcome = outcome_for(BetSelection::NumberRange { start: 30, end: 60 }, 40);
        assert_eq!(outcome.multiplier_bps, 1_000_000 / 31 * 9_600 / 10_000);

        // parity pays a flat 2x net of fee
        let outcome = outcome_for(BetSelection::Parity { odd: false }, 8);
        assert_eq!(outcome.multiplier_bps, 19_200);
    }

    #[test]
    fn test_jackpot_only_on_winning_lucky_draw() {
        let rules = NumberGuessRules::new();
        let winning = rules.outcome(&BetSelection::Parity { odd: true }, &[69], FEE_MULT);
        assert!(winning.won);
        assert_eq!(rules.jackpot_share_bps(&[69], &winning), 3_000);

        // 69 is odd, so an even bet loses despite the lucky draw.
        let losing = rules.outcome(&BetSelection::Parity { odd: false }, &[69], FEE_MULT);
        assert!(!losing.won);
        assert_eq!(rules.jackpot_share_bps(&[69], &losing), 0);

        let plain = rules.outcome(&BetSelection::Parity { odd: true }, &[51], FEE_MULT);
        assert_eq!(rules.jackpot_share_bps(&[51], &plain), 0);
    }

    #[test]
    fn test_validation_bounds() {
        let rules = NumberGuessRules::new();
        assert!(rules.validate(&BetSelection::NumberOver { number: 100 }).is_err());
        assert!(rules.validate(&BetSelection::NumberOver { number: 0 }).is_err());
        assert!(rules.validate(&BetSelection::NumberUnder { number: 1 }).is_err());
        assert!(rules
            .validate(&BetSelection::NumberRange { start: 60, end: 30 })
            .is_err());
        assert!(rules
            .validate(&BetSelection::NumberRange { start: 30, end: 101 })
            .is_err());
        assert!(rules.validate(&BetSelection::Scratch).is_err());
        assert!(rules.validate(&BetSelection::NumberOver { number: 50 }).is_ok());
    }
}
