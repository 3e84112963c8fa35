//! Coin-toss rules: one draw from 1 to 1000.
//!
//! The draw's parity decides heads (even) or tails (odd), except on the
//! nine exact multiples of 111, where the coin lands on its edge and only
//! an edge bet wins. Winning draws of 69 or 420 additionally pay a share
//! of the jackpot pool.

use crate::errors::{EngineResult, ValidationError};
use crate::games::rules::{draw_from_word, GameRules};
use crate::games::types::{BetSelection, CoinChoice, GameKind, Outcome};

const DRAW_MODULUS: u64 = 1_000;
const EDGE_DIVISOR: u32 = 111;
const LUCKY_DRAWS: [u32; 2] = [69, 420];
const JACKPOT_SHARE_BPS: u128 = 3_000;

pub struct CoinTossRules;

impl CoinTossRules {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinTossRules {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRules for CoinTossRules {
    fn kind(&self) -> GameKind {
        GameKind::CoinToss
    }

    fn num_words(&self) -> u32 {
        1
    }

    fn validate(&self, selection: &BetSelection) -> EngineResult<()> {
        match selection {
            BetSelection::Coin { .. } => Ok(()),
            other => Err(ValidationError::InvalidParameters(format!(
                "selection {:?} is not a coin-toss bet",
                other
            ))
            .into()),
        }
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
        let BetSelection::Coin { choice } = selection else {
            return Outcome::lost();
        };
        let Some(&draw) = draws.first() else {
            return Outcome::lost();
        };

        let landed_on_edge = draw % EDGE_DIVISOR == 0;
        let (won, multiplier_bps) = match choice {
            CoinChoice::Edge => (landed_on_edge, 50_000 * fee_multiplier_bps / 10_000),
            CoinChoice::Heads => (!landed_on_edge && draw % 2 == 0, 2 * fee_multiplier_bps),
            CoinChoice::Tails => (!landed_on_edge && draw % 2 == 1, 2 * fee_multiplier_bps),
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

    fn outcome_for(choice: CoinChoice, draw: u32) -> Outcome {
        CoinTossRules::new().outcome(&BetSelection::Coin { choice }, &[draw], FEE_MULT)
    }

    #[test]
    fn test_heads_is_even_tails_is_odd() {
        assert!(outcome_for(CoinChoice::Heads, 50).won);
        assert!(!outcome_for(CoinChoice::Heads, 99).won);
        assert!(outcome_for(CoinChoice::Tails, 1).won);
        assert!(!outcome_for(CoinChoice::Tails, 100).won);
    }

    #[test]
    fn test_edge_wins_only_on_multiples_of_111() {
        assert!(outcome_for(CoinChoice::Edge, 333).won);
        assert!(outcome_for(CoinChoice::Edge, 666).won);
        assert!(outcome_for(CoinChoice::Edge, 888).won);
        assert!(!outcome_for(CoinChoice::Edge, 100).won);
        assert!(!outcome_for(CoinChoice::Edge, 169).won);
        assert!(!outcome_for(CoinChoice::Edge, 69).won);
    }

    #[test]
    fn test_edge_draw_beats_matching_parity() {
        // 222 is even, but the coin landed on its edge.
        assert!(!outcome_for(CoinChoice::Heads, 222).won);
        assert!(!outcome_for(CoinChoice::Tails, 333).won);
    }

    #[test]
    fn test_multipliers() {
        assert_eq!(outcome_for(CoinChoice::Heads, 50).multiplier_bps, 19_200);
        // edge: 50000 * 9600 / 10000 = 5x net of fee
        assert_eq!(outcome_for(CoinChoice::Edge, 333).multiplier_bps, 48_000);
    }

    #[test]
    fn test_jackpot_draws() {
        let rules = CoinTossRules::new();
        let won = outcome_for(CoinChoice::Heads, 420);
        assert!(won.won);
        assert_eq!(rules.jackpot_share_bps(&[420], &won), 3_000);

        // 69 is odd: a heads bet loses, no jackpot.
        let lost = outcome_for(CoinChoice::Heads, 69);
        assert_eq!(rules.jackpot_share_bps(&[69], &lost), 0);

        let tails_69 = outcome_for(CoinChoice::Tails, 69);
        assert!(tails_69.won);
        assert_eq!(rules.jackpot_share_bps(&[69], &tails_69), 3_000);
    }

    #[test]
    fn test_rejects_foreign_selections() {
        let rules = CoinTossRules::new();
        assert!(rules.validate(&BetSelection::NumberOver { number: 50 }).is_err());
        assert!(rules
            .validate(&BetSelection::Coin {
                choice: CoinChoice::Edge
            })
            .is_ok());
    }
}
