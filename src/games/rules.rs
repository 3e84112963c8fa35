//! The rules seam between the shared settlement engine and each game.
//!
//! A rules implementation is pure: it validates selections, maps raw
//! random words into its draw space and scores a selection against the
//! draws. All pool and balance mutation stays in the engine.

use crate::errors::EngineResult;
use crate::games::types::{BetSelection, GameKind, Outcome};

pub trait GameRules: Send + Sync {
    fn kind(&self) -> GameKind;

    /// How many random words one bet consumes.
    fn num_words(&self) -> u32;

    /// Reject selections that do not belong to this game or fall outside
    /// its parameter ranges.
    fn validate(&self, selection: &BetSelection) -> EngineResult<()>;

    /// Map raw oracle words into this game's draw space.
    fn derive_draws(&self, words: &[u64]) -> Vec<u32>;

    /// Score a selection against the draws. `fee_multiplier_bps` is the
    /// basis-point scale left after the combined placement rates.
    fn outcome(&self, selection: &BetSelection, draws: &[u32], fee_multiplier_bps: u128)
        -> Outcome;

    /// Share of the jackpot pool owed for a winning outcome, in basis
    /// points. Zero when the draw is not jackpot-eligible.
    fn jackpot_share_bps(&self, draws: &[u32], outcome: &Outcome) -> u128;
}

/// Fold a word into `1..=modulus`.
pub(crate) fn draw_from_word(word: u64, modulus: u64) -> u32 {
    (word % modulus) as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_from_word_covers_full_range() {
        assert_eq!(draw_from_word(0, 100), 1);
        assert_eq!(draw_from_word(99, 100), 100);
        assert_eq!(draw_from_word(100, 100), 1);
        assert_eq!(draw_from_word(u64::MAX, 1000), (u64::MAX % 1000) as u32 + 1);
    }
}
