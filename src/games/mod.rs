//! Game variants and the settlement engine they share.

pub mod coin_toss;
pub mod engine;
pub mod number_guess;
pub mod rules;
pub mod scratch;
pub mod types;

pub use coin_toss::CoinTossRules;
pub use engine::BetEngine;
pub use number_guess::NumberGuessRules;
pub use rules::GameRules;
pub use scratch::ScratchRules;
pub use types::{Bet, BetSelection, BetStatus, CoinChoice, GameKind, GameStats, Outcome, PrizeTier};
