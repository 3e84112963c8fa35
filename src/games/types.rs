//! Shared game types: selections, bets, outcomes and stats.

use crate::ledger::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The game variants sharing the settlement engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    NumberGuess,
    CoinToss,
    Scratch,
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameKind::NumberGuess => write!(f, "number_guess"),
            GameKind::CoinToss => write!(f, "coin_toss"),
            GameKind::Scratch => write!(f, "scratch"),
        }
    }
}

/// Coin-toss call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoinChoice {
    Heads,
    Tails,
    Edge,
}

/// What the player is betting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "selection", rename_all = "snake_case")]
pub enum BetSelection {
    /// Number-guess: wins when the draw lands strictly above `number`.
    NumberOver { number: u32 },
    /// Number-guess: wins when the draw lands strictly below `number`.
    NumberUnder { number: u32 },
    /// Number-guess: wins when the draw lands in `[start, end]` inclusive.
    NumberRange { start: u32, end: u32 },
    /// Number-guess: wins on draw parity.
    Parity { odd: bool },
    /// Coin-toss call.
    Coin { choice: CoinChoice },
    /// Scratch card: no parameters, the three symbols decide the tier.
    Scratch,
}

/// Scratch prize tiers, most valuable first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrizeTier {
    Grand,
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
}

impl PrizeTier {
    pub const ALL: [PrizeTier; 7] = [
        PrizeTier::Grand,
        PrizeTier::First,
        PrizeTier::Second,
        PrizeTier::Third,
        PrizeTier::Fourth,
        PrizeTier::Fifth,
        PrizeTier::Sixth,
    ];
}

/// Result of applying a game's rules to a draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub won: bool,
    /// Payout multiplier in basis points of the wager.
    pub multiplier_bps: u128,
    pub prize: Option<PrizeTier>,
}

impl Outcome {
    pub fn lost() -> Self {
        Self {
            won: false,
            multiplier_bps: 0,
            prize: None,
        }
    }
}

/// Bet lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetStatus {
    Placed,
    AwaitingRandomness,
    Settled,
}

/// One wager, from placement through settlement. Bets are append-only and
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bet {
    pub id: u64,
    pub player: Address,
    pub selection: BetSelection,
    pub amount: Amount,
    pub note: String,
    /// Correlation id of the randomness request opened at placement.
    pub request_id: u64,
    pub status: BetStatus,
    pub draws: Vec<u32>,
    pub won: bool,
    pub win_amount: Amount,
    pub jackpot_amount: Amount,
    pub streak_bonus: Amount,
    pub prize: Option<PrizeTier>,
}

/// Aggregate view over one game instance.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GameStats {
    pub total_bets: u64,
    pub total_wagered: Amount,
    pub total_paid_out: Amount,
    pub game_pool: Amount,
    pub jackpot_pool: Amount,
    pub streak_pool: Amount,
    pub fee_vault: Amount,
    pub fees_collected: Amount,
    pub referral_paid: Amount,
}
