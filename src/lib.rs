//! Betforge - a family of wager games on one settlement engine.
//!
//! Three games (number-guess, coin-toss, three-symbol scratch) share a
//! single bet lifecycle: place, await randomness, settle exactly once.
//! Placement-time rates feed a jackpot pool, a streak pool and a protocol
//! fee vault; the vault is periodically split across staking rewards,
//! charity and the platform. A two-tier referral ledger redistributes part
//! of the fee to uplines at settlement.

pub mod config;
pub mod errors;
pub mod events;
pub mod games;
pub mod ledger;
pub mod oracle;
pub mod pools;
pub mod referral;
pub mod staking;

pub use config::{BetforgeConfig, ConfigLoader};
pub use errors::{EngineError, EngineResult};
pub use events::{Event, EventLog};
pub use games::{
    Bet, BetEngine, BetSelection, BetStatus, CoinChoice, CoinTossRules, GameKind, GameRules,
    GameStats, NumberGuessRules, PrizeTier, ScratchRules,
};
pub use ledger::{Address, Amount, BalanceLedger, UNIT};
pub use oracle::{OracleAdapter, VrfSource};
pub use referral::ReferralLedger;
pub use staking::{Clock, ManualClock, StakingPool, SystemClock};

use std::sync::Arc;

/// All three games wired onto shared ledger, referral, staking and event
/// infrastructure. Each engine keeps its own oracle adapter so request ids
/// correlate within one game.
pub struct Platform {
    pub ledger: Arc<BalanceLedger>,
    pub events: Arc<EventLog>,
    pub referral: Arc<ReferralLedger>,
    pub staking: Arc<StakingPool>,
    pub number_guess: Arc<BetEngine>,
    pub coin_toss: Arc<BetEngine>,
    pub scratch: Arc<BetEngine>,
    pub scratch_rules: Arc<ScratchRules>,
}

impl Platform {
    pub fn new(config: BetforgeConfig, clock: Arc<dyn Clock>) -> Self {
        let ledger = Arc::new(BalanceLedger::new());
        let events = Arc::new(EventLog::new());
        let referral = Arc::new(ReferralLedger::new());
        let staking = Arc::new(StakingPool::new(
            config.staking.clone(),
            config.house.platform_address.clone(),
            ledger.clone(),
            events.clone(),
            clock,
        ));

        // House accounts never become uplines.
        referral.mark_contract(&config.house.charity_address);
        referral.mark_contract(&config.house.platform_address);

        let scratch_rules = Arc::new(ScratchRules::new());
        let engine = |rules: Arc<dyn GameRules>| {
            Arc::new(BetEngine::new(
                rules,
                config.game.clone(),
                config.fee_split.clone(),
                config.house.clone(),
                Arc::new(OracleAdapter::new()),
                referral.clone(),
                staking.clone(),
                ledger.clone(),
                events.clone(),
            ))
        };

        Self {
            number_guess: engine(Arc::new(NumberGuessRules::new())),
            coin_toss: engine(Arc::new(CoinTossRules::new())),
            scratch: engine(scratch_rules.clone()),
            scratch_rules,
            ledger,
            events,
            referral,
            staking,
        }
    }

    pub fn engine(&self, kind: GameKind) -> &Arc<BetEngine> {
        match kind {
            GameKind::NumberGuess => &self.number_guess,
            GameKind::CoinToss => &self.coin_toss,
            GameKind::Scratch => &self.scratch,
        }
    }
}
