//! Shared settlement engine.
//!
//! One `BetEngine` instance runs one game. Placement validates the wager,
//! routes the placement-time rates into the pools, opens a randomness
//! request and parks the bet. Delivery consumes the request exactly once,
//! scores the bet, pays the player and the referral uplines, updates the
//! win streak and marks the bet settled. Bets are append-only; ids are
//! never reused.

use crate::config::{FeeSplitConfig, GameConfig, HouseConfig};
use crate::errors::{EngineResult, StateError, ValidationError};
use crate::events::{Event, EventLog};
use crate::games::rules::GameRules;
use crate::games::types::{Bet, BetSelection, BetStatus, GameStats};
use crate::ledger::{Address, Amount, BalanceLedger, BPS};
use crate::oracle::OracleAdapter;
use crate::pools::{FeeBreakdown, PoolAccountant};
use crate::referral::ReferralLedger;
use crate::staking::StakingPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Consecutive wins required before the streak bonus fires.
const STREAK_THRESHOLD: u32 = 5;
/// Streak bonus target: 3.5x the wager, capped at the streak pool.
const STREAK_BONUS_NUM: u128 = 35;
const STREAK_BONUS_DEN: u128 = 10;

#[derive(Default)]
struct EngineState {
    bets: Vec<Bet>,
    pools: PoolAccountant,
    streaks: HashMap<Address, u32>,
    total_wagered: Amount,
    total_paid_out: Amount,
}

/// Settlement engine for one game instance.
pub struct BetEngine {
    rules: Arc<dyn GameRules>,
    config: GameConfig,
    fee_split: FeeSplitConfig,
    house: HouseConfig,
    oracle: Arc<OracleAdapter>,
    referral: Arc<ReferralLedger>,
    staking: Arc<StakingPool>,
    ledger: Arc<BalanceLedger>,
    events: Arc<EventLog>,
    state: Mutex<EngineState>,
}

impl BetEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rules: Arc<dyn GameRules>,
        config: GameConfig,
        fee_split: FeeSplitConfig,
        house: HouseConfig,
        oracle: Arc<OracleAdapter>,
        referral: Arc<ReferralLedger>,
        staking: Arc<StakingPool>,
        ledger: Arc<BalanceLedger>,
        events: Arc<EventLog>,
    ) -> Self {
        Self {
            rules,
            config,
            fee_split,
            house,
            oracle,
            referral,
            staking,
            ledger,
            events,
            state: Mutex::new(EngineState::default()),
        }
    }

    /// Place a wager. `value` is the payment attached to the call and must
    /// equal the declared amount. Returns the bet id; the bet settles later
    /// when randomness arrives for its request.
    pub fn place_bet(
        &self,
        player: &str,
        selection: BetSelection,
        amount: Amount,
        value: Amount,
        referrer: Option<&str>,
        note: &str,
    ) -> EngineResult<u64> {
        if value != amount {
            return Err(ValidationError::InvalidValue {
                sent: value,
                declared: amount,
            }
            .into());
        }
        if amount < self.config.min_bet || amount > self.config.max_bet {
            return Err(ValidationError::InvalidBetAmount {
                amount,
                min: self.config.min_bet,
                max: self.config.max_bet,
            }
            .into());
        }
        if note.len() > self.config.max_note_len {
            return Err(ValidationError::NoteTooLong {
                len: note.len(),
                max: self.config.max_note_len,
            }
            .into());
        }
        self.rules.validate(&selection)?;

        self.ledger.debit(player, amount)?;

        // The upline binds at placement, so losing bets recruit too.
        if let Some(proposer) = referrer {
            self.referral.bind_if_unbound(player, proposer);
        }

        let mut state = self.lock_state();
        let bet_id = state.bets.len() as u64 + 1;

        state.pools.absorb(&FeeBreakdown::split(amount, &self.config));
        state.total_wagered += amount;
        state.bets.push(Bet {
            id: bet_id,
            player: player.to_string(),
            selection,
            amount,
            note: note.to_string(),
            request_id: 0,
            status: BetStatus::Placed,
            draws: Vec::new(),
            won: false,
            win_amount: 0,
            jackpot_amount: 0,
            streak_bonus: 0,
            prize: None,
        });

        let request_id = self.oracle.request(bet_id, self.rules.num_words());
        if let Some(bet) = state.bets.last_mut() {
            bet.request_id = request_id;
            bet.status = BetStatus::AwaitingRandomness;
        }
        drop(state);

        tracing::info!(bet_id, player, amount, request_id, "bet placed");
        self.events.emit(Event::BetPlaced {
            bet_id,
            player: player.to_string(),
            amount,
            game: self.rules.kind().to_string(),
        });
        Ok(bet_id)
    }

    /// Deliver random words for an outstanding request and settle its bet.
    /// A request id settles at most once; replays are rejected.
    pub fn deliver_randomness(&self, request_id: u64, words: &[u64]) -> EngineResult<()> {
        let pending = self.oracle.take(request_id, words)?;
        let draws = self.rules.derive_draws(words);

        let mut state = self.lock_state();
        let index = (pending.bet_id as usize)
            .checked_sub(1)
            .filter(|i| *i < state.bets.len())
            .ok_or(StateError::UnknownBet(pending.bet_id))?;
        if state.bets[index].status == BetStatus::Settled {
            return Err(StateError::AlreadySettled(pending.bet_id).into());
        }

        let (player, selection, amount) = {
            let bet = &state.bets[index];
            (bet.player.clone(), bet.selection.clone(), bet.amount)
        };

        let outcome =
            self.rules
                .outcome(&selection, &draws, self.config.fee_multiplier_bps());

        let win_amount = if outcome.won {
            (amount as u128 * outcome.multiplier_bps / BPS) as Amount
        } else {
            0
        };
        state.pools.pay_from_bankroll(win_amount).map_err(|e| {
            tracing::error!(bet_id = pending.bet_id, "bankroll shortfall at settlement");
            e
        })?;

        let jackpot_amount = {
            let share = self.rules.jackpot_share_bps(&draws, &outcome);
            if share > 0 {
                state.pools.pay_jackpot_share(share)
            } else {
                0
            }
        };

        let streak_bonus = self.update_streak(&mut state, &player, amount, outcome.won);

        let commission = {
            let fee_portion = (amount as u128 * self.config.fee_bps as u128 / BPS) as Amount;
            self.referral.commission_for(&player, fee_portion)
        };
        for (tier, entry) in [(1u8, &commission.tier1), (2u8, &commission.tier2)] {
            if let Some((upline, owed)) = entry {
                let paid = state.pools.pay_referral(*owed);
                if paid > 0 {
                    self.ledger.credit(upline, paid);
                    self.events.emit(Event::ReferralRewardPaid {
                        player: player.clone(),
                        upline: upline.clone(),
                        tier,
                        amount: paid,
                    });
                }
            }
        }

        let total_payout = win_amount + jackpot_amount + streak_bonus;
        if total_payout > 0 {
            self.ledger.credit(&player, total_payout);
        }
        state.total_paid_out += total_payout;

        let bet = &mut state.bets[index];
        bet.status = BetStatus::Settled;
        bet.draws = draws.clone();
        bet.won = outcome.won;
        bet.win_amount = win_amount;
        bet.jackpot_amount = jackpot_amount;
        bet.streak_bonus = streak_bonus;
        bet.prize = outcome.prize;
        let bet_id = bet.id;
        drop(state);

        tracing::info!(
            bet_id,
            player = %player,
            won = outcome.won,
            win_amount,
            jackpot_amount,
            streak_bonus,
            "bet settled"
        );
        self.events.emit(Event::BetResult {
            bet_id,
            player,
            draws,
            won: outcome.won,
            win_amount,
            jackpot_amount,
            streak_bonus,
        });
        Ok(())
    }

    /// Drain the fee vault and split it across staking rewards, charity and
    /// the platform.
    pub fn distribute_fees(&self) -> EngineResult<Amount> {
        let mut state = self.lock_state();
        let vault = state.pools.drain_vault();
        drop(state);
        if vault == 0 {
            return Ok(0);
        }

        let staking_share = (vault as u128 * self.fee_split.staking_bps as u128 / BPS) as Amount;
        let charity_share = (vault as u128 * self.fee_split.charity_bps as u128 / BPS) as Amount;
        let platform_share = vault - staking_share - charity_share;

        self.staking.add_rewards(staking_share);
        self.ledger.credit(&self.house.charity_address, charity_share);
        self.ledger.credit(&self.house.platform_address, platform_share);

        self.events.emit(Event::FeesDistributed {
            staking: staking_share,
            charity: charity_share,
            platform: platform_share,
        });
        Ok(vault)
    }

    /// Seed the bankroll so the configured limits are always payable.
    pub fn fund_bankroll(&self, funder: &str, amount: Amount) -> EngineResult<()> {
        self.ledger.debit(funder, amount)?;
        self.lock_state().pools.fund_bankroll(amount);
        Ok(())
    }

    /// A settled or pending bet by id.
    pub fn bet(&self, bet_id: u64) -> Option<Bet> {
        let state = self.lock_state();
        (bet_id as usize)
            .checked_sub(1)
            .and_then(|i| state.bets.get(i).cloned())
    }

    /// The player's current consecutive-win count.
    pub fn win_streak(&self, player: &str) -> u32 {
        self.lock_state().streaks.get(player).copied().unwrap_or(0)
    }

    pub fn stats(&self) -> GameStats {
        let state = self.lock_state();
        GameStats {
            total_bets: state.bets.len() as u64,
            total_wagered: state.total_wagered,
            total_paid_out: state.total_paid_out,
            game_pool: state.pools.game_pool,
            jackpot_pool: state.pools.jackpot_pool,
            streak_pool: state.pools.streak_pool,
            fee_vault: state.pools.fee_vault,
            fees_collected: state.pools.fees_collected,
            referral_paid: state.pools.referral_paid,
        }
    }

    fn update_streak(
        &self,
        state: &mut EngineState,
        player: &str,
        amount: Amount,
        won: bool,
    ) -> Amount {
        if !won {
            state.streaks.insert(player.to_string(), 0);
            return 0;
        }
        let streak = state.streaks.entry(player.to_string()).or_insert(0);
        *streak += 1;
        if *streak < STREAK_THRESHOLD {
            return 0;
        }
        *streak = 0;
        let target = (amount as u128 * STREAK_BONUS_NUM / STREAK_BONUS_DEN) as Amount;
        state.pools.pay_streak_bonus(target)
    }

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
