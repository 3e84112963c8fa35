//! Staking pool fed by wagering fees.
//!
//! Rewards are distributed pro rata with an accumulated-reward-per-share
//! accumulator scaled by [`SCALE`]. Each stake carries a reward debt so
//! that only rewards arriving after the stake are credited to it. Stakes
//! are locked for a configured period; unstaking early costs a fee on
//! principal, part of which is recycled into the reward accumulator.

use crate::config::StakingConfig;
use crate::errors::{EngineResult, StateError, ValidationError};
use crate::events::{Event, EventLog};
use crate::ledger::{Address, Amount, BalanceLedger, BPS};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Fixed-point scale for the reward-per-share accumulator.
pub const SCALE: u128 = 1_000_000_000_000;

/// Time source. The pool only needs seconds since the epoch; tests swap in
/// a manual clock to exercise the lock period.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Settable clock for tests.
pub struct ManualClock {
    secs: AtomicU64,
}

impl ManualClock {
    pub fn new(secs: u64) -> Self {
        Self {
            secs: AtomicU64::new(secs),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.secs.load(Ordering::SeqCst)
    }
}

/// One staker's position.
#[derive(Debug, Clone)]
struct Stake {
    amount: Amount,
    reward_debt: u128,
    pending_rewards: Amount,
    last_stake_time: u64,
    auto_compound: bool,
}

#[derive(Default)]
struct PoolState {
    total_staked: Amount,
    acc_reward_per_share: u128,
    /// Rewards that arrived while nobody was staked, distributed with the
    /// next reward batch or first stake.
    deferred_rewards: Amount,
    total_rewards_received: Amount,
    total_rewards_distributed: Amount,
    stakes: HashMap<Address, Stake>,
}

/// Snapshot of a staker's position for display.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StakeView {
    pub amount: Amount,
    pub pending_reward: Amount,
    pub level: u8,
    pub unlock_time: u64,
    pub auto_compound: bool,
}

/// Pool-wide statistics.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StakingStats {
    pub total_staked: Amount,
    pub staker_count: usize,
    pub total_rewards_received: Amount,
    pub total_rewards_distributed: Amount,
    pub deferred_rewards: Amount,
}

/// Fee-fed staking pool.
pub struct StakingPool {
    config: StakingConfig,
    platform_address: Address,
    ledger: Arc<BalanceLedger>,
    events: Arc<EventLog>,
    clock: Arc<dyn Clock>,
    state: Mutex<PoolState>,
}

impl StakingPool {
    pub fn new(
        config: StakingConfig,
        platform_address: Address,
        ledger: Arc<BalanceLedger>,
        events: Arc<EventLog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            platform_address,
            ledger,
            events,
            clock,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Add to (or open) the caller's stake. Pending rewards accrued so far
    /// are parked on the position, not forfeited. Resets the lock timer.
    pub fn stake(&self, staker: &str, amount: Amount) -> EngineResult<()> {
        if amount == 0 {
            return Err(ValidationError::ZeroStake.into());
        }
        let mut state = self.lock_state();

        if let Some(cap) = self.config.max_stake_amount {
            let total = state.total_staked + amount;
            if total > cap {
                return Err(ValidationError::StakeCapExceeded { total, cap }.into());
            }
        }

        self.ledger.debit(staker, amount)?;

        let acc = state.acc_reward_per_share;
        let now = self.clock.now();
        let stake = state
            .stakes
            .entry(staker.to_string())
            .or_insert_with(|| Stake {
                amount: 0,
                reward_debt: 0,
                pending_rewards: 0,
                last_stake_time: now,
                auto_compound: false,
            });

        stake.pending_rewards += accrued(stake, acc);
        stake.amount += amount;
        stake.reward_debt = stake.amount as u128 * acc / SCALE;
        stake.last_stake_time = now;

        state.total_staked += amount;
        self.flush_deferred(&mut state);

        drop(state);
        self.events.emit(Event::Staked {
            staker: staker.to_string(),
            amount,
        });
        Ok(())
    }

    /// Exit the pool entirely. Inside the lock period the principal pays
    /// the early-exit fee; rewards are always paid in full. The position
    /// is zeroed, not deleted, so the staker's history stays queryable.
    pub fn unstake(&self, staker: &str) -> EngineResult<Amount> {
        let mut state = self.lock_state();
        let acc = state.acc_reward_per_share;
        let stake = state
            .stakes
            .get_mut(staker)
            .filter(|s| s.amount > 0)
            .ok_or_else(|| StateError::NothingStaked(staker.to_string()))?;

        let reward = stake.pending_rewards + accrued(stake, acc);
        let principal = stake.amount;
        let locked_until = stake.last_stake_time + self.config.lock_period_secs;
        stake.amount = 0;
        stake.reward_debt = 0;
        stake.pending_rewards = 0;

        let fee = if self.clock.now() < locked_until {
            (principal as u128 * self.config.early_exit_fee_bps as u128 / BPS) as Amount
        } else {
            0
        };
        let to_rewards =
            (fee as u128 * self.config.early_fee_to_rewards_bps as u128 / BPS) as Amount;
        let to_platform = fee - to_rewards;

        state.total_staked -= principal;
        state.total_rewards_distributed += reward;

        // Recycle the reward share of the fee into the accumulator, or
        // defer it when this was the last staker out. The recycled amount
        // counts as received so distributed never overtakes received.
        if to_rewards > 0 {
            state.total_rewards_received += to_rewards;
            if state.total_staked > 0 {
                state.acc_reward_per_share +=
                    to_rewards as u128 * SCALE / state.total_staked as u128;
            } else {
                state.deferred_rewards += to_rewards;
            }
        }

        drop(state);

        let paid = principal - fee + reward;
        self.ledger.credit(staker, paid);
        if to_platform > 0 {
            self.ledger.credit(&self.platform_address, to_platform);
        }

        self.events.emit(Event::Unstaked {
            staker: staker.to_string(),
            principal,
            reward,
            fee,
        });
        if fee > 0 {
            self.events.emit(Event::EarlyUnstakeFeeDistributed {
                staker: staker.to_string(),
                fee,
                to_rewards,
                to_platform,
            });
        }
        Ok(paid)
    }

    /// Realize pending rewards: paid out, or folded into the stake when
    /// auto-compound is on. Returns the realized amount.
    pub fn claim(&self, staker: &str) -> EngineResult<Amount> {
        let mut state = self.lock_state();
        let acc = state.acc_reward_per_share;
        let stake = state
            .stakes
            .get_mut(staker)
            .ok_or_else(|| StateError::NothingStaked(staker.to_string()))?;

        let reward = stake.pending_rewards + accrued(stake, acc);
        if reward == 0 {
            stake.reward_debt = stake.amount as u128 * acc / SCALE;
            return Ok(0);
        }
        stake.pending_rewards = 0;

        let compound = stake.auto_compound;
        let event = if compound {
            stake.amount += reward;
            stake.reward_debt = stake.amount as u128 * acc / SCALE;
            let new_total = stake.amount;
            state.total_staked += reward;
            Event::RewardCompounded {
                staker: staker.to_string(),
                amount: reward,
                new_total,
            }
        } else {
            stake.reward_debt = stake.amount as u128 * acc / SCALE;
            Event::RewardPaid {
                staker: staker.to_string(),
                amount: reward,
            }
        };
        state.total_rewards_distributed += reward;
        drop(state);

        if !compound {
            self.ledger.credit(staker, reward);
        }
        self.events.emit(event);
        Ok(reward)
    }

    pub fn set_auto_compound(&self, staker: &str, enabled: bool) -> EngineResult<()> {
        let mut state = self.lock_state();
        let stake = state
            .stakes
            .get_mut(staker)
            .ok_or_else(|| StateError::NothingStaked(staker.to_string()))?;
        stake.auto_compound = enabled;
        Ok(())
    }

    /// Feed a reward batch into the accumulator. With nobody staked the
    /// batch is deferred until stake exists.
    pub fn add_rewards(&self, amount: Amount) {
        if amount == 0 {
            return;
        }
        let mut state = self.lock_state();
        state.total_rewards_received += amount;
        state.deferred_rewards += amount;
        self.flush_deferred(&mut state);
        let new_acc = state.acc_reward_per_share.min(u64::MAX as u128) as u64;
        drop(state);

        self.events.emit(Event::RewardsDistributed {
            amount,
            new_acc_per_share: new_acc,
        });
    }

    /// A staker's position, if any.
    pub fn stake_of(&self, staker: &str) -> Option<StakeView> {
        let state = self.lock_state();
        let acc = state.acc_reward_per_share;
        state.stakes.get(staker).map(|stake| StakeView {
            amount: stake.amount,
            pending_reward: stake.pending_rewards + accrued(stake, acc),
            level: self.level_for(stake.amount),
            unlock_time: stake.last_stake_time + self.config.lock_period_secs,
            auto_compound: stake.auto_compound,
        })
    }

    /// Display level for a staked amount: the number of configured
    /// thresholds it meets.
    pub fn level_for(&self, amount: Amount) -> u8 {
        self.config
            .level_thresholds
            .iter()
            .filter(|t| amount >= **t)
            .count() as u8
    }

    pub fn stats(&self) -> StakingStats {
        let state = self.lock_state();
        StakingStats {
            total_staked: state.total_staked,
            staker_count: state.stakes.values().filter(|s| s.amount > 0).count(),
            total_rewards_received: state.total_rewards_received,
            total_rewards_distributed: state.total_rewards_distributed,
            deferred_rewards: state.deferred_rewards,
        }
    }

    fn flush_deferred(&self, state: &mut PoolState) {
        if state.deferred_rewards > 0 && state.total_staked > 0 {
            state.acc_reward_per_share +=
                state.deferred_rewards as u128 * SCALE / state.total_staked as u128;
            state.deferred_rewards = 0;
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, PoolState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Rewards earned since the stake's debt checkpoint.
fn accrued(stake: &Stake, acc_reward_per_share: u128) -> Amount {
    let gross = stake.amount as u128 * acc_reward_per_share / SCALE;
    gross.saturating_sub(stake.reward_debt) as Amount
}
