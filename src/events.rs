//! Typed event log for observability and testing.
//!
//! Every externally visible state change emits an [`Event`]. Events are kept
//! in an in-memory log that tests can snapshot, and mirrored to a broadcast
//! channel so a frontend (or the simulator binary) can stream them live.

use crate::ledger::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Events emitted by the bet engines and the staking pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    BetPlaced {
        bet_id: u64,
        player: Address,
        amount: Amount,
        game: String,
    },
    BetResult {
        bet_id: u64,
        player: Address,
        draws: Vec<u32>,
        won: bool,
        win_amount: Amount,
        jackpot_amount: Amount,
        streak_bonus: Amount,
    },
    Staked {
        staker: Address,
        amount: Amount,
    },
    Unstaked {
        staker: Address,
        principal: Amount,
        reward: Amount,
        fee: Amount,
    },
    EarlyUnstakeFeeDistributed {
        staker: Address,
        fee: Amount,
        to_rewards: Amount,
        to_platform: Amount,
    },
    RewardPaid {
        staker: Address,
        amount: Amount,
    },
    RewardCompounded {
        staker: Address,
        amount: Amount,
        new_total: Amount,
    },
    RewardsDistributed {
        amount: Amount,
        new_acc_per_share: u64,
    },
    ReferralRewardPaid {
        player: Address,
        upline: Address,
        tier: u8,
        amount: Amount,
    },
    FeesDistributed {
        staking: Amount,
        charity: Amount,
        platform: Amount,
    },
}

/// Shared event sink: append-only log plus a live broadcast channel.
pub struct EventLog {
    entries: Mutex<Vec<Event>>,
    sender: broadcast::Sender<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self {
            entries: Mutex::new(Vec::new()),
            sender,
        }
    }

    /// Record an event. Broadcast delivery is best-effort (no subscribers is
    /// not an error).
    pub fn emit(&self, event: Event) {
        tracing::debug!(?event, "event emitted");
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(event.clone());
        }
        let _ = self.sender.send(event);
    }

    /// Subscribe to live events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Snapshot of all events recorded so far.
    pub fn snapshot(&self) -> Vec<Event> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_snapshot() {
        let log = EventLog::new();
        log.emit(Event::Staked {
            staker: "alice".to_string(),
            amount: 5,
        });

        let events = log.snapshot();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            Event::Staked {
                staker: "alice".to_string(),
                amount: 5
            }
        );
    }

    #[tokio::test]
    async fn test_broadcast_subscription() {
        let log = EventLog::new();
        let mut rx = log.subscribe();

        log.emit(Event::RewardPaid {
            staker: "bob".to_string(),
            amount: 7,
        });

        let received = rx.recv().await.expect("should receive event");
        match received {
            Event::RewardPaid { staker, amount } => {
                assert_eq!(staker, "bob");
                assert_eq!(amount, 7);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
