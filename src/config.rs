//! Configuration management with validation and defaults.
//!
//! Centralized configuration for the game engines, the fee split and the
//! staking pool, loadable from a TOML file with `BETFORGE_*` environment
//! variable overrides.

use crate::errors::{ConfigurationError, EngineResult};
use crate::ledger::{Amount, UNIT};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Top-level configuration for a betforge deployment.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct BetforgeConfig {
    pub game: GameConfig,
    pub fee_split: FeeSplitConfig,
    pub staking: StakingConfig,
    pub house: HouseConfig,
}

/// Per-game-instance wagering parameters. Rates are basis points.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Protocol fee routed to the fee vault at placement.
    pub fee_bps: u32,
    /// Share of every wager routed to the jackpot pool.
    pub jackpot_rate_bps: u32,
    /// Share of every wager routed to the streak pool.
    pub streak_rate_bps: u32,
    pub min_bet: Amount,
    pub max_bet: Amount,
    /// Maximum length of the free-form note attached to a bet.
    pub max_note_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fee_bps: 200,
            jackpot_rate_bps: 100,
            streak_rate_bps: 100,
            min_bet: UNIT / 100,
            max_bet: 10 * UNIT,
            max_note_len: 256,
        }
    }
}

impl GameConfig {
    /// Combined rate deducted from every wager at placement.
    pub fn total_rate_bps(&self) -> u32 {
        self.fee_bps + self.jackpot_rate_bps + self.streak_rate_bps
    }

    /// Multiplier scale after the combined rate, out of 10000.
    pub fn fee_multiplier_bps(&self) -> u128 {
        10_000u128 - self.total_rate_bps() as u128
    }
}

/// How the protocol-fee vault is split when flushed.
/// The three shares must sum to 10000.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeeSplitConfig {
    pub staking_bps: u32,
    pub charity_bps: u32,
    pub platform_bps: u32,
}

impl Default for FeeSplitConfig {
    fn default() -> Self {
        Self {
            staking_bps: 4_000,
            charity_bps: 3_000,
            platform_bps: 3_000,
        }
    }
}

/// Staking pool parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StakingConfig {
    /// Seconds a stake must sit before a fee-free unstake.
    pub lock_period_secs: u64,
    /// Fee on principal for unstaking inside the lock period.
    pub early_exit_fee_bps: u32,
    /// Share of the early-exit fee recycled into the reward accumulator;
    /// the remainder goes to the platform address.
    pub early_fee_to_rewards_bps: u32,
    /// Optional cap on total staked.
    pub max_stake_amount: Option<Amount>,
    /// Ascending thresholds for display levels 1..=N.
    pub level_thresholds: Vec<Amount>,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            lock_period_secs: 7 * 24 * 60 * 60,
            early_exit_fee_bps: 500,
            early_fee_to_rewards_bps: 5_000,
            max_stake_amount: None,
            level_thresholds: vec![UNIT / 10, UNIT, 5 * UNIT, 20 * UNIT, 100 * UNIT],
        }
    }
}

/// Addresses receiving the non-staking fee shares.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HouseConfig {
    pub charity_address: String,
    pub platform_address: String,
}

impl Default for HouseConfig {
    fn default() -> Self {
        Self {
            charity_address: "house:charity".to_string(),
            platform_address: "house:platform".to_string(),
        }
    }
}

/// Configuration loader with file and environment variable support.
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables, then validate.
    pub fn load(&self) -> EngineResult<BetforgeConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            BetforgeConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> EngineResult<BetforgeConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::LoadFailed(format!("failed to read {}: {}", path, e))
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("failed to parse TOML: {}", e)).into())
    }

    fn apply_env_overrides(&self, config: &mut BetforgeConfig) -> EngineResult<()> {
        if let Ok(v) = env::var("BETFORGE_FEE_BPS") {
            config.game.fee_bps = parse_env("BETFORGE_FEE_BPS", &v)?;
        }
        if let Ok(v) = env::var("BETFORGE_MIN_BET") {
            config.game.min_bet = parse_env("BETFORGE_MIN_BET", &v)?;
        }
        if let Ok(v) = env::var("BETFORGE_MAX_BET") {
            config.game.max_bet = parse_env("BETFORGE_MAX_BET", &v)?;
        }
        if let Ok(v) = env::var("BETFORGE_LOCK_PERIOD_SECS") {
            config.staking.lock_period_secs = parse_env("BETFORGE_LOCK_PERIOD_SECS", &v)?;
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env<T: std::str::FromStr>(field: &str, value: &str) -> EngineResult<T> {
    value.parse().map_err(|_| {
        ConfigurationError::InvalidValue {
            field: field.to_string(),
            reason: format!("cannot parse '{}'", value),
        }
        .into()
    })
}

/// Validate cross-field constraints.
pub fn validate(config: &BetforgeConfig) -> EngineResult<()> {
    if config.game.total_rate_bps() >= 10_000 {
        return Err(ConfigurationError::InvalidValue {
            field: "game".to_string(),
            reason: "fee + jackpot + streak rates must be below 10000 bps".to_string(),
        }
        .into());
    }
    if config.game.min_bet == 0 || config.game.min_bet > config.game.max_bet {
        return Err(ConfigurationError::InvalidValue {
            field: "game.min_bet".to_string(),
            reason: "min_bet must be positive and not exceed max_bet".to_string(),
        }
        .into());
    }
    let split = &config.fee_split;
    if split.staking_bps + split.charity_bps + split.platform_bps != 10_000 {
        return Err(ConfigurationError::InvalidValue {
            field: "fee_split".to_string(),
            reason: "staking + charity + platform shares must sum to 10000 bps".to_string(),
        }
        .into());
    }
    if config.staking.early_exit_fee_bps >= 10_000
        || config.staking.early_fee_to_rewards_bps > 10_000
    {
        return Err(ConfigurationError::InvalidValue {
            field: "staking".to_string(),
            reason: "fee shares must be valid basis points".to_string(),
        }
        .into());
    }
    if !config
        .staking
        .level_thresholds
        .windows(2)
        .all(|w| w[0] < w[1])
    {
        return Err(ConfigurationError::InvalidValue {
            field: "staking.level_thresholds".to_string(),
            reason: "thresholds must be strictly ascending".to_string(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BetforgeConfig::default();
        validate(&config).expect("defaults must validate");
        assert_eq!(config.game.total_rate_bps(), 400);
        assert_eq!(config.game.fee_multiplier_bps(), 9_600);
    }

    #[test]
    fn test_invalid_fee_split_rejected() {
        let mut config = BetforgeConfig::default();
        config.fee_split.staking_bps = 9_000;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_min_bet_above_max_rejected() {
        let mut config = BetforgeConfig::default();
        config.game.min_bet = config.game.max_bet + 1;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = BetforgeConfig::default();
        let text = toml::to_string(&config).expect("serialize");
        let parsed: BetforgeConfig = toml::from_str(&text).expect("parse");
        assert_eq!(parsed.game.fee_bps, config.game.fee_bps);
        assert_eq!(parsed.staking.lock_period_secs, config.staking.lock_period_secs);
    }
}
