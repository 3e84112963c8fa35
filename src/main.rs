//! Betforge simulator CLI.
//!
//! Runs the games end to end in-process: players place bets, the VRF
//! source fulfills randomness requests, fees get distributed into the
//! staking pool, and the final pool and staking stats are printed.

use betforge::{
    BetSelection, BetforgeConfig, CoinChoice, ConfigLoader, GameKind, Platform, SystemClock, UNIT,
    VrfSource,
};
use clap::{Parser, Subcommand};
use rand::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "betforge")]
#[command(about = "Wager games with shared settlement, pools and staking")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a betting session across all games
    Simulate {
        /// Number of bets to place
        #[arg(long, default_value = "1000")]
        bets: u64,

        /// Number of simulated players
        #[arg(long, default_value = "8")]
        players: u64,

        /// Restrict to one game (number_guess, coin_toss, scratch)
        #[arg(long)]
        game: Option<String>,
    },
    /// Print the effective configuration and exit
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "betforge=debug"
    } else {
        "betforge=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let loader = match &cli.config {
        Some(path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;

    match cli.command {
        Commands::Simulate {
            bets,
            players,
            game,
        } => {
            let only = match game.as_deref() {
                Some("number_guess") => Some(GameKind::NumberGuess),
                Some("coin_toss") => Some(GameKind::CoinToss),
                Some("scratch") => Some(GameKind::Scratch),
                Some(other) => return Err(format!("unknown game '{}'", other).into()),
                None => None,
            };
            run_simulation(config, bets, players, only)?;
        }
        Commands::ShowConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

fn run_simulation(
    config: BetforgeConfig,
    bets: u64,
    players: u64,
    only: Option<GameKind>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🎲 Betforge simulation: {} bets, {} players", bets, players);

    let platform = Platform::new(config, Arc::new(SystemClock));
    let vrf = VrfSource::new_random();
    let mut rng = thread_rng();

    let player_names: Vec<String> = (0..players).map(|i| format!("player-{}", i)).collect();
    for name in &player_names {
        platform.ledger.mint(name, 1_000 * UNIT);
    }

    // The house backs every bankroll and seeds the staking pool.
    platform.ledger.mint("house", 4_000_000 * UNIT);
    for kind in [GameKind::NumberGuess, GameKind::CoinToss, GameKind::Scratch] {
        platform
            .engine(kind)
            .fund_bankroll("house", 1_000_000 * UNIT)?;
    }
    platform.staking.stake("house", 100 * UNIT)?;

    let games = match only {
        Some(kind) => vec![kind],
        None => vec![GameKind::NumberGuess, GameKind::CoinToss, GameKind::Scratch],
    };

    for i in 0..bets {
        let kind = games[rng.gen_range(0..games.len())];
        let player = &player_names[rng.gen_range(0..player_names.len())];
        let amount = UNIT / 100 * rng.gen_range(1..=50);

        let selection = match kind {
            GameKind::NumberGuess => match rng.gen_range(0..4) {
                0 => BetSelection::NumberOver {
                    number: rng.gen_range(1..=99),
                },
                1 => BetSelection::NumberUnder {
                    number: rng.gen_range(2..=100),
                },
                2 => {
                    let start = rng.gen_range(1..=90);
                    BetSelection::NumberRange {
                        start,
                        end: rng.gen_range(start..=100),
                    }
                }
                _ => BetSelection::Parity { odd: rng.gen() },
            },
            GameKind::CoinToss => BetSelection::Coin {
                choice: *[CoinChoice::Heads, CoinChoice::Tails, CoinChoice::Edge]
                    .choose(&mut rng)
                    .unwrap_or(&CoinChoice::Heads),
            },
            GameKind::Scratch => BetSelection::Scratch,
        };

        // Every fourth player proposes the previous one as upline.
        let referrer = if i % 4 == 0 && player != &player_names[0] {
            Some(player_names[0].as_str())
        } else {
            None
        };

        let engine = platform.engine(kind);
        let bet_id = match engine.place_bet(player, selection, amount, amount, referrer, "") {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(player = %player, error = %e, "bet rejected");
                continue;
            }
        };

        if let Some(bet) = engine.bet(bet_id) {
            let num_words = if kind == GameKind::Scratch { 3 } else { 1 };
            let proof = vrf.fulfill(bet.request_id, num_words);
            engine.deliver_randomness(bet.request_id, &proof.words)?;
        }
    }

    for kind in games {
        let engine = platform.engine(kind);
        engine.distribute_fees()?;
        let stats = engine.stats();
        println!(
            "📊 {}: {} bets, wagered {}, paid out {}, jackpot pool {}, streak pool {}",
            kind,
            stats.total_bets,
            stats.total_wagered,
            stats.total_paid_out,
            stats.jackpot_pool,
            stats.streak_pool
        );
    }

    let staking = platform.staking.stats();
    println!(
        "🏦 staking: {} staked, {} rewards received, {} distributed",
        staking.total_staked, staking.total_rewards_received, staking.total_rewards_distributed
    );
    println!("✅ simulation complete ({} events)", platform.events.len());
    Ok(())
}
