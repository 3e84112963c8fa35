//! Referral binding and commission flow through settlement.

use betforge::{Amount, BetSelection, BetforgeConfig, GameKind, Platform, SystemClock, UNIT};
use std::sync::Arc;

fn platform() -> Platform {
    let platform = Platform::new(BetforgeConfig::default(), Arc::new(SystemClock));
    platform.ledger.mint("house", 1_000_000 * UNIT);
    platform
        .engine(GameKind::NumberGuess)
        .fund_bankroll("house", 1_000_000 * UNIT)
        .expect("fund bankroll");
    platform
}

fn word_for(draw: u32) -> u64 {
    (draw - 1) as u64
}

fn bet_with_ref(platform: &Platform, player: &str, referrer: Option<&str>, draw: u32) {
    let engine = platform.engine(GameKind::NumberGuess);
    let id = engine
        .place_bet(
            player,
            BetSelection::Parity { odd: false },
            UNIT,
            UNIT,
            referrer,
            "",
        )
        .expect("place");
    let bet = engine.bet(id).expect("bet");
    engine
        .deliver_randomness(bet.request_id, &[word_for(draw)])
        .expect("settle");
}

// tier1 = 24% of the 200 bps fee portion
fn tier1_commission(amount: Amount) -> Amount {
    let fee_portion = (amount as u128 * 200 / 10_000) as Amount;
    (fee_portion as u128 * 2_400 / 10_000) as Amount
}

fn tier2_commission(amount: Amount) -> Amount {
    let fee_portion = (amount as u128 * 200 / 10_000) as Amount;
    (fee_portion as u128 * 100 / 10_000) as Amount
}

#[test]
fn losing_bet_still_binds_and_pays_commission() {
    let platform = platform();
    platform.ledger.mint("alice", 2 * UNIT);

    bet_with_ref(&platform, "alice", Some("recruiter"), 3); // loss
    assert_eq!(
        platform.referral.uplines_of("alice").unwrap().tier1,
        "recruiter"
    );
    assert_eq!(
        platform.ledger.balance("recruiter"),
        tier1_commission(UNIT)
    );

    // A later proposer cannot replace the bound upline.
    bet_with_ref(&platform, "alice", Some("other"), 8); // win
    assert_eq!(
        platform.referral.uplines_of("alice").unwrap().tier1,
        "recruiter"
    );
    assert_eq!(platform.ledger.balance("other"), 0);
    assert_eq!(
        platform.ledger.balance("recruiter"),
        2 * tier1_commission(UNIT)
    );
}

#[test]
fn two_tier_commission_flows_up_the_chain() {
    let platform = platform();
    platform.ledger.mint("mid", UNIT);
    platform.ledger.mint("leaf", UNIT);

    // top recruits mid, then mid recruits leaf.
    bet_with_ref(&platform, "mid", Some("top"), 3);
    bet_with_ref(&platform, "leaf", Some("mid"), 3);

    let uplines = platform.referral.uplines_of("leaf").unwrap();
    assert_eq!(uplines.tier1, "mid");
    assert_eq!(uplines.tier2.as_deref(), Some("top"));

    // top earned tier1 on mid's bet and tier2 on leaf's bet; mid earned
    // tier1 on leaf's bet.
    assert_eq!(
        platform.ledger.balance("top"),
        tier1_commission(UNIT) + tier2_commission(UNIT)
    );
    assert_eq!(platform.ledger.balance("mid"), tier1_commission(UNIT));
}

#[test]
fn self_referral_and_established_uplines_do_not_bind() {
    let platform = platform();
    platform.ledger.mint("alice", UNIT);
    platform.ledger.mint("bob", UNIT);
    platform.ledger.mint("recruiter", UNIT);

    bet_with_ref(&platform, "alice", Some("alice"), 3);
    assert!(platform.referral.uplines_of("alice").is_none());

    // recruiter keeps recruiting after its first downline.
    assert!(platform.referral.bind_if_unbound("alice", "recruiter"));
    bet_with_ref(&platform, "bob", Some("recruiter"), 3);
    assert_eq!(
        platform.referral.uplines_of("bob").unwrap().tier1,
        "recruiter"
    );
    assert_eq!(platform.referral.downline_count("recruiter"), 2);

    // But recruiter, holding downlines of its own, cannot bind an upline.
    bet_with_ref(&platform, "recruiter", Some("outsider"), 3);
    assert!(platform.referral.uplines_of("recruiter").is_none());
    assert_eq!(platform.ledger.balance("outsider"), 0);
}

#[test]
fn house_accounts_never_earn_commission() {
    let platform = platform();
    platform.ledger.mint("alice", UNIT);

    bet_with_ref(&platform, "alice", Some("house:platform"), 3);
    assert!(platform.referral.uplines_of("alice").is_none());
    assert_eq!(platform.ledger.balance("house:platform"), 0);
}

#[test]
fn commission_comes_out_of_the_fee_vault() {
    let platform = platform();
    platform.ledger.mint("alice", 2 * UNIT);

    bet_with_ref(&platform, "alice", Some("recruiter"), 3);
    let stats = platform.engine(GameKind::NumberGuess).stats();

    let fee = (UNIT as u128 * 200 / 10_000) as Amount;
    assert_eq!(stats.fees_collected, fee);
    assert_eq!(stats.referral_paid, tier1_commission(UNIT));
    assert_eq!(stats.fee_vault, fee - tier1_commission(UNIT));
}
