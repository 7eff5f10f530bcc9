//! Invariants that must hold after every operation, whatever the operator does.

mod common;

use auction_core::{FixedClock, GameConfig, Phase, Price, Session};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use common::session;

/// Check every invariant of a session in its current state.
fn assert_invariants(s: &Session<FixedClock>, context: &str) {
    let config = s.config();
    let state = s.game_state();

    assert!(
        state.current_round >= 1 && state.current_round <= config.num_rounds,
        "{context}: round {} outside 1..={}",
        state.current_round,
        config.num_rounds
    );
    assert!(state.time_remaining_seconds <= config.round_duration_seconds, "{context}");
    if state.is_round_active {
        assert_eq!(state.phase, Phase::Playing, "{context}: active round outside Playing");
    }

    for (pos, trade) in s.trade_log().iter().enumerate() {
        assert_eq!(trade.id.0 as usize, pos + 1, "{context}: trade id out of order");

        let buyer = s.participants().find_by_id(trade.buyer_id).expect("buyer exists");
        let seller = s.participants().find_by_id(trade.seller_id).expect("seller exists");
        assert!(
            seller.reservation_price <= trade.price && trade.price <= buyer.reservation_price,
            "{context}: {} outside zone",
            trade.id
        );
        assert!(buyer.trade_history.contains(&trade.id), "{context}");
        assert!(seller.trade_history.contains(&trade.id), "{context}");
    }

    let history_total: usize = s.participants().iter().map(|p| p.trade_count()).sum();
    assert_eq!(history_total, 2 * s.trade_log().len(), "{context}: histories out of sync");

    if state.phase == Phase::Setup {
        assert!(s.participants().is_empty(), "{context}");
        assert!(s.trade_log().is_empty(), "{context}");
    }
}

#[test]
fn invariant_holds_under_random_operation_sequences() {
    let config = GameConfig::default()
        .with_participants(3, 3)
        .with_rounds(3, 4)
        .with_price_range(10, 30);

    for seed in 0..30 {
        let mut s = session(config, seed);
        let mut rng = StdRng::seed_from_u64(seed);
        assert_invariants(&s, "fresh");

        for step in 0..400 {
            let context = format!("seed {seed} step {step}");
            match rng.random_range(0..7) {
                0 => {
                    let _ = s.initialize_game(config);
                }
                1 => {
                    let _ = s.start_round();
                }
                2 | 3 => {
                    s.tick();
                }
                4 => {
                    let buyer = format!("buyer-{}", rng.random_range(1..=4));
                    let seller = format!("seller-{}", rng.random_range(1..=4));
                    let price: Price = rng.random_range(8..33);
                    let _ = s.register_trade(&buyer, &seller, Some(price));
                }
                5 => {
                    let _ = s.reset_to_setup();
                }
                _ => {
                    if rng.random_range(0..4) == 0 {
                        let _ = s.end_round();
                    }
                }
            }
            assert_invariants(&s, &context);
        }
    }
}

#[test]
fn invariant_finished_is_terminal_until_reset() {
    let config = GameConfig::default().with_rounds(1, 3);
    let mut s = session(config, 4);
    s.initialize_game(config).unwrap();
    s.start_round().unwrap();
    for _ in 0..3 {
        s.tick();
    }
    assert_eq!(s.game_state().phase, Phase::Finished);
    let finished = s.game_state();

    assert!(s.start_round().is_err());
    assert!(s.end_round().is_err());
    assert!(s.initialize_game(config).is_err());
    assert!(s.configure(config).is_err());
    assert!(s.register_trade("buyer-1", "seller-1", Some(500)).is_err());
    s.tick();
    assert_eq!(s.game_state(), finished);
}
