// Shared fixtures for integration tests

#![allow(dead_code)]

use auction_core::{FixedClock, GameConfig, Price, Session};

/// Two of each role, prices 10..20, one five-second round. The round is
/// shorter than the classroom minimum; the session itself accepts it.
pub fn scenario_config() -> GameConfig {
    GameConfig::default()
        .with_participants(2, 2)
        .with_rounds(1, 5)
        .with_price_range(10, 20)
}

pub fn session(config: GameConfig, seed: u64) -> Session<FixedClock> {
    Session::with_clock(config, seed, FixedClock::at_epoch())
}

/// Search seeds until the generated population contains a buyer reserving
/// `buyer_max` and a seller reserving `seller_min`. Returns a session already
/// in play (round not started) plus the two ids.
pub fn session_with_reservations(
    config: GameConfig,
    buyer_max: Price,
    seller_min: Price,
) -> (Session<FixedClock>, String, String) {
    for seed in 0..100_000 {
        let mut s = session(config, seed);
        s.initialize_game(config).expect("valid config");
        let registry = s.participants();
        let buyer = registry
            .buyers
            .iter()
            .find(|p| p.reservation_price == buyer_max)
            .map(|p| p.id.to_string());
        let seller = registry
            .sellers
            .iter()
            .find(|p| p.reservation_price == seller_min)
            .map(|p| p.id.to_string());
        if let (Some(buyer), Some(seller)) = (buyer, seller) {
            return (s, buyer, seller);
        }
    }
    panic!("no seed produced buyer {buyer_max} / seller {seller_min}");
}
