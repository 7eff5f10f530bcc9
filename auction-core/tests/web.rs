//! The exported `MarketSession` as the page sees it. Run with
//! `wasm-pack test --headless --firefox auction-core`.
#![cfg(target_arch = "wasm32")]

use auction_core::{GameConfig, MarketSession, Phase};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn error_kind(err: &JsValue) -> Option<String> {
    js_sys::Reflect::get(err, &JsValue::from_str("kind"))
        .ok()?
        .as_string()
}

fn classroom_config() -> GameConfig {
    GameConfig::default()
        .with_participants(2, 2)
        .with_rounds(1, 60)
        .with_price_range(10, 20)
}

#[wasm_bindgen_test]
fn boundary_enforces_classroom_ranges() {
    let mut market = MarketSession::with_seed(1);
    let err = market
        .initialize_game(classroom_config().with_rounds(1, 5))
        .unwrap_err();
    assert_eq!(error_kind(&err).as_deref(), Some("invalidConfig"));
    assert_eq!(market.get_game_state().phase, Phase::Setup);
}

#[wasm_bindgen_test]
fn full_round_through_the_boundary() {
    let mut market = MarketSession::with_seed(3);
    market.initialize_game(classroom_config()).unwrap();
    let epoch = market.start_round().unwrap().timer_epoch;

    let err = market
        .register_trade("buyer-1", "seller-1", JsValue::from_str("abc"))
        .unwrap_err();
    assert_eq!(error_kind(&err).as_deref(), Some("tradeRejected"));

    let err = market
        .register_trade("buyer-1", "seller-1", JsValue::from_f64(25.0))
        .unwrap_err();
    assert_eq!(error_kind(&err).as_deref(), Some("tradeRejected"));

    assert!(!market.tick(Some(epoch.wrapping_sub(1))));
    assert_eq!(market.get_game_state().time_remaining_seconds, 60);

    let ended = (0..60).map(|_| market.tick(Some(epoch))).last();
    assert_eq!(ended, Some(true));
    assert_eq!(market.get_game_state().phase, Phase::Finished);
    assert_eq!(market.get_snapshot().total_trades, 0);

    market.reset_to_setup().unwrap();
    assert!(market.get_participants().buyers.is_empty());
}

#[wasm_bindgen_test]
fn malformed_config_json_is_reported() {
    let mut market = MarketSession::with_seed(9);
    let err = market.configure_json("{oops").unwrap_err();
    assert_eq!(error_kind(&err).as_deref(), Some("invalidConfigJson"));
}
