use wasm_bindgen::prelude::*;

pub mod clock;
pub mod config;
pub mod error;
pub mod participants;
pub mod session;
pub mod state;
pub mod trade;
pub mod types;

pub use clock::*;
pub use config::*;
pub use error::{ConfigError, ParseIdError, SessionError, TradeRejection};
pub use participants::*;
pub use session::*;
pub use state::*;
pub use trade::{Trade, TradeContext, admit, parse_price, price_from_number, validate};
pub use types::*;

#[cfg(feature = "instrument")]
pub use instrument;

// ============================================================================
// WASM API - Market session
// ============================================================================

/// One classroom market, driven from the page.
///
/// The page owns the interval timer: it calls `tick(epoch)` once per second
/// while `getGameState().isRoundActive` holds, using the epoch returned by
/// `startRound`, and drops its interval when a tick reports the round over.
#[wasm_bindgen]
pub struct MarketSession {
    session: Session,
}

#[wasm_bindgen]
impl MarketSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
        Self::with_seed(seed)
    }

    /// Create a session with reproducible reservation prices
    #[wasm_bindgen(js_name = withSeed)]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            session: Session::new(GameConfig::default(), seed),
        }
    }

    #[wasm_bindgen]
    pub fn configure(&mut self, config: GameConfig) -> Result<(), JsValue> {
        config.validate().map_err(|e| to_js_error(e.into()))?;
        self.session.configure(config).map_err(to_js_error)
    }

    /// Same as `configure`, for settings kept as JSON text
    #[wasm_bindgen(js_name = configureJson)]
    pub fn configure_json(&mut self, json: &str) -> Result<(), JsValue> {
        let config = parse_config_json(json).map_err(|message| {
            error_value(ErrorSnapshot {
                kind: "invalidConfigJson".to_string(),
                message,
                reason: None,
            })
        })?;
        self.configure(config)
    }

    #[wasm_bindgen(js_name = initializeGame)]
    pub fn initialize_game(&mut self, config: GameConfig) -> Result<GameState, JsValue> {
        config.validate().map_err(|e| to_js_error(e.into()))?;
        self.session.initialize_game(config).map_err(to_js_error)
    }

    /// Start a game with the current settings
    #[wasm_bindgen(js_name = startGame)]
    pub fn start_game(&mut self) -> Result<GameState, JsValue> {
        self.session.start_game().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = startRound)]
    pub fn start_round(&mut self) -> Result<GameState, JsValue> {
        self.session.start_round().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = endRound)]
    pub fn end_round(&mut self) -> Result<GameState, JsValue> {
        self.session.end_round().map_err(to_js_error)
    }

    /// Advance the countdown by one second. Returns true when this tick ended
    /// the round, so the caller can clear its interval.
    ///
    /// Pass the epoch from `startRound`; ticks from an older timer are ignored.
    /// Without an epoch the tick applies to whatever round is running.
    #[wasm_bindgen]
    pub fn tick(&mut self, epoch: Option<u32>) -> bool {
        let outcome = match epoch {
            Some(epoch) => self.session.tick_for(epoch),
            None => self.session.tick(),
        };
        outcome.ended_round()
    }

    /// Submit a trade. `price` may be a number or the raw text of the price field.
    #[wasm_bindgen(js_name = registerTrade)]
    pub fn register_trade(
        &mut self,
        buyer_id: &str,
        seller_id: &str,
        price: JsValue,
    ) -> Result<TradeSnapshot, JsValue> {
        let price = price_from_js(&price).map_err(|r| to_js_error(r.into()))?;
        self.session
            .register_trade(buyer_id, seller_id, price)
            .map(|t| TradeSnapshot::from(&t))
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = resetToSetup)]
    pub fn reset_to_setup(&mut self) -> Result<GameState, JsValue> {
        self.session.reset_to_setup().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = getGameState)]
    pub fn get_game_state(&self) -> GameState {
        self.session.game_state()
    }

    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> GameConfig {
        *self.session.config()
    }

    #[wasm_bindgen(js_name = getParticipants)]
    pub fn get_participants(&self) -> ParticipantsSnapshot {
        participants_snapshot(&self.session)
    }

    #[wasm_bindgen(js_name = getTradeLog)]
    pub fn get_trade_log(&self) -> TradeLogSnapshot {
        TradeLogSnapshot {
            trades: self.session.trade_log().iter().map(TradeSnapshot::from).collect(),
        }
    }

    #[wasm_bindgen(js_name = tradesInRound)]
    pub fn trades_in_round(&self, round: u32) -> TradeLogSnapshot {
        TradeLogSnapshot {
            trades: self
                .session
                .trades_in_round(round)
                .map(TradeSnapshot::from)
                .collect(),
        }
    }

    /// Get a snapshot of the whole session for rendering
    #[wasm_bindgen(js_name = getSnapshot)]
    pub fn get_snapshot(&self) -> SessionSnapshot {
        session_snapshot(&self.session)
    }
}

impl Default for MarketSession {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Boundary Helpers
// ============================================================================

/// Parse settings from JSON text and check their ranges.
pub fn parse_config_json(json: &str) -> Result<GameConfig, String> {
    let config: GameConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

pub fn participants_snapshot<C: Clock>(session: &Session<C>) -> ParticipantsSnapshot {
    let registry = session.participants();
    ParticipantsSnapshot {
        buyers: registry.buyers.iter().map(ParticipantSnapshot::from).collect(),
        sellers: registry.sellers.iter().map(ParticipantSnapshot::from).collect(),
    }
}

pub fn session_snapshot<C: Clock>(session: &Session<C>) -> SessionSnapshot {
    let ParticipantsSnapshot { buyers, sellers } = participants_snapshot(session);
    SessionSnapshot {
        config: *session.config(),
        state: session.game_state(),
        buyers,
        sellers,
        trades: session.trade_log().iter().map(TradeSnapshot::from).collect(),
        total_trades: session.trade_log().len(),
    }
}

pub fn error_snapshot(err: &SessionError) -> ErrorSnapshot {
    let reason = match err {
        SessionError::TradeRejected(rejection) => Some(rejection.clone()),
        _ => None,
    };
    ErrorSnapshot {
        kind: err.kind().to_string(),
        message: err.to_string(),
        reason,
    }
}

fn price_from_js(value: &JsValue) -> Result<Option<Price>, TradeRejection> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    if let Some(number) = value.as_f64() {
        return price_from_number(number).map(Some);
    }
    if let Some(text) = value.as_string() {
        return match parse_price(&text) {
            Ok(price) => Ok(Some(price)),
            Err(TradeRejection::MissingPrice) => Ok(None),
            Err(other) => Err(other),
        };
    }
    Err(TradeRejection::NonNumericPrice {
        input: format!("{value:?}"),
    })
}

fn to_js_error(err: SessionError) -> JsValue {
    error_value(error_snapshot(&err))
}

fn error_value(snapshot: ErrorSnapshot) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    serde::Serialize::serialize(&snapshot, &serializer)
        .unwrap_or_else(|_| JsValue::from_str(&snapshot.message))
}

// ============================================================================
// Tests
// ============================================================================
