use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::config::GameConfig;
use crate::error::TradeRejection;
use crate::participants::Participant;
use crate::trade::Trade;
use crate::types::{Phase, Price, Role, Round, Seconds};

// ============================================================================
// Game State - Phase, round counter and countdown
// ============================================================================

/// Lifecycle state of one session. `is_round_active` is stored, not derived
/// from `phase`, and every transition updates the two together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase")]
#[tsify(into_wasm_abi)]
pub struct GameState {
    pub phase: Phase,
    pub current_round: Round,
    pub time_remaining_seconds: Seconds,
    pub is_round_active: bool,
    /// Bumped whenever the countdown is armed
    pub timer_epoch: u32,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            phase: Phase::Setup,
            current_round: 1,
            time_remaining_seconds: config.round_duration_seconds,
            is_round_active: false,
            timer_epoch: 0,
        }
    }

    pub fn is_setup(&self) -> bool {
        self.phase == Phase::Setup
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Whether an operator may start the countdown for the current round.
    pub fn can_start_round(&self) -> bool {
        matches!(self.phase, Phase::Playing | Phase::RoundEnd) && !self.is_round_active
    }

    /// Whether trades may be registered right now.
    pub fn accepts_trades(&self) -> bool {
        self.phase == Phase::Playing && self.is_round_active
    }
}

// ============================================================================
// Serializable Snapshots for JS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase")]
#[tsify(into_wasm_abi)]
pub struct ParticipantSnapshot {
    pub id: String,
    pub role: Role,
    pub display_name: String,
    pub reservation_price: Price,
    pub trade_ids: Vec<String>,
    pub trade_count: usize,
}

impl From<&Participant> for ParticipantSnapshot {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id.to_string(),
            role: p.role,
            display_name: p.display_name.clone(),
            reservation_price: p.reservation_price,
            trade_ids: p.trade_history.iter().map(ToString::to_string).collect(),
            trade_count: p.trade_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase")]
#[tsify(into_wasm_abi)]
pub struct TradeSnapshot {
    pub id: String,
    pub round: Round,
    /// RFC 3339
    pub timestamp: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub buyer_name: String,
    pub seller_name: String,
    pub price: Price,
}

impl From<&Trade> for TradeSnapshot {
    fn from(t: &Trade) -> Self {
        Self {
            id: t.id.to_string(),
            round: t.round,
            timestamp: t.timestamp.to_rfc3339(),
            buyer_id: t.buyer_id.to_string(),
            seller_id: t.seller_id.to_string(),
            buyer_name: t.buyer_name.clone(),
            seller_name: t.seller_name.clone(),
            price: t.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase")]
#[tsify(into_wasm_abi)]
pub struct ParticipantsSnapshot {
    pub buyers: Vec<ParticipantSnapshot>,
    pub sellers: Vec<ParticipantSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase")]
#[tsify(into_wasm_abi)]
pub struct TradeLogSnapshot {
    pub trades: Vec<TradeSnapshot>,
}

/// Everything the view needs in one call.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase")]
#[tsify(into_wasm_abi)]
pub struct SessionSnapshot {
    pub config: GameConfig,
    pub state: GameState,
    pub buyers: Vec<ParticipantSnapshot>,
    pub sellers: Vec<ParticipantSnapshot>,
    pub trades: Vec<TradeSnapshot>,
    pub total_trades: usize,
}

/// Error object handed to JS in place of a thrown string.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase")]
#[tsify(into_wasm_abi)]
pub struct ErrorSnapshot {
    pub kind: String,
    pub message: String,
    /// Structured rejection detail, present for trade rejections
    #[tsify(type = "any")]
    pub reason: Option<TradeRejection>,
}
