use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Phase, Price, Round, Seconds};

/// A participant or trade id that is not in canonical `role-N` / `trade-N` form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed id: {0:?}")]
pub struct ParseIdError(pub String);

/// Why a game configuration was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Number of buyers must be between 1 and 10, got {0}")]
    Buyers(u32),

    #[error("Number of sellers must be between 1 and 10, got {0}")]
    Sellers(u32),

    #[error("Round duration must be between 60 and 1800 seconds, got {0}")]
    RoundDuration(Seconds),

    #[error("Number of rounds must be between 1 and 10, got {0}")]
    Rounds(Round),

    #[error("Minimum price {min} must be below maximum price {max}")]
    PriceRange { min: Price, max: Price },
}

/// Why a proposed trade was not admitted. State is untouched in every case.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TradeRejection {
    #[error("No buyer selected")]
    MissingBuyer,

    #[error("No seller selected")]
    MissingSeller,

    #[error("No price entered")]
    MissingPrice,

    #[error("Price is not a whole number: {input:?}")]
    NonNumericPrice { input: String },

    #[error("Price {price} is outside the allowed range {min}..={max}")]
    PriceOutOfBounds { price: Price, min: Price, max: Price },

    #[error("Trade not possible with these terms (buyer max: {buyer_max}, seller min: {seller_min})")]
    OutsideZoneOfAgreement {
        price: Price,
        buyer_max: Price,
        seller_min: Price,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot {operation} while the game is in phase {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: Phase,
    },

    #[error("{0}")]
    TradeRejected(#[from] TradeRejection),

    #[error("Participant not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl SessionError {
    /// Short machine-readable tag, used as the `kind` of boundary error objects.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::InvalidTransition { .. } => "invalidTransition",
            SessionError::TradeRejected(_) => "tradeRejected",
            SessionError::NotFound(_) => "notFound",
            SessionError::InvalidConfig(_) => "invalidConfig",
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
