// Trade admission: the zone-of-agreement check and trade record construction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{SessionError, TradeRejection};
use crate::participants::{Participant, ParticipantRegistry};
use crate::types::{ParticipantId, Price, Round, TradeId};

// === TRADE ===

/// An admitted trade. Immutable once created; owned by the trade log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: TradeId,
    pub round: Round,
    pub timestamp: DateTime<Utc>,
    pub buyer_id: ParticipantId,
    pub seller_id: ParticipantId,
    pub buyer_name: String,
    pub seller_name: String,
    pub price: Price,
}

/// Everything about the session a new trade record needs, captured at submission time.
#[derive(Debug, Clone, Copy)]
pub struct TradeContext {
    pub round: Round,
    /// Number of trades already in the log
    pub log_len: usize,
    pub timestamp: DateTime<Utc>,
    pub price_min: Price,
    pub price_max: Price,
}

impl TradeContext {
    pub fn new(config: &GameConfig, round: Round, log_len: usize, timestamp: DateTime<Utc>) -> Self {
        Self {
            round,
            log_len,
            timestamp,
            price_min: config.price_min,
            price_max: config.price_max,
        }
    }
}

// === VALIDATION ===

/// Price check only: the zone of agreement
/// `[seller.reservation_price, buyer.reservation_price]`, then the configured
/// bounds. The bounds check only fires for reservations set outside the
/// configured range.
pub fn check_price(
    buyer: &Participant,
    seller: &Participant,
    price: Price,
    ctx: &TradeContext,
) -> Result<(), TradeRejection> {
    if price > buyer.reservation_price || price < seller.reservation_price {
        return Err(TradeRejection::OutsideZoneOfAgreement {
            price,
            buyer_max: buyer.reservation_price,
            seller_min: seller.reservation_price,
        });
    }
    if price < ctx.price_min || price > ctx.price_max {
        return Err(TradeRejection::PriceOutOfBounds {
            price,
            min: ctx.price_min,
            max: ctx.price_max,
        });
    }
    Ok(())
}

/// Decide whether `buyer` and `seller` may trade at `price` and, if so,
/// build the trade record. Pure: neither the log nor the histories are touched.
pub fn validate(
    buyer: &Participant,
    seller: &Participant,
    price: Price,
    ctx: &TradeContext,
) -> Result<Trade, TradeRejection> {
    check_price(buyer, seller, price, ctx)?;
    Ok(Trade {
        id: TradeId::after(ctx.log_len),
        round: ctx.round,
        timestamp: ctx.timestamp,
        buyer_id: buyer.id,
        seller_id: seller.id,
        buyer_name: buyer.display_name.clone(),
        seller_name: seller.display_name.clone(),
        price,
    })
}

/// Full admission path for raw operator input: selection checks, registry
/// lookups, then [`validate`].
///
/// Empty ids count as missing selections. An id that is not a current
/// participant of the expected role is `NotFound`.
pub fn admit(
    registry: &ParticipantRegistry,
    buyer_id: &str,
    seller_id: &str,
    price: Option<Price>,
    ctx: &TradeContext,
) -> Result<Trade, SessionError> {
    let buyer_id = buyer_id.trim();
    let seller_id = seller_id.trim();
    if buyer_id.is_empty() {
        return Err(TradeRejection::MissingBuyer.into());
    }
    if seller_id.is_empty() {
        return Err(TradeRejection::MissingSeller.into());
    }
    let price = price.ok_or(TradeRejection::MissingPrice)?;

    let buyer = registry
        .buyer(buyer_id)
        .ok_or_else(|| SessionError::NotFound(buyer_id.to_string()))?;
    let seller = registry
        .seller(seller_id)
        .ok_or_else(|| SessionError::NotFound(seller_id.to_string()))?;

    Ok(validate(buyer, seller, price, ctx)?)
}

// === PRICE INPUT ===

/// Parse a price typed by the operator. Blank input is missing; anything
/// other than a whole number is non-numeric.
pub fn parse_price(input: &str) -> Result<Price, TradeRejection> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TradeRejection::MissingPrice);
    }
    trimmed
        .parse::<Price>()
        .map_err(|_| TradeRejection::NonNumericPrice {
            input: input.to_string(),
        })
}

/// Accept a numeric price from a host that only has floating point numbers.
/// NaN, infinities and fractional values are refused.
pub fn price_from_number(value: f64) -> Result<Price, TradeRejection> {
    // `Price::MAX as f64` rounds up to 2^63, which is already out of range
    let in_range = value >= Price::MIN as f64 && value < Price::MAX as f64;
    if !value.is_finite() || value.fract() != 0.0 || !in_range {
        return Err(TradeRejection::NonNumericPrice {
            input: value.to_string(),
        });
    }
    Ok(value as Price)
}
