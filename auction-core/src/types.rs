use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tsify_next::Tsify;

use crate::error::ParseIdError;

// === TYPE ALIASES ===

pub type Price = i64;
pub type Round = u32;
pub type Seconds = u32;

// === ROLE ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase")]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum Role {
    Buyer,
    Seller,
}

impl Role {
    fn prefix(self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Role::Buyer => "Buyer",
            Role::Seller => "Seller",
        }
    }
}

// === PARTICIPANT ID ===

/// Stable, human-readable participant id: `buyer-1`, `seller-3`, ...
///
/// Crosses the wasm boundary as its string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId {
    pub role: Role,
    /// 1-based position within the role
    pub index: u32,
}

impl ParticipantId {
    pub fn buyer(index: u32) -> Self {
        Self {
            role: Role::Buyer,
            index,
        }
    }

    pub fn seller(index: u32) -> Self {
        Self {
            role: Role::Seller,
            index,
        }
    }

    /// Display name shown next to the id, e.g. `Buyer 2`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.role.title(), self.index)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.role.prefix(), self.index)
    }
}

impl FromStr for ParticipantId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, index) = s.split_once('-').ok_or_else(|| ParseIdError(s.to_string()))?;
        let role = match prefix {
            "buyer" => Role::Buyer,
            "seller" => Role::Seller,
            _ => return Err(ParseIdError(s.to_string())),
        };
        Ok(Self {
            role,
            index: parse_index(index).ok_or_else(|| ParseIdError(s.to_string()))?,
        })
    }
}

/// Positive index in canonical decimal form: no sign, no leading zeros.
/// `buyer-01` names no participant, so it must not resolve to `buyer-1`.
fn parse_index<T: FromStr + ToString + Default + PartialEq>(raw: &str) -> Option<T> {
    let index: T = raw.parse().ok()?;
    (index != T::default() && index.to_string() == raw).then_some(index)
}

impl Serialize for ParticipantId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParticipantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// === TRADE ID ===

/// Sequential trade id, `trade-N`. N equals the trade's 1-based position in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TradeId(pub u64);

impl TradeId {
    pub fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Id following a log of `len` trades.
    pub fn after(len: usize) -> Self {
        Self(len as u64 + 1)
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trade-{}", self.0)
    }
}

impl FromStr for TradeId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("trade-")
            .and_then(parse_index)
            .map(Self)
            .ok_or_else(|| ParseIdError(s.to_string()))
    }
}

impl Serialize for TradeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TradeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// === PHASE ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase")]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum Phase {
    Setup,
    Playing,
    RoundEnd,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Setup => "setup",
            Phase::Playing => "playing",
            Phase::RoundEnd => "roundEnd",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}
