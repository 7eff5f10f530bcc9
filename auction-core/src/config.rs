use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::error::ConfigError;
use crate::types::{Price, Round, Seconds};

// === BOUNDS ===

pub const MIN_PARTICIPANTS: u32 = 1;
pub const MAX_PARTICIPANTS: u32 = 10;
pub const MIN_ROUND_SECONDS: Seconds = 60;
pub const MAX_ROUND_SECONDS: Seconds = 1800;
pub const MIN_ROUNDS: Round = 1;
pub const MAX_ROUNDS: Round = 10;

// === GAME CONFIG ===

/// Settings for one game. Editable only while the session is in setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase")]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct GameConfig {
    pub num_buyers: u32,
    pub num_sellers: u32,
    pub round_duration_seconds: Seconds,
    pub num_rounds: Round,
    pub price_min: Price,
    pub price_max: Price,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_buyers: 4,
            num_sellers: 4,
            round_duration_seconds: 300,
            num_rounds: 3,
            price_min: 0,
            price_max: 1000,
        }
    }
}

impl GameConfig {
    pub fn with_participants(mut self, buyers: u32, sellers: u32) -> Self {
        self.num_buyers = buyers;
        self.num_sellers = sellers;
        self
    }

    pub fn with_rounds(mut self, rounds: Round, duration_seconds: Seconds) -> Self {
        self.num_rounds = rounds;
        self.round_duration_seconds = duration_seconds;
        self
    }

    pub fn with_price_range(mut self, min: Price, max: Price) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let participants = MIN_PARTICIPANTS..=MAX_PARTICIPANTS;
        if !participants.contains(&self.num_buyers) {
            return Err(ConfigError::Buyers(self.num_buyers));
        }
        if !participants.contains(&self.num_sellers) {
            return Err(ConfigError::Sellers(self.num_sellers));
        }
        if !(MIN_ROUND_SECONDS..=MAX_ROUND_SECONDS).contains(&self.round_duration_seconds) {
            return Err(ConfigError::RoundDuration(self.round_duration_seconds));
        }
        if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&self.num_rounds) {
            return Err(ConfigError::Rounds(self.num_rounds));
        }
        if self.price_min >= self.price_max {
            return Err(ConfigError::PriceRange {
                min: self.price_min,
                max: self.price_max,
            });
        }
        Ok(())
    }

    /// The weaker check the session itself applies: enough structure to run a
    /// game at all. Classroom ranges are the caller's business (see [`Self::validate`]).
    pub fn check_playable(&self) -> Result<(), ConfigError> {
        if self.num_buyers == 0 {
            return Err(ConfigError::Buyers(0));
        }
        if self.num_sellers == 0 {
            return Err(ConfigError::Sellers(0));
        }
        if self.round_duration_seconds == 0 {
            return Err(ConfigError::RoundDuration(0));
        }
        if self.num_rounds == 0 {
            return Err(ConfigError::Rounds(0));
        }
        if self.price_min >= self.price_max {
            return Err(ConfigError::PriceRange {
                min: self.price_min,
                max: self.price_max,
            });
        }
        Ok(())
    }

    /// Whether `price` lies within the configured bounds (inclusive at both ends).
    pub fn price_in_bounds(&self, price: Price) -> bool {
        (self.price_min..=self.price_max).contains(&price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let base = GameConfig::default();
        assert_eq!(
            base.with_participants(0, 4).validate(),
            Err(ConfigError::Buyers(0))
        );
        assert_eq!(
            base.with_participants(4, 11).validate(),
            Err(ConfigError::Sellers(11))
        );
        assert_eq!(
            base.with_rounds(3, 59).validate(),
            Err(ConfigError::RoundDuration(59))
        );
        assert_eq!(
            base.with_rounds(3, 1801).validate(),
            Err(ConfigError::RoundDuration(1801))
        );
        assert_eq!(base.with_rounds(0, 60).validate(), Err(ConfigError::Rounds(0)));
        assert_eq!(
            base.with_price_range(20, 20).validate(),
            Err(ConfigError::PriceRange { min: 20, max: 20 })
        );
    }

    #[test]
    fn short_rounds_are_playable_but_not_valid() {
        let quick = GameConfig::default().with_rounds(1, 5);
        assert_eq!(quick.check_playable(), Ok(()));
        assert_eq!(quick.validate(), Err(ConfigError::RoundDuration(5)));
        assert_eq!(
            GameConfig::default().with_rounds(1, 0).check_playable(),
            Err(ConfigError::RoundDuration(0))
        );
        assert!(GameConfig::default().with_price_range(5, 5).check_playable().is_err());
    }

    #[test]
    fn range_edges_are_accepted() {
        let config = GameConfig::default()
            .with_participants(1, 10)
            .with_rounds(10, 1800)
            .with_price_range(-5, -4);
        assert_eq!(config.validate(), Ok(()));
        assert!(config.price_in_bounds(-5));
        assert!(config.price_in_bounds(-4));
        assert!(!config.price_in_bounds(-3));
    }

    #[test]
    fn config_uses_camel_case_on_the_wire() {
        let json = r#"{"numBuyers":2,"numSellers":3,"roundDurationSeconds":60,"numRounds":1,"priceMin":10,"priceMax":20}"#;
        let config: GameConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config,
            GameConfig::default()
                .with_participants(2, 3)
                .with_rounds(1, 60)
                .with_price_range(10, 20)
        );
    }
}
