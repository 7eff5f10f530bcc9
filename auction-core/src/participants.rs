// Participant registry: buyers and sellers with private reservation prices

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::types::{ParticipantId, Price, Role, TradeId};

// === PARTICIPANT ===

/// A buyer or seller. The reservation price is the most a buyer will pay or
/// the least a seller will accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub role: Role,
    pub display_name: String,
    pub reservation_price: Price,
    /// Trades this participant took part in, in admission order.
    /// Resolved against the trade log; the log owns the records.
    pub trade_history: Vec<TradeId>,
}

impl Participant {
    pub fn new(id: ParticipantId, reservation_price: Price) -> Self {
        Self {
            id,
            role: id.role,
            display_name: id.display_name(),
            reservation_price,
            trade_history: Vec::new(),
        }
    }

    pub fn trade_count(&self) -> usize {
        self.trade_history.len()
    }
}

// === REGISTRY ===

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRegistry {
    pub buyers: Vec<Participant>,
    pub sellers: Vec<Participant>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh population for `config`, replacing everything held before.
    ///
    /// Reservation prices are uniform on `[price_min, price_max)`: `price_max`
    /// itself is never drawn.
    pub fn initialize<R: Rng>(&mut self, config: &GameConfig, rng: &mut R) {
        self.buyers = (1..=config.num_buyers)
            .map(|i| Participant::new(ParticipantId::buyer(i), draw_reservation(config, rng)))
            .collect();
        self.sellers = (1..=config.num_sellers)
            .map(|i| Participant::new(ParticipantId::seller(i), draw_reservation(config, rng)))
            .collect();
    }

    pub fn clear(&mut self) {
        self.buyers.clear();
        self.sellers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.buyers.is_empty() && self.sellers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buyers.len() + self.sellers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.buyers.iter().chain(self.sellers.iter())
    }

    /// Look up a participant of either role.
    pub fn find_by_id(&self, id: ParticipantId) -> Option<&Participant> {
        self.slot(id.role).iter().find(|p| p.id == id)
    }

    /// Look up a buyer by its string id. Seller ids never match.
    pub fn buyer(&self, id: &str) -> Option<&Participant> {
        self.find_in_role(Role::Buyer, id)
    }

    /// Look up a seller by its string id. Buyer ids never match.
    pub fn seller(&self, id: &str) -> Option<&Participant> {
        self.find_in_role(Role::Seller, id)
    }

    /// Append `trade` to the histories of both parties. Returns false if
    /// either id is unknown, in which case nothing is modified.
    pub fn record_trade(&mut self, buyer: ParticipantId, seller: ParticipantId, trade: TradeId) -> bool {
        if self.find_by_id(buyer).is_none() || self.find_by_id(seller).is_none() {
            return false;
        }
        for id in [buyer, seller] {
            if let Some(p) = self.slot_mut(id.role).iter_mut().find(|p| p.id == id) {
                p.trade_history.push(trade);
            }
        }
        true
    }

    fn find_in_role(&self, role: Role, id: &str) -> Option<&Participant> {
        let id: ParticipantId = id.parse().ok()?;
        if id.role != role {
            return None;
        }
        self.find_by_id(id)
    }

    fn slot(&self, role: Role) -> &[Participant] {
        match role {
            Role::Buyer => &self.buyers,
            Role::Seller => &self.sellers,
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut Vec<Participant> {
        match role {
            Role::Buyer => &mut self.buyers,
            Role::Seller => &mut self.sellers,
        }
    }
}

fn draw_reservation<R: Rng>(config: &GameConfig, rng: &mut R) -> Price {
    rng.random_range(config.price_min..config.price_max)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn config() -> GameConfig {
        GameConfig::default()
            .with_participants(3, 2)
            .with_price_range(10, 20)
    }

    #[test]
    fn initialize_builds_sequential_ids_and_names() {
        let mut registry = ParticipantRegistry::new();
        registry.initialize(&config(), &mut StdRng::seed_from_u64(7));

        let buyer_ids: Vec<String> = registry.buyers.iter().map(|p| p.id.to_string()).collect();
        let seller_ids: Vec<String> = registry.sellers.iter().map(|p| p.id.to_string()).collect();
        assert_eq!(buyer_ids, ["buyer-1", "buyer-2", "buyer-3"]);
        assert_eq!(seller_ids, ["seller-1", "seller-2"]);
        assert_eq!(registry.sellers[1].display_name, "Seller 2");
        assert!(registry.iter().all(|p| p.trade_history.is_empty()));
    }

    #[test]
    fn reinitialize_replaces_prior_population() {
        let mut registry = ParticipantRegistry::new();
        let mut rng = StdRng::seed_from_u64(1);
        registry.initialize(&config(), &mut rng);
        registry.record_trade(ParticipantId::buyer(1), ParticipantId::seller(1), TradeId::new(1));

        registry.initialize(&config().with_participants(1, 1), &mut rng);
        assert_eq!(registry.len(), 2);
        assert!(registry.iter().all(|p| p.trade_history.is_empty()));
    }

    #[test]
    fn role_scoped_lookup_rejects_wrong_role() {
        let mut registry = ParticipantRegistry::new();
        registry.initialize(&config(), &mut StdRng::seed_from_u64(3));

        assert!(registry.buyer("buyer-2").is_some());
        assert!(registry.buyer("seller-1").is_none());
        assert!(registry.seller("buyer-1").is_none());
        assert!(registry.seller("seller-3").is_none());
        assert!(registry.seller("nonsense").is_none());
        assert!(registry.buyer("buyer-02").is_none());
        assert!(registry.seller("seller-+1").is_none());
    }

    #[test]
    fn record_trade_is_all_or_nothing() {
        let mut registry = ParticipantRegistry::new();
        registry.initialize(&config(), &mut StdRng::seed_from_u64(5));

        assert!(!registry.record_trade(ParticipantId::buyer(1), ParticipantId::seller(9), TradeId::new(1)));
        assert!(registry.iter().all(|p| p.trade_history.is_empty()));

        assert!(registry.record_trade(ParticipantId::buyer(2), ParticipantId::seller(1), TradeId::new(1)));
        assert_eq!(registry.buyers[1].trade_history, vec![TradeId::new(1)]);
        assert_eq!(registry.sellers[0].trade_count(), 1);
        assert_eq!(registry.buyers[0].trade_count(), 0);
    }

    #[test]
    fn narrow_range_never_draws_the_maximum() {
        let narrow = config().with_price_range(10, 11);
        let mut registry = ParticipantRegistry::new();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            registry.initialize(&narrow, &mut rng);
            assert!(registry.iter().all(|p| p.reservation_price == 10));
        }
    }
}
