//! Support card types and favor levels
//!
//! A training screen shows up to five support cards in a column on the right.
//! Each card has a type (which stat it trains), a favor level shown as a
//! colored gauge, and an optional event marker.

use serde::{Deserialize, Serialize};

/// The stat a support card specializes in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    /// Icon did not match any reference template
    Unknown,
    Speed,
    Stamina,
    Power,
    Will,
    Intelligence,
    /// Friend cards train no specific stat
    Friend,
}

impl CardType {
    /// Order in which type templates are tried; the first match wins.
    pub const MATCH_PRIORITY: [CardType; 6] = [
        CardType::Speed,
        CardType::Stamina,
        CardType::Power,
        CardType::Will,
        CardType::Intelligence,
        CardType::Friend,
    ];

    /// Lowercase name, also used as the template file stem by the CLI
    pub fn name(&self) -> &'static str {
        match self {
            CardType::Unknown => "unknown",
            CardType::Speed => "speed",
            CardType::Stamina => "stamina",
            CardType::Power => "power",
            CardType::Will => "will",
            CardType::Intelligence => "intelligence",
            CardType::Friend => "friend",
        }
    }
}

/// Favor (friendship gauge) level of a support card
///
/// Ordered so that a higher level compares greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FavorLevel {
    /// Gauge color not recognized; the slot is treated as empty
    Unknown,
    /// Blue gauge (or grey while the gauge is still empty)
    Level1,
    /// Green gauge
    Level2,
    /// Orange gauge
    Level3,
    /// Yellow gauge, friendship training available
    Level4,
}

impl FavorLevel {
    pub fn is_known(&self) -> bool {
        *self != FavorLevel::Unknown
    }
}

/// A support card recognized in one of the on-screen slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportCardSlot {
    /// Recognized card type, `Unknown` if no template matched
    pub card_type: CardType,
    /// Favor level, never `Unknown` for a reported slot
    pub favor: FavorLevel,
    /// Whether the card shows the event marker
    pub has_event: bool,
    /// Physical slot index (0 = top). Reported slots may skip indices.
    pub position: usize,
}

impl SupportCardSlot {
    pub fn new(card_type: CardType, favor: FavorLevel, has_event: bool, position: usize) -> Self {
        Self {
            card_type,
            favor,
            has_event,
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_priority_order() {
        assert_eq!(CardType::MATCH_PRIORITY[0], CardType::Speed);
        assert_eq!(CardType::MATCH_PRIORITY[5], CardType::Friend);
        assert!(!CardType::MATCH_PRIORITY.contains(&CardType::Unknown));
    }

    #[test]
    fn test_favor_ordering() {
        assert!(FavorLevel::Level4 > FavorLevel::Level3);
        assert!(FavorLevel::Level1 > FavorLevel::Unknown);
        assert!(!FavorLevel::Unknown.is_known());
        assert!(FavorLevel::Level4.is_known());
    }

    #[test]
    fn test_slot_serializes() {
        let slot = SupportCardSlot::new(CardType::Will, FavorLevel::Level2, true, 3);
        let json = serde_json::to_string(&slot).unwrap();
        assert!(json.contains("\"card_type\":\"Will\""));
        assert!(json.contains("\"has_event\":true"));
    }
}
