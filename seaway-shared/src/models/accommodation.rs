use serde::{Deserialize, Serialize};

use super::money::Money;

/// Closed category set that dozens of operator-specific accommodation
/// labels fold into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccommodationCategory {
    Deck,
    Interior,
    Exterior,
    SharedBerth,
    Pet,
    Balcony,
    Suite,
}

impl AccommodationCategory {
    /// Deck passage is open space, not a bookable cabin; the availability
    /// reconciler only adjusts cabin categories.
    pub fn is_cabin(&self) -> bool {
        !matches!(self, AccommodationCategory::Deck)
    }
}

/// One bookable accommodation option aboard a sailing, already translated
/// into the internal category set. `operator_code` is kept so booking can
/// hand the operator back its own vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccommodationOption {
    pub category: AccommodationCategory,
    pub operator_code: String,
    pub label: String,
    pub price: Money,
    pub available: u32,
    pub capacity: u32,
}
