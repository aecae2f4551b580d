use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassengerType {
    Adult,
    Child,
    Infant,
}

/// Normalized passenger counts for one search or booking.
/// Counts are unsigned; the "adults >= 1" rule is enforced at validation
/// time in the search layer, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassengerCounts {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl PassengerCounts {
    pub fn adults_only(adults: u32) -> Self {
        Self {
            adults,
            children: 0,
            infants: 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.adults + self.children + self.infants
    }

    /// Infants typically do not occupy a deck space or seat.
    pub fn occupying_spaces(&self) -> u32 {
        self.adults + self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let counts = PassengerCounts {
            adults: 2,
            children: 1,
            infants: 1,
        };
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.occupying_spaces(), 3);
    }
}
