use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use seaway_shared::{AccommodationOption, PassengerPrice, VehiclePrice};

/// Opaque per-sailing blob cached at search time and rebuilt at booking
/// time, so create_hold never has to re-search. Stored as JSON under the
/// booking handle returned with the search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingContext {
    pub operator: String,
    pub sailing_id: String,
    /// The sailing identifier in the operator's own vocabulary.
    pub operator_sailing_code: String,
    pub departure_time: DateTime<Utc>,
    pub currency: String,
    pub passenger_prices: Vec<PassengerPrice>,
    pub vehicle_prices: Vec<VehiclePrice>,
    pub accommodations: Vec<AccommodationOption>,
}

impl BookingContext {
    pub fn cache_key(handle: Uuid) -> String {
        format!("ctx:{handle}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seaway_shared::{Money, PassengerType};

    #[test]
    fn test_context_json_round_trip() {
        let ctx = BookingContext {
            operator: "maghreb".to_string(),
            sailing_id: "maghreb:CR-881".to_string(),
            operator_sailing_code: "CR-881".to_string(),
            departure_time: Utc::now(),
            currency: "EUR".to_string(),
            passenger_prices: vec![PassengerPrice {
                passenger_type: PassengerType::Adult,
                price: Money::new(5500, "EUR"),
            }],
            vehicle_prices: vec![],
            accommodations: vec![],
        };

        let value = serde_json::to_value(&ctx).unwrap();
        let back: BookingContext = serde_json::from_value(value).unwrap();
        assert_eq!(back.operator_sailing_code, "CR-881");
        assert_eq!(back.passenger_prices[0].price.amount_minor, 5500);
    }
}
