use serde::{Deserialize, Serialize};

/// Internal closed set of vehicle classes. Operator-specific vehicle
/// vocabularies are folded into these by the mapping service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleClass {
    Car,
    Van,
    Motorcycle,
    Bicycle,
    Camper,
    Trailer,
}

impl VehicleClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Car => "CAR",
            VehicleClass::Van => "VAN",
            VehicleClass::Motorcycle => "MOTORCYCLE",
            VehicleClass::Bicycle => "BICYCLE",
            VehicleClass::Camper => "CAMPER",
            VehicleClass::Trailer => "TRAILER",
        }
    }
}
