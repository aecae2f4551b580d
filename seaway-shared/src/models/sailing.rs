use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::accommodation::AccommodationOption;
use super::money::Money;
use super::passengers::PassengerType;
use super::vehicles::VehicleClass;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerPrice {
    pub passenger_type: PassengerType,
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehiclePrice {
    pub vehicle_class: VehicleClass,
    pub price: Money,
}

/// One scheduled voyage as reported by an operator, normalized. Immutable
/// once produced by an adapter within a single search call; the
/// reconciler works on its own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SailingResult {
    /// Globally unique across operators: "<operator>:<operator sailing id>".
    pub sailing_id: String,
    pub operator: String,
    pub departure_port: String,
    pub arrival_port: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub vessel: String,
    pub passenger_prices: Vec<PassengerPrice>,
    pub vehicle_prices: Vec<VehiclePrice>,
    pub accommodations: Vec<AccommodationOption>,
    pub available_passenger_spaces: u32,
    pub available_vehicle_spaces: u32,
    /// Opaque handle; pass back unchanged to start booking this result.
    pub booking_handle: Uuid,
}
