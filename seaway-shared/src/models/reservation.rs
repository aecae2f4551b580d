use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a locally-tracked reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Held,
    Confirmed,
    Released,
    Failed,
}

impl ReservationStatus {
    /// Held and Confirmed reservations still occupy upstream inventory
    /// that the operator may not have accounted for yet.
    pub fn occupies_inventory(&self) -> bool {
        matches!(self, ReservationStatus::Held | ReservationStatus::Confirmed)
    }
}

/// Hold expiry margins differ by reservation kind (vehicle bookings get a
/// longer window), so the kind travels with the reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationKind {
    Standard,
    Vehicle,
}

/// The slice of a reservation record the aggregation core needs: enough
/// to subtract local demand from operator-reported capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalReservation {
    pub id: Uuid,
    pub sailing_id: String,
    pub status: ReservationStatus,
    pub kind: ReservationKind,
    pub passengers: u32,
    pub vehicles: u32,
    pub cabins: u32,
}
