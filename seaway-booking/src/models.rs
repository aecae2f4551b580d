use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use seaway_shared::{Money, PassengerCounts, VehicleClass};

/// Lifecycle of one operator-side hold. The absence of a record is the
/// implicit initial state; Confirmed, Released and Failed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldState {
    Held,
    Confirmed,
    Released,
    Failed,
}

impl HoldState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoldState::Held => "HELD",
            HoldState::Confirmed => "CONFIRMED",
            HoldState::Released => "RELEASED",
            HoldState::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, HoldState::Held)
    }
}

/// One hold as tracked for the duration of a checkout: the operator's
/// reference, the price snapshotted when the hold was placed, and the
/// local safety-margin expiry.
#[derive(Debug, Clone)]
pub struct BookingHold {
    pub hold_ref: String,
    pub reservation_id: Uuid,
    pub operator: String,
    pub sailing_id: String,
    pub price: Money,
    pub expires_at: DateTime<Utc>,
    pub state: HoldState,
}

/// What a caller supplies to place a hold. The handle is the opaque one
/// returned with the search result; it must come back unchanged.
#[derive(Debug, Clone)]
pub struct HoldRequest {
    pub handle: Uuid,
    pub reservation_id: Uuid,
    pub passengers: PassengerCounts,
    pub vehicle: Option<VehicleClass>,
    pub accommodation_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HoldReceipt {
    pub hold_ref: String,
    pub price: Money,
    pub expires_at: DateTime<Utc>,
}

/// Answer to a confirm attempt. Pending means the operator had not
/// reached a terminal status within the poll budget; the hold stays
/// active and the caller re-polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    Pending,
    Failed,
}
