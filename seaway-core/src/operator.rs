use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use seaway_shared::{Money, PassengerCounts, SailingResult, VehicleClass};

use crate::context::BookingContext;
use crate::error::OperatorCallError;

/// The search an adapter receives: internal port codes, already validated.
/// The adapter translates codes to its operator's vocabulary via the
/// mapping service.
#[derive(Debug, Clone)]
pub struct NormalizedOperatorSearch {
    pub departure: String,
    pub arrival: String,
    pub date: NaiveDate,
    pub passengers: PassengerCounts,
    pub vehicles: Vec<VehicleClass>,
}

/// Everything an operator needs to place a hold on one sailing, in its own
/// vocabulary (rebuilt from the cached BookingContext, never re-searched).
#[derive(Debug, Clone)]
pub struct OperatorBookingRequest {
    pub sailing_code: String,
    pub departure_time: DateTime<Utc>,
    pub passengers: PassengerCounts,
    pub vehicle: Option<VehicleClass>,
    pub accommodation_code: Option<String>,
}

/// The operator's answer to a hold request: their reference, the price
/// they actually committed to, and when the hold lapses on their side.
#[derive(Debug, Clone)]
pub struct OperatorConfirmation {
    pub reference: String,
    pub price: Money,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorBookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Failed,
    NotFound,
}

/// One row of an operator's static reference data (ports, accommodations).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub code: String,
    pub name: String,
}

/// A search result paired with the context blob booking needs later. The
/// orchestrator caches the context under the result's booking handle.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub result: SailingResult,
    pub context: BookingContext,
}

/// One implementation per operator, registered by name in the adapter
/// registry at startup. All calls are wrapped in the retry policy by the
/// implementation itself.
#[async_trait]
pub trait OperatorAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn search(
        &self,
        request: &NormalizedOperatorSearch,
    ) -> Result<Vec<SearchHit>, OperatorCallError>;

    async fn create_booking(
        &self,
        request: &OperatorBookingRequest,
    ) -> Result<OperatorConfirmation, OperatorCallError>;

    async fn get_status(&self, reference: &str)
        -> Result<OperatorBookingStatus, OperatorCallError>;

    /// Returns Ok(true) when the operator cancelled the booking, Ok(false)
    /// when it no longer knows the reference.
    async fn cancel(&self, reference: &str, reason: &str) -> Result<bool, OperatorCallError>;

    async fn health_check(&self) -> bool;

    async fn list_ports(&self) -> Result<Vec<ReferenceEntry>, OperatorCallError>;

    async fn list_accommodations(&self) -> Result<Vec<ReferenceEntry>, OperatorCallError>;
}
