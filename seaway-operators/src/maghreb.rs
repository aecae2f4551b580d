//! Adapter for Maghreb Ferries Line: JSON REST, API-key header, ISO-8601
//! timestamps, prices in cents.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use seaway_core::context::BookingContext;
use seaway_core::error::OperatorCallError;
use seaway_core::operator::{
    NormalizedOperatorSearch, OperatorAdapter, OperatorBookingRequest, OperatorBookingStatus,
    OperatorConfirmation, ReferenceEntry, SearchHit,
};
use seaway_core::retry::RetryPolicy;
use seaway_mapping::service::{CodeMappingService, PortMapping};
use seaway_mapping::{accommodations, vehicles};
use seaway_shared::{
    AccommodationOption, Money, PassengerPrice, PassengerType, SailingResult, VehiclePrice,
};
use seaway_store::app_config::OperatorConfig;

use crate::connection::SharedConnection;
use crate::http;

pub const OPERATOR_NAME: &str = "maghreb";

pub struct MaghrebFerries {
    base_url: String,
    api_key: String,
    connection: SharedConnection,
    mapping: Arc<CodeMappingService>,
    retry: RetryPolicy,
}

impl MaghrebFerries {
    pub fn new(config: &OperatorConfig, mapping: Arc<CodeMappingService>, retry: RetryPolicy) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            connection: SharedConnection::new(
                OPERATOR_NAME,
                Duration::from_millis(config.timeout_ms),
            ),
            mapping,
            retry,
        }
    }

    async fn fetch_crossings(
        &self,
        query: &CrossingQuery,
    ) -> Result<CrossingResponse, OperatorCallError> {
        self.connection
            .with(|client| async move {
                let response = client
                    .post(format!("{}/v1/crossings/search", self.base_url))
                    .header("X-Api-Key", &self.api_key)
                    .json(query)
                    .send()
                    .await
                    .map_err(|e| http::transport_error(OPERATOR_NAME, e))?;
                let response = http::check_status(OPERATOR_NAME, response).await?;
                response
                    .json::<CrossingResponse>()
                    .await
                    .map_err(|e| http::malformed_body(OPERATOR_NAME, e))
            })
            .await
    }

    async fn post_booking(
        &self,
        body: &WireBookingRequest,
    ) -> Result<WireBookingReply, OperatorCallError> {
        self.connection
            .with(|client| async move {
                let response = client
                    .post(format!("{}/v1/bookings", self.base_url))
                    .header("X-Api-Key", &self.api_key)
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| http::transport_error(OPERATOR_NAME, e))?;
                let response = http::check_status(OPERATOR_NAME, response).await?;
                response
                    .json::<WireBookingReply>()
                    .await
                    .map_err(|e| http::malformed_body(OPERATOR_NAME, e))
            })
            .await
    }

    async fn fetch_status(
        &self,
        reference: &str,
    ) -> Result<OperatorBookingStatus, OperatorCallError> {
        self.connection
            .with(|client| async move {
                let response = client
                    .get(format!("{}/v1/bookings/{}", self.base_url, reference))
                    .header("X-Api-Key", &self.api_key)
                    .send()
                    .await
                    .map_err(|e| http::transport_error(OPERATOR_NAME, e))?;
                if response.status().as_u16() == 404 {
                    return Ok(OperatorBookingStatus::NotFound);
                }
                let response = http::check_status(OPERATOR_NAME, response).await?;
                let wire: WireStatus = response
                    .json()
                    .await
                    .map_err(|e| http::malformed_body(OPERATOR_NAME, e))?;
                Ok(match wire.status.as_str() {
                    "PENDING" => OperatorBookingStatus::Pending,
                    "CONFIRMED" => OperatorBookingStatus::Confirmed,
                    "CANCELLED" => OperatorBookingStatus::Cancelled,
                    _ => OperatorBookingStatus::Failed,
                })
            })
            .await
    }

    async fn delete_booking(
        &self,
        reference: &str,
        reason: &str,
    ) -> Result<bool, OperatorCallError> {
        self.connection
            .with(|client| async move {
                let response = client
                    .delete(format!("{}/v1/bookings/{}", self.base_url, reference))
                    .header("X-Api-Key", &self.api_key)
                    .query(&[("reason", reason)])
                    .send()
                    .await
                    .map_err(|e| http::transport_error(OPERATOR_NAME, e))?;
                if response.status().as_u16() == 404 {
                    return Ok(false);
                }
                http::check_status(OPERATOR_NAME, response).await?;
                Ok(true)
            })
            .await
    }

    async fn fetch_reference(
        &self,
        path: &str,
    ) -> Result<Vec<ReferenceEntry>, OperatorCallError> {
        self.connection
            .with(|client| async move {
                let response = client
                    .get(format!("{}{}", self.base_url, path))
                    .header("X-Api-Key", &self.api_key)
                    .send()
                    .await
                    .map_err(|e| http::transport_error(OPERATOR_NAME, e))?;
                let response = http::check_status(OPERATOR_NAME, response).await?;
                let rows: Vec<WireReferenceRow> = response
                    .json()
                    .await
                    .map_err(|e| http::malformed_body(OPERATOR_NAME, e))?;
                Ok(rows
                    .into_iter()
                    .map(|row| ReferenceEntry {
                        code: row.code,
                        name: row.name,
                    })
                    .collect())
            })
            .await
    }

    fn translate(&self, crossing: WireCrossing, request: &NormalizedOperatorSearch) -> SearchHit {
        let currency = crossing
            .fares
            .first()
            .map(|f| f.currency.clone())
            .unwrap_or_else(|| "EUR".to_string());

        let passenger_prices: Vec<PassengerPrice> = crossing
            .fares
            .iter()
            .filter_map(|fare| {
                let passenger_type = match fare.kind.as_str() {
                    "ADULT" => PassengerType::Adult,
                    "CHILD" => PassengerType::Child,
                    "INFANT" => PassengerType::Infant,
                    _ => return None,
                };
                Some(PassengerPrice {
                    passenger_type,
                    price: Money::new(fare.amount_cents, &fare.currency),
                })
            })
            .collect();

        let vehicle_prices: Vec<VehiclePrice> = crossing
            .vehicle_fares
            .iter()
            .filter_map(|fare| {
                vehicles::vehicle_class_for_code(OPERATOR_NAME, &fare.code).map(|class| {
                    VehiclePrice {
                        vehicle_class: class,
                        price: Money::new(fare.amount_cents, &fare.currency),
                    }
                })
            })
            .collect();

        let accommodation_options: Vec<AccommodationOption> = crossing
            .cabins
            .iter()
            .map(|cabin| AccommodationOption {
                category: accommodations::fold(OPERATOR_NAME, &cabin.code, &cabin.label),
                operator_code: cabin.code.clone(),
                label: cabin.label.clone(),
                price: Money::new(cabin.amount_cents, &cabin.currency),
                available: cabin.left,
                capacity: cabin.berths,
            })
            .collect();

        let sailing_id = format!("{OPERATOR_NAME}:{}", crossing.id);
        let result = SailingResult {
            sailing_id: sailing_id.clone(),
            operator: OPERATOR_NAME.to_string(),
            departure_port: request.departure.clone(),
            arrival_port: request.arrival.clone(),
            departure_time: crossing.departure,
            arrival_time: crossing.arrival,
            vessel: crossing.vessel,
            passenger_prices: passenger_prices.clone(),
            vehicle_prices: vehicle_prices.clone(),
            accommodations: accommodation_options.clone(),
            available_passenger_spaces: crossing.seats_left,
            available_vehicle_spaces: crossing.vehicle_slots_left,
            booking_handle: Uuid::new_v4(),
        };
        let context = BookingContext {
            operator: OPERATOR_NAME.to_string(),
            sailing_id,
            operator_sailing_code: crossing.id,
            departure_time: crossing.departure,
            currency,
            passenger_prices,
            vehicle_prices,
            accommodations: accommodation_options,
        };
        SearchHit { result, context }
    }
}

#[async_trait]
impl OperatorAdapter for MaghrebFerries {
    fn name(&self) -> &str {
        OPERATOR_NAME
    }

    async fn search(
        &self,
        request: &NormalizedOperatorSearch,
    ) -> Result<Vec<SearchHit>, OperatorCallError> {
        let from = match self.mapping.operator_port_code(self, &request.departure).await? {
            PortMapping::Code(code) => code,
            other => {
                debug!(port = %request.departure, ?other, "departure not serviceable, skipping");
                return Ok(vec![]);
            }
        };
        let to = match self.mapping.operator_port_code(self, &request.arrival).await? {
            PortMapping::Code(code) => code,
            other => {
                debug!(port = %request.arrival, ?other, "arrival not serviceable, skipping");
                return Ok(vec![]);
            }
        };

        let query = CrossingQuery {
            from,
            to,
            date: request.date.format("%Y-%m-%d").to_string(),
            adults: request.passengers.adults,
            children: request.passengers.children,
            infants: request.passengers.infants,
            vehicles: request
                .vehicles
                .iter()
                .filter_map(|v| vehicles::operator_vehicle_code(OPERATOR_NAME, *v))
                .map(String::from)
                .collect(),
        };

        let response = self
            .retry
            .run(OPERATOR_NAME, || self.fetch_crossings(&query))
            .await?;
        Ok(response
            .crossings
            .into_iter()
            .map(|crossing| self.translate(crossing, request))
            .collect())
    }

    async fn create_booking(
        &self,
        request: &OperatorBookingRequest,
    ) -> Result<OperatorConfirmation, OperatorCallError> {
        let body = WireBookingRequest {
            crossing_id: request.sailing_code.clone(),
            adults: request.passengers.adults,
            children: request.passengers.children,
            infants: request.passengers.infants,
            vehicle: request
                .vehicle
                .and_then(|v| vehicles::operator_vehicle_code(OPERATOR_NAME, v))
                .map(String::from),
            cabin: request.accommodation_code.clone(),
        };
        let reply = self
            .retry
            .run(OPERATOR_NAME, || self.post_booking(&body))
            .await?;
        Ok(OperatorConfirmation {
            reference: reply.reference,
            price: Money::new(reply.total_cents, &reply.currency),
            expires_at: reply.hold_expires_at,
        })
    }

    async fn get_status(
        &self,
        reference: &str,
    ) -> Result<OperatorBookingStatus, OperatorCallError> {
        self.retry
            .run(OPERATOR_NAME, || self.fetch_status(reference))
            .await
    }

    async fn cancel(&self, reference: &str, reason: &str) -> Result<bool, OperatorCallError> {
        self.retry
            .run(OPERATOR_NAME, || self.delete_booking(reference, reason))
            .await
    }

    async fn health_check(&self) -> bool {
        let probe = self
            .connection
            .with(|client| async move {
                let response = client
                    .get(format!("{}/v1/health", self.base_url))
                    .header("X-Api-Key", &self.api_key)
                    .send()
                    .await
                    .map_err(|e| http::transport_error(OPERATOR_NAME, e))?;
                Ok(response.status().is_success())
            })
            .await;
        probe.unwrap_or(false)
    }

    async fn list_ports(&self) -> Result<Vec<ReferenceEntry>, OperatorCallError> {
        self.retry
            .run(OPERATOR_NAME, || self.fetch_reference("/v1/reference/ports"))
            .await
    }

    async fn list_accommodations(&self) -> Result<Vec<ReferenceEntry>, OperatorCallError> {
        self.retry
            .run(OPERATOR_NAME, || self.fetch_reference("/v1/reference/cabins"))
            .await
    }
}

#[derive(Debug, Serialize)]
struct CrossingQuery {
    from: String,
    to: String,
    date: String,
    adults: u32,
    children: u32,
    infants: u32,
    vehicles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CrossingResponse {
    crossings: Vec<WireCrossing>,
}

#[derive(Debug, Deserialize)]
struct WireCrossing {
    id: String,
    vessel: String,
    departure: DateTime<Utc>,
    arrival: DateTime<Utc>,
    seats_left: u32,
    vehicle_slots_left: u32,
    #[serde(default)]
    fares: Vec<WireFare>,
    #[serde(default)]
    vehicle_fares: Vec<WireVehicleFare>,
    #[serde(default)]
    cabins: Vec<WireCabin>,
}

#[derive(Debug, Deserialize)]
struct WireFare {
    kind: String,
    amount_cents: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct WireVehicleFare {
    code: String,
    amount_cents: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct WireCabin {
    code: String,
    label: String,
    amount_cents: i64,
    currency: String,
    left: u32,
    berths: u32,
}

#[derive(Debug, Serialize)]
struct WireBookingRequest {
    crossing_id: String,
    adults: u32,
    children: u32,
    infants: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    vehicle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cabin: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireBookingReply {
    reference: String,
    total_cents: i64,
    currency: String,
    hold_expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct WireStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
struct WireReferenceRow {
    code: String,
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_crossing_wire_decoding() {
        let payload = json!({
            "crossings": [{
                "id": "CR-881",
                "vessel": "Carthage",
                "departure": "2025-06-01T08:00:00Z",
                "arrival": "2025-06-01T20:30:00Z",
                "seats_left": 412,
                "vehicle_slots_left": 60,
                "fares": [
                    { "kind": "ADULT", "amount_cents": 5500, "currency": "EUR" },
                    { "kind": "CHILD", "amount_cents": 2750, "currency": "EUR" }
                ],
                "vehicle_fares": [
                    { "code": "CAR", "amount_cents": 9000, "currency": "EUR" }
                ],
                "cabins": [
                    { "code": "C2EX", "label": "2-berth outside cabin", "amount_cents": 4000,
                      "currency": "EUR", "left": 12, "berths": 2 }
                ]
            }]
        });
        let decoded: CrossingResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(decoded.crossings.len(), 1);
        assert_eq!(decoded.crossings[0].fares[0].amount_cents, 5500);
    }

    #[test]
    fn test_translate_folds_codes_and_builds_context() {
        let adapter = MaghrebFerries::new(
            &OperatorConfig {
                base_url: "https://api.example".to_string(),
                api_key: "k".to_string(),
                timeout_ms: 1000,
                enabled: true,
            },
            Arc::new(CodeMappingService::new(Duration::from_secs(86400))),
            RetryPolicy::default(),
        );
        let request = NormalizedOperatorSearch {
            departure: "TUN".to_string(),
            arrival: "MRS".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            passengers: seaway_shared::PassengerCounts::adults_only(2),
            vehicles: vec![],
        };
        let crossing = WireCrossing {
            id: "CR-881".to_string(),
            vessel: "Carthage".to_string(),
            departure: Utc::now(),
            arrival: Utc::now(),
            seats_left: 10,
            vehicle_slots_left: 4,
            fares: vec![WireFare {
                kind: "ADULT".to_string(),
                amount_cents: 5500,
                currency: "EUR".to_string(),
            }],
            vehicle_fares: vec![WireVehicleFare {
                code: "MOTO".to_string(),
                amount_cents: 2000,
                currency: "EUR".to_string(),
            }],
            cabins: vec![WireCabin {
                code: "XPET".to_string(),
                label: "Pet cabin with window".to_string(),
                amount_cents: 6000,
                currency: "EUR".to_string(),
                left: 2,
                berths: 2,
            }],
        };

        let hit = adapter.translate(crossing, &request);
        assert_eq!(hit.result.sailing_id, "maghreb:CR-881");
        assert_eq!(hit.result.departure_port, "TUN");
        assert_eq!(
            hit.result.vehicle_prices[0].vehicle_class,
            seaway_shared::VehicleClass::Motorcycle
        );
        // Keyword precedence: pet wins over the window mention.
        assert_eq!(
            hit.result.accommodations[0].category,
            seaway_shared::AccommodationCategory::Pet
        );
        assert_eq!(hit.context.operator_sailing_code, "CR-881");
        assert_eq!(hit.context.passenger_prices[0].price.amount_minor, 5500);
    }
}
