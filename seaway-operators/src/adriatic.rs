//! Adapter for Adriatic Seaways: bearer-token auth, GET search with query
//! parameters, epoch-second timestamps, a nested price list. Same contract
//! as every other adapter once translated.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
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

pub const OPERATOR_NAME: &str = "adriatic";

pub struct AdriaticSeaways {
    base_url: String,
    token: String,
    connection: SharedConnection,
    mapping: Arc<CodeMappingService>,
    retry: RetryPolicy,
}

impl AdriaticSeaways {
    pub fn new(config: &OperatorConfig, mapping: Arc<CodeMappingService>, retry: RetryPolicy) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.api_key.clone(),
            connection: SharedConnection::new(
                OPERATOR_NAME,
                Duration::from_millis(config.timeout_ms),
            ),
            mapping,
            retry,
        }
    }

    async fn fetch_sailings(
        &self,
        params: &[(String, String)],
    ) -> Result<SailingsEnvelope, OperatorCallError> {
        self.connection
            .with(|client| async move {
                let response = client
                    .get(format!("{}/sailings", self.base_url))
                    .bearer_auth(&self.token)
                    .query(params)
                    .send()
                    .await
                    .map_err(|e| http::transport_error(OPERATOR_NAME, e))?;
                let response = http::check_status(OPERATOR_NAME, response).await?;
                response
                    .json::<SailingsEnvelope>()
                    .await
                    .map_err(|e| http::malformed_body(OPERATOR_NAME, e))
            })
            .await
    }

    async fn post_reservation(
        &self,
        body: &WireReservationRequest,
    ) -> Result<WireReservationReply, OperatorCallError> {
        self.connection
            .with(|client| async move {
                let response = client
                    .post(format!("{}/reservations", self.base_url))
                    .bearer_auth(&self.token)
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| http::transport_error(OPERATOR_NAME, e))?;
                let response = http::check_status(OPERATOR_NAME, response).await?;
                response
                    .json::<WireReservationReply>()
                    .await
                    .map_err(|e| http::malformed_body(OPERATOR_NAME, e))
            })
            .await
    }

    async fn fetch_state(
        &self,
        reference: &str,
    ) -> Result<OperatorBookingStatus, OperatorCallError> {
        self.connection
            .with(|client| async move {
                let response = client
                    .get(format!("{}/reservations/{}/state", self.base_url, reference))
                    .bearer_auth(&self.token)
                    .send()
                    .await
                    .map_err(|e| http::transport_error(OPERATOR_NAME, e))?;
                if response.status().as_u16() == 404 {
                    return Ok(OperatorBookingStatus::NotFound);
                }
                let response = http::check_status(OPERATOR_NAME, response).await?;
                let wire: WireState = response
                    .json()
                    .await
                    .map_err(|e| http::malformed_body(OPERATOR_NAME, e))?;
                Ok(match wire.state.as_str() {
                    "WAITING" => OperatorBookingStatus::Pending,
                    "OK" => OperatorBookingStatus::Confirmed,
                    "VOID" => OperatorBookingStatus::Cancelled,
                    _ => OperatorBookingStatus::Failed,
                })
            })
            .await
    }

    async fn void_reservation(
        &self,
        reference: &str,
        reason: &str,
    ) -> Result<bool, OperatorCallError> {
        let body = WireVoidRequest {
            reason: reason.to_string(),
        };
        self.connection
            .with(|client| async move {
                let response = client
                    .post(format!("{}/reservations/{}/void", self.base_url, reference))
                    .bearer_auth(&self.token)
                    .json(&body)
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

    async fn fetch_harbours(&self) -> Result<Vec<ReferenceEntry>, OperatorCallError> {
        self.connection
            .with(|client| async move {
                let response = client
                    .get(format!("{}/reference/harbours", self.base_url))
                    .bearer_auth(&self.token)
                    .send()
                    .await
                    .map_err(|e| http::transport_error(OPERATOR_NAME, e))?;
                let response = http::check_status(OPERATOR_NAME, response).await?;
                let rows: Vec<WireHarbour> = response
                    .json()
                    .await
                    .map_err(|e| http::malformed_body(OPERATOR_NAME, e))?;
                Ok(rows
                    .into_iter()
                    .map(|row| ReferenceEntry {
                        code: row.id,
                        name: row.label,
                    })
                    .collect())
            })
            .await
    }

    async fn fetch_cabin_types(&self) -> Result<Vec<ReferenceEntry>, OperatorCallError> {
        self.connection
            .with(|client| async move {
                let response = client
                    .get(format!("{}/reference/cabin-types", self.base_url))
                    .bearer_auth(&self.token)
                    .send()
                    .await
                    .map_err(|e| http::transport_error(OPERATOR_NAME, e))?;
                let response = http::check_status(OPERATOR_NAME, response).await?;
                let rows: Vec<WireHarbour> = response
                    .json()
                    .await
                    .map_err(|e| http::malformed_body(OPERATOR_NAME, e))?;
                Ok(rows
                    .into_iter()
                    .map(|row| ReferenceEntry {
                        code: row.id,
                        name: row.label,
                    })
                    .collect())
            })
            .await
    }

    fn translate(
        &self,
        sailing: WireSailing,
        request: &NormalizedOperatorSearch,
    ) -> Option<SearchHit> {
        let departure_time = match DateTime::<Utc>::from_timestamp(sailing.dep_epoch, 0) {
            Some(ts) => ts,
            None => {
                warn!(code = %sailing.code, "unparseable departure epoch, dropping sailing");
                return None;
            }
        };
        let arrival_time =
            DateTime::<Utc>::from_timestamp(sailing.arr_epoch, 0).unwrap_or(departure_time);

        let currency = sailing.prices.currency.clone();
        let passenger_prices = vec![
            PassengerPrice {
                passenger_type: PassengerType::Adult,
                price: Money::new(sailing.prices.adult, &currency),
            },
            PassengerPrice {
                passenger_type: PassengerType::Child,
                price: Money::new(sailing.prices.child, &currency),
            },
            PassengerPrice {
                passenger_type: PassengerType::Infant,
                price: Money::new(sailing.prices.infant, &currency),
            },
        ];

        let vehicle_prices: Vec<VehiclePrice> = sailing
            .prices
            .vehicles
            .iter()
            .filter_map(|(code, amount)| {
                vehicles::vehicle_class_for_code(OPERATOR_NAME, code).map(|class| VehiclePrice {
                    vehicle_class: class,
                    price: Money::new(*amount, &currency),
                })
            })
            .collect();

        let accommodation_options: Vec<AccommodationOption> = sailing
            .cabins
            .iter()
            .map(|cabin| AccommodationOption {
                category: accommodations::fold(OPERATOR_NAME, &cabin.id, &cabin.name),
                operator_code: cabin.id.clone(),
                label: cabin.name.clone(),
                price: Money::new(cabin.fee, &currency),
                available: cabin.free,
                capacity: cabin.sleeps,
            })
            .collect();

        let sailing_id = format!("{OPERATOR_NAME}:{}", sailing.code);
        let result = SailingResult {
            sailing_id: sailing_id.clone(),
            operator: OPERATOR_NAME.to_string(),
            departure_port: request.departure.clone(),
            arrival_port: request.arrival.clone(),
            departure_time,
            arrival_time,
            vessel: sailing.ship,
            passenger_prices: passenger_prices.clone(),
            vehicle_prices: vehicle_prices.clone(),
            accommodations: accommodation_options.clone(),
            available_passenger_spaces: sailing.pax_left,
            available_vehicle_spaces: sailing.veh_left,
            booking_handle: Uuid::new_v4(),
        };
        let context = BookingContext {
            operator: OPERATOR_NAME.to_string(),
            sailing_id,
            operator_sailing_code: sailing.code,
            departure_time,
            currency,
            passenger_prices,
            vehicle_prices,
            accommodations: accommodation_options,
        };
        Some(SearchHit { result, context })
    }
}

#[async_trait]
impl OperatorAdapter for AdriaticSeaways {
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

        let mut params = vec![
            ("from".to_string(), from),
            ("to".to_string(), to),
            ("date".to_string(), request.date.format("%Y%m%d").to_string()),
            ("pax".to_string(), request.passengers.total().to_string()),
        ];
        for vehicle in &request.vehicles {
            if let Some(code) = vehicles::operator_vehicle_code(OPERATOR_NAME, *vehicle) {
                params.push(("veh".to_string(), code.to_string()));
            }
        }

        let envelope = self
            .retry
            .run(OPERATOR_NAME, || self.fetch_sailings(&params))
            .await?;
        Ok(envelope
            .sailings
            .into_iter()
            .filter_map(|sailing| self.translate(sailing, request))
            .collect())
    }

    async fn create_booking(
        &self,
        request: &OperatorBookingRequest,
    ) -> Result<OperatorConfirmation, OperatorCallError> {
        let body = WireReservationRequest {
            sailing: request.sailing_code.clone(),
            pax: request.passengers.total(),
            vehicle: request
                .vehicle
                .and_then(|v| vehicles::operator_vehicle_code(OPERATOR_NAME, v))
                .map(String::from),
            cabin_type: request.accommodation_code.clone(),
        };
        let reply = self
            .retry
            .run(OPERATOR_NAME, || self.post_reservation(&body))
            .await?;
        let expires_at = DateTime::<Utc>::from_timestamp(reply.valid_until_epoch, 0)
            .unwrap_or_else(|| Utc::now() + chrono::Duration::minutes(15));
        Ok(OperatorConfirmation {
            reference: reply.locator,
            price: Money::new(reply.total, &reply.currency),
            expires_at,
        })
    }

    async fn get_status(
        &self,
        reference: &str,
    ) -> Result<OperatorBookingStatus, OperatorCallError> {
        self.retry
            .run(OPERATOR_NAME, || self.fetch_state(reference))
            .await
    }

    async fn cancel(&self, reference: &str, reason: &str) -> Result<bool, OperatorCallError> {
        self.retry
            .run(OPERATOR_NAME, || self.void_reservation(reference, reason))
            .await
    }

    async fn health_check(&self) -> bool {
        let probe = self
            .connection
            .with(|client| async move {
                let response = client
                    .get(format!("{}/ping", self.base_url))
                    .bearer_auth(&self.token)
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
            .run(OPERATOR_NAME, || self.fetch_harbours())
            .await
    }

    async fn list_accommodations(&self) -> Result<Vec<ReferenceEntry>, OperatorCallError> {
        self.retry
            .run(OPERATOR_NAME, || self.fetch_cabin_types())
            .await
    }
}

#[derive(Debug, Deserialize)]
struct SailingsEnvelope {
    sailings: Vec<WireSailing>,
}

#[derive(Debug, Deserialize)]
struct WireSailing {
    code: String,
    ship: String,
    dep_epoch: i64,
    arr_epoch: i64,
    pax_left: u32,
    veh_left: u32,
    prices: WirePrices,
    #[serde(default)]
    cabins: Vec<WireCabinRow>,
}

#[derive(Debug, Deserialize)]
struct WirePrices {
    currency: String,
    adult: i64,
    child: i64,
    infant: i64,
    #[serde(default)]
    vehicles: HashMap<String, i64>,
}

#[derive(Debug, Deserialize)]
struct WireCabinRow {
    id: String,
    name: String,
    fee: i64,
    free: u32,
    sleeps: u32,
}

#[derive(Debug, Serialize)]
struct WireReservationRequest {
    sailing: String,
    pax: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    vehicle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cabin_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireReservationReply {
    locator: String,
    total: i64,
    currency: String,
    valid_until_epoch: i64,
}

#[derive(Debug, Deserialize)]
struct WireState {
    state: String,
}

#[derive(Debug, Serialize)]
struct WireVoidRequest {
    reason: String,
}

#[derive(Debug, Deserialize)]
struct WireHarbour {
    id: String,
    label: String,
}
