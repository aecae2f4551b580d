use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use seaway_core::context::BookingContext;
use seaway_core::error::BookingError;
use seaway_core::operator::{OperatorAdapter, OperatorBookingRequest, OperatorBookingStatus};
use seaway_operators::OperatorRegistry;
use seaway_shared::{LocalReservation, Money, ReservationKind, ReservationStatus};
use seaway_store::app_config::{BookingConfig, HoldMargins};
use seaway_store::cache::CacheStore;
use seaway_store::reservations::ReservationStore;

use crate::models::{BookingHold, ConfirmOutcome, HoldReceipt, HoldRequest, HoldState};

/// Runs the hold lifecycle against the operators: place a hold from a
/// cached booking context, confirm it at the snapshotted price, release
/// it, and sweep expired holds. Owns the hold records for the duration
/// of checkout; the reservation store keeps the durable lifecycle state.
pub struct BookingOrchestrator {
    registry: Arc<OperatorRegistry>,
    cache: Arc<dyn CacheStore>,
    reservations: Arc<dyn ReservationStore>,
    poll_attempts: u32,
    poll_delay: Duration,
    hold_margins: HoldMargins,
    holds: RwLock<HashMap<String, BookingHold>>,
    /// Reservation ids with a create_hold currently in flight. Guards the
    /// window between the duplicate check and the hold record landing.
    inflight: Mutex<HashSet<Uuid>>,
}

impl BookingOrchestrator {
    pub fn new(
        registry: Arc<OperatorRegistry>,
        cache: Arc<dyn CacheStore>,
        reservations: Arc<dyn ReservationStore>,
        config: &BookingConfig,
    ) -> Self {
        Self {
            registry,
            cache,
            reservations,
            poll_attempts: config.confirm_poll_attempts,
            poll_delay: Duration::from_millis(config.confirm_poll_delay_ms),
            hold_margins: config.hold_margins.clone(),
            holds: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashSet::new()),
        }
    }

    /// Place a hold for the sailing behind `request.handle`. At most one
    /// active hold may exist per local reservation attempt; a second call
    /// against a reservation that is already held (or currently being
    /// held) is rejected without touching the operator.
    pub async fn create_hold(&self, request: HoldRequest) -> Result<HoldReceipt, BookingError> {
        {
            let mut inflight = self.inflight.lock().await;
            if inflight.contains(&request.reservation_id) {
                return Err(BookingError::AlreadyHeld(request.reservation_id));
            }
            let holds = self.holds.read().await;
            if holds
                .values()
                .any(|h| h.reservation_id == request.reservation_id && h.state == HoldState::Held)
            {
                return Err(BookingError::AlreadyHeld(request.reservation_id));
            }
            drop(holds);
            inflight.insert(request.reservation_id);
        }

        let result = self.place_hold(&request).await;
        self.inflight.lock().await.remove(&request.reservation_id);
        result
    }

    async fn place_hold(&self, request: &HoldRequest) -> Result<HoldReceipt, BookingError> {
        let context = self.load_context(request.handle).await?;
        let adapter = self.adapter_for(&context.operator)?;

        let operator_request = OperatorBookingRequest {
            sailing_code: context.operator_sailing_code.clone(),
            departure_time: context.departure_time,
            passengers: request.passengers,
            vehicle: request.vehicle,
            accommodation_code: request.accommodation_code.clone(),
        };
        let kind = if request.vehicle.is_some() {
            ReservationKind::Vehicle
        } else {
            ReservationKind::Standard
        };

        let confirmation = match adapter.create_booking(&operator_request).await {
            Ok(confirmation) => confirmation,
            Err(err) => {
                let err = err.into_operator_error();
                error!(
                    operator = %context.operator,
                    reservation = %request.reservation_id,
                    "hold placement failed: {err}"
                );
                self.record_reservation(request, &context, kind, ReservationStatus::Failed)
                    .await?;
                return Err(BookingError::Operator(err));
            }
        };

        // The operator's window is capped by the kind-scoped safety margin
        // so the sweep never trusts an over-generous upstream expiry.
        let margin = chrono::Duration::minutes(self.hold_margins.minutes_for(kind));
        let expires_at = confirmation.expires_at.min(Utc::now() + margin);

        // A hold with no local record is invisible to release and to the
        // sweep, so a failed record write voids the upstream hold too.
        if let Err(err) = self
            .record_reservation(request, &context, kind, ReservationStatus::Held)
            .await
        {
            error!(
                reference = %confirmation.reference,
                operator = %context.operator,
                "local record failed, voiding upstream hold: {err}"
            );
            if let Err(cancel_err) = adapter
                .cancel(&confirmation.reference, "local record failed")
                .await
            {
                warn!(
                    reference = %confirmation.reference,
                    expires_at = %confirmation.expires_at,
                    "upstream void failed, hold lapses on its own expiry: {cancel_err}"
                );
            }
            return Err(err);
        }

        let hold = BookingHold {
            hold_ref: confirmation.reference.clone(),
            reservation_id: request.reservation_id,
            operator: context.operator.clone(),
            sailing_id: context.sailing_id.clone(),
            price: confirmation.price.clone(),
            expires_at,
            state: HoldState::Held,
        };
        info!(
            hold_ref = %hold.hold_ref,
            operator = %hold.operator,
            sailing = %hold.sailing_id,
            price = %hold.price,
            expires_at = %hold.expires_at,
            "hold placed"
        );
        let receipt = HoldReceipt {
            hold_ref: hold.hold_ref.clone(),
            price: hold.price.clone(),
            expires_at,
        };
        self.holds.write().await.insert(hold.hold_ref.clone(), hold);
        Ok(receipt)
    }

    /// Confirm a hold at the price the caller believes was quoted. A price
    /// differing from the snapshot is rejected and the hold stays held; a
    /// booking is never silently confirmed at a different price.
    ///
    /// Operators that confirm asynchronously are polled with a bounded
    /// attempt count; running out of attempts returns Pending.
    pub async fn confirm_hold(
        &self,
        hold_ref: &str,
        expected_price: &Money,
    ) -> Result<ConfirmOutcome, BookingError> {
        let hold = self.require_hold(hold_ref).await?;
        if hold.state != HoldState::Held {
            return Err(BookingError::InvalidState {
                from: hold.state.as_str().to_string(),
                action: "confirm".to_string(),
            });
        }
        if *expected_price != hold.price {
            warn!(
                hold_ref,
                expected = %expected_price,
                snapshot = %hold.price,
                "confirm rejected on price mismatch"
            );
            return Err(BookingError::PriceMismatch {
                expected: expected_price.clone(),
                snapshot: hold.price.clone(),
            });
        }

        let adapter = self.adapter_for(&hold.operator)?;
        for attempt in 0..self.poll_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.poll_delay).await;
                // A release or sweep may have landed during the sleep; a
                // terminal hold must never be polled back to life.
                let current = self.require_hold(hold_ref).await?;
                if current.state != HoldState::Held {
                    return Err(BookingError::InvalidState {
                        from: current.state.as_str().to_string(),
                        action: "confirm".to_string(),
                    });
                }
            }
            match adapter.get_status(hold_ref).await {
                Ok(OperatorBookingStatus::Confirmed) => {
                    self.transition(
                        hold_ref,
                        "confirm",
                        HoldState::Confirmed,
                        ReservationStatus::Confirmed,
                    )
                    .await?;
                    info!(hold_ref, operator = %hold.operator, "hold confirmed");
                    return Ok(ConfirmOutcome::Confirmed);
                }
                Ok(OperatorBookingStatus::Pending) => continue,
                Ok(status) => {
                    error!(hold_ref, ?status, "operator reports terminal failure during confirm");
                    self.transition(hold_ref, "confirm", HoldState::Failed, ReservationStatus::Failed)
                        .await?;
                    return Ok(ConfirmOutcome::Failed);
                }
                Err(err) => return Err(BookingError::Operator(err.into_operator_error())),
            }
        }

        debug!(hold_ref, attempts = self.poll_attempts, "confirm poll budget spent, still pending");
        Ok(ConfirmOutcome::Pending)
    }

    /// Best-effort release. An operator answering "not found" is treated
    /// as already released, not as a failure.
    pub async fn release_hold(&self, hold_ref: &str) -> Result<bool, BookingError> {
        let hold = self.require_hold(hold_ref).await?;
        if hold.state != HoldState::Held {
            return Err(BookingError::InvalidState {
                from: hold.state.as_str().to_string(),
                action: "release".to_string(),
            });
        }

        let adapter = self.adapter_for(&hold.operator)?;
        match adapter.cancel(hold_ref, "released before payment").await {
            Ok(acknowledged) => {
                if !acknowledged {
                    debug!(hold_ref, "operator no longer knows the hold, treating as released");
                }
                self.transition(hold_ref, "release", HoldState::Released, ReservationStatus::Released)
                    .await?;
                info!(hold_ref, operator = %hold.operator, "hold released");
                Ok(true)
            }
            Err(err) => Err(BookingError::Operator(err.into_operator_error())),
        }
    }

    /// Release every held record past its local expiry. Upstream release
    /// failures are logged and never stop the sweep; the local record is
    /// marked released regardless of what the operator answered. Returns
    /// how many holds were swept.
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<BookingHold> = {
            let holds = self.holds.read().await;
            holds
                .values()
                .filter(|h| h.state == HoldState::Held && h.expires_at <= now)
                .cloned()
                .collect()
        };

        let mut swept = 0;
        for hold in expired {
            match self.adapter_for(&hold.operator) {
                Ok(adapter) => match adapter.cancel(&hold.hold_ref, "hold expired").await {
                    Ok(true) => debug!(hold_ref = %hold.hold_ref, "expired hold released upstream"),
                    Ok(false) => {
                        debug!(hold_ref = %hold.hold_ref, "operator had already dropped the hold")
                    }
                    Err(err) => warn!(
                        hold_ref = %hold.hold_ref,
                        operator = %hold.operator,
                        "upstream release failed, releasing locally anyway: {err}"
                    ),
                },
                Err(err) => warn!(hold_ref = %hold.hold_ref, "sweep has no adapter: {err}"),
            }
            match self
                .transition(
                    &hold.hold_ref,
                    "release",
                    HoldState::Released,
                    ReservationStatus::Released,
                )
                .await
            {
                Ok(()) => swept += 1,
                Err(err) => warn!(hold_ref = %hold.hold_ref, "sweep could not record release: {err}"),
            }
        }
        swept
    }

    pub async fn hold_snapshot(&self, hold_ref: &str) -> Option<BookingHold> {
        self.holds.read().await.get(hold_ref).cloned()
    }

    async fn require_hold(&self, hold_ref: &str) -> Result<BookingHold, BookingError> {
        self.hold_snapshot(hold_ref)
            .await
            .ok_or_else(|| BookingError::NoSuchHold(hold_ref.to_string()))
    }

    fn adapter_for(&self, operator: &str) -> Result<Arc<dyn OperatorAdapter>, BookingError> {
        self.registry
            .get(operator)
            .ok_or_else(|| BookingError::UnknownOperator(operator.to_string()))
    }

    async fn load_context(&self, handle: Uuid) -> Result<BookingContext, BookingError> {
        let key = BookingContext::cache_key(handle);
        let value = self
            .cache
            .get(&key)
            .await
            .map_err(|e| BookingError::Store(e.to_string()))?
            .ok_or(BookingError::ContextExpired(handle))?;
        serde_json::from_value(value).map_err(|_| BookingError::ContextExpired(handle))
    }

    async fn record_reservation(
        &self,
        request: &HoldRequest,
        context: &BookingContext,
        kind: ReservationKind,
        status: ReservationStatus,
    ) -> Result<(), BookingError> {
        let reservation = LocalReservation {
            id: request.reservation_id,
            sailing_id: context.sailing_id.clone(),
            status,
            kind,
            // Infants travel on a lap; they occupy no space.
            passengers: request.passengers.occupying_spaces(),
            vehicles: u32::from(request.vehicle.is_some()),
            cabins: cabin_count(context, request.accommodation_code.as_deref()),
        };
        self.reservations
            .insert(reservation)
            .await
            .map_err(|e| BookingError::Store(e.to_string()))
    }

    /// Guarded state commit: a hold only ever moves out of Held. Terminal
    /// states are final, so whichever of a racing confirm, release, or
    /// sweep lands first wins and the later transition is rejected.
    async fn transition(
        &self,
        hold_ref: &str,
        action: &str,
        state: HoldState,
        status: ReservationStatus,
    ) -> Result<(), BookingError> {
        let reservation_id = {
            let mut holds = self.holds.write().await;
            let hold = holds
                .get_mut(hold_ref)
                .ok_or_else(|| BookingError::NoSuchHold(hold_ref.to_string()))?;
            if hold.state.is_terminal() {
                return Err(BookingError::InvalidState {
                    from: hold.state.as_str().to_string(),
                    action: action.to_string(),
                });
            }
            hold.state = state;
            hold.reservation_id
        };
        self.reservations
            .update_status(reservation_id, status)
            .await
            .map_err(|e| BookingError::Store(e.to_string()))
    }
}

fn cabin_count(context: &BookingContext, accommodation_code: Option<&str>) -> u32 {
    match accommodation_code {
        Some(code) => context
            .accommodations
            .iter()
            .find(|a| a.operator_code == code)
            .map(|a| u32::from(a.category.is_cabin()))
            .unwrap_or(0),
        None => 0,
    }
}
