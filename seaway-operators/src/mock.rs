//! Scriptable operator adapter for orchestrator and booking tests: canned
//! sailings, failure injection, sequential status answers, call counters.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use seaway_core::error::OperatorCallError;
use seaway_core::operator::{
    NormalizedOperatorSearch, OperatorAdapter, OperatorBookingRequest, OperatorBookingStatus,
    OperatorConfirmation, ReferenceEntry, SearchHit,
};
use seaway_shared::Money;

pub struct MockOperator {
    name: String,
    sailings: Mutex<Vec<SearchHit>>,
    search_failure: Mutex<Option<OperatorCallError>>,
    confirmation: Mutex<Option<OperatorConfirmation>>,
    booking_failure: Mutex<Option<OperatorCallError>>,
    statuses: Mutex<VecDeque<OperatorBookingStatus>>,
    cancel_failure: Mutex<Option<OperatorCallError>>,
    /// false makes cancel answer "not found".
    cancel_known: AtomicBool,
    healthy: AtomicBool,
    ports: Mutex<Vec<ReferenceEntry>>,
    search_calls: AtomicU32,
    booking_calls: AtomicU32,
    status_calls: AtomicU32,
    cancel_calls: AtomicU32,
}

impl MockOperator {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sailings: Mutex::new(Vec::new()),
            search_failure: Mutex::new(None),
            confirmation: Mutex::new(None),
            booking_failure: Mutex::new(None),
            statuses: Mutex::new(VecDeque::new()),
            cancel_failure: Mutex::new(None),
            cancel_known: AtomicBool::new(true),
            healthy: AtomicBool::new(true),
            ports: Mutex::new(Vec::new()),
            search_calls: AtomicU32::new(0),
            booking_calls: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            cancel_calls: AtomicU32::new(0),
        }
    }

    fn locked<'a, T>(mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_sailings(&self, hits: Vec<SearchHit>) {
        *Self::locked(&self.sailings) = hits;
    }

    pub fn fail_searches(&self, err: OperatorCallError) {
        *Self::locked(&self.search_failure) = Some(err);
    }

    pub fn set_confirmation(&self, confirmation: OperatorConfirmation) {
        *Self::locked(&self.confirmation) = Some(confirmation);
    }

    pub fn fail_bookings(&self, err: OperatorCallError) {
        *Self::locked(&self.booking_failure) = Some(err);
    }

    pub fn push_status(&self, status: OperatorBookingStatus) {
        Self::locked(&self.statuses).push_back(status);
    }

    pub fn fail_cancels(&self, err: OperatorCallError) {
        *Self::locked(&self.cancel_failure) = Some(err);
    }

    pub fn set_cancel_known(&self, known: bool) {
        self.cancel_known.store(known, Ordering::SeqCst);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn set_ports(&self, ports: Vec<ReferenceEntry>) {
        *Self::locked(&self.ports) = ports;
    }

    pub fn search_calls(&self) -> u32 {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn booking_calls(&self) -> u32 {
        self.booking_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn cancel_calls(&self) -> u32 {
        self.cancel_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OperatorAdapter for MockOperator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        _request: &NormalizedOperatorSearch,
    ) -> Result<Vec<SearchHit>, OperatorCallError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = Self::locked(&self.search_failure).clone() {
            return Err(err);
        }
        Ok(Self::locked(&self.sailings).clone())
    }

    async fn create_booking(
        &self,
        _request: &OperatorBookingRequest,
    ) -> Result<OperatorConfirmation, OperatorCallError> {
        self.booking_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = Self::locked(&self.booking_failure).clone() {
            return Err(err);
        }
        if let Some(confirmation) = Self::locked(&self.confirmation).clone() {
            return Ok(confirmation);
        }
        Ok(OperatorConfirmation {
            reference: format!("{}-REF-1", self.name.to_uppercase()),
            price: Money::new(5500, "EUR"),
            expires_at: Utc::now() + chrono::Duration::minutes(30),
        })
    }

    async fn get_status(
        &self,
        _reference: &str,
    ) -> Result<OperatorBookingStatus, OperatorCallError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::locked(&self.statuses)
            .pop_front()
            .unwrap_or(OperatorBookingStatus::Pending))
    }

    async fn cancel(&self, _reference: &str, _reason: &str) -> Result<bool, OperatorCallError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = Self::locked(&self.cancel_failure).clone() {
            return Err(err);
        }
        Ok(self.cancel_known.load(Ordering::SeqCst))
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    async fn list_ports(&self) -> Result<Vec<ReferenceEntry>, OperatorCallError> {
        Ok(Self::locked(&self.ports).clone())
    }

    async fn list_accommodations(&self) -> Result<Vec<ReferenceEntry>, OperatorCallError> {
        Ok(vec![])
    }
}
