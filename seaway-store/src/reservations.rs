use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use seaway_shared::{LocalReservation, ReservationStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("reservation {0} not found")]
    NotFound(Uuid),

    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Local demand against one sailing, summed over Held and Confirmed
/// reservations. What the availability reconciler subtracts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SailingLoad {
    pub passengers: u32,
    pub vehicles: u32,
    pub cabins: u32,
}

/// Seam to the external reservation persistence. The aggregation core
/// only needs lifecycle writes and the active-load read.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn insert(&self, reservation: LocalReservation) -> Result<(), StoreError>;
    async fn update_status(&self, id: Uuid, status: ReservationStatus) -> Result<(), StoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<LocalReservation>, StoreError>;
    /// Held + Confirmed reservations grouped by sailing id.
    async fn active_load_by_sailing(&self) -> Result<HashMap<String, SailingLoad>, StoreError>;
}

/// In-memory implementation; the real deployment points this trait at the
/// external reservation database.
#[derive(Default)]
pub struct MemoryReservationStore {
    inner: RwLock<HashMap<Uuid, LocalReservation>>,
}

impl MemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn insert(&self, reservation: LocalReservation) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.insert(reservation.id, reservation);
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: ReservationStatus) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let reservation = inner.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        reservation.status = status;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<LocalReservation>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.get(&id).cloned())
    }

    async fn active_load_by_sailing(&self) -> Result<HashMap<String, SailingLoad>, StoreError> {
        let inner = self.inner.read().await;
        let mut loads: HashMap<String, SailingLoad> = HashMap::new();
        for reservation in inner.values() {
            if !reservation.status.occupies_inventory() {
                continue;
            }
            let load = loads.entry(reservation.sailing_id.clone()).or_default();
            load.passengers += reservation.passengers;
            load.vehicles += reservation.vehicles;
            load.cabins += reservation.cabins;
        }
        Ok(loads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seaway_shared::ReservationKind;

    fn reservation(
        sailing: &str,
        status: ReservationStatus,
        passengers: u32,
        cabins: u32,
    ) -> LocalReservation {
        LocalReservation {
            id: Uuid::new_v4(),
            sailing_id: sailing.to_string(),
            status,
            kind: ReservationKind::Standard,
            passengers,
            vehicles: 0,
            cabins,
        }
    }

    #[tokio::test]
    async fn test_active_load_sums_held_and_confirmed_only() {
        let store = MemoryReservationStore::new();
        store
            .insert(reservation("maghreb:1", ReservationStatus::Held, 2, 1))
            .await
            .unwrap();
        store
            .insert(reservation("maghreb:1", ReservationStatus::Confirmed, 3, 0))
            .await
            .unwrap();
        store
            .insert(reservation("maghreb:1", ReservationStatus::Released, 9, 9))
            .await
            .unwrap();
        store
            .insert(reservation("adriatic:7", ReservationStatus::Held, 1, 0))
            .await
            .unwrap();

        let loads = store.active_load_by_sailing().await.unwrap();
        let load = loads["maghreb:1"];
        assert_eq!(load.passengers, 5);
        assert_eq!(load.cabins, 1);
        assert_eq!(loads["adriatic:7"].passengers, 1);
    }

    #[tokio::test]
    async fn test_update_status_of_missing_reservation_errors() {
        let store = MemoryReservationStore::new();
        let err = store
            .update_status(Uuid::new_v4(), ReservationStatus::Released)
            .await;
        assert!(matches!(err, Err(StoreError::NotFound(_))));
    }
}
