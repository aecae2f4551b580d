use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use seaway_core::context::BookingContext;
use seaway_core::error::SearchError;
use seaway_core::operator::SearchHit;
use seaway_operators::OperatorRegistry;
use seaway_shared::SailingResult;
use seaway_store::app_config::SearchConfig;
use seaway_store::cache::CacheStore;
use seaway_store::reservations::ReservationStore;

use crate::reconciler;
use crate::request::SearchCriteria;

/// Fans a normalized search out to every selected operator concurrently,
/// isolates per-operator failures, merges, caches the raw list, and
/// reconciles availability before anything reaches the caller.
pub struct SearchOrchestrator {
    registry: Arc<OperatorRegistry>,
    cache: Arc<dyn CacheStore>,
    reservations: Arc<dyn ReservationStore>,
    search_ttl: Duration,
}

impl SearchOrchestrator {
    pub fn new(
        registry: Arc<OperatorRegistry>,
        cache: Arc<dyn CacheStore>,
        reservations: Arc<dyn ReservationStore>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            registry,
            cache,
            reservations,
            search_ttl: Duration::from_secs(config.cache_ttl_seconds),
        }
    }

    pub async fn search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<SailingResult>, SearchError> {
        let normalized = criteria.normalize()?;
        let adapters = self.registry.select(criteria.operators.as_deref())?;

        let mut operator_names: Vec<String> =
            adapters.iter().map(|a| a.name().to_string()).collect();
        operator_names.sort_unstable();
        let cache_key = normalized.cache_key(&operator_names);

        // The cache stores raw, pre-reconciliation data; a hit still goes
        // through reconciliation because local holds move independently.
        match self.cache.get(&cache_key).await {
            Ok(Some(value)) => match serde_json::from_value::<Vec<SailingResult>>(value) {
                Ok(raw) => {
                    debug!(key = %cache_key, results = raw.len(), "search cache hit");
                    return Ok(self.reconciled(raw).await);
                }
                Err(err) => warn!(key = %cache_key, "corrupt search cache entry, refetching: {err}"),
            },
            Ok(None) => {}
            Err(err) => warn!("search cache read failed, falling through: {err}"),
        }

        let mut merged: Vec<SailingResult> = Vec::new();
        for (leg_departure, leg_arrival, leg_date) in normalized.legs() {
            let request = normalized.operator_search(&leg_departure, &leg_arrival, leg_date);
            let calls = adapters.iter().map(|adapter| {
                let adapter = adapter.clone();
                let request = request.clone();
                async move {
                    let outcome = adapter.search(&request).await;
                    (adapter.name().to_string(), outcome)
                }
            });

            // Gather all, never let one failure cancel the others.
            for (operator, outcome) in join_all(calls).await {
                match outcome {
                    Ok(hits) => {
                        for hit in hits {
                            self.store_context(&hit).await;
                            merged.push(hit.result);
                        }
                    }
                    Err(err) => {
                        warn!(operator = %operator, "operator search failed, continuing without it: {err}");
                    }
                }
            }
        }

        merged.sort_by_key(|sailing| sailing.departure_time);

        match serde_json::to_value(&merged) {
            Ok(value) => {
                if let Err(err) = self.cache.set(&cache_key, value, self.search_ttl).await {
                    warn!("search cache write failed: {err}");
                }
            }
            Err(err) => warn!("search result not cacheable: {err}"),
        }

        Ok(self.reconciled(merged).await)
    }

    /// Per-operator health map for status surfaces.
    pub async fn operator_health(&self) -> HashMap<String, bool> {
        self.registry.health_snapshot().await
    }

    async fn store_context(&self, hit: &SearchHit) {
        let key = BookingContext::cache_key(hit.result.booking_handle);
        match serde_json::to_value(&hit.context) {
            Ok(value) => {
                if let Err(err) = self.cache.set(&key, value, self.search_ttl).await {
                    warn!(handle = %hit.result.booking_handle, "booking context not cached: {err}");
                }
            }
            Err(err) => warn!("booking context not serializable: {err}"),
        }
    }

    async fn reconciled(&self, mut results: Vec<SailingResult>) -> Vec<SailingResult> {
        match self.reservations.active_load_by_sailing().await {
            Ok(loads) => reconciler::apply(&mut results, &loads),
            Err(err) => {
                warn!("reservation load unavailable, returning operator-reported capacity: {err}")
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use seaway_core::error::OperatorCallError;
    use seaway_operators::MockOperator;
    use seaway_shared::{
        LocalReservation, Money, PassengerCounts, PassengerPrice, PassengerType, ReservationKind,
        ReservationStatus,
    };
    use seaway_store::cache::MemoryCache;
    use seaway_store::reservations::MemoryReservationStore;
    use uuid::Uuid;

    fn hit(operator: &str, id: &str, hour: u32, spaces: u32) -> SearchHit {
        let departure_time = Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap();
        let sailing_id = format!("{operator}:{id}");
        let result = SailingResult {
            sailing_id: sailing_id.clone(),
            operator: operator.to_string(),
            departure_port: "TUN".to_string(),
            arrival_port: "MRS".to_string(),
            departure_time,
            arrival_time: departure_time + chrono::Duration::hours(12),
            vessel: "Test vessel".to_string(),
            passenger_prices: vec![PassengerPrice {
                passenger_type: PassengerType::Adult,
                price: Money::new(5500, "EUR"),
            }],
            vehicle_prices: vec![],
            accommodations: vec![],
            available_passenger_spaces: spaces,
            available_vehicle_spaces: 10,
            booking_handle: Uuid::new_v4(),
        };
        let context = BookingContext {
            operator: operator.to_string(),
            sailing_id,
            operator_sailing_code: id.to_string(),
            departure_time,
            currency: "EUR".to_string(),
            passenger_prices: result.passenger_prices.clone(),
            vehicle_prices: vec![],
            accommodations: vec![],
        };
        SearchHit { result, context }
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria {
            departure: "TUN".to_string(),
            arrival: "MRS".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            return_date: None,
            passengers: PassengerCounts::adults_only(2),
            vehicles: vec![],
            operators: None,
        }
    }

    struct Fixture {
        orchestrator: SearchOrchestrator,
        cache: Arc<MemoryCache>,
        reservations: Arc<MemoryReservationStore>,
    }

    fn fixture(adapters: Vec<Arc<MockOperator>>) -> Fixture {
        let mut registry = OperatorRegistry::new();
        for adapter in adapters {
            registry.register(adapter);
        }
        let cache = Arc::new(MemoryCache::new());
        let reservations = Arc::new(MemoryReservationStore::new());
        let orchestrator = SearchOrchestrator::new(
            Arc::new(registry),
            cache.clone(),
            reservations.clone(),
            &SearchConfig {
                cache_ttl_seconds: 900,
                reference_ttl_seconds: 86400,
            },
        );
        Fixture {
            orchestrator,
            cache,
            reservations,
        }
    }

    #[tokio::test]
    async fn test_same_port_rejected_before_any_adapter_call() {
        let adapter = Arc::new(MockOperator::new("maghreb"));
        let f = fixture(vec![adapter.clone()]);

        let mut c = criteria();
        c.arrival = "ALL-TN".to_string();
        let err = f.orchestrator.search(&c).await;
        assert!(matches!(err, Err(SearchError::Validation(_))));
        assert_eq!(adapter.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_failing_operator_is_isolated() {
        let healthy = Arc::new(MockOperator::new("maghreb"));
        healthy.set_sailings(vec![
            hit("maghreb", "CR-3", 18, 100),
            hit("maghreb", "CR-1", 6, 100),
            hit("maghreb", "CR-2", 12, 100),
        ]);
        let broken = Arc::new(MockOperator::new("adriatic"));
        broken.fail_searches(OperatorCallError::Connection {
            operator: "adriatic".to_string(),
            message: "connection reset".to_string(),
        });
        let f = fixture(vec![healthy, broken]);

        let results = f.orchestrator.search(&criteria()).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|s| s.operator == "maghreb"));
        let times: Vec<_> = results.iter().map(|s| s.departure_time).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
    }

    #[tokio::test]
    async fn test_merge_sorts_across_operators() {
        let a = Arc::new(MockOperator::new("maghreb"));
        a.set_sailings(vec![hit("maghreb", "CR-1", 14, 100)]);
        let b = Arc::new(MockOperator::new("adriatic"));
        b.set_sailings(vec![
            hit("adriatic", "AS-1", 8, 100),
            hit("adriatic", "AS-2", 20, 100),
        ]);
        let f = fixture(vec![a, b]);

        let results = f.orchestrator.search(&criteria()).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|s| s.sailing_id.as_str()).collect();
        assert_eq!(ids, vec!["adriatic:AS-1", "maghreb:CR-1", "adriatic:AS-2"]);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_adapters_and_preserves_sailing_ids() {
        let adapter = Arc::new(MockOperator::new("maghreb"));
        adapter.set_sailings(vec![hit("maghreb", "CR-1", 6, 100)]);
        let f = fixture(vec![adapter.clone()]);

        let first = f.orchestrator.search(&criteria()).await.unwrap();
        let second = f.orchestrator.search(&criteria()).await.unwrap();

        assert_eq!(adapter.search_calls(), 1);
        let first_ids: Vec<_> = first.iter().map(|s| s.sailing_id.clone()).collect();
        let second_ids: Vec<_> = second.iter().map(|s| s.sailing_id.clone()).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[tokio::test]
    async fn test_cached_results_still_reconciled() {
        let adapter = Arc::new(MockOperator::new("maghreb"));
        adapter.set_sailings(vec![hit("maghreb", "CR-1", 6, 100)]);
        let f = fixture(vec![adapter.clone()]);

        let first = f.orchestrator.search(&criteria()).await.unwrap();
        assert_eq!(first[0].available_passenger_spaces, 100);

        // A hold lands between the two searches; the cached raw entry
        // must be re-adjusted, not replayed verbatim.
        f.reservations
            .insert(LocalReservation {
                id: Uuid::new_v4(),
                sailing_id: "maghreb:CR-1".to_string(),
                status: ReservationStatus::Held,
                kind: ReservationKind::Standard,
                passengers: 4,
                vehicles: 1,
                cabins: 0,
            })
            .await
            .unwrap();

        let second = f.orchestrator.search(&criteria()).await.unwrap();
        assert_eq!(adapter.search_calls(), 1);
        assert_eq!(second[0].available_passenger_spaces, 96);
        assert_eq!(second[0].available_vehicle_spaces, 9);
    }

    #[tokio::test]
    async fn test_filter_naming_only_unknown_operators_is_config_error() {
        let adapter = Arc::new(MockOperator::new("maghreb"));
        let f = fixture(vec![adapter]);

        let mut c = criteria();
        c.operators = Some(vec!["nordic".to_string()]);
        let err = f.orchestrator.search(&c).await;
        assert!(matches!(err, Err(SearchError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_booking_context_stored_under_handle() {
        let adapter = Arc::new(MockOperator::new("maghreb"));
        adapter.set_sailings(vec![hit("maghreb", "CR-1", 6, 100)]);
        let f = fixture(vec![adapter]);

        let results = f.orchestrator.search(&criteria()).await.unwrap();
        let key = BookingContext::cache_key(results[0].booking_handle);
        let stored = f.cache.get(&key).await.unwrap();
        assert!(stored.is_some());
        let context: BookingContext = serde_json::from_value(stored.unwrap()).unwrap();
        assert_eq!(context.operator_sailing_code, "CR-1");
    }

    #[tokio::test]
    async fn test_return_date_adds_reverse_leg_results() {
        let adapter = Arc::new(MockOperator::new("maghreb"));
        adapter.set_sailings(vec![hit("maghreb", "CR-1", 6, 100)]);
        let f = fixture(vec![adapter.clone()]);

        let mut c = criteria();
        c.return_date = NaiveDate::from_ymd_opt(2025, 6, 8);
        let results = f.orchestrator.search(&c).await.unwrap();
        // One fan-out per leg; the mock answers both.
        assert_eq!(adapter.search_calls(), 2);
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_operator_health_map() {
        let up = Arc::new(MockOperator::new("maghreb"));
        let down = Arc::new(MockOperator::new("adriatic"));
        down.set_healthy(false);
        let f = fixture(vec![up, down]);

        let health = f.orchestrator.operator_health().await;
        assert_eq!(health["maghreb"], true);
        assert_eq!(health["adriatic"], false);
    }
}
