//! Three-tier code resolution: static table, alias fallback, then the
//! operator's live reference list fetched through its adapter and cached.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use seaway_core::error::OperatorCallError;
use seaway_core::operator::{OperatorAdapter, ReferenceEntry};

use crate::ports::{self, StaticPortMapping};

/// Outcome of mapping one internal port code into an operator's
/// vocabulary. `Unsupported` means "skip this operator, zero results,
/// no network call".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortMapping {
    Code(String),
    Unsupported,
    Unknown,
}

struct CachedReference {
    entries: Vec<ReferenceEntry>,
    fetched_at: DateTime<Utc>,
}

/// Owns the live-reference cache; constructed once and injected wherever
/// translation is needed. No globals.
pub struct CodeMappingService {
    reference_ttl: chrono::Duration,
    live_ports: RwLock<HashMap<String, CachedReference>>,
}

impl CodeMappingService {
    pub fn new(reference_ttl: Duration) -> Self {
        Self {
            reference_ttl: chrono::Duration::from_std(reference_ttl)
                .unwrap_or_else(|_| chrono::Duration::hours(24)),
            live_ports: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve an internal port code for the given operator.
    ///
    /// Tier 1: static direct table. Tier 2: static alias rows keyed by the
    /// port's display name. Tier 3: the operator's live port list, cached
    /// for the reference TTL, matched by code or case-insensitive name.
    pub async fn operator_port_code(
        &self,
        adapter: &dyn OperatorAdapter,
        internal: &str,
    ) -> Result<PortMapping, OperatorCallError> {
        let operator = adapter.name();

        match ports::operator_port_static(operator, internal) {
            Some(StaticPortMapping::Code(code)) => return Ok(PortMapping::Code(code.to_string())),
            Some(StaticPortMapping::Unsupported) => {
                debug!(operator, port = internal, "port flagged unsupported, short-circuiting");
                return Ok(PortMapping::Unsupported);
            }
            None => {}
        }

        let info = match ports::port_info(internal) {
            Some(info) => info,
            None => return Ok(PortMapping::Unknown),
        };

        if let Some(code) = ports::operator_port_alias(operator, info.name) {
            return Ok(PortMapping::Code(code.to_string()));
        }

        let entries = self.live_port_list(adapter).await?;
        let wanted = info.name.to_lowercase();
        let found = entries.iter().find(|entry| {
            entry.code.eq_ignore_ascii_case(internal) || entry.name.to_lowercase() == wanted
        });
        Ok(match found {
            Some(entry) => PortMapping::Code(entry.code.clone()),
            None => PortMapping::Unknown,
        })
    }

    async fn live_port_list(
        &self,
        adapter: &dyn OperatorAdapter,
    ) -> Result<Vec<ReferenceEntry>, OperatorCallError> {
        let operator = adapter.name().to_string();
        let now = Utc::now();

        {
            let cached = self.live_ports.read().await;
            if let Some(reference) = cached.get(&operator) {
                if now - reference.fetched_at < self.reference_ttl {
                    return Ok(reference.entries.clone());
                }
            }
        }

        info!(operator = %operator, "fetching live port reference list");
        let entries = adapter.list_ports().await?;

        let mut cached = self.live_ports.write().await;
        cached.insert(
            operator,
            CachedReference {
                entries: entries.clone(),
                fetched_at: now,
            },
        );
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use seaway_core::error::OperatorError;
    use seaway_core::operator::{
        NormalizedOperatorSearch, OperatorBookingRequest, OperatorBookingStatus,
        OperatorConfirmation, SearchHit,
    };
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Minimal adapter that only answers reference-list calls.
    struct ReferenceOnlyAdapter {
        name: String,
        ports: Vec<ReferenceEntry>,
        list_calls: AtomicU32,
    }

    impl ReferenceOnlyAdapter {
        fn new(name: &str, ports: Vec<(&str, &str)>) -> Self {
            Self {
                name: name.to_string(),
                ports: ports
                    .into_iter()
                    .map(|(code, n)| ReferenceEntry {
                        code: code.to_string(),
                        name: n.to_string(),
                    })
                    .collect(),
                list_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl OperatorAdapter for ReferenceOnlyAdapter {
        fn name(&self) -> &str {
            &self.name
        }

        async fn search(
            &self,
            _request: &NormalizedOperatorSearch,
        ) -> Result<Vec<SearchHit>, OperatorCallError> {
            Ok(vec![])
        }

        async fn create_booking(
            &self,
            _request: &OperatorBookingRequest,
        ) -> Result<OperatorConfirmation, OperatorCallError> {
            Err(OperatorCallError::Api(OperatorError {
                operator: self.name.clone(),
                message: "not supported in test".to_string(),
                code: None,
                http_status: None,
            }))
        }

        async fn get_status(
            &self,
            _reference: &str,
        ) -> Result<OperatorBookingStatus, OperatorCallError> {
            Ok(OperatorBookingStatus::NotFound)
        }

        async fn cancel(&self, _reference: &str, _reason: &str) -> Result<bool, OperatorCallError> {
            Ok(false)
        }

        async fn health_check(&self) -> bool {
            true
        }

        async fn list_ports(&self) -> Result<Vec<ReferenceEntry>, OperatorCallError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.ports.clone())
        }

        async fn list_accommodations(&self) -> Result<Vec<ReferenceEntry>, OperatorCallError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_static_table_needs_no_adapter_call() {
        let service = CodeMappingService::new(Duration::from_secs(86400));
        let adapter = ReferenceOnlyAdapter::new("maghreb", vec![]);

        let mapped = service.operator_port_code(&adapter, "TUN").await.unwrap();
        assert_eq!(mapped, PortMapping::Code("TNTUN".to_string()));
        assert_eq!(adapter.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unsupported_short_circuits() {
        let service = CodeMappingService::new(Duration::from_secs(86400));
        let adapter = ReferenceOnlyAdapter::new("maghreb", vec![]);

        let mapped = service.operator_port_code(&adapter, "GAE").await.unwrap();
        assert_eq!(mapped, PortMapping::Unsupported);
        assert_eq!(adapter.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_live_lookup_matches_name_and_caches() {
        let service = CodeMappingService::new(Duration::from_secs(86400));
        // AJA has no static row for maghreb; live list knows it by name.
        let adapter =
            ReferenceOnlyAdapter::new("maghreb", vec![("FRAJA", "Ajaccio"), ("FRNCE", "Nice")]);

        let first = service.operator_port_code(&adapter, "AJA").await.unwrap();
        assert_eq!(first, PortMapping::Code("FRAJA".to_string()));

        let second = service.operator_port_code(&adapter, "AJA").await.unwrap();
        assert_eq!(second, PortMapping::Code("FRAJA".to_string()));
        // Second resolution served from the 24h reference cache.
        assert_eq!(adapter.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_alias_row_beats_live_lookup() {
        let service = CodeMappingService::new(Duration::from_secs(86400));
        let adapter = ReferenceOnlyAdapter::new("adriatic", vec![("XX", "Ajaccio")]);

        let mapped = service.operator_port_code(&adapter, "AJA").await.unwrap();
        assert_eq!(mapped, PortMapping::Code("AJ".to_string()));
        assert_eq!(adapter.list_calls.load(Ordering::SeqCst), 0);
    }
}
