use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use seaway_core::error::SearchError;
use seaway_core::operator::OperatorAdapter;
use seaway_core::retry::RetryPolicy;
use seaway_mapping::service::CodeMappingService;
use seaway_store::app_config::OperatorConfig;

use crate::{adriatic, maghreb, AdriaticSeaways, MaghrebFerries};

/// Name → adapter map, built once at startup from configuration and then
/// only read. No runtime type introspection anywhere: the operator name
/// is the whole dispatch mechanism.
#[derive(Default)]
pub struct OperatorRegistry {
    adapters: HashMap<String, Arc<dyn OperatorAdapter>>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(
        operators: &HashMap<String, OperatorConfig>,
        mapping: &Arc<CodeMappingService>,
        retry: &RetryPolicy,
    ) -> Self {
        let mut registry = Self::new();
        for (name, config) in operators {
            if !config.enabled {
                info!(operator = %name, "operator disabled by configuration");
                continue;
            }
            match name.as_str() {
                maghreb::OPERATOR_NAME => registry.register(Arc::new(MaghrebFerries::new(
                    config,
                    mapping.clone(),
                    retry.clone(),
                ))),
                adriatic::OPERATOR_NAME => registry.register(Arc::new(AdriaticSeaways::new(
                    config,
                    mapping.clone(),
                    retry.clone(),
                ))),
                other => warn!(operator = %other, "no adapter implementation for configured operator"),
            }
        }
        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn OperatorAdapter>) {
        self.adapters.insert(adapter.name().to_string(), adapter);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn OperatorAdapter>> {
        self.adapters.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Adapters selected by an optional operator filter. A filter naming
    /// only unconfigured operators is a configuration error; a partially
    /// valid filter proceeds with the known subset.
    pub fn select(
        &self,
        filter: Option<&[String]>,
    ) -> Result<Vec<Arc<dyn OperatorAdapter>>, SearchError> {
        match filter {
            None => Ok(self.adapters.values().cloned().collect()),
            Some(names) => {
                let mut selected = Vec::new();
                for name in names {
                    match self.get(name) {
                        Some(adapter) => selected.push(adapter),
                        None => warn!(operator = %name, "filter names unconfigured operator"),
                    }
                }
                if selected.is_empty() {
                    return Err(SearchError::Configuration(format!(
                        "no configured operator matches filter {names:?}"
                    )));
                }
                Ok(selected)
            }
        }
    }

    /// Concurrent health probe across every registered adapter.
    pub async fn health_snapshot(&self) -> HashMap<String, bool> {
        let probes = self.adapters.values().map(|adapter| {
            let adapter = adapter.clone();
            async move { (adapter.name().to_string(), adapter.health_check().await) }
        });
        join_all(probes).await.into_iter().collect()
    }
}
