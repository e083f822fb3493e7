//! Aggregation of registered health providers.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::health::provider::{Health, HealthProvider, HealthStatus};

/// Aggregate health served by `{prefix}/health`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeHealth {
    pub status: HealthStatus,
    pub details: BTreeMap<String, Health>,
}

/// The set of providers contributing to the aggregate.
#[derive(Default, Clone)]
pub struct HealthRegistry {
    providers: Vec<Arc<dyn HealthProvider>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider. Returns `false` (and skips it) when it reports itself unsupported.
    pub fn register(&mut self, provider: Arc<dyn HealthProvider>) -> bool {
        if !provider.is_supported() {
            tracing::info!(provider = provider.name(), "Health provider not supported, skipping");
            return false;
        }
        self.providers.push(provider);
        true
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// `DOWN` if any provider is down, else `UP` if any is up, else `UNKNOWN`.
    pub fn aggregate(&self) -> CompositeHealth {
        let details: BTreeMap<String, Health> = self
            .providers
            .iter()
            .map(|p| (p.name().to_string(), p.health()))
            .collect();

        let status = if details.values().any(|h| h.status == HealthStatus::Down) {
            HealthStatus::Down
        } else if details.values().any(|h| h.status == HealthStatus::Up) {
            HealthStatus::Up
        } else {
            HealthStatus::Unknown
        };

        CompositeHealth { status, details }
    }
}

impl std::fmt::Debug for HealthRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}
