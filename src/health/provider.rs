//! Health provider contract and built-in providers.

use serde::Serialize;
use serde_json::{Map, Value};

/// Status reported by a health provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
    Unknown,
}

/// Health of one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Health {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl Health {
    pub fn up() -> Self {
        Self::with_status(HealthStatus::Up)
    }

    pub fn down() -> Self {
        Self::with_status(HealthStatus::Down)
    }

    pub fn with_status(status: HealthStatus) -> Self {
        Self {
            status,
            details: Map::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// A source of health information supplied by the host application.
///
/// `is_supported` is consulted once, when the provider is registered;
/// unsupported providers never take part in the aggregate.
pub trait HealthProvider: Send + Sync {
    fn name(&self) -> &str;

    fn is_supported(&self) -> bool {
        true
    }

    fn health(&self) -> Health;
}

/// Always `UP` while the process can answer requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PingHealthProvider;

impl HealthProvider for PingHealthProvider {
    fn name(&self) -> &str {
        "ping"
    }

    fn health(&self) -> Health {
        Health::up()
    }
}
