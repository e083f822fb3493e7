//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the actuator.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the actuator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Identity of the host application.
    pub app: AppConfig,

    /// Host server settings (used by the bundled server wrapper).
    pub server: ServerConfig,

    /// Where the actuator endpoints are mounted.
    pub endpoints: EndpointsConfig,

    /// HTTP trace recorder settings.
    pub httptrace: HttpTraceConfig,

    /// Log buffer settings.
    pub logfile: LogfileConfig,

    /// Registry heartbeat settings.
    pub registration: RegistrationConfig,

    /// Built-in health providers.
    pub health: HealthConfig,

    /// Free-form entries merged into the `/info` endpoint.
    pub info: BTreeMap<String, String>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Host application identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name announced to the registry.
    pub name: String,

    /// Optional human readable description.
    pub description: Option<String>,

    /// Base URL of the host application (e.g., "http://localhost:8000").
    pub service_url: String,

    /// Base URL of the actuator endpoints. Derived from `service_url` and
    /// `endpoints.path_prefix` when absent.
    pub management_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "actuator-app".to_string(),
            description: None,
            service_url: "http://localhost:8000".to_string(),
            management_url: None,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Endpoint mounting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Path prefix of every actuator endpoint. Must start with `/`.
    pub path_prefix: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/pyctuator".to_string(),
        }
    }
}

/// Which requests the trace interceptor records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TraceScope {
    /// Host application routes and actuator endpoints.
    #[default]
    All,
    /// Only the actuator's own endpoints.
    ActuatorOnly,
}

/// HTTP trace recorder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpTraceConfig {
    /// Maximum number of retained trace records.
    pub capacity: usize,

    /// Requests to record.
    pub scope: TraceScope,
}

impl Default for HttpTraceConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            scope: TraceScope::All,
        }
    }
}

/// Log buffer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogfileConfig {
    /// Maximum number of retained log bytes.
    pub max_bytes: usize,
}

impl Default for LogfileConfig {
    fn default() -> Self {
        Self { max_bytes: 10_000 }
    }
}

/// Registry heartbeat configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Enable the heartbeat.
    pub enabled: bool,

    /// Registry endpoint receiving the heartbeat POST.
    pub registry_url: Option<String>,

    /// Heartbeat interval in seconds.
    pub interval_secs: u64,

    /// Heartbeat request timeout in seconds.
    pub timeout_secs: u64,

    /// Delete the registration from the registry on stop.
    pub auto_deregister: bool,

    /// Basic auth username for the registry.
    pub username: Option<String>,

    /// Basic auth password for the registry.
    pub password: Option<String>,

    /// Extra metadata sent with every heartbeat.
    pub metadata: BTreeMap<String, String>,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            registry_url: None,
            interval_secs: 10,
            timeout_secs: 5,
            auto_deregister: true,
            username: None,
            password: None,
            metadata: BTreeMap::new(),
        }
    }
}

/// Built-in health provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Report `diskSpace` DOWN at or below this many free bytes. Absent
    /// disables the provider.
    pub disk_space_threshold: Option<u64>,

    /// Any path on the filesystem to watch.
    pub disk_space_path: PathBuf,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            disk_space_threshold: None,
            disk_space_path: PathBuf::from("."),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level filter (trace, debug, info, warn, error or an EnvFilter directive).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl ActuatorConfig {
    /// Base URL of the actuator endpoints.
    pub fn management_url(&self) -> String {
        match &self.app.management_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "{}{}",
                self.app.service_url.trim_end_matches('/'),
                self.endpoints.path_prefix
            ),
        }
    }

    /// URL of the aggregate health endpoint.
    pub fn health_url(&self) -> String {
        format!("{}/health", self.management_url())
    }
}
