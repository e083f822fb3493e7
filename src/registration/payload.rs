//! Wire types exchanged with the registry.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ActuatorConfig;

/// Floor for configs built in code, which bypass validation.
const MIN_INTERVAL: Duration = Duration::from_secs(1);
const MIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Heartbeat body POSTed to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub name: String,
    pub management_url: String,
    pub health_url: String,
    pub service_url: String,
    pub metadata: BTreeMap<String, String>,
}

/// Registry reply. Registries that return no body are accepted too.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationResponse {
    pub id: Option<String>,
}

/// Everything that goes into a heartbeat, resolved once from config.
#[derive(Debug, Clone)]
pub struct RegistrationSettings {
    pub registry_url: String,
    pub interval: Duration,
    pub timeout: Duration,
    pub auto_deregister: bool,
    pub credentials: Option<(String, Option<String>)>,
    pub app_name: String,
    pub service_url: String,
    pub management_url: String,
    pub health_url: String,
    pub metadata: BTreeMap<String, String>,
    pub startup: DateTime<Utc>,
}

impl RegistrationSettings {
    /// `None` when no registry URL is configured.
    pub fn from_config(config: &ActuatorConfig) -> Option<Self> {
        let registration = &config.registration;
        let registry_url = registration.registry_url.clone()?;

        Some(Self {
            registry_url: registry_url.trim_end_matches('/').to_string(),
            interval: Duration::from_secs(registration.interval_secs).max(MIN_INTERVAL),
            timeout: Duration::from_secs(registration.timeout_secs).max(MIN_TIMEOUT),
            auto_deregister: registration.auto_deregister,
            credentials: registration
                .username
                .clone()
                .map(|user| (user, registration.password.clone())),
            app_name: config.app.name.clone(),
            service_url: config.app.service_url.clone(),
            management_url: config.management_url(),
            health_url: config.health_url(),
            metadata: registration.metadata.clone(),
            startup: Utc::now(),
        })
    }

    /// Build a fresh heartbeat body.
    pub fn request(&self) -> RegistrationRequest {
        let mut metadata = self.metadata.clone();
        metadata.insert("startup".to_string(), self.startup.to_rfc3339());
        metadata.insert(
            "heartbeatIntervalSecs".to_string(),
            self.interval.as_secs().to_string(),
        );

        RegistrationRequest {
            name: self.app_name.clone(),
            management_url: self.management_url.clone(),
            health_url: self.health_url.clone(),
            service_url: self.service_url.clone(),
            metadata,
        }
    }

    /// URL used to delete a registration.
    pub fn deregistration_url(&self, id: &str) -> String {
        format!("{}/{}", self.registry_url, id)
    }
}
