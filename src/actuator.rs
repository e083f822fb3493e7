//! The actuator facade.
//!
//! Owns the trace buffer, the log buffer, the health providers and the
//! registration client, and hands out the pieces a host server composes:
//! the endpoint router, the trace layer, the log writer.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use actuator::{Actuator, ActuatorConfig};
//! use axum::{routing::get, Router};
//!
//! let actuator = Actuator::new(ActuatorConfig::default())?;
//! let app = actuator.attach(Router::new().route("/", get(|| async { "hello" })));
//! actuator.start()?;
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! actuator.stop().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::Router;

use crate::config::ActuatorConfig;
use crate::endpoints::{setup_actuator_router, EndpointState};
use crate::health::{DiskSpaceHealthProvider, HealthProvider, HealthRegistry, PingHealthProvider};
use crate::httptrace::{HttpTraceLayer, TraceRingBuffer};
use crate::logfile::{LogBuffer, LogBufferWriter};
use crate::registration::{RegistrationClient, RegistrationError, RegistrationSettings, RegistrationState};

pub struct Actuator {
    config: Arc<ActuatorConfig>,
    traces: Arc<TraceRingBuffer>,
    logs: Arc<LogBuffer>,
    health: HealthRegistry,
    registration: Option<RegistrationClient>,
}

impl Actuator {
    /// Build an actuator from a validated configuration.
    pub fn new(config: ActuatorConfig) -> Result<Self, RegistrationError> {
        let logs = Arc::new(LogBuffer::new(config.logfile.max_bytes));
        Self::with_log_buffer(config, logs)
    }

    /// Build an actuator serving `/logfile` from an existing buffer.
    ///
    /// Lets the host install its subscriber (writing into `logs`) first, so
    /// events logged while the actuator is assembled are captured too.
    pub fn with_log_buffer(config: ActuatorConfig, logs: Arc<LogBuffer>) -> Result<Self, RegistrationError> {
        let registration = if config.registration.enabled {
            let settings = RegistrationSettings::from_config(&config);
            if settings.is_none() {
                tracing::warn!("Registration enabled but no registry_url configured");
            }
            settings.map(RegistrationClient::new).transpose()?
        } else {
            None
        };

        let mut health = HealthRegistry::new();
        health.register(Arc::new(PingHealthProvider));
        if let Some(threshold) = config.health.disk_space_threshold {
            health.register(Arc::new(DiskSpaceHealthProvider::new(
                config.health.disk_space_path.clone(),
                threshold,
            )));
        }

        Ok(Self {
            traces: Arc::new(TraceRingBuffer::new(config.httptrace.capacity)),
            logs,
            config: Arc::new(config),
            health,
            registration,
        })
    }

    /// Add a health provider. Unsupported providers are skipped.
    pub fn with_health_provider(mut self, provider: Arc<dyn HealthProvider>) -> Self {
        self.health.register(provider);
        self
    }

    pub fn config(&self) -> &ActuatorConfig {
        &self.config
    }

    pub fn traces(&self) -> &Arc<TraceRingBuffer> {
        &self.traces
    }

    pub fn logs(&self) -> &Arc<LogBuffer> {
        &self.logs
    }

    /// `MakeWriter` for a `tracing_subscriber::fmt` layer feeding `/logfile`.
    pub fn log_writer(&self) -> LogBufferWriter {
        LogBufferWriter::new(self.logs.clone())
    }

    /// Interceptor recording exchanges into this actuator's trace buffer.
    pub fn trace_layer(&self) -> HttpTraceLayer {
        HttpTraceLayer::new(
            self.traces.clone(),
            &self.config.endpoints.path_prefix,
            self.config.httptrace.scope,
        )
    }

    /// The actuator endpoints, mounted under the configured prefix.
    pub fn router(&self) -> Router {
        let state = EndpointState {
            traces: self.traces.clone(),
            logs: self.logs.clone(),
            health: Arc::new(self.health.clone()),
            app: Arc::new(self.config.app.clone()),
            info: Arc::new(self.config.info.clone()),
            management_url: Arc::from(self.config.management_url()),
        };
        setup_actuator_router(&self.config.endpoints.path_prefix, state)
    }

    /// Merge the endpoints into `host` and trace everything.
    pub fn attach(&self, host: Router) -> Router {
        host.merge(self.router()).layer(self.trace_layer())
    }

    /// Start the registry heartbeat, if configured.
    pub fn start(&self) -> Result<(), RegistrationError> {
        match &self.registration {
            Some(client) => client.start(),
            None => {
                tracing::debug!("Registration disabled, no heartbeat started");
                Ok(())
            }
        }
    }

    /// Stop the registry heartbeat. No heartbeat fires after this returns.
    pub async fn stop(&self) {
        if let Some(client) = &self.registration {
            client.stop().await;
        }
    }

    pub fn registration(&self) -> Option<&RegistrationClient> {
        self.registration.as_ref()
    }

    pub fn registration_state(&self) -> Option<RegistrationState> {
        self.registration.as_ref().map(RegistrationClient::state)
    }
}

impl std::fmt::Debug for Actuator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actuator")
            .field("prefix", &self.config.endpoints.path_prefix)
            .field("traces", &self.traces.len())
            .field("health", &self.health)
            .field("registration", &self.registration)
            .finish()
    }
}
