//! HTTP server hosting an application router with the actuator attached.
//!
//! # Responsibilities
//! - Compose the host router with the actuator endpoints
//! - Wire up middleware (trace recorder, timeout, request spans)
//! - Start the registry heartbeat before serving, stop it after draining

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::actuator::Actuator;
use crate::config::ActuatorConfig;
use crate::lifecycle::shutdown::wait_for;
use crate::registration::RegistrationError;

/// HTTP server for a host application with the actuator attached.
pub struct HttpServer {
    router: Router,
    config: ActuatorConfig,
    actuator: Arc<Actuator>,
}

impl HttpServer {
    /// Create a server around `host`, building a fresh actuator from `config`.
    pub fn new(config: ActuatorConfig, host: Router) -> Result<Self, RegistrationError> {
        let actuator = Actuator::new(config.clone())?;
        Ok(Self::with_actuator(config, actuator, host))
    }

    /// Create a server around `host` with a pre-built actuator (e.g. one whose
    /// log writer is already installed in the subscriber).
    pub fn with_actuator(config: ActuatorConfig, actuator: Actuator, host: Router) -> Self {
        let actuator = Arc::new(actuator);
        let router = Self::build_router(&config, &actuator, host);
        Self {
            router,
            config,
            actuator,
        }
    }

    /// Build the router with all middleware layers.
    ///
    /// The trace layer sits outside the timeout so timed-out requests are recorded too.
    #[allow(deprecated)]
    fn build_router(config: &ActuatorConfig, actuator: &Actuator, host: Router) -> Router {
        host.merge(actuator.router())
            .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)))
            .layer(actuator.trace_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires, then drain and stop the heartbeat.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            prefix = %self.config.endpoints.path_prefix,
            "HTTP server starting"
        );

        if let Err(e) = self.actuator.start() {
            tracing::warn!(error = %e, "Registration heartbeat not started");
        }

        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await;

        self.actuator.stop().await;
        tracing::info!("HTTP server stopped");
        served
    }

    pub fn actuator(&self) -> &Arc<Actuator> {
        &self.actuator
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ActuatorConfig {
        &self.config
    }
}
