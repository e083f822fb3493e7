//! Registry heartbeat client.
//!
//! # Responsibilities
//! - POST a fresh `RegistrationRequest` to the registry every interval
//! - Track the registration id and consecutive failures
//! - Optionally DELETE the registration on stop
//!
//! # Design Decisions
//! - Failures are logged and counted, never returned to the host
//! - Fixed period, no backoff: a recovered registry picks the instance
//!   up again on the next tick
//! - Single use: a stopped client cannot be started again

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::StatusCode;
use thiserror::Error;

use crate::lifecycle::PeriodicTask;
use crate::registration::payload::{RegistrationRequest, RegistrationResponse, RegistrationSettings};
use crate::registration::state::{RegistrationState, RegistrationStatus};

/// Errors from the registration client.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Transport failure or timeout talking to the registry.
    #[error("registry request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The registry answered with a non-2xx status.
    #[error("registry answered with status {0}")]
    Status(StatusCode),

    #[error("registration heartbeat already started")]
    AlreadyStarted,

    #[error("registration client has been stopped")]
    Stopped,
}

enum TaskSlot {
    NotStarted,
    Running(PeriodicTask),
    Stopped,
}

/// Background self-registration with a monitoring registry.
pub struct RegistrationClient {
    heartbeat: Arc<Heartbeat>,
    task: Mutex<TaskSlot>,
    // Held for the whole of `stop`, so overlapping callers return only once
    // the heartbeat is joined and deregistration is done.
    stopping: tokio::sync::Mutex<()>,
}

/// State shared with the periodic task.
struct Heartbeat {
    settings: RegistrationSettings,
    http: reqwest::Client,
    state: Mutex<RegistrationState>,
}

impl RegistrationClient {
    pub fn new(settings: RegistrationSettings) -> Result<Self, RegistrationError> {
        let http = reqwest::Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            heartbeat: Arc::new(Heartbeat {
                settings,
                http,
                state: Mutex::new(RegistrationState::default()),
            }),
            task: Mutex::new(TaskSlot::NotStarted),
            stopping: tokio::sync::Mutex::new(()),
        })
    }

    pub fn settings(&self) -> &RegistrationSettings {
        &self.heartbeat.settings
    }

    /// Start the heartbeat. The first POST is sent immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<(), RegistrationError> {
        let mut slot = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        match *slot {
            TaskSlot::NotStarted => {}
            TaskSlot::Running(_) => return Err(RegistrationError::AlreadyStarted),
            TaskSlot::Stopped => return Err(RegistrationError::Stopped),
        }

        let heartbeat = self.heartbeat.clone();
        let task = PeriodicTask::spawn("registration", heartbeat.settings.interval, move || {
            let heartbeat = heartbeat.clone();
            async move { heartbeat.beat().await }
        });
        *slot = TaskSlot::Running(task);

        tracing::info!(
            registry_url = %self.heartbeat.settings.registry_url,
            interval_secs = self.heartbeat.settings.interval.as_secs(),
            "Registration heartbeat started"
        );
        Ok(())
    }

    /// Stop the heartbeat, waiting for an in-flight POST to finish.
    ///
    /// Safe to call more than once, also concurrently: every call returns
    /// after the heartbeat has been joined. Only the first call deregisters.
    pub async fn stop(&self) {
        let _stopping = self.stopping.lock().await;
        let previous = self.take_task();
        match previous {
            TaskSlot::Stopped => return,
            TaskSlot::Running(task) => task.stop().await,
            TaskSlot::NotStarted => {}
        }

        let registration_id = {
            let mut state = self.heartbeat.lock_state();
            state.status = RegistrationStatus::Stopped;
            state.registration_id.clone()
        };
        tracing::info!("Registration heartbeat stopped");

        if self.heartbeat.settings.auto_deregister {
            if let Some(id) = registration_id {
                self.heartbeat.deregister(&id).await;
            }
        }
    }

    /// Snapshot of the current registration state.
    pub fn state(&self) -> RegistrationState {
        self.heartbeat.lock_state().clone()
    }

    fn take_task(&self) -> TaskSlot {
        let mut slot = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, TaskSlot::Stopped)
    }
}

impl std::fmt::Debug for RegistrationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationClient")
            .field("registry_url", &self.heartbeat.settings.registry_url)
            .field("state", &self.state())
            .finish()
    }
}

impl Heartbeat {
    fn lock_state(&self) -> MutexGuard<'_, RegistrationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// One heartbeat tick.
    async fn beat(&self) {
        self.lock_state().begin_attempt();

        let request = self.settings.request();
        match self.register(&request).await {
            Ok(id) => {
                let mut state = self.lock_state();
                let was_registered = state.is_registered();
                state.record_success(id);
                if !was_registered {
                    tracing::info!(
                        registry_url = %self.settings.registry_url,
                        registration_id = ?state.registration_id,
                        "Registered with registry"
                    );
                }
            }
            Err(e) => {
                let failures = self.lock_state().record_failure();
                tracing::warn!(
                    registry_url = %self.settings.registry_url,
                    consecutive_failures = failures,
                    error = %e,
                    "Registration heartbeat failed"
                );
            }
        }
    }

    async fn register(&self, request: &RegistrationRequest) -> Result<Option<String>, RegistrationError> {
        let mut builder = self.http.post(&self.settings.registry_url).json(request);
        if let Some((user, password)) = &self.settings.credentials {
            builder = builder.basic_auth(user, password.as_ref());
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RegistrationError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice::<RegistrationResponse>(&body)
            .ok()
            .and_then(|r| r.id))
    }

    async fn deregister(&self, id: &str) {
        let url = self.settings.deregistration_url(id);
        let mut builder = self.http.delete(&url);
        if let Some((user, password)) = &self.settings.credentials {
            builder = builder.basic_auth(user, password.as_ref());
        }

        match builder.send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(url = %url, "Deregistered from registry");
            }
            Ok(response) => {
                tracing::warn!(url = %url, status = %response.status(), "Deregistration rejected");
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Deregistration failed");
            }
        }
    }
}
