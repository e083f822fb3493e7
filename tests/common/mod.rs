//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actuator::config::ActuatorConfig;
use actuator::registration::RegistrationSettings;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{delete, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Id handed out by the mock registry.
pub const REGISTRATION_ID: &str = "abc123";

/// Programmable stand-in for a Spring Boot Admin registry.
///
/// `POST /register` counts calls, sleeps for the configured delay, records
/// the body and `Authorization` header, then answers with the configured
/// status. `DELETE /register/{id}` records the id.
#[derive(Clone, Default)]
pub struct MockRegistry {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    calls: AtomicU32,
    completed: AtomicU32,
    status: AtomicU16,
    delay_ms: AtomicU64,
    bodies: Mutex<Vec<Value>>,
    authorization: Mutex<Vec<Option<String>>>,
    deletes: Mutex<Vec<String>>,
}

impl MockRegistry {
    /// Start the registry on an ephemeral port. Answers 200 until told otherwise.
    pub async fn start() -> (Self, SocketAddr) {
        let registry = Self::default();
        registry.set_status(200);

        let app = Router::new()
            .route("/register", post(register))
            .route("/register/{id}", delete(deregister))
            .with_state(registry.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        (registry, addr)
    }

    pub fn set_status(&self, status: u16) {
        self.inner.status.store(status, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.inner.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// POSTs received, including ones still being answered.
    pub fn calls(&self) -> u32 {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// POSTs fully answered.
    pub fn completed(&self) -> u32 {
        self.inner.completed.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.inner.bodies.lock().unwrap().clone()
    }

    pub fn authorization(&self) -> Vec<Option<String>> {
        self.inner.authorization.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.inner.deletes.lock().unwrap().clone()
    }
}

async fn register(
    State(registry): State<MockRegistry>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let inner = &registry.inner;
    inner.calls.fetch_add(1, Ordering::SeqCst);

    let delay = inner.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    inner.bodies.lock().unwrap().push(body);
    inner.authorization.lock().unwrap().push(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    let status = StatusCode::from_u16(inner.status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    inner.completed.fetch_add(1, Ordering::SeqCst);

    if status.is_success() {
        (status, Json(json!({ "id": REGISTRATION_ID })))
    } else {
        (status, Json(json!({ "error": "unavailable" })))
    }
}

async fn deregister(State(registry): State<MockRegistry>, Path(id): Path<String>) -> StatusCode {
    registry.inner.deletes.lock().unwrap().push(id);
    StatusCode::OK
}

/// Config pointing at `registry_url`, registration enabled.
pub fn registry_config(registry_url: &str) -> ActuatorConfig {
    let mut config = ActuatorConfig::default();
    config.app.name = "orders".to_string();
    config.app.service_url = "http://127.0.0.1:8000".to_string();
    config.registration.enabled = true;
    config.registration.registry_url = Some(registry_url.to_string());
    config.registration.timeout_secs = 2;
    config
}

/// Heartbeat settings for `registry_url` with a sub-second interval.
pub fn fast_settings(registry_url: &str, interval: Duration) -> RegistrationSettings {
    let mut settings = RegistrationSettings::from_config(&registry_config(registry_url)).unwrap();
    settings.interval = interval;
    settings
}

/// An address nothing listens on.
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Poll `condition` until it holds, panicking after `timeout`.
pub async fn wait_until<F>(timeout: Duration, mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not met within {:?}", timeout);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
