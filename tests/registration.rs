//! Registry heartbeat against a mock registry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actuator::registration::{
    Outcome, RegistrationClient, RegistrationError, RegistrationSettings, RegistrationStatus,
};
use actuator::Actuator;

mod common;
use common::{fast_settings, registry_config, wait_until, MockRegistry, REGISTRATION_ID};

const WAIT: Duration = Duration::from_secs(5);

fn registry_url(addr: std::net::SocketAddr) -> String {
    format!("http://{}/register", addr)
}

#[tokio::test]
async fn test_heartbeat_payload_and_basic_auth() {
    let (registry, addr) = MockRegistry::start().await;

    let mut config = registry_config(&registry_url(addr));
    config.registration.username = Some("admin".to_string());
    config.registration.password = Some("secret".to_string());
    config.registration.metadata.insert("zone".to_string(), "eu-1".to_string());
    let mut settings = RegistrationSettings::from_config(&config).unwrap();
    settings.interval = Duration::from_millis(50);

    let client = RegistrationClient::new(settings).unwrap();
    client.start().unwrap();
    wait_until(WAIT, || client.state().is_registered()).await;
    client.stop().await;

    let bodies = registry.bodies();
    let body = &bodies[0];
    assert_eq!(body["name"], "orders");
    assert_eq!(body["serviceUrl"], "http://127.0.0.1:8000");
    assert_eq!(body["managementUrl"], "http://127.0.0.1:8000/pyctuator");
    assert_eq!(body["healthUrl"], "http://127.0.0.1:8000/pyctuator/health");
    assert_eq!(body["metadata"]["zone"], "eu-1");
    assert!(body["metadata"]["startup"].is_string());

    // base64("admin:secret")
    assert_eq!(
        registry.authorization()[0].as_deref(),
        Some("Basic YWRtaW46c2VjcmV0")
    );
    assert_eq!(client.state().registration_id.as_deref(), Some(REGISTRATION_ID));
}

#[tokio::test]
async fn test_no_credentials_sends_no_authorization() {
    let (registry, addr) = MockRegistry::start().await;
    let client =
        RegistrationClient::new(fast_settings(&registry_url(addr), Duration::from_millis(50))).unwrap();

    client.start().unwrap();
    wait_until(WAIT, || registry.completed() >= 1).await;
    client.stop().await;

    assert_eq!(registry.authorization()[0], None);
}

#[tokio::test]
async fn test_recovers_after_registry_failures() {
    let (registry, addr) = MockRegistry::start().await;
    registry.set_status(503);

    let client =
        RegistrationClient::new(fast_settings(&registry_url(addr), Duration::from_millis(50))).unwrap();
    client.start().unwrap();

    wait_until(WAIT, || client.state().consecutive_failures >= 3).await;
    // Idle between attempts, Registering during one; never Registered.
    let state = client.state();
    assert!(matches!(
        state.status,
        RegistrationStatus::Idle | RegistrationStatus::Registering
    ));
    assert_eq!(state.last_outcome, Some(Outcome::Failure));
    assert_eq!(state.registration_id, None);

    registry.set_status(200);
    wait_until(WAIT, || client.state().is_registered()).await;

    let state = client.state();
    assert_eq!(state.consecutive_failures, 0);
    assert_eq!(state.last_outcome, Some(Outcome::Success));
    client.stop().await;
}

#[tokio::test]
async fn test_failure_after_registration_is_pending_reregistration() {
    let (registry, addr) = MockRegistry::start().await;
    let client =
        RegistrationClient::new(fast_settings(&registry_url(addr), Duration::from_millis(50))).unwrap();
    client.start().unwrap();
    wait_until(WAIT, || client.state().is_registered()).await;

    registry.set_status(500);
    wait_until(WAIT, || client.state().consecutive_failures >= 1).await;

    let state = client.state();
    assert_eq!(state.status, RegistrationStatus::ReregistrationPending);
    assert_eq!(state.registration_id.as_deref(), Some(REGISTRATION_ID));

    registry.set_status(200);
    wait_until(WAIT, || client.state().is_registered()).await;
    client.stop().await;
}

#[tokio::test]
async fn test_unreachable_registry_keeps_ticking() {
    let addr = common::unreachable_addr().await;
    let client =
        RegistrationClient::new(fast_settings(&registry_url(addr), Duration::from_millis(30))).unwrap();

    client.start().unwrap();
    wait_until(WAIT, || client.state().consecutive_failures >= 3).await;

    let state = client.state();
    assert!(state.attempts >= 3);
    assert!(!state.is_registered());

    client.stop().await;
    assert_eq!(client.state().status, RegistrationStatus::Stopped);
}

#[tokio::test]
async fn test_stop_waits_for_in_flight_heartbeat() {
    let (registry, addr) = MockRegistry::start().await;
    registry.set_delay(Duration::from_millis(300));

    let client =
        RegistrationClient::new(fast_settings(&registry_url(addr), Duration::from_millis(50))).unwrap();
    client.start().unwrap();

    // The first POST is now parked inside the registry.
    wait_until(WAIT, || registry.calls() >= 1).await;
    assert_eq!(registry.completed(), 0);

    let started = Instant::now();
    client.stop().await;

    assert!(started.elapsed() >= Duration::from_millis(150));
    assert_eq!(registry.completed(), 1);
    let state = client.state();
    assert_eq!(state.attempts, 1);
    assert_eq!(state.last_outcome, Some(Outcome::Success));
    assert_eq!(state.status, RegistrationStatus::Stopped);

    // Several periods later the registry has still seen only that one POST.
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(registry.calls(), 1);
    assert_eq!(client.state().attempts, 1);
}

#[tokio::test]
async fn test_overlapping_stops_both_wait_for_in_flight_heartbeat() {
    let (registry, addr) = MockRegistry::start().await;
    registry.set_delay(Duration::from_millis(400));

    let client = Arc::new(
        RegistrationClient::new(fast_settings(&registry_url(addr), Duration::from_millis(50))).unwrap(),
    );
    client.start().unwrap();
    wait_until(WAIT, || registry.calls() >= 1).await;

    let first = {
        let client = client.clone();
        tokio::spawn(async move { client.stop().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    // The second caller returns no earlier than the first one's join.
    client.stop().await;
    assert_eq!(registry.completed(), 1);
    assert_eq!(client.state().status, RegistrationStatus::Stopped);
    assert_eq!(registry.deletes(), vec![REGISTRATION_ID.to_string()]);

    first.await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(registry.calls(), 1);
    assert_eq!(registry.deletes().len(), 1);
}

#[tokio::test]
async fn test_no_heartbeat_after_stop() {
    let (registry, addr) = MockRegistry::start().await;
    let client =
        RegistrationClient::new(fast_settings(&registry_url(addr), Duration::from_millis(30))).unwrap();

    client.start().unwrap();
    wait_until(WAIT, || registry.calls() >= 3).await;
    client.stop().await;

    let calls = registry.calls();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(registry.calls(), calls);
}

#[tokio::test]
async fn test_deregisters_once_on_stop() {
    let (registry, addr) = MockRegistry::start().await;
    let client =
        RegistrationClient::new(fast_settings(&registry_url(addr), Duration::from_millis(50))).unwrap();

    client.start().unwrap();
    wait_until(WAIT, || client.state().is_registered()).await;
    client.stop().await;
    client.stop().await;

    assert_eq!(registry.deletes(), vec![REGISTRATION_ID.to_string()]);
}

#[tokio::test]
async fn test_no_deregistration_when_disabled() {
    let (registry, addr) = MockRegistry::start().await;
    let mut settings = fast_settings(&registry_url(addr), Duration::from_millis(50));
    settings.auto_deregister = false;

    let client = RegistrationClient::new(settings).unwrap();
    client.start().unwrap();
    wait_until(WAIT, || client.state().is_registered()).await;
    client.stop().await;

    assert!(registry.deletes().is_empty());
}

#[tokio::test]
async fn test_start_is_single_use() {
    let (_registry, addr) = MockRegistry::start().await;
    let client =
        RegistrationClient::new(fast_settings(&registry_url(addr), Duration::from_millis(50))).unwrap();

    client.start().unwrap();
    assert!(matches!(client.start(), Err(RegistrationError::AlreadyStarted)));

    client.stop().await;
    assert!(matches!(client.start(), Err(RegistrationError::Stopped)));
}

#[tokio::test]
async fn test_stop_before_start_is_harmless() {
    let (registry, addr) = MockRegistry::start().await;
    let client =
        RegistrationClient::new(fast_settings(&registry_url(addr), Duration::from_millis(50))).unwrap();

    client.stop().await;

    assert_eq!(client.state().status, RegistrationStatus::Stopped);
    assert_eq!(registry.calls(), 0);
    assert!(registry.deletes().is_empty());
}

#[tokio::test]
async fn test_actuator_drives_heartbeat() {
    let (registry, addr) = MockRegistry::start().await;
    let actuator = Actuator::new(registry_config(&registry_url(addr))).unwrap();

    actuator.start().unwrap();
    wait_until(WAIT, || registry.completed() >= 1).await;
    actuator.stop().await;

    let state = actuator.registration_state().unwrap();
    assert_eq!(state.status, RegistrationStatus::Stopped);
    assert_eq!(registry.deletes(), vec![REGISTRATION_ID.to_string()]);
}

#[tokio::test]
async fn test_actuator_without_registry_url_has_no_heartbeat() {
    let mut config = registry_config("http://unused");
    config.registration.registry_url = None;

    let actuator = Actuator::new(config).unwrap();
    assert!(actuator.registration().is_none());
    actuator.start().unwrap();
    actuator.stop().await;
}
