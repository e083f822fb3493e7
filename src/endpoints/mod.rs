//! Actuator HTTP endpoints.
//!
//! | Path                     | Body                                   |
//! |--------------------------|----------------------------------------|
//! | `{prefix}`               | `_links` index for the registry        |
//! | `{prefix}/health`        | aggregate health (503 when `DOWN`)     |
//! | `{prefix}/info`          | application info                       |
//! | `{prefix}/httptrace`     | `{"traces": [...]}`, oldest first      |
//! | `{prefix}/trace`         | alias of `httptrace`                   |
//! | `{prefix}/logfile`       | log tail, honors `Range: bytes=...`    |

pub mod handlers;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{routing::get, Router};

use crate::config::AppConfig;
use crate::health::HealthRegistry;
use crate::httptrace::TraceRingBuffer;
use crate::logfile::LogBuffer;
use self::handlers::*;

/// State injected into the endpoint handlers.
#[derive(Clone)]
pub struct EndpointState {
    pub traces: Arc<TraceRingBuffer>,
    pub logs: Arc<LogBuffer>,
    pub health: Arc<HealthRegistry>,
    pub app: Arc<AppConfig>,
    pub info: Arc<BTreeMap<String, String>>,
    pub management_url: Arc<str>,
}

pub fn setup_actuator_router(prefix: &str, state: EndpointState) -> Router {
    Router::new()
        .route(prefix, get(get_index))
        .route(&format!("{}/health", prefix), get(get_health))
        .route(&format!("{}/info", prefix), get(get_info))
        .route(&format!("{}/httptrace", prefix), get(get_httptrace))
        .route(&format!("{}/trace", prefix), get(get_httptrace))
        .route(&format!("{}/logfile", prefix), get(get_logfile))
        .with_state(state)
}
